//! Update orchestration: one host update produces one complete [`Frame`].
//!
//! Each tick re-resolves settings, rebuilds the data model, partitions the
//! viewport between map and legend, fits the map and restyles every feature.
//! Nothing from the previous frame is patched; only [`SelectionState`] carries over.

use crate::autofit::{self, MapTransform};
use crate::builder;
use crate::color::Rgb;
use crate::geometry::{ConicConformal, GeometryProvider, PathMeasure, ProjectedPath};
use crate::legend::{LegendLayout, layout_legend};
use crate::models::{BoundaryLevel, DataModel, DataPoint, DataRow, SelectionId};
use crate::selection::{
    FeatureStyle, Interaction, PointerPosition, SelectionAuthority, SelectionState, Transition,
};
use crate::settings::{ObjectInstance, ScaleSettings, VisualSettings};
use crate::tooltip::{TooltipItem, tooltip_for};
use geo::{Contains, Point};
use log::{debug, error};
use serde::Serialize;

/// Fill used for shapes without data.
pub const EMPTY_FILL: Rgb = Rgb::new(0xE6, 0xE6, 0xE6);
/// Gap between the legend panel and the map.
pub const LEGEND_GAP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned pixel rectangle inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Area {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportLayout {
    pub map: Area,
    pub legend: Option<Area>,
}

/// Split the viewport: the legend takes `scale.width` on the left when shown.
pub fn partition_viewport(viewport: Viewport, scale: &ScaleSettings) -> ViewportLayout {
    if scale.show {
        ViewportLayout {
            map: Area {
                x: scale.width + LEGEND_GAP,
                y: 0.0,
                width: (viewport.width - scale.width).max(0.0),
                height: viewport.height,
            },
            legend: Some(Area {
                x: 0.0,
                y: 0.0,
                width: scale.width,
                height: viewport.height,
            }),
        }
    } else {
        ViewportLayout {
            map: Area {
                x: 0.0,
                y: 0.0,
                width: viewport.width,
                height: viewport.height,
            },
            legend: None,
        }
    }
}

/// Input of one update tick.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// `None` (or no rows) when the host has no data view yet.
    pub rows: Option<Vec<DataRow>>,
    /// Host property bag.
    pub objects: serde_json::Value,
    pub drill_level: usize,
    pub viewport: Viewport,
}

/// One feature ready to draw, in projected (pre-transform) map coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawableFeature {
    pub name: String,
    pub value: Option<f64>,
    pub fill: Option<Rgb>,
    pub style: FeatureStyle,
    pub selection_id: Option<SelectionId>,
    /// Exterior rings only.
    pub rings: Vec<Vec<(f64, f64)>>,
    pub tooltip: Option<TooltipItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFrame {
    pub level: BoundaryLevel,
    pub viewport: Viewport,
    pub layout: ViewportLayout,
    /// `None` when nothing matched or the region is degenerate.
    pub transform: Option<MapTransform>,
    pub features: Vec<DrawableFeature>,
    pub legend: Option<LegendLayout>,
    /// Empty shapes left out of the drawable set.
    pub culled: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    /// No data view: show the landing page.
    Landing,
    Map(MapFrame),
}

/// A rendered choropleth: geometry source, selection authority and the state
/// carried between updates.
pub struct Visual<G, A> {
    geometry: G,
    authority: A,
    projection: ConicConformal,
    settings: VisualSettings,
    selection: SelectionState,
    model: DataModel,
    measure: ProjectedPath<ConicConformal>,
    transform: Option<MapTransform>,
    layout: Option<ViewportLayout>,
}

impl<G: GeometryProvider, A: SelectionAuthority> Visual<G, A> {
    pub fn new(geometry: G, authority: A) -> Self {
        Self::with_projection(geometry, authority, ConicConformal::france())
    }

    pub fn with_projection(geometry: G, authority: A, projection: ConicConformal) -> Self {
        Self {
            geometry,
            authority,
            measure: ProjectedPath::new(projection.clone()),
            projection,
            settings: VisualSettings::default(),
            selection: SelectionState::new(),
            model: DataModel::default(),
            transform: None,
            layout: None,
        }
    }

    pub fn settings(&self) -> &VisualSettings {
        &self.settings
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    pub fn model(&self) -> &DataModel {
        &self.model
    }

    /// Run one full recomputation pass.
    pub fn update(&mut self, options: UpdateOptions) -> Frame {
        let Some(rows) = options.rows.filter(|r| !r.is_empty()) else {
            debug!("no data view, showing landing page");
            self.model = DataModel::default();
            self.transform = None;
            self.layout = None;
            return Frame::Landing;
        };

        self.settings = VisualSettings::resolve(&options.objects, options.drill_level);
        let level = self.settings.map.selected_map;
        self.model = builder::build_for_level(level, &rows, &self.geometry, &self.settings)
            .unwrap_or_else(|e| {
                error!("cannot color {level}: {e}");
                DataModel {
                    level: Some(level),
                    ..DataModel::default()
                }
            });

        let layout = partition_viewport(options.viewport, &self.settings.scale);
        let map = layout.map;
        self.measure = ProjectedPath::new(
            self.projection
                .clone()
                .with_translate(map.width / 2.0, map.height / 2.0),
        );
        self.transform = match autofit::fit(&mut self.model, &self.measure, map.width, map.height) {
            Ok(t) => Some(t),
            Err(e) => {
                debug!("{level}: {e}, drawing without fit");
                None
            }
        };
        self.layout = Some(layout);

        self.selection
            .begin_render(self.settings.map.drill_level, &mut self.authority);

        let legend = layout.legend.and_then(|area| {
            let scale = self.settings.color_scale_spec().to_scale().ok()?;
            let domain = self.model.range.map(|r| self.settings.value_domain(r));
            Some(layout_legend(
                &scale,
                domain,
                area.width,
                area.height,
                self.settings.scale.extremum,
            ))
        });

        let styles = self.current_styles();
        let features = self
            .model
            .data
            .iter()
            .zip(styles)
            .map(|(p, style)| self.drawable(p, style))
            .collect();

        Frame::Map(MapFrame {
            level,
            viewport: options.viewport,
            layout,
            transform: self.transform,
            features,
            legend,
            culled: self.model.empty_shape.len(),
        })
    }

    /// Apply an interaction on the named feature and return the restyled
    /// drawable set (in `model().data` order). `None` if no such feature is drawn.
    pub fn interact(
        &mut self,
        feature: &str,
        interaction: Interaction,
    ) -> Option<(Transition, Vec<FeatureStyle>)> {
        let target = self
            .model
            .data
            .iter()
            .find(|p| p.name == feature)?
            .selection_id
            .clone();
        let transition = self
            .selection
            .handle(target.as_ref(), interaction, &mut self.authority);
        Some((transition, self.current_styles()))
    }

    /// Context menu on the map background.
    pub fn background_context_menu(&mut self, position: PointerPosition) {
        self.authority
            .show_context_menu(&SelectionId::empty(), position);
    }

    /// Name of the drawn feature under viewport pixel `(x, y)`.
    pub fn feature_at(&self, x: f64, y: f64) -> Option<&str> {
        let layout = self.layout?;
        let t = self.transform.unwrap_or(MapTransform::IDENTITY);
        let local = Point::new(
            (x - layout.map.x - t.translate.0) / t.scale,
            (y - layout.map.y - t.translate.1) / t.scale,
        );
        self.model
            .data
            .iter()
            .rev()
            .find(|p| self.measure.project_geometry(&p.map_data).contains(&local))
            .map(|p| p.name.as_str())
    }

    pub fn enumerate_objects(&self, object_name: &str) -> Vec<ObjectInstance> {
        self.settings.enumerate_objects(object_name)
    }

    fn current_styles(&self) -> Vec<FeatureStyle> {
        let scale = self.transform.map_or(1.0, |t| t.scale);
        self.selection.reconcile(&self.model.data, scale)
    }

    fn drawable(&self, point: &DataPoint, style: FeatureStyle) -> DrawableFeature {
        let projected = self.measure.project_geometry(&point.map_data);
        let rings = projected
            .0
            .iter()
            .map(|poly| poly.exterior().coords().map(|c| (c.x, c.y)).collect())
            .collect();
        DrawableFeature {
            name: point.name.clone(),
            value: point.value,
            fill: point.color,
            style,
            selection_id: point.selection_id.clone(),
            rings,
            tooltip: if self.settings.tooltip.show {
                tooltip_for(point)
            } else {
                None
            },
        }
    }
}
