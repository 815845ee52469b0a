use choropleth_rs::geometry::square;
use choropleth_rs::models::GeometryFeature;
use choropleth_rs::selection::{PointerPosition, StyleKind, Transition};
use choropleth_rs::visual::MapFrame;
use choropleth_rs::{
    BoundaryLevel, DataRow, Frame, GeometryCollection, InMemoryGeometry, Interaction,
    LocalSelectionManager, SelectionAuthority, SelectionId, UpdateOptions, Viewport, Visual,
};
use serde_json::json;

fn geometry() -> InMemoryGeometry {
    InMemoryGeometry::new().with(GeometryCollection::new(
        BoundaryLevel::Regions,
        vec![
            GeometryFeature::new("A", square(1.0, 46.0, 0.5)),
            GeometryFeature::new("B", square(1.5, 46.0, 0.5)),
            GeometryFeature::new("C", square(2.0, 46.0, 0.5)),
            GeometryFeature::new("Far", square(8.5, 42.0, 0.5)),
        ],
    ))
}

fn options(
    rows: Option<Vec<DataRow>>,
    objects: serde_json::Value,
    drill_level: usize,
) -> UpdateOptions {
    UpdateOptions {
        rows,
        objects,
        drill_level,
        viewport: Viewport::new(900.0, 600.0),
    }
}

fn abc_rows() -> Vec<DataRow> {
    vec![
        DataRow::new("A", 1234.5),
        DataRow::new("B", 20.0),
        DataRow::new("C", 40.0),
    ]
}

fn map_frame(frame: Frame) -> MapFrame {
    match frame {
        Frame::Map(m) => m,
        Frame::Landing => panic!("expected a map frame"),
    }
}

#[test]
fn no_data_view_shows_landing() {
    let mut visual = Visual::new(geometry(), LocalSelectionManager::new());
    assert_eq!(visual.update(options(None, json!({}), 0)), Frame::Landing);
    assert_eq!(visual.update(options(Some(vec![]), json!({}), 0)), Frame::Landing);
}

#[test]
fn map_frame_splits_viewport_with_legend() {
    let mut visual = Visual::new(geometry(), LocalSelectionManager::new());
    let frame = map_frame(visual.update(options(Some(abc_rows()), json!({}), 0)));

    assert_eq!(frame.level, BoundaryLevel::Regions);
    assert_eq!(frame.layout.map.x, 155.0);
    assert_eq!(frame.layout.map.width, 750.0);
    let legend_area = frame.layout.legend.unwrap();
    assert_eq!(legend_area.width, 150.0);

    let legend = frame.legend.unwrap();
    assert_eq!(legend.bars.len(), 6);
    assert!(!legend.ticks.is_empty());

    let t = frame.transform.unwrap();
    assert!(t.scale.is_finite() && t.scale > 0.0);

    let names: Vec<&str> = frame.features.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(&names[..3], &["A", "B", "C"]);
    assert!(frame.features[..3].iter().all(|f| f.fill.is_some()));
    assert_eq!(frame.features[0].rings[0].len(), 5);

    let tip = frame.features[0].tooltip.as_ref().unwrap();
    assert_eq!(tip.display_name, "A");
    assert_eq!(tip.value, "1 234.5");
}

#[test]
fn hidden_legend_gives_the_map_the_whole_viewport() {
    let mut visual = Visual::new(geometry(), LocalSelectionManager::new());
    let frame = map_frame(visual.update(options(
        Some(abc_rows()),
        json!({"scale": {"show": false}}),
        0,
    )));
    assert_eq!(frame.layout.map.x, 0.0);
    assert_eq!(frame.layout.map.width, 900.0);
    assert!(frame.layout.legend.is_none());
    assert!(frame.legend.is_none());
}

#[test]
fn tooltips_can_be_disabled() {
    let mut visual = Visual::new(geometry(), LocalSelectionManager::new());
    let frame = map_frame(visual.update(options(
        Some(abc_rows()),
        json!({"tooltip": {"show": false}}),
        0,
    )));
    assert!(frame.features.iter().all(|f| f.tooltip.is_none()));
}

#[test]
fn far_empty_shape_is_culled() {
    let mut visual = Visual::new(geometry(), LocalSelectionManager::new());
    let frame = map_frame(visual.update(options(Some(abc_rows()), json!({}), 0)));
    assert!(frame.features.iter().all(|f| f.name != "Far"));
    assert_eq!(frame.culled, 1);
}

#[test]
fn interactions_restyle_and_drill_resets() {
    let mut visual = Visual::new(geometry(), LocalSelectionManager::new());
    visual.update(options(Some(abc_rows()), json!({}), 0));

    let (transition, styles) = visual.interact("A", Interaction::Click { ctrl: false }).unwrap();
    assert_eq!(transition, Transition::Replaced);
    assert_eq!(styles[0].kind, StyleKind::Selected);
    assert_eq!(styles[1].kind, StyleKind::Unselected);

    let (transition, _) = visual.interact("B", Interaction::Click { ctrl: true }).unwrap();
    assert_eq!(transition, Transition::Added);
    assert_eq!(visual.selection().selected().len(), 2);

    // Same drill level: selection survives the rebuild and styles into the frame.
    let frame = map_frame(visual.update(options(Some(abc_rows()), json!({}), 0)));
    assert_eq!(frame.features[1].style.kind, StyleKind::Selected);
    assert_eq!(frame.features[2].style.kind, StyleKind::Unselected);

    // Drilling down drops every selection.
    let frame = map_frame(visual.update(options(Some(abc_rows()), json!({}), 1)));
    assert_eq!(frame.level, BoundaryLevel::Departements);
    assert!(frame.features.is_empty());
    assert!(frame.transform.is_none());
    assert!(visual.selection().is_neutral());
    assert!(!visual.authority().has_selection());
}

#[test]
fn unknown_feature_is_not_interactive() {
    let mut visual = Visual::new(geometry(), LocalSelectionManager::new());
    visual.update(options(Some(abc_rows()), json!({}), 0));
    assert!(visual.interact("Atlantis", Interaction::Click { ctrl: false }).is_none());
}

#[test]
fn context_menus_reach_the_authority() {
    let mut visual = Visual::new(geometry(), LocalSelectionManager::new());
    visual.update(options(Some(abc_rows()), json!({}), 0));
    let pos = PointerPosition { x: 10.0, y: 20.0 };
    visual.interact("C", Interaction::ContextMenu { position: pos });
    visual.background_context_menu(pos);
    assert_eq!(
        visual.authority().context_menus(),
        &[(SelectionId::for_feature("C"), pos), (SelectionId::empty(), pos)]
    );
    assert!(visual.selection().is_neutral());
}

#[test]
fn hit_test_finds_the_centered_feature() {
    let mut visual = Visual::new(geometry(), LocalSelectionManager::new());
    visual.update(options(Some(vec![DataRow::new("A", 5.0)]), json!({}), 0));
    // The fitted region sits on the map area center: (155 + 750 / 2, 600 / 2).
    assert_eq!(visual.feature_at(530.0, 300.0), Some("A"));
    assert_eq!(visual.feature_at(1.0, 1.0), None);
}

#[test]
fn enumeration_uses_last_resolved_settings() {
    let mut visual = Visual::new(geometry(), LocalSelectionManager::new());
    visual.update(options(Some(abc_rows()), json!({"couleur": {"colorRange": 12}}), 0));
    let couleur = visual.enumerate_objects("couleur");
    assert_eq!(couleur[0].properties["colorRange"], json!(12));
}
