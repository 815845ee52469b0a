//! Selection and drill state, reconciled with an external selection authority.
//!
//! [`SelectionState`] outlives a single render: the orchestrator owns it and
//! threads it through every update and interaction. Membership is decided on
//! [`SelectionId`] content equality, never on instance identity.

use crate::color::Rgb;
use crate::models::{DataPoint, Highlight, SelectionId};
use indexmap::IndexSet;
use log::debug;
use serde::Serialize;

/// Pointer position in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

/// Host-side multi-select service.
pub trait SelectionAuthority {
    fn has_selection(&self) -> bool;
    fn clear(&mut self);
    /// Replace the selection with `ids`, or add them when `multi_select`.
    fn select(&mut self, ids: &[SelectionId], multi_select: bool);
    fn show_context_menu(&mut self, id: &SelectionId, position: PointerPosition);
}

/// In-process authority keeping the selection it was told about.
#[derive(Debug, Clone, Default)]
pub struct LocalSelectionManager {
    selected: Vec<SelectionId>,
    context_menus: Vec<(SelectionId, PointerPosition)>,
}

impl LocalSelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[SelectionId] {
        &self.selected
    }

    /// Context menu requests, oldest first.
    pub fn context_menus(&self) -> &[(SelectionId, PointerPosition)] {
        &self.context_menus
    }
}

impl SelectionAuthority for LocalSelectionManager {
    fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    fn clear(&mut self) {
        self.selected.clear();
    }

    fn select(&mut self, ids: &[SelectionId], multi_select: bool) {
        if !multi_select {
            self.selected.clear();
        }
        for id in ids {
            if !self.selected.contains(id) {
                self.selected.push(id.clone());
            }
        }
    }

    fn show_context_menu(&mut self, id: &SelectionId, position: PointerPosition) {
        self.context_menus.push((id.clone(), position));
    }
}

/// Insertion-ordered set of selection ids.
pub type SelectedSet = IndexSet<SelectionId, ahash::RandomState>;

/// Pointer input on a feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Click { ctrl: bool },
    ContextMenu { position: PointerPosition },
}

/// What an interaction did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed (no selection id, or a context menu).
    Unchanged,
    Cleared,
    Replaced,
    Added,
    Removed,
}

/// Tier of the three-level style fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    Selected,
    Unselected,
    Neutral,
}

/// Stroke and opacity of a drawn feature. `stroke_width` is in map units,
/// so it is divided by the zoom scale to stay constant on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureStyle {
    pub kind: StyleKind,
    pub opacity: f64,
    pub stroke_width: f64,
    pub stroke: Rgb,
}

impl StyleKind {
    pub fn style(self, scale: f64) -> FeatureStyle {
        let unit = if scale > 0.0 && scale.is_finite() { 1.0 / scale } else { 1.0 };
        let (opacity, stroke_width, stroke) = match self {
            StyleKind::Selected => (1.0, unit, Rgb::BLACK),
            StyleKind::Unselected => (0.5, unit / 2.0, Rgb::GREY),
            StyleKind::Neutral => (1.0, unit / 2.0, Rgb::GREY),
        };
        FeatureStyle {
            kind: self,
            opacity,
            stroke_width,
            stroke,
        }
    }
}

/// Selection and drill memory of one rendered visual.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    selected: SelectedSet,
    previous_drill_level: usize,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &SelectedSet {
        &self.selected
    }

    pub fn previous_drill_level(&self) -> usize {
        self.previous_drill_level
    }

    pub fn is_neutral(&self) -> bool {
        self.selected.is_empty()
    }

    /// Start of a render tick. A drill level change drops every selection,
    /// here and in the authority. Returns whether a reset happened.
    pub fn begin_render<A: SelectionAuthority + ?Sized>(
        &mut self,
        drill_level: usize,
        authority: &mut A,
    ) -> bool {
        let drilled = drill_level != self.previous_drill_level;
        self.previous_drill_level = drill_level;
        if drilled {
            debug!(
                "drill level changed to {drill_level}, clearing {} selection(s)",
                self.selected.len()
            );
            self.selected.clear();
            authority.clear();
            return true;
        }
        if !self.selected.is_empty() && !authority.has_selection() {
            debug!("authority selection cleared externally");
            self.selected.clear();
        }
        false
    }

    /// Apply one interaction on a feature whose selection id is `target`.
    pub fn handle<A: SelectionAuthority + ?Sized>(
        &mut self,
        target: Option<&SelectionId>,
        interaction: Interaction,
        authority: &mut A,
    ) -> Transition {
        let Some(id) = target else {
            return Transition::Unchanged;
        };
        match interaction {
            Interaction::ContextMenu { position } => {
                authority.show_context_menu(id, position);
                Transition::Unchanged
            }
            Interaction::Click { ctrl } => self.click(id, ctrl, authority),
        }
    }

    fn click<A: SelectionAuthority + ?Sized>(
        &mut self,
        id: &SelectionId,
        ctrl: bool,
        authority: &mut A,
    ) -> Transition {
        let member = self.selected.contains(id);
        match (member, ctrl) {
            (true, true) => {
                self.selected.shift_remove(id);
                authority.clear();
                if self.selected.is_empty() {
                    Transition::Cleared
                } else {
                    let remaining: Vec<SelectionId> = self.selected.iter().cloned().collect();
                    authority.select(&remaining, false);
                    Transition::Removed
                }
            }
            (true, false) => {
                self.selected.clear();
                authority.clear();
                Transition::Cleared
            }
            (false, true) => {
                self.selected.insert(id.clone());
                authority.select(std::slice::from_ref(id), true);
                Transition::Added
            }
            (false, false) => {
                self.selected.clear();
                self.selected.insert(id.clone());
                authority.select(std::slice::from_ref(id), false);
                Transition::Replaced
            }
        }
    }

    /// Style tier for one feature: explicit selection, then highlight, then neutral.
    /// Features without a selection id (empty shapes) stay neutral.
    pub fn style_kind(&self, point: &DataPoint) -> StyleKind {
        let Some(id) = point.selection_id.as_ref() else {
            return StyleKind::Neutral;
        };
        if !self.selected.is_empty() {
            return if self.selected.contains(id) {
                StyleKind::Selected
            } else {
                StyleKind::Unselected
            };
        }
        match point.highlight_state() {
            Highlight::NotHighlighted => StyleKind::Unselected,
            Highlight::Highlighted => StyleKind::Selected,
            Highlight::None => StyleKind::Neutral,
        }
    }

    /// Recompute every feature's style from current membership.
    pub fn reconcile(&self, points: &[DataPoint], scale: f64) -> Vec<FeatureStyle> {
        points
            .iter()
            .map(|p| self.style_kind(p).style(scale))
            .collect()
    }
}
