use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::config::MapConfig;
use crate::map::MapDocument;
use crate::types::{Generation, ShapeId};
use super::{FillLayer, FillState};

/// Shapes whose resolved fill may have changed after a setter.
pub type Changed = SmallVec<[ShapeId; 2]>;

/// Visual affordances of one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub fill: String,
    pub opacity: f32,
    /// CSS filter for hovered and selected shapes.
    pub glow: Option<String>,
}

/// Owns the per-shape fill state of one loaded document.
///
/// All mutation goes through the setters. Ids from another generation, or
/// outside the document, are ignored and report no change.
#[derive(Debug, Clone)]
pub struct FillLayerController {
    generation: Generation,
    states: Vec<FillState>,
    hovered: Option<ShapeId>,
    selected: Option<ShapeId>,
    hover_fill: String,
    active_fill: String,
    dim_opacity: f32,
    glow: String,
}

impl FillLayerController {
    pub fn new(document: &MapDocument, config: &MapConfig) -> Self {
        Self {
            generation: document.generation(),
            states: document.shapes().iter().map(|s| FillState::new(s.original_fill.clone())).collect(),
            hovered: None,
            selected: None,
            hover_fill: config.hover_fill.clone(),
            active_fill: config.active_fill.clone(),
            dim_opacity: config.dim_opacity,
            glow: config.glow.clone(),
        }
    }

    #[inline] pub fn generation(&self) -> Generation { self.generation }

    #[inline] pub fn len(&self) -> usize { self.states.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.states.is_empty() }

    #[inline] pub fn hovered(&self) -> Option<ShapeId> { self.hovered }

    #[inline] pub fn selected(&self) -> Option<ShapeId> { self.selected }

    /// True if `id` names a shape of this controller's document.
    pub fn contains(&self, id: ShapeId) -> bool {
        id.generation == self.generation && (id.index as usize) < self.states.len()
    }

    pub fn state(&self, id: ShapeId) -> Option<&FillState> {
        if !self.contains(id) { return None }
        self.states.get(id.index as usize)
    }

    fn state_mut(&mut self, id: ShapeId) -> Option<&mut FillState> {
        if !self.contains(id) { return None }
        self.states.get_mut(id.index as usize)
    }

    /// Ids of every shape in document order.
    pub fn shape_ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        (0..self.states.len() as u32).map(|i| ShapeId::new(self.generation, i))
    }

    pub fn set_base_fill(&mut self, id: ShapeId, color: Option<&str>) -> Changed {
        let Some(state) = self.state_mut(id) else { return Changed::new() };
        let color = color.map(str::to_string);
        if state.base == color { return Changed::new() }
        state.base = color;
        smallvec![id]
    }

    pub fn set_data_fill(&mut self, id: ShapeId, color: Option<&str>) -> Changed {
        let Some(state) = self.state_mut(id) else { return Changed::new() };
        let color = color.map(str::to_string);
        if state.data == color { return Changed::new() }
        state.data = color;
        smallvec![id]
    }

    /// Move the hover flag to `id`, clearing it from the previous shape.
    pub fn set_hover(&mut self, id: Option<ShapeId>) -> Changed {
        if id.is_some_and(|id| !self.contains(id)) { return Changed::new() }
        if self.hovered == id { return Changed::new() }

        let mut changed = Changed::new();
        if let Some(prev) = self.hovered.take() {
            if let Some(state) = self.state_mut(prev) { state.hovered = false }
            changed.push(prev);
        }
        if let Some(next) = id {
            if let Some(state) = self.state_mut(next) { state.hovered = true }
            self.hovered = Some(next);
            changed.push(next);
        }
        trace!("[fill] hover -> {:?}", self.hovered.map(|s| s.index));
        changed
    }

    /// Move the selection to `id`, clearing it from the previous shape.
    /// Selection is independent of hover.
    pub fn set_selected(&mut self, id: Option<ShapeId>) -> Changed {
        if id.is_some_and(|id| !self.contains(id)) { return Changed::new() }
        if self.selected == id { return Changed::new() }

        let mut changed = Changed::new();
        if let Some(prev) = self.selected.take() {
            if let Some(state) = self.state_mut(prev) { state.selected = false }
            changed.push(prev);
        }
        if let Some(next) = id {
            if let Some(state) = self.state_mut(next) { state.selected = true }
            self.selected = Some(next);
            changed.push(next);
        }
        trace!("[fill] selection -> {:?}", self.selected.map(|s| s.index));
        changed
    }

    pub fn current_fill(&self, id: ShapeId) -> Option<&str> {
        self.state(id).map(|s| s.resolve(&self.hover_fill, &self.active_fill))
    }

    pub fn active_layer(&self, id: ShapeId) -> Option<FillLayer> {
        self.state(id).map(FillState::active_layer)
    }

    pub fn style(&self, id: ShapeId) -> Option<ShapeStyle> {
        let state = self.state(id)?;
        let highlighted = state.selected || state.hovered;
        let opacity = if highlighted || self.selected.is_none() { 1.0 } else { self.dim_opacity };
        Some(ShapeStyle {
            fill: state.resolve(&self.hover_fill, &self.active_fill).to_string(),
            opacity,
            glow: highlighted.then(|| self.glow.clone()),
        })
    }
}
