/// The competing fill layers of a shape, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FillLayer {
    Selected,
    Hovered,
    Data,
    Base,
    Original,
}

/// Interaction and data state of one shape.
///
/// The resolved fill is a pure function of this record, so clearing a
/// higher layer always falls back to exactly what the lower layers say.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillState {
    /// Fill captured when the document was loaded; may be empty.
    pub original: String,
    pub base: Option<String>,
    pub data: Option<String>,
    pub hovered: bool,
    pub selected: bool,
}

impl FillState {
    pub fn new(original: impl Into<String>) -> Self {
        Self { original: original.into(), ..Self::default() }
    }

    /// The layer currently deciding this shape's fill.
    pub fn active_layer(&self) -> FillLayer {
        if self.selected { FillLayer::Selected }
        else if self.hovered { FillLayer::Hovered }
        else if self.data.is_some() { FillLayer::Data }
        else if self.base.is_some() { FillLayer::Base }
        else { FillLayer::Original }
    }

    /// Resolved fill. An empty string means "no fill override".
    pub fn resolve<'a>(&'a self, hover_fill: &'a str, active_fill: &'a str) -> &'a str {
        match self.active_layer() {
            FillLayer::Selected => active_fill,
            FillLayer::Hovered => hover_fill,
            FillLayer::Data => self.data.as_deref().unwrap_or_default(),
            FillLayer::Base => self.base.as_deref().unwrap_or_default(),
            FillLayer::Original => &self.original,
        }
    }
}
