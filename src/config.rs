use std::{fs::File, io::BufReader, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Fallback colors for party labels missing from the color table.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#2f6fed", "#f97316", "#22c55e", "#94a3b8", "#a855f7", "#0ea5e9", "#f59e0b", "#14b8a6",
];

/// Settings accepted by the map core. Every field has a default, so a config
/// file only needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    /// Explicit base fill painted on every shape before data colors.
    pub base_fill: Option<String>,
    pub hover_fill: String,
    pub active_fill: String,
    /// Maximum label distance (map units) for a shape to bind to a seat.
    pub threshold: f64,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    /// Element id of the group holding the seat shapes; the whole document
    /// is used when no element carries this id.
    pub shapes_root: Option<String>,
    /// Opacity of non-selected shapes while a selection is active.
    pub dim_opacity: f32,
    /// CSS filter applied to hovered and selected shapes.
    pub glow: String,
    pub palette: Vec<String>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            base_fill: None,
            hover_fill: "#38bdf8".to_string(),
            active_fill: "#22c55e".to_string(),
            threshold: 60.0,
            poll_interval_ms: 8000,
            request_timeout_ms: 10_000,
            shapes_root: Some("Wahlkreise".to_string()),
            dim_opacity: 0.65,
            glow: "drop-shadow(0 0 8px rgba(56, 189, 248, 0.6))".to_string(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl MapConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("[config] Failed to open {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("[config] Failed to parse {}", path.display()))?;
        Ok(config.sanitized())
    }

    #[inline] pub fn poll_interval(&self) -> Duration { Duration::from_millis(self.poll_interval_ms.max(1)) }

    #[inline] pub fn request_timeout(&self) -> Duration { Duration::from_millis(self.request_timeout_ms) }

    /// Replace values that would make the core misbehave with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.threshold.is_finite() || self.threshold < 0.0 { self.threshold = defaults.threshold }
        if self.palette.is_empty() { self.palette = defaults.palette }
        if !(0.0..=1.0).contains(&self.dim_opacity) { self.dim_opacity = defaults.dim_opacity }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = MapConfig::default();
        assert_eq!(config.base_fill, None);
        assert_eq!(config.hover_fill, "#38bdf8");
        assert_eq!(config.active_fill, "#22c55e");
        assert_eq!(config.threshold, 60.0);
        assert_eq!(config.poll_interval(), Duration::from_secs(8));
        assert_eq!(config.palette.len(), 8);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r##"{{ "threshold": 25, "baseFill": "#eeeeee", "palette": [] }}"##).unwrap();

        let config = MapConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.threshold, 25.0);
        assert_eq!(config.base_fill.as_deref(), Some("#eeeeee"));
        assert_eq!(config.hover_fill, "#38bdf8");
        // empty palette is replaced so the hash fallback always has a color
        assert_eq!(config.palette.len(), 8);
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let config = MapConfig { threshold: -1.0, ..MapConfig::default() }.sanitized();
        assert_eq!(config.threshold, 60.0);
    }
}
