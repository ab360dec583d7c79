//! Party color lookup with a deterministic palette fallback.

use std::{fs::File, io::BufReader, path::Path};

use ahash::AHashMap;
use anyhow::{Context, Result};

use crate::config::DEFAULT_PALETTE;
use crate::results::{Party, SeatLeader};

/// Maps party labels (ids or display names) to display colors.
///
/// Labels missing from the table resolve to a palette color chosen by a
/// stable hash of the lowercased label, so the same party always gets the
/// same color across reloads.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    colors: AHashMap<String, String>,
    palette: Vec<String>,
}

impl Default for ColorTable {
    fn default() -> Self { Self::new(default_palette()) }
}

impl ColorTable {
    /// An empty table over `palette`. An empty palette falls back to the
    /// default one.
    pub fn new(palette: Vec<String>) -> Self {
        let palette = if palette.is_empty() { default_palette() } else { palette };
        Self { colors: AHashMap::new(), palette }
    }

    /// Register every party under both its id and its display name.
    pub fn with_parties<'a>(mut self, parties: impl IntoIterator<Item = &'a Party>) -> Self {
        for party in parties {
            self.insert(&party.id, &party.color);
            self.insert(&party.name, &party.color);
        }
        self
    }

    pub fn insert(&mut self, label: &str, color: &str) {
        self.colors.insert(label.to_string(), color.to_string());
    }

    /// Read a JSON object of `label -> color` pairs.
    pub fn from_json_file(path: &Path, palette: Vec<String>) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("[fill::color] Failed to open {}", path.display()))?;
        let colors: AHashMap<String, String> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("[fill::color] Failed to parse {}", path.display()))?;
        let mut table = Self::new(palette);
        table.colors = colors;
        Ok(table)
    }

    #[inline] pub fn len(&self) -> usize { self.colors.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.colors.is_empty() }

    /// Color for `label`: exact table entry, else a palette color.
    /// Blank labels have no color.
    pub fn resolve(&self, label: &str) -> Option<String> {
        if label.is_empty() { return None }
        if let Some(color) = self.colors.get(label) { return Some(color.clone()) }
        Some(self.palette[palette_index(label, self.palette.len())].clone())
    }

    /// Fill color for a seat leader. A color carried by the leader wins.
    pub fn leader_color(&self, leader: &SeatLeader) -> Option<String> {
        leader.party_color.clone().or_else(|| self.resolve(leader.party.as_str()))
    }
}

fn default_palette() -> Vec<String> { DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect() }

/// Sum over the code points of the lowercased label of each one's first
/// UTF-16 unit (the high surrogate outside the BMP), modulo `len`.
fn palette_index(label: &str, len: usize) -> usize {
    let sum: u64 = label.to_lowercase()
        .chars()
        .map(|c| u64::from(c.encode_utf16(&mut [0u16; 2])[0]))
        .sum();
    (sum % len as u64) as usize
}
