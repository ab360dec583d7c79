use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Party a seat leader belongs to: a party id/label, or the neutral sentinel
/// used for ties, seats without votes and declared winners without a label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartyRef {
    Neutral,
    Party(String),
}

impl PartyRef {
    pub const NEUTRAL: &'static str = "NEUTRAL";

    /// Build from an optional label; missing or blank labels are neutral.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some(l) if !l.is_empty() => PartyRef::Party(l.to_string()),
            _ => PartyRef::Neutral,
        }
    }

    #[inline] pub fn is_neutral(&self) -> bool { matches!(self, PartyRef::Neutral) }

    /// Key used for color lookups and seat tallies.
    pub fn as_str(&self) -> &str {
        match self {
            PartyRef::Neutral => Self::NEUTRAL,
            PartyRef::Party(p) => p,
        }
    }
}

impl fmt::Display for PartyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl Serialize for PartyRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PartyRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(if s == Self::NEUTRAL { PartyRef::Neutral } else { PartyRef::from_label(Some(&s)) })
    }
}

#[cfg(test)]
mod tests {
    use super::PartyRef;

    #[test]
    fn blank_labels_are_neutral() {
        assert_eq!(PartyRef::from_label(None), PartyRef::Neutral);
        assert_eq!(PartyRef::from_label(Some("   ")), PartyRef::Neutral);
        assert_eq!(PartyRef::from_label(Some(" BNP ")), PartyRef::Party("BNP".into()));
    }

    #[test]
    fn neutral_round_trips_through_its_sentinel() {
        let json = serde_json::to_string(&PartyRef::Neutral).unwrap();
        assert_eq!(json, "\"NEUTRAL\"");
        let back: PartyRef = serde_json::from_str(&json).unwrap();
        assert!(back.is_neutral());
    }
}
