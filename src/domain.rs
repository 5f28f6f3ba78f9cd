use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::KiraError;

/// Decimal panel revision such as `0.1` or `1.10`.
///
/// Ordering is numeric on the decimal value, so `0.12 < 0.2` and `1.0 == 1`.
/// The fractional part is stored without trailing zeros, which makes the
/// derived lexicographic ordering on the digit string match numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelVersion {
    whole: u64,
    fraction: String,
}

impl PanelVersion {
    pub fn new(whole: u64, fraction: &str) -> Result<Self, KiraError> {
        if !fraction.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(KiraError::InvalidVersion(format!("{whole}.{fraction}")));
        }
        Ok(Self {
            whole,
            fraction: fraction.trim_end_matches('0').to_string(),
        })
    }
}

impl fmt::Display for PanelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fraction.is_empty() {
            write!(f, "{}.0", self.whole)
        } else {
            write!(f, "{}.{}", self.whole, self.fraction)
        }
    }
}

impl FromStr for PanelVersion {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if whole.is_empty() || !whole.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(KiraError::InvalidVersion(value.to_string()));
        }
        let whole = whole
            .parse::<u64>()
            .map_err(|_| KiraError::InvalidVersion(value.to_string()))?;
        Self::new(whole, fraction).map_err(|_| KiraError::InvalidVersion(value.to_string()))
    }
}

impl Serialize for PanelVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    High,
    Moderate,
    Low,
}

impl Tier {
    pub const RETAINED: [Tier; 2] = [Tier::Moderate, Tier::High];

    pub fn label(self) -> &'static str {
        match self {
            Tier::High => "Green",
            Tier::Moderate => "Amber",
            Tier::Low => "Red",
        }
    }

    pub fn from_confidence(value: &str) -> Option<Self> {
        match value {
            "HighEvidence" => Some(Tier::High),
            "ModerateEvidence" => Some(Tier::Moderate),
            "LowEvidence" => Some(Tier::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tier {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Green" => Ok(Tier::High),
            "Amber" => Ok(Tier::Moderate),
            "Red" => Ok(Tier::Low),
            other => Err(KiraError::InvalidTier(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PanelId(String);

impl PanelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PanelId {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.contains('_') || trimmed.contains(':') {
            return Err(KiraError::SnapshotParse {
                line: 0,
                message: format!("invalid panel id '{value}'"),
            });
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PanelTierKey(String);

impl PanelTierKey {
    pub fn new(panel_id: &PanelId, tier: Tier) -> Self {
        Self(format!("{}_{}", panel_id.as_str(), tier.label()))
    }

    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelTierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn sanitize_panel_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() || name.contains(['\n', '\r']) {
        return None;
    }
    Some(name.replace('_', "-"))
}

pub fn panel_tier_name(name: &str, tier: Tier) -> String {
    format!("{name}_{}", tier.label())
}

pub fn panel_label(name: &str, tier: Tier, version: &PanelVersion) -> String {
    format!("{}_{version}", panel_tier_name(name, tier))
}
