//! Matching, scaling and unscaled-image policy enumerations.
//!
//! All three are closed sets. Text parsing is case-insensitive and rejects
//! unknown values with [`ContractError::InvalidMode`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Longest-edge bound used by [`ScalingMode::LongestEdge1600`]
pub const LONGEST_EDGE_LIMIT: u32 = 1600;

/// Feature matching strategy for stage 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    #[default]
    Exhaustive,
    Sequential,
    Spatial,
}

impl MatchingMode {
    pub const ALL: [MatchingMode; 3] = [Self::Exhaustive, Self::Sequential, Self::Spatial];

    /// COLMAP subcommand implementing this strategy
    pub fn matcher_subcommand(self) -> &'static str {
        match self {
            Self::Exhaustive => "exhaustive_matcher",
            Self::Sequential => "sequential_matcher",
            Self::Spatial => "spatial_matcher",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Exhaustive => "Exhaustive",
            Self::Sequential => "Sequential",
            Self::Spatial => "Spatial",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Exhaustive => "exhaustive",
            Self::Sequential => "sequential",
            Self::Spatial => "spatial",
        }
    }
}

impl fmt::Display for MatchingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MatchingMode {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.key() == wanted)
            .ok_or_else(|| ContractError::InvalidMode {
                kind: "matching",
                value: s.to_string(),
                expected: Self::ALL.iter().map(|m| m.key()).collect(),
            })
    }
}

/// Pre-scaler resize selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    #[default]
    NoScaling,
    Half,
    Quarter,
    Eighth,
    #[serde(rename = "longest_edge_1600")]
    LongestEdge1600,
}

impl ScalingMode {
    pub const ALL: [ScalingMode; 5] = [
        Self::NoScaling,
        Self::Half,
        Self::Quarter,
        Self::Eighth,
        Self::LongestEdge1600,
    ];

    /// Geometry argument for `convert -resize`, `None` for [`ScalingMode::NoScaling`]
    ///
    /// The trailing `>` on the long-edge geometry only shrinks images that
    /// exceed the bound and keeps the aspect ratio.
    pub fn resize_geometry(self) -> Option<String> {
        match self {
            Self::NoScaling => None,
            Self::Half => Some("50%".to_string()),
            Self::Quarter => Some("25%".to_string()),
            Self::Eighth => Some("12.5%".to_string()),
            Self::LongestEdge1600 => Some(format!("{LONGEST_EDGE_LIMIT}x{LONGEST_EDGE_LIMIT}>")),
        }
    }

    pub fn is_noop(self) -> bool {
        matches!(self, Self::NoScaling)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NoScaling => "No scaling",
            Self::Half => "Half (50%)",
            Self::Quarter => "Quarter (25%)",
            Self::Eighth => "Eighth (12.5%)",
            Self::LongestEdge1600 => "Longest edge 1600px",
        }
    }

    fn keys(self) -> &'static [&'static str] {
        match self {
            Self::NoScaling => &["no_scaling", "none", "no-scaling"],
            Self::Half => &["half", "50%"],
            Self::Quarter => &["quarter", "25%"],
            Self::Eighth => &["eighth", "12.5%"],
            Self::LongestEdge1600 => &["longest_edge_1600", "longest-edge-1600", "1600"],
        }
    }
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScalingMode {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.keys().contains(&wanted.as_str()))
            .ok_or_else(|| ContractError::InvalidMode {
                kind: "scaling",
                value: s.to_string(),
                expected: Self::ALL.iter().map(|m| m.keys()[0]).collect(),
            })
    }
}

/// What the pre-scaler does with images already within the long-edge bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscaledPolicy {
    /// Send every image through the resize tool
    #[default]
    Reencode,
    /// Copy small images byte-for-byte
    Copy,
    /// Leave small images out of the working set
    Omit,
}

impl UnscaledPolicy {
    pub const ALL: [UnscaledPolicy; 3] = [Self::Reencode, Self::Copy, Self::Omit];

    fn key(self) -> &'static str {
        match self {
            Self::Reencode => "reencode",
            Self::Copy => "copy",
            Self::Omit => "omit",
        }
    }
}

impl fmt::Display for UnscaledPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for UnscaledPolicy {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|policy| policy.key() == wanted)
            .ok_or_else(|| ContractError::InvalidMode {
                kind: "unscaled policy",
                value: s.to_string(),
                expected: Self::ALL.iter().map(|p| p.key()).collect(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_mode_maps_to_distinct_matchers() {
        assert_eq!(MatchingMode::Exhaustive.matcher_subcommand(), "exhaustive_matcher");
        assert_eq!(MatchingMode::Sequential.matcher_subcommand(), "sequential_matcher");
        assert_eq!(MatchingMode::Spatial.matcher_subcommand(), "spatial_matcher");
    }

    #[test]
    fn matching_mode_parse_is_case_insensitive() {
        assert_eq!("Spatial".parse::<MatchingMode>().unwrap(), MatchingMode::Spatial);
        assert_eq!("SEQUENTIAL".parse::<MatchingMode>().unwrap(), MatchingMode::Sequential);
        assert_eq!(" exhaustive ".parse::<MatchingMode>().unwrap(), MatchingMode::Exhaustive);
    }

    #[test]
    fn matching_mode_rejects_unknown() {
        let err = "vocab_tree".parse::<MatchingMode>().unwrap_err();
        assert!(matches!(err, ContractError::InvalidMode { kind: "matching", .. }));
    }

    #[test]
    fn scaling_geometries() {
        assert_eq!(ScalingMode::NoScaling.resize_geometry(), None);
        assert_eq!(ScalingMode::Half.resize_geometry().as_deref(), Some("50%"));
        assert_eq!(ScalingMode::Quarter.resize_geometry().as_deref(), Some("25%"));
        assert_eq!(ScalingMode::Eighth.resize_geometry().as_deref(), Some("12.5%"));
        assert_eq!(
            ScalingMode::LongestEdge1600.resize_geometry().as_deref(),
            Some("1600x1600>")
        );
    }

    #[test]
    fn scaling_mode_aliases() {
        assert_eq!("none".parse::<ScalingMode>().unwrap(), ScalingMode::NoScaling);
        assert_eq!("50%".parse::<ScalingMode>().unwrap(), ScalingMode::Half);
        assert_eq!("1600".parse::<ScalingMode>().unwrap(), ScalingMode::LongestEdge1600);
        assert!("third".parse::<ScalingMode>().is_err());
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&ScalingMode::LongestEdge1600).unwrap();
        assert_eq!(json, "\"longest_edge_1600\"");
        let mode: MatchingMode = serde_json::from_str("\"spatial\"").unwrap();
        assert_eq!(mode, MatchingMode::Spatial);
        let policy: UnscaledPolicy = serde_json::from_str("\"omit\"").unwrap();
        assert_eq!(policy, UnscaledPolicy::Omit);
    }
}
