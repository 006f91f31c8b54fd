//! Order urgency classification.
//!
//! Maps an order's state and age to an [`UrgencyLevel`] that drives the
//! visual alerts of the orders view, and orders lists for display.
//!
//! Everything here is a pure function of its inputs. Nothing is cached, so
//! the same cached order list can be evaluated on every poll.

mod board;
mod rules;
mod sort;

pub use board::{format_elapsed, BoardRow, OrderBoard};
pub use rules::{classify, classify_order, rules_for, UrgencyRule};
pub use sort::{display_cmp, display_order, sort_for_display};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How much attention an order needs, ordered from least to most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Normal,
    Attention,
    Urgent,
    Critical,
}

impl UrgencyLevel {
    pub const ALL: [UrgencyLevel; 4] = [
        UrgencyLevel::Normal,
        UrgencyLevel::Attention,
        UrgencyLevel::Urgent,
        UrgencyLevel::Critical,
    ];

    /// Numeric level (0-3)
    pub fn as_u8(self) -> u8 {
        match self {
            UrgencyLevel::Normal => 0,
            UrgencyLevel::Attention => 1,
            UrgencyLevel::Urgent => 2,
            UrgencyLevel::Critical => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyLevel::Normal => "normal",
            UrgencyLevel::Attention => "attention",
            UrgencyLevel::Urgent => "urgent",
            UrgencyLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrgencyLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        UrgencyLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == needle)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "urgency".into(),
                message: format!("unknown urgency level '{s}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_totally_ordered() {
        assert!(UrgencyLevel::Normal < UrgencyLevel::Attention);
        assert!(UrgencyLevel::Attention < UrgencyLevel::Urgent);
        assert!(UrgencyLevel::Urgent < UrgencyLevel::Critical);
        let numeric: Vec<u8> = UrgencyLevel::ALL.iter().map(|l| l.as_u8()).collect();
        assert_eq!(numeric, vec![0, 1, 2, 3]);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&UrgencyLevel::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn parses_level_names() {
        assert_eq!("Urgent".parse::<UrgencyLevel>().unwrap(), UrgencyLevel::Urgent);
        assert!("panic".parse::<UrgencyLevel>().is_err());
    }
}
