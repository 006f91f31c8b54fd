use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Input signals that count as the user being present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    MouseDown,
    MouseMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 6] = [
        ActivityKind::MouseDown,
        ActivityKind::MouseMove,
        ActivityKind::KeyPress,
        ActivityKind::Scroll,
        ActivityKind::TouchStart,
        ActivityKind::Click,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::MouseDown => "mousedown",
            ActivityKind::MouseMove => "mousemove",
            ActivityKind::KeyPress => "keypress",
            ActivityKind::Scroll => "scroll",
            ActivityKind::TouchStart => "touchstart",
            ActivityKind::Click => "click",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ActivityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "activity".into(),
                message: format!("unknown activity kind '{s}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_dom_events() {
        let names: Vec<String> = ActivityKind::ALL
            .iter()
            .map(|k| serde_json::to_value(k).unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["mousedown", "mousemove", "keypress", "scroll", "touchstart", "click"]
        );
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Click".parse::<ActivityKind>().unwrap(), ActivityKind::Click);
        assert_eq!("keypress".parse::<ActivityKind>().unwrap(), ActivityKind::KeyPress);
        assert!("wheel".parse::<ActivityKind>().is_err());
    }
}
