//! Tuning method vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a parameter configuration was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TuningMethod {
    /// Suggested by an external AI advisor.
    Ai,
    /// Found by exhaustive grid search.
    Grid,
    /// Entered by hand.
    Manual,
}

impl TuningMethod {
    /// Selection priority among equally valid cache records: ai beats grid
    /// beats manual.
    pub fn priority(&self) -> u8 {
        match self {
            TuningMethod::Ai => 2,
            TuningMethod::Grid => 1,
            TuningMethod::Manual => 0,
        }
    }

    /// All methods, highest priority first.
    pub fn by_priority() -> [TuningMethod; 3] {
        [TuningMethod::Ai, TuningMethod::Grid, TuningMethod::Manual]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TuningMethod::Ai => "ai",
            TuningMethod::Grid => "grid",
            TuningMethod::Manual => "manual",
        }
    }
}

impl fmt::Display for TuningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TuningMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ai" => Ok(TuningMethod::Ai),
            "grid" => Ok(TuningMethod::Grid),
            "manual" => Ok(TuningMethod::Manual),
            other => Err(format!("unknown tuning method '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(TuningMethod::Ai.priority() > TuningMethod::Grid.priority());
        assert!(TuningMethod::Grid.priority() > TuningMethod::Manual.priority());
    }

    #[test]
    fn test_by_priority_is_descending() {
        let methods = TuningMethod::by_priority();
        assert!(methods.windows(2).all(|w| w[0].priority() > w[1].priority()));
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(serde_json::to_string(&TuningMethod::Ai).unwrap(), r#""ai""#);
        let parsed: TuningMethod = serde_json::from_str(r#""grid""#).unwrap();
        assert_eq!(parsed, TuningMethod::Grid);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("AI".parse::<TuningMethod>(), Ok(TuningMethod::Ai));
        assert_eq!(" manual ".parse::<TuningMethod>(), Ok(TuningMethod::Manual));
        assert!("bayes".parse::<TuningMethod>().is_err());
    }
}
