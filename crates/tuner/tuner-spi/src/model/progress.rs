//! Progress channel events.

use serde::{Deserialize, Serialize};

/// Emitted after each evaluated combination during a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchProgress {
    /// Model whose combination just finished.
    pub model_id: String,
    /// Combinations evaluated so far, across all models.
    pub completed: usize,
    /// Total combinations the search will evaluate.
    pub total: usize,
    /// `completed * 100 / total`, saturating at 100.
    pub percent: u8,
}

impl SearchProgress {
    pub fn new(model_id: impl Into<String>, completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            (completed * 100 / total).min(100) as u8
        };
        Self {
            model_id: model_id.into(),
            completed,
            total,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_computation() {
        assert_eq!(SearchProgress::new("ses", 0, 8).percent, 0);
        assert_eq!(SearchProgress::new("ses", 2, 8).percent, 25);
        assert_eq!(SearchProgress::new("ses", 8, 8).percent, 100);
    }

    #[test]
    fn test_percent_guards_zero_total() {
        assert_eq!(SearchProgress::new("ses", 0, 0).percent, 0);
    }
}
