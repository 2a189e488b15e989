//! Cache error types.

use thiserror::Error;

/// Errors from cache operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// No records have ever been stored for the (entity, model) pair.
    #[error("Unknown entry: no records for {entity}/{model}")]
    UnknownEntry { entity: String, model: String },

    /// Selection ran but no record was valid against the current data.
    #[error("No valid record for entity '{0}'")]
    NoValidRecord(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CacheError::UnknownEntry {
            entity: "sku-1".to_string(),
            model: "ses".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown entry: no records for sku-1/ses");
        assert_eq!(
            CacheError::NoValidRecord("sku-1".to_string()).to_string(),
            "No valid record for entity 'sku-1'"
        );
    }

    #[test]
    fn test_implements_std_error() {
        fn assert_std_error<E: std::error::Error>() {}
        assert_std_error::<CacheError>();
    }
}
