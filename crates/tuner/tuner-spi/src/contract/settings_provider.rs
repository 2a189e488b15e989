//! Global settings lookup.

use std::collections::HashMap;

/// Key holding the organization-wide seasonal period.
pub const SEASONAL_PERIODS_KEY: &str = "global_seasonalPeriods";

/// Key holding the organization-wide data frequency.
pub const FREQUENCY_KEY: &str = "global_frequency";

/// Read-only access to organization-level settings.
///
/// Values come back raw; parsing and its diagnostics belong to the
/// consumer, so a malformed stored value can be reported at the point of
/// use.
pub trait SettingsProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// Provider with no settings; every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSettings;

impl SettingsProvider for NoSettings {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
}

/// In-memory provider for tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct InMemorySettings {
    entries: HashMap<String, String>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl SettingsProvider for InMemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_settings_always_misses() {
        assert_eq!(NoSettings.get(SEASONAL_PERIODS_KEY), None);
    }

    #[test]
    fn test_in_memory_settings() {
        let settings = InMemorySettings::new().with(SEASONAL_PERIODS_KEY, "7");
        assert_eq!(settings.get(SEASONAL_PERIODS_KEY), Some("7".to_string()));
        assert_eq!(settings.get(FREQUENCY_KEY), None);
    }
}
