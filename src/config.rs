use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Switches a host sets when it embeds the picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Leave out "Is Empty" and "Not Empty".
    pub hide_emptiness_operators: bool,
    pub hide_time_selectors: bool,
    /// Offer "All Time", which clears the filter.
    pub include_all_time: bool,
}

impl PickerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Turns on every option set in `other`. Flags can add options, never
    /// remove ones the file enabled.
    pub fn merge(self, other: PickerConfig) -> Self {
        Self {
            hide_emptiness_operators: self.hide_emptiness_operators
                || other.hide_emptiness_operators,
            hide_time_selectors: self.hide_time_selectors || other.hide_time_selectors,
            include_all_time: self.include_all_time || other.include_all_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml() {
        let config = PickerConfig::from_yaml("include_all_time: true\n").unwrap();
        assert!(config.include_all_time);
        assert!(!config.hide_emptiness_operators);
        assert!(!config.hide_time_selectors);
    }

    #[test]
    fn test_empty_yaml() {
        assert_eq!(PickerConfig::from_yaml("").unwrap(), PickerConfig::default());
    }

    #[test]
    fn test_bad_yaml() {
        assert!(PickerConfig::from_yaml("include_all_time: [1, 2]").is_err());
    }

    #[test]
    fn test_merge_only_adds() {
        let file = PickerConfig {
            hide_time_selectors: true,
            ..PickerConfig::default()
        };
        let flags = PickerConfig {
            include_all_time: true,
            ..PickerConfig::default()
        };
        let merged = file.merge(flags);
        assert!(merged.hide_time_selectors);
        assert!(merged.include_all_time);
        assert!(!merged.hide_emptiness_operators);
    }
}
