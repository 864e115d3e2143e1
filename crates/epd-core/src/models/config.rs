//! Configuration structures for the bill pipeline.

use serde::{Deserialize, Serialize};

/// Default label for documents without a recognized period.
pub const UNKNOWN_PERIOD_LABEL: &str = "Н/Д";

/// Main configuration for the epd pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EpdConfig {
    /// PDF text acquisition configuration.
    pub pdf: PdfConfig,

    /// Bill extraction configuration.
    pub extraction: ExtractionConfig,

    /// Selection and export configuration.
    pub export: ExportConfig,
}

/// PDF text acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum trimmed text length to treat a document as non-empty.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 1 }
    }
}

/// Bill extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum length of a fallback item name, in characters.
    pub max_name_length: usize,

    /// Report disagreement between printed and computed totals as warnings.
    pub warn_on_total_mismatch: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_name_length: 50,
            warn_on_total_mismatch: true,
        }
    }
}

/// Selection and export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Label used for documents without a recognized period.
    pub unknown_period_label: String,

    /// Initial state of the insurance inclusion flag.
    pub include_insurance: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            unknown_period_label: UNKNOWN_PERIOD_LABEL.to_string(),
            include_insurance: false,
        }
    }
}

impl EpdConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EpdConfig =
            serde_json::from_str(r#"{"export": {"include_insurance": true}}"#).unwrap();

        assert!(config.export.include_insurance);
        assert_eq!(config.export.unknown_period_label, UNKNOWN_PERIOD_LABEL);
        assert_eq!(config.extraction.max_name_length, 50);
        assert_eq!(config.pdf.min_text_length, 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = EpdConfig::default();
        config.extraction.max_name_length = 30;
        config.save(&path).unwrap();

        let loaded = EpdConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.max_name_length, 30);
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = EpdConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
