//! Configuration loading and management.
//!
//! This module provides the reconstruction options ([`TableConfig`]) and the
//! top-level scan configuration ([`ScanConfig`]), which can be loaded from
//! TOML, YAML, or JSON files or discovered in the project hierarchy.

use crate::{Result, TablescanError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometric reference point used to order elements within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAnchor {
    /// Left edge. Stable for right-aligned numbers whose width varies.
    #[default]
    XMin,
    /// Horizontal center of the bounding box.
    XCenter,
}

impl std::str::FromStr for ColumnAnchor {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "x_min" | "x-min" | "left" => Ok(ColumnAnchor::XMin),
            "x_center" | "x-center" | "center" => Ok(ColumnAnchor::XCenter),
            _ => Err(format!(
                "Invalid column anchor: '{}'. Must be one of: x_min, x_center",
                value
            )),
        }
    }
}

/// Options for one table reconstruction.
///
/// Immutable per invocation. Every field has a default so callers override
/// only what they need.
///
/// # Example
///
/// ```rust
/// use tablescan::{ColumnAnchor, TableConfig};
///
/// let config = TableConfig {
///     x_margin_left: 10.0,
///     column_anchor: ColumnAnchor::XCenter,
///     ..Default::default()
/// };
/// assert_eq!(config.row_threshold_factor, 0.6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Row threshold as a fraction of the median element height.
    #[serde(default = "default_row_threshold_factor")]
    pub row_threshold_factor: f64,

    /// Elements whose left edge lies below this x position are dropped.
    #[serde(default)]
    pub x_margin_left: f64,

    #[serde(default)]
    pub column_anchor: ColumnAnchor,

    /// Minimum detection confidence, on the 0-1 scale.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Promote the first row to header labels when the table has more than one row.
    #[serde(default = "default_true")]
    pub enable_header_promotion: bool,

    /// Trimmed cell values that become missing markers.
    #[serde(default = "default_missing_tokens")]
    pub missing_tokens: Vec<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_threshold_factor: default_row_threshold_factor(),
            x_margin_left: 0.0,
            column_anchor: ColumnAnchor::default(),
            confidence_threshold: default_confidence_threshold(),
            enable_header_promotion: true,
            missing_tokens: default_missing_tokens(),
        }
    }
}

impl TableConfig {
    /// Check option ranges.
    ///
    /// The engine never calls this; it treats the configuration as given.
    /// Callers validate once when loading configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.row_threshold_factor.is_finite() || self.row_threshold_factor <= 0.0 {
            return Err(TablescanError::validation(format!(
                "row_threshold_factor must be a positive number, got {}",
                self.row_threshold_factor
            )));
        }
        if !self.x_margin_left.is_finite() || self.x_margin_left < 0.0 {
            return Err(TablescanError::validation(format!(
                "x_margin_left must be a non-negative number, got {}",
                self.x_margin_left
            )));
        }
        if !self.confidence_threshold.is_finite() {
            return Err(TablescanError::validation(format!(
                "confidence_threshold must be finite, got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}

/// OCR collaborator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Backend names, tried in order until one succeeds.
    #[serde(default = "default_backends")]
    pub backends: Vec<String>,

    /// Language code (e.g., "eng", "deu")
    #[serde(default = "default_eng")]
    pub language: String,

    /// Per-image timeout for subprocess backends.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Path or name of the tesseract executable.
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backends: default_backends(),
            language: default_eng(),
            timeout_secs: default_timeout_secs(),
            tesseract_path: default_tesseract_path(),
        }
    }
}

/// Image enhancement applied before OCR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Images narrower than this are upscaled.
    #[serde(default = "default_min_width")]
    pub min_width: u32,

    /// Width that narrow images are upscaled to.
    #[serde(default = "default_target_width")]
    pub target_width: u32,

    #[serde(default = "default_true")]
    pub grayscale: bool,

    /// Linear contrast stretch to the full intensity range.
    #[serde(default = "default_true")]
    pub contrast_stretch: bool,

    /// Histogram equalization, for faded or unevenly lit cards.
    #[serde(default)]
    pub equalize: bool,

    /// 3x3 median filter against scanner speckle.
    #[serde(default = "default_true")]
    pub denoise: bool,

    /// 3x3 sharpening after denoising.
    #[serde(default = "default_true")]
    pub sharpen: bool,

    /// Otsu binarization to black text on white.
    #[serde(default = "default_true")]
    pub binarize: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            min_width: default_min_width(),
            target_width: default_target_width(),
            grayscale: true,
            contrast_stretch: true,
            equalize: false,
            denoise: true,
            sharpen: true,
            binarize: true,
        }
    }
}

/// Main scan configuration.
///
/// ```rust
/// use tablescan::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert_eq!(config.ocr.backends, vec!["tesseract".to_string()]);
/// // let config = ScanConfig::from_toml_file("tablescan.toml")?;
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub table: TableConfig,

    #[serde(default)]
    pub ocr: OcrConfig,

    /// Preprocessing configuration (None = images go to OCR untouched)
    #[serde(default)]
    pub preprocessing: Option<PreprocessingConfig>,

    /// Maximum concurrent scans in batch operations (None = num_cpus * 2).
    #[serde(default)]
    pub max_concurrent_scans: Option<usize>,
}

fn default_true() -> bool {
    true
}
fn default_row_threshold_factor() -> f64 {
    0.6
}
fn default_confidence_threshold() -> f64 {
    0.3
}
fn default_missing_tokens() -> Vec<String> {
    crate::table::DEFAULT_MISSING_TOKENS
        .iter()
        .map(|token| token.to_string())
        .collect()
}
fn default_backends() -> Vec<String> {
    vec!["tesseract".to_string()]
}
fn default_eng() -> String {
    "eng".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_tesseract_path() -> String {
    "tesseract".to_string()
}
fn default_min_width() -> u32 {
    1000
}
fn default_target_width() -> u32 {
    1500
}

impl ScanConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `TablescanError::Validation` if the file can't be read, is
    /// invalid TOML, or holds out-of-range table options.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| TablescanError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.table.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| TablescanError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.table.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| TablescanError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.table.validate()?;
        Ok(config)
    }

    /// Load configuration, picking the format from the file extension.
    ///
    /// Unknown extensions are read as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `tablescan.toml` in the current directory and its parents.
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(TablescanError::Io)?;

        loop {
            let candidate = current.join("tablescan.toml");
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| TablescanError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_table_config() {
        let config = TableConfig::default();
        assert_eq!(config.row_threshold_factor, 0.6);
        assert_eq!(config.x_margin_left, 0.0);
        assert_eq!(config.column_anchor, ColumnAnchor::XMin);
        assert!(config.enable_header_promotion);
        assert_eq!(config.missing_tokens.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_factor() {
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = TableConfig {
                row_threshold_factor: factor,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "factor {} accepted", factor);
        }
    }

    #[test]
    fn test_validate_rejects_negative_margin() {
        let config = TableConfig {
            x_margin_left: -5.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("x_margin_left"));
    }

    #[test]
    fn test_column_anchor_from_str() {
        assert_eq!("x_min".parse::<ColumnAnchor>().unwrap(), ColumnAnchor::XMin);
        assert_eq!("x_center".parse::<ColumnAnchor>().unwrap(), ColumnAnchor::XCenter);
        assert!("middle".parse::<ColumnAnchor>().is_err());
    }

    #[test]
    fn test_from_toml_file_partial_override() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("tablescan.toml");

        fs::write(
            &config_path,
            r#"
max_concurrent_scans = 4

[table]
x_margin_left = 10.0
row_threshold_factor = 0.7
column_anchor = "x_center"

[ocr]
backends = ["tesseract", "paddle"]
        "#,
        )
        .unwrap();

        let config = ScanConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(config.table.x_margin_left, 10.0);
        assert_eq!(config.table.row_threshold_factor, 0.7);
        assert_eq!(config.table.column_anchor, ColumnAnchor::XCenter);
        assert_eq!(config.table.confidence_threshold, 0.3);
        assert_eq!(config.ocr.backends.len(), 2);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.max_concurrent_scans, Some(4));
        assert!(config.preprocessing.is_none());
    }

    #[test]
    fn test_from_toml_file_rejects_invalid_table_options() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("tablescan.toml");
        fs::write(&config_path, "[table]\nrow_threshold_factor = -0.5\n").unwrap();

        let result = ScanConfig::from_toml_file(&config_path);
        assert!(matches!(result, Err(TablescanError::Validation { .. })));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("tablescan.yaml");
        fs::write(
            &config_path,
            "table:\n  enable_header_promotion: false\npreprocessing:\n  binarize: false\n",
        )
        .unwrap();

        let config = ScanConfig::from_file(&config_path).unwrap();
        assert!(!config.table.enable_header_promotion);
        let preprocessing = config.preprocessing.unwrap();
        assert!(!preprocessing.binarize);
        assert!(preprocessing.denoise && preprocessing.sharpen);
        assert!(!preprocessing.equalize);
        assert_eq!(preprocessing.target_width, 1500);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("tablescan.json");
        fs::write(&config_path, r#"{"table": {"missing_tokens": ["n/a"]}}"#).unwrap();

        let config = ScanConfig::from_file(&config_path).unwrap();
        assert_eq!(config.table.missing_tokens, vec!["n/a".to_string()]);
    }

    #[test]
    fn test_missing_file_is_validation_error() {
        let result = ScanConfig::from_toml_file("/nonexistent/tablescan.toml");
        assert!(matches!(result, Err(TablescanError::Validation { .. })));
    }

    #[test]
    #[serial]
    fn test_discover_tablescan_toml() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("scans").join("2024");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("tablescan.toml"), "[table]\nx_margin_left = 15.0\n").unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&nested).unwrap();

        let result = std::panic::catch_unwind(|| {
            let config = ScanConfig::discover().unwrap();
            assert_eq!(config.unwrap().table.x_margin_left, 15.0);
        });

        std::env::set_current_dir(&original_dir).unwrap();

        if let Err(e) = result {
            std::panic::resume_unwind(e);
        }
    }
}
