//! Configuration handling for the karyo CLI
//!
//! Supports loading configuration from karyo.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use karyo_core::{WidgetOptions, CHR1_BP_END, DEFAULT_DAS_SOURCE};
use karyo_render::ExportConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub widget: WidgetConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// DAS server base URL or a local band file
    #[serde(default = "default_das_source")]
    pub das_source: String,

    /// Canvas width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Band height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Size the chromosome relative to the reference length
    #[serde(default)]
    pub relative_size: bool,

    /// Draw the base-pair axis
    #[serde(default)]
    pub include_axis: bool,

    /// Enable the range selector
    #[serde(default = "default_true")]
    pub include_selector: bool,

    /// Length that maps to the full width in relative mode
    #[serde(default = "default_reference_length")]
    pub reference_length: u64,
}

// Default value functions
fn default_das_source() -> String { DEFAULT_DAS_SOURCE.to_string() }
fn default_width() -> u32 { 900 }
fn default_height() -> u32 { 20 }
fn default_true() -> bool { true }
fn default_reference_length() -> u64 { CHR1_BP_END }

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            das_source: default_das_source(),
            width: default_width(),
            height: default_height(),
            relative_size: false,
            include_axis: false,
            include_selector: true,
            reference_length: default_reference_length(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from("karyo.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: karyo.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }

    /// Widget options for one target and segment, taken from the `[widget]` section.
    pub fn widget_options(&self, target: &str, segment: &str) -> WidgetOptions {
        let w = &self.widget;
        WidgetOptions {
            das_source: w.das_source.clone(),
            reference_length: w.reference_length,
            ..WidgetOptions::new(target, segment)
                .with_size(w.width, w.height)
                .with_relative_size(w.relative_size)
                .with_axis(w.include_axis)
                .with_selector(w.include_selector)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.widget.width, 900);
        assert_eq!(config.widget.das_source, DEFAULT_DAS_SOURCE);
        assert!(config.export.show_footer);
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.widget.include_axis = true;
        config.export.palette.acen = "#ff0000".into();
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded_config = Config::load_from_file(temp_file.path())?;

        assert_eq!(config, loaded_config);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "[widget]\nwidth = 600\n\n[export.palette]\nstalk = \"#123456\"")?;

        let config = Config::load_from_file(temp_file.path())?;
        assert_eq!(config.widget.width, 600);
        assert_eq!(config.widget.height, 20);
        assert!(config.widget.include_selector);
        assert_eq!(config.export.palette.stalk, "#123456");
        assert_eq!(config.export.palette.gneg, "#ffffff");
        Ok(())
    }

    #[test]
    fn test_widget_options_from_config() {
        let mut config = Config::default();
        config.widget.relative_size = true;
        config.widget.reference_length = 1000;
        let options = config.widget_options("#chr", "7");
        assert_eq!(options.target, "#chr");
        assert_eq!(options.segment, "7");
        assert!(options.relative_size);
        assert_eq!(options.reference_length, 1000);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_example_toml_generation() -> Result<()> {
        let example = Config::example_toml()?;
        assert!(example.contains("[widget]"));
        assert!(example.contains("[export]"));
        assert!(example.contains("[export.palette]"));
        Ok(())
    }
}
