//! Widget initialisation options.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::{CHR1_BP_END, PADDING};

pub const DEFAULT_DAS_SOURCE: &str = "http://www.ensembl.org/das/Homo_sapiens.GRCh38.karyotype";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required option: {0}")]
    Missing(&'static str),
    #[error("Width must exceed the {padding}px padding (got {width})")]
    WidthTooSmall { width: u32, padding: u32 },
    #[error("Height must be positive")]
    ZeroHeight,
    #[error("Reference length must be positive")]
    ZeroReferenceLength,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    /// Render target selector.
    pub target: String,

    /// Genomic segment (chromosome) identifier.
    pub segment: String,

    #[serde(default = "default_das_source")]
    pub das_source: String,

    #[serde(default = "default_width")]
    pub width: u32,

    /// Height of the band rectangles; the canvas adds padding above and below.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Scale the drawn width by `model.stop / reference_length`.
    #[serde(default)]
    pub relative_size: bool,

    #[serde(default)]
    pub include_axis: bool,

    #[serde(default = "default_true")]
    pub include_selector: bool,

    #[serde(default = "default_reference_length")]
    pub reference_length: u64,
}

fn default_das_source() -> String { DEFAULT_DAS_SOURCE.to_string() }
fn default_width() -> u32 { 900 }
fn default_height() -> u32 { 20 }
fn default_true() -> bool { true }
fn default_reference_length() -> u64 { CHR1_BP_END }

impl WidgetOptions {
    pub fn new(target: impl Into<String>, segment: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            segment: segment.into(),
            das_source: default_das_source(),
            width: default_width(),
            height: default_height(),
            relative_size: false,
            include_axis: false,
            include_selector: true,
            reference_length: default_reference_length(),
        }
    }

    pub fn with_das_source(mut self, source: impl Into<String>) -> Self {
        self.das_source = source.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_relative_size(mut self, relative: bool) -> Self {
        self.relative_size = relative;
        self
    }

    pub fn with_axis(mut self, include: bool) -> Self {
        self.include_axis = include;
        self
    }

    pub fn with_selector(mut self, include: bool) -> Self {
        self.include_selector = include;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.trim().is_empty() {
            return Err(ConfigError::Missing("target"));
        }
        if self.segment.trim().is_empty() {
            return Err(ConfigError::Missing("segment"));
        }
        if self.width as f64 <= PADDING {
            return Err(ConfigError::WidthTooSmall {
                width: self.width,
                padding: PADDING as u32,
            });
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if self.reference_length == 0 {
            return Err(ConfigError::ZeroReferenceLength);
        }
        Ok(())
    }
}
