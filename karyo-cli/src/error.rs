//! Error handling for the karyo CLI

use karyo_core::{ConfigError, Error as CoreError};
use thiserror::Error;

/// Main error type for karyo CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Could not load segment {segment}: {message}")]
    Load { segment: String, message: String },

    #[error("Unknown band {band} on segment {segment}")]
    UnknownBand { segment: String, band: String },

    #[error("Invalid selection '{range}': {message}")]
    Selection { range: String, message: String },

    #[error("Rendering error: {message}")]
    Rendering { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn load<S: Into<String>>(segment: S, message: S) -> Self {
        Self::Load {
            segment: segment.into(),
            message: message.into(),
        }
    }

    pub fn unknown_band<S: Into<String>>(segment: S, band: S) -> Self {
        Self::UnknownBand {
            segment: segment.into(),
            band: band.into(),
        }
    }

    pub fn selection<S: Into<String>>(range: S, message: S) -> Self {
        Self::Selection {
            range: range.into(),
            message: message.into(),
        }
    }

    pub fn rendering<S: Into<String>>(message: S) -> Self {
        Self::Rendering { message: message.into() }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::config(err.to_string())
    }
}

/// Map a widget construction failure onto the CLI error for `segment`.
pub fn widget_error(segment: &str, err: CoreError) -> CliError {
    match err {
        CoreError::Config(e) => e.into(),
        CoreError::Load(e) => CliError::load(segment.to_string(), e.to_string()),
        other => CliError::rendering(other.to_string()),
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your karyo.toml configuration file\n\
                 • Use 'karyo config' to print a sample configuration",
            );
        }

        CliError::Load { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check the --input path or DAS server URL\n\
                 • Segment ids are usually bare chromosome names such as '1' or 'X'",
            );
        }

        CliError::UnknownBand { .. } => {
            message.push_str("\n\nSuggestions:\n • Use 'karyo bands' to list the bands of a segment");
        }

        CliError::Selection { .. } => {
            message.push_str("\n\nSuggestions:\n • Use START-END in base pairs, e.g. --select 100000-250000");
        }

        CliError::Rendering { .. } => {}
    }

    message
}

/// Parse a `START-END` base-pair range.
pub fn parse_range(range: &str) -> CliResult<(f64, f64)> {
    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| CliError::selection(range, "expected START-END"))?;
    let parse = |s: &str| {
        s.trim()
            .replace('_', "")
            .parse::<f64>()
            .map_err(|e| CliError::selection(range.to_string(), format!("{}: {}", s.trim(), e)))
    };
    let (start, end) = (parse(start)?, parse(end)?);
    if start > end {
        return Err(CliError::selection(range, "start is greater than end"));
    }
    Ok((start, end))
}
