//! Karyo Core Library
//!
//! Band models, the base-pair to pixel scale, selection handling, event
//! channel, scene layout, model loaders and the chromosome widget.

pub mod types;
pub mod scale;
pub mod selection;
pub mod events;
pub mod options;
pub mod layout;
pub mod loader;
pub mod target;
pub mod widget;
pub mod error;

// Re-export commonly used types and functions
pub use types::{Band, BandModel, BandType, GenomicPos, Selection};
pub use scale::{format_si, LinearScale, ScaleError};
pub use selection::{BrushHandle, SelectionController, SelectionError, Selector};
pub use events::{ChromosomeEvent, EventBus, EventKind, SubscriptionId};
pub use options::{ConfigError, WidgetOptions, DEFAULT_DAS_SOURCE};
pub use layout::{KaryotypeScene, CHR1_BP_END, PADDING};
pub use loader::{loader_for, parse_das_xml, DasXmlLoader, JsonModelLoader, LoadError, ModelLoader, StaticLoader};
#[cfg(feature = "http")]
pub use loader::DasHttpLoader;
pub use target::{MemoryTarget, RenderError, RenderTarget};
pub use widget::{Chromosome, DrawTicket, FailureKind, WidgetState};
pub use error::{Error, Result};

/// Version information for the karyo core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
