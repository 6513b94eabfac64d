//! The seam between widget logic and drawing.

use thiserror::Error;

use crate::layout::KaryotypeScene;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid render target: {0}")]
    TargetNotFound(String),
    #[error("Rendering failed: {0}")]
    Backend(String),
}

/// Something a [`KaryotypeScene`] can be drawn into, addressed by selector.
pub trait RenderTarget {
    fn has_target(&self, selector: &str) -> bool;

    /// Replace whatever is drawn at `selector` with `scene`.
    fn present(&mut self, selector: &str, scene: &KaryotypeScene) -> Result<(), RenderError>;
}

impl<T: RenderTarget + ?Sized> RenderTarget for Box<T> {
    fn has_target(&self, selector: &str) -> bool {
        (**self).has_target(selector)
    }

    fn present(&mut self, selector: &str, scene: &KaryotypeScene) -> Result<(), RenderError> {
        (**self).present(selector, scene)
    }
}

/// Target that keeps every presented scene in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryTarget {
    selectors: Vec<String>,
    presented: Vec<(String, KaryotypeScene)>,
}

impl MemoryTarget {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
            presented: Vec::new(),
        }
    }

    pub fn presented(&self) -> &[(String, KaryotypeScene)] {
        &self.presented
    }

    pub fn last_scene(&self) -> Option<&KaryotypeScene> {
        self.presented.last().map(|(_, scene)| scene)
    }
}

impl RenderTarget for MemoryTarget {
    fn has_target(&self, selector: &str) -> bool {
        self.selectors.iter().any(|s| s == selector)
    }

    fn present(&mut self, selector: &str, scene: &KaryotypeScene) -> Result<(), RenderError> {
        if !self.has_target(selector) {
            return Err(RenderError::TargetNotFound(selector.to_string()));
        }
        self.presented.push((selector.to_string(), scene.clone()));
        Ok(())
    }
}
