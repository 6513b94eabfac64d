//! Crate-level error type.

use thiserror::Error;

use crate::loader::LoadError;
use crate::options::ConfigError;
use crate::scale::ScaleError;
use crate::selection::SelectionError;
use crate::target::RenderError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Scale(#[from] ScaleError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type Result<T> = std::result::Result<T, Error>;
