//! Error types for the GUI runtime

use crate::types::PlayerId;
use thiserror::Error;

/// Errors raised by containers, layers, modules and the session manager.
///
/// Most variants are configuration errors: they mean the embedding plugin
/// wired something up wrong. Soft absences (an empty cell, an empty history
/// stack) are never errors and come back as `None` or `false`.
#[derive(Debug, Error)]
pub enum GuiError {
    #[error("Invalid container dimensions {rows}x{cols} (max {max_rows}x{max_cols})")]
    InvalidDimensions {
        rows: usize,
        cols: usize,
        max_rows: usize,
        max_cols: usize,
    },

    #[error("Layer '{0}' already exists in this container")]
    DuplicateLayer(String),

    #[error("Layer '{0}' not found")]
    LayerNotFound(String),

    #[error("Container has no layers")]
    NoLayers,

    #[error("Coordinate ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Module '{0}' already registered")]
    DuplicateModule(String),

    #[error("Module '{0}' not found")]
    ModuleNotFound(String),

    #[error("Module '{0}' is busy running a hook")]
    ModuleBusy(String),

    #[error("Module '{id}' is not a {expected}")]
    ModuleTypeMismatch { id: String, expected: &'static str },

    #[error("Scheduler period must be at least one tick")]
    InvalidPeriod,

    #[error("Player {0} has no open container")]
    NoOpenContainer(PlayerId),

    #[error("Handler failed: {0}")]
    Handler(String),

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

impl From<String> for GuiError {
    fn from(s: String) -> Self {
        GuiError::Handler(s)
    }
}

impl From<&str> for GuiError {
    fn from(s: &str) -> Self {
        GuiError::Handler(s.to_string())
    }
}

impl GuiError {
    /// Converts a caught panic payload into an error value.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        GuiError::Panicked(message)
    }
}

pub type GuiResult<T> = Result<T, GuiError>;
