//! Error types for animation tasks

use motif_core::SignalError;
use thiserror::Error;

/// Errors raised while stepping an animation task
#[derive(Error, Debug)]
pub enum AnimationError {
    /// Reading or writing the animated signal failed
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// A higher-level tween target (for example a scene node) failed
    #[error("animation target failed: {0}")]
    Target(Box<dyn std::error::Error>),
}

/// Result type for animation operations
pub type AnimationResult<T> = std::result::Result<T, AnimationError>;
