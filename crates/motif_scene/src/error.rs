//! Error types for scene operations

use motif_animation::AnimationError;
use motif_core::SignalError;
use thiserror::Error;

use crate::scene::NodeId;

/// Errors raised by the scene graph
#[derive(Error, Debug)]
pub enum SceneError {
    /// A node property failed to resolve
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// The handle refers to a node that was disposed
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),

    /// Attaching would make a node its own ancestor
    #[error("cannot attach {child:?} to {parent:?}: the parent is inside the child's subtree")]
    HierarchyCycle { parent: NodeId, child: NodeId },

    /// The config file could not be read
    #[error("failed to read scene config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for a scene
    #[error("invalid scene config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for scene operations
pub type SceneResult<T> = std::result::Result<T, SceneError>;

/// Formulas report scene failures through the signal error channel
impl From<SceneError> for SignalError {
    fn from(error: SceneError) -> Self {
        match error {
            SceneError::Signal(error) => error,
            other => SignalError::evaluation(other.to_string()),
        }
    }
}

impl From<SceneError> for AnimationError {
    fn from(error: SceneError) -> Self {
        match error {
            SceneError::Signal(error) => AnimationError::Signal(error),
            other => AnimationError::Target(Box::new(other)),
        }
    }
}
