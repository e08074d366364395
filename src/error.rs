//! ndloss error types

/// ndloss result type
pub type Result<T> = std::result::Result<T, LossError>;

/// Errors raised while building or evaluating losses
#[derive(Debug, thiserror::Error)]
pub enum LossError {
    /// A recorded index does not fit the label/prediction lists
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange {
        /// The requested position
        index: usize,
        /// Length of the list that was indexed
        len: usize,
    },

    /// A component position does not exist in the composite
    #[error("component {position} out of range for composite with {len} components")]
    ComponentOutOfRange {
        /// The requested component position
        position: usize,
        /// Number of components in the composite
        len: usize,
    },

    /// Labels and predictions disagree on shape
    #[error("shape mismatch: labels {labels:?}, predictions {predictions:?}")]
    ShapeMismatch {
        /// Label shape
        labels: Vec<usize>,
        /// Prediction shape
        predictions: Vec<usize>,
    },

    /// Array rank too low for the requested reduction
    #[error("expected an array of rank >= {min}, got rank {got}")]
    Rank {
        /// Minimum accepted rank
        min: usize,
        /// Rank that was supplied
        got: usize,
    },

    /// A list that needed at least one array was empty
    #[error("empty tensor list")]
    EmptyList,

    /// An array that needed at least one element was empty
    #[error("array of shape {shape:?} has no elements")]
    EmptyArray {
        /// Shape of the empty array
        shape: Vec<usize>,
    },

    /// Accumulator key was never registered
    #[error("unknown accumulator '{0}'")]
    UnknownAccumulator(String),

    /// Accumulator key has no recorded instances
    #[error("accumulator '{0}' has no recorded instances")]
    EmptyAccumulator(String),

    /// Configuration is well-formed but semantically invalid
    #[error("invalid loss configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed
    #[error("loss configuration error: {0}")]
    Config(#[from] serde_json::Error),
}
