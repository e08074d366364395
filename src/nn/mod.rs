// Neural Network Module for ndloss
// Loss functions and the composite loss built on top of them.

pub mod losses;

// Re-export the main types and traits for convenience
pub use losses::{
    BCELoss, CCELoss, Combine, CompositeLoss, L1Loss, Loss, LossAccumulator, LossConfig, MSELoss,
    Reduction,
};
