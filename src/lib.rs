//! # ndloss
//!
//! Loss functions for training neural networks over lists of `ndarray` arrays,
//! with a composite loss that adds several losses into one training signal.
//!
//! ## Features
//!
//! - `NDList`: the ordered list of arrays labels and predictions travel in
//! - Regression and classification losses (L1, MSE, BCE, CCE)
//! - `CompositeLoss`: route the whole lists, or a single entry, to each component
//! - Per-loss accumulators for running averages during training
//! - JSON loss configuration
//! - Written 100% in safe Rust
//!
pub mod error;
pub mod ndlist;
pub mod nn;

// Re-export commonly used types for convenience
pub use error::{LossError, Result};
pub use ndlist::NDList;
pub use nn::losses::{CompositeLoss, Loss};
