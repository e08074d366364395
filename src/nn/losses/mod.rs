pub mod accumulator;
pub mod classification;
pub mod composite;
pub mod config;
pub mod regression;

use crate::error::{LossError, Result};
use crate::ndlist::NDList;
use ndarray::{ArrayD, NdFloat};
use num_traits::NumCast;
use serde::{Deserialize, Serialize};

pub use accumulator::LossAccumulator;
pub use classification::{BCELoss, CCELoss};
pub use composite::{Combine, CompositeLoss, aggregate};
pub use config::{ComponentConfig, CompositeConfig, LossConfig};
pub use regression::{L1Loss, MSELoss};

/// Base trait for all loss functions.
///
/// A loss maps a list of labels and a list of predictions to one scalar.
/// Single-head losses read the first entry of each list; composites route
/// different entries to different components. The trait is object safe so
/// heterogeneous losses can live side by side as `Box<dyn Loss<T>>`.
///
/// Losses are `Send` but deliberately not shared: each carries an
/// accumulator, so a training worker gets its own copy via [`Loss::duplicate`].
pub trait Loss<T>: Send
where
    T: NdFloat,
{
    /// Display name of the loss
    fn name(&self) -> &str;

    /// Computes the loss value for one batch.
    fn evaluate(&self, labels: &NDList<T>, predictions: &NDList<T>) -> Result<T>;

    /// Creates an independent copy with the same configuration and fresh state.
    fn duplicate(&self) -> Box<dyn Loss<T>>;

    fn accumulator(&self) -> &LossAccumulator<T>;

    fn accumulator_mut(&mut self) -> &mut LossAccumulator<T>;

    /// Registers an accumulator key on this loss.
    fn add_accumulator(&mut self, key: &str) {
        self.accumulator_mut().add(key);
    }

    /// Evaluates the batch, records the value under `key` and returns it.
    fn update_accumulator(
        &mut self,
        key: &str,
        labels: &NDList<T>,
        predictions: &NDList<T>,
    ) -> Result<T> {
        let value = self.evaluate(labels, predictions)?;
        self.accumulator_mut().update(key, value)?;
        Ok(value)
    }

    /// Whether `key` is registered on this loss.
    fn has_accumulator(&self, key: &str) -> bool {
        self.accumulator().contains(key)
    }

    /// Mean loss recorded under `key`.
    fn get_accumulator(&self, key: &str) -> Result<T> {
        self.accumulator().get(key)
    }

    fn reset_accumulator(&mut self, key: &str) {
        self.accumulator_mut().reset(key);
    }
}

/// Loss reduction strategies - determines how batch losses are aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Average loss across batch (most common)
    #[default]
    Mean,
    /// Sum all losses in batch
    Sum,
}

impl Reduction {
    pub(crate) fn reduce<T>(self, values: &ArrayD<T>) -> Result<T>
    where
        T: NdFloat,
    {
        if values.is_empty() {
            return Err(LossError::EmptyArray {
                shape: values.shape().to_vec(),
            });
        }
        let total = values.sum();
        match self {
            Reduction::Mean => Ok(total / scalar(values.len() as f64)),
            Reduction::Sum => Ok(total),
        }
    }
}

/// Converts an f64 constant into the working float type.
// The cast cannot fail for f32/f64, the only NdFloat types.
pub(crate) fn scalar<T>(value: f64) -> T
where
    T: NdFloat,
{
    <T as NumCast>::from(value).unwrap_or_else(T::nan)
}

/// First label and first prediction, checked for equal shapes.
pub(crate) fn heads<'a, T>(
    labels: &'a NDList<T>,
    predictions: &'a NDList<T>,
) -> Result<(&'a ArrayD<T>, &'a ArrayD<T>)>
where
    T: NdFloat,
{
    let label = labels.head()?;
    let prediction = predictions.head()?;
    if label.shape() != prediction.shape() {
        return Err(LossError::ShapeMismatch {
            labels: label.shape().to_vec(),
            predictions: prediction.shape().to_vec(),
        });
    }
    Ok((label, prediction))
}
