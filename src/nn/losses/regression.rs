// src/nn/losses/regression.rs
// Regression losses evaluated directly on the first label/prediction arrays.

use crate::error::Result;
use crate::ndlist::NDList;
use crate::nn::losses::{Loss, LossAccumulator, Reduction, heads};
use ndarray::NdFloat;

/// L1 Loss (Mean Absolute Error): L1 = mean(weight * |predictions - targets|)
/// More robust to outliers than MSE, used in regression tasks
#[derive(Debug, Clone)]
pub struct L1Loss<T> {
    name: String,
    weight: T,
    reduction: Reduction,
    accumulator: LossAccumulator<T>,
}

impl<T> L1Loss<T>
where
    T: NdFloat,
{
    pub fn new(reduction: Reduction) -> Self {
        Self {
            name: "L1Loss".to_string(),
            weight: T::one(),
            reduction,
            accumulator: LossAccumulator::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Scales every element of the loss before reduction.
    pub fn with_weight(mut self, weight: T) -> Self {
        self.weight = weight;
        self
    }

    pub fn weight(&self) -> T {
        self.weight
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }
}

impl<T> Default for L1Loss<T>
where
    T: NdFloat,
{
    fn default() -> Self {
        Self::new(Reduction::Mean)
    }
}

impl<T> Loss<T> for L1Loss<T>
where
    T: NdFloat,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, labels: &NDList<T>, predictions: &NDList<T>) -> Result<T> {
        let (label, prediction) = heads(labels, predictions)?;
        let weight = self.weight;
        let abs_diff = (prediction - label).mapv(|d| d.abs() * weight);
        self.reduction.reduce(&abs_diff)
    }

    fn duplicate(&self) -> Box<dyn Loss<T>> {
        Box::new(
            Self::new(self.reduction)
                .with_name(self.name.clone())
                .with_weight(self.weight),
        )
    }

    fn accumulator(&self) -> &LossAccumulator<T> {
        &self.accumulator
    }

    fn accumulator_mut(&mut self) -> &mut LossAccumulator<T> {
        &mut self.accumulator
    }
}

/// Mean Squared Error Loss: MSE = mean(weight * (predictions - targets)²)
/// Used for regression tasks where targets are continuous values
#[derive(Debug, Clone)]
pub struct MSELoss<T> {
    name: String,
    weight: T,
    reduction: Reduction,
    accumulator: LossAccumulator<T>,
}

impl<T> MSELoss<T>
where
    T: NdFloat,
{
    pub fn new(reduction: Reduction) -> Self {
        Self {
            name: "MSELoss".to_string(),
            weight: T::one(),
            reduction,
            accumulator: LossAccumulator::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_weight(mut self, weight: T) -> Self {
        self.weight = weight;
        self
    }

    pub fn weight(&self) -> T {
        self.weight
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }
}

impl<T> Default for MSELoss<T>
where
    T: NdFloat,
{
    fn default() -> Self {
        Self::new(Reduction::Mean)
    }
}

impl<T> Loss<T> for MSELoss<T>
where
    T: NdFloat,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, labels: &NDList<T>, predictions: &NDList<T>) -> Result<T> {
        let (label, prediction) = heads(labels, predictions)?;
        let weight = self.weight;
        let squared_diff = (prediction - label).mapv(|d| d * d * weight);
        self.reduction.reduce(&squared_diff)
    }

    fn duplicate(&self) -> Box<dyn Loss<T>> {
        Box::new(
            Self::new(self.reduction)
                .with_name(self.name.clone())
                .with_weight(self.weight),
        )
    }

    fn accumulator(&self) -> &LossAccumulator<T> {
        &self.accumulator
    }

    fn accumulator_mut(&mut self) -> &mut LossAccumulator<T> {
        &mut self.accumulator
    }
}
