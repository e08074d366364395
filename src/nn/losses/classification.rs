// src/nn/losses/classification.rs
// BCE and CCE losses for binary and multiclass classification tasks

use crate::error::{LossError, Result};
use crate::ndlist::NDList;
use crate::nn::losses::{Loss, LossAccumulator, Reduction, heads, scalar};
use ndarray::{ArrayD, Axis, NdFloat};

const BCE_EPSILON: f64 = 1e-7;
const CCE_EPSILON: f64 = 1e-8;

/// Binary Cross Entropy Loss: BCE = -mean(targets * log(predictions) + (1-targets) * log(1-predictions))
/// Used for binary classification where targets are in [0, 1] and predictions are probabilities
#[derive(Debug, Clone)]
pub struct BCELoss<T> {
    name: String,
    weight: T,
    reduction: Reduction,
    accumulator: LossAccumulator<T>,
}

impl<T> BCELoss<T>
where
    T: NdFloat,
{
    pub fn new(reduction: Reduction) -> Self {
        Self {
            name: "BCELoss".to_string(),
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

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }
}

impl<T> Default for BCELoss<T>
where
    T: NdFloat,
{
    fn default() -> Self {
        Self::new(Reduction::Mean)
    }
}

impl<T> Loss<T> for BCELoss<T>
where
    T: NdFloat,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, labels: &NDList<T>, predictions: &NDList<T>) -> Result<T> {
        let (label, prediction) = heads(labels, predictions)?;

        // Clip predictions to [epsilon, 1-epsilon] to avoid log(0)
        let epsilon = scalar::<T>(BCE_EPSILON);
        let one = T::one();
        let clipped = prediction.mapv(|p| p.max(epsilon).min(one - epsilon));

        let weight = self.weight;
        let mut loss = label.clone();
        loss.zip_mut_with(&clipped, |l, &p| {
            *l = -(*l * p.ln() + (one - *l) * (one - p).ln()) * weight;
        });
        self.reduction.reduce(&loss)
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

/// Categorical Cross Entropy Loss: CCE = -mean(sum(targets * log(softmax(predictions)), axis=-1))
/// Used for multiclass classification where targets are one-hot encoded and predictions are logits
#[derive(Debug, Clone)]
pub struct CCELoss<T> {
    name: String,
    weight: T,
    reduction: Reduction,
    /// Whether to apply softmax to predictions (true for logits, false for probabilities)
    from_logits: bool,
    accumulator: LossAccumulator<T>,
}

impl<T> CCELoss<T>
where
    T: NdFloat,
{
    pub fn new(reduction: Reduction, from_logits: bool) -> Self {
        Self {
            name: "CCELoss".to_string(),
            weight: T::one(),
            reduction,
            from_logits,
            accumulator: LossAccumulator::new(),
        }
    }

    /// Create CCE loss for logits (most common case)
    pub fn from_logits(reduction: Reduction) -> Self {
        Self::new(reduction, true)
    }

    /// Create CCE loss for probabilities, when softmax was already applied
    pub fn from_probabilities(reduction: Reduction) -> Self {
        Self::new(reduction, false)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_weight(mut self, weight: T) -> Self {
        self.weight = weight;
        self
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    pub fn is_from_logits(&self) -> bool {
        self.from_logits
    }
}

impl<T> Default for CCELoss<T>
where
    T: NdFloat,
{
    /// Default CCE loss expects logits and uses mean reduction
    fn default() -> Self {
        Self::from_logits(Reduction::Mean)
    }
}

impl<T> Loss<T> for CCELoss<T>
where
    T: NdFloat,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, labels: &NDList<T>, predictions: &NDList<T>) -> Result<T> {
        let (label, prediction) = heads(labels, predictions)?;
        if prediction.ndim() == 0 {
            return Err(LossError::Rank { min: 1, got: 0 });
        }
        let classes = Axis(prediction.ndim() - 1);

        let probabilities = if self.from_logits {
            softmax(prediction, classes)
        } else {
            prediction.clone()
        };

        let epsilon = scalar::<T>(CCE_EPSILON);
        let one = T::one();
        let log_probabilities = probabilities.mapv(|p| p.max(epsilon).min(one - epsilon).ln());

        // Sum across classes, leaving one value per sample
        let weight = self.weight;
        let per_sample = (label * &log_probabilities)
            .sum_axis(classes)
            .mapv(|v| -v * weight);
        self.reduction.reduce(&per_sample)
    }

    fn duplicate(&self) -> Box<dyn Loss<T>> {
        Box::new(
            Self::new(self.reduction, self.from_logits)
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

/// Numerically stable softmax along `axis`.
fn softmax<T>(logits: &ArrayD<T>, axis: Axis) -> ArrayD<T>
where
    T: NdFloat,
{
    let max = logits
        .map_axis(axis, |lane| {
            lane.fold(T::neg_infinity(), |acc, &v| acc.max(v))
        })
        .insert_axis(axis);
    let exp = (logits - &max).mapv(|v| v.exp());
    let sum = exp.sum_axis(axis).insert_axis(axis);
    &exp / &sum
}
