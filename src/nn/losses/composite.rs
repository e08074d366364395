// src/nn/losses/composite.rs
// Composite loss: several losses summed (or averaged) into one training signal.
// Each component either sees the full label/prediction lists or only the
// entry at one index, which lets a multi-head model train every head with its
// own loss in a single optimization step.

use crate::error::{LossError, Result};
use crate::ndlist::NDList;
use crate::nn::losses::{Loss, LossAccumulator, scalar};
use log::{debug, trace};
use ndarray::NdFloat;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Labels and predictions routed to one component.
pub type Routed<'a, T> = (Cow<'a, NDList<T>>, Cow<'a, NDList<T>>);

/// How component results are combined into the composite value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    /// Add component losses together
    #[default]
    Sum,
    /// Average component losses
    Mean,
}

impl Combine {
    /// Combines per-component values. An empty slice yields zero.
    pub fn apply<T>(self, values: &[T]) -> T
    where
        T: NdFloat,
    {
        let total = values.iter().fold(T::zero(), |acc, &v| acc + v);
        match self {
            Combine::Sum => total,
            Combine::Mean if values.is_empty() => T::zero(),
            Combine::Mean => total / scalar(values.len() as f64),
        }
    }
}

/// Evaluates every component on the inputs `route` selects for it and
/// combines the results.
///
/// `route` receives the component position and the full lists. The first
/// error from routing or evaluation is returned as is.
pub fn aggregate<T, R>(
    components: &[Box<dyn Loss<T>>],
    labels: &NDList<T>,
    predictions: &NDList<T>,
    route: R,
    combine: Combine,
) -> Result<T>
where
    T: NdFloat,
    R: for<'a> Fn(usize, &'a NDList<T>, &'a NDList<T>) -> Result<Routed<'a, T>>,
{
    let mut values = Vec::with_capacity(components.len());
    for (position, component) in components.iter().enumerate() {
        let (component_labels, component_predictions) = route(position, labels, predictions)?;
        let value = component.evaluate(&component_labels, &component_predictions)?;
        trace!("{} [{}] = {}", component.name(), position, value);
        values.push(value);
    }
    Ok(combine.apply(&values))
}

/// Selects the inputs for a component recorded with `index`.
fn route<'a, T>(
    index: Option<usize>,
    labels: &'a NDList<T>,
    predictions: &'a NDList<T>,
) -> Result<Routed<'a, T>>
where
    T: NdFloat,
{
    match index {
        None => Ok((Cow::Borrowed(labels), Cow::Borrowed(predictions))),
        Some(index) => Ok((
            Cow::Owned(labels.select(index)?),
            Cow::Owned(predictions.select(index)?),
        )),
    }
}

/// A loss combining several component losses.
///
/// Components added with [`CompositeLoss::add_component`] receive the full
/// label and prediction lists; components added with
/// [`CompositeLoss::add_component_at`] receive single-element lists holding
/// only the entry at their index. Indices are checked when the loss is
/// evaluated, since list sizes are unknown until then.
///
/// ```rust
/// use ndarray::arr1;
/// use ndloss::NDList;
/// use ndloss::nn::losses::{CompositeLoss, L1Loss, Loss, MSELoss};
///
/// let mut loss = CompositeLoss::<f64>::new();
/// loss.add_component(Box::new(L1Loss::<f64>::default()))
///     .add_component_at(Box::new(MSELoss::<f64>::default()), 1);
///
/// let labels: NDList<f64> = vec![arr1(&[1.0]).into_dyn(), arr1(&[2.0]).into_dyn()].into();
/// let predictions: NDList<f64> = vec![arr1(&[2.0]).into_dyn(), arr1(&[4.0]).into_dyn()].into();
///
/// // L1 on the first entries (1.0) plus MSE on the second entries (4.0)
/// assert_eq!(loss.evaluate(&labels, &predictions).unwrap(), 5.0);
/// ```
pub struct CompositeLoss<T> {
    name: String,
    components: Vec<Box<dyn Loss<T>>>,
    indices: Vec<Option<usize>>,
    combine: Combine,
    accumulator: LossAccumulator<T>,
}

impl<T> CompositeLoss<T>
where
    T: NdFloat,
{
    /// Creates an empty composite named `"CompositeLoss"`.
    pub fn new() -> Self {
        Self::with_name("CompositeLoss")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            indices: Vec::new(),
            combine: Combine::Sum,
            accumulator: LossAccumulator::new(),
        }
    }

    /// Sets the rule combining component values (sum by default).
    pub fn with_combine(mut self, combine: Combine) -> Self {
        self.combine = combine;
        self
    }

    /// Appends a loss that sees the full label and prediction lists.
    ///
    /// Mutates in place and returns `self` for chaining.
    pub fn add_component(&mut self, loss: Box<dyn Loss<T>>) -> &mut Self {
        self.push(loss, None)
    }

    /// Appends a loss that sees only entry `index` of the label and
    /// prediction lists.
    ///
    /// Mutates in place and returns `self` for chaining.
    pub fn add_component_at(&mut self, loss: Box<dyn Loss<T>>, index: usize) -> &mut Self {
        self.push(loss, Some(index))
    }

    /// By-value form of [`CompositeLoss::add_component`].
    pub fn with_component(mut self, loss: Box<dyn Loss<T>>) -> Self {
        self.push(loss, None);
        self
    }

    /// By-value form of [`CompositeLoss::add_component_at`].
    pub fn with_component_at(mut self, loss: Box<dyn Loss<T>>, index: usize) -> Self {
        self.push(loss, Some(index));
        self
    }

    fn push(&mut self, loss: Box<dyn Loss<T>>, index: Option<usize>) -> &mut Self {
        debug!(
            "{}: adding component {} ({}) at {:?}",
            self.name,
            self.components.len(),
            loss.name(),
            index
        );
        self.components.push(loss);
        self.indices.push(index);
        debug_assert_eq!(self.components.len(), self.indices.len());
        self
    }

    /// Labels and predictions the component at `position` consumes.
    ///
    /// Components without an index get the inputs back unchanged (borrowed,
    /// not copied). Indexed components get single-element lists.
    ///
    /// # Errors
    ///
    /// [`LossError::ComponentOutOfRange`] if `position` is not a component,
    /// [`LossError::IndexOutOfRange`] if the component's index does not fit
    /// the supplied lists.
    pub fn inputs_for<'a>(
        &self,
        position: usize,
        labels: &'a NDList<T>,
        predictions: &'a NDList<T>,
    ) -> Result<Routed<'a, T>> {
        let index = self
            .indices
            .get(position)
            .ok_or(LossError::ComponentOutOfRange {
                position,
                len: self.indices.len(),
            })?;
        route(*index, labels, predictions)
    }

    pub fn components(&self) -> &[Box<dyn Loss<T>>] {
        &self.components
    }

    /// Recorded index of every component, `None` for full-list components.
    pub fn indices(&self) -> &[Option<usize>] {
        &self.indices
    }

    pub fn combine(&self) -> Combine {
        self.combine
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Mutable access to one component, e.g. to inspect its accumulator.
    pub fn component_mut(&mut self, position: usize) -> Option<&mut (dyn Loss<T> + 'static)> {
        self.components.get_mut(position).map(|c| c.as_mut())
    }

    /// Typed form of [`Loss::duplicate`].
    ///
    /// Replays the same additions, in order, with each component's own
    /// duplicate, so the copy shares no state with `self`.
    pub fn duplicate_composite(&self) -> Self {
        let mut dup = Self::with_name(self.name.clone()).with_combine(self.combine);
        for (component, index) in self.components.iter().zip(&self.indices) {
            match index {
                Some(index) => dup.add_component_at(component.duplicate(), *index),
                None => dup.add_component(component.duplicate()),
            };
        }
        debug!("{}: duplicated {} components", self.name, dup.len());
        dup
    }
}

impl<T> Default for CompositeLoss<T>
where
    T: NdFloat,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CompositeLoss<T>
where
    T: NdFloat,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components: Vec<(&str, Option<usize>)> = self
            .components
            .iter()
            .zip(&self.indices)
            .map(|(component, index)| (component.name(), *index))
            .collect();
        f.debug_struct("CompositeLoss")
            .field("name", &self.name)
            .field("components", &components)
            .field("combine", &self.combine)
            .finish()
    }
}

impl<T> Loss<T> for CompositeLoss<T>
where
    T: NdFloat,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, labels: &NDList<T>, predictions: &NDList<T>) -> Result<T> {
        aggregate(
            &self.components,
            labels,
            predictions,
            |position, labels, predictions| self.inputs_for(position, labels, predictions),
            self.combine,
        )
    }

    fn duplicate(&self) -> Box<dyn Loss<T>> {
        Box::new(self.duplicate_composite())
    }

    fn accumulator(&self) -> &LossAccumulator<T> {
        &self.accumulator
    }

    fn accumulator_mut(&mut self) -> &mut LossAccumulator<T> {
        &mut self.accumulator
    }

    fn add_accumulator(&mut self, key: &str) {
        self.accumulator.add(key);
        for component in &mut self.components {
            component.add_accumulator(key);
        }
    }

    fn has_accumulator(&self, key: &str) -> bool {
        self.accumulator.contains(key)
            && self
                .components
                .iter()
                .all(|component| component.has_accumulator(key))
    }

    /// Updates every component with its routed inputs, then records the
    /// combined value on the composite itself.
    ///
    /// Nothing is recorded unless every component can be routed, evaluated
    /// and has `key` registered.
    fn update_accumulator(
        &mut self,
        key: &str,
        labels: &NDList<T>,
        predictions: &NDList<T>,
    ) -> Result<T> {
        if !self.has_accumulator(key) {
            return Err(LossError::UnknownAccumulator(key.to_string()));
        }
        self.evaluate(labels, predictions)?;

        let mut values = Vec::with_capacity(self.components.len());
        for (component, index) in self.components.iter_mut().zip(&self.indices) {
            let (component_labels, component_predictions) = route(*index, labels, predictions)?;
            values.push(component.update_accumulator(
                key,
                &component_labels,
                &component_predictions,
            )?);
        }
        let value = self.combine.apply(&values);
        self.accumulator.update(key, value)?;
        Ok(value)
    }

    fn reset_accumulator(&mut self, key: &str) {
        self.accumulator.reset(key);
        for component in &mut self.components {
            component.reset_accumulator(key);
        }
    }
}
