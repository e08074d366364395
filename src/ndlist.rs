// Ordered list of n-dimensional arrays, the container losses consume.
// Labels and predictions are both passed around as NDLists so a model with
// several heads can hand one list entry per head to the loss.

use crate::error::{LossError, Result};
use ndarray::ArrayD;
use std::ops::Deref;

/// An ordered, indexable list of `ArrayD<T>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NDList<T> {
    arrays: Vec<ArrayD<T>>,
}

impl<T> NDList<T> {
    pub fn new() -> Self {
        Self { arrays: Vec::new() }
    }

    /// Creates a list holding exactly one array.
    pub fn single(array: ArrayD<T>) -> Self {
        Self {
            arrays: vec![array],
        }
    }

    pub fn push(&mut self, array: ArrayD<T>) {
        self.arrays.push(array);
    }

    /// Bounds-checked access.
    ///
    /// # Errors
    ///
    /// Returns [`LossError::IndexOutOfRange`] when `index >= len()`.
    pub fn get(&self, index: usize) -> Result<&ArrayD<T>> {
        self.arrays.get(index).ok_or(LossError::IndexOutOfRange {
            index,
            len: self.arrays.len(),
        })
    }

    /// First array of the list, the input every single-head loss reads.
    pub fn head(&self) -> Result<&ArrayD<T>> {
        self.arrays.first().ok_or(LossError::EmptyList)
    }

    pub fn into_inner(self) -> Vec<ArrayD<T>> {
        self.arrays
    }
}

impl<T: Clone> NDList<T> {
    /// Single-element list holding a copy of the array at `index`.
    pub fn select(&self, index: usize) -> Result<Self> {
        self.get(index).map(|array| Self::single(array.clone()))
    }
}

impl<T> Deref for NDList<T> {
    type Target = [ArrayD<T>];

    fn deref(&self) -> &Self::Target {
        &self.arrays
    }
}

impl<T> From<Vec<ArrayD<T>>> for NDList<T> {
    fn from(arrays: Vec<ArrayD<T>>) -> Self {
        Self { arrays }
    }
}

impl<T> FromIterator<ArrayD<T>> for NDList<T> {
    fn from_iter<I: IntoIterator<Item = ArrayD<T>>>(iter: I) -> Self {
        Self {
            arrays: iter.into_iter().collect(),
        }
    }
}
