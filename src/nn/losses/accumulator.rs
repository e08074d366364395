// Running loss totals keyed by name ("train", "validate", ...).
// Every loss owns one of these, which is why parallel workers need their own
// duplicated loss instead of a shared one.

use crate::error::{LossError, Result};
use ndarray::NdFloat;
use num_traits::NumCast;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct LossAccumulator<T> {
    entries: HashMap<String, Entry<T>>,
}

#[derive(Debug, Clone, Copy)]
struct Entry<T> {
    total: T,
    instances: usize,
}

impl<T> LossAccumulator<T>
where
    T: NdFloat,
{
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers `key`, clearing any previous totals under it.
    pub fn add(&mut self, key: &str) {
        self.entries.insert(
            key.to_string(),
            Entry {
                total: T::zero(),
                instances: 0,
            },
        );
    }

    /// Records one more loss value under `key`.
    pub fn update(&mut self, key: &str, value: T) -> Result<()> {
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| LossError::UnknownAccumulator(key.to_string()))?;
        entry.total += value;
        entry.instances += 1;
        Ok(())
    }

    /// Mean of the values recorded under `key` since it was added or reset.
    pub fn get(&self, key: &str) -> Result<T> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| LossError::UnknownAccumulator(key.to_string()))?;
        if entry.instances == 0 {
            return Err(LossError::EmptyAccumulator(key.to_string()));
        }
        // usize always converts to f32/f64
        let instances = <T as NumCast>::from(entry.instances).unwrap_or_else(T::nan);
        Ok(entry.total / instances)
    }

    /// Zeroes the totals under `key`. Unknown keys are left alone.
    pub fn reset(&mut self, key: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.total = T::zero();
            entry.instances = 0;
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn instances(&self, key: &str) -> usize {
        self.entries.get(key).map_or(0, |entry| entry.instances)
    }
}
