// Declarative loss configuration, loadable from JSON.
//
// {
//   "type": "composite",
//   "name": "MultiHead",
//   "components": [
//     { "loss": { "type": "cce" }, "index": 0 },
//     { "loss": { "type": "mse", "weight": 0.5 }, "index": 1 }
//   ]
// }

use crate::error::{LossError, Result};
use crate::nn::losses::{
    BCELoss, CCELoss, Combine, CompositeLoss, L1Loss, Loss, MSELoss, Reduction, scalar,
};
use ndarray::NdFloat;
use serde::{Deserialize, Serialize};

fn default_weight() -> f64 {
    1.0
}

fn default_from_logits() -> bool {
    true
}

/// Configuration of a single loss, leaf or composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LossConfig {
    L1 {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_weight")]
        weight: f64,
        #[serde(default)]
        reduction: Reduction,
    },
    Mse {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_weight")]
        weight: f64,
        #[serde(default)]
        reduction: Reduction,
    },
    Bce {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_weight")]
        weight: f64,
        #[serde(default)]
        reduction: Reduction,
    },
    Cce {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_weight")]
        weight: f64,
        #[serde(default)]
        reduction: Reduction,
        #[serde(default = "default_from_logits")]
        from_logits: bool,
    },
    Composite(CompositeConfig),
}

/// Configuration of a composite loss
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompositeConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub combine: Combine,
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

/// One component of a composite and the list index it reads, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub loss: LossConfig,
    #[serde(default)]
    pub index: Option<usize>,
}

impl LossConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the configured loss.
    pub fn build<T>(&self) -> Result<Box<dyn Loss<T>>>
    where
        T: NdFloat,
    {
        let loss: Box<dyn Loss<T>> = match self {
            LossConfig::L1 {
                name,
                weight,
                reduction,
            } => {
                let loss = L1Loss::<T>::new(*reduction).with_weight(checked_weight(*weight)?);
                Box::new(match name {
                    Some(name) => loss.with_name(name.clone()),
                    None => loss,
                })
            }
            LossConfig::Mse {
                name,
                weight,
                reduction,
            } => {
                let loss = MSELoss::<T>::new(*reduction).with_weight(checked_weight(*weight)?);
                Box::new(match name {
                    Some(name) => loss.with_name(name.clone()),
                    None => loss,
                })
            }
            LossConfig::Bce {
                name,
                weight,
                reduction,
            } => {
                let loss = BCELoss::<T>::new(*reduction).with_weight(checked_weight(*weight)?);
                Box::new(match name {
                    Some(name) => loss.with_name(name.clone()),
                    None => loss,
                })
            }
            LossConfig::Cce {
                name,
                weight,
                reduction,
                from_logits,
            } => {
                let loss =
                    CCELoss::<T>::new(*reduction, *from_logits).with_weight(checked_weight(*weight)?);
                Box::new(match name {
                    Some(name) => loss.with_name(name.clone()),
                    None => loss,
                })
            }
            LossConfig::Composite(config) => Box::new(config.build::<T>()?),
        };
        Ok(loss)
    }
}

impl CompositeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the composite, adding components in configuration order.
    pub fn build<T>(&self) -> Result<CompositeLoss<T>>
    where
        T: NdFloat,
    {
        let mut composite = match &self.name {
            Some(name) => CompositeLoss::<T>::with_name(name.clone()),
            None => CompositeLoss::<T>::new(),
        }
        .with_combine(self.combine);

        for component in &self.components {
            let loss = component.loss.build::<T>()?;
            match component.index {
                Some(index) => composite.add_component_at(loss, index),
                None => composite.add_component(loss),
            };
        }
        Ok(composite)
    }
}

fn checked_weight<T>(weight: f64) -> Result<T>
where
    T: NdFloat,
{
    if !weight.is_finite() || weight < 0.0 {
        return Err(LossError::InvalidConfig(format!(
            "weight must be finite and non-negative, got {}",
            weight
        )));
    }
    Ok(scalar(weight))
}
