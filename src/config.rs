//! Hyperparameters for the descent routines and network training.
//!
//! Both configs deserialize from JSON; any field left out takes the default
//! used by the original routines.
use crate::error::{MlError, Result};
use serde::{Deserialize, Serialize};

/// Which gradient descent variant to run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DescentMethod {
    /// Whole dataset per update.
    #[default]
    FullBatch,
    /// One randomly drawn example per update, `m` updates per iteration.
    Stochastic,
    /// Shuffled contiguous chunks of `batch_size` examples per update.
    MiniBatch,
}

impl DescentMethod {
    /// Iteration count the original routine used when none was given.
    pub fn default_iterations(self) -> usize {
        match self {
            DescentMethod::FullBatch => 100,
            DescentMethod::Stochastic | DescentMethod::MiniBatch => 10,
        }
    }
}

/// Settings for one gradient descent run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DescentConfig {
    pub method: DescentMethod,
    pub learning_rate: f64,
    pub iterations: usize,
    /// Only read by [`DescentMethod::MiniBatch`].
    pub batch_size: usize,
}

impl Default for DescentConfig {
    fn default() -> Self {
        Self::for_method(DescentMethod::FullBatch)
    }
}

impl DescentConfig {
    /// Defaults for the given method.
    pub fn for_method(method: DescentMethod) -> Self {
        Self {
            method,
            learning_rate: 0.01,
            iterations: method.default_iterations(),
            batch_size: 20,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Parse from a JSON object; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MlError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_learning_rate(self.learning_rate)?;
        validate_iterations(self.iterations)?;
        if self.method == DescentMethod::MiniBatch {
            validate_batch_size(self.batch_size)?;
        }
        Ok(())
    }
}

/// Settings for [`FeedForwardNetwork::train`](crate::network::FeedForwardNetwork::train).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            learning_rate: 0.01,
        }
    }
}

impl TrainingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MlError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_learning_rate(self.learning_rate)?;
        if self.epochs == 0 {
            return Err(MlError::invalid("epochs must be at least 1"));
        }
        Ok(())
    }
}

pub(crate) fn validate_learning_rate(learning_rate: f64) -> Result<()> {
    if !learning_rate.is_finite() {
        return Err(MlError::invalid(format!(
            "learning rate must be finite, got {}",
            learning_rate
        )));
    }
    Ok(())
}

pub(crate) fn validate_iterations(iterations: usize) -> Result<()> {
    if iterations == 0 {
        return Err(MlError::invalid("iterations must be at least 1"));
    }
    Ok(())
}

pub(crate) fn validate_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(MlError::invalid("batch size must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_method() {
        assert_eq!(DescentConfig::default().iterations, 100);
        let sgd = DescentConfig::for_method(DescentMethod::Stochastic);
        assert_eq!(sgd.iterations, 10);
        assert_eq!(sgd.batch_size, 20);
        assert!((sgd.learning_rate - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            DescentConfig::from_json(r#"{"method": "mini_batch", "batch_size": 4}"#).unwrap();
        assert_eq!(config.method, DescentMethod::MiniBatch);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.iterations, 100);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = DescentConfig::from_json(r#"{"method": "mini_batch", "batch_size": 0}"#)
            .unwrap_err();
        assert!(matches!(err, MlError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let config = DescentConfig::default().with_iterations(0);
        assert!(matches!(
            config.validate(),
            Err(MlError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_bad_json() {
        let err = TrainingConfig::from_json("{ epochs: ").unwrap_err();
        assert!(matches!(err, MlError::ConfigParse(_)));
    }

    #[test]
    fn test_training_config_zero_epochs() {
        let err = TrainingConfig::from_json(r#"{"epochs": 0}"#).unwrap_err();
        assert!(matches!(err, MlError::InvalidConfiguration(_)));
    }
}
