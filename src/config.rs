// src/config.rs

//! Configuration for the Picard-O solver.

use crate::error::{PicardoError, Result};
use ndarray::Array2;

/// Configuration parameters for the Picard-O solver.
#[derive(Clone)]
pub struct PicardoConfig {
    /// Size of the L-BFGS memory.
    pub m: usize,

    /// Maximum number of iterations.
    pub max_iter: usize,

    /// Convergence tolerance for the gradient norm.
    pub tol: f64,

    /// Regularization floor for the Hessian approximation.
    pub lambda_min: f64,

    /// Maximum line search attempts per iteration.
    pub ls_tries: usize,

    /// Initial unmixing matrix. If None, starts from the identity.
    /// A supplied matrix is symmetrically decorrelated before use so the
    /// run starts on the orthogonal manifold.
    pub w_init: Option<Array2<f64>>,

    /// If true, print progress information.
    pub verbose: bool,
}

impl Default for PicardoConfig {
    fn default() -> Self {
        Self {
            m: 7,
            max_iter: 500,
            tol: 1e-7,
            lambda_min: 0.01,
            ls_tries: 10,
            w_init: None,
            verbose: false,
        }
    }
}

impl PicardoConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing a configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(PicardoError::InvalidConfig {
                parameter: "max_iter".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.tol <= 0.0 {
            return Err(PicardoError::InvalidConfig {
                parameter: "tol".into(),
                message: "must be positive".into(),
            });
        }

        if self.lambda_min <= 0.0 {
            return Err(PicardoError::InvalidConfig {
                parameter: "lambda_min".into(),
                message: "must be positive".into(),
            });
        }

        if self.m == 0 {
            return Err(PicardoError::InvalidConfig {
                parameter: "m".into(),
                message: "L-BFGS memory size must be at least 1".into(),
            });
        }

        if self.ls_tries == 0 {
            return Err(PicardoError::InvalidConfig {
                parameter: "ls_tries".into(),
                message: "must be at least 1".into(),
            });
        }

        Ok(())
    }
}

/// Builder for constructing `PicardoConfig` with a fluent API.
#[derive(Default)]
pub struct ConfigBuilder {
    config: PicardoConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: PicardoConfig::default(),
        }
    }

    /// Set the L-BFGS memory size.
    pub fn m(mut self, m: usize) -> Self {
        self.config.m = m;
        self
    }

    /// Set the maximum number of iterations.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn tol(mut self, tol: f64) -> Self {
        self.config.tol = tol;
        self
    }

    /// Set the Hessian regularization floor.
    pub fn lambda_min(mut self, lambda_min: f64) -> Self {
        self.config.lambda_min = lambda_min;
        self
    }

    /// Set the maximum line search attempts.
    pub fn ls_tries(mut self, ls_tries: usize) -> Self {
        self.config.ls_tries = ls_tries;
        self
    }

    /// Set the initial unmixing matrix.
    pub fn w_init(mut self, w_init: Array2<f64>) -> Self {
        self.config.w_init = Some(w_init);
        self
    }

    /// Enable or disable verbose output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PicardoConfig {
        self.config
    }

    /// Build and validate the configuration.
    pub fn build_validated(self) -> Result<PicardoConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PicardoConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = PicardoConfig::builder()
            .m(12)
            .max_iter(250)
            .tol(1e-9)
            .lambda_min(0.02)
            .ls_tries(5)
            .verbose(true)
            .build();

        assert_eq!(config.m, 12);
        assert_eq!(config.max_iter, 250);
        assert_eq!(config.tol, 1e-9);
        assert_eq!(config.lambda_min, 0.02);
        assert_eq!(config.ls_tries, 5);
        assert!(config.verbose);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(PicardoConfig::builder().max_iter(0).build_validated().is_err());
        assert!(PicardoConfig::builder().tol(0.0).build_validated().is_err());
        assert!(PicardoConfig::builder().tol(-1.0).build_validated().is_err());
        assert!(PicardoConfig::builder().lambda_min(0.0).build_validated().is_err());
        assert!(PicardoConfig::builder().m(0).build_validated().is_err());
        assert!(PicardoConfig::builder().ls_tries(0).build_validated().is_err());
    }
}
