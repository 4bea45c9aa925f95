// src/lib.rs

//! # Picardo
//!
//! Faster independent component analysis under orthogonal constraint,
//! using L-BFGS preconditioned with Hessian approximations (Picard-O):
//!
//! > Pierre Ablin, Jean-François Cardoso, Alexandre Gramfort.
//! > "Faster ICA under orthogonal constraint"
//! > ICASSP, 2018
//!
//! The solver takes a centered, whitened signal matrix and finds an
//! orthogonal unmixing that maximizes statistical independence of the rows,
//! moving along geodesics of the orthogonal manifold via matrix exponentials.
//! Preprocessing (centering, whitening) is the caller's responsibility.
//!
//! ## Example
//!
//! ```rust,no_run
//! use picardo::{Picardo, PicardoConfig};
//! use ndarray::Array2;
//!
//! # fn main() -> Result<(), picardo::PicardoError> {
//! // Centered, whitened signals (n_components x n_samples)
//! let x = Array2::<f64>::zeros((8, 1000));
//!
//! // Fit with default settings
//! let result = Picardo::fit(&x)?;
//!
//! // Or with custom configuration
//! let config = PicardoConfig::builder()
//!     .m(10)
//!     .max_iter(200)
//!     .tol(1e-6)
//!     .build();
//! let result = Picardo::fit_with_config(&x, &config)?;
//!
//! // Access results
//! let sources = &result.sources;
//! let unmixing = &result.unmixing;
//! # Ok(())
//! # }
//! ```

mod config;
mod core;
mod error;
mod hessian;
mod lbfgs;
mod math;
mod result;
mod score;
mod solver;

pub use config::{ConfigBuilder, PicardoConfig};
pub use error::PicardoError;
pub use result::PicardoResult;
pub use solver::Picardo;

// Separation-quality diagnostics
pub mod utils;

// Re-export ndarray for convenience
pub use ndarray;
