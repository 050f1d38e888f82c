//! Correlated nonlinear least-squares fitting.
//!
//! Layered the way the fits are used:
//!
//! 1. **Models** ([`model`]): parameterized correlator shapes
//! 2. **Minimizer** ([`least_squares`]): damped least squares over an
//!    arbitrary residual function
//! 3. **Metric plumbing** ([`correlated`]): uncorrelated, correlated and
//!    two-stage fits producing [`crate::result::FitResult`]s
//! 4. **Goodness of fit** ([`goodness`]): chi-square survival function

mod correlated;
mod goodness;
mod least_squares;
mod model;

pub use correlated::{fit_correlated, fit_two_stage, fit_uncorrelated};
pub use goodness::{chi_square_p_value, ln_gamma};
pub use least_squares::{LevenbergMarquardt, Minimum};
pub use model::Model;
