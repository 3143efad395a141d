/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Convergence testing shared by all engines.

pub mod preds {
    //! Predicates implementing stopping conditions.
    //!
    //! They evaluate to true if the computation should be stopped, and can
    //! be combined using the `and` and `or` methods provided by the
    //! [`Predicate`] trait.
    //!
    //! # Examples
    //! ```
    //! # fn main() -> Result<(), Box<dyn std::error::Error>> {
    //! use predicates::prelude::*;
    //! use striperank::rank::preds::{L1Norm, MaxIter, PredParams};
    //!
    //! let predicate = L1Norm::try_from(1E-6)?.or(MaxIter::from(100));
    //! assert!(predicate.eval(&PredParams { iteration: 100, norm_delta: 1.0 }));
    //! assert!(predicate.eval(&PredParams { iteration: 3, norm_delta: 1E-7 }));
    //! assert!(!predicate.eval(&PredParams { iteration: 3, norm_delta: 1E-5 }));
    //! #     Ok(())
    //! # }
    //! ```

    use crate::rank::ConfigError;
    use predicates::{Predicate, reflection::PredicateReflection};
    use std::fmt::Display;

    /// The information passed to stopping predicates after each iteration.
    #[derive(Debug, Clone, Copy)]
    pub struct PredParams {
        pub iteration: usize,
        pub norm_delta: f64,
    }

    /// Stops after at most the provided number of iterations.
    #[derive(Debug, Clone)]
    pub struct MaxIter {
        max_iter: usize,
    }

    impl MaxIter {
        pub const DEFAULT_MAX_ITER: usize = 1000;
    }

    impl From<usize> for MaxIter {
        fn from(max_iter: usize) -> Self {
            MaxIter { max_iter }
        }
    }

    impl Default for MaxIter {
        fn default() -> Self {
            Self::from(Self::DEFAULT_MAX_ITER)
        }
    }

    impl Display for MaxIter {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!("(max iter: {})", self.max_iter))
        }
    }

    impl PredicateReflection for MaxIter {}

    impl Predicate<PredParams> for MaxIter {
        fn eval(&self, pred_params: &PredParams) -> bool {
            pred_params.iteration >= self.max_iter
        }
    }

    /// Stops when the 𝓁₁ norm of the difference between successive
    /// approximations is at most a given threshold.
    #[derive(Debug, Clone)]
    pub struct L1Norm {
        threshold: f64,
    }

    impl L1Norm {
        pub const DEFAULT_THRESHOLD: f64 = 1E-6;

        /// Returns the threshold.
        pub fn threshold(&self) -> f64 {
            self.threshold
        }
    }

    impl TryFrom<f64> for L1Norm {
        type Error = ConfigError;
        fn try_from(threshold: f64) -> Result<Self, ConfigError> {
            // Also rejects NaN
            if !(threshold > 0.0) {
                return Err(ConfigError::Threshold(threshold));
            }
            Ok(L1Norm { threshold })
        }
    }

    impl Default for L1Norm {
        fn default() -> Self {
            L1Norm {
                threshold: Self::DEFAULT_THRESHOLD,
            }
        }
    }

    impl Display for L1Norm {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!("(norm: {})", self.threshold))
        }
    }

    impl PredicateReflection for L1Norm {}

    impl Predicate<PredParams> for L1Norm {
        fn eval(&self, pred_params: &PredParams) -> bool {
            pred_params.norm_delta <= self.threshold
        }
    }
}

use predicates::Predicate;
use preds::{L1Norm, MaxIter, PredParams};
use std::fmt::Display;

/// The outcome of an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The norm delta is still above the threshold.
    Running,
    /// The norm delta is at most the threshold.
    Converged,
    /// The maximum number of iterations has been reached without
    /// convergence.
    Exhausted,
}

/// Counts iterations and tests convergence on the 𝓁₁ norm of the difference
/// between successive score vectors.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    norm: L1Norm,
    max_iter: MaxIter,
    iteration: usize,
    norm_delta: f64,
}

impl ConvergenceMonitor {
    pub fn new(norm: L1Norm, max_iter: MaxIter) -> Self {
        Self {
            norm,
            max_iter,
            iteration: 0,
            norm_delta: f64::INFINITY,
        }
    }

    /// Records the norm delta of a new iteration.
    ///
    /// Convergence takes precedence over exhaustion when both happen at the
    /// same iteration.
    pub fn observe(&mut self, norm_delta: f64) -> Status {
        self.iteration += 1;
        self.norm_delta = norm_delta;
        let params = PredParams {
            iteration: self.iteration,
            norm_delta,
        };
        if self.norm.eval(&params) {
            Status::Converged
        } else if self.max_iter.eval(&params) {
            Status::Exhausted
        } else {
            Status::Running
        }
    }

    /// Forgets all recorded iterations.
    pub fn reset(&mut self) {
        self.iteration = 0;
        self.norm_delta = f64::INFINITY;
    }

    /// Returns the number of recorded iterations.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Returns the last recorded norm delta, or infinity if no iteration has
    /// been recorded.
    pub fn norm_delta(&self) -> f64 {
        self.norm_delta
    }
}

impl Display for ConvergenceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} or {}", self.norm, self.max_iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe() {
        let mut monitor =
            ConvergenceMonitor::new(L1Norm::try_from(1E-3).unwrap(), MaxIter::from(3));
        assert_eq!(monitor.norm_delta(), f64::INFINITY);
        assert_eq!(monitor.observe(1.0), Status::Running);
        assert_eq!(monitor.observe(1E-2), Status::Running);
        assert_eq!(monitor.observe(1E-2), Status::Exhausted);
        assert_eq!(monitor.iteration(), 3);

        monitor.reset();
        assert_eq!(monitor.iteration(), 0);
        assert_eq!(monitor.observe(1E-3), Status::Converged);
    }

    #[test]
    fn test_convergence_wins() {
        let mut monitor =
            ConvergenceMonitor::new(L1Norm::try_from(1E-3).unwrap(), MaxIter::from(1));
        assert_eq!(monitor.observe(0.0), Status::Converged);
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(L1Norm::try_from(0.0).is_err());
        assert!(L1Norm::try_from(-1.0).is_err());
        assert!(L1Norm::try_from(f64::NAN).is_err());
        assert_eq!(L1Norm::default().threshold(), 1E-6);
    }
}
