//! Bounded driver for the fixed-point style solvers.
//!
//! A solver supplies a step function `(iteration, estimate) -> Step`; the
//! driver owns the iteration cap and reports whether the step function ever
//! declared convergence. Physical formulas stay in the step functions.

use crate::error::Result;
use log::debug;
use serde::Serialize;

/// Outcome of one solver step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Not converged yet; iterate again from this estimate
    Continue(f64),
    /// Converged on this value
    Converged(f64),
}

/// Final value of a bounded iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Solution {
    pub value: f64,
    /// Steps evaluated, 1-based
    pub iterations: usize,
    pub converged: bool,
}

/// Run `step` from `initial` for at most `max_iterations` steps.
///
/// Without convergence the last estimate is returned with
/// `converged = false`. An error from `step` ends the iteration.
pub fn iterate<F>(initial: f64, max_iterations: usize, mut step: F) -> Result<Solution>
where
    F: FnMut(usize, f64) -> Result<Step>,
{
    let mut estimate = initial;
    for iteration in 1..=max_iterations {
        match step(iteration, estimate)? {
            Step::Converged(value) => {
                debug!("converged on {} after {} iterations", value, iteration);
                return Ok(Solution {
                    value,
                    iterations: iteration,
                    converged: true,
                });
            }
            Step::Continue(next) => {
                debug!("iteration {}: {} -> {}", iteration, estimate, next);
                estimate = next;
            }
        }
    }
    Ok(Solution {
        value: estimate,
        iterations: max_iterations,
        converged: false,
    })
}
