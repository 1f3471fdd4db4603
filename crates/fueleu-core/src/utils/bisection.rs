//! Bisection over a monotonic feasibility predicate
//!
//! The predicate must be monotonic over the bracket: once it holds at some
//! point it holds for every larger value. The search returns the smallest
//! feasible point it can resolve, always taken from the feasible side of the
//! final bracket so the answer never understates what is required.
//!
//! Arithmetic is done in [`Decimal`] to keep the bracket exact over many halvings.

use crate::errors::FuelEUResult;
use log::trace;
use rust_decimal::Decimal;

/// Termination rules for [`bisect`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BisectionSettings {
    /// Stop once the bracket is narrower than this
    pub tolerance: Decimal,
    /// Hard cap on predicate evaluations inside the bracket
    pub max_iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BisectionOutcome {
    /// `value` is feasible and lies within `width` of the feasibility boundary
    Converged {
        value: Decimal,
        width: Decimal,
        iterations: usize,
    },
    /// The predicate fails even at the upper bound
    NoFeasiblePoint,
}

/// Find the smallest `x` in `[lower, upper]` for which `is_feasible(x)` holds.
///
/// Errors raised by the predicate abort the search and are returned as-is.
pub fn bisect<P>(
    lower: Decimal,
    upper: Decimal,
    settings: &BisectionSettings,
    mut is_feasible: P,
) -> FuelEUResult<BisectionOutcome>
where
    P: FnMut(Decimal) -> FuelEUResult<bool>,
{
    let (mut lo, mut hi) = if lower <= upper {
        (lower, upper)
    } else {
        (upper, lower)
    };

    if is_feasible(lo)? {
        return Ok(BisectionOutcome::Converged {
            value: lo,
            width: Decimal::ZERO,
            iterations: 0,
        });
    }
    if !is_feasible(hi)? {
        return Ok(BisectionOutcome::NoFeasiblePoint);
    }

    let two = Decimal::TWO;
    let mut iterations = 0;
    while hi - lo > settings.tolerance && iterations < settings.max_iterations {
        let mid = lo + (hi - lo) / two;
        if is_feasible(mid)? {
            hi = mid;
        } else {
            lo = mid;
        }
        iterations += 1;
        trace!("bisection step {iterations}: [{lo}, {hi}]");
    }

    Ok(BisectionOutcome::Converged {
        value: hi,
        width: hi - lo,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FuelEUError;
    use rust_decimal_macros::dec;

    fn settings() -> BisectionSettings {
        BisectionSettings {
            tolerance: dec!(0.00001),
            max_iterations: 50,
        }
    }

    #[test]
    fn test_finds_threshold_from_feasible_side() {
        let threshold = dec!(1234.56789);
        let outcome = bisect(dec!(0), dec!(100000), &settings(), |x| Ok(x >= threshold)).unwrap();
        match outcome {
            BisectionOutcome::Converged { value, width, .. } => {
                assert!(value >= threshold, "value {value} below threshold");
                assert!(value - threshold <= width);
                assert!(width <= dec!(0.00001));
            }
            BisectionOutcome::NoFeasiblePoint => panic!("threshold is inside the bracket"),
        }
    }

    #[test]
    fn test_lower_bound_already_feasible() {
        let outcome = bisect(dec!(0), dec!(1), &settings(), |_| Ok(true)).unwrap();
        assert_eq!(
            outcome,
            BisectionOutcome::Converged {
                value: dec!(0),
                width: dec!(0),
                iterations: 0
            }
        );
    }

    #[test]
    fn test_no_feasible_point() {
        let outcome = bisect(dec!(0), dec!(1), &settings(), |x| Ok(x > dec!(2))).unwrap();
        assert_eq!(outcome, BisectionOutcome::NoFeasiblePoint);
    }

    #[test]
    fn test_iteration_cap_respected() {
        let capped = BisectionSettings {
            tolerance: dec!(0),
            max_iterations: 10,
        };
        let mut evaluations = 0;
        let outcome = bisect(dec!(0), dec!(1), &capped, |x| {
            evaluations += 1;
            Ok(x >= dec!(0.3))
        })
        .unwrap();
        // two bracket checks plus ten halvings
        assert_eq!(evaluations, 12);
        match outcome {
            BisectionOutcome::Converged {
                value, iterations, ..
            } => {
                assert_eq!(iterations, 10);
                assert!(value >= dec!(0.3));
            }
            BisectionOutcome::NoFeasiblePoint => panic!("expected convergence"),
        }
    }

    #[test]
    fn test_predicate_error_propagates() {
        let result = bisect(dec!(0), dec!(1), &settings(), |_| {
            Err(FuelEUError::NumericOverflow("testing".into()))
        });
        assert!(result.is_err());
    }
}
