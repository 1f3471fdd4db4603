//! Year-indexed GHG intensity target
//!
//! The reduction applied to the reference intensity is a step function over
//! the milestone years. Between the final two milestones the reduction ramps
//! linearly with elapsed years; after the last milestone it stays constant.
//! Years before the first milestone get no reduction.

use crate::parameters::RegulationParameters;
use std::sync::LazyLock;

static DEFAULT_PARAMETERS: LazyLock<RegulationParameters> =
    LazyLock::new(RegulationParameters::default);

/// Reduction fraction in effect for `year`
pub fn reduction_fraction(parameters: &RegulationParameters, year: i32) -> f64 {
    let schedule = &parameters.reduction_schedule;
    let (first, last) = match (schedule.first(), schedule.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return 0.0,
    };

    if year < first.year {
        return 0.0;
    }
    if year >= last.year {
        return last.reduction;
    }

    if schedule.len() >= 2 {
        let ramp_start = &schedule[schedule.len() - 2];
        if year >= ramp_start.year {
            let elapsed = (year - ramp_start.year) as f64;
            let span = (last.year - ramp_start.year) as f64;
            return ramp_start.reduction + (last.reduction - ramp_start.reduction) * elapsed / span;
        }
    }

    schedule
        .iter()
        .take_while(|milestone| milestone.year <= year)
        .last()
        .map_or(0.0, |milestone| milestone.reduction)
}

/// Target GHG intensity (gCO2eq/MJ) for `year` under the given parameters
pub fn target_intensity_with(parameters: &RegulationParameters, year: i32) -> f64 {
    parameters.reference_intensity * (1.0 - reduction_fraction(parameters, year))
}

/// Target GHG intensity (gCO2eq/MJ) for `year` under the default regulation
pub fn target_intensity(year: i32) -> f64 {
    target_intensity_with(&DEFAULT_PARAMETERS, year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ReductionMilestone;
    use approx::assert_relative_eq;

    #[test]
    fn test_unreduced_before_first_milestone() {
        assert_relative_eq!(target_intensity(2020), 91.16, epsilon = 1e-12);
        assert_relative_eq!(target_intensity(2024), 91.16, epsilon = 1e-12);
        assert_relative_eq!(target_intensity(1990), 91.16, epsilon = 1e-12);
    }

    #[test]
    fn test_first_bracket() {
        for year in 2025..2030 {
            assert_relative_eq!(target_intensity(year), 89.3368, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_step_milestones() {
        assert_relative_eq!(target_intensity(2030), 91.16 * 0.94, epsilon = 1e-9);
        assert_relative_eq!(target_intensity(2039), 91.16 * 0.855, epsilon = 1e-9);
        assert_relative_eq!(target_intensity(2040), 91.16 * 0.69, epsilon = 1e-9);
        assert_relative_eq!(target_intensity(2045), 91.16 * 0.38, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolates_between_final_milestones() {
        // 62% in 2045 ramping to 80% in 2050: 2047 is 2/5 of the way
        let expected = 91.16 * (1.0 - (0.62 + 0.18 * 0.4));
        assert_relative_eq!(target_intensity(2047), expected, epsilon = 1e-9);
        assert_relative_eq!(target_intensity(2050), 91.16 * 0.2, epsilon = 1e-9);
        assert_relative_eq!(target_intensity(2060), 91.16 * 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_monotonically_non_increasing() {
        let mut previous = target_intensity(2015);
        for year in 2016..=2060 {
            let current = target_intensity(year);
            assert!(
                current <= previous,
                "Target must not increase: {} -> {} in {}",
                previous,
                current,
                year
            );
            previous = current;
        }
    }

    #[test]
    fn test_single_milestone_schedule() {
        let params = RegulationParameters {
            reduction_schedule: vec![ReductionMilestone::new(2030, 0.1)],
            ..RegulationParameters::default()
        };
        assert_relative_eq!(target_intensity_with(&params, 2029), 91.16, epsilon = 1e-12);
        assert_relative_eq!(target_intensity_with(&params, 2031), 91.16 * 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(target_intensity(2033).to_bits(), target_intensity(2033).to_bits());
    }
}
