use crate::models::enums::ConfidenceBand;

/// Lower bounds (inclusive) of each confidence band
pub mod band_thresholds {
    /// At or above this: the verdict can be acted on directly
    pub const HIGH: f64 = 0.85;

    /// At or above this: usable, worth spot-checking
    pub const MEDIUM: f64 = 0.65;
}

/// Map a classifier score onto a confidence band.
pub fn confidence_band(score: f64) -> ConfidenceBand {
    if score >= band_thresholds::HIGH {
        ConfidenceBand::High
    } else if score >= band_thresholds::MEDIUM {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_band_boundary_inclusive() {
        assert_eq!(confidence_band(0.85), ConfidenceBand::High);
        assert_eq!(confidence_band(1.0), ConfidenceBand::High);
    }

    #[test]
    fn just_below_high_is_medium() {
        assert_eq!(confidence_band(0.8499), ConfidenceBand::Medium);
    }

    #[test]
    fn medium_band_boundary_inclusive() {
        assert_eq!(confidence_band(0.65), ConfidenceBand::Medium);
    }

    #[test]
    fn just_below_medium_is_low() {
        assert_eq!(confidence_band(0.64999), ConfidenceBand::Low);
        assert_eq!(confidence_band(0.0), ConfidenceBand::Low);
    }

    #[test]
    fn fallback_scores_land_in_expected_bands() {
        assert_eq!(confidence_band(0.75), ConfidenceBand::Medium);
        assert_eq!(confidence_band(0.5), ConfidenceBand::Low);
    }

    #[test]
    fn out_of_range_still_routes() {
        assert_eq!(confidence_band(7.0), ConfidenceBand::High);
        assert_eq!(confidence_band(-1.0), ConfidenceBand::Low);
        assert_eq!(confidence_band(f64::NAN), ConfidenceBand::Low);
    }
}
