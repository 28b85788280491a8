//! Strike bounds and significance selection.
//!
//! Near the money every strike is kept. Further out only strikes on a round
//! increment survive, and the increment grows with both the distance from the
//! underlying and the magnitude of the underlying price.

use std::cmp::Ordering;

/// Slack allowed when testing a strike against a rounding increment.
const DIVISIBILITY_TOLERANCE: f64 = 0.01;

/// Inclusive strike interval around an underlying price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeBounds {
    pub lower: f64,
    pub upper: f64,
}

impl StrikeBounds {
    #[must_use]
    pub fn contains(&self, strike: f64) -> bool {
        strike >= self.lower && strike <= self.upper
    }
}

/// Computes the strike interval within `percentage` percent of `underlying_price`.
///
/// No validation is performed; a non-positive price yields a degenerate interval.
#[must_use]
pub fn compute_bounds(underlying_price: f64, percentage: f64) -> StrikeBounds {
    StrikeBounds {
        lower: underlying_price * (1.0 - percentage / 100.0),
        upper: underlying_price * (1.0 + percentage / 100.0),
    }
}

/// A strike paired with its percentage distance from the underlying.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeBand {
    pub strike: f64,
    pub distance_pct: f64,
}

impl StrikeBand {
    #[must_use]
    pub fn new(strike: f64, underlying_price: f64) -> Self {
        Self {
            strike,
            distance_pct: (strike - underlying_price).abs() / underlying_price * 100.0,
        }
    }

    #[must_use]
    pub fn tier(&self) -> DistanceTier {
        DistanceTier::classify(self.distance_pct)
    }

    /// Applies the tier's rounding rule for an underlying in `band`.
    #[must_use]
    pub fn is_significant(&self, band: PriceBand) -> bool {
        self.tier()
            .rounding_step(band)
            .is_none_or(|step| is_divisible(self.strike, step))
    }
}

/// Distance tiers, inclusive at their upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceTier {
    /// Up to 2%.
    AtTheMoney,
    /// Over 2% up to 5%.
    Near,
    /// Over 5% up to 10%.
    Mid,
    /// Over 10% up to 20%.
    Far,
    /// Over 20%.
    Wing,
}

impl DistanceTier {
    #[must_use]
    pub fn classify(distance_pct: f64) -> Self {
        if distance_pct <= 2.0 {
            Self::AtTheMoney
        } else if distance_pct <= 5.0 {
            Self::Near
        } else if distance_pct <= 10.0 {
            Self::Mid
        } else if distance_pct <= 20.0 {
            Self::Far
        } else {
            Self::Wing
        }
    }

    /// Increment a strike must sit on to be kept, or `None` when every strike is kept.
    #[must_use]
    pub const fn rounding_step(self, band: PriceBand) -> Option<f64> {
        match (self, band) {
            (Self::AtTheMoney, _) => None,
            (Self::Near, _) => Some(2.0),
            (Self::Mid, PriceBand::Low) => Some(1.0),
            (Self::Mid, PriceBand::Mid | PriceBand::High) | (Self::Far, PriceBand::Low) => {
                Some(5.0)
            }
            (Self::Far, PriceBand::Mid | PriceBand::High) | (Self::Wing, PriceBand::Low) => {
                Some(10.0)
            }
            (Self::Wing, PriceBand::Mid) => Some(25.0),
            (Self::Wing, PriceBand::High) => Some(50.0),
        }
    }
}

/// Magnitude class of the underlying price, exclusive at the lower edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBand {
    /// 100 and below.
    Low,
    /// Above 100, up to 500.
    Mid,
    /// Above 500.
    High,
}

impl PriceBand {
    #[must_use]
    pub fn classify(underlying_price: f64) -> Self {
        if underlying_price > 500.0 {
            Self::High
        } else if underlying_price > 100.0 {
            Self::Mid
        } else {
            Self::Low
        }
    }
}

/// Returns true when `strike` is a multiple of `step`, within a small tolerance.
#[must_use]
pub fn is_divisible(strike: f64, step: f64) -> bool {
    let remainder = strike % step;
    remainder.abs() < DIVISIBILITY_TOLERANCE || (remainder - step).abs() < DIVISIBILITY_TOLERANCE
}

/// Returns the subset of `strikes` that carry signal for `underlying_price`.
///
/// The result preserves input order and never contains a value absent from
/// `strikes`. When `underlying_price` is zero, negative, or non-finite no
/// distance can be computed and the input is returned unchanged.
#[must_use]
pub fn select_significant_strikes(
    underlying_price: f64,
    percentage: f64,
    strikes: &[f64],
) -> Vec<f64> {
    if !is_usable_price(underlying_price) {
        return strikes.to_vec();
    }

    let bounds = compute_bounds(underlying_price, percentage);
    let band = PriceBand::classify(underlying_price);
    strikes
        .iter()
        .map(|&strike| StrikeBand::new(strike, underlying_price))
        .filter(|candidate| bounds.contains(candidate.strike))
        .filter(|candidate| candidate.is_significant(band))
        .map(|candidate| candidate.strike)
        .collect()
}

/// True when distances from `underlying_price` are well defined.
#[must_use]
pub fn is_usable_price(underlying_price: f64) -> bool {
    underlying_price.is_finite() && underlying_price > 0.0
}

/// Sorts and deduplicates strikes so membership can be tested by binary search.
#[must_use]
pub fn distinct_strikes(strikes: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut distinct: Vec<f64> = strikes.into_iter().collect();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup_by(|left, right| left.total_cmp(right) == Ordering::Equal);
    distinct
}

/// Membership test against a list produced by [`distinct_strikes`].
#[must_use]
pub fn contains_strike(sorted: &[f64], strike: f64) -> bool {
    sorted.binary_search_by(|probe| probe.total_cmp(&strike)).is_ok()
}
