//! Weighted magnitude distribution.
//!
//! Magnitudes are drawn from ordered, contiguous bands. A uniform draw in
//! `[0, 100)` picks the first band whose cumulative weight exceeds it, then a
//! uniform integer inside that band is returned. A floor replaces the bands
//! with a uniform draw over `[floor + 1, max]`. Consecutive magnitudes for one
//! key are kept at least `spread` apart unless a range boundary prevents it.

use std::str::FromStr;

use rand::Rng;

use crate::constants::DEFAULT_MAGNITUDE_SPREAD;
use crate::errors::{Error, Result};

/// One contiguous range of magnitudes and its selection weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagnitudeBand {
    pub lo: u8,
    pub hi: u8,
    pub weight: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnitudeDistribution {
    bands: Vec<MagnitudeBand>,
    spread: u8,
}

impl MagnitudeDistribution {
    /// Builds a distribution, rejecting gaps, overlaps, values above 100
    /// and weights that do not sum to 100.
    pub fn new(bands: Vec<MagnitudeBand>, spread: u8) -> Result<Self> {
        if bands.is_empty() {
            return Err(Error::Config("at least one magnitude band is required".into()));
        }

        for band in &bands {
            if band.lo > band.hi || band.hi > 100 {
                return Err(Error::Config(format!(
                    "invalid magnitude band {}-{}",
                    band.lo, band.hi
                )));
            }
        }

        for pair in bands.windows(2) {
            if pair[1].lo as u16 != pair[0].hi as u16 + 1 {
                return Err(Error::Config(format!(
                    "magnitude bands must be contiguous: {}-{} then {}-{}",
                    pair[0].lo, pair[0].hi, pair[1].lo, pair[1].hi
                )));
            }
        }

        let total: u32 = bands.iter().map(|b| b.weight as u32).sum();
        if total != 100 {
            return Err(Error::Config(format!(
                "magnitude band weights must sum to 100, got {}",
                total
            )));
        }

        Ok(Self { bands, spread })
    }

    pub fn with_spread(mut self, spread: u8) -> Self {
        self.spread = spread;
        self
    }

    pub fn bands(&self) -> &[MagnitudeBand] {
        &self.bands
    }

    pub fn spread(&self) -> u8 {
        self.spread
    }

    /// Global minimum magnitude.
    pub fn min(&self) -> u8 {
        self.bands.first().map(|b| b.lo).unwrap_or_default()
    }

    /// Global maximum magnitude.
    pub fn max(&self) -> u8 {
        self.bands.last().map(|b| b.hi).unwrap_or_default()
    }

    /// Legal range for a draw: the global range, or `[floor + 1, max]`.
    ///
    /// A floor below the global minimum does not widen the range, and a
    /// floor at or above the maximum collapses it onto the maximum.
    pub fn range(&self, floor: Option<u8>) -> (u8, u8) {
        let (min, max) = (self.min(), self.max());
        match floor {
            None => (min, max),
            Some(floor) => {
                let lo = (floor as u16 + 1).max(min as u16);
                if lo > max as u16 {
                    (max, max)
                } else {
                    (lo as u8, max)
                }
            }
        }
    }

    /// Weighted draw over the bands.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> u8 {
        let u: f64 = rng.gen_range(0.0..100.0);
        let mut cumulative = 0.0;
        let band = self
            .bands
            .iter()
            .find(|band| {
                cumulative += band.weight as f64;
                cumulative > u
            })
            .or(self.bands.last());

        match band {
            Some(band) => rng.gen_range(band.lo..=band.hi),
            None => 0,
        }
    }

    /// Next magnitude for a key, given the previous one and an optional floor.
    pub fn draw<R: Rng>(&self, previous: Option<u8>, floor: Option<u8>, rng: &mut R) -> u8 {
        let (lo, hi) = self.range(floor);
        let value = match floor {
            None => self.sample(rng),
            Some(_) => rng.gen_range(lo..=hi),
        };

        match previous {
            Some(previous) => self.separate(value, previous, lo, hi),
            None => value,
        }
    }

    /// Moves `value` away from `previous` when they are closer than the
    /// spread, upward when `previous` sits below the midpoint, then clips.
    fn separate(&self, value: u8, previous: u8, lo: u8, hi: u8) -> u8 {
        let spread = self.spread as i16;
        let (value, previous) = (value as i16, previous as i16);

        if (value - previous).abs() >= spread {
            return value as u8;
        }

        let below_midpoint = previous * 2 < self.min() as i16 + self.max() as i16;
        let moved = if below_midpoint {
            previous + spread
        } else {
            previous - spread
        };

        moved.clamp(lo as i16, hi as i16) as u8
    }
}

impl Default for MagnitudeDistribution {
    fn default() -> Self {
        Self {
            bands: vec![
                MagnitudeBand { lo: 65, hi: 70, weight: 10 },
                MagnitudeBand { lo: 71, hi: 77, weight: 25 },
                MagnitudeBand { lo: 78, hi: 84, weight: 35 },
                MagnitudeBand { lo: 85, hi: 89, weight: 20 },
                MagnitudeBand { lo: 90, hi: 92, weight: 10 },
            ],
            spread: DEFAULT_MAGNITUDE_SPREAD,
        }
    }
}

impl FromStr for MagnitudeDistribution {
    type Err = Error;

    /// Parses `lo-hi:weight` entries separated by commas, e.g.
    /// `65-70:10,71-77:25,78-84:35,85-89:20,90-92:10`.
    fn from_str(raw: &str) -> Result<Self> {
        let invalid = |entry: &str| Error::Config(format!("invalid magnitude band '{}'", entry));

        let bands = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (range, weight) = entry.split_once(':').ok_or_else(|| invalid(entry))?;
                let (lo, hi) = range.split_once('-').ok_or_else(|| invalid(entry))?;
                Ok(MagnitudeBand {
                    lo: lo.trim().parse().map_err(|_| invalid(entry))?,
                    hi: hi.trim().parse().map_err(|_| invalid(entry))?,
                    weight: weight.trim().parse().map_err(|_| invalid(entry))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(bands, DEFAULT_MAGNITUDE_SPREAD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MAGNITUDE_BANDS;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_matches_default_bands() {
        let parsed: MagnitudeDistribution = DEFAULT_MAGNITUDE_BANDS.parse().unwrap();
        assert_eq!(parsed, MagnitudeDistribution::default());
        assert_eq!(parsed.min(), 65);
        assert_eq!(parsed.max(), 92);
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!("65-70:10,71-77:25".parse::<MagnitudeDistribution>().is_err());
        assert!("65-70:50,72-80:50".parse::<MagnitudeDistribution>().is_err());
        assert!("70-65:100".parse::<MagnitudeDistribution>().is_err());
        assert!("65-70".parse::<MagnitudeDistribution>().is_err());
        assert!("".parse::<MagnitudeDistribution>().is_err());
        assert!("90-101:100".parse::<MagnitudeDistribution>().is_err());
    }

    #[test]
    fn test_floor_range() {
        let dist = MagnitudeDistribution::default();
        assert_eq!(dist.range(None), (65, 92));
        assert_eq!(dist.range(Some(74)), (75, 92));
        assert_eq!(dist.range(Some(10)), (65, 92));
        assert_eq!(dist.range(Some(91)), (92, 92));
        assert_eq!(dist.range(Some(92)), (92, 92));
        assert_eq!(dist.range(Some(100)), (92, 92));
    }

    #[test]
    fn test_weights_concentrate_in_middle_band() {
        let dist = MagnitudeDistribution::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0usize; 5];

        for _ in 0..10_000 {
            let value = dist.sample(&mut rng);
            let idx = dist
                .bands()
                .iter()
                .position(|b| (b.lo..=b.hi).contains(&value))
                .unwrap();
            counts[idx] += 1;
        }

        // 10/25/35/20/10 with generous tolerance.
        assert!((700..1300).contains(&counts[0]), "{:?}", counts);
        assert!((2100..2900).contains(&counts[1]), "{:?}", counts);
        assert!((3000..4000).contains(&counts[2]), "{:?}", counts);
        assert!((1600..2400).contains(&counts[3]), "{:?}", counts);
        assert!((700..1300).contains(&counts[4]), "{:?}", counts);
    }

    #[test]
    fn test_separation_direction() {
        let dist = MagnitudeDistribution::default();
        // Midpoint of 65..=92 is 78.5: 74 is below, moves up.
        assert_eq!(dist.separate(75, 74, 65, 92), 77);
        // 85 is above, moves down.
        assert_eq!(dist.separate(84, 85, 65, 92), 82);
        // Far enough apart, untouched.
        assert_eq!(dist.separate(80, 74, 65, 92), 80);
        // Clipped against the floor range.
        assert_eq!(dist.separate(91, 90, 90, 92), 90);
    }

    proptest! {
        #[test]
        fn prop_magnitude_within_global_bounds(seed in any::<u64>(), previous in proptest::option::of(65u8..=92)) {
            let dist = MagnitudeDistribution::default();
            let mut rng = StdRng::seed_from_u64(seed);
            let value = dist.draw(previous, None, &mut rng);
            prop_assert!((65..=92).contains(&value));
        }

        #[test]
        fn prop_floor_is_strict_unless_clamped(seed in any::<u64>(), floor in 0u8..=100, previous in proptest::option::of(65u8..=92)) {
            let dist = MagnitudeDistribution::default();
            let mut rng = StdRng::seed_from_u64(seed);
            let value = dist.draw(previous, Some(floor), &mut rng);
            prop_assert!(value <= 92);
            if floor < 92 {
                prop_assert!(value > floor);
            } else {
                prop_assert_eq!(value, 92);
            }
        }

        #[test]
        fn prop_consecutive_values_are_spread(seed in any::<u64>(), previous in 65u8..=92, floor in proptest::option::of(0u8..=100)) {
            let dist = MagnitudeDistribution::default();
            let mut rng = StdRng::seed_from_u64(seed);
            let (lo, hi) = dist.range(floor);
            let value = dist.draw(Some(previous), floor, &mut rng);
            let gap = (value as i16 - previous as i16).abs();
            prop_assert!(gap >= 3 || value == lo || value == hi);
        }
    }
}
