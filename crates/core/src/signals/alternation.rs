//! Per-key alternation memory.

use rand::Rng;

use super::distribution::MagnitudeDistribution;
use super::model::Direction;

/// Last authoritative outcome for one signal key.
///
/// Starts empty and is overwritten by every production, upstream or
/// fallback. It never expires on its own; freshness is the cache's concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlternationEntry {
    pub last_direction: Option<Direction>,
    pub last_magnitude: Option<u8>,
}

impl AlternationEntry {
    /// Direction to publish for `candidate`: never the same as the last one.
    pub fn next_direction(&self, candidate: Direction) -> Direction {
        if self.last_direction == Some(candidate) {
            candidate.opposite()
        } else {
            candidate
        }
    }

    /// Settles the next outcome and records it.
    pub fn advance<R: Rng>(
        &mut self,
        candidate: Direction,
        floor: Option<u8>,
        distribution: &MagnitudeDistribution,
        rng: &mut R,
    ) -> (Direction, u8) {
        let direction = self.next_direction(candidate);
        let magnitude = distribution.draw(self.last_magnitude, floor, rng);

        self.last_direction = Some(direction);
        self.last_magnitude = Some(magnitude);
        (direction, magnitude)
    }
}
