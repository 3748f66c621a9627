//! Seeded, bounded rejection sampling over candidate resources.

use crate::placement::registry::PlacementRegistry;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use weft_fabric::{BelId, SiteId};

/// Draws uniformly random unoccupied candidates with a reproducible PRNG.
#[derive(Debug)]
pub struct CandidateSampler {
    rng: StdRng,
    max_attempts: u32,
}

impl CandidateSampler {
    /// Creates a sampler. The same seed yields the same sequence of draws.
    pub fn new(seed: u64, max_attempts: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_attempts,
        }
    }

    /// Draws candidates until one is unoccupied.
    ///
    /// Returns `None` without drawing when every candidate is occupied, and
    /// after `max_attempts` rejected draws otherwise.
    pub fn sample(
        &mut self,
        candidates: &[(SiteId, BelId)],
        registry: &PlacementRegistry,
    ) -> Option<(SiteId, BelId)> {
        if candidates
            .iter()
            .all(|&(site, bel)| registry.is_occupied(site, bel))
        {
            return None;
        }
        for _ in 0..self.max_attempts {
            let (site, bel) = candidates[self.rng.gen_range(0..candidates.len())];
            if !registry.is_occupied(site, bel) {
                return Some((site, bel));
            }
        }
        None
    }
}
