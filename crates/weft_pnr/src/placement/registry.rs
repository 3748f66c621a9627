//! Exclusive ownership of `(site, BEL)` pairs.

use crate::error::PnrError;
use crate::ids::CellId;
use std::collections::BTreeMap;
use weft_fabric::{BelId, SiteId};

/// Tracks which cell holds each occupied `(site, BEL)` pair.
///
/// Occupation is permanent for the lifetime of a run; there is no release.
#[derive(Debug, Clone, Default)]
pub struct PlacementRegistry {
    occupied: BTreeMap<(SiteId, BelId), CellId>,
}

impl PlacementRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `cell` on `(site, bel)`.
    ///
    /// Fails with [`PnrError::PlacementConflict`] if the pair is already held,
    /// leaving the registry unchanged.
    pub fn occupy(&mut self, site: SiteId, bel: BelId, cell: CellId) -> Result<(), PnrError> {
        if let Some(&occupant) = self.occupied.get(&(site, bel)) {
            return Err(PnrError::PlacementConflict {
                site,
                bel,
                occupant,
            });
        }
        self.occupied.insert((site, bel), cell);
        Ok(())
    }

    /// Returns `true` if the pair is held.
    pub fn is_occupied(&self, site: SiteId, bel: BelId) -> bool {
        self.occupied.contains_key(&(site, bel))
    }

    /// Returns the cell holding the pair.
    pub fn occupant(&self, site: SiteId, bel: BelId) -> Option<CellId> {
        self.occupied.get(&(site, bel)).copied()
    }

    /// Returns the number of held pairs.
    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    /// Returns `true` if nothing is placed.
    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    /// Iterates over held pairs in `(site, BEL)` order.
    pub fn iter(&self) -> impl Iterator<Item = ((SiteId, BelId), CellId)> + '_ {
        self.occupied.iter().map(|(&k, &v)| (k, v))
    }
}
