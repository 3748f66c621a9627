//! Typed failures of placement, site configuration and routing operations.

use weft_common::InternalError;
use weft_fabric::{BelId, PrimitiveKind, SiteId};

use crate::ids::CellId;

/// Errors produced by individual flow operations.
///
/// Only [`PnrError::NoLegalPlacement`] aborts a run; callers report the others
/// as diagnostics and continue.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PnrError {
    /// A `(site, BEL)` pair is already held by another cell.
    #[error("site {site} BEL {bel} is already occupied by cell {occupant}")]
    PlacementConflict {
        /// The contested site.
        site: SiteId,
        /// The contested BEL.
        bel: BelId,
        /// The cell holding it.
        occupant: CellId,
    },

    /// No compatible unoccupied resource could be found for a cell.
    #[error("no legal placement for {kind} cell '{cell}'")]
    NoLegalPlacement {
        /// The cell name.
        cell: String,
        /// The cell's primitive type.
        kind: PrimitiveKind,
    },

    /// A cell was assigned to a BEL that cannot host its primitive type.
    #[error("BEL {site}/{bel} cannot host cell '{cell}'")]
    Incompatible {
        /// The cell name.
        cell: String,
        /// The site name.
        site: String,
        /// The BEL name.
        bel: String,
    },

    /// An operation needs a placed cell.
    #[error("cell '{cell}' is not placed")]
    Unplaced {
        /// The cell name.
        cell: String,
    },

    /// A site mux already selects a different input.
    #[error("mux {site}/{mux} already selects '{active}', cannot select '{requested}'")]
    SitePipConflict {
        /// The site name.
        site: String,
        /// The routing mux.
        mux: String,
        /// The input currently selected.
        active: String,
        /// The input that was requested.
        requested: String,
    },

    /// No SitePIP connects a cell pin to its site boundary.
    #[error("no SitePIP connects pin '{cell}/{pin}' to its site")]
    SitePipNotFound {
        /// The cell name.
        cell: String,
        /// The logical pin name.
        pin: String,
    },

    /// The interconnect search exhausted its frontier before reaching a sink.
    #[error("net '{net}' could not be routed to sink '{sink}'")]
    RouteFailed {
        /// The net name.
        net: String,
        /// The sink pin, as `cell/pin`.
        sink: String,
    },

    /// A locked net cannot be re-routed.
    #[error("net '{net}' is locked")]
    NetLocked {
        /// The net name.
        net: String,
    },

    /// A net pin has no interconnect node to start or end a route at.
    #[error("pin '{pin}' of net '{net}' has no interconnect node")]
    UnroutableEndpoint {
        /// The net name.
        net: String,
        /// The pin, as `cell/pin`.
        pin: String,
    },

    /// A broken internal invariant.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl PnrError {
    /// Returns `true` for errors that must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PnrError::NoLegalPlacement { .. } | PnrError::Internal(_)
        )
    }
}
