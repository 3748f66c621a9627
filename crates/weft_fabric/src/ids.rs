//! Opaque ID newtypes for fabric entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, `Ord`, and
//! `Serialize`/`Deserialize`. [`BelId`] and [`SitePipId`] index into the
//! site-type definition of the site they are paired with.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a site (placement location) in the device.
    SiteId
);

define_id!(
    /// Opaque, copyable ID for a BEL within its site's type definition.
    BelId
);

define_id!(
    /// Opaque, copyable ID for a node of the general interconnect graph.
    NodeId
);

define_id!(
    /// Opaque, copyable ID for a SitePIP within its site's type definition.
    SitePipId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        let id = NodeId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
        assert_eq!(id.index(), 42);
    }

    #[test]
    fn ids_order_by_index() {
        assert!(SiteId::from_raw(1) < SiteId::from_raw(2));
        let mut pairs = vec![
            (SiteId::from_raw(2), BelId::from_raw(0)),
            (SiteId::from_raw(1), BelId::from_raw(3)),
            (SiteId::from_raw(1), BelId::from_raw(1)),
        ];
        pairs.sort();
        assert_eq!(pairs[0], (SiteId::from_raw(1), BelId::from_raw(1)));
        assert_eq!(pairs[2].0, SiteId::from_raw(2));
    }

    #[test]
    fn ids_in_hash_set() {
        let mut set = HashSet::new();
        set.insert(SitePipId::from_raw(1));
        set.insert(SitePipId::from_raw(1));
        set.insert(SitePipId::from_raw(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_shows_index() {
        assert_eq!(format!("{}", BelId::from_raw(7)), "7");
    }

    #[test]
    fn serde_roundtrip() {
        let id = SiteId::from_raw(55);
        let json = serde_json::to_string(&id).unwrap();
        let back: SiteId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
