//! Opaque ID newtypes for design entities.
//!
//! [`CellId`], [`NetId`], and [`PinId`] are thin `u32` wrappers used as arena
//! indices into the [`Design`](crate::data::Design). They are `Copy`, `Hash`,
//! `Ord`, and `Serialize`/`Deserialize`.

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
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a cell in the design.
    CellId
);

define_id!(
    /// Opaque, copyable ID for a net in the design.
    NetId
);

define_id!(
    /// Opaque, copyable ID for a pin in the design.
    PinId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn cell_id_roundtrip() {
        let id = CellId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }

    #[test]
    fn id_equality() {
        assert_eq!(NetId::from_raw(3), NetId::from_raw(3));
        assert_ne!(NetId::from_raw(3), NetId::from_raw(4));
    }

    #[test]
    fn id_hash() {
        let mut set = HashSet::new();
        set.insert(PinId::from_raw(1));
        set.insert(PinId::from_raw(2));
        set.insert(PinId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_display() {
        assert_eq!(CellId::from_raw(9).to_string(), "9");
    }
}
