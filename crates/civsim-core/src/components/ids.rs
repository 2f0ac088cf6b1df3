//! Stable numeric identifiers. hecs entities are not persisted, these are.

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Settlement identifier, unique per civilization
    SettlementId
);
id_type!(
    /// Villager identifier, unique per civilization
    VillagerId
);
id_type!(
    /// Build order identifier, unique per civilization
    BuildOrderId
);
