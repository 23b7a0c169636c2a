use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifier Newtypes
// ============================================================================

macro_rules! sequential_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value
            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().trim_start_matches($prefix).parse().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

sequential_id!(
    /// Feeder identifier, assigned sequentially by the topology store and never reused
    FeederId,
    "F"
);

sequential_id!(
    /// Area identifier, assigned sequentially by the topology store and never reused
    AreaId,
    "A"
);

sequential_id!(
    /// Maintenance ticket identifier
    TicketId,
    "T"
);

// ============================================================================
// Numeric Helpers
// ============================================================================

/// Hours in one planning cycle
pub const HOURS_PER_DAY: u8 = 24;

/// Returns true when `value` is a usable non-negative quantity (kW, kWh)
pub fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
