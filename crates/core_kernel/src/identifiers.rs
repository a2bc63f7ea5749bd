//! Typed identifiers
//!
//! Every entity key is a UUID wrapped in its own type, so a `SaleId` can never
//! be passed where a `VehicleId` is expected. On the wire the ids are plain
//! UUID strings; `Display` adds a short prefix for logs and messages, and
//! parsing accepts either form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A string that is not a UUID, with or without the expected prefix
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id {value:?}")]
pub struct IdParseError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// A random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// A time-ordered id; later calls sort after earlier ones
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let raw = trimmed
                    .split_once('-')
                    .filter(|(head, _)| head.eq_ignore_ascii_case(Self::PREFIX))
                    .map_or(trimmed, |(_, rest)| rest);
                Uuid::parse_str(raw).map(Self).map_err(|_| IdParseError {
                    kind: Self::PREFIX,
                    value: s.to_string(),
                })
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(
    /// A currency in the store
    CurrencyId => "CUR"
);
define_id!(RateHistoryId => "XRH");

define_id!(
    /// The aggregation root every stage, sale and image hangs off
    VehicleId => "CAR"
);
define_id!(
    /// An item of one of the reference lists (marks, colours, ...)
    ReferenceId => "REF"
);
define_id!(ImageId => "IMG");

define_id!(PurchaseId => "PUR");
define_id!(ShippingId => "SHP");
define_id!(WorldExpensesId => "WEX");
define_id!(KabulExpensesId => "KEX");
define_id!(RepairExpensesId => "REP");

define_id!(SaleId => "SAL");
define_id!(BuyerId => "BUY");
