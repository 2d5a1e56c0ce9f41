//! Newtype wrappers for catalog identifiers.
//!
//! Catalog rows are keyed by integer ids. Wrapping them keeps a variant id
//! from being passed where an option id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! catalog_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

catalog_id!(
    /// Identifier of a product row.
    ProductId
);
catalog_id!(
    /// Identifier of a purchasable variant of a product.
    VariantId
);
catalog_id!(
    /// Identifier of a configuration category (e.g. "Beam Angle").
    CategoryId
);
catalog_id!(
    /// Identifier of a selectable option inside a category.
    OptionId
);
catalog_id!(AccessoryId);
catalog_id!(FeatureId);
catalog_id!(AssetId);
