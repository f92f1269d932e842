//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. All IDs in this
//! system are server-assigned opaque strings, so the wrappers hold `String`
//! rather than integers.

/// Macro to define a type-safe ID wrapper around an opaque string.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use meridian_core::define_id;
/// define_id!(LineId);
/// define_id!(ItemId);
///
/// let line_id = LineId::new("line_42");
/// let item_id = ItemId::new("PART-0042");
///
/// // These are different types, so this won't compile:
/// // let _: LineId = item_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(LineId);
define_id!(ItemId);
define_id!(OrderId);
define_id!(ServiceTypeId);
define_id!(ServiceCenterId);
define_id!(SlotId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_ids_compare_equal_by_value() {
        let a = LineId::new("line_1");
        let b = LineId::from("line_1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "line_1");
    }

    #[test]
    fn test_display_matches_inner() {
        let id = OrderId::new("ORD_20250101_001");
        assert_eq!(format!("{id}"), "ORD_20250101_001");
    }

    #[test]
    fn test_serde_transparent() {
        let id = ItemId::new("PART-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"PART-7\"");

        let parsed: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_into_inner() {
        let id = SlotId::new("slot-10-00");
        assert_eq!(id.into_inner(), "slot-10-00");
    }
}
