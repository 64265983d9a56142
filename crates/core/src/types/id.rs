//! Newtype IDs for type-safe entity references.
//!
//! The backend hands out opaque string identifiers (document ids). Use the
//! `define_id!` macro to create wrappers that prevent accidentally mixing
//! IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use rakhshan_core::define_id;
/// define_id!(CustomerId);
/// define_id!(InvoiceId);
///
/// let customer = CustomerId::new("64f1c0ffee");
/// let invoice = InvoiceId::new("64f1c0ffee");
///
/// // These are different types, so this won't compile:
/// // let _: CustomerId = invoice;
/// # let _ = (customer, invoice);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID, returning the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
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

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(OrderId);

impl OrderId {
    /// Number of trailing characters shown in compact order listings.
    pub const SHORT_LEN: usize = 6;

    /// The last six characters of the id, as shown in order tables.
    ///
    /// Shorter ids are returned whole.
    #[must_use]
    pub fn short(&self) -> &str {
        let count = self.0.chars().count();
        if count <= Self::SHORT_LEN {
            return &self.0;
        }
        let skip = count - Self::SHORT_LEN;
        self.0
            .char_indices()
            .nth(skip)
            .and_then(|(offset, _)| self.0.get(offset..))
            .unwrap_or(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_conversion() {
        let id = ProductId::new("65a1b2c3");
        assert_eq!(id.to_string(), "65a1b2c3");
        assert_eq!(id.as_str(), "65a1b2c3");
        assert_eq!(String::from(id.clone()), "65a1b2c3");
        assert_eq!(ProductId::from("65a1b2c3"), id);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = OrderId::new("abc");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"abc\""));
    }

    #[test]
    fn test_order_id_short() {
        assert_eq!(OrderId::new("65f0a1b2c3d4e5f6a7b8c9d0").short(), "b8c9d0");
        assert_eq!(OrderId::new("abc").short(), "abc");
        assert_eq!(OrderId::new("123456").short(), "123456");
    }
}
