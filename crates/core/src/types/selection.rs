//! Size and color selections.
//!
//! A product with no sizes (or no colors) needs no selection, so a cart line
//! stores `None` for it. The backend and persisted carts spell that absence
//! as the string `"N/A"`; the conversion lives here and nowhere else.

use serde::{Deserialize, Deserializer, Serializer};

/// Wire and display spelling of "no selection".
pub const NOT_APPLICABLE: &str = "N/A";

/// Render a selection for display.
#[must_use]
pub fn display(selection: Option<&str>) -> &str {
    selection.unwrap_or(NOT_APPLICABLE)
}

/// Normalize a raw selection: blank values and the sentinel mean `None`.
#[must_use]
pub fn normalize(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty() && s != NOT_APPLICABLE)
}

/// Serialize `Option<String>` as the selection or `"N/A"`.
///
/// # Errors
///
/// Propagates serializer errors.
#[allow(clippy::ref_option)] // signature required by `#[serde(serialize_with)]`
pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(display(value.as_deref()))
}

/// Deserialize `"N/A"`, `""` or `null` as `None`.
///
/// # Errors
///
/// Fails when the value is neither a string nor `null`.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<String>::deserialize(deserializer).map(normalize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Line {
        #[serde(with = "crate::types::selection")]
        size: Option<String>,
    }

    #[test]
    fn test_none_round_trips_through_sentinel() {
        let json = serde_json::to_string(&Line { size: None }).unwrap();
        assert_eq!(json, r#"{"size":"N/A"}"#);
        assert_eq!(serde_json::from_str::<Line>(&json).unwrap(), Line { size: None });
    }

    #[test]
    fn test_blank_and_null_are_none() {
        assert_eq!(serde_json::from_str::<Line>(r#"{"size":""}"#).unwrap().size, None);
        assert_eq!(serde_json::from_str::<Line>(r#"{"size":null}"#).unwrap().size, None);
        assert_eq!(
            serde_json::from_str::<Line>(r#"{"size":"M"}"#).unwrap().size.as_deref(),
            Some("M")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(display(None), "N/A");
        assert_eq!(display(Some("L")), "L");
    }
}
