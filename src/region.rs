//! Region keys derived from free-text place descriptions.
//!
//! USGS place strings look like `"10km SE of Springfield, IL"`. The region
//! is the text after the last comma. This is a text heuristic, not a
//! geocoder: `"NV"` stays `"NV"` and `"Pacific-Antarctic Ridge"` is its own
//! region.

/// Region used when an event has no place text.
pub const UNKNOWN_REGION: &str = "Unknown";

/// Derive the grouping key for a place description.
///
/// Takes the last comma-separated segment and trims it. A missing or empty
/// place yields [`UNKNOWN_REGION`].
#[must_use]
pub fn region_key(place: Option<&str>) -> &str {
    match place {
        None | Some("") => UNKNOWN_REGION,
        Some(text) => text.rsplit(',').next().unwrap_or(text).trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_segment() {
        assert_eq!(region_key(Some("10km SE of Springfield, IL")), "IL");
        assert_eq!(region_key(Some("5km N of Reno, NV")), "NV");
        assert_eq!(region_key(Some("south of the Fiji Islands")), "south of the Fiji Islands");
    }

    #[test]
    fn test_last_of_many_segments() {
        assert_eq!(region_key(Some("Near Foo, Bar,  Baz  ")), "Baz");
    }

    #[test]
    fn test_bare_code_unchanged() {
        assert_eq!(region_key(Some("NV")), "NV");
    }

    #[test]
    fn test_missing_place_is_unknown() {
        assert_eq!(region_key(None), UNKNOWN_REGION);
        assert_eq!(region_key(Some("")), UNKNOWN_REGION);
    }

    #[test]
    fn test_idempotent() {
        for place in ["10km SE of Springfield, IL", "Alaska", " Chile ", "a,b,c"] {
            let once = region_key(Some(place));
            assert_eq!(region_key(Some(once)), once);
        }
    }

    #[test]
    fn test_trailing_comma_yields_empty_segment() {
        assert_eq!(region_key(Some("Somewhere, ")), "");
    }
}
