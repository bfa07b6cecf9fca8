//! # Sample Library
//!
//! Pre-loaded demo samples the user can pick instead of uploading a photo.
//! Library samples always produce the same analysis, which makes them the
//! reference fixtures of the demo.

use serde::Serialize;

/// A catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySample {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
}

/// Library id of the apple sample.
pub const APPLE: &str = "apple";

/// Library id of the milk sample.
pub const MILK: &str = "milk";

/// All library samples, in display order.
pub const SAMPLES: [LibrarySample; 2] = [
    LibrarySample {
        id: APPLE,
        name: "Red Apple",
        category: "Fruit",
    },
    LibrarySample {
        id: MILK,
        name: "Fresh Milk",
        category: "Dairy",
    },
];

/// Looks up a sample by id (case-sensitive, like the tags it produces).
pub fn find(id: &str) -> Option<&'static LibrarySample> {
    SAMPLES.iter().find(|s| s.id == id)
}

/// Returns true if `id` names a library sample.
pub fn contains(id: &str) -> bool {
    find(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find() {
        let apple = find("apple").unwrap();
        assert_eq!(apple.name, "Red Apple");
        assert_eq!(apple.category, "Fruit");

        assert!(find("Apple").is_none());
        assert!(!contains("uploaded"));
        assert!(contains(MILK));
    }
}
