//! Gallery category (closed set)

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Business,
    Networking,
    Recognition,
    Events,
    Awards,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Business,
        Category::Networking,
        Category::Recognition,
        Category::Events,
        Category::Awards,
        Category::Other,
    ];

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Business => "Business",
            Category::Networking => "Networking",
            Category::Recognition => "Recognition",
            Category::Events => "Events",
            Category::Awards => "Awards",
            Category::Other => "Other",
        }
    }

    /// Exact, case-sensitive match on the stored name
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// "Business, Networking, ..." for error messages
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(Category::parse("Awards"), Some(Category::Awards));
        assert_eq!(Category::parse("awards"), None);
        assert_eq!(Category::parse("All"), None);
    }

    #[test]
    fn test_serializes_as_name() {
        let json = serde_json::to_string(&Category::Recognition).unwrap();
        assert_eq!(json, "\"Recognition\"");
    }
}
