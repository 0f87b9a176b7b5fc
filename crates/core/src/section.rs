// crates/core/src/section.rs
//! The fixed set of page sections the tracker accepts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Page sections of the portfolio site.
///
/// This is a closed set. Events naming anything else are rejected at the
/// API boundary rather than stored as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Hero,
    About,
    Skills,
    Projects,
    Experience,
    Blog,
    Contact,
    Footer,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Hero,
        Section::About,
        Section::Skills,
        Section::Projects,
        Section::Experience,
        Section::Blog,
        Section::Contact,
        Section::Footer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::About => "about",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Experience => "experience",
            Section::Blog => "blog",
            Section::Contact => "contact",
            Section::Footer => "footer",
        }
    }

    /// Parse a section name as sent by the client. Case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hero" => Some(Section::Hero),
            "about" => Some(Section::About),
            "skills" => Some(Section::Skills),
            "projects" => Some(Section::Projects),
            "experience" => Some(Section::Experience),
            "blog" => Some(Section::Blog),
            "contact" => Some(Section::Contact),
            "footer" => Some(Section::Footer),
            _ => None,
        }
    }

    /// Comma-separated list of valid names, for error messages.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_every_section() {
        for section in Section::ALL {
            assert_eq!(Section::parse(section.as_str()), Some(section));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_cased_names() {
        assert_eq!(Section::parse("sidebar"), None);
        assert_eq!(Section::parse("Hero"), None);
        assert_eq!(Section::parse(""), None);
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Section::Projects).unwrap();
        assert_eq!(json, "\"projects\"");
        let back: Section = serde_json::from_str("\"footer\"").unwrap();
        assert_eq!(back, Section::Footer);
    }

    #[test]
    fn test_valid_names_lists_all_eight() {
        let names = Section::valid_names();
        assert_eq!(names.split(", ").count(), 8);
        assert!(names.starts_with("hero"));
        assert!(names.ends_with("footer"));
    }
}
