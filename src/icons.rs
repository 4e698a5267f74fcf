//! Interest tag → icon mapping.
//!
//! Moodboards carry `primary_interests` as free-form tags. A closed set of
//! known tags maps to a dedicated icon; anything else gets the generic entry.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestIcon {
    Kitchen,
    Bathroom,
    Flooring,
    Lighting,
    Furniture,
    Outdoor,
    Walls,
    Hardware,
    Generic,
}

/// Known tags and their aliases, matched case-insensitively.
const TAGS: &[(&str, InterestIcon)] = &[
    ("kitchen", InterestIcon::Kitchen),
    ("kitchens", InterestIcon::Kitchen),
    ("bathroom", InterestIcon::Bathroom),
    ("bathrooms", InterestIcon::Bathroom),
    ("bath", InterestIcon::Bathroom),
    ("flooring", InterestIcon::Flooring),
    ("floors", InterestIcon::Flooring),
    ("tiles", InterestIcon::Flooring),
    ("lighting", InterestIcon::Lighting),
    ("lights", InterestIcon::Lighting),
    ("furniture", InterestIcon::Furniture),
    ("outdoor", InterestIcon::Outdoor),
    ("landscaping", InterestIcon::Outdoor),
    ("walls", InterestIcon::Walls),
    ("wallcovering", InterestIcon::Walls),
    ("paint", InterestIcon::Walls),
    ("hardware", InterestIcon::Hardware),
    ("fixtures", InterestIcon::Hardware),
];

impl InterestIcon {
    /// Look up a tag. Unknown tags map to [`InterestIcon::Generic`].
    pub fn for_tag(tag: &str) -> Self {
        let tag = tag.trim();
        TAGS.iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(tag))
            .map(|(_, icon)| *icon)
            .unwrap_or(InterestIcon::Generic)
    }

    /// CSS class the document stylesheet draws the icon with.
    pub fn css_class(self) -> &'static str {
        match self {
            InterestIcon::Kitchen => "icon-kitchen",
            InterestIcon::Bathroom => "icon-bathroom",
            InterestIcon::Flooring => "icon-flooring",
            InterestIcon::Lighting => "icon-lighting",
            InterestIcon::Furniture => "icon-furniture",
            InterestIcon::Outdoor => "icon-outdoor",
            InterestIcon::Walls => "icon-walls",
            InterestIcon::Hardware => "icon-hardware",
            InterestIcon::Generic => "icon-generic",
        }
    }

    /// Glyph shown inline in text contexts (email bodies, CLI output).
    pub fn glyph(self) -> &'static str {
        match self {
            InterestIcon::Kitchen => "◰",
            InterestIcon::Bathroom => "◌",
            InterestIcon::Flooring => "▦",
            InterestIcon::Lighting => "✧",
            InterestIcon::Furniture => "⊓",
            InterestIcon::Outdoor => "♣",
            InterestIcon::Walls => "▥",
            InterestIcon::Hardware => "⚙",
            InterestIcon::Generic => "•",
        }
    }
}

/// An interest as rendered: the original tag plus its icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interest {
    pub tag: String,
    pub icon: InterestIcon,
}

impl Interest {
    pub fn from_tag(tag: &str) -> Self {
        Self {
            tag: tag.trim().to_string(),
            icon: InterestIcon::for_tag(tag),
        }
    }
}
