//! Named layout styles a render request can ask for.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStyle {
    /// Cover, packed grid spreads, lifestyle spreads, contact page.
    #[default]
    Magazine,
    /// Cover, one product per page, contact page.
    Catalog,
}

impl LayoutStyle {
    pub const ALL: [LayoutStyle; 2] = [LayoutStyle::Magazine, LayoutStyle::Catalog];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutStyle::Magazine => "magazine",
            LayoutStyle::Catalog => "catalog",
        }
    }

    /// Exact, case-insensitive lookup.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Resolve the style of a render request. Unknown names fall back to
    /// `default` instead of failing the render.
    pub fn from_request(requested: Option<&str>, default: LayoutStyle) -> Self {
        match requested {
            None => default,
            Some(name) => Self::parse(name).unwrap_or_else(|| {
                warn!(
                    target = "render::style",
                    requested = name,
                    fallback = default.as_str(),
                    "unknown layout style; using default"
                );
                default
            }),
        }
    }
}

impl fmt::Display for LayoutStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_styles() {
        assert_eq!(LayoutStyle::parse("magazine"), Some(LayoutStyle::Magazine));
        assert_eq!(LayoutStyle::parse("Catalog"), Some(LayoutStyle::Catalog));
        assert_eq!(LayoutStyle::parse(" MAGAZINE "), Some(LayoutStyle::Magazine));
    }

    #[test]
    fn parse_unknown_is_none() {
        assert_eq!(LayoutStyle::parse("brochure"), None);
    }

    #[test]
    fn request_without_style_uses_default() {
        assert_eq!(
            LayoutStyle::from_request(None, LayoutStyle::Catalog),
            LayoutStyle::Catalog
        );
    }

    #[test]
    fn unknown_request_falls_back() {
        assert_eq!(
            LayoutStyle::from_request(Some("zine"), LayoutStyle::Magazine),
            LayoutStyle::Magazine
        );
    }

    #[test]
    fn known_request_wins_over_default() {
        assert_eq!(
            LayoutStyle::from_request(Some("catalog"), LayoutStyle::Magazine),
            LayoutStyle::Catalog
        );
    }

    #[test]
    fn default_is_magazine() {
        assert_eq!(LayoutStyle::default(), LayoutStyle::Magazine);
    }
}
