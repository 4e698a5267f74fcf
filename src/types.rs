//! Records shared by every pipeline stage.
//!
//! [`Moodboard`] and [`Product`] are exactly what the store persists. Nothing
//! derived from them (layout slots, flipbook pages) is ever written back.

use crate::token::ShareToken;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// Orientation class of a product image, governing its grid spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Square => "square",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finish or variant of a catalog product with its own imagery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A catalog product. Owned by the catalog; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub lifestyle_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    /// Width over height as a decimal string, e.g. `"1.5"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<ProductVariant>,
}

/// One curated entry of a moodboard: which product, which of its images,
/// and optionally which variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSelection {
    pub product_id: String,
    #[serde(default)]
    pub image_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_index: Option<usize>,
}

/// Fields supplied by a creation request. Identity, share token and
/// timestamps are assigned by the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewMoodboard {
    pub user_name: String,
    pub user_email: String,
    pub client_name: Option<String>,
    pub project_name: Option<String>,
    pub project_location: Option<String>,
    pub project_details: Option<String>,
    pub send_to_designer: bool,
    pub designer_email: Option<String>,
    pub designer_name: Option<String>,
    pub property_type: Option<String>,
    pub property_size: Option<String>,
    pub project_timeline: Option<String>,
    pub budget_range: Option<String>,
    pub primary_interests: Vec<String>,
    pub product_data: Vec<ProductSelection>,
}

impl NewMoodboard {
    /// Materialize a record with the given identity and token.
    pub fn into_moodboard(
        self,
        id: Uuid,
        share_token: ShareToken,
        created_at: OffsetDateTime,
    ) -> Moodboard {
        Moodboard {
            id,
            share_token,
            user_name: self.user_name,
            user_email: self.user_email,
            client_name: self.client_name,
            project_name: self.project_name,
            project_location: self.project_location,
            project_details: self.project_details,
            send_to_designer: self.send_to_designer,
            designer_email: self.designer_email,
            designer_name: self.designer_name,
            property_type: self.property_type,
            property_size: self.property_size,
            project_timeline: self.project_timeline,
            budget_range: self.budget_range,
            primary_interests: self.primary_interests,
            product_data: self.product_data,
            created_at,
            aura_processed: false,
            crm_status: None,
        }
    }
}

/// A persisted, shareable moodboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moodboard {
    pub id: Uuid,
    pub share_token: ShareToken,
    pub user_name: String,
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_details: Option<String>,
    #[serde(default)]
    pub send_to_designer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_range: Option<String>,
    #[serde(default)]
    pub primary_interests: Vec<String>,
    #[serde(default)]
    pub product_data: Vec<ProductSelection>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Owned by downstream processing; never written by this crate.
    #[serde(default)]
    pub aura_processed: bool,
    /// Owned by the CRM integration; never written by this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crm_status: Option<String>,
}

impl Moodboard {
    /// Title used on the cover page and in email subjects.
    ///
    /// Falls back from project name to client name to the requester's name.
    pub fn title(&self) -> String {
        [self.project_name.as_deref(), self.client_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}'s moodboard", self.user_name))
    }
}

/// Caller-facing reference to a moodboard: either its id or its share token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoodboardRef {
    Id(Uuid),
    Token(ShareToken),
}

impl FromStr for MoodboardRef {
    type Err = crate::token::TokenError;

    /// UUIDs are ids; anything else must be a well-formed share token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Uuid::parse_str(s) {
            Ok(id) => Ok(MoodboardRef::Id(id)),
            Err(_) => s.parse().map(MoodboardRef::Token),
        }
    }
}

impl fmt::Display for MoodboardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoodboardRef::Id(id) => write!(f, "id {id}"),
            MoodboardRef::Token(token) => write!(f, "token {token}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_serializes_lowercase() {
        let json = serde_json::to_string(&Orientation::Landscape).unwrap();
        assert_eq!(json, r#""landscape""#);
        let parsed: Orientation = serde_json::from_str(r#""portrait""#).unwrap();
        assert_eq!(parsed, Orientation::Portrait);
    }

    #[test]
    fn product_optional_fields_default() {
        let product: Product = serde_json::from_str(
            r#"{"id": "p1", "name": "Tile", "brand": "Acme"}"#,
        )
        .unwrap();
        assert!(product.images.is_empty());
        assert!(product.lifestyle_images.is_empty());
        assert!(product.orientation.is_none());
        assert!(product.aspect_ratio.is_none());
        assert!(product.variants.is_empty());
    }

    #[test]
    fn selection_image_index_defaults_to_zero() {
        let sel: ProductSelection = serde_json::from_str(r#"{"product_id": "p1"}"#).unwrap();
        assert_eq!(sel.image_index, 0);
        assert_eq!(sel.variant_index, None);
    }

    #[test]
    fn into_moodboard_keeps_request_fields_and_clears_flags() {
        let new = NewMoodboard {
            user_name: "Ada".into(),
            user_email: "ada@example.com".into(),
            project_name: Some("Loft".into()),
            primary_interests: vec!["kitchen".into()],
            ..Default::default()
        };
        let token = ShareToken::generate();
        let id = Uuid::new_v4();
        let board = new.into_moodboard(id, token.clone(), OffsetDateTime::UNIX_EPOCH);
        assert_eq!(board.id, id);
        assert_eq!(board.share_token, token);
        assert_eq!(board.project_name.as_deref(), Some("Loft"));
        assert!(!board.aura_processed);
        assert!(board.crm_status.is_none());
    }

    #[test]
    fn title_falls_back_to_user_name() {
        let mut board = NewMoodboard {
            user_name: "Ada".into(),
            user_email: "ada@example.com".into(),
            ..Default::default()
        }
        .into_moodboard(Uuid::new_v4(), ShareToken::generate(), OffsetDateTime::UNIX_EPOCH);
        assert_eq!(board.title(), "Ada's moodboard");

        board.client_name = Some("Studio North".into());
        assert_eq!(board.title(), "Studio North");

        board.project_name = Some("Harbour Loft".into());
        assert_eq!(board.title(), "Harbour Loft");
    }

    #[test]
    fn moodboard_ref_parses_uuid_as_id() {
        let id = Uuid::new_v4();
        let parsed: MoodboardRef = id.to_string().parse().unwrap();
        assert_eq!(parsed, MoodboardRef::Id(id));
    }

    #[test]
    fn moodboard_ref_parses_token() {
        let token = ShareToken::generate();
        let parsed: MoodboardRef = token.as_str().parse().unwrap();
        assert_eq!(parsed, MoodboardRef::Token(token));
    }

    #[test]
    fn moodboard_ref_rejects_garbage() {
        assert!("not a token".parse::<MoodboardRef>().is_err());
    }

    #[test]
    fn moodboard_roundtrips_created_at_as_rfc3339() {
        let board = NewMoodboard {
            user_name: "Ada".into(),
            user_email: "ada@example.com".into(),
            ..Default::default()
        }
        .into_moodboard(Uuid::new_v4(), ShareToken::generate(), OffsetDateTime::UNIX_EPOCH);
        let json = serde_json::to_string(&board).unwrap();
        assert!(json.contains("1970-01-01T00:00:00Z"));
        let back: Moodboard = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }
}
