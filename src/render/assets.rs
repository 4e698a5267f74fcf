//! Image selection and resolution.
//!
//! Choosing which image represents a selection is pure: the variant index
//! picks the image set, the image index picks within it. Turning the chosen
//! reference into a URL goes through an [`AssetSource`], which may fail per
//! image. Every failure here is an [`AssetMissing`]: the caller substitutes a
//! placeholder and keeps rendering.

use crate::types::{Product, ProductSelection, ProductVariant};
use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Why an image could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissingReason {
    ImageOutOfRange { index: usize, available: usize },
    VariantOutOfRange { index: usize, available: usize },
    Unreachable { detail: String },
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReason::ImageOutOfRange { index, available } => {
                write!(f, "image index {index} out of range ({available} available)")
            }
            MissingReason::VariantOutOfRange { index, available } => {
                write!(f, "variant index {index} out of range ({available} available)")
            }
            MissingReason::Unreachable { detail } => write!(f, "unreachable: {detail}"),
        }
    }
}

/// An individual image or variant that could not be rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{reference}: {reason}")]
pub struct AssetMissing {
    /// Image reference, or product id when no reference could be chosen.
    pub reference: String,
    pub reason: MissingReason,
}

impl AssetMissing {
    pub fn unreachable(reference: &str, detail: impl Into<String>) -> Self {
        Self {
            reference: reference.to_string(),
            reason: MissingReason::Unreachable {
                detail: detail.into(),
            },
        }
    }
}

/// Resolves image references from collaborator storage into URLs.
pub trait AssetSource: Sync {
    fn resolve(&self, reference: &str) -> Result<String, AssetMissing>;
}

/// Accepts every non-empty reference. Relative references are joined onto
/// `base_url` when one is configured; absolute URLs pass through.
#[derive(Debug, Clone, Default)]
pub struct StaticAssets {
    base_url: Option<String>,
}

impl StaticAssets {
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }
}

impl AssetSource for StaticAssets {
    fn resolve(&self, reference: &str) -> Result<String, AssetMissing> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(AssetMissing::unreachable(reference, "empty reference"));
        }
        if is_absolute_url(reference) {
            return Ok(reference.to_string());
        }
        Ok(match &self.base_url {
            Some(base) => join_url(base, reference),
            None => reference.to_string(),
        })
    }
}

/// Serves images from a local directory. A reference resolves only if the
/// file exists under `root`.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
    url_prefix: Option<String>,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>, url_prefix: Option<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix,
        }
    }
}

impl AssetSource for DirAssets {
    fn resolve(&self, reference: &str) -> Result<String, AssetMissing> {
        let relative = Path::new(reference.trim());
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if reference.trim().is_empty() || !contained {
            return Err(AssetMissing::unreachable(reference, "reference outside asset root"));
        }
        let path = self.root.join(relative);
        if !path.is_file() {
            return Err(AssetMissing::unreachable(
                reference,
                format!("{} not found", path.display()),
            ));
        }
        Ok(match &self.url_prefix {
            Some(prefix) => join_url(prefix, reference.trim()),
            None => path.display().to_string(),
        })
    }
}

fn is_absolute_url(reference: &str) -> bool {
    reference.starts_with("https://") || reference.starts_with("http://")
}

fn join_url(base: &str, reference: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        reference.trim_start_matches('/')
    )
}

/// The image set and variant metadata a selection renders with.
#[derive(Debug, Clone, Copy)]
pub struct Representation<'a> {
    pub images: &'a [String],
    pub variant: Option<&'a ProductVariant>,
}

/// Pick the image set for a selection.
///
/// No variant index means the base product. A variant with no images of its
/// own still labels the tile but borrows the base images. An out-of-range
/// variant index falls back to the base product and reports the miss.
pub fn representation<'a>(
    selection: &ProductSelection,
    product: &'a Product,
) -> (Representation<'a>, Option<AssetMissing>) {
    let base = Representation {
        images: &product.images,
        variant: None,
    };
    let Some(index) = selection.variant_index else {
        return (base, None);
    };
    match product.variants.get(index) {
        Some(variant) => {
            let images = if variant.images.is_empty() {
                &product.images
            } else {
                &variant.images
            };
            (
                Representation {
                    images,
                    variant: Some(variant),
                },
                None,
            )
        }
        None => (
            base,
            Some(AssetMissing {
                reference: product.id.clone(),
                reason: MissingReason::VariantOutOfRange {
                    index,
                    available: product.variants.len(),
                },
            }),
        ),
    }
}

/// Pick the image reference at the selection's index.
pub fn choose_image<'a>(
    selection: &ProductSelection,
    product: &Product,
    repr: &Representation<'a>,
) -> Result<&'a str, AssetMissing> {
    let images: &'a [String] = repr.images;
    images
        .get(selection.image_index)
        .map(String::as_str)
        .ok_or_else(|| AssetMissing {
            reference: product.id.clone(),
            reason: MissingReason::ImageOutOfRange {
                index: selection.image_index,
                available: repr.images.len(),
            },
        })
}
