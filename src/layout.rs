//! Grid layout for curated product selections.
//!
//! All functions here are pure: no I/O, no randomness, and the same input
//! always yields the same slots. The renderer calls [`resolve_layout`] fresh
//! on every render; slots are never persisted.
//!
//! The first selection is the hero and gets the larger footprint:
//!
//! ```text
//! position  orientation  columns  rows
//! hero      landscape    3        2
//! hero      portrait     1        2
//! hero      square       2        2
//! standard  landscape    2        1
//! standard  portrait     1        2
//! standard  square       1        1
//! ```

use crate::types::{Orientation, Product, ProductSelection};
use serde::Serialize;

/// Aspect ratios strictly above this are landscape.
pub const LANDSCAPE_THRESHOLD: f64 = 1.2;
/// Aspect ratios strictly below this are portrait.
pub const PORTRAIT_THRESHOLD: f64 = 0.8;

/// A selection paired with the catalog product it refers to.
#[derive(Debug, Clone, Copy)]
pub struct Selected<'a> {
    pub selection: &'a ProductSelection,
    pub product: &'a Product,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Hero,
    Standard,
}

/// Grid placement of one selection. `index` is its position in curation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutSlot {
    pub index: usize,
    pub product_id: String,
    pub placement: Placement,
    pub orientation: Orientation,
    pub grid_column: u8,
    pub grid_row: u8,
}

impl LayoutSlot {
    /// Number of grid cells this slot occupies.
    pub fn area(&self) -> u32 {
        u32::from(self.grid_column) * u32::from(self.grid_row)
    }
}

/// Parse a decimal aspect ratio. Non-numeric and non-finite values are `None`.
pub fn parse_aspect_ratio(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|r| r.is_finite())
}

/// Classify a width/height ratio. Both thresholds are inclusive to square.
pub fn classify_ratio(ratio: f64) -> Orientation {
    if ratio > LANDSCAPE_THRESHOLD {
        Orientation::Landscape
    } else if ratio < PORTRAIT_THRESHOLD {
        Orientation::Portrait
    } else {
        Orientation::Square
    }
}

/// Resolve a product's orientation class.
///
/// Stored orientation wins; otherwise the aspect ratio decides; otherwise square.
pub fn resolve_orientation(product: &Product) -> Orientation {
    if let Some(orientation) = product.orientation {
        return orientation;
    }
    product
        .aspect_ratio
        .as_deref()
        .and_then(parse_aspect_ratio)
        .map(classify_ratio)
        .unwrap_or(Orientation::Square)
}

/// Column and row spans for a placement.
pub fn spans(placement: Placement, orientation: Orientation) -> (u8, u8) {
    match (placement, orientation) {
        (Placement::Hero, Orientation::Landscape) => (3, 2),
        (Placement::Hero, Orientation::Portrait) => (1, 2),
        (Placement::Hero, Orientation::Square) => (2, 2),
        (Placement::Standard, Orientation::Landscape) => (2, 1),
        (Placement::Standard, Orientation::Portrait) => (1, 2),
        (Placement::Standard, Orientation::Square) => (1, 1),
    }
}

/// Lay out selections in curation order. One slot per input, none dropped.
pub fn resolve_layout(selected: &[Selected<'_>]) -> Vec<LayoutSlot> {
    selected
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let placement = if index == 0 {
                Placement::Hero
            } else {
                Placement::Standard
            };
            let orientation = resolve_orientation(item.product);
            let (grid_column, grid_row) = spans(placement, orientation);
            LayoutSlot {
                index,
                product_id: item.selection.product_id.clone(),
                placement,
                orientation,
                grid_column,
                grid_row,
            }
        })
        .collect()
}
