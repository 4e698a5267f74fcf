//! Moodboard rendering.
//!
//! Turns a moodboard, its catalog products and a resolved layout into a
//! [`Flipbook`] (paged state served at the share URL) and a [`Document`]
//! (the artifact that gets emailed).
//!
//! ```text
//! selections + products ──► layout slots ──► tiles ──► pages ──► engine ──► document
//!                                              ▲
//!                                        asset source
//! ```
//!
//! Failure handling is split by scope:
//!
//! - A single image that cannot be chosen or resolved is an [`AssetMissing`]:
//!   the tile gets a placeholder, the miss is logged and recorded in the
//!   [`RenderReport`], and rendering continues.
//! - An engine that cannot produce the artifact, or inputs that do not line
//!   up, is a [`RenderError`]. Nothing is delivered after one.
//!
//! The renderer only reads the moodboard. Given the same record, products,
//! style and asset availability it produces byte-identical documents.

mod assets;
mod engine;
mod pages;
mod style;

pub use assets::{
    AssetMissing, AssetSource, DirAssets, MissingReason, Representation, StaticAssets,
    choose_image, representation,
};
pub use engine::{Document, DocumentEngine, HtmlEngine, render_document};
pub use pages::{
    Contact, Cover, Flipbook, LifestyleShot, Page, PageContent, PageGrid, ProfileEntry, Tile,
    TileImage, build_flipbook, details_to_html, flipbook_url, paginate,
};
pub use style::LayoutStyle;

use crate::config::RenderConfig;
use crate::layout::{LayoutSlot, Selected};
use crate::types::Moodboard;
use rayon::prelude::*;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("document engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("malformed render input: {0}")]
    Malformed(String),
}

/// Degradations absorbed during a render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub missing: Vec<AssetMissing>,
}

impl RenderReport {
    pub fn is_degraded(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Output of a complete render.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub flipbook: Flipbook,
    pub document: Document,
    pub report: RenderReport,
}

/// Renders moodboards against an asset source and a document engine.
pub struct Renderer<'a> {
    assets: &'a dyn AssetSource,
    engine: &'a dyn DocumentEngine,
    settings: &'a RenderConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(
        assets: &'a dyn AssetSource,
        engine: &'a dyn DocumentEngine,
        settings: &'a RenderConfig,
    ) -> Self {
        Self {
            assets,
            engine,
            settings,
        }
    }

    /// Build the flipbook state without producing an artifact.
    ///
    /// This is the public read path: the web view needs pages, not bytes.
    pub fn flipbook(
        &self,
        moodboard: &Moodboard,
        selected: &[Selected<'_>],
        layout: &[LayoutSlot],
        style: LayoutStyle,
    ) -> Result<(Flipbook, RenderReport), RenderError> {
        check_alignment(selected, layout)?;

        let (tiles, mut missing): (Vec<Tile>, Vec<Vec<AssetMissing>>) = layout
            .par_iter()
            .map(|slot| self.tile(&selected[slot.index], slot))
            .unzip();

        let lifestyle = match style {
            LayoutStyle::Magazine => {
                let (shots, lifestyle_missing): (Vec<_>, Vec<_>) = selected
                    .par_iter()
                    .filter_map(|item| self.lifestyle_shot(item))
                    .unzip();
                missing.extend(lifestyle_missing);
                shots
            }
            LayoutStyle::Catalog => Vec::new(),
        };

        let report = RenderReport {
            missing: missing.into_iter().flatten().collect(),
        };
        for miss in &report.missing {
            warn!(
                target = "render::assets",
                share_token = %moodboard.share_token,
                reference = %miss.reference,
                reason = %miss.reason,
                "asset missing; substituting placeholder"
            );
        }

        let grid = PageGrid {
            columns: self.settings.page_columns,
            rows: self.settings.page_rows,
        };
        let flipbook = build_flipbook(
            moodboard,
            tiles,
            lifestyle,
            style,
            grid,
            &self.settings.base_url,
        );
        Ok((flipbook, report))
    }

    /// Full render: flipbook state plus the document artifact.
    pub fn render(
        &self,
        moodboard: &Moodboard,
        selected: &[Selected<'_>],
        layout: &[LayoutSlot],
        style: LayoutStyle,
    ) -> Result<Rendered, RenderError> {
        let started_at = Instant::now();
        let (flipbook, report) = self.flipbook(moodboard, selected, layout, style)?;
        let document = self.engine.compose(&flipbook)?;

        info!(
            target = "render::render",
            share_token = %moodboard.share_token,
            style = style.as_str(),
            pages = flipbook.pages.len(),
            bytes = document.bytes.len(),
            missing_assets = report.missing.len(),
            digest = %document.digest,
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "moodboard rendered"
        );

        Ok(Rendered {
            flipbook,
            document,
            report,
        })
    }

    fn placeholder(&self) -> TileImage {
        TileImage::Placeholder {
            label: self.settings.placeholder_label.clone(),
        }
    }

    fn resolve_image(&self, reference: Result<&str, AssetMissing>) -> (TileImage, Option<AssetMissing>) {
        match reference.and_then(|r| self.assets.resolve(r)) {
            Ok(url) => (TileImage::Resolved { url }, None),
            Err(miss) => (self.placeholder(), Some(miss)),
        }
    }

    fn tile(&self, item: &Selected<'_>, slot: &LayoutSlot) -> (Tile, Vec<AssetMissing>) {
        let product = item.product;
        let (repr, variant_miss) = representation(item.selection, product);
        let (image, image_miss) = self.resolve_image(choose_image(item.selection, product, &repr));

        let mut tile = Tile::from_slot(slot, image);
        tile.name = product.name.clone();
        tile.brand = product.brand.clone();
        tile.category = product.category.clone();
        tile.variant = repr.variant.map(|v| match &v.finish {
            Some(finish) if !finish.is_empty() => format!("{} ({})", v.name, finish),
            _ => v.name.clone(),
        });

        (tile, variant_miss.into_iter().chain(image_miss).collect())
    }

    fn lifestyle_shot(&self, item: &Selected<'_>) -> Option<(LifestyleShot, Vec<AssetMissing>)> {
        let first = item.product.lifestyle_images.first()?;
        let (image, miss) = self.resolve_image(Ok(first.as_str()));
        Some((
            LifestyleShot {
                product_name: item.product.name.clone(),
                image,
            },
            miss.into_iter().collect(),
        ))
    }
}

/// Layout slots must be the selections' own layout: same length, same order.
fn check_alignment(selected: &[Selected<'_>], layout: &[LayoutSlot]) -> Result<(), RenderError> {
    if selected.len() != layout.len() {
        return Err(RenderError::Malformed(format!(
            "{} selections but {} layout slots",
            selected.len(),
            layout.len()
        )));
    }
    for (position, slot) in layout.iter().enumerate() {
        let item = &selected[position];
        if slot.index != position || slot.product_id != item.selection.product_id {
            return Err(RenderError::Malformed(format!(
                "layout slot {position} does not match selection {}",
                item.selection.product_id
            )));
        }
        if item.product.id != item.selection.product_id {
            return Err(RenderError::Malformed(format!(
                "selection {} paired with product {}",
                item.selection.product_id, item.product.id
            )));
        }
    }
    Ok(())
}
