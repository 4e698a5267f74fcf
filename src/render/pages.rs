//! Flipbook page model and pagination.
//!
//! A [`Flipbook`] is the full paged state of a rendered moodboard. It is what
//! the web view serves at the share URL and what the document engine turns
//! into the artifact. Building it is deterministic: the same tiles in the
//! same order always paginate the same way.
//!
//! ## Pagination
//!
//! Grid pages are `columns × rows` cells. Tiles are placed the way the
//! stylesheet's sparse row-major auto-placement lays them out: the cursor
//! only moves forward, so a gap left behind a wide tile stays empty. A tile
//! that cannot be placed before the last row starts the next page. Tiles are
//! never reordered to fill gaps.

use super::style::LayoutStyle;
use crate::icons::Interest;
use crate::layout::{LayoutSlot, Placement};
use crate::token::ShareToken;
use crate::types::{Moodboard, Orientation};
use pulldown_cmark::{Event, Parser, html as md_html};
use serde::Serialize;

/// Image state of a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TileImage {
    Resolved { url: String },
    Placeholder { label: String },
}

impl TileImage {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, TileImage::Placeholder { .. })
    }
}

/// One product as it appears on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub index: usize,
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub image: TileImage,
    pub placement: Placement,
    pub orientation: Orientation,
    pub grid_column: u8,
    pub grid_row: u8,
}

impl Tile {
    /// Tile skeleton from a layout slot; product fields are filled by the caller.
    pub(crate) fn from_slot(slot: &LayoutSlot, image: TileImage) -> Self {
        Self {
            index: slot.index,
            product_id: slot.product_id.clone(),
            name: String::new(),
            brand: String::new(),
            category: String::new(),
            variant: None,
            image,
            placement: slot.placement,
            orientation: slot.orientation,
            grid_column: slot.grid_column,
            grid_row: slot.grid_row,
        }
    }
}

/// A full-bleed lifestyle shot of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifestyleShot {
    pub product_name: String,
    pub image: TileImage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileEntry {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cover {
    pub title: String,
    pub prepared_for: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_location: Option<String>,
    /// `project_details` rendered from markdown. Raw HTML is escaped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_html: Option<String>,
    pub profile: Vec<ProfileEntry>,
    pub interests: Vec<Interest>,
    pub created_on: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designer_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageContent {
    Cover(Cover),
    Grid { columns: u8, tiles: Vec<Tile> },
    Feature { tile: Tile },
    Lifestyle(LifestyleShot),
    Contact(Contact),
}

impl PageContent {
    pub fn kind(&self) -> &'static str {
        match self {
            PageContent::Cover(_) => "cover",
            PageContent::Grid { .. } => "grid",
            PageContent::Feature { .. } => "feature",
            PageContent::Lifestyle(_) => "lifestyle",
            PageContent::Contact(_) => "contact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub content: PageContent,
}

/// Paged state of a rendered moodboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flipbook {
    pub share_token: ShareToken,
    /// Stable public URL of the web view.
    pub url: String,
    pub title: String,
    pub style: LayoutStyle,
    pub pages: Vec<Page>,
}

impl Flipbook {
    /// All tiles in page order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.pages.iter().flat_map(|page| match &page.content {
            PageContent::Grid { tiles, .. } => tiles.iter().collect::<Vec<_>>(),
            PageContent::Feature { tile } => vec![tile],
            _ => Vec::new(),
        })
    }
}

/// Grid dimensions of a spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGrid {
    pub columns: u8,
    pub rows: u8,
}

/// Cell occupancy of one grid page, with a forward-only placement cursor.
struct PageFill {
    columns: usize,
    rows: usize,
    occupied: Vec<bool>,
    cursor: (usize, usize),
}

impl PageFill {
    fn new(grid: PageGrid) -> Self {
        let columns = usize::from(grid.columns.max(1));
        let rows = usize::from(grid.rows.max(1));
        Self {
            columns,
            rows,
            occupied: vec![false; columns * rows],
            cursor: (0, 0),
        }
    }

    fn is_free(&self, row: usize, col: usize, width: usize, height: usize) -> bool {
        (row..row + height)
            .all(|r| (col..col + width).all(|c| !self.occupied[r * self.columns + c]))
    }

    /// Place a tile at the first free spot at or after the cursor.
    ///
    /// Returns false when it would run past the last row.
    fn place(&mut self, tile: &Tile) -> bool {
        let width = usize::from(tile.grid_column).clamp(1, self.columns);
        let height = usize::from(tile.grid_row).max(1);
        let (mut row, mut col) = self.cursor;
        loop {
            if row + height > self.rows {
                return false;
            }
            if col + width > self.columns {
                row += 1;
                col = 0;
                continue;
            }
            if self.is_free(row, col, width, height) {
                for r in row..row + height {
                    for c in col..col + width {
                        self.occupied[r * self.columns + c] = true;
                    }
                }
                self.cursor = (row, col + width);
                return true;
            }
            col += 1;
        }
    }
}

/// Public URL of a moodboard's flipbook view.
pub fn flipbook_url(base_url: &str, token: &ShareToken) -> String {
    format!("{}/moodboard/{}", base_url.trim_end_matches('/'), token)
}

/// Pack tiles into grid pages without reordering.
pub fn paginate(tiles: Vec<Tile>, grid: PageGrid) -> Vec<Vec<Tile>> {
    let mut pages: Vec<Vec<Tile>> = Vec::new();
    let mut current: Vec<Tile> = Vec::new();
    let mut fill = PageFill::new(grid);
    for tile in tiles {
        if !fill.place(&tile) {
            if !current.is_empty() {
                pages.push(std::mem::take(&mut current));
                fill = PageFill::new(grid);
            }
            if !fill.place(&tile) {
                // Taller than a whole page: it gets a page of its own.
                pages.push(vec![tile]);
                continue;
            }
        }
        current.push(tile);
    }
    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

/// Render markdown project details, escaping any embedded HTML.
pub fn details_to_html(markdown: &str) -> Option<String> {
    if markdown.trim().is_empty() {
        return None;
    }
    let parser = Parser::new(markdown).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    Some(out)
}

fn cover(moodboard: &Moodboard) -> Cover {
    let profile = [
        ("Property type", &moodboard.property_type),
        ("Property size", &moodboard.property_size),
        ("Timeline", &moodboard.project_timeline),
        ("Budget", &moodboard.budget_range),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value.as_ref().filter(|v| !v.trim().is_empty()).map(|v| ProfileEntry {
            label,
            value: v.clone(),
        })
    })
    .collect();

    Cover {
        title: moodboard.title(),
        prepared_for: moodboard.user_name.clone(),
        client_name: moodboard.client_name.clone(),
        project_location: moodboard.project_location.clone(),
        details_html: moodboard.project_details.as_deref().and_then(details_to_html),
        profile,
        interests: moodboard
            .primary_interests
            .iter()
            .filter(|tag| !tag.trim().is_empty())
            .map(|tag| Interest::from_tag(tag))
            .collect(),
        created_on: moodboard.created_at.date().to_string(),
    }
}

fn contact(moodboard: &Moodboard) -> Contact {
    Contact {
        name: moodboard.user_name.clone(),
        email: moodboard.user_email.clone(),
        designer_name: moodboard.designer_name.clone(),
        designer_email: moodboard.designer_email.clone(),
    }
}

/// Assemble the page sequence for a style.
///
/// Magazine: cover, grid spreads, lifestyle spreads, contact.
/// Catalog: cover, one feature page per tile, contact.
pub fn build_flipbook(
    moodboard: &Moodboard,
    tiles: Vec<Tile>,
    lifestyle: Vec<LifestyleShot>,
    style: LayoutStyle,
    grid: PageGrid,
    base_url: &str,
) -> Flipbook {
    let mut contents = vec![PageContent::Cover(cover(moodboard))];
    match style {
        LayoutStyle::Magazine => {
            contents.extend(paginate(tiles, grid).into_iter().map(|tiles| PageContent::Grid {
                columns: grid.columns,
                tiles,
            }));
            contents.extend(lifestyle.into_iter().map(PageContent::Lifestyle));
        }
        LayoutStyle::Catalog => {
            contents.extend(tiles.into_iter().map(|tile| PageContent::Feature { tile }));
        }
    }
    contents.push(PageContent::Contact(contact(moodboard)));

    Flipbook {
        share_token: moodboard.share_token.clone(),
        url: flipbook_url(base_url, &moodboard.share_token),
        title: moodboard.title(),
        style,
        pages: contents
            .into_iter()
            .enumerate()
            .map(|(i, content)| Page {
                number: i + 1,
                content,
            })
            .collect(),
    }
}
