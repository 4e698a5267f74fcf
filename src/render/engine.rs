//! Document engines: flipbook state → binary artifact.
//!
//! The production engine is [`HtmlEngine`], which writes a single
//! self-contained HTML document: one `<section class="page">` per flipbook
//! page, print CSS that breaks between pages, and a small script that turns
//! pages with arrow keys and swipes when viewed in a browser. The same
//! document serves as the emailed attachment and the web view.
//!
//! Templates use [maud](https://maud.lambda.xyz/); every interpolated value
//! is escaped. The only pre-escaped inputs are the stylesheet, the script and
//! the markdown-rendered project details, which have raw HTML neutralized.

use super::RenderError;
use super::pages::{Contact, Cover, Flipbook, LifestyleShot, Page, PageContent, Tile, TileImage};
use crate::config::{self, ColorConfig};
use crate::layout::Placement;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use sha2::{Digest, Sha256};

const CSS_STATIC: &str = include_str!("../../static/flipbook.css");
const JS: &str = include_str!("../../static/flipbook.js");

/// A rendered artifact ready to attach or serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub filename: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
    /// SHA-256 of `bytes`, hex encoded.
    pub digest: String,
}

impl Document {
    pub fn new(filename: String, media_type: &str, bytes: Vec<u8>) -> Self {
        let digest = format!("{:x}", Sha256::digest(&bytes));
        Self {
            filename,
            media_type: media_type.to_string(),
            bytes,
            digest,
        }
    }
}

/// Turns flipbook state into a document artifact.
///
/// Failing here is fatal to the render: no artifact, no delivery.
pub trait DocumentEngine: Sync {
    fn compose(&self, flipbook: &Flipbook) -> Result<Document, RenderError>;
}

/// Single-file HTML flipbook.
pub struct HtmlEngine {
    css: String,
}

impl HtmlEngine {
    pub fn new(colors: &ColorConfig) -> Self {
        let color_css = config::generate_color_css(colors);
        Self {
            css: format!("{}\n\n{}", color_css, CSS_STATIC),
        }
    }
}

impl Default for HtmlEngine {
    fn default() -> Self {
        Self::new(&ColorConfig::default())
    }
}

impl DocumentEngine for HtmlEngine {
    fn compose(&self, flipbook: &Flipbook) -> Result<Document, RenderError> {
        if flipbook.pages.is_empty() {
            return Err(RenderError::Malformed("flipbook has no pages".to_string()));
        }
        let markup = render_document(flipbook, &self.css);
        Ok(Document::new(
            format!("moodboard-{}.html", flipbook.share_token),
            "text/html; charset=utf-8",
            markup.into_string().into_bytes(),
        ))
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the whole flipbook document.
pub fn render_document(flipbook: &Flipbook, css: &str) -> Markup {
    let total = flipbook.pages.len();
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (flipbook.title) }
                link rel="canonical" href=(flipbook.url);
                style { (PreEscaped(css)) }
            }
            body.flipbook data-style=(flipbook.style.as_str()) data-pages=(total) {
                main.pages {
                    @for page in &flipbook.pages {
                        (render_page(page, total))
                    }
                }
                nav.flip-controls {
                    button.flip-prev type="button" aria-label="Previous page" { "‹" }
                    span.flip-position { "1 / " (total) }
                    button.flip-next type="button" aria-label="Next page" { "›" }
                }
                script { (PreEscaped(JS)) }
            }
        }
    }
}

fn render_page(page: &Page, total: usize) -> Markup {
    let kind = page.content.kind();
    html! {
        section class={ "page page-" (kind) } id={ "page-" (page.number) } data-page=(page.number) {
            @match &page.content {
                PageContent::Cover(cover) => { (render_cover(cover)) }
                PageContent::Grid { columns, tiles } => { (render_grid(*columns, tiles)) }
                PageContent::Feature { tile } => { (render_feature(tile)) }
                PageContent::Lifestyle(shot) => { (render_lifestyle(shot)) }
                PageContent::Contact(contact) => { (render_contact(contact)) }
            }
            footer.page-number { (page.number) " / " (total) }
        }
    }
}

fn render_cover(cover: &Cover) -> Markup {
    html! {
        header.cover-header {
            h1 { (cover.title) }
            p.prepared-for { "Prepared for " (cover.prepared_for) }
            @if let Some(client) = &cover.client_name {
                p.client { (client) }
            }
            @if let Some(location) = &cover.project_location {
                p.location { (location) }
            }
            p.created-on { (cover.created_on) }
        }
        @if let Some(details) = &cover.details_html {
            article.project-details { (PreEscaped(details)) }
        }
        @if !cover.profile.is_empty() {
            dl.profile {
                @for entry in &cover.profile {
                    dt { (entry.label) }
                    dd { (entry.value) }
                }
            }
        }
        @if !cover.interests.is_empty() {
            ul.interests {
                @for interest in &cover.interests {
                    li class=(interest.icon.css_class()) { (interest.tag) }
                }
            }
        }
    }
}

fn render_image(image: &TileImage, alt: &str) -> Markup {
    html! {
        @match image {
            TileImage::Resolved { url } => {
                img src=(url) alt=(alt) loading="lazy";
            }
            TileImage::Placeholder { label } => {
                div.placeholder role="img" aria-label=(alt) { span { (label) } }
            }
        }
    }
}

fn tile_caption(tile: &Tile) -> Markup {
    html! {
        figcaption {
            span.product-name { (tile.name) }
            span.product-brand { (tile.brand) }
            @if let Some(variant) = &tile.variant {
                span.product-variant { (variant) }
            }
        }
    }
}

fn render_grid(columns: u8, tiles: &[Tile]) -> Markup {
    let grid_style = format!("--columns: {columns};");
    html! {
        div.grid style=(grid_style) {
            @for tile in tiles {
                @let span = format!(
                    "grid-column: span {}; grid-row: span {};",
                    tile.grid_column, tile.grid_row
                );
                @let class = match tile.placement {
                    Placement::Hero => format!("tile tile-{} hero", tile.orientation),
                    Placement::Standard => format!("tile tile-{}", tile.orientation),
                };
                figure class=(class) style=(span) data-product=(tile.product_id) {
                    (render_image(&tile.image, &tile.name))
                    (tile_caption(tile))
                }
            }
        }
    }
}

fn render_feature(tile: &Tile) -> Markup {
    html! {
        figure class={ "feature tile-" (tile.orientation.as_str()) } data-product=(tile.product_id) {
            (render_image(&tile.image, &tile.name))
            (tile_caption(tile))
            @if !tile.category.is_empty() {
                p.product-category { (tile.category) }
            }
        }
    }
}

fn render_lifestyle(shot: &LifestyleShot) -> Markup {
    html! {
        figure.lifestyle {
            (render_image(&shot.image, &shot.product_name))
            figcaption { (shot.product_name) " in context" }
        }
    }
}

fn render_contact(contact: &Contact) -> Markup {
    html! {
        div.contact {
            h2 { "Contact" }
            p { (contact.name) br; a href={ "mailto:" (contact.email) } { (contact.email) } }
            @if let Some(designer) = &contact.designer_email {
                p.designer {
                    "Designer: "
                    @if let Some(name) = &contact.designer_name { (name) " · " }
                    a href={ "mailto:" (designer) } { (designer) }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
