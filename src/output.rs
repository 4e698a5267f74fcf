//! CLI output formatting.
//!
//! Output is information-first: each entity leads with its human identity
//! (title, product name, recipient role) and puts ids, tokens and file names
//! on indented context lines.
//!
//! ```text
//! Harbour Loft (magazine, 5 pages)
//!     001 cover: ◰ kitchen, ✧ lighting
//!     002 grid: Oak Plank, Brass Pendant, Terrazzo Tile
//!     003 lifestyle: Oak Plank
//!     004 contact
//!     Missing: p2: image index 7 out of range (2 available)
//!     Document: moodboard-Vx3...html (48213 bytes)
//!     View: https://moodboards.example.com/moodboard/Vx3...
//! ```
//!
//! Every command has a `format_*` function (returns `Vec<String>`, no I/O)
//! and a `print_*` wrapper that writes to stdout.

use crate::deliver::Delivery;
use crate::pipeline::{DeliveryOutcome, PipelineError};
use crate::render::{AssetMissing, Flipbook, PageContent, Rendered};
use crate::showcase::{Origin, Showcase};
use crate::types::{Moodboard, Product};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn page_line(number: usize, content: &PageContent) -> String {
    let detail = match content {
        PageContent::Grid { tiles, .. } => Some(
            tiles
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        PageContent::Feature { tile } => Some(tile.name.clone()),
        PageContent::Lifestyle(shot) => Some(shot.product_name.clone()),
        PageContent::Cover(cover) if !cover.interests.is_empty() => Some(
            cover
                .interests
                .iter()
                .map(|i| format!("{} {}", i.icon.glyph(), i.tag))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        PageContent::Cover(_) | PageContent::Contact(_) => None,
    };
    match detail {
        Some(d) => format!("{} {}: {}", format_index(number), content.kind(), d),
        None => format!("{} {}", format_index(number), content.kind()),
    }
}

fn missing_lines(missing: &[AssetMissing]) -> Vec<String> {
    missing
        .iter()
        .map(|m| format!("{}Missing: {}", indent(1), m))
        .collect()
}

fn delivery_line(delivery: &Delivery) -> String {
    format!(
        "{}{} {} ({})",
        indent(1),
        delivery.recipient.role.as_str(),
        delivery.recipient.email,
        delivery.receipt.id
    )
}

pub fn format_created(moodboard: &Moodboard, view_url: &str) -> Vec<String> {
    vec![
        format!("Created {}", moodboard.title()),
        format!("{}Id: {}", indent(1), moodboard.id),
        format!("{}Token: {}", indent(1), moodboard.share_token),
        format!("{}Products: {}", indent(1), moodboard.product_data.len()),
        format!("{}View: {}", indent(1), view_url),
    ]
}

pub fn print_created(moodboard: &Moodboard, view_url: &str) {
    for line in format_created(moodboard, view_url) {
        println!("{}", line);
    }
}

pub fn format_flipbook(flipbook: &Flipbook) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}, {} pages)",
        flipbook.title,
        flipbook.style,
        flipbook.pages.len()
    )];
    lines.extend(
        flipbook
            .pages
            .iter()
            .map(|page| format!("{}{}", indent(1), page_line(page.number, &page.content))),
    );
    let placeholders = flipbook.tiles().filter(|t| t.image.is_placeholder()).count();
    if placeholders > 0 {
        lines.push(format!("{}Placeholders: {}", indent(1), placeholders));
    }
    lines.push(format!("{}View: {}", indent(1), flipbook.url));
    lines
}

pub fn print_flipbook(flipbook: &Flipbook) {
    for line in format_flipbook(flipbook) {
        println!("{}", line);
    }
}

pub fn format_rendered(rendered: &Rendered, written_to: Option<&str>) -> Vec<String> {
    let mut lines = format_flipbook(&rendered.flipbook);
    let view = lines.pop();
    lines.extend(missing_lines(&rendered.report.missing));
    lines.push(format!(
        "{}Document: {} ({} bytes)",
        indent(1),
        rendered.document.filename,
        rendered.document.bytes.len()
    ));
    lines.push(format!("{}Digest: {}", indent(1), rendered.document.digest));
    if let Some(path) = written_to {
        lines.push(format!("{}Written: {}", indent(1), path));
    }
    lines.extend(view);
    lines
}

pub fn print_rendered(rendered: &Rendered, written_to: Option<&str>) {
    for line in format_rendered(rendered, written_to) {
        println!("{}", line);
    }
}

pub fn format_delivery(outcome: &DeliveryOutcome) -> Vec<String> {
    let count = outcome.deliveries.len();
    let mut lines = vec![format!(
        "Sent {} ({}, {} pages) to {} recipient{}",
        outcome.share_token,
        outcome.style,
        outcome.pages,
        count,
        if count == 1 { "" } else { "s" }
    )];
    lines.extend(outcome.deliveries.iter().map(delivery_line));
    lines.extend(missing_lines(&outcome.missing_assets));
    lines.push(format!("{}Digest: {}", indent(1), outcome.digest));
    lines.push(format!("{}View: {}", indent(1), outcome.view_url));
    lines
}

pub fn print_delivery(outcome: &DeliveryOutcome) {
    for line in format_delivery(outcome) {
        println!("{}", line);
    }
}

pub fn format_products(products: &[Product]) -> Vec<String> {
    if products.is_empty() {
        return vec!["No products".to_string()];
    }
    let mut lines = vec!["Products".to_string()];
    for (i, product) in products.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            product.name,
            product.brand
        ));
        lines.push(format!("{}Id: {}", indent(1), product.id));
        let shape = match (product.orientation, product.aspect_ratio.as_deref()) {
            (Some(o), Some(r)) => format!("{o}, ratio {r}"),
            (Some(o), None) => o.to_string(),
            (None, Some(r)) => format!("ratio {r}"),
            (None, None) => "unspecified".to_string(),
        };
        lines.push(format!("{}Shape: {}", indent(1), shape));
        lines.push(format!(
            "{}Images: {} ({} lifestyle, {} variants)",
            indent(1),
            product.images.len(),
            product.lifestyle_images.len(),
            product.variants.len()
        ));
    }
    lines
}

pub fn print_products(products: &[Product]) {
    for line in format_products(products) {
        println!("{}", line);
    }
}

fn origin_suffix(origin: Origin) -> &'static str {
    match origin {
        Origin::Remote => "",
        Origin::Default => " (default)",
    }
}

pub fn format_showcase(showcase: &Showcase) -> Vec<String> {
    let mut lines = vec![format!("Stats{}", origin_suffix(showcase.origins.stats))];
    lines.extend(
        showcase
            .stats
            .iter()
            .map(|s| format!("{}{} {}", indent(1), s.value, s.label)),
    );
    lines.push(String::new());
    lines.push(format!(
        "Testimonials{}",
        origin_suffix(showcase.origins.testimonials)
    ));
    for t in &showcase.testimonials {
        lines.push(format!("{}\"{}\"", indent(1), t.quote));
        match &t.role {
            Some(role) => lines.push(format!("{}{}, {}", indent(2), t.author, role)),
            None => lines.push(format!("{}{}", indent(2), t.author)),
        }
    }
    lines.push(String::new());
    lines.push(format!("Brands{}", origin_suffix(showcase.origins.brands)));
    lines.extend(
        showcase
            .brands
            .iter()
            .map(|b| format!("{}{}", indent(1), b.name)),
    );
    lines
}

pub fn print_showcase(showcase: &Showcase) {
    for line in format_showcase(showcase) {
        println!("{}", line);
    }
}

pub fn format_pipeline_error(err: &PipelineError) -> Vec<String> {
    let mut lines = vec![
        format!("Failed at {}: {}", err.stage().as_str(), err),
        format!(
            "{}Resend safe: {}",
            indent(1),
            if err.resend_safe() { "yes" } else { "no" }
        ),
    ];
    if let PipelineError::Delivery(delivery) = err {
        lines.extend(delivery.delivered.iter().map(|d| {
            format!("{}Already sent: {}", indent(1), d.recipient.email)
        }));
    }
    lines
}

pub fn print_pipeline_error(err: &PipelineError) {
    for line in format_pipeline_error(err) {
        eprintln!("{}", line);
    }
}
