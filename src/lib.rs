//! # Moodboard
//!
//! Composition and delivery pipeline for product moodboards: a client's
//! curated, ordered selection of catalog products turned into a paged,
//! shareable document and emailed to them (and, on request, their designer).
//!
//! # Architecture: Four Steps per Request
//!
//! ```text
//! 1. Create    request   →  stored record under a fresh share token
//! 2. Layout    selections →  grid slots (hero + standard spans)
//! 3. Render    record + slots + images  →  flipbook pages + document
//! 4. Deliver   document  →  requester, designer
//! ```
//!
//! Layout is a pure function of the selections and their products. Rendering
//! is a pure function of the record, the products, the style and which images
//! resolve. Only creation writes to the store, so regenerating or resending a
//! board never changes its id or share token.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`token`] | 22-symbol URL-safe share tokens |
//! | [`layout`] | Orientation resolution and grid span assignment |
//! | [`render`] | Image choice, pagination, HTML flipbook document |
//! | [`deliver`] | Recipient routing, message composition, mail transports |
//! | [`store`] | Persistence boundary and token-collision retry |
//! | [`pipeline`] | Request-level operations tying the above together |
//! | [`config`] | `moodboard.toml` loading, validation, merging, CSS colors |
//! | [`types`] | Moodboard and product records |
//! | [`icons`] | Interest tag → icon mapping for the cover page |
//! | [`showcase`] | Marketing collections with static defaults |
//! | [`logging`] | Tracing subscriber setup |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Collaborators Behind Traits
//!
//! The store, image storage, document engine and mail transport are all
//! external systems. Each is a trait ([`store::MoodboardStore`],
//! [`render::AssetSource`], [`render::DocumentEngine`], [`deliver::Mailer`])
//! with a local implementation shipped here and a recording or failing double
//! in the tests.
//!
//! ## Degrade per Image, Fail per Document
//!
//! A missing image becomes a placeholder tile and a warning; the board still
//! renders and sends. An engine failure aborts the request before any email
//! goes out, so recipients never get a partial document.
//!
//! ## One HTML Document
//!
//! The artifact is a single self-contained HTML file: print CSS breaks it into
//! pages, a small script flips pages on screen. The same bytes are attached to
//! the email and describe the web view, and their SHA-256 digest makes
//! re-render determinism checkable.

pub mod config;
pub mod deliver;
pub mod icons;
pub mod layout;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod showcase;
pub mod store;
pub mod token;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
