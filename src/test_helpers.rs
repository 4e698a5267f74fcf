//! Shared builders and recording collaborators for unit tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let store = seeded_store(&[product("p1", Some(Orientation::Square), None)]);
//! let board = store_board(&store, board_request(&["p1"]));
//! let mailer = RecordingMailer::default();
//! ```

use std::sync::Mutex;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::deliver::{Mailer, MessageReceipt, OutgoingMessage, TransportError};
use crate::render::{AssetMissing, AssetSource, Document, DocumentEngine, Flipbook, RenderError};
use crate::store::{MemoryStore, MoodboardStore};
use crate::token::ShareToken;
use crate::types::{Moodboard, NewMoodboard, Orientation, Product, ProductSelection};

// =========================================================================
// Record builders
// =========================================================================

/// A product with two images and the given orientation inputs.
pub fn product(id: &str, orientation: Option<Orientation>, aspect_ratio: Option<&str>) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        brand: "Acme".to_string(),
        category: "tiles".to_string(),
        images: vec![format!("{id}/front.jpg"), format!("{id}/side.jpg")],
        lifestyle_images: Vec::new(),
        orientation,
        aspect_ratio: aspect_ratio.map(str::to_string),
        variants: Vec::new(),
    }
}

/// Selection of the first image, no variant.
pub fn selection(product_id: &str) -> ProductSelection {
    ProductSelection {
        product_id: product_id.to_string(),
        image_index: 0,
        variant_index: None,
    }
}

/// A creation request selecting the given products in order.
pub fn board_request(product_ids: &[&str]) -> NewMoodboard {
    NewMoodboard {
        user_name: "Ada Lovelace".to_string(),
        user_email: "ada@example.com".to_string(),
        project_name: Some("Harbour Loft".to_string()),
        primary_interests: vec!["kitchen".to_string(), "lighting".to_string()],
        product_data: product_ids.iter().map(|id| selection(id)).collect(),
        ..Default::default()
    }
}

/// Materialize a request without going through a store.
pub fn board(request: NewMoodboard) -> Moodboard {
    request.into_moodboard(Uuid::new_v4(), ShareToken::generate(), OffsetDateTime::UNIX_EPOCH)
}

/// A memory store pre-loaded with products.
pub fn seeded_store(products: &[Product]) -> MemoryStore {
    MemoryStore::with_products(products.to_vec())
}

/// Persist a request directly and return the stored record.
pub fn store_board(store: &MemoryStore, request: NewMoodboard) -> Moodboard {
    store.create(board(request)).unwrap()
}

// =========================================================================
// Recording collaborators
// =========================================================================

/// Mailer that records every message. Uses Mutex so it is Sync.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMessage>>,
    /// Addresses whose sends fail with a rejection.
    pub reject: Vec<String>,
}

impl RecordingMailer {
    pub fn rejecting(addresses: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.to.email.clone())
            .collect()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, message: &OutgoingMessage) -> Result<MessageReceipt, TransportError> {
        if self.reject.contains(&message.to.email) {
            return Err(TransportError::Rejected {
                status: 422,
                body: "mailbox unavailable".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(MessageReceipt {
            id: format!("msg-{}", sent.len()),
        })
    }
}

/// Engine that is never available.
pub struct UnavailableEngine;

impl DocumentEngine for UnavailableEngine {
    fn compose(&self, _flipbook: &Flipbook) -> Result<Document, RenderError> {
        Err(RenderError::EngineUnavailable("engine offline".to_string()))
    }
}

/// Asset source where every reference is missing.
pub struct NoAssets;

impl AssetSource for NoAssets {
    fn resolve(&self, reference: &str) -> Result<String, AssetMissing> {
        Err(AssetMissing::unreachable(reference, "storage offline"))
    }
}
