//! Request-level operations: create, render, deliver, view.
//!
//! Each call is an independent request against the collaborators in
//! [`Collaborators`]. The only shared state is whatever the store holds.
//!
//! ```text
//! create_moodboard   validate → check products → insert under fresh token
//! render             lookup → load products → resolve layout → render
//! render_and_deliver render → dispatch (only once a document exists)
//! view               lookup by token → flipbook pages
//! ```
//!
//! Regeneration is `render_and_deliver` against an existing record. It never
//! writes to the store, so id and share token are untouched.

use crate::config::MoodboardConfig;
use crate::deliver::{Delivery, DeliveryError, Dispatcher, Mailer};
use crate::layout::{Selected, resolve_layout};
use crate::render::{
    AssetMissing, AssetSource, DocumentEngine, Flipbook, LayoutStyle, RenderError, Rendered,
    Renderer,
};
use crate::store::{MoodboardStore, StoreError, insert_with_fresh_token};
use crate::token::{ShareToken, TokenSource};
use crate::types::{Moodboard, MoodboardRef, NewMoodboard, Product, ProductSelection};
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

/// Where a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Validate,
    Create,
    Lookup,
    Render,
    Delivery,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::Create => "create",
            Stage::Lookup => "lookup",
            Stage::Render => "render",
            Stage::Delivery => "delivery",
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid moodboard request: {0}")]
    Invalid(String),
    #[error("could not create moodboard: {0}")]
    Create(#[source] StoreError),
    #[error("lookup failed: {0}")]
    Lookup(#[source] StoreError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Invalid(_) => Stage::Validate,
            PipelineError::Create(_) => Stage::Create,
            PipelineError::Lookup(_) => Stage::Lookup,
            PipelineError::Render(_) => Stage::Render,
            PipelineError::Delivery(_) => Stage::Delivery,
        }
    }

    /// True when no recipient received anything from the failed request, so
    /// issuing it again cannot produce a duplicate email.
    pub fn resend_safe(&self) -> bool {
        match self {
            PipelineError::Delivery(err) => err.delivered.is_empty(),
            _ => true,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PipelineError::Lookup(err) if err.is_not_found())
    }
}

/// Result of a successful render-and-deliver.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOutcome {
    pub moodboard_id: Uuid,
    pub share_token: ShareToken,
    pub view_url: String,
    pub style: LayoutStyle,
    pub pages: usize,
    /// SHA-256 of the delivered document.
    pub digest: String,
    pub missing_assets: Vec<AssetMissing>,
    pub deliveries: Vec<Delivery>,
}

/// External collaborators a pipeline runs against.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub store: &'a dyn MoodboardStore,
    pub tokens: &'a dyn TokenSource,
    pub assets: &'a dyn AssetSource,
    pub engine: &'a dyn DocumentEngine,
    pub mailer: &'a dyn Mailer,
}

pub struct Pipeline<'a> {
    deps: Collaborators<'a>,
    config: &'a MoodboardConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(deps: Collaborators<'a>, config: &'a MoodboardConfig) -> Self {
        Self { deps, config }
    }

    /// Persist a new moodboard under a system-generated share token.
    pub fn create_moodboard(&self, request: NewMoodboard) -> Result<Moodboard, PipelineError> {
        validate_request(&request)?;
        self.deps
            .store
            .get_products(&selection_ids(&request.product_data))
            .map_err(|err| match err {
                StoreError::ProductNotFound(id) => {
                    PipelineError::Invalid(format!("unknown product {id}"))
                }
                other => PipelineError::Create(other),
            })?;

        // The draft's token is the first insert attempt.
        let draft = request.into_moodboard(
            Uuid::new_v4(),
            self.deps.tokens.next_token(),
            OffsetDateTime::now_utc(),
        );
        let stored = insert_with_fresh_token(
            self.deps.store,
            self.deps.tokens,
            draft,
            self.config.tokens.max_attempts,
        )
        .map_err(PipelineError::Create)?;

        info!(
            target = "pipeline::create",
            id = %stored.id,
            share_token = %stored.share_token,
            products = stored.product_data.len(),
            "moodboard created"
        );
        Ok(stored)
    }

    pub fn lookup(&self, reference: &MoodboardRef) -> Result<Moodboard, PipelineError> {
        let found = match reference {
            MoodboardRef::Id(id) => self.deps.store.get_by_id(*id),
            MoodboardRef::Token(token) => self.deps.store.get_by_share_token(token),
        };
        found.map_err(PipelineError::Lookup)
    }

    /// Catalog products for each selection, in selection order.
    fn products_for(&self, moodboard: &Moodboard) -> Result<Vec<Product>, PipelineError> {
        self.deps
            .store
            .get_products(&selection_ids(&moodboard.product_data))
            .map_err(PipelineError::Lookup)
    }

    fn renderer(&self) -> Renderer<'_> {
        Renderer::new(self.deps.assets, self.deps.engine, &self.config.render)
    }

    fn style(&self, requested: Option<&str>) -> LayoutStyle {
        LayoutStyle::from_request(requested, self.config.default_style())
    }

    /// Render a stored moodboard without delivering it.
    pub fn render(
        &self,
        reference: &MoodboardRef,
        style: Option<&str>,
    ) -> Result<(Moodboard, Rendered), PipelineError> {
        let moodboard = self.lookup(reference)?;
        let rendered = self.render_record(&moodboard, self.style(style))?;
        Ok((moodboard, rendered))
    }

    fn render_record(
        &self,
        moodboard: &Moodboard,
        style: LayoutStyle,
    ) -> Result<Rendered, PipelineError> {
        let products = self.products_for(moodboard)?;
        let selected = pair(moodboard, &products);
        let layout = resolve_layout(&selected);
        Ok(self.renderer().render(moodboard, &selected, &layout, style)?)
    }

    /// Render a stored moodboard and email it to its recipients.
    ///
    /// Nothing is sent unless rendering produced a complete document.
    pub fn render_and_deliver(
        &self,
        reference: &MoodboardRef,
        style: Option<&str>,
    ) -> Result<DeliveryOutcome, PipelineError> {
        let (moodboard, rendered) = self.render(reference, style)?;
        let dispatcher = Dispatcher::from_config(self.deps.mailer, &self.config.mail);
        let report = dispatcher
            .dispatch(&moodboard, &rendered.document, &rendered.flipbook.url)
            .inspect_err(|err| {
                if !err.delivered.is_empty() {
                    warn!(
                        target = "pipeline::render_and_deliver",
                        share_token = %moodboard.share_token,
                        delivered = err.delivered.len(),
                        "partial delivery; resending will repeat earlier recipients"
                    );
                }
            })?;

        Ok(DeliveryOutcome {
            moodboard_id: moodboard.id,
            share_token: moodboard.share_token,
            view_url: rendered.flipbook.url,
            style: rendered.flipbook.style,
            pages: rendered.flipbook.pages.len(),
            digest: rendered.document.digest,
            missing_assets: rendered.report.missing,
            deliveries: report.deliveries,
        })
    }

    /// Public read path: paged state for a share token, in the default style.
    pub fn view(&self, token: &ShareToken) -> Result<Flipbook, PipelineError> {
        let moodboard = self
            .deps
            .store
            .get_by_share_token(token)
            .map_err(PipelineError::Lookup)?;
        let products = self.products_for(&moodboard)?;
        let selected = pair(&moodboard, &products);
        let layout = resolve_layout(&selected);
        let (flipbook, _) =
            self.renderer()
                .flipbook(&moodboard, &selected, &layout, self.config.default_style())?;
        Ok(flipbook)
    }
}

fn pair<'m>(moodboard: &'m Moodboard, products: &'m [Product]) -> Vec<Selected<'m>> {
    moodboard
        .product_data
        .iter()
        .zip(products)
        .map(|(selection, product)| Selected { selection, product })
        .collect()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !value.contains(' '),
        None => false,
    }
}

/// Request checks that do not need the store.
pub fn validate_request(request: &NewMoodboard) -> Result<(), PipelineError> {
    if is_blank(&request.user_name) {
        return Err(PipelineError::Invalid("user_name is required".into()));
    }
    if !looks_like_email(&request.user_email) {
        return Err(PipelineError::Invalid(format!(
            "user_email {:?} is not an email address",
            request.user_email
        )));
    }
    if request.send_to_designer {
        match request.designer_email.as_deref() {
            Some(email) if looks_like_email(email) => {}
            Some(email) => {
                return Err(PipelineError::Invalid(format!(
                    "designer_email {email:?} is not an email address"
                )));
            }
            None => {
                return Err(PipelineError::Invalid(
                    "send_to_designer requires designer_email".into(),
                ));
            }
        }
    }
    if let Some(blank) = request
        .product_data
        .iter()
        .position(|s| is_blank(&s.product_id))
    {
        return Err(PipelineError::Invalid(format!(
            "product_data[{blank}] has no product_id"
        )));
    }
    Ok(())
}

fn selection_ids(selections: &[ProductSelection]) -> Vec<&str> {
    selections.iter().map(|s| s.product_id.as_str()).collect()
}
