//! Delivery dispatcher: rendered document → email recipients.
//!
//! Recipients come from the moodboard record: always the requester, plus
//! the designer when `send_to_designer` is set and a designer address
//! exists. Every message carries an explicit reply-to identity, the
//! document as an attachment and the share URL of the flipbook view.
//!
//! Transport is behind the [`Mailer`] trait:
//!
//! - [`OutboxMailer`] writes each message as a JSON file (local runs, review).
//! - [`HttpMailer`] posts each message to an HTTP email API.
//!
//! Failures are reported, never swallowed, and never retried here. Delivery
//! history is not persisted; re-sending a moodboard simply sends again.

use crate::config::{MailConfig, MailTransport};
use crate::render::Document;
use crate::types::Moodboard;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use maud::{Markup, html};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// A name and address pair used for `from` and `reply_to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientRole {
    /// The person who created the moodboard.
    Requester,
    Designer,
}

impl RecipientRole {
    pub fn as_str(self) -> &'static str {
        match self {
            RecipientRole::Requester => "requester",
            RecipientRole::Designer => "designer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub role: RecipientRole,
    pub name: Option<String>,
    pub email: String,
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.role.as_str(), self.email)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Recipients for a moodboard, requester first.
///
/// The designer is added only when routing is requested and an address is
/// present. A designer address equal to the requester's is not sent twice.
pub fn recipients(moodboard: &Moodboard) -> Vec<Recipient> {
    let mut out = vec![Recipient {
        role: RecipientRole::Requester,
        name: Some(moodboard.user_name.clone()),
        email: moodboard.user_email.trim().to_string(),
    }];
    let designer = non_blank(&moodboard.designer_email)
        .filter(|_| moodboard.send_to_designer)
        .filter(|email| !email.eq_ignore_ascii_case(moodboard.user_email.trim()));
    if let Some(email) = designer {
        out.push(Recipient {
            role: RecipientRole::Designer,
            name: non_blank(&moodboard.designer_name).map(str::to_string),
            email: email.to_string(),
        });
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub media_type: String,
    #[serde(serialize_with = "as_base64")]
    pub content: Vec<u8>,
}

fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(bytes))
}

impl From<&Document> for Attachment {
    fn from(document: &Document) -> Self {
        Self {
            filename: document.filename.clone(),
            media_type: document.media_type.clone(),
            content: document.bytes.clone(),
        }
    }
}

/// One email to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub to: Recipient,
    pub from: Identity,
    pub reply_to: Identity,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub view_url: String,
    pub attachment: Attachment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    /// Transport-assigned message id.
    pub id: String,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("mail API rejected message (status {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("mail API key not set (expected in ${0})")]
    MissingApiKey(String),
}

/// Sends a single message.
pub trait Mailer: Sync {
    fn send(&self, message: &OutgoingMessage) -> Result<MessageReceipt, TransportError>;
}

/// Writes each message as `<id>.json` into a directory.
#[derive(Debug, Clone)]
pub struct OutboxMailer {
    dir: PathBuf,
}

impl OutboxMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, message: &OutgoingMessage) -> Result<MessageReceipt, TransportError> {
        fs::create_dir_all(&self.dir)?;
        let id = Uuid::new_v4().to_string();
        let path = self.dir.join(format!("{id}.json"));
        let json = serde_json::to_string_pretty(message)?;
        fs::write(&path, json)?;
        Ok(MessageReceipt { id })
    }
}

/// Posts messages to an HTTP email API with bearer authentication.
pub struct HttpMailer {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct ApiAddress<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    from: ApiAddress<'a>,
    to: [ApiAddress<'a>; 1],
    reply_to: ApiAddress<'a>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    attachments: [&'a Attachment; 1],
}

#[derive(Deserialize)]
struct ApiResponse {
    id: String,
}

impl HttpMailer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("moodboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Build from `[mail]`, reading the API key from `mail.api_key_env`.
    pub fn from_config(config: &MailConfig) -> Result<Self, TransportError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TransportError::MissingApiKey(config.api_key_env.clone()))?;
        let endpoint = config.endpoint.clone().unwrap_or_default();
        Self::new(endpoint, api_key, Duration::from_secs(config.timeout_secs))
    }
}

impl Mailer for HttpMailer {
    fn send(&self, message: &OutgoingMessage) -> Result<MessageReceipt, TransportError> {
        let body = ApiRequest {
            from: ApiAddress {
                name: Some(&message.from.name),
                email: &message.from.email,
            },
            to: [ApiAddress {
                name: message.to.name.as_deref(),
                email: &message.to.email,
            }],
            reply_to: ApiAddress {
                name: Some(&message.reply_to.name),
                email: &message.reply_to.email,
            },
            subject: &message.subject,
            html: &message.html_body,
            text: &message.text_body,
            attachments: [&message.attachment],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: ApiResponse = resp.json()?;
        Ok(MessageReceipt { id: parsed.id })
    }
}

/// Build the configured transport.
pub fn mailer_from_config(config: &MailConfig) -> Result<Box<dyn Mailer>, TransportError> {
    Ok(match config.transport {
        MailTransport::Outbox => Box::new(OutboxMailer::new(&config.outbox_dir)),
        MailTransport::Http => Box::new(HttpMailer::from_config(config)?),
    })
}

/// A message that reached its transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub recipient: Recipient,
    pub receipt: MessageReceipt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub deliveries: Vec<Delivery>,
}

/// A message the transport refused. `delivered` lists the recipients that
/// were already sent to in the same dispatch.
#[derive(Error, Debug)]
#[error("delivery to {recipient} failed: {source}")]
pub struct DeliveryError {
    pub recipient: Recipient,
    pub delivered: Vec<Delivery>,
    #[source]
    pub source: TransportError,
}

/// Composes and sends moodboard emails.
pub struct Dispatcher<'a> {
    mailer: &'a dyn Mailer,
    from: Identity,
    reply_to: Identity,
}

impl<'a> Dispatcher<'a> {
    pub fn new(mailer: &'a dyn Mailer, from: Identity, reply_to: Identity) -> Self {
        Self {
            mailer,
            from,
            reply_to,
        }
    }

    pub fn from_config(mailer: &'a dyn Mailer, config: &MailConfig) -> Self {
        Self::new(
            mailer,
            Identity {
                name: config.from_name.clone(),
                email: config.from_email.clone(),
            },
            Identity {
                name: config.reply_to_name.clone(),
                email: config.reply_to_email.clone(),
            },
        )
    }

    /// Send `document` to every recipient of `moodboard`, in order.
    ///
    /// Stops at the first transport failure.
    pub fn dispatch(
        &self,
        moodboard: &Moodboard,
        document: &Document,
        view_url: &str,
    ) -> Result<DeliveryReport, DeliveryError> {
        let mut deliveries = Vec::new();
        for recipient in recipients(moodboard) {
            let message = self.compose(moodboard, document, view_url, recipient.clone());
            match self.mailer.send(&message) {
                Ok(receipt) => {
                    info!(
                        target = "deliver::dispatch",
                        share_token = %moodboard.share_token,
                        role = recipient.role.as_str(),
                        message_id = %receipt.id,
                        "moodboard sent"
                    );
                    deliveries.push(Delivery { recipient, receipt });
                }
                Err(source) => {
                    error!(
                        target = "deliver::dispatch",
                        share_token = %moodboard.share_token,
                        role = recipient.role.as_str(),
                        error = %source,
                        "moodboard delivery failed"
                    );
                    return Err(DeliveryError {
                        recipient,
                        delivered: deliveries,
                        source,
                    });
                }
            }
        }
        Ok(DeliveryReport { deliveries })
    }

    /// Build the message for one recipient.
    pub fn compose(
        &self,
        moodboard: &Moodboard,
        document: &Document,
        view_url: &str,
        recipient: Recipient,
    ) -> OutgoingMessage {
        let title = moodboard.title();
        let subject = match recipient.role {
            RecipientRole::Requester => format!("Your moodboard: {title}"),
            RecipientRole::Designer => {
                format!("{} shared a moodboard: {title}", moodboard.user_name)
            }
        };
        OutgoingMessage {
            html_body: html_body(moodboard, &recipient, view_url).into_string(),
            text_body: text_body(moodboard, &recipient, view_url),
            to: recipient,
            from: self.from.clone(),
            reply_to: self.reply_to.clone(),
            subject,
            view_url: view_url.to_string(),
            attachment: Attachment::from(document),
        }
    }
}

fn greeting(moodboard: &Moodboard, recipient: &Recipient) -> String {
    match (recipient.role, recipient.name.as_deref()) {
        (RecipientRole::Requester, _) => format!("Hi {},", moodboard.user_name),
        (RecipientRole::Designer, Some(name)) => format!("Hi {name},"),
        (RecipientRole::Designer, None) => "Hello,".to_string(),
    }
}

fn intro(moodboard: &Moodboard, recipient: &Recipient) -> String {
    match recipient.role {
        RecipientRole::Requester => "Your moodboard is ready.".to_string(),
        RecipientRole::Designer => format!(
            "{} ({}) shared a moodboard with you.",
            moodboard.user_name, moodboard.user_email
        ),
    }
}

fn html_body(moodboard: &Moodboard, recipient: &Recipient, view_url: &str) -> Markup {
    html! {
        p { (greeting(moodboard, recipient)) }
        p { (intro(moodboard, recipient)) }
        p {
            strong { (moodboard.title()) }
            @if let Some(location) = non_blank(&moodboard.project_location) {
                " · " (location)
            }
        }
        p { a href=(view_url) { "View it online" } " or open the attached document." }
        p { (moodboard.product_data.len()) " products selected." }
    }
}

fn text_body(moodboard: &Moodboard, recipient: &Recipient, view_url: &str) -> String {
    format!(
        "{}\n\n{}\n\n{}\n\nView it online: {}\nThe document is attached.\n",
        greeting(moodboard, recipient),
        intro(moodboard, recipient),
        moodboard.title(),
        view_url
    )
}
