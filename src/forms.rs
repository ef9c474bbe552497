//! Contact and career form submitters.
//!
//! Both forms follow the same contract:
//!
//! 1. Disable the submit button and show a localized "sending" label.
//! 2. If the form's `action` points at the static form relay, stop: the
//!    browser submits natively and navigates away, so nothing is restored.
//! 3. Otherwise serialize the fields (JSON for contact, multipart for
//!    career), POST them to the local API path and show a localized
//!    success or failure message. Success also resets the form.
//! 4. Restore the button label and re-enable it.
//!
//! Network access goes through the [`Transport`] trait. [`HttpTransport`]
//! is the blocking `reqwest` implementation used by the CLI; tests plug in
//! recording doubles.

use crate::config::FormsConfig;
use crate::dom::{Document, NodeId};
use crate::locale::{Bilingual, Locale};
use crate::timers::{TimerTask, Timers};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const SENDING: Bilingual = Bilingual::new("جاري الإرسال...", "Sending...");
const SEND_REQUEST: Bilingual = Bilingual::new("إرسال الطلب", "Send Request");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Contact,
    Career,
}

impl FormKind {
    pub const ALL: [FormKind; 2] = [FormKind::Contact, FormKind::Career];

    pub fn form_id(self) -> &'static str {
        match self {
            FormKind::Contact => "contactForm",
            FormKind::Career => "careerForm",
        }
    }

    pub fn message_id(self) -> &'static str {
        match self {
            FormKind::Contact => "formMessage",
            FormKind::Career => "careerFormMessage",
        }
    }

    /// Named fields of the production form, in document order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            FormKind::Contact => &["company_name", "services", "contact_name", "email", "message"],
            FormKind::Career => &["full_name", "email", "phone", "position", "cv"],
        }
    }

    pub fn success_text(self) -> Bilingual {
        match self {
            FormKind::Contact => Bilingual::new(
                "تم إرسال رسالتك بنجاح! سنتواصل معك قريباً.",
                "Your message has been sent successfully! We will contact you soon.",
            ),
            FormKind::Career => Bilingual::new(
                "تم استلام طلبك وسيتم التواصل معك قريباً.",
                "Your application has been received. We will contact you soon.",
            ),
        }
    }

    pub fn failure_text(self) -> Bilingual {
        match self {
            FormKind::Contact => Bilingual::new(
                "حدث خطأ في إرسال الرسالة. يرجى المحاولة مرة أخرى.",
                "An error occurred while sending your message. Please try again.",
            ),
            FormKind::Career => Bilingual::new(
                "تعذر إرسال الطلب. تأكد من الاتصال وحاول مرة أخرى.",
                "Submission failed. Check your connection and try again.",
            ),
        }
    }

    /// Only the contact message fades back to neutral.
    fn clears_message(self) -> bool {
        matches!(self, FormKind::Contact)
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormKind::Contact => "contact",
            FormKind::Career => "career",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Read an attachment from disk, guessing the content type from the
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self, SubmitError> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(FileUpload),
}

/// Ordered form fields, as `new FormData(form)` would collect them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, FieldValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.fields
            .push((name.to_string(), FieldValue::Text(value.into())));
        self
    }

    pub fn file(&mut self, name: &str, upload: FileUpload) -> &mut Self {
        self.fields.push((name.to_string(), FieldValue::File(upload)));
        self
    }

    /// First text value named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(n, v)| match v {
            FieldValue::Text(t) if n == name => Some(t.as_str()),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// JSON body of a contact submission. Missing fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub company_name: Option<String>,
    pub services: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactRequest {
    pub fn from_form(data: &FormData) -> Self {
        let field = |name: &str| data.get(name).map(str::to_string);
        Self {
            company_name: field("company_name"),
            services: field("services"),
            contact_name: field("contact_name"),
            email: field("email"),
            message: field("message"),
        }
    }
}

/// The part of an API response the site looks at.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<HttpResponse, SubmitError>;
    fn post_multipart(&self, path: &str, data: &FormData) -> Result<HttpResponse, SubmitError>;
}

/// Blocking HTTP transport rooted at the configured base URL.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &FormsConfig) -> Result<Self, SubmitError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn read(response: reqwest::blocking::Response) -> Result<HttpResponse, SubmitError> {
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<HttpResponse, SubmitError> {
        let response = self.client.post(self.url(path)).json(body).send()?;
        Self::read(response)
    }

    fn post_multipart(&self, path: &str, data: &FormData) -> Result<HttpResponse, SubmitError> {
        use reqwest::blocking::multipart::{Form, Part};

        let mut form = Form::new();
        for (name, value) in data.iter() {
            form = match value {
                FieldValue::Text(text) => form.text(name.to_string(), text.clone()),
                FieldValue::File(upload) => {
                    let part = Part::bytes(upload.bytes.clone())
                        .file_name(upload.filename.clone())
                        .mime_str(&upload.content_type)?;
                    form.part(name.to_string(), part)
                }
            };
        }
        let response = self.client.post(self.url(path)).multipart(form).send()?;
        Self::read(response)
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// The action targets the relay; the browser takes over.
    NativeRelay,
    Sent,
    Failed(SubmitError),
}

impl SubmitOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SubmitOutcome::Sent)
    }
}

/// A form bound to its page elements.
#[derive(Debug, Clone)]
pub struct Form {
    kind: FormKind,
    node: NodeId,
    button: Option<NodeId>,
    message: Option<NodeId>,
    /// Initial `value` of every named field, restored on reset.
    defaults: Vec<(NodeId, Option<String>)>,
    attachments: Vec<(String, FileUpload)>,
    relay_domain: String,
    endpoint: String,
    message_clear_ms: u64,
    message_generation: u64,
}

const FIELDS: &str = "input[name], select[name], textarea[name]";

impl Form {
    /// Find the form of `kind` in the page; `None` if it is absent.
    pub fn bind(doc: &Document, kind: FormKind, config: &FormsConfig) -> Option<Self> {
        let node = doc.by_id(kind.form_id())?;
        let defaults = fields(doc, node)
            .into_iter()
            .map(|field| (field, doc.element(field).attr("value").map(str::to_string)))
            .collect();
        let endpoint = match kind {
            FormKind::Contact => config.contact_endpoint.clone(),
            FormKind::Career => config.career_endpoint.clone(),
        };
        Some(Self {
            kind,
            node,
            button: doc.query_within(node, ".btn-submit"),
            message: doc.by_id(kind.message_id()),
            defaults,
            attachments: Vec::new(),
            relay_domain: config.relay_domain.clone(),
            endpoint,
            message_clear_ms: config.message_clear_ms,
            message_generation: 0,
        })
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    /// Set the value of the named field. Returns false if there is none.
    pub fn set_field(&self, doc: &mut Document, name: &str, value: &str) -> bool {
        let Some(field) = fields(doc, self.node)
            .into_iter()
            .find(|&f| doc.element(f).attr("name") == Some(name))
        else {
            return false;
        };
        doc.element_mut(field).set_attr("value", value);
        true
    }

    /// Attach a file to the named file input.
    pub fn attach(&mut self, name: &str, upload: FileUpload) {
        self.attachments.push((name.to_string(), upload));
    }

    pub fn is_relay(&self, doc: &Document) -> bool {
        doc.element(self.node)
            .attr("action")
            .is_some_and(|action| action.contains(&self.relay_domain))
    }

    /// Collect the named fields in document order. Unchecked checkboxes and
    /// radios are skipped; file inputs contribute their attachments.
    pub fn collect(&self, doc: &Document) -> FormData {
        let mut data = FormData::new();
        for field in fields(doc, self.node) {
            let el = doc.element(field);
            let Some(name) = el.attr("name") else {
                continue;
            };
            match el.attr("type") {
                Some("submit" | "button") => {}
                Some("checkbox" | "radio") if !el.has_attr("checked") => {}
                Some("file") => {
                    for (_, upload) in self.attachments.iter().filter(|(n, _)| n == name) {
                        data.file(name, upload.clone());
                    }
                }
                _ => {
                    data.text(name, el.attr("value").unwrap_or_default());
                }
            }
        }
        data
    }

    /// Restore every field to its initial value and drop attachments.
    pub fn reset(&mut self, doc: &mut Document) {
        for (field, value) in &self.defaults {
            let el = doc.element_mut(*field);
            match value {
                Some(v) => el.set_attr("value", v.clone()),
                None => el.remove_attr("value"),
            };
        }
        self.attachments.clear();
    }

    /// Disable the button and show "sending". Returns the label to restore.
    pub fn begin(&self, doc: &mut Document, locale: Locale) -> Option<String> {
        let button = self.button?;
        let el = doc.element_mut(button);
        let original = el.text.clone();
        el.set_text(SENDING.pick(locale)).set_attr("disabled", "");
        Some(original)
    }

    /// Re-enable the button with its original label.
    pub fn finish(&self, doc: &mut Document, original: Option<String>, locale: Locale) {
        let Some(button) = self.button else {
            return;
        };
        let label = match (self.kind, original) {
            (FormKind::Contact, Some(label)) if !label.is_empty() => label,
            (FormKind::Contact, _) => SEND_REQUEST.pick(locale).to_string(),
            (FormKind::Career, label) => label.unwrap_or_default(),
        };
        doc.element_mut(button)
            .set_text(label)
            .remove_attr("disabled");
    }

    /// Run the whole submission flow.
    pub fn submit(
        &mut self,
        doc: &mut Document,
        timers: &mut Timers,
        transport: &dyn Transport,
        locale: Locale,
    ) -> SubmitOutcome {
        let original = self.begin(doc, locale);
        if self.is_relay(doc) {
            debug!(form = %self.kind, "submitting natively to relay");
            return SubmitOutcome::NativeRelay;
        }

        let data = self.collect(doc);
        let outcome = match self.send(&data, transport) {
            Ok(()) => {
                self.reset(doc);
                self.show_message(doc, timers, MessageKind::Success, locale);
                SubmitOutcome::Sent
            }
            Err(e) => {
                error!(form = %self.kind, error = %e, "form submission failed");
                self.show_message(doc, timers, MessageKind::Error, locale);
                SubmitOutcome::Failed(e)
            }
        };
        self.finish(doc, original, locale);
        outcome
    }

    fn send(&self, data: &FormData, transport: &dyn Transport) -> Result<(), SubmitError> {
        let response = match self.kind {
            FormKind::Contact => {
                let body = serde_json::to_value(ContactRequest::from_form(data))?;
                transport.post_json(&self.endpoint, &body)?
            }
            FormKind::Career => transport.post_multipart(&self.endpoint, data)?,
        };
        let parsed: ApiResponse = serde_json::from_str(&response.body)?;
        if response.is_success() {
            Ok(())
        } else {
            Err(SubmitError::Status {
                status: response.status,
                message: parsed
                    .error
                    .unwrap_or_else(|| "Request failed".to_string()),
            })
        }
    }

    fn show_message(&mut self, doc: &mut Document, timers: &mut Timers, kind: MessageKind, locale: Locale) {
        let Some(message) = self.message else {
            return;
        };
        let text = match kind {
            MessageKind::Success => self.kind.success_text(),
            MessageKind::Error => self.kind.failure_text(),
        };
        doc.element_mut(message)
            .set_text(text.pick(locale))
            .set_class_name(&format!("form-message {}", kind.as_str()));
        if self.kind.clears_message() {
            self.message_generation += 1;
            timers.schedule(
                self.message_clear_ms,
                TimerTask::ClearFormMessage {
                    form: self.kind,
                    generation: self.message_generation,
                },
            );
        }
    }

    /// Drop the status class, unless a newer message replaced this one.
    pub fn clear_message(&self, doc: &mut Document, generation: u64) {
        if generation != self.message_generation {
            return;
        }
        if let Some(message) = self.message {
            doc.element_mut(message).set_class_name("form-message");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
        }
    }
}

/// A bare page holding only the form of `kind`, its submit button and its
/// message element. Lets the submission flow run outside the full site.
pub fn standalone_page(kind: FormKind) -> Document {
    let mut doc = Document::new();
    let body = doc.body();
    let form = doc.append_new(body, "form");
    doc.element_mut(form).set_attr("id", kind.form_id());
    for &name in kind.fields() {
        let input = doc.append_new(form, "input");
        let el = doc.element_mut(input).set_attr("name", name);
        if name == "cv" {
            el.set_attr("type", "file");
        }
    }
    let button = doc.append_new(form, "button");
    doc.element_mut(button)
        .add_class("btn-submit")
        .set_attr("type", "submit");
    let message = doc.append_new(body, "div");
    doc.element_mut(message)
        .add_class("form-message")
        .set_attr("id", kind.message_id());
    doc
}

fn fields(doc: &Document, form: NodeId) -> Vec<NodeId> {
    doc.descendants(form)
        .into_iter()
        .filter(|&n| doc.matches(n, FIELDS))
        .collect()
}
