//! Contact form relay.
//!
//! One submission produces exactly one email. There is no queue, no retry and
//! no idempotency key, so a resubmitted form sends a duplicate message.

use crate::api::email::{EmailMessage, EmailSender, MailConfig};
use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

const NOT_PROVIDED: &str = "Ej angivet";
const SUCCESS_MESSAGE: &str = "Tack! Ditt meddelande har skickats.";
const FAILURE_MESSAGE: &str = "Det gick inte att skicka meddelandet.";
const INVALID_MESSAGE: &str = "Formuläret är inte korrekt ifyllt.";

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub message: String,
}

impl ContactSubmission {
    /// Check the required fields; returns the first problem found.
    ///
    /// # Errors
    /// Returns a human readable reason when `name`, `email` or `message` is
    /// blank. The email is otherwise taken as submitted.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("email is required".to_string());
        }
        if self.message.trim().is_empty() {
            return Err("message is required".to_string());
        }
        Ok(())
    }

    #[must_use]
    pub fn subject(&self) -> String {
        format!("Nytt kontaktformulär från {}", self.name)
    }

    /// HTML body. Fields are interpolated as submitted; only message newlines
    /// are rewritten to `<br>`.
    #[must_use]
    pub fn html_body(&self) -> String {
        let message = self.message.replace("\r\n", "\n").replace('\n', "<br>");
        format!(
            "<h2>Nytt kontaktformulär</h2>\
             <p><strong>Namn:</strong> {name}</p>\
             <p><strong>E-post:</strong> {email}</p>\
             <p><strong>Telefon:</strong> {phone}</p>\
             <p><strong>Företag:</strong> {company}</p>\
             <p><strong>Meddelande:</strong></p>\
             <p>{message}</p>",
            name = self.name,
            email = self.email,
            phone = optional_field(self.phone.as_deref()),
            company = optional_field(self.company.as_deref()),
        )
    }

    #[must_use]
    pub fn text_body(&self) -> String {
        format!(
            "Nytt kontaktformulär\n\n\
             Namn: {name}\n\
             E-post: {email}\n\
             Telefon: {phone}\n\
             Företag: {company}\n\n\
             Meddelande:\n{message}\n",
            name = self.name,
            email = self.email,
            phone = optional_field(self.phone.as_deref()),
            company = optional_field(self.company.as_deref()),
            message = self.message,
        )
    }

    /// Format the submission as an email addressed per `config`.
    #[must_use]
    pub fn to_email(&self, config: &MailConfig) -> EmailMessage {
        EmailMessage {
            from: config.from().to_string(),
            to: config.to().to_string(),
            reply_to: Some(self.email.trim().to_string()),
            subject: self.subject(),
            html: self.html_body(),
            text: self.text_body(),
        }
    }
}

fn optional_field(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(NOT_PROVIDED)
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Success,
    Error,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContactResponse {
    pub status: ContactStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContactResponse {
    fn success() -> Self {
        Self {
            status: ContactStatus::Success,
            message: SUCCESS_MESSAGE.to_string(),
            error: None,
        }
    }

    fn error(message: &str, error: String) -> Self {
        Self {
            status: ContactStatus::Error,
            message: message.to_string(),
            error: Some(error),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/contact-email",
    request_body = ContactSubmission,
    responses(
        (status = 200, description = "Message relayed to the mail transport", body = ContactResponse),
        (status = 400, description = "Required fields missing", body = ContactResponse),
        (status = 500, description = "Formatting or delivery failed", body = ContactResponse)
    ),
    tag = "contact"
)]
#[instrument(skip_all)]
pub async fn contact_email(
    sender: Extension<Arc<dyn EmailSender>>,
    config: Extension<Arc<MailConfig>>,
    Json(submission): Json<ContactSubmission>,
) -> impl IntoResponse {
    if let Err(reason) = submission.validate() {
        info!("Rejected contact submission: {reason}");
        return (
            StatusCode::BAD_REQUEST,
            Json(ContactResponse::error(INVALID_MESSAGE, reason)),
        );
    }

    let message = submission.to_email(&config);
    let sender = sender.0.clone();

    // SMTP I/O is blocking; keep it off the async workers.
    let result = match tokio::task::spawn_blocking(move || sender.send(&message)).await {
        Ok(result) => result,
        Err(err) => Err(anyhow::anyhow!("email task failed: {err}")),
    };

    match result {
        Ok(()) => {
            info!("Contact submission relayed");
            (StatusCode::OK, Json(ContactResponse::success()))
        }
        Err(err) => {
            error!("Failed to send contact email: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ContactResponse::error(FAILURE_MESSAGE, format!("{err:#}"))),
            )
        }
    }
}
