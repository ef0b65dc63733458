// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! Outbound verification mail.
//!
//! The pipeline treats mail as a fire-and-forget collaborator: a delivery
//! failure is logged and never rolls back the pending registration. When no
//! SMTP credentials are configured the server falls back to a logging
//! mailer, which keeps local development working without a relay.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};
use tracing::{debug, info, warn};

/// Delivery failure. Carries transport detail for the operator log only.
#[derive(Debug, thiserror::Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

/// Outbound mail collaborator.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// SMTP configuration, injected at construction.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// From address, e.g. `HabitSphere <noreply@habitsphere.app>`.
    pub from: String,
}

/// Mailer backed by an SMTP relay (STARTTLS).
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn build_transport(&self) -> Result<SmtpTransport, MailError> {
        let credentials =
            Credentials::new(self.config.username.clone(), self.config.password.clone());

        let transport = SmtpTransport::starttls_relay(&self.config.host)
            .map_err(|e| MailError(format!("SMTP transport setup failed: {e}")))?
            .port(self.config.port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        Ok(transport)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        debug!(to = %to, subject = %subject, "sending mail");

        let from = self
            .config
            .from
            .parse()
            .map_err(|e| MailError(format!("invalid from address: {e}")))?;
        let to_addr = to
            .parse()
            .map_err(|e| MailError(format!("invalid to address: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to_addr)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError(format!("failed to build message: {e}")))?;

        let transport = self.build_transport()?;

        // The SMTP transport is synchronous; keep it off the async workers
        tokio::task::spawn_blocking(move || {
            transport
                .send(&message)
                .map_err(|e| MailError(e.to_string()))
        })
        .await
        .map_err(|e| MailError(format!("mail task failed: {e}")))??;

        info!(to = %to, "mail sent");
        Ok(())
    }
}

/// Mailer that only logs. Used when SMTP is not configured.
///
/// The verification code ends up in the server log, which is acceptable for
/// local development and nothing else.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        warn!(to = %to, subject = %subject, body = %body, "SMTP not configured, logging mail instead");
        Ok(())
    }
}
