//! Outgoing mail.
//!
//! Handlers depend on the [`Mailer`] trait only. The default
//! [`LogMailer`] writes messages to the log, which is all a single-shop
//! install needs until an SMTP relay is configured.

use std::sync::Mutex;

use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Logs messages instead of delivering them.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        info!(to, subject, body_len = body.len(), "Mail queued (log transport)");
        Ok(())
    }
}

/// A sent message, as seen by [`MemoryMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Keeps messages in memory; used by tests to assert on delivery.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: bool,
}

impl MemoryMailer {
    /// A mailer whose every send fails.
    pub fn failing() -> Self {
        MemoryMailer {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Delivery("transport unavailable".to_string()));
        }
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| MailError::Delivery("mailbox poisoned".to_string()))?;
        sent.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
