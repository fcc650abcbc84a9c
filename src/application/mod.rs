// Application layer: the ledger store and the integrations built on it.

pub mod advice;
pub mod error;
pub mod mailer;
pub mod service;

pub use advice::{AdviceClient, GeminiClient};
pub use error::*;
pub use mailer::{EmailAttachment, Mailer, OutgoingEmail, SmtpMailer};
pub use service::*;
