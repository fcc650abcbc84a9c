use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::SmtpConfig;
use crate::domain::{BudgetAnalysis, Record, ValidationError};
use crate::io::records_to_csv;

use super::{AppError, LedgerService};

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// A message ready to hand to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<EmailAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// Delivers an [`OutgoingEmail`]. Sending blocks until the relay answers.
pub trait Mailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), AppError>;
}

/// Monthly report: the month's records as a CSV attachment.
pub fn monthly_report_email(
    records: &[Record],
    month: &str,
    from: &str,
    to: &str,
) -> Result<OutgoingEmail, AppError> {
    let to = recipient(to)?;
    let in_month = crate::domain::records_in_month(records, month);
    if in_month.is_empty() {
        return Err(AppError::NoRecordsForMonth(month.to_string()));
    }

    Ok(OutgoingEmail {
        from: from.to_string(),
        to,
        subject: format!("{} financial report", month),
        body: format!(
            "Hello,\n\nAttached are your income and expense records for {} ({} entries).\n",
            month,
            in_month.len()
        ),
        attachment: Some(EmailAttachment {
            filename: format!("{}_report.csv", month),
            content_type: CSV_CONTENT_TYPE.to_string(),
            content: records_to_csv(&in_month)?,
        }),
    })
}

/// Budget report: the analysis text as the message body.
pub fn budget_report_email(
    analysis: &BudgetAnalysis,
    from: &str,
    to: &str,
) -> Result<OutgoingEmail, AppError> {
    Ok(OutgoingEmail {
        from: from.to_string(),
        to: recipient(to)?,
        subject: format!("{} budget analysis", analysis.month),
        body: analysis.to_report_text(),
        attachment: None,
    })
}

fn recipient(to: &str) -> Result<String, AppError> {
    let to = to.trim();
    if to.is_empty() {
        return Err(ValidationError::MissingField("recipient").into());
    }
    Ok(to.to_string())
}

impl LedgerService {
    /// Email the records of `month` to `to`. Ledger state is never touched.
    pub fn send_monthly_report<M: Mailer + ?Sized>(
        &self,
        mailer: &M,
        from: &str,
        to: &str,
        month: &str,
    ) -> Result<OutgoingEmail, AppError> {
        let email = monthly_report_email(self.records(), month, from, to)?;
        mailer.send(&email)?;
        Ok(email)
    }

    pub fn send_budget_report<M: Mailer + ?Sized>(
        &self,
        mailer: &M,
        from: &str,
        to: &str,
        analysis: &BudgetAnalysis,
    ) -> Result<OutgoingEmail, AppError> {
        let email = budget_report_email(analysis, from, to)?;
        mailer.send(&email)?;
        Ok(email)
    }
}

/// [`Mailer`] that logs in to an SMTP relay over implicit TLS.
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, AppError> {
        let (username, password) = config.credentials()?;
        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| AppError::Email(format!("Failed to create SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        info!(host = %config.host, port = config.port, "SMTP relay configured");
        Ok(Self { transport })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let message = build_message(email)?;
        self.transport
            .send(&message)
            .map_err(|e| AppError::Email(e.to_string()))?;

        info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

fn build_message(email: &OutgoingEmail) -> Result<Message, AppError> {
    let from: Mailbox = email
        .from
        .parse()
        .map_err(|e| AppError::Email(format!("Invalid sender '{}': {}", email.from, e)))?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| AppError::Email(format!("Invalid recipient '{}': {}", email.to, e)))?;

    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone());

    let message = match &email.attachment {
        Some(attachment) => {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| AppError::Email(e.to_string()))?;
            builder.multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(email.body.clone()))
                    .singlepart(
                        Attachment::new(attachment.filename.clone())
                            .body(attachment.content.clone(), content_type),
                    ),
            )
        }
        None => builder.body(email.body.clone()),
    };
    message.map_err(|e| AppError::Email(format!("Failed to build email: {}", e)))
}
