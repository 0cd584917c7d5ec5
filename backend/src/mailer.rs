//! Outbound mail transport.
//!
//! [`SmtpMailer`] wraps the `lettre` async SMTP transport. Configuration is
//! loaded from environment variables; when `SMTP_HOST` is not set,
//! [`MailConfig::from_env`] returns `None` and the send endpoint reports the
//! transport as unconfigured instead of failing at startup. The [`Mailer`]
//! trait is the seam the distribution engine dispatches through, so batch
//! accounting can be tested without a real SMTP server.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;
/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@clubcert.local";

/// The certificate PNG attached to each message.
pub struct CertificateAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Sends one personalized certificate email.
pub trait Mailer {
    fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment: CertificateAttachment,
    ) -> impl std::future::Future<Output = Result<(), String>> + Send;
}

/// SMTP configuration from environment variables.
///
/// | Variable        | Required | Default                  |
/// |-----------------|----------|--------------------------|
/// | `SMTP_HOST`     | yes      | —                        |
/// | `SMTP_PORT`     | no       | `587`                    |
/// | `SMTP_FROM`     | no       | `noreply@clubcert.local` |
/// | `SMTP_USER`     | no       | —                        |
/// | `SMTP_PASSWORD` | no       | —                        |
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl MailConfig {
    /// Returns `None` if `SMTP_HOST` is not set, signalling that certificate
    /// distribution is not configured.
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Production mailer backed by an async STARTTLS SMTP transport.
pub struct SmtpMailer {
    from_address: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Result<Self, String> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| e.to_string())?
            .port(config.smtp_port);
        if let (Some(user), Some(password)) = (config.smtp_user, config.smtp_password) {
            builder = builder.credentials(Credentials::new(user, password));
        }
        Ok(Self {
            from_address: config.from_address,
            transport: builder.build(),
        })
    }
}

impl Mailer for SmtpMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment: CertificateAttachment,
    ) -> Result<(), String> {
        let png = ContentType::parse("image/png").map_err(|e| e.to_string())?;
        let attachment_part =
            Attachment::new(attachment.filename).body(Body::new(attachment.bytes), png);

        let email = Message::builder()
            .from(self.from_address.parse::<Mailbox>().map_err(|e| e.to_string())?)
            .to(to.parse::<Mailbox>().map_err(|e| e.to_string())?)
            .subject(subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(body.to_string()))
                    .singlepart(attachment_part),
            )
            .map_err(|e| e.to_string())?;

        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
