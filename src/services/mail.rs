//! Outbound mail relay: a `Mailer` trait so dispatch policy is testable,
//! plus the SMTP implementation used in production.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;

/// A fully-rendered email document, ready to hand to the relay.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug)]
pub enum MailError {
    Address(lettre::address::AddressError),
    Compose(lettre::error::Error),
    Transport(lettre::transport::smtp::Error),
}

impl std::fmt::Display for MailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailError::Address(e) => write!(f, "Invalid address: {}", e),
            MailError::Compose(e) => write!(f, "Failed to compose message: {}", e),
            MailError::Transport(e) => write!(f, "SMTP error: {}", e),
        }
    }
}

impl std::error::Error for MailError {}

/// One send operation against the relay. Implemented by `SmtpMailer` in
/// production and by recording mocks in tests.
#[allow(async_fn_in_trait)]
pub trait Mailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    sender: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build a TLS transport against the configured relay. The connection
    /// itself is established lazily on first send.
    pub fn new(config: &Config) -> Result<Self, MailError> {
        let sender = config.email_user.parse().map_err(MailError::Address)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(MailError::Transport)?
            .credentials(Credentials::new(
                config.email_user.clone(),
                config.email_pass.clone(),
            ))
            .build();

        Ok(Self { sender, transport })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .to(email.to.parse().map_err(MailError::Address)?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML);

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(reply_to.parse().map_err(MailError::Address)?);
        }

        let message = builder
            .body(email.html_body.clone())
            .map_err(MailError::Compose)?;

        self.transport
            .send(message)
            .await
            .map_err(MailError::Transport)?;

        Ok(())
    }
}
