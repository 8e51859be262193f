//! Outbound email over an SMTP relay.
//!
//! Handlers depend on the `Notifier` trait only. `SmtpNotifier` is the lettre-backed
//! implementation; `DisabledNotifier` stands in when no SMTP credentials are set so
//! the service still starts and every send reports `NotConfigured`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use folio_core::SmtpSettings;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

const PDF_CONTENT_TYPE: &str = "application/pdf";
const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Relay rejected the login (SMTP 535 or similar)
    #[error("SMTP authentication failed: {0}")]
    Authentication(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("Invalid email message: {0}")]
    InvalidMessage(String),

    #[error("Email delivery is not configured")]
    NotConfigured,

    #[error("Attachment unavailable: {0}")]
    Attachment(String),
}

/// File attached to an outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl EmailAttachment {
    /// Read `path` and attach it under `filename`.
    pub async fn from_path(path: &Path, filename: &str) -> Result<Self, NotifyError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| NotifyError::Attachment(format!("{}: {}", path.display(), e)))?;

        let is_pdf = Path::new(filename)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        Ok(Self {
            filename: filename.to_string(),
            content_type: if is_pdf {
                PDF_CONTENT_TYPE
            } else {
                BINARY_CONTENT_TYPE
            }
            .to_string(),
            data,
        })
    }
}

/// A single plain-text email, optionally with one attachment.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<EmailAttachment>,
}

impl OutgoingEmail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Sends one email, once. Callers decide what a failure means.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError>;

    /// Whether sends can succeed at all.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Notifier used when SMTP credentials are missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError> {
        tracing::warn!(to = %email.to, subject = %email.subject, "Email not sent: SMTP is not configured");
        Err(NotifyError::NotConfigured)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Build the MIME message: plain text, or multipart/mixed when an attachment is present.
pub fn build_message(from: &Mailbox, email: &OutgoingEmail) -> Result<Message, NotifyError> {
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| NotifyError::InvalidMessage(format!("invalid recipient '{}': {}", email.to, e)))?;

    let builder = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.as_str());

    let message = match &email.attachment {
        None => builder
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone()),
        Some(attachment) => {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| NotifyError::InvalidMessage(e.to_string()))?;
            builder.multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(email.body.clone()))
                    .singlepart(
                        Attachment::new(attachment.filename.clone())
                            .body(attachment.data.clone(), content_type),
                    ),
            )
        }
    };

    message.map_err(|e| NotifyError::InvalidMessage(e.to_string()))
}

fn classify_send_error(err: lettre::transport::smtp::Error) -> NotifyError {
    let rejected_login = err.status().is_some_and(|code| code.to_string() == "535")
        || err.to_string().to_lowercase().contains("authentication");
    if rejected_login {
        NotifyError::Authentication(err.to_string())
    } else {
        NotifyError::Transport(err.to_string())
    }
}

/// lettre-backed SMTP notifier.
#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build from settings. Returns `Ok(None)` when no credentials are configured.
    pub fn from_settings(settings: &SmtpSettings) -> Result<Option<Self>, NotifyError> {
        let (Some(user), Some(password)) = (settings.user.as_deref(), settings.password.as_deref())
        else {
            tracing::debug!("SMTP credentials not set; email delivery disabled");
            return Ok(None);
        };

        let from: Mailbox = settings
            .sender()
            .unwrap_or(user)
            .parse()
            .map_err(|e| NotifyError::InvalidMessage(format!("invalid SMTP_FROM: {}", e)))?;

        let credentials = Credentials::new(user.to_string(), password.to_string());
        let timeout = Some(Duration::from_secs(settings.timeout_secs));

        let mailer = if settings.tls {
            let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| NotifyError::Transport(e.to_string()))?;
            tracing::info!(
                host = %settings.host,
                port = settings.port,
                "Email service initialized (SMTP with STARTTLS)"
            );
            builder
                .port(settings.port)
                .credentials(credentials)
                .timeout(timeout)
                .build()
        } else {
            tracing::info!(host = %settings.host, port = settings.port, "Email service initialized (SMTP)");
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                .port(settings.port)
                .credentials(credentials)
                .timeout(timeout)
                .build()
        };

        Ok(Some(Self { mailer, from }))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    #[tracing::instrument(skip(self, email), fields(to = %email.to, subject = %email.subject))]
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError> {
        let message = build_message(&self.from, &email)?;

        match self.mailer.send(message).await {
            Ok(_) => {
                tracing::info!(has_attachment = email.attachment.is_some(), "Email sent");
                Ok(())
            }
            Err(e) => {
                let err = classify_send_error(e);
                match &err {
                    NotifyError::Authentication(_) => {
                        tracing::error!(error = %err, "SMTP authentication failed; check SMTP_USER and SMTP_PASSWORD")
                    }
                    _ => tracing::error!(error = %err, "Failed to send email"),
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> Mailbox {
        "folio@example.com".parse().unwrap()
    }

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            user: None,
            password: None,
            from: None,
            tls: true,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_plain_message() {
        let email = OutgoingEmail::new("ada@example.com", "Hello", "Body text");
        let formatted = String::from_utf8(build_message(&sender(), &email).unwrap().formatted()).unwrap();
        assert!(formatted.contains("Subject: Hello"));
        assert!(formatted.contains("To: ada@example.com"));
        assert!(formatted.contains("Body text"));
        assert!(!formatted.contains("multipart/mixed"));
    }

    #[test]
    fn test_attachment_makes_multipart_message() {
        let email = OutgoingEmail::new("ada@example.com", "Resume", "Attached").with_attachment(
            EmailAttachment {
                filename: "Resume.pdf".to_string(),
                content_type: PDF_CONTENT_TYPE.to_string(),
                data: b"%PDF-1.4".to_vec(),
            },
        );
        let formatted = String::from_utf8(build_message(&sender(), &email).unwrap().formatted()).unwrap();
        assert!(formatted.contains("multipart/mixed"));
        assert!(formatted.contains("Resume.pdf"));
        assert!(formatted.contains("application/pdf"));
    }

    #[test]
    fn test_invalid_recipient_is_rejected() {
        let email = OutgoingEmail::new("not an address", "Hi", "Body");
        assert!(matches!(
            build_message(&sender(), &email),
            Err(NotifyError::InvalidMessage(_))
        ));
    }

    #[tokio::test]
    async fn test_attachment_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"%PDF-1.4 test").unwrap();

        let attachment = EmailAttachment::from_path(&path, "Resume.pdf").await.unwrap();
        assert_eq!(attachment.content_type, PDF_CONTENT_TYPE);
        assert_eq!(attachment.data, b"%PDF-1.4 test");

        let missing = EmailAttachment::from_path(&dir.path().join("nope.pdf"), "Resume.pdf").await;
        assert!(matches!(missing, Err(NotifyError::Attachment(_))));
    }

    #[tokio::test]
    async fn test_disabled_notifier_reports_not_configured() {
        let notifier = DisabledNotifier;
        assert!(!notifier.is_enabled());
        let result = notifier
            .send(OutgoingEmail::new("ada@example.com", "Hi", "Body"))
            .await;
        assert!(matches!(result, Err(NotifyError::NotConfigured)));
    }

    #[test]
    fn test_from_settings_without_credentials_is_disabled() {
        assert!(SmtpNotifier::from_settings(&settings()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_from_settings_with_credentials_builds_transport() {
        let mut settings = settings();
        settings.user = Some("me@example.com".to_string());
        settings.password = Some("secret".to_string());
        settings.tls = false;
        let notifier = SmtpNotifier::from_settings(&settings).unwrap().unwrap();
        assert_eq!(notifier.from.email.to_string(), "me@example.com");
    }

    fn plain_settings(port: u16) -> SmtpSettings {
        SmtpSettings {
            host: "127.0.0.1".to_string(),
            port,
            user: Some("me@example.com".to_string()),
            password: Some("wrong-password".to_string()),
            from: None,
            tls: false,
            timeout_secs: 5,
        }
    }

    /// One-connection SMTP server that advertises AUTH and rejects every login.
    async fn spawn_rejecting_relay() -> u16 {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = socket.into_split();
            let mut lines = BufReader::new(reader).lines();

            writer.write_all(b"220 relay.test ESMTP\r\n").await.unwrap();
            while let Ok(Some(line)) = lines.next_line().await {
                let command = line.to_ascii_uppercase();
                let reply: &[u8] = if command.starts_with("EHLO") {
                    b"250-relay.test\r\n250 AUTH PLAIN LOGIN\r\n"
                } else if command.starts_with("AUTH") {
                    b"535 5.7.8 Username and Password not accepted\r\n"
                } else if command.starts_with("QUIT") {
                    b"221 2.0.0 Bye\r\n"
                } else {
                    b"250 OK\r\n"
                };
                if writer.write_all(reply).await.is_err() || command.starts_with("QUIT") {
                    break;
                }
            }
        });

        port
    }

    #[tokio::test]
    async fn test_rejected_login_is_authentication_error() {
        let port = spawn_rejecting_relay().await;
        let notifier = SmtpNotifier::from_settings(&plain_settings(port))
            .unwrap()
            .unwrap();

        let result = notifier
            .send(OutgoingEmail::new("ada@example.com", "Hi", "Body"))
            .await;
        assert!(
            matches!(result, Err(NotifyError::Authentication(_))),
            "Expected Authentication error, got {:?}",
            result
        );
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_transport_error() {
        // Bind then drop so nothing listens on the port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let notifier = SmtpNotifier::from_settings(&plain_settings(port))
            .unwrap()
            .unwrap();
        let result = notifier
            .send(OutgoingEmail::new("ada@example.com", "Hi", "Body"))
            .await;
        assert!(
            matches!(result, Err(NotifyError::Transport(_))),
            "Expected Transport error, got {:?}",
            result
        );
    }
}
