use async_trait::async_trait;
use bytes::Bytes;
use lettre::message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::sync::Arc;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<EmailAttachment>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

/// SMTP relay delivery. Sends run on the blocking pool.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<SmtpTransport>,
}

impl SmtpMailer {
    pub fn new(host: &str, user: String, pass: String) -> Result<Self> {
        let creds = Credentials::new(user, pass);
        let transport = SmtpTransport::relay(host)
            .map_err(|e| Error::Config(format!("Invalid SMTP relay {}: {}", host, e)))?
            .credentials(creds)
            .build();
        Ok(Self {
            transport: Arc::new(transport),
        })
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox> {
    raw.parse::<Mailbox>()
        .map_err(|e| Error::Email(format!("Invalid address '{}': {}", raw, e)))
}

pub fn build_message(email: &OutgoingEmail) -> Result<Message> {
    let mut body = MultiPart::mixed().singlepart(SinglePart::html(email.html.clone()));
    for attachment in &email.attachments {
        let content_type = ContentType::parse(&attachment.content_type)
            .map_err(|e| Error::Email(format!("Invalid attachment type: {}", e)))?;
        body = body.singlepart(
            Attachment::new(attachment.filename.clone())
                .body(attachment.data.to_vec(), content_type),
        );
    }

    Message::builder()
        .from(parse_mailbox(&email.from)?)
        .to(parse_mailbox(&email.to)?)
        .subject(email.subject.clone())
        .multipart(body)
        .map_err(|e| Error::Email(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let message = build_message(&email)?;
        let transport = self.transport.clone();
        tracing::debug!("sending email to {}", email.to);

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| Error::Internal(format!("Email task failed to execute: {}", e)))?
            .map_err(|e| Error::Email(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            from: "jobs@jobfinder.test".into(),
            to: to.into(),
            subject: "Application Confirmation - Engineer at Acme".into(),
            html: "<p>Hello</p>".into(),
            attachments: vec![EmailAttachment {
                filename: "cv.pdf".into(),
                content_type: "application/pdf".into(),
                data: Bytes::from_static(b"%PDF-1.4"),
            }],
        }
    }

    #[test]
    fn builds_multipart_message_with_attachment() {
        let message = build_message(&email("a@x.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Application Confirmation - Engineer at Acme"));
        assert!(raw.contains("filename=\"cv.pdf\""));
    }

    #[test]
    fn rejects_invalid_recipient() {
        let err = build_message(&email("not an address")).unwrap_err();
        assert!(matches!(err, Error::Email(_)));
    }
}
