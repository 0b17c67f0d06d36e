//! Email delivery.

use crate::config::EmailSettings;
use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use std::fmt;
use std::str::FromStr;

/// Transport security for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Plain SMTP.
    None,
    /// Plain connection upgraded with STARTTLS.
    Tls,
    /// Implicit TLS from the first byte.
    Ssl,
}

impl FromStr for SmtpSecurity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "tls" => Ok(Self::Tls),
            "ssl" => Ok(Self::Ssl),
            other => anyhow::bail!("unknown SMTP security {:?}, expected none, TLS or SSL", other),
        }
    }
}

impl fmt::Display for SmtpSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Tls => "TLS",
            Self::Ssl => "SSL",
        };
        write!(f, "{}", s)
    }
}

/// One outgoing HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl EmailMessage {
    /// Subject line for a report about `cluster`.
    #[must_use]
    pub fn report_subject(cluster: &str) -> String {
        format!("Latest directory trend report for \"{}\"", cluster)
    }

    fn to_message(&self) -> Result<Message> {
        let from: Mailbox = self
            .from
            .parse()
            .with_context(|| format!("invalid sender address {:?}", self.from))?;

        let mut builder = Message::builder().from(from).subject(&self.subject);
        for to in &self.to {
            let mailbox: Mailbox = to
                .parse()
                .with_context(|| format!("invalid recipient address {:?}", to))?;
            builder = builder.to(mailbox);
        }

        builder
            .header(ContentType::TEXT_HTML)
            .body(self.html.clone())
            .context("could not build email message")
    }
}

/// Something that can deliver an [`EmailMessage`].
pub trait Mailer {
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// SMTP delivery via lettre.
pub struct SmtpMailer {
    transport: SmtpTransport,
    server: String,
}

impl SmtpMailer {
    pub fn new(settings: &EmailSettings) -> Result<Self> {
        let builder = match settings.security {
            SmtpSecurity::None => SmtpTransport::builder_dangerous(&settings.server),
            SmtpSecurity::Tls => SmtpTransport::starttls_relay(&settings.server)
                .with_context(|| format!("could not set up STARTTLS to {}", settings.server))?,
            SmtpSecurity::Ssl => SmtpTransport::relay(&settings.server)
                .with_context(|| format!("could not set up TLS to {}", settings.server))?,
        };

        let mut builder = builder.port(settings.port);
        if let Some((login, password)) = &settings.credentials {
            builder = builder.credentials(Credentials::new(login.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            server: format!("{}:{}", settings.server, settings.port),
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        let email = message.to_message()?;
        log::debug!(
            "Sending \"{}\" to {} via {}",
            message.subject,
            message.to.join(", "),
            self.server
        );
        self.transport
            .send(&email)
            .with_context(|| format!("SMTP delivery via {} failed", self.server))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            from: "ops@x.com".to_string(),
            to: vec!["a@x.com".to_string(), "b@y.com".to_string()],
            subject: EmailMessage::report_subject("prod-east"),
            html: "<html><body>hi</body></html>".to_string(),
        }
    }

    #[test]
    fn test_security_from_str() {
        assert_eq!("none".parse::<SmtpSecurity>().unwrap(), SmtpSecurity::None);
        assert_eq!("TLS".parse::<SmtpSecurity>().unwrap(), SmtpSecurity::Tls);
        assert_eq!("Ssl".parse::<SmtpSecurity>().unwrap(), SmtpSecurity::Ssl);
        assert!("starttls".parse::<SmtpSecurity>().is_err());
    }

    #[test]
    fn test_security_display() {
        assert_eq!(SmtpSecurity::Tls.to_string(), "TLS");
        assert_eq!(SmtpSecurity::None.to_string(), "none");
    }

    #[test]
    fn test_report_subject() {
        assert_eq!(
            EmailMessage::report_subject("prod-east"),
            "Latest directory trend report for \"prod-east\""
        );
    }

    #[test]
    fn test_message_is_html_with_all_recipients() {
        let formatted = String::from_utf8(message().to_message().unwrap().formatted()).unwrap();
        assert!(formatted.contains("a@x.com"));
        assert!(formatted.contains("b@y.com"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn test_invalid_recipient() {
        let mut msg = message();
        msg.to.push("not an address".to_string());
        let err = msg.to_message().unwrap_err();
        assert!(err.to_string().contains("invalid recipient"));
    }

    #[test]
    fn test_smtp_mailer_builds_for_each_security() {
        for security in [SmtpSecurity::None, SmtpSecurity::Tls, SmtpSecurity::Ssl] {
            let settings = EmailSettings {
                from: "ops@x.com".to_string(),
                to: vec!["a@x.com".to_string()],
                credentials: Some(("user".to_string(), "pw".to_string())),
                server: "smtp.example.com".to_string(),
                port: 2525,
                security,
            };
            let mailer = SmtpMailer::new(&settings).unwrap();
            assert_eq!(mailer.server, "smtp.example.com:2525");
        }
    }
}
