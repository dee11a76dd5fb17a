//! mailer::smtp
//!
//! Submission straight to an SMTP server.
//!
//! The rendered message goes out unchanged apart from CRLF line endings.
//! The envelope uses the bare addresses from `From` and from every
//! recipient header. With `tls` the connection is upgraded with STARTTLS
//! before any credentials are sent.

use std::fmt;

use lettre::address::{Address, Envelope};
use lettre::transport::smtp::authentication::Credentials;

use super::{with_rescue, DeliveryError, DeliveryReceipt, Transport};
use crate::report::OutgoingMessage;

/// Port used when `smtphost` names none.
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Where and how to submit.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// Upgrade the connection with STARTTLS
    pub tls: bool,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<hidden>"))
            .finish()
    }
}

impl SmtpSettings {
    /// Settings for a `host[:port]` spelling.
    ///
    /// # Example
    ///
    /// ```
    /// use bugsmith::mailer::SmtpSettings;
    ///
    /// let settings = SmtpSettings::parse("mail.example.org:587").unwrap();
    /// assert_eq!(settings.host, "mail.example.org");
    /// assert_eq!(settings.port, 587);
    /// assert_eq!(SmtpSettings::parse("localhost").unwrap().port, 25);
    /// ```
    pub fn parse(spec: &str) -> Result<Self, DeliveryError> {
        let spec = spec.trim();
        let (host, port) = match spec.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') || host.ends_with(']') => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| DeliveryError::Smtp(format!("invalid port in '{}'", spec)))?;
                (host, port)
            }
            _ => (spec, DEFAULT_SMTP_PORT),
        };
        if host.is_empty() {
            return Err(DeliveryError::Smtp(format!("no host in '{}'", spec)));
        }
        Ok(Self {
            host: host.to_string(),
            port,
            tls: false,
            user: None,
            password: None,
        })
    }

    /// `host:port`, as shown to the reporter.
    pub fn destination(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Transport talking SMTP through any [`lettre::Transport`].
pub struct SmtpTransport<T = lettre::SmtpTransport> {
    destination: String,
    mailer: T,
}

impl SmtpTransport {
    /// Transport for a real server.
    pub fn connect(settings: &SmtpSettings) -> Result<Self, DeliveryError> {
        let builder = if settings.tls {
            lettre::SmtpTransport::starttls_relay(&settings.host)
                .map_err(|e| DeliveryError::Smtp(e.to_string()))?
        } else {
            lettre::SmtpTransport::builder_dangerous(&settings.host)
        };
        let mut builder = builder.port(settings.port);
        if let Some(user) = &settings.user {
            builder = builder.credentials(Credentials::new(
                user.clone(),
                settings.password.clone().unwrap_or_default(),
            ));
        }
        Ok(Self::with_mailer(settings.destination(), builder.build()))
    }
}

impl<T> SmtpTransport<T> {
    /// Transport sending through `mailer`.
    pub fn with_mailer(destination: impl Into<String>, mailer: T) -> Self {
        Self {
            destination: destination.into(),
            mailer,
        }
    }
}

impl<T> Transport for SmtpTransport<T>
where
    T: lettre::Transport,
    T::Error: fmt::Display,
{
    fn name(&self) -> &'static str {
        "smtp"
    }

    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryReceipt, DeliveryError> {
        let envelope = envelope(message)?;
        let data = message.render().replace('\n', "\r\n");
        self.mailer
            .send_raw(&envelope, data.as_bytes())
            .map_err(|e| with_rescue(message, DeliveryError::Smtp(e.to_string())))?;
        Ok(DeliveryReceipt {
            channel: self.name(),
            destination: self.destination.clone(),
            submitted: true,
        })
    }
}

/// `jane@example.org` from `Jane Doe <jane@example.org>`.
fn bare_address(value: &str) -> &str {
    match (value.rfind('<'), value.rfind('>')) {
        (Some(open), Some(close)) if open < close => value[open + 1..close].trim(),
        _ => value.trim(),
    }
}

fn parse_address(value: &str) -> Result<Address, DeliveryError> {
    bare_address(value)
        .parse::<Address>()
        .map_err(|e| DeliveryError::Smtp(format!("invalid address '{}': {}", value, e)))
}

fn envelope(message: &OutgoingMessage) -> Result<Envelope, DeliveryError> {
    let from = message.from.as_deref().map(parse_address).transpose()?;
    let to = message
        .recipients()
        .into_iter()
        .map(parse_address)
        .collect::<Result<Vec<_>, _>>()?;
    Envelope::new(from, to).map_err(|e| DeliveryError::Smtp(e.to_string()))
}
