//! mailer::mock
//!
//! Transport that records messages instead of sending them.
//!
//! # Example
//!
//! ```
//! use bugsmith::core::normalize::NormalizedReport;
//! use bugsmith::mailer::mock::CapturingTransport;
//! use bugsmith::mailer::Transport;
//! use bugsmith::report::{MessageParts, OutgoingMessage};
//!
//! let transport = CapturingTransport::new();
//! let message = OutgoingMessage::assemble(MessageParts::default(), &NormalizedReport::default());
//! transport.deliver(&message).unwrap();
//! assert_eq!(transport.delivered().len(), 1);
//! ```

use std::sync::{Arc, Mutex};

use super::{DeliveryError, DeliveryReceipt, Transport};
use crate::report::OutgoingMessage;

/// Capturing transport.
///
/// Clones share the captured messages.
#[derive(Debug, Clone, Default)]
pub struct CapturingTransport {
    inner: Arc<Mutex<CaptureInner>>,
}

#[derive(Debug, Default)]
struct CaptureInner {
    delivered: Vec<OutgoingMessage>,
    fail: bool,
    plain_text_only: bool,
}

impl CapturingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delivery fail.
    pub fn failing(self) -> Self {
        self.inner.lock().unwrap().fail = true;
        self
    }

    /// Behave like a channel that cannot carry attachments.
    pub fn plain_text_only(self) -> Self {
        self.inner.lock().unwrap().plain_text_only = true;
        self
    }

    /// Messages delivered so far.
    pub fn delivered(&self) -> Vec<OutgoingMessage> {
        self.inner.lock().unwrap().delivered.clone()
    }
}

impl Transport for CapturingTransport {
    fn name(&self) -> &'static str {
        "capture"
    }

    fn carries_attachments(&self) -> bool {
        !self.inner.lock().unwrap().plain_text_only
    }

    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryReceipt, DeliveryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail {
            return Err(DeliveryError::Failed {
                program: "capture".into(),
                status: "exit status: 1".into(),
            });
        }
        inner.delivered.push(message.clone());
        Ok(DeliveryReceipt {
            channel: "capture",
            destination: message.to.join(", "),
            submitted: true,
        })
    }
}
