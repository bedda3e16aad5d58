//! Notification transport boundary. Retry policy, if any, belongs to the
//! implementation; the monitor only counts failures.

use crate::render::{DedupId, Message};
use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
};
use thiserror::Error as ThisError;
use tracing::debug;

///
/// TransportError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TransportError {
    #[error("message has no recipients")]
    NoRecipients,

    #[error("delivery rejected: {reason}")]
    Rejected { reason: String },
}

///
/// Delivery
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Delivery {
    Sent,
    /// A message with the same dedup id was already delivered.
    Duplicate,
}

///
/// Transport
///

pub trait Transport {
    fn send(&self, message: &Message) -> Result<Delivery, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, message: &Message) -> Result<Delivery, TransportError> {
        (**self).send(message)
    }
}

///
/// MemoryTransport
///
/// Records delivered messages in memory and suppresses duplicates.
///

#[derive(Debug, Default)]
pub struct MemoryTransport {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    delivered: HashSet<DedupId>,
    sent: Vec<Message>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered messages, in send order.
    #[must_use]
    pub fn sent(&self) -> Vec<Message> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sent
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sent
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Transport for MemoryTransport {
    fn send(&self, message: &Message) -> Result<Delivery, TransportError> {
        if message.to.is_empty() {
            return Err(TransportError::NoRecipients);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.delivered.insert(message.dedup_id) {
            debug!(dedup_id = %message.dedup_id, "duplicate suppressed");
            return Ok(Delivery::Duplicate);
        }
        state.sent.push(message.clone());

        Ok(Delivery::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CHARSET, ContentType, Part};
    use cidag_core::object::ObjectKey;

    fn message(to: &[&str], subject: &str) -> Message {
        let part = |content_type| Part {
            content_type,
            charset: CHARSET,
            content: subject.to_string(),
        };

        Message {
            from: None,
            to: to.iter().map(ToString::to_string).collect(),
            notification_id: "Test".to_string(),
            subject: subject.to_string(),
            text: part(ContentType::TextPlain),
            html: part(ContentType::TextHtml),
            dedup_id: DedupId::compute(&ObjectKey::new("Test", "a", subject), "rule", "Test"),
        }
    }

    #[test]
    fn memory_transport_records_and_suppresses_duplicates() {
        let transport = MemoryTransport::new();
        let first = message(&["a@example.org"], "one");
        let second = message(&["a@example.org"], "two");

        assert_eq!(transport.send(&first), Ok(Delivery::Sent));
        assert_eq!(transport.send(&second), Ok(Delivery::Sent));
        assert_eq!(transport.send(&first), Ok(Delivery::Duplicate));

        let subjects: Vec<_> = transport.sent().into_iter().map(|m| m.subject).collect();
        assert_eq!(subjects, ["one", "two"]);
    }

    #[test]
    fn messages_without_recipients_are_rejected() {
        let transport = MemoryTransport::new();

        assert_eq!(
            transport.send(&message(&[], "none")),
            Err(TransportError::NoRecipients)
        );
        assert!(transport.is_empty());
    }
}
