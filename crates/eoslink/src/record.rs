//! The record capability contract.
//!
//! A record type declares how many distinct messages make up one record and
//! how to parse exactly that set into a value. Reconstruction is attempted
//! only once the full set is present; a failed attempt discards the set.

use uuid::Uuid;

use crate::message::{DecodeError, Message};
use crate::target::RecordTarget;

/// A domain record reconstructed from a fixed-size ordered set of messages.
///
/// Records are immutable once constructed; an update replaces the whole
/// record. `ordinal` is the console-assigned number used for sorting and for
/// addressing records whose identifier is not yet known; `identifier` is the
/// stable key used for update/delete correlation.
pub trait Record: Clone + Send + Sync + 'static {
    const TARGET: RecordTarget;

    /// Number of distinct messages required to reconstruct one record.
    const MESSAGE_COUNT: usize;

    fn try_parse(messages: &[Message]) -> Result<Self, DecodeError>;

    fn ordinal(&self) -> f64;

    fn identifier(&self) -> Uuid;
}

pub(crate) fn expect_message_count(
    messages: &[Message],
    expected: usize,
) -> Result<(), DecodeError> {
    if messages.len() == expected {
        Ok(())
    } else {
        Err(DecodeError::MessageCount {
            expected,
            actual: messages.len(),
        })
    }
}

/// The message whose address contains `marker`.
pub(crate) fn message_with<'a>(
    messages: &'a [Message],
    marker: &'static str,
) -> Result<&'a Message, DecodeError> {
    messages
        .iter()
        .find(|m| m.address().contains(marker))
        .ok_or(DecodeError::MissingShape(marker))
}

/// The message whose address contains none of `markers` - by convention the
/// index message carrying the record's scalar fields.
pub(crate) fn message_without<'a>(
    messages: &'a [Message],
    markers: &[&str],
) -> Result<&'a Message, DecodeError> {
    messages
        .iter()
        .find(|m| markers.iter().all(|marker| !m.address().contains(marker)))
        .ok_or(DecodeError::MissingShape("index"))
}

pub(crate) fn ordinal_of(message: &Message) -> Result<f64, DecodeError> {
    message
        .ordinal()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or(DecodeError::Ordinal)
}

pub(crate) fn sub_ordinal_of(message: &Message) -> Result<f64, DecodeError> {
    message
        .sub_ordinal()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or(DecodeError::Ordinal)
}

pub(crate) fn identifier_of(message: &Message) -> Result<Uuid, DecodeError> {
    message.identifier().ok_or(DecodeError::Identifier)
}
