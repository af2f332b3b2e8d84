//! Group records: index reply plus a channels reply.
//!
//! A group is a shortcut placing a collection of channels onto the command
//! line in a specific order; it is only loosely coupled to the patch and
//! receives no notification when the patch changes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{DecodeError, Message};
use crate::record::{
    expect_message_count, identifier_of, message_with, message_without, ordinal_of, Record,
};
use crate::target::RecordTarget;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub number: f64,
    pub identifier: Uuid,
    pub label: String,
    /// Channel ordinals in the group's command-line order.
    pub channels: Vec<f64>,
}

impl Record for Group {
    const TARGET: RecordTarget = RecordTarget::Group;
    const MESSAGE_COUNT: usize = 2;

    fn try_parse(messages: &[Message]) -> Result<Self, DecodeError> {
        expect_message_count(messages, Self::MESSAGE_COUNT)?;
        let index = message_without(messages, &["channels"])?;
        let channels = message_with(messages, "channels")?;

        Ok(Self {
            number: ordinal_of(index)?,
            identifier: identifier_of(index)?,
            label: index.args().str(2)?.to_string(),
            channels: channels.args().tail_ordinals(2),
        })
    }

    fn ordinal(&self) -> f64 {
        self.number
    }

    fn identifier(&self) -> Uuid {
        self.identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Argument;

    #[test]
    fn parses_and_preserves_channel_order() {
        let identifier = Uuid::new_v4();
        let index = Message::new(
            "/get/group/3/list/0/3",
            vec![Argument::Int(0), identifier.to_string().into(), "Ambers".into()],
        );
        let channels = Message::new(
            "/get/group/3/channels/list/0/4",
            vec![
                Argument::Int(0),
                identifier.to_string().into(),
                Argument::Int(12),
                "1-3".into(),
            ],
        );
        let group = Group::try_parse(&[index, channels]).unwrap();
        assert_eq!(group.number, 3.0);
        assert_eq!(group.label, "Ambers");
        assert_eq!(group.channels, vec![12.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_channels_message_is_valid() {
        let identifier = Uuid::new_v4();
        let index = Message::new(
            "/get/group/4/list/0/3",
            vec![Argument::Int(0), identifier.to_string().into(), "".into()],
        );
        let channels = Message::new(
            "/get/group/4/channels/list/0/2",
            vec![Argument::Int(0), identifier.to_string().into()],
        );
        let group = Group::try_parse(&[index, channels]).unwrap();
        assert!(group.channels.is_empty());
    }
}
