//! Patch records: a channel assembled from a variable number of parts.
//!
//! A channel has no fixed message count of its own. Each part is a fixed
//! two-message set - the patch list reply carrying the part's fields plus its
//! notes reply - and the list reply additionally declares how many parts the
//! whole channel has (argument 19). The patch manager materializes the
//! channel once that many complete parts have accumulated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{DecodeError, Message};
use crate::record::{
    expect_message_count, identifier_of, message_with, message_without, sub_ordinal_of,
};

/// Argument index of the declared part count in a patch list reply.
pub(crate) const PART_COUNT_INDEX: usize = 19;

/// One patched part of a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPart {
    /// Part ordinal within the channel.
    pub number: f64,
    pub identifier: Uuid,
    pub label: String,
    pub fixture_manufacturer: String,
    pub fixture_model: String,
    pub address: i32,
    pub intensity_address: i32,
    pub current_level: i32,
    pub gel: String,
    /// The ten user text slots.
    pub text: Vec<String>,
    /// Part count the console declared for the owning channel.
    pub part_count: u32,
    pub notes: String,
}

impl ChannelPart {
    /// Messages required for one complete part: the list reply and its notes.
    pub const MESSAGE_COUNT: usize = 2;

    pub fn try_parse(messages: &[Message]) -> Result<Self, DecodeError> {
        expect_message_count(messages, Self::MESSAGE_COUNT)?;
        let list = message_without(messages, &["notes"])?;
        let notes = message_with(messages, "notes")?;

        let args = list.args();
        let part_count = args.int(PART_COUNT_INDEX)?;
        let text = (9..19)
            .map(|i| args.str(i).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        let notes_text = if notes.args().len() >= 3 {
            notes.args().str(2)?.to_string()
        } else {
            String::new()
        };

        Ok(Self {
            number: sub_ordinal_of(list)?,
            identifier: identifier_of(list)?,
            label: args.str(2)?.to_string(),
            fixture_manufacturer: args.str(3)?.to_string(),
            fixture_model: args.str(4)?.to_string(),
            address: args.int(5)?,
            intensity_address: args.int(6)?,
            current_level: args.int(7)?,
            gel: args.str(8)?.to_string(),
            text,
            part_count: u32::try_from(part_count).map_err(|_| DecodeError::WrongType {
                index: PART_COUNT_INDEX,
                expected: "non-negative int",
                actual: "int",
            })?,
            notes: notes_text,
        })
    }
}

/// A patched channel: its console number plus all parts, ascending by part
/// ordinal. Channels have no identifier of their own; the number is the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub number: f64,
    pub parts: Vec<ChannelPart>,
}

impl Channel {
    pub fn new(number: f64, mut parts: Vec<ChannelPart>) -> Self {
        parts.sort_by(|a, b| a.number.total_cmp(&b.number));
        Self { number, parts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Argument;

    fn list_message(channel: u32, part: u32, identifier: Uuid, part_count: i32) -> Message {
        let mut arguments: Vec<Argument> = vec![
            Argument::Int(0),
            identifier.to_string().into(),
            "Mover".into(),
            "High End".into(),
            "SolaFrame".into(),
            Argument::Int(101),
            Argument::Int(101),
            Argument::Int(0),
            "R80".into(),
        ];
        arguments.extend((1..=10).map(|i| Argument::String(format!("text{i}"))));
        arguments.push(Argument::Int(part_count));
        Message::new(format!("/get/patch/{channel}/{part}/list/0/20"), arguments)
    }

    fn notes_message(channel: u32, part: u32, identifier: Uuid, notes: &str) -> Message {
        Message::new(
            format!("/get/patch/{channel}/{part}/notes"),
            vec![Argument::Int(0), identifier.to_string().into(), notes.into()],
        )
    }

    #[test]
    fn part_parses_list_plus_notes() {
        let identifier = Uuid::new_v4();
        let part = ChannelPart::try_parse(&[
            notes_message(7, 2, identifier, "recently relamped"),
            list_message(7, 2, identifier, 3),
        ])
        .unwrap();
        assert_eq!(part.number, 2.0);
        assert_eq!(part.part_count, 3);
        assert_eq!(part.fixture_model, "SolaFrame");
        assert_eq!(part.text.len(), 10);
        assert_eq!(part.notes, "recently relamped");
    }

    #[test]
    fn channel_sorts_parts_ascending() {
        let identifier = Uuid::new_v4();
        let parts: Vec<ChannelPart> = [2, 0, 1]
            .iter()
            .map(|part| {
                ChannelPart::try_parse(&[
                    list_message(7, *part, identifier, 3),
                    notes_message(7, *part, identifier, ""),
                ])
                .unwrap()
            })
            .collect();
        let channel = Channel::new(7.0, parts);
        let numbers: Vec<f64> = channel.parts.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![0.0, 1.0, 2.0]);
    }
}
