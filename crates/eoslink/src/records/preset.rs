//! Preset records: index reply plus channels, byType, and fx replies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{DecodeError, Message};
use crate::record::{
    expect_message_count, identifier_of, message_with, message_without, ordinal_of, Record,
};
use crate::target::RecordTarget;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub number: f64,
    pub identifier: Uuid,
    pub label: String,
    pub absolute: bool,
    pub locked: bool,
    pub channels: Vec<f64>,
    pub by_type_channels: Vec<f64>,
    pub effects: Vec<f64>,
}

impl Record for Preset {
    const TARGET: RecordTarget = RecordTarget::Preset;
    const MESSAGE_COUNT: usize = 4;

    fn try_parse(messages: &[Message]) -> Result<Self, DecodeError> {
        expect_message_count(messages, Self::MESSAGE_COUNT)?;
        let index = message_without(messages, &["channels", "byType", "fx"])?;
        let channels = message_with(messages, "channels")?;
        let by_type = message_with(messages, "byType")?;
        let fx = message_with(messages, "fx")?;

        let args = index.args();
        let mut channel_list = channels.args().tail_ordinals(2);
        channel_list.sort_by(f64::total_cmp);
        let mut by_type_list = by_type.args().tail_ordinals(2);
        by_type_list.sort_by(f64::total_cmp);

        Ok(Self {
            number: ordinal_of(index)?,
            identifier: identifier_of(index)?,
            label: args.str(2)?.to_string(),
            absolute: args.bool(3)?,
            locked: args.bool(4)?,
            channels: channel_list,
            by_type_channels: by_type_list,
            effects: fx.args().tail_ordinals(2),
        })
    }

    fn ordinal(&self) -> f64 {
        self.number
    }

    fn identifier(&self) -> Uuid {
        self.identifier
    }
}
