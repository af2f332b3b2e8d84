//! Single-message record shapes, plus the two-message pixel map.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{DecodeError, Message};
use crate::record::{
    expect_message_count, identifier_of, message_with, message_without, ordinal_of, Record,
};
use crate::target::RecordTarget;

macro_rules! labeled_record {
    ($(#[$meta:meta])* $name:ident, $target:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub number: f64,
            pub identifier: Uuid,
            pub label: String,
        }

        impl Record for $name {
            const TARGET: RecordTarget = $target;
            const MESSAGE_COUNT: usize = 1;

            fn try_parse(messages: &[Message]) -> Result<Self, DecodeError> {
                expect_message_count(messages, Self::MESSAGE_COUNT)?;
                let index = &messages[0];
                Ok(Self {
                    number: ordinal_of(index)?,
                    identifier: identifier_of(index)?,
                    label: index.args().str(2)?.to_string(),
                })
            }

            fn ordinal(&self) -> f64 {
                self.number
            }

            fn identifier(&self) -> Uuid {
                self.identifier
            }
        }
    };
}

labeled_record!(Curve, RecordTarget::Curve);
labeled_record!(Snapshot, RecordTarget::Snapshot);
labeled_record!(MagicSheet, RecordTarget::MagicSheet);

/// Effects carry their shape and timing in the index reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub number: f64,
    pub identifier: Uuid,
    pub label: String,
    pub kind: String,
    pub entry: String,
    pub exit: String,
    /// Cycle duration in milliseconds.
    pub duration: i32,
    pub scale: i32,
}

impl Record for Effect {
    const TARGET: RecordTarget = RecordTarget::Effect;
    const MESSAGE_COUNT: usize = 1;

    fn try_parse(messages: &[Message]) -> Result<Self, DecodeError> {
        expect_message_count(messages, Self::MESSAGE_COUNT)?;
        let index = &messages[0];
        let args = index.args();
        Ok(Self {
            number: ordinal_of(index)?,
            identifier: identifier_of(index)?,
            label: args.str(2)?.to_string(),
            kind: args.str(3)?.to_string(),
            entry: args.str(4)?.to_string(),
            exit: args.str(5)?.to_string(),
            duration: args.int(6)?,
            scale: args.int(7)?,
        })
    }

    fn ordinal(&self) -> f64 {
        self.number
    }

    fn identifier(&self) -> Uuid {
        self.identifier
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelMap {
    pub number: f64,
    pub identifier: Uuid,
    pub label: String,
    pub server_channel: i32,
    pub interface: String,
    pub width: i32,
    pub height: i32,
    pub pixel_count: i32,
    pub fixture_count: i32,
    pub channels: Vec<f64>,
}

impl Record for PixelMap {
    const TARGET: RecordTarget = RecordTarget::PixelMap;
    const MESSAGE_COUNT: usize = 2;

    fn try_parse(messages: &[Message]) -> Result<Self, DecodeError> {
        expect_message_count(messages, Self::MESSAGE_COUNT)?;
        let index = message_without(messages, &["channels"])?;
        let channels = message_with(messages, "channels")?;

        let args = index.args();
        Ok(Self {
            number: ordinal_of(index)?,
            identifier: identifier_of(index)?,
            label: args.str(2)?.to_string(),
            server_channel: args.int(3)?,
            interface: args.str(4)?.to_string(),
            width: args.int(5)?,
            height: args.int(6)?,
            pixel_count: args.int(7)?,
            fixture_count: args.int(8)?,
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
