//! Macro records: index reply plus the command text reply.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Argument, DecodeError, Message};
use crate::record::{
    expect_message_count, identifier_of, message_with, message_without, ordinal_of, Record,
};
use crate::target::RecordTarget;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macro {
    pub number: f64,
    pub identifier: Uuid,
    pub label: String,
    pub mode: String,
    /// Command-line text; long macros arrive split across arguments.
    pub text: String,
}

impl Record for Macro {
    const TARGET: RecordTarget = RecordTarget::Macro;
    const MESSAGE_COUNT: usize = 2;

    fn try_parse(messages: &[Message]) -> Result<Self, DecodeError> {
        expect_message_count(messages, Self::MESSAGE_COUNT)?;
        let index = message_without(messages, &["text"])?;
        let text = message_with(messages, "text")?;

        let fragments: Vec<&str> = text
            .arguments()
            .iter()
            .skip(2)
            .filter_map(|a| match a {
                Argument::String(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();

        Ok(Self {
            number: ordinal_of(index)?,
            identifier: identifier_of(index)?,
            label: index.args().str(2)?.to_string(),
            mode: index.args().str(3)?.to_string(),
            text: fragments.concat(),
        })
    }

    fn ordinal(&self) -> f64 {
        self.number
    }

    fn identifier(&self) -> Uuid {
        self.identifier
    }
}
