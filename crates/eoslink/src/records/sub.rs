//! Submaster records: index reply plus an fx reply.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{DecodeError, Message};
use crate::record::{
    expect_message_count, identifier_of, message_with, message_without, ordinal_of, Record,
};
use crate::target::RecordTarget;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sub {
    pub number: f64,
    pub identifier: Uuid,
    pub label: String,
    pub mode: String,
    pub fader_mode: String,
    pub htp: bool,
    pub exclusive: bool,
    pub background: bool,
    pub restore: bool,
    /// Effect ordinals, ascending.
    pub effects: Vec<f64>,
}

impl Record for Sub {
    const TARGET: RecordTarget = RecordTarget::Sub;
    const MESSAGE_COUNT: usize = 2;

    fn try_parse(messages: &[Message]) -> Result<Self, DecodeError> {
        expect_message_count(messages, Self::MESSAGE_COUNT)?;
        let index = message_without(messages, &["fx"])?;
        let fx = message_with(messages, "fx")?;

        let args = index.args();
        let mut effects = fx.args().tail_ordinals(2);
        effects.sort_by(f64::total_cmp);

        Ok(Self {
            number: ordinal_of(index)?,
            identifier: identifier_of(index)?,
            label: args.str(2)?.to_string(),
            mode: args.str(3)?.to_string(),
            fader_mode: args.str(4)?.to_string(),
            htp: args.bool(5)?,
            exclusive: args.bool(6)?,
            background: args.bool(7)?,
            restore: args.bool(8)?,
            effects,
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
    fn parses_flags_and_sorts_effects() {
        let identifier = Uuid::new_v4();
        let index = Message::new(
            "/get/sub/2/list/0/9",
            vec![
                Argument::Int(0),
                identifier.to_string().into(),
                "Rain".into(),
                "Additive".into(),
                "Proportional".into(),
                Argument::Bool(true),
                Argument::Bool(false),
                Argument::Bool(false),
                Argument::Bool(true),
            ],
        );
        let fx = Message::new(
            "/get/sub/2/fx/list/0/4",
            vec![
                Argument::Int(0),
                identifier.to_string().into(),
                Argument::Int(7),
                Argument::Int(3),
            ],
        );
        let sub = Sub::try_parse(&[fx, index]).unwrap();
        assert_eq!(sub.label, "Rain");
        assert!(sub.htp);
        assert!(sub.restore);
        assert_eq!(sub.effects, vec![3.0, 7.0]);
    }
}
