//! Cue records: four messages - index, fx, links, and actions replies.
//!
//! The owning cue list number rides in the address (`/get/cue/<list>/<cue>/…`)
//! and is kept as a field; cues synchronize as one flat collection ordered by
//! cue number.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Argument, DecodeError, Message};
use crate::record::{
    expect_message_count, identifier_of, message_with, message_without, ordinal_of, sub_ordinal_of,
    Record,
};
use crate::target::RecordTarget;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub list_number: f64,
    pub number: f64,
    pub identifier: Uuid,
    pub label: String,
    pub up_time_duration: i32,
    pub up_time_delay: i32,
    pub down_time_duration: i32,
    pub down_time_delay: i32,
    pub focus_time_duration: i32,
    pub focus_time_delay: i32,
    pub color_time_duration: i32,
    pub color_time_delay: i32,
    pub beam_time_duration: i32,
    pub beam_time_delay: i32,
    pub preheat: bool,
    pub curve: f64,
    pub rate: u32,
    /// `"m"`, `"M"` or empty.
    pub mark: String,
    /// `"b"`, `"B"` or empty.
    pub block: String,
    /// `"a"`, `"A"` or empty.
    pub assertion: String,
    /// Link target; empty when the cue links nowhere.
    pub link: String,
    pub follow_time: i32,
    pub hang_time: i32,
    pub all_fade: bool,
    pub loop_count: i32,
    pub solo: bool,
    pub timecode: String,
    pub part_count: u32,
    pub notes: String,
    pub scene: String,
    pub scene_end: bool,
    pub effects: Vec<f64>,
    pub links: Vec<f64>,
    pub actions: String,
}

/// Cross-list links arrive as a string, in-list links as an int where 0
/// means "no link".
fn link_label(argument: &Argument) -> Result<String, DecodeError> {
    match argument {
        Argument::Int(0) => Ok(String::new()),
        Argument::Int(v) => Ok(v.to_string()),
        Argument::String(s) => Ok(s.clone()),
        Argument::Double(_) => Err(DecodeError::WrongType {
            index: 19,
            expected: "int or string",
            actual: "double",
        }),
        Argument::Bool(_) => Err(DecodeError::WrongType {
            index: 19,
            expected: "int or string",
            actual: "bool",
        }),
    }
}

impl Record for Cue {
    const TARGET: RecordTarget = RecordTarget::Cue;
    const MESSAGE_COUNT: usize = 4;

    fn try_parse(messages: &[Message]) -> Result<Self, DecodeError> {
        expect_message_count(messages, Self::MESSAGE_COUNT)?;
        let index = message_without(messages, &["fx", "links", "actions"])?;
        let fx = message_with(messages, "fx")?;
        let links = message_with(messages, "links")?;
        let actions = message_with(messages, "actions")?;

        let args = index.args();
        let rate = args.int(15)?;
        let part_count = args.int(26)?;
        let link = link_label(args.raw(19)?)?;

        let actions_text = if actions.args().len() == 3 {
            actions.args().str(2)?.to_string()
        } else {
            String::new()
        };

        Ok(Self {
            list_number: ordinal_of(index)?,
            number: sub_ordinal_of(index)?,
            identifier: identifier_of(index)?,
            label: args.str(2)?.to_string(),
            up_time_duration: args.int(3)?,
            up_time_delay: args.int(4)?,
            down_time_duration: args.int(5)?,
            down_time_delay: args.int(6)?,
            focus_time_duration: args.int(7)?,
            focus_time_delay: args.int(8)?,
            color_time_duration: args.int(9)?,
            color_time_delay: args.int(10)?,
            beam_time_duration: args.int(11)?,
            beam_time_delay: args.int(12)?,
            preheat: args.bool(13)?,
            curve: args.number(14)?,
            rate: u32::try_from(rate).map_err(|_| DecodeError::WrongType {
                index: 15,
                expected: "non-negative int",
                actual: "int",
            })?,
            mark: args.str(16)?.to_string(),
            block: args.str(17)?.to_string(),
            assertion: args.str(18)?.to_string(),
            link,
            follow_time: args.int(20)?,
            hang_time: args.int(21)?,
            all_fade: args.bool(22)?,
            loop_count: args.int(23)?,
            solo: args.bool(24)?,
            timecode: args.str(25)?.to_string(),
            part_count: u32::try_from(part_count).map_err(|_| DecodeError::WrongType {
                index: 26,
                expected: "non-negative int",
                actual: "int",
            })?,
            notes: args.str(27)?.to_string(),
            scene: args.str(28)?.to_string(),
            scene_end: args.bool(29)?,
            effects: fx.args().tail_ordinals(2),
            links: links.args().tail_ordinals(2),
            actions: actions_text,
        })
    }

    fn ordinal(&self) -> f64 {
        self.number
    }

    fn identifier(&self) -> Uuid {
        self.identifier
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.label.is_empty() {
            write!(f, "Cue {}", self.number)
        } else {
            write!(f, "Cue {} - {}", self.number, self.label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_message(list: u32, number: f64, identifier: Uuid) -> Message {
        let mut arguments: Vec<Argument> = vec![
            Argument::Int(0),
            identifier.to_string().into(),
            "Blackout".into(),
        ];
        // ten timing fields
        arguments.extend((0..10).map(|_| Argument::Int(3000)));
        arguments.push(Argument::Bool(false)); // preheat
        arguments.push(Argument::Int(901)); // curve
        arguments.push(Argument::Int(100)); // rate
        arguments.push("m".into());
        arguments.push("".into());
        arguments.push("".into());
        arguments.push(Argument::Int(0)); // link
        arguments.push(Argument::Int(0)); // follow
        arguments.push(Argument::Int(0)); // hang
        arguments.push(Argument::Bool(false)); // all fade
        arguments.push(Argument::Int(0)); // loop
        arguments.push(Argument::Bool(false)); // solo
        arguments.push("".into()); // timecode
        arguments.push(Argument::Int(0)); // part count
        arguments.push("".into()); // notes
        arguments.push("".into()); // scene
        arguments.push(Argument::Bool(false)); // scene end
        Message::new(
            format!("/get/cue/{list}/{}/list/0/30", crate::message::format_ordinal(number)),
            arguments,
        )
    }

    fn companion(list: u32, number: f64, identifier: Uuid, kind: &str) -> Message {
        Message::new(
            format!(
                "/get/cue/{list}/{}/{kind}/list/0/2",
                crate::message::format_ordinal(number)
            ),
            vec![Argument::Int(0), identifier.to_string().into()],
        )
    }

    #[test]
    fn parses_all_four_messages_in_any_order() {
        let identifier = Uuid::new_v4();
        let messages = vec![
            companion(1, 5.5, identifier, "actions"),
            companion(1, 5.5, identifier, "fx"),
            index_message(1, 5.5, identifier),
            companion(1, 5.5, identifier, "links"),
        ];
        let cue = Cue::try_parse(&messages).unwrap();
        assert_eq!(cue.list_number, 1.0);
        assert_eq!(cue.number, 5.5);
        assert_eq!(cue.identifier, identifier);
        assert_eq!(cue.label, "Blackout");
        assert_eq!(cue.mark, "m");
        assert_eq!(cue.link, "");
        assert_eq!(cue.part_count, 0);
    }

    #[test]
    fn rejects_incomplete_sets() {
        let identifier = Uuid::new_v4();
        let messages = vec![
            index_message(1, 5.0, identifier),
            companion(1, 5.0, identifier, "fx"),
        ];
        assert_eq!(
            Cue::try_parse(&messages),
            Err(DecodeError::MessageCount {
                expected: 4,
                actual: 2
            })
        );
    }
}
