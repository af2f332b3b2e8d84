//! Cue list records: two messages, the index reply plus a links reply.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{DecodeError, Message};
use crate::record::{
    expect_message_count, identifier_of, message_with, message_without, ordinal_of, Record,
};
use crate::target::RecordTarget;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueList {
    pub number: f64,
    pub identifier: Uuid,
    pub label: String,
    pub playback_mode: String,
    pub fader_mode: String,
    pub independent: bool,
    pub htp: bool,
    pub assertion: bool,
    pub block: bool,
    pub background: bool,
    pub solo_mode: bool,
    /// Timecode list number; `None` when the console reports 0 (unassigned).
    pub timecode_list: Option<u32>,
    pub oos_sync: bool,
    /// Linked cue list numbers, ascending.
    pub links: Vec<f64>,
}

impl Record for CueList {
    const TARGET: RecordTarget = RecordTarget::CueList;
    const MESSAGE_COUNT: usize = 2;

    fn try_parse(messages: &[Message]) -> Result<Self, DecodeError> {
        expect_message_count(messages, Self::MESSAGE_COUNT)?;
        let index = message_without(messages, &["links"])?;
        let links = message_with(messages, "links")?;

        let args = index.args();
        let timecode = args.int(11)?;
        let mut linked: Vec<f64> = links.args().tail_ordinals(2);
        linked.sort_by(f64::total_cmp);

        Ok(Self {
            number: ordinal_of(index)?,
            identifier: identifier_of(index)?,
            label: args.str(2)?.to_string(),
            playback_mode: args.str(3)?.to_string(),
            fader_mode: args.str(4)?.to_string(),
            independent: args.bool(5)?,
            htp: args.bool(6)?,
            assertion: args.bool(7)?,
            block: args.bool(8)?,
            background: args.bool(9)?,
            solo_mode: args.bool(10)?,
            timecode_list: u32::try_from(timecode).ok().filter(|v| *v != 0),
            oos_sync: args.bool(12)?,
            links: linked,
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

    fn index_message(number: u32, identifier: Uuid, label: &str) -> Message {
        Message::new(
            format!("/get/cuelist/{number}/list/0/13"),
            vec![
                Argument::Int(0),
                identifier.to_string().into(),
                label.into(),
                "Master".into(),
                "Proportional".into(),
                Argument::Bool(false),
                Argument::Bool(true),
                Argument::Bool(false),
                Argument::Bool(false),
                Argument::Bool(true),
                Argument::Bool(false),
                Argument::Int(2),
                Argument::Bool(true),
            ],
        )
    }

    #[test]
    fn parses_from_index_and_links() {
        let identifier = Uuid::new_v4();
        let links = Message::new(
            "/get/cuelist/1/links/list/0/3",
            vec![Argument::Int(0), identifier.to_string().into(), "3-4".into()],
        );
        let list =
            CueList::try_parse(&[links, index_message(1, identifier, "Act One")]).unwrap();

        assert_eq!(list.number, 1.0);
        assert_eq!(list.identifier, identifier);
        assert_eq!(list.label, "Act One");
        assert_eq!(list.timecode_list, Some(2));
        assert_eq!(list.links, vec![3.0, 4.0]);
    }

    #[test]
    fn rejects_wrong_message_count() {
        let identifier = Uuid::new_v4();
        let result = CueList::try_parse(&[index_message(1, identifier, "Act One")]);
        assert_eq!(
            result,
            Err(DecodeError::MessageCount {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn record_embeds_address_ordinal_and_identifier() {
        let identifier = Uuid::new_v4();
        let links = Message::new(
            "/get/cuelist/7/links/list/0/2",
            vec![Argument::Int(0), identifier.to_string().into()],
        );
        let list =
            CueList::try_parse(&[index_message(7, identifier, "")]).err();
        assert!(list.is_some()); // single message still refused

        let parsed = CueList::try_parse(&[index_message(7, identifier, ""), links]).unwrap();
        assert_eq!(parsed.ordinal(), 7.0);
        assert_eq!(parsed.identifier(), identifier);
        assert!(parsed.links.is_empty());
    }
}
