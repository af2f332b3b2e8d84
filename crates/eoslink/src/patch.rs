//! Patch synchronization: channels assembled from a variable number of parts.
//!
//! Same count/fan-out/notify skeleton as the generic manager, but an index
//! reply is first grouped by its channel ordinal. The first reply seen for a
//! new channel must be a patch list reply, which declares the channel's total
//! part count; each part then accumulates its own fixed two-message set (the
//! notes reply joins its part by sub-ordinal). The channel materializes only
//! once the number of complete parts equals the declared count.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use crate::manager::Outbox;
use crate::message::Message;
use crate::records::channel::PART_COUNT_INDEX;
use crate::records::{Channel, ChannelPart};
use crate::target::{classify, pattern_matches, RecordTarget, RoutingRole};

struct Assembly {
    /// Part count declared by the channel's first patch list reply.
    declared: u32,
    /// Per-part message sets, in arrival order of their first message.
    parts: Vec<Vec<Message>>,
}

pub(crate) struct PatchManager {
    routes: Vec<(&'static str, RoutingRole)>,
    /// In-flight channels keyed by channel ordinal.
    buffer: HashMap<String, Assembly>,
    records: Vec<Channel>,
    expected: Option<u64>,
    produced: u64,
    publish: Arc<watch::Sender<Vec<Channel>>>,
}

impl PatchManager {
    pub(crate) fn new(publish: Arc<watch::Sender<Vec<Channel>>>) -> Self {
        Self {
            routes: Vec::new(),
            buffer: HashMap::new(),
            records: Vec::new(),
            expected: None,
            produced: 0,
            publish,
        }
    }

    pub(crate) fn synchronize(&mut self, out: &mut Outbox) {
        if self.routes.is_empty() {
            self.routes = RecordTarget::Patch
                .filters()
                .iter()
                .map(|pattern| (*pattern, classify(pattern)))
                .collect();
        }
        self.buffer.clear();
        self.records.clear();
        self.expected = None;
        self.produced = 0;
        self.publish();
        out.send(Message::get_count(RecordTarget::Patch));
    }

    pub(crate) fn claims(&self, address: &str) -> bool {
        self.routes
            .iter()
            .any(|(pattern, _)| pattern_matches(pattern, address))
    }

    pub(crate) fn take(&mut self, message: &Message, out: &mut Outbox) {
        let role = self
            .routes
            .iter()
            .find(|(pattern, _)| pattern_matches(pattern, message.address()))
            .map(|(_, role)| *role);
        match role {
            Some(RoutingRole::Count) => self.count(message, out),
            // The patch has no per-record identifier request path, so a
            // change notification triggers a full resynchronization.
            Some(RoutingRole::Notify) => self.synchronize(out),
            Some(RoutingRole::Index) => self.index(message),
            None => {}
        }
    }

    pub(crate) fn discard_in_flight(&mut self) {
        self.buffer.clear();
    }

    pub(crate) fn fraction(&self) -> f64 {
        match self.expected {
            None => 0.0,
            Some(0) => 1.0,
            Some(expected) => self.produced.min(expected) as f64 / expected as f64,
        }
    }

    pub(crate) fn records(&self) -> &[Channel] {
        &self.records
    }

    fn publish(&self) {
        self.publish.send_replace(self.records.clone());
    }

    fn count(&mut self, message: &Message, out: &mut Outbox) {
        let Ok(count) = message.args().int(0) else {
            return;
        };
        if count <= 0 {
            self.expected = Some(0);
            return;
        }
        self.expected = Some(count as u64);
        for index in 0..count {
            out.send(Message::get_index(RecordTarget::Patch, index));
        }
    }

    fn index(&mut self, message: &Message) {
        let Some(ordinal) = message.ordinal().map(str::to_string) else {
            return;
        };
        let Some(sub_ordinal) = message.sub_ordinal().map(str::to_string) else {
            return;
        };

        if self.buffer.contains_key(&ordinal) {
            let Some(assembly) = self.buffer.get_mut(&ordinal) else {
                return;
            };
            let existing = assembly
                .parts
                .iter_mut()
                .find(|part| part.iter().any(|m| m.sub_ordinal() == Some(sub_ordinal.as_str())));
            match existing {
                // Second message for a part already underway (list or notes,
                // whichever arrived later).
                Some(part) => part.push(message.clone()),
                None => assembly.parts.push(vec![message.clone()]),
            }
        } else {
            // First reply for a new channel: only the patch list reply
            // carries the declared part count; a stray notes reply cannot
            // open an assembly.
            if message.address().ends_with("notes") {
                return;
            }
            let Ok(declared) = message.args().int(PART_COUNT_INDEX) else {
                return;
            };
            let Ok(declared) = u32::try_from(declared) else {
                return;
            };
            self.buffer.insert(
                ordinal.clone(),
                Assembly {
                    declared,
                    parts: vec![vec![message.clone()]],
                },
            );
        }

        self.try_materialize(&ordinal);
    }

    fn try_materialize(&mut self, ordinal: &str) {
        let complete = match self.buffer.get(ordinal) {
            Some(assembly) => {
                assembly.parts.len() as u32 == assembly.declared
                    && assembly
                        .parts
                        .iter()
                        .all(|part| part.len() == ChannelPart::MESSAGE_COUNT)
            }
            None => false,
        };
        if !complete {
            return;
        }
        let Some(assembly) = self.buffer.remove(ordinal) else {
            return;
        };

        let mut parts = Vec::with_capacity(assembly.parts.len());
        for set in &assembly.parts {
            match ChannelPart::try_parse(set) {
                Ok(part) => parts.push(part),
                Err(error) => {
                    trace!(%error, channel = ordinal, "dropping unparseable channel part set");
                    return;
                }
            }
        }
        let Some(number) = set_number(ordinal) else {
            return;
        };
        let channel = Channel::new(number, parts);

        self.produced += 1;
        if let Some(position) = self.records.iter().position(|c| c.number == channel.number) {
            self.records.remove(position);
        }
        let position = self
            .records
            .partition_point(|c| c.number < channel.number);
        self.records.insert(position, channel);
        self.publish();
    }
}

fn set_number(ordinal: &str) -> Option<f64> {
    ordinal.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Argument;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn manager() -> (PatchManager, watch::Receiver<Vec<Channel>>) {
        let (tx, rx) = watch::channel(Vec::new());
        let mut manager = PatchManager::new(Arc::new(tx));
        let mut out = Outbox::default();
        manager.synchronize(&mut out);
        (manager, rx)
    }

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

    fn notes_message(channel: u32, part: u32, identifier: Uuid) -> Message {
        Message::new(
            format!("/get/patch/{channel}/{part}/notes"),
            vec![Argument::Int(0), identifier.to_string().into(), "".into()],
        )
    }

    #[test]
    fn channel_materializes_only_when_all_declared_parts_complete() {
        let (mut manager, rx) = manager();
        let mut out = Outbox::default();
        manager.take(
            &Message::new("/get/patch/count", vec![Argument::Int(1)]),
            &mut out,
        );

        // Parts arrive for sub-ordinals 2, 0, 1, each list + notes.
        let identifiers = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        for (identifier, part) in identifiers.iter().zip([2u32, 0, 1]) {
            manager.take(&list_message(7, part, *identifier, 3), &mut out);
            if part != 1 {
                manager.take(&notes_message(7, part, *identifier), &mut out);
            }
        }
        assert!(rx.borrow().is_empty());
        manager.take(&notes_message(7, 1, identifiers[2]), &mut out);

        let snapshot = rx.borrow();
        assert_eq!(snapshot.len(), 1);
        let channel = &snapshot[0];
        assert_eq!(channel.number, 7.0);
        let parts: Vec<f64> = channel.parts.iter().map(|p| p.number).collect();
        assert_eq!(parts, vec![0.0, 1.0, 2.0]);
        assert_eq!(manager.fraction(), 1.0);
    }

    #[test]
    fn notes_ahead_of_its_list_reply_still_completes() {
        let (mut manager, rx) = manager();
        let mut out = Outbox::default();
        manager.take(
            &Message::new("/get/patch/count", vec![Argument::Int(1)]),
            &mut out,
        );

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        manager.take(&list_message(3, 0, first, 2), &mut out);
        // Part 1's notes overtake its list reply.
        manager.take(&notes_message(3, 1, second), &mut out);
        manager.take(&notes_message(3, 0, first), &mut out);
        assert!(rx.borrow().is_empty());
        manager.take(&list_message(3, 1, second, 2), &mut out);

        assert_eq!(rx.borrow().len(), 1);
        assert_eq!(rx.borrow()[0].parts.len(), 2);
    }

    #[test]
    fn stray_notes_cannot_open_an_assembly() {
        let (mut manager, rx) = manager();
        let mut out = Outbox::default();
        manager.take(&notes_message(9, 0, Uuid::new_v4()), &mut out);
        assert!(rx.borrow().is_empty());

        // A proper list reply afterwards starts the channel from scratch.
        let identifier = Uuid::new_v4();
        manager.take(&list_message(9, 0, identifier, 1), &mut out);
        manager.take(&notes_message(9, 0, identifier), &mut out);
        assert_eq!(rx.borrow().len(), 1);
    }

    #[test]
    fn patch_notify_restarts_the_full_resync() {
        let (mut manager, _rx) = manager();
        let mut out = Outbox::default();
        let notify = Message::new("/notify/patch/list/0/2", vec![Argument::Int(0), Argument::Int(7)]);
        manager.take(&notify, &mut out);
        let addresses: Vec<String> = out
            .into_messages()
            .into_iter()
            .map(|m| m.address().to_string())
            .collect();
        assert_eq!(addresses, vec!["/eos/get/patch/count"]);
    }
}
