//! Generic target synchronization.
//!
//! One `TargetManager` runs the synchronization protocol for one record
//! type: a full resync is count → fan-out fetch by index → per-identifier
//! reassembly → ordered merge, and afterwards server notify messages drive
//! per-record delta refreshes. The manager owns its collection outright and
//! publishes read-only snapshots through a watch channel after every change.
//!
//! All requests are fire-and-forget; "waiting" for a reply is nothing more
//! than an entry in the reassembly buffer. Replies that arrive after the
//! buffer was discarded (resync, disconnect) match no live entry and fall
//! out naturally.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;
use uuid::Uuid;

use crate::message::{format_ordinal, ordinals, Message};
use crate::record::Record;
use crate::target::{classify, pattern_matches, RoutingRole};

/// Requests queued while handling one inbound event, sent by the session
/// afterwards in order.
#[derive(Debug, Default)]
pub(crate) struct Outbox {
    messages: Vec<Message>,
}

impl Outbox {
    pub(crate) fn send(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

pub(crate) struct TargetManager<T: Record> {
    /// Filter patterns with their protocol role; built on first synchronize.
    routes: Vec<(&'static str, RoutingRole)>,
    /// In-flight message sets keyed by record identifier.
    buffer: HashMap<Uuid, Vec<Message>>,
    records: Vec<T>,
    /// Record count announced by the console; `None` until the count reply.
    expected: Option<u64>,
    produced: u64,
    publish: Arc<watch::Sender<Vec<T>>>,
}

impl<T: Record> TargetManager<T> {
    pub(crate) fn new(publish: Arc<watch::Sender<Vec<T>>>) -> Self {
        Self {
            routes: Vec::new(),
            buffer: HashMap::new(),
            records: Vec::new(),
            expected: None,
            produced: 0,
            publish,
        }
    }

    /// Start (or restart) a full resynchronization. Idempotent: any in-flight
    /// partial state is discarded and the collection cleared before the count
    /// request goes out.
    pub(crate) fn synchronize(&mut self, out: &mut Outbox) {
        if self.routes.is_empty() {
            self.routes = T::TARGET
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
        out.send(Message::get_count(T::TARGET));
    }

    /// Whether this manager's routing table claims a relative reply address.
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
            Some(RoutingRole::Notify) => self.notify(message, out),
            Some(RoutingRole::Index) => self.index(message),
            None => {}
        }
    }

    /// Drop all in-flight reassembly state, keeping the collection. Used on
    /// disconnect; late replies then match nothing and are ignored.
    pub(crate) fn discard_in_flight(&mut self) {
        self.buffer.clear();
    }

    /// `(produced, expected)` progress. 0/1 until the count reply arrives; an
    /// empty collection is a final, valid state.
    pub(crate) fn fraction(&self) -> f64 {
        match self.expected {
            None => 0.0,
            Some(0) => 1.0,
            Some(expected) => self.produced.min(expected) as f64 / expected as f64,
        }
    }

    pub(crate) fn records(&self) -> &[T] {
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
            out.send(Message::get_index(T::TARGET, index));
        }
    }

    fn index(&mut self, message: &Message) {
        let Some(ordinal) = message.ordinal() else {
            return;
        };
        if ordinal == "0" {
            // The console's answer to a get for an identifier that no longer
            // exists: remove our copy.
            if let Some(identifier) = message.identifier() {
                self.buffer.remove(&identifier);
                if let Some(position) =
                    self.records.iter().position(|r| r.identifier() == identifier)
                {
                    self.records.remove(position);
                    self.publish();
                }
            }
        } else if message.args().is_empty() {
            // Stale get by ordinal; only reachable when a record vanished
            // between a notify and our request.
            if let Ok(number) = ordinal.parse::<f64>() {
                if let Some(position) = self.records.iter().position(|r| r.ordinal() == number) {
                    let removed = self.records.remove(position);
                    self.buffer.remove(&removed.identifier());
                    self.publish();
                }
            }
        } else {
            let Some(identifier) = message.identifier() else {
                return;
            };
            let set = self.buffer.entry(identifier).or_default();
            // A mismatched ordinal means the set belongs to a superseded
            // fetch; restart from this message.
            if set.first().is_some_and(|m| m.ordinal() != Some(ordinal)) {
                set.clear();
            }
            set.push(message.clone());
            if self.buffer.get(&identifier).map(Vec::len) == Some(T::MESSAGE_COUNT) {
                if let Some(set) = self.buffer.remove(&identifier) {
                    match T::try_parse(&set) {
                        Ok(record) => self.merge(record),
                        Err(error) => {
                            trace!(target_kind = %T::TARGET, %error, "dropping unparseable record set");
                        }
                    }
                }
            }
        }
    }

    fn merge(&mut self, record: T) {
        self.produced += 1;
        if let Some(position) = self
            .records
            .iter()
            .position(|r| r.identifier() == record.identifier())
        {
            // The ordinal may have changed; re-insert at the sorted position.
            self.records.remove(position);
        }
        let position = self
            .records
            .partition_point(|r| r.ordinal() < record.ordinal());
        self.records.insert(position, record);
        self.publish();
    }

    fn notify(&mut self, message: &Message, out: &mut Outbox) {
        let mut changed: Vec<f64> = message
            .arguments()
            .iter()
            .skip(1)
            .flat_map(ordinals)
            .collect();
        changed.sort_by(f64::total_cmp);
        changed.dedup();
        for number in changed {
            // A known record is fetched by identifier: ordinals can be
            // reassigned under us, identifiers cannot.
            match self.records.iter().find(|r| r.ordinal() == number) {
                Some(record) => out.send(Message::get_identifier(T::TARGET, record.identifier())),
                None => out.send(Message::get_ordinal(T::TARGET, &format_ordinal(number))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Argument;
    use crate::records::Group;
    use pretty_assertions::assert_eq;

    fn manager() -> (TargetManager<Group>, watch::Receiver<Vec<Group>>) {
        let (tx, rx) = watch::channel(Vec::new());
        (TargetManager::new(Arc::new(tx)), rx)
    }

    fn count_reply(count: i32) -> Message {
        Message::new("/get/group/count", vec![Argument::Int(count)])
    }

    fn group_messages(number: u32, identifier: Uuid, label: &str) -> [Message; 2] {
        [
            Message::new(
                format!("/get/group/{number}/list/0/3"),
                vec![Argument::Int(0), identifier.to_string().into(), label.into()],
            ),
            Message::new(
                format!("/get/group/{number}/channels/list/0/2"),
                vec![Argument::Int(0), identifier.to_string().into()],
            ),
        ]
    }

    fn addresses(out: Outbox) -> Vec<String> {
        out.into_messages()
            .into_iter()
            .map(|m| m.address().to_string())
            .collect()
    }

    #[test]
    fn count_fans_out_one_index_request_per_record() {
        let (mut manager, _rx) = manager();
        let mut out = Outbox::default();
        manager.synchronize(&mut out);
        assert_eq!(addresses(out), vec!["/eos/get/group/count"]);

        let mut out = Outbox::default();
        manager.take(&count_reply(3), &mut out);
        assert_eq!(
            addresses(out),
            vec![
                "/eos/get/group/index/0",
                "/eos/get/group/index/1",
                "/eos/get/group/index/2",
            ]
        );
        assert_eq!(manager.fraction(), 0.0);
    }

    #[test]
    fn zero_count_completes_with_empty_collection() {
        let (mut manager, rx) = manager();
        let mut out = Outbox::default();
        manager.synchronize(&mut out);
        manager.take(&count_reply(0), &mut out);
        assert_eq!(manager.fraction(), 1.0);
        assert!(rx.borrow().is_empty());
    }

    #[test]
    fn out_of_order_replies_assemble_into_sorted_collection() {
        let (mut manager, rx) = manager();
        let mut out = Outbox::default();
        manager.synchronize(&mut out);
        manager.take(&count_reply(2), &mut out);

        let high = Uuid::new_v4();
        let low = Uuid::new_v4();
        let [high_index, high_channels] = group_messages(9, high, "nine");
        let [low_index, low_channels] = group_messages(4, low, "four");

        // Index 1's record completes before index 0's.
        manager.take(&high_index, &mut out);
        manager.take(&high_channels, &mut out);
        manager.take(&low_channels, &mut out);
        manager.take(&low_index, &mut out);

        let numbers: Vec<f64> = rx.borrow().iter().map(|g| g.number).collect();
        assert_eq!(numbers, vec![4.0, 9.0]);
        assert_eq!(manager.fraction(), 1.0);
    }

    #[test]
    fn resynchronize_discards_in_flight_state() {
        let (mut manager, rx) = manager();
        let mut out = Outbox::default();
        manager.synchronize(&mut out);
        manager.take(&count_reply(2), &mut out);

        let identifier = Uuid::new_v4();
        let [index, channels] = group_messages(5, identifier, "five");
        manager.take(&index, &mut out);

        // Restart mid-flight: the partial set must not survive.
        let mut out = Outbox::default();
        manager.synchronize(&mut out);
        manager.take(&count_reply(1), &mut out);
        manager.take(&channels, &mut out);
        assert!(rx.borrow().is_empty());

        let [index, channels] = group_messages(5, identifier, "five");
        manager.take(&index, &mut out);
        manager.take(&channels, &mut out);
        assert_eq!(rx.borrow().len(), 1);
        assert_eq!(manager.fraction(), 1.0);
    }

    #[test]
    fn update_replaces_by_identifier_at_new_sorted_position() {
        let (mut manager, rx) = manager();
        let mut out = Outbox::default();
        manager.synchronize(&mut out);
        manager.take(&count_reply(2), &mut out);

        let moved = Uuid::new_v4();
        let other = Uuid::new_v4();
        for message in group_messages(2, moved, "moved")
            .into_iter()
            .chain(group_messages(6, other, "other"))
        {
            manager.take(&message, &mut out);
        }

        // The record renumbers from 2 to 8: same identifier, new ordinal.
        for message in group_messages(8, moved, "moved") {
            manager.take(&message, &mut out);
        }
        let snapshot: Vec<(f64, Uuid)> = rx.borrow().iter().map(|g| (g.number, g.identifier)).collect();
        assert_eq!(snapshot, vec![(6.0, other), (8.0, moved)]);
    }

    #[test]
    fn notify_uses_identifier_for_known_records_and_ordinal_otherwise() {
        let (mut manager, _rx) = manager();
        let mut out = Outbox::default();
        manager.synchronize(&mut out);
        manager.take(&count_reply(1), &mut out);

        let identifier = Uuid::new_v4();
        for message in group_messages(5, identifier, "five") {
            manager.take(&message, &mut out);
        }

        let mut out = Outbox::default();
        let notify = Message::new(
            "/notify/group/list/0/3",
            vec![Argument::Int(0), Argument::Int(5), Argument::Int(9)],
        );
        manager.take(&notify, &mut out);
        assert_eq!(
            addresses(out),
            vec![
                format!("/eos/get/group/uid/{identifier}"),
                "/eos/get/group/9".to_string(),
            ]
        );
    }

    #[test]
    fn stale_identifier_reply_removes_the_record() {
        let (mut manager, rx) = manager();
        let mut out = Outbox::default();
        manager.synchronize(&mut out);
        manager.take(&count_reply(1), &mut out);

        let identifier = Uuid::new_v4();
        for message in group_messages(5, identifier, "five") {
            manager.take(&message, &mut out);
        }
        assert_eq!(rx.borrow().len(), 1);

        let gone = Message::new(
            "/get/group/0",
            vec![Argument::Int(0), identifier.to_string().into()],
        );
        manager.take(&gone, &mut out);
        assert!(rx.borrow().is_empty());
    }

    #[test]
    fn malformed_record_set_is_dropped_silently() {
        let (mut manager, rx) = manager();
        let mut out = Outbox::default();
        manager.synchronize(&mut out);
        manager.take(&count_reply(1), &mut out);

        let identifier = Uuid::new_v4();
        // Label argument missing: the set completes but fails to parse.
        let index = Message::new(
            "/get/group/5/list/0/3",
            vec![Argument::Int(0), identifier.to_string().into()],
        );
        let channels = Message::new(
            "/get/group/5/channels/list/0/2",
            vec![Argument::Int(0), identifier.to_string().into()],
        );
        manager.take(&index, &mut out);
        manager.take(&channels, &mut out);
        assert!(rx.borrow().is_empty());
        assert_eq!(manager.fraction(), 0.0);
    }
}
