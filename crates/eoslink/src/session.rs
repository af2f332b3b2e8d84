//! The console session core: connection/heartbeat state machine, filter
//! negotiation, inbound routing, and aggregate progress.
//!
//! The session is a plain synchronous state machine consuming a closed set of
//! events - connect, disconnect, packet arrival, and the two timer firings -
//! strictly in arrival order, and returning explicit [`Effect`]s for the
//! driver to execute. That serialization is what makes reassembly-buffer
//! mutation and collection merging race-free without locks: there is no
//! blocking wait anywhere, only state retained until a later event resumes
//! it.
//!
//! Heartbeats are application-level pings carrying a session-unique token; a
//! reply is recognized only when it echoes that exact token. Any inbound
//! reply at all counts as proof of liveness and re-arms a pending failure
//! timer, so a busy synchronization never trips the unresponsive state.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::filter::{wire_filter, wire_filters, FilterChanges, SYSTEM_FILTERS};
use crate::manager::{Outbox, TargetManager};
use crate::message::{Argument, Message, Packet, PING_ADDRESS};
use crate::patch::PatchManager;
use crate::records::{
    BeamPalette, Channel, ColorPalette, Cue, CueList, Curve, Effect as EffectRecord, FocusPalette,
    Group, IntensityPalette, Macro, MagicSheet, PixelMap, Preset, Setup, Snapshot, Sub,
};
use crate::target::RecordTarget;

/// How often a heartbeat is sent while the console is answering.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// How long to wait for any reply before declaring the console unresponsive.
pub const HEARTBEAT_FAILURE_INTERVAL: Duration = Duration::from_secs(1);

/// Session connectivity state.
///
/// `Connected` tracks the transport link; `Responsive`/`Unresponsive` track
/// whether the console is actually answering on top of that link.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConsoleState {
    Unknown = 0,
    Disconnected = 1,
    Connected = 2,
    Unresponsive = 3,
    Responsive = 4,
}

impl ConsoleState {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => ConsoleState::Disconnected,
            2 => ConsoleState::Connected,
            3 => ConsoleState::Unresponsive,
            4 => ConsoleState::Responsive,
            _ => ConsoleState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleState::Unknown => "unknown",
            ConsoleState::Disconnected => "disconnected",
            ConsoleState::Connected => "connected",
            ConsoleState::Unresponsive => "unresponsive",
            ConsoleState::Responsive => "responsive",
        }
    }
}

/// The closed set of inputs the session consumes.
#[derive(Debug)]
pub enum SessionEvent {
    Connected,
    Disconnected,
    Packet(Message),
    HeartbeatDue,
    FailureTimeout,
}

/// What the session asks its driver to do. Every effect is fire-and-forget;
/// the driver supplies the actual timer durations.
#[derive(Debug)]
pub enum Effect {
    Send(Packet),
    ArmFailureTimer,
    DisarmFailureTimer,
    ScheduleHeartbeat,
    CancelHeartbeat,
    Emit(ConsoleEvent),
}

/// Notifications surfaced to the embedding application.
#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    StateChanged(ConsoleState),
    /// A reply matched no pending handler and no manager's routing table.
    /// Never dropped without signal.
    Undefined(Message),
    Progress { fraction: f64 },
    SynchronizationComplete(BTreeSet<RecordTarget>),
}

/// Single-shot reply handler for one-off queries.
pub type PendingHandler = Box<dyn FnOnce(&Message) + Send>;

macro_rules! each_slot {
    ($slot:expr, $inner:ident => $body:expr) => {
        match $slot {
            ManagerSlot::Patch($inner) => $body,
            ManagerSlot::CueList($inner) => $body,
            ManagerSlot::Cue($inner) => $body,
            ManagerSlot::Group($inner) => $body,
            ManagerSlot::Macro($inner) => $body,
            ManagerSlot::Sub($inner) => $body,
            ManagerSlot::Preset($inner) => $body,
            ManagerSlot::IntensityPalette($inner) => $body,
            ManagerSlot::FocusPalette($inner) => $body,
            ManagerSlot::ColorPalette($inner) => $body,
            ManagerSlot::BeamPalette($inner) => $body,
            ManagerSlot::Curve($inner) => $body,
            ManagerSlot::Effect($inner) => $body,
            ManagerSlot::Snapshot($inner) => $body,
            ManagerSlot::PixelMap($inner) => $body,
            ManagerSlot::MagicSheet($inner) => $body,
        }
    };
}

/// One active target manager. An enum rather than a trait object so dispatch
/// stays a plain match over the closed set of record types.
enum ManagerSlot {
    Patch(PatchManager),
    CueList(TargetManager<CueList>),
    Cue(TargetManager<Cue>),
    Group(TargetManager<Group>),
    Macro(TargetManager<Macro>),
    Sub(TargetManager<Sub>),
    Preset(TargetManager<Preset>),
    IntensityPalette(TargetManager<IntensityPalette>),
    FocusPalette(TargetManager<FocusPalette>),
    ColorPalette(TargetManager<ColorPalette>),
    BeamPalette(TargetManager<BeamPalette>),
    Curve(TargetManager<Curve>),
    Effect(TargetManager<EffectRecord>),
    Snapshot(TargetManager<Snapshot>),
    PixelMap(TargetManager<PixelMap>),
    MagicSheet(TargetManager<MagicSheet>),
}

impl ManagerSlot {
    fn claims(&self, address: &str) -> bool {
        each_slot!(self, manager => manager.claims(address))
    }

    fn take(&mut self, message: &Message, out: &mut Outbox) {
        each_slot!(self, manager => manager.take(message, out))
    }

    fn synchronize(&mut self, out: &mut Outbox) {
        each_slot!(self, manager => manager.synchronize(out))
    }

    fn discard_in_flight(&mut self) {
        each_slot!(self, manager => manager.discard_in_flight())
    }

    fn fraction(&self) -> f64 {
        each_slot!(self, manager => manager.fraction())
    }
}

/// Watch senders for every published collection.
struct Publishers {
    patch: Arc<watch::Sender<Vec<Channel>>>,
    cue_lists: Arc<watch::Sender<Vec<CueList>>>,
    cues: Arc<watch::Sender<Vec<Cue>>>,
    groups: Arc<watch::Sender<Vec<Group>>>,
    macros: Arc<watch::Sender<Vec<Macro>>>,
    subs: Arc<watch::Sender<Vec<Sub>>>,
    presets: Arc<watch::Sender<Vec<Preset>>>,
    intensity_palettes: Arc<watch::Sender<Vec<IntensityPalette>>>,
    focus_palettes: Arc<watch::Sender<Vec<FocusPalette>>>,
    color_palettes: Arc<watch::Sender<Vec<ColorPalette>>>,
    beam_palettes: Arc<watch::Sender<Vec<BeamPalette>>>,
    curves: Arc<watch::Sender<Vec<Curve>>>,
    effects: Arc<watch::Sender<Vec<EffectRecord>>>,
    snapshots: Arc<watch::Sender<Vec<Snapshot>>>,
    pixel_maps: Arc<watch::Sender<Vec<PixelMap>>>,
    magic_sheets: Arc<watch::Sender<Vec<MagicSheet>>>,
    setup: Arc<watch::Sender<Setup>>,
}

/// Read-only, continuously updated views of every synchronized collection.
///
/// Receivers stay valid across reconnects and target changes; a disabled
/// target's collection simply stops updating.
#[derive(Debug, Clone)]
pub struct Snapshots {
    pub patch: watch::Receiver<Vec<Channel>>,
    pub cue_lists: watch::Receiver<Vec<CueList>>,
    pub cues: watch::Receiver<Vec<Cue>>,
    pub groups: watch::Receiver<Vec<Group>>,
    pub macros: watch::Receiver<Vec<Macro>>,
    pub subs: watch::Receiver<Vec<Sub>>,
    pub presets: watch::Receiver<Vec<Preset>>,
    pub intensity_palettes: watch::Receiver<Vec<IntensityPalette>>,
    pub focus_palettes: watch::Receiver<Vec<FocusPalette>>,
    pub color_palettes: watch::Receiver<Vec<ColorPalette>>,
    pub beam_palettes: watch::Receiver<Vec<BeamPalette>>,
    pub curves: watch::Receiver<Vec<Curve>>,
    pub effects: watch::Receiver<Vec<EffectRecord>>,
    pub snapshots: watch::Receiver<Vec<Snapshot>>,
    pub pixel_maps: watch::Receiver<Vec<PixelMap>>,
    pub magic_sheets: watch::Receiver<Vec<MagicSheet>>,
    pub setup: watch::Receiver<Setup>,
}

fn publisher<T: Clone>(initial: T) -> (Arc<watch::Sender<T>>, watch::Receiver<T>) {
    let (tx, rx) = watch::channel(initial);
    (Arc::new(tx), rx)
}

impl Publishers {
    fn new() -> (Self, Snapshots) {
        let (patch, patch_rx) = publisher(Vec::new());
        let (cue_lists, cue_lists_rx) = publisher(Vec::new());
        let (cues, cues_rx) = publisher(Vec::new());
        let (groups, groups_rx) = publisher(Vec::new());
        let (macros, macros_rx) = publisher(Vec::new());
        let (subs, subs_rx) = publisher(Vec::new());
        let (presets, presets_rx) = publisher(Vec::new());
        let (intensity_palettes, intensity_rx) = publisher(Vec::new());
        let (focus_palettes, focus_rx) = publisher(Vec::new());
        let (color_palettes, color_rx) = publisher(Vec::new());
        let (beam_palettes, beam_rx) = publisher(Vec::new());
        let (curves, curves_rx) = publisher(Vec::new());
        let (effects, effects_rx) = publisher(Vec::new());
        let (snapshots, snapshots_rx) = publisher(Vec::new());
        let (pixel_maps, pixel_maps_rx) = publisher(Vec::new());
        let (magic_sheets, magic_sheets_rx) = publisher(Vec::new());
        let (setup, setup_rx) = publisher(Setup::default());
        (
            Self {
                patch,
                cue_lists,
                cues,
                groups,
                macros,
                subs,
                presets,
                intensity_palettes,
                focus_palettes,
                color_palettes,
                beam_palettes,
                curves,
                effects,
                snapshots,
                pixel_maps,
                magic_sheets,
                setup,
            },
            Snapshots {
                patch: patch_rx,
                cue_lists: cue_lists_rx,
                cues: cues_rx,
                groups: groups_rx,
                macros: macros_rx,
                subs: subs_rx,
                presets: presets_rx,
                intensity_palettes: intensity_rx,
                focus_palettes: focus_rx,
                color_palettes: color_rx,
                beam_palettes: beam_rx,
                curves: curves_rx,
                effects: effects_rx,
                snapshots: snapshots_rx,
                pixel_maps: pixel_maps_rx,
                magic_sheets: magic_sheets_rx,
                setup: setup_rx,
            },
        )
    }
}

pub struct ConsoleSession {
    name: String,
    session_id: Uuid,
    state: ConsoleState,
    /// Targets the caller wants synchronized.
    desired: BTreeSet<RecordTarget>,
    /// Targets currently negotiated with the console.
    active: BTreeSet<RecordTarget>,
    filters: BTreeSet<String>,
    system_filters_sent: bool,
    heartbeat_running: bool,
    /// A ping is in flight and the failure timer is armed.
    awaiting_reply: bool,
    pending: HashMap<String, PendingHandler>,
    managers: BTreeMap<RecordTarget, ManagerSlot>,
    publishers: Publishers,
    complete_emitted: bool,
    last_fraction: f64,
}

impl ConsoleSession {
    pub fn new(name: impl Into<String>) -> (Self, Snapshots) {
        let (publishers, snapshots) = Publishers::new();
        let session = Self {
            name: name.into(),
            session_id: Uuid::new_v4(),
            state: ConsoleState::Unknown,
            desired: BTreeSet::new(),
            active: BTreeSet::new(),
            filters: BTreeSet::new(),
            system_filters_sent: false,
            heartbeat_running: false,
            awaiting_reply: false,
            pending: HashMap::new(),
            managers: BTreeMap::new(),
            publishers,
            complete_emitted: false,
            last_fraction: -1.0,
        };
        (session, snapshots)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> ConsoleState {
        self.state
    }

    pub fn filters(&self) -> &BTreeSet<String> {
        &self.filters
    }

    pub fn targets(&self) -> &BTreeSet<RecordTarget> {
        &self.desired
    }

    /// One-line health/debug view, mostly for logs and tooling.
    pub fn debug_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "state": self.state.as_str(),
            "targets": self.desired,
            "filters": self.filters.len(),
            "progress": if self.managers.is_empty() { 1.0 } else { self.aggregate_fraction() },
        })
    }

    /// Feed one event through the state machine.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            SessionEvent::Connected => {
                debug!("{}: transport connected", self.name);
                self.set_state(ConsoleState::Connected, &mut effects);
                self.heartbeat_running = true;
                self.send_heartbeat(&mut effects);
            }
            SessionEvent::Disconnected => {
                debug!("{}: transport disconnected", self.name);
                self.set_state(ConsoleState::Disconnected, &mut effects);
                self.heartbeat_running = false;
                self.awaiting_reply = false;
                effects.push(Effect::DisarmFailureTimer);
                effects.push(Effect::CancelHeartbeat);
                // Filters must be renegotiated on reconnect; outstanding
                // correlated requests fail silently.
                self.filters.clear();
                self.system_filters_sent = false;
                if !self.pending.is_empty() {
                    trace!(
                        "{}: dropping {} pending handlers on disconnect",
                        self.name,
                        self.pending.len()
                    );
                    self.pending.clear();
                }
                for manager in self.managers.values_mut() {
                    manager.discard_in_flight();
                }
            }
            SessionEvent::HeartbeatDue => {
                if self.heartbeat_running {
                    self.send_heartbeat(&mut effects);
                }
            }
            SessionEvent::FailureTimeout => {
                if self.heartbeat_running {
                    // Console liveness is polled indefinitely: flag it once,
                    // then keep pinging with no backoff and no attempt cap.
                    self.set_state(ConsoleState::Unresponsive, &mut effects);
                    self.send_heartbeat(&mut effects);
                }
            }
            SessionEvent::Packet(message) => self.packet(message, &mut effects),
        }
        effects
    }

    /// Change the desired target set. Applied immediately while responsive;
    /// otherwise stored and applied on the next transition to responsive.
    pub fn set_targets(&mut self, targets: BTreeSet<RecordTarget>) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.desired = targets.clone();
        if self.state == ConsoleState::Responsive {
            self.apply_targets(targets, &mut effects);
        }
        effects
    }

    /// Restart a full resynchronization of every active target. No-op unless
    /// the console is responsive.
    pub fn synchronize(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state != ConsoleState::Responsive {
            return effects;
        }
        let mut out = Outbox::default();
        for manager in self.managers.values_mut() {
            manager.synchronize(&mut out);
        }
        if self.active.contains(&RecordTarget::Setup) {
            out.send(Message::request("/get/setup", vec![]));
        }
        self.complete_emitted = false;
        self.last_fraction = -1.0;
        flush(out, &mut effects);
        effects
    }

    /// Send a one-off query and register a single-shot reply handler keyed by
    /// the request's relative address. First matching reply wins; disconnect
    /// drops the handler silently.
    pub fn request(
        &mut self,
        relative_address: &str,
        arguments: Vec<Argument>,
        handler: PendingHandler,
    ) -> Vec<Effect> {
        self.pending.insert(relative_address.to_string(), handler);
        vec![Effect::Send(Packet::Message(Message::request(
            relative_address,
            arguments,
        )))]
    }

    fn set_state(&mut self, state: ConsoleState, effects: &mut Vec<Effect>) {
        if self.state == state {
            return;
        }
        self.state = state;
        debug!("{}: state -> {}", self.name, state.as_str());
        effects.push(Effect::Emit(ConsoleEvent::StateChanged(state)));
        if state == ConsoleState::Responsive {
            self.on_responsive(effects);
        }
    }

    fn on_responsive(&mut self, effects: &mut Vec<Effect>) {
        if !self.system_filters_sent {
            let system: Vec<String> = SYSTEM_FILTERS.iter().map(|f| wire_filter(f)).collect();
            self.filters.extend(system.iter().cloned());
            effects.push(Effect::Send(Packet::Message(Message::filter_add(system))));
            self.system_filters_sent = true;
        }
        self.apply_targets(self.desired.clone(), effects);
    }

    fn send_heartbeat(&mut self, effects: &mut Vec<Effect>) {
        trace!("{}: sending heartbeat", self.name);
        self.awaiting_reply = true;
        effects.push(Effect::Send(Packet::Message(Message::ping(self.session_id))));
        effects.push(Effect::ArmFailureTimer);
    }

    fn packet(&mut self, message: Message, effects: &mut Vec<Effect>) {
        if !message.is_reply() {
            effects.push(Effect::Emit(ConsoleEvent::Undefined(message)));
            return;
        }
        let Some(relative) = message.relative_address() else {
            return;
        };
        let relative = relative.to_string();
        let reply = Message::new(relative.clone(), message.arguments().to_vec());

        if relative == PING_ADDRESS {
            if reply.is_heartbeat_reply(self.session_id) {
                self.heartbeat_reply(effects);
            }
            return;
        }

        // Any reply is proof of liveness; push the failure deadline out.
        if self.awaiting_reply {
            effects.push(Effect::ArmFailureTimer);
        }

        if let Some(handler) = self.pending.remove(&relative) {
            handler(&reply);
            return;
        }

        if relative.starts_with("/get/setup") {
            match Setup::try_parse(&reply) {
                Ok(setup) => {
                    self.publishers.setup.send_replace(setup);
                }
                Err(error) => trace!("{}: undecodable setup reply: {error}", self.name),
            }
            return;
        }

        // A reply may belong to more than one manager's address space;
        // deliver to every claimant.
        let mut out = Outbox::default();
        let mut claimed = false;
        for manager in self.managers.values_mut() {
            if manager.claims(&relative) {
                claimed = true;
                manager.take(&reply, &mut out);
            }
        }
        flush(out, effects);

        if claimed {
            self.report_progress(effects);
        } else {
            effects.push(Effect::Emit(ConsoleEvent::Undefined(message)));
        }
    }

    fn heartbeat_reply(&mut self, effects: &mut Vec<Effect>) {
        if !self.heartbeat_running {
            return;
        }
        self.awaiting_reply = false;
        effects.push(Effect::DisarmFailureTimer);
        if self.state != ConsoleState::Disconnected {
            self.set_state(ConsoleState::Responsive, effects);
            effects.push(Effect::ScheduleHeartbeat);
        }
    }

    fn apply_targets(&mut self, to: BTreeSet<RecordTarget>, effects: &mut Vec<Effect>) {
        let from = self.active.clone();
        if from == to {
            // Reconnect path: same targets, but the console lost our filter
            // set. Re-add whatever is missing; never auto-resynchronize.
            let wanted: BTreeSet<String> = to.iter().flat_map(|t| wire_filters(*t)).collect();
            let missing: Vec<String> = wanted.difference(&self.filters).cloned().collect();
            if !missing.is_empty() {
                self.filters.extend(missing.iter().cloned());
                effects.push(Effect::Send(Packet::Message(Message::filter_add(missing))));
                effects.push(Effect::Send(Packet::Message(Message::subscribe(true))));
            }
            return;
        }

        let changes = FilterChanges::between(&from, &to);
        self.filters.extend(changes.add.iter().cloned());
        self.filters.retain(|f| !changes.remove.contains(f));
        match (changes.add.is_empty(), changes.remove.is_empty()) {
            (true, true) => {}
            (false, false) => {
                // One atomic batch so the console never transiently holds
                // neither or both sides. No ack exists for filter changes.
                effects.push(Effect::Send(Packet::Batch(vec![
                    Message::filter_add(changes.add),
                    Message::filter_remove(changes.remove),
                ])));
            }
            (false, true) => {
                effects.push(Effect::Send(Packet::Message(Message::filter_add(
                    changes.add,
                ))));
            }
            (true, false) => {
                effects.push(Effect::Send(Packet::Message(Message::filter_remove(
                    changes.remove,
                ))));
            }
        }

        let mut out = Outbox::default();
        for target in to.difference(&from) {
            self.add_manager(*target, &mut out);
        }
        for target in from.difference(&to) {
            self.managers.remove(target);
        }
        self.active = to;
        self.complete_emitted = false;
        self.last_fraction = -1.0;
        flush(out, effects);
        if !self.active.is_empty() {
            effects.push(Effect::Send(Packet::Message(Message::subscribe(true))));
        }
    }

    fn add_manager(&mut self, target: RecordTarget, out: &mut Outbox) {
        let slot = match target {
            RecordTarget::Setup => {
                out.send(Message::request("/get/setup", vec![]));
                return;
            }
            RecordTarget::Patch => {
                ManagerSlot::Patch(PatchManager::new(self.publishers.patch.clone()))
            }
            RecordTarget::CueList => {
                ManagerSlot::CueList(TargetManager::new(self.publishers.cue_lists.clone()))
            }
            RecordTarget::Cue => ManagerSlot::Cue(TargetManager::new(self.publishers.cues.clone())),
            RecordTarget::Group => {
                ManagerSlot::Group(TargetManager::new(self.publishers.groups.clone()))
            }
            RecordTarget::Macro => {
                ManagerSlot::Macro(TargetManager::new(self.publishers.macros.clone()))
            }
            RecordTarget::Sub => ManagerSlot::Sub(TargetManager::new(self.publishers.subs.clone())),
            RecordTarget::Preset => {
                ManagerSlot::Preset(TargetManager::new(self.publishers.presets.clone()))
            }
            RecordTarget::IntensityPalette => ManagerSlot::IntensityPalette(TargetManager::new(
                self.publishers.intensity_palettes.clone(),
            )),
            RecordTarget::FocusPalette => {
                ManagerSlot::FocusPalette(TargetManager::new(self.publishers.focus_palettes.clone()))
            }
            RecordTarget::ColorPalette => {
                ManagerSlot::ColorPalette(TargetManager::new(self.publishers.color_palettes.clone()))
            }
            RecordTarget::BeamPalette => {
                ManagerSlot::BeamPalette(TargetManager::new(self.publishers.beam_palettes.clone()))
            }
            RecordTarget::Curve => {
                ManagerSlot::Curve(TargetManager::new(self.publishers.curves.clone()))
            }
            RecordTarget::Effect => {
                ManagerSlot::Effect(TargetManager::new(self.publishers.effects.clone()))
            }
            RecordTarget::Snapshot => {
                ManagerSlot::Snapshot(TargetManager::new(self.publishers.snapshots.clone()))
            }
            RecordTarget::PixelMap => {
                ManagerSlot::PixelMap(TargetManager::new(self.publishers.pixel_maps.clone()))
            }
            RecordTarget::MagicSheet => {
                ManagerSlot::MagicSheet(TargetManager::new(self.publishers.magic_sheets.clone()))
            }
        };
        let slot = self.managers.entry(target).or_insert(slot);
        slot.synchronize(out);
    }

    fn aggregate_fraction(&self) -> f64 {
        let total: f64 = self.managers.values().map(ManagerSlot::fraction).sum();
        total / self.managers.len() as f64
    }

    fn report_progress(&mut self, effects: &mut Vec<Effect>) {
        if self.managers.is_empty() {
            return;
        }
        let fraction = self.aggregate_fraction();
        if fraction != self.last_fraction {
            self.last_fraction = fraction;
            effects.push(Effect::Emit(ConsoleEvent::Progress { fraction }));
        }
        if fraction >= 1.0 && !self.complete_emitted {
            self.complete_emitted = true;
            debug!("{}: synchronization complete", self.name);
            effects.push(Effect::Emit(ConsoleEvent::SynchronizationComplete(
                self.active.clone(),
            )));
        }
    }
}

fn flush(out: Outbox, effects: &mut Vec<Effect>) {
    for message in out.into_messages() {
        effects.push(Effect::Send(Packet::Message(message)));
    }
}
