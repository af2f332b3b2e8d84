//! eoslink - client-side synchronization engine for Eos-family lighting
//! console show data.
//!
//! The console is the source of truth; this crate never owns authoritative
//! state. It reconstructs typed records (cue lists, cues, patch channels,
//! groups, palettes, macros, effects, …) from a stream of addressed,
//! multi-part protocol messages and keeps the resulting collections current
//! through server-pushed change notifications.
//!
//! ## Synchronization protocol
//!
//! Every record type follows one skeleton:
//!
//! 1. **count** - ask how many records exist
//! 2. **fan-out fetch** - one get-by-index request per record
//! 3. **reassembly** - collect each record's fixed-size message set, keyed by
//!    its stable identifier (patch channels nest a second level: a variable
//!    number of parts, each with its own fixed set)
//! 4. **ordered merge** - insert/replace in an ordinal-sorted collection
//! 5. **delta refresh** - notify messages list changed ordinals; known
//!    records are re-fetched by identifier (immune to renumbering), unknown
//!    ones by ordinal
//!
//! ## Architecture
//!
//! The session core ([`session::ConsoleSession`]) is a synchronous state
//! machine consuming a closed event set and returning explicit effects; the
//! reactor ([`Console`]) owns it together with the [`Transport`] and
//! multiplexes transport events, user commands, and heartbeat timers over one
//! `select!` loop. Consumers read collections through `watch` snapshots and
//! session events through an mpsc stream.
//!
//! Wire encoding, socket handling, and LAN console discovery live outside
//! this crate, behind the [`Transport`] contract.

pub mod console;
pub mod filter;
pub mod message;
pub mod record;
pub mod records;
pub mod session;
pub mod target;
pub mod transport;

mod manager;
mod patch;

pub use console::{Console, ConsoleConfig};
pub use filter::{FilterChanges, SYSTEM_FILTERS};
pub use message::{Argument, DecodeError, Message, Packet};
pub use record::Record;
pub use records::{
    BeamPalette, Channel, ChannelPart, ColorPalette, Cue, CueList, Curve, Effect, FocusPalette,
    Group, IntensityPalette, Macro, MagicSheet, PixelMap, Preset, Setup, Snapshot, Sub,
};
pub use session::{ConsoleEvent, ConsoleState, Snapshots};
pub use target::RecordTarget;
pub use transport::{memory_pair, MemoryHarness, MemoryTransport, Transport, TransportEvent};
