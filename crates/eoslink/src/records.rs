//! Concrete record shapes.
//!
//! Field layouts follow the console's reply argument order: argument 0 is the
//! enumeration index, argument 1 the record identifier, argument 2 the label,
//! with type-specific fields after that. List-style companion messages
//! (channels, fx, links, byType) carry their ordinals from argument 2 onward.

pub mod channel;
pub mod cue;
pub mod cue_list;
pub mod group;
pub mod macros;
pub mod palette;
pub mod preset;
pub mod setup;
pub mod simple;
pub mod sub;

pub use channel::{Channel, ChannelPart};
pub use cue::Cue;
pub use cue_list::CueList;
pub use group::Group;
pub use macros::Macro;
pub use palette::{BeamPalette, ColorPalette, FocusPalette, IntensityPalette};
pub use preset::Preset;
pub use setup::Setup;
pub use simple::{Curve, Effect, MagicSheet, PixelMap, Snapshot};
pub use sub::Sub;
