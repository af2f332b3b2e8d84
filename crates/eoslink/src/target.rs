//! Record target table: the synchronizable record types, their wire address
//! fragments, and their reply-filter address lists.
//!
//! Each target's filter list serves double duty: the strings are sent to the
//! console (reply-prefixed) to subscribe to exactly the replies the engine
//! needs, and the same patterns form the target manager's routing table. A
//! `#` segment matches any single numeric path segment.

use serde::{Deserialize, Serialize};

/// A synchronizable record type on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTarget {
    Patch,
    CueList,
    Cue,
    Group,
    Macro,
    Sub,
    Preset,
    IntensityPalette,
    FocusPalette,
    ColorPalette,
    BeamPalette,
    Curve,
    Effect,
    Snapshot,
    PixelMap,
    MagicSheet,
    Setup,
}

impl RecordTarget {
    /// Every target, in a stable order.
    pub fn all() -> [RecordTarget; 17] {
        use RecordTarget::*;
        [
            Patch,
            CueList,
            Cue,
            Group,
            Macro,
            Sub,
            Preset,
            IntensityPalette,
            FocusPalette,
            ColorPalette,
            BeamPalette,
            Curve,
            Effect,
            Snapshot,
            PixelMap,
            MagicSheet,
            Setup,
        ]
    }

    /// The address fragment naming this target on the wire.
    pub fn part(&self) -> &'static str {
        match self {
            RecordTarget::Patch => "patch",
            RecordTarget::CueList => "cuelist",
            RecordTarget::Cue => "cue",
            RecordTarget::Group => "group",
            RecordTarget::Macro => "macro",
            RecordTarget::Sub => "sub",
            RecordTarget::Preset => "preset",
            RecordTarget::IntensityPalette => "ip",
            RecordTarget::FocusPalette => "fp",
            RecordTarget::ColorPalette => "cp",
            RecordTarget::BeamPalette => "bp",
            RecordTarget::Curve => "curve",
            RecordTarget::Effect => "fx",
            RecordTarget::Snapshot => "snap",
            RecordTarget::PixelMap => "pixmap",
            RecordTarget::MagicSheet => "ms",
            RecordTarget::Setup => "setup",
        }
    }

    /// The relative reply addresses this target subscribes to.
    pub fn filters(&self) -> &'static [&'static str] {
        match self {
            RecordTarget::Patch => &[
                "/get/patch/count",
                "/get/patch/#/#/list/#/#",
                "/get/patch/#/#/notes",
                "/notify/patch/list/#/#",
            ],
            RecordTarget::CueList => &[
                "/get/cuelist/count",
                "/get/cuelist/#/list/#/#",
                "/get/cuelist/#/links/list/#/#",
                "/notify/cuelist/list/#/#",
            ],
            RecordTarget::Cue => &[
                "/get/cue/count",
                "/get/cue/#/#/list/#/#",
                "/get/cue/#/#/fx/list/#/#",
                "/get/cue/#/#/links/list/#/#",
                "/get/cue/#/#/actions/list/#/#",
                "/notify/cue/list/#/#",
                "/get/cue/0/0",
            ],
            RecordTarget::Group => &[
                "/get/group/count",
                "/get/group/#/list/#/#",
                "/get/group/#/channels/list/#/#",
                "/notify/group/list/#/#",
                "/get/group/0",
            ],
            RecordTarget::Macro => &[
                "/get/macro/count",
                "/get/macro/#/list/#/#",
                "/get/macro/#/text/list/#/#",
                "/notify/macro/list/#/#",
                "/get/macro/0",
            ],
            RecordTarget::Sub => &[
                "/get/sub/count",
                "/get/sub/#/list/#/#",
                "/get/sub/#/fx/list/#/#",
                "/notify/sub/list/#/#",
                "/get/sub/0",
            ],
            RecordTarget::Preset => &[
                "/get/preset/count",
                "/get/preset/#/list/#/#",
                "/get/preset/#/channels/list/#/#",
                "/get/preset/#/byType/list/#/#",
                "/get/preset/#/fx/list/#/#",
                "/notify/preset/list/#/#",
                "/get/preset/0",
            ],
            RecordTarget::IntensityPalette => &[
                "/get/ip/count",
                "/get/ip/#/list/#/#",
                "/get/ip/#/channels/list/#/#",
                "/get/ip/#/byType/list/#/#",
                "/notify/ip/list/#/#",
                "/get/ip/0",
            ],
            RecordTarget::FocusPalette => &[
                "/get/fp/count",
                "/get/fp/#/list/#/#",
                "/get/fp/#/channels/list/#/#",
                "/get/fp/#/byType/list/#/#",
                "/notify/fp/list/#/#",
                "/get/fp/0",
            ],
            RecordTarget::ColorPalette => &[
                "/get/cp/count",
                "/get/cp/#/list/#/#",
                "/get/cp/#/channels/list/#/#",
                "/get/cp/#/byType/list/#/#",
                "/notify/cp/list/#/#",
                "/get/cp/0",
            ],
            RecordTarget::BeamPalette => &[
                "/get/bp/count",
                "/get/bp/#/list/#/#",
                "/get/bp/#/channels/list/#/#",
                "/get/bp/#/byType/list/#/#",
                "/notify/bp/list/#/#",
                "/get/bp/0",
            ],
            RecordTarget::Curve => &[
                "/get/curve/count",
                "/get/curve/#/list/#/#",
                "/notify/curve/list/#/#",
                "/get/curve/0",
            ],
            RecordTarget::Effect => &[
                "/get/fx/count",
                "/get/fx/#/list/#/#",
                "/notify/fx/list/#/#",
                "/get/fx/0",
            ],
            RecordTarget::Snapshot => &[
                "/get/snap/count",
                "/get/snap/#/list/#/#",
                "/notify/snap/list/#/#",
                "/get/snap/0",
            ],
            RecordTarget::PixelMap => &[
                "/get/pixmap/count",
                "/get/pixmap/#/list/#/#",
                "/get/pixmap/#/channels/list/#/#",
                "/notify/pixmap/list/#/#",
                "/get/pixmap/0",
            ],
            RecordTarget::MagicSheet => &[
                "/get/ms/count",
                "/get/ms/#/list/#/#",
                "/notify/ms/list/#/#",
                "/get/ms/0",
            ],
            RecordTarget::Setup => &["/get/setup/list/#/#"],
        }
    }
}

impl std::fmt::Display for RecordTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.part())
    }
}

/// The role an address pattern plays in the synchronization protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingRole {
    /// Reply to a record-count request.
    Count,
    /// Server-pushed delta change signal.
    Notify,
    /// Reply carrying (part of) one record's data.
    Index,
}

/// Classify a filter address pattern into its protocol role.
pub fn classify(pattern: &str) -> RoutingRole {
    if pattern.ends_with("count") {
        RoutingRole::Count
    } else if pattern.starts_with("/notify") {
        RoutingRole::Notify
    } else {
        RoutingRole::Index
    }
}

/// Match a relative address against a filter pattern. A `#` segment matches
/// exactly one numeric path segment; everything else matches literally.
pub fn pattern_matches(pattern: &str, address: &str) -> bool {
    let mut pattern_segments = pattern.split('/').filter(|s| !s.is_empty());
    let mut address_segments = address.split('/').filter(|s| !s.is_empty());
    loop {
        match (pattern_segments.next(), address_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(a)) => {
                if p == "#" {
                    if a.parse::<f64>().is_err() {
                        return false;
                    }
                } else if p != a {
                    return false;
                }
            }
            _ => return false,
        }
    }
}
