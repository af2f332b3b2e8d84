//! Protocol message model and strict argument decoding.
//!
//! The console speaks an addressed, multi-argument message protocol. Requests
//! travel under the `/eos` prefix; everything the console emits back is
//! prefixed `/eos/out`. A reply address with the prefix stripped (the
//! *relative* address) is what the session and target managers route on.
//!
//! ```text
//! request:  /eos/get/group/count
//! reply:    /eos/out/get/group/count      int: 7
//! request:  /eos/get/group/index/3
//! reply:    /eos/out/get/group/3/list/0/5 int: 3, string: uuid, string: label, ...
//! ```
//!
//! Wire encoding/decoding of these messages is the transport's business; this
//! module only models them in memory and provides the request builders plus a
//! strict, index-addressed argument decoder. Every field extraction goes
//! through [`Args`] and yields a typed [`DecodeError`] on mismatch, consumed
//! once via pattern matching by the record parsers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::target::RecordTarget;

/// Prefix for every request sent to the console.
pub const REQUEST_PREFIX: &str = "/eos";

/// Prefix the console applies to every reply it emits.
pub const REPLY_PREFIX: &str = "/eos/out";

/// Relative address of the application-level ping used for heartbeats.
pub const PING_ADDRESS: &str = "/ping";

/// First ping argument; the console echoes it verbatim.
pub const HEARTBEAT_TOKEN: &str = "eoslink heartbeat";

/// Address for adding reply-filter subscription strings.
pub const FILTER_ADD_ADDRESS: &str = "/eos/filter/add";

/// Address for removing reply-filter subscription strings.
pub const FILTER_REMOVE_ADDRESS: &str = "/eos/filter/remove";

/// Address for enabling server-pushed change notifications.
pub const SUBSCRIBE_ADDRESS: &str = "/eos/subscribe";

/// A single typed message argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Argument {
    Int(i32),
    Double(f64),
    Bool(bool),
    String(String),
}

impl Argument {
    fn type_name(&self) -> &'static str {
        match self {
            Argument::Int(_) => "int",
            Argument::Double(_) => "double",
            Argument::Bool(_) => "bool",
            Argument::String(_) => "string",
        }
    }
}

impl From<i32> for Argument {
    fn from(v: i32) -> Self {
        Argument::Int(v)
    }
}

impl From<f64> for Argument {
    fn from(v: f64) -> Self {
        Argument::Double(v)
    }
}

impl From<bool> for Argument {
    fn from(v: bool) -> Self {
        Argument::Bool(v)
    }
}

impl From<&str> for Argument {
    fn from(v: &str) -> Self {
        Argument::String(v.to_string())
    }
}

impl From<String> for Argument {
    fn from(v: String) -> Self {
        Argument::String(v)
    }
}

/// Errors raised while decoding message arguments into record fields.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DecodeError {
    #[error("missing argument at index {0}")]
    MissingArgument(usize),
    #[error("argument {index} is {actual}, expected {expected}")]
    WrongType {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("expected {expected} messages, got {actual}")]
    MessageCount { expected: usize, actual: usize },
    #[error("missing {0} message")]
    MissingShape(&'static str),
    #[error("missing or malformed ordinal in address")]
    Ordinal,
    #[error("missing or malformed record identifier")]
    Identifier,
}

/// An addressed protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    address: String,
    arguments: Vec<Argument>,
}

/// What the transport actually carries: a single message, or an atomic batch
/// delivered to the console as one unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Message(Message),
    Batch(Vec<Message>),
}

impl Message {
    pub fn new(address: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            address: address.into(),
            arguments,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Strict decoder over this message's arguments.
    pub fn args(&self) -> Args<'_> {
        Args(&self.arguments)
    }

    /// Address path segment `index`, counting from the start of the relative
    /// address. `/get/group/3/list/0/5` has segment 2 == `"3"`.
    pub fn path_segment(&self, index: usize) -> Option<&str> {
        self.address.split('/').filter(|s| !s.is_empty()).nth(index)
    }

    /// The console-assigned ordinal embedded in a reply address.
    pub fn ordinal(&self) -> Option<&str> {
        self.path_segment(2)
    }

    /// The nested sub-record ordinal embedded in a reply address.
    pub fn sub_ordinal(&self) -> Option<&str> {
        self.path_segment(3)
    }

    /// The stable record identifier carried as the second argument of index
    /// replies.
    pub fn identifier(&self) -> Option<Uuid> {
        match self.arguments.get(1) {
            Some(Argument::String(s)) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }

    /// True if this message came from the console's reply address space.
    pub fn is_reply(&self) -> bool {
        self.address.starts_with(REPLY_PREFIX)
    }

    /// The address with the reply prefix stripped, if this is a reply.
    pub fn relative_address(&self) -> Option<&str> {
        self.address.strip_prefix(REPLY_PREFIX)
    }

    /// True if this is a ping reply echoing our token and session identifier.
    pub fn is_heartbeat_reply(&self, session: Uuid) -> bool {
        if self.arguments.len() != 2 {
            return false;
        }
        matches!(
            (&self.arguments[0], &self.arguments[1]),
            (Argument::String(token), Argument::String(id))
                if token == HEARTBEAT_TOKEN && *id == session.to_string()
        )
    }

    // --- request builders ---

    /// A request under the `/eos` prefix for an arbitrary relative address.
    pub fn request(relative_address: &str, arguments: Vec<Argument>) -> Self {
        Self::new(format!("{REQUEST_PREFIX}{relative_address}"), arguments)
    }

    /// Ask how many records of `target` the console holds.
    pub fn get_count(target: RecordTarget) -> Self {
        Self::new(format!("{REQUEST_PREFIX}/get/{}/count", target.part()), vec![])
    }

    /// Fetch the record at list position `index` (0-based).
    pub fn get_index(target: RecordTarget, index: i32) -> Self {
        Self::new(
            format!("{REQUEST_PREFIX}/get/{}/index/{index}", target.part()),
            vec![],
        )
    }

    /// Fetch a record by its stable identifier. Immune to renumbering.
    pub fn get_identifier(target: RecordTarget, identifier: Uuid) -> Self {
        Self::new(
            format!("{REQUEST_PREFIX}/get/{}/uid/{identifier}", target.part()),
            vec![],
        )
    }

    /// Fetch a record by its console-assigned ordinal. Only safe for records
    /// whose identifier is not yet known.
    pub fn get_ordinal(target: RecordTarget, ordinal: &str) -> Self {
        Self::new(
            format!("{REQUEST_PREFIX}/get/{}/{ordinal}", target.part()),
            vec![],
        )
    }

    /// Application-level liveness ping carrying the session identifier.
    pub fn ping(session: Uuid) -> Self {
        Self::new(
            format!("{REQUEST_PREFIX}{PING_ADDRESS}"),
            vec![HEARTBEAT_TOKEN.into(), session.to_string().into()],
        )
    }

    pub fn filter_add(filters: impl IntoIterator<Item = String>) -> Self {
        Self::new(
            FILTER_ADD_ADDRESS,
            filters.into_iter().map(Argument::String).collect(),
        )
    }

    pub fn filter_remove(filters: impl IntoIterator<Item = String>) -> Self {
        Self::new(
            FILTER_REMOVE_ADDRESS,
            filters.into_iter().map(Argument::String).collect(),
        )
    }

    pub fn subscribe(enabled: bool) -> Self {
        Self::new(SUBSCRIBE_ADDRESS, vec![Argument::Int(i32::from(enabled))])
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        for argument in &self.arguments {
            match argument {
                Argument::Int(v) => write!(f, " {v}")?,
                Argument::Double(v) => write!(f, " {v}")?,
                Argument::Bool(v) => write!(f, " {v}")?,
                Argument::String(v) => write!(f, " \"{v}\"")?,
            }
        }
        Ok(())
    }
}

/// Index-addressed strict argument decoder.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a>(&'a [Argument]);

impl<'a> Args<'a> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw argument at `index`, for the rare shapes whose type varies.
    pub fn raw(&self, index: usize) -> Result<&'a Argument, DecodeError> {
        self.0.get(index).ok_or(DecodeError::MissingArgument(index))
    }

    pub fn str(&self, index: usize) -> Result<&'a str, DecodeError> {
        match self.raw(index)? {
            Argument::String(s) => Ok(s),
            other => Err(DecodeError::WrongType {
                index,
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }

    pub fn int(&self, index: usize) -> Result<i32, DecodeError> {
        match self.raw(index)? {
            Argument::Int(v) => Ok(*v),
            other => Err(DecodeError::WrongType {
                index,
                expected: "int",
                actual: other.type_name(),
            }),
        }
    }

    pub fn bool(&self, index: usize) -> Result<bool, DecodeError> {
        match self.raw(index)? {
            Argument::Bool(v) => Ok(*v),
            other => Err(DecodeError::WrongType {
                index,
                expected: "bool",
                actual: other.type_name(),
            }),
        }
    }

    /// Numeric argument: ints widen to doubles.
    pub fn number(&self, index: usize) -> Result<f64, DecodeError> {
        match self.raw(index)? {
            Argument::Int(v) => Ok(f64::from(*v)),
            Argument::Double(v) => Ok(*v),
            other => Err(DecodeError::WrongType {
                index,
                expected: "number",
                actual: other.type_name(),
            }),
        }
    }

    /// Expand every argument from `from` onward into ordinals, flattening
    /// range strings. Used for channel/effect/link list messages.
    pub fn tail_ordinals(&self, from: usize) -> Vec<f64> {
        self.0
            .iter()
            .skip(from)
            .flat_map(ordinals)
            .collect()
    }
}

/// Expand one argument into the ordinals it denotes.
///
/// The console packs numeric lists as ints, doubles, or strings; a string of
/// the form `"a-b"` denotes the inclusive integer range `a..=b`.
pub fn ordinals(argument: &Argument) -> Vec<f64> {
    match argument {
        Argument::Int(v) => vec![f64::from(*v)],
        Argument::Double(v) => vec![*v],
        Argument::Bool(_) => vec![],
        Argument::String(s) => {
            if let Some((low, high)) = s.split_once('-') {
                if let (Ok(low), Ok(high)) = (low.trim().parse::<i64>(), high.trim().parse::<i64>())
                {
                    if low <= high {
                        return (low..=high).map(|v| v as f64).collect();
                    }
                }
            }
            s.trim().parse::<f64>().map(|v| vec![v]).unwrap_or_default()
        }
    }
}

/// Format an ordinal the way it appears in address paths: integral values
/// without the trailing `.0`.
pub fn format_ordinal(ordinal: f64) -> String {
    if ordinal.fract() == 0.0 {
        format!("{}", ordinal as i64)
    } else {
        format!("{ordinal}")
    }
}
