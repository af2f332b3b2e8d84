//! The console's setup block: the five default fade times, read as a single
//! one-shot reply rather than through a target manager.

use serde::{Deserialize, Serialize};

use crate::message::{DecodeError, Message};

/// Default fade durations, all in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setup {
    pub up_time_duration: i32,
    pub down_time_duration: i32,
    pub focus_time_duration: i32,
    pub color_time_duration: i32,
    pub beam_time_duration: i32,
}

impl Setup {
    pub fn try_parse(message: &Message) -> Result<Self, DecodeError> {
        let args = message.args();
        Ok(Self {
            up_time_duration: args.int(0)?,
            down_time_duration: args.int(1)?,
            focus_time_duration: args.int(2)?,
            color_time_duration: args.int(3)?,
            beam_time_duration: args.int(4)?,
        })
    }
}
