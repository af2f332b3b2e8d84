//! Palette records. The four palette families (intensity, focus, color,
//! beam) share one three-message shape - index, channels, byType - and
//! differ only in their wire target.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{DecodeError, Message};
use crate::record::{
    expect_message_count, identifier_of, message_with, message_without, ordinal_of, Record,
};
use crate::target::RecordTarget;

macro_rules! palette_record {
    ($(#[$meta:meta])* $name:ident, $target:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub number: f64,
            pub identifier: Uuid,
            pub label: String,
            pub absolute: bool,
            pub locked: bool,
            pub channels: Vec<f64>,
            pub by_type_channels: Vec<f64>,
        }

        impl Record for $name {
            const TARGET: RecordTarget = $target;
            const MESSAGE_COUNT: usize = 3;

            fn try_parse(messages: &[Message]) -> Result<Self, DecodeError> {
                expect_message_count(messages, Self::MESSAGE_COUNT)?;
                let index = message_without(messages, &["channels", "byType"])?;
                let channels = message_with(messages, "channels")?;
                let by_type = message_with(messages, "byType")?;

                let args = index.args();
                let mut channel_list = channels.args().tail_ordinals(2);
                channel_list.sort_by(f64::total_cmp);
                let mut by_type_list = by_type.args().tail_ordinals(2);
                by_type_list.sort_by(f64::total_cmp);

                Ok(Self {
                    number: ordinal_of(index)?,
                    identifier: identifier_of(index)?,
                    label: args.str(2)?.to_string(),
                    absolute: args.bool(3)?,
                    locked: args.bool(4)?,
                    channels: channel_list,
                    by_type_channels: by_type_list,
                })
            }

            fn ordinal(&self) -> f64 {
                self.number
            }

            fn identifier(&self) -> Uuid {
                self.identifier
            }
        }
    };
}

palette_record!(IntensityPalette, RecordTarget::IntensityPalette);
palette_record!(FocusPalette, RecordTarget::FocusPalette);
palette_record!(ColorPalette, RecordTarget::ColorPalette);
palette_record!(BeamPalette, RecordTarget::BeamPalette);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Argument;

    #[test]
    fn color_palette_parses_three_messages() {
        let identifier = Uuid::new_v4();
        let index = Message::new(
            "/get/cp/5/list/0/5",
            vec![
                Argument::Int(0),
                identifier.to_string().into(),
                "Lavender".into(),
                Argument::Bool(false),
                Argument::Bool(true),
            ],
        );
        let channels = Message::new(
            "/get/cp/5/channels/list/0/3",
            vec![
                Argument::Int(0),
                identifier.to_string().into(),
                "1-2".into(),
            ],
        );
        let by_type = Message::new(
            "/get/cp/5/byType/list/0/2",
            vec![Argument::Int(0), identifier.to_string().into()],
        );

        let palette = ColorPalette::try_parse(&[channels, by_type, index]).unwrap();
        assert_eq!(palette.number, 5.0);
        assert_eq!(palette.label, "Lavender");
        assert!(palette.locked);
        assert_eq!(palette.channels, vec![1.0, 2.0]);
        assert!(palette.by_type_channels.is_empty());
    }

    #[test]
    fn families_declare_their_own_target() {
        assert_eq!(IntensityPalette::TARGET, RecordTarget::IntensityPalette);
        assert_eq!(FocusPalette::TARGET, RecordTarget::FocusPalette);
        assert_eq!(ColorPalette::TARGET, RecordTarget::ColorPalette);
        assert_eq!(BeamPalette::TARGET, RecordTarget::BeamPalette);
    }
}
