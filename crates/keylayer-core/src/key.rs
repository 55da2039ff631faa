// Keylayer Key Codes
// Closed vocabulary of key identifiers understood by the remapping engine

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// A physical or virtual key as named by the remapping engine.
///
/// The serialized spelling (both through serde and through `Display`/`FromStr`)
/// is exactly the engine's `key_code` string, e.g. `return_or_enter` or `1`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    #[serde(rename = "1")]
    #[strum(serialize = "1")]
    Num1,
    #[serde(rename = "2")]
    #[strum(serialize = "2")]
    Num2,
    #[serde(rename = "3")]
    #[strum(serialize = "3")]
    Num3,
    #[serde(rename = "4")]
    #[strum(serialize = "4")]
    Num4,
    #[serde(rename = "5")]
    #[strum(serialize = "5")]
    Num5,
    #[serde(rename = "6")]
    #[strum(serialize = "6")]
    Num6,
    #[serde(rename = "7")]
    #[strum(serialize = "7")]
    Num7,
    #[serde(rename = "8")]
    #[strum(serialize = "8")]
    Num8,
    #[serde(rename = "9")]
    #[strum(serialize = "9")]
    Num9,
    #[serde(rename = "0")]
    #[strum(serialize = "0")]
    Num0,
    ReturnOrEnter,
    Escape,
    DeleteOrBackspace,
    DeleteForward,
    Tab,
    Spacebar,
    Hyphen,
    EqualSign,
    OpenBracket,
    CloseBracket,
    Backslash,
    NonUsPound,
    Semicolon,
    Quote,
    GraveAccentAndTilde,
    Comma,
    Period,
    Slash,
    NonUsBackslash,
    CapsLock,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    PrintScreen,
    ScrollLock,
    Pause,
    Insert,
    Home,
    PageUp,
    End,
    PageDown,
    RightArrow,
    LeftArrow,
    DownArrow,
    UpArrow,
    LeftControl,
    LeftShift,
    LeftOption,
    LeftCommand,
    RightControl,
    RightShift,
    RightOption,
    RightCommand,
    Fn,
    Application,
    Mute,
    VolumeDecrement,
    VolumeIncrement,
    DisplayBrightnessDecrement,
    DisplayBrightnessIncrement,
    IlluminationDecrement,
    IlluminationIncrement,
    MissionControl,
    Launchpad,
    Rewind,
    PlayOrPause,
    Fastforward,
}

impl KeyCode {
    /// The engine's name for this key
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Keys on the consumer usage page (`consumer_key_code` in the engine schema)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConsumerKeyCode {
    Dictation,
    PlayOrPause,
    Fastforward,
    Rewind,
    Scan,
    Mute,
    VolumeIncrement,
    VolumeDecrement,
    DisplayBrightnessIncrement,
    DisplayBrightnessDecrement,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_key_code_display_matches_engine_names() {
        assert_eq!(KeyCode::ReturnOrEnter.to_string(), "return_or_enter");
        assert_eq!(KeyCode::Num1.to_string(), "1");
        assert_eq!(KeyCode::F5.to_string(), "f5");
        assert_eq!(KeyCode::Spacebar.to_string(), "spacebar");
        assert_eq!(KeyCode::GraveAccentAndTilde.to_string(), "grave_accent_and_tilde");
    }

    #[test]
    fn test_key_code_from_str() {
        assert_eq!(KeyCode::from_str("delete_or_backspace"), Ok(KeyCode::DeleteOrBackspace));
        assert_eq!(KeyCode::from_str("0"), Ok(KeyCode::Num0));
        assert!(KeyCode::from_str("not_a_key").is_err());
        assert_eq!(KeyCode::PageDown.name(), "page_down");
    }

    #[test]
    fn test_serde_and_strum_spellings_agree() {
        for key in KeyCode::iter() {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key));
        }
    }

    #[test]
    fn test_consumer_key_code_serialization() {
        let json = serde_json::to_string(&ConsumerKeyCode::Dictation).unwrap();
        assert_eq!(json, "\"dictation\"");
    }
}
