//! Key table for the teleoperation keys

use super::Command;
use std::collections::HashMap;
use tracing::debug;

pub const KEY_SPACE: u8 = 0x20;
pub const KEY_W: u8 = 0x77;
pub const KEY_S: u8 = 0x73;
pub const KEY_A: u8 = 0x61;
pub const KEY_D: u8 = 0x64;
pub const KEY_Z: u8 = 0x7a;
pub const KEY_C: u8 = 0x63;

/// Printed once at startup
pub const HELP_BANNER: &str = "\
Moving around:
        w
   a    s    d
   z         c

w/s : +/- forward velocity
a/d : +/- right velocity
z/c : +/- angular velocity
space : stop the robot

CTRL-C : quit
";

/// Byte to command lookup
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<u8, Command>,
}

impl KeyMap {
    /// Standard layout: w/s forward, a/d right, z/c angular, space stop
    pub fn default_config() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(KEY_W, Command::IncreaseForward);
        bindings.insert(KEY_S, Command::DecreaseForward);
        bindings.insert(KEY_A, Command::DecreaseRight);
        bindings.insert(KEY_D, Command::IncreaseRight);
        bindings.insert(KEY_Z, Command::IncreaseAngular);
        bindings.insert(KEY_C, Command::DecreaseAngular);
        bindings.insert(KEY_SPACE, Command::Stop);

        Self { bindings }
    }

    /// Looks up the command for `byte`; unbound bytes are `NoOp`
    pub fn map(&self, byte: u8) -> Command {
        let command = self
            .bindings
            .get(&byte)
            .copied()
            .unwrap_or(Command::NoOp);
        debug!("Key 0x{:02x} mapped to {}", byte, command);
        command
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b'w', Command::IncreaseForward)]
    #[case(b's', Command::DecreaseForward)]
    #[case(b'a', Command::DecreaseRight)]
    #[case(b'd', Command::IncreaseRight)]
    #[case(b'z', Command::IncreaseAngular)]
    #[case(b'c', Command::DecreaseAngular)]
    #[case(b' ', Command::Stop)]
    #[case(b'q', Command::NoOp)]
    #[case(b'x', Command::NoOp)]
    #[case(b'W', Command::NoOp)]
    #[case(0x1b, Command::NoOp)]
    #[case(0x03, Command::NoOp)]
    fn maps_literal_ascii(#[case] byte: u8, #[case] expected: Command) {
        assert_eq!(KeyMap::default_config().map(byte), expected);
    }

    #[test]
    fn only_seven_bytes_are_bound() {
        let keymap = KeyMap::default_config();
        let bound = (0..=u8::MAX)
            .filter(|byte| keymap.map(*byte) != Command::NoOp)
            .count();
        assert_eq!(bound, 7);
        assert_eq!(keymap.len(), 7);
    }

    #[test]
    fn mapping_is_deterministic() {
        let keymap = KeyMap::default();
        for byte in 0..=u8::MAX {
            assert_eq!(keymap.map(byte), keymap.map(byte));
        }
    }

    #[test]
    fn banner_names_every_binding() {
        for key in ["w/s", "a/d", "z/c", "space", "CTRL-C"] {
            assert!(HELP_BANNER.contains(key), "banner misses {key}");
        }
    }
}
