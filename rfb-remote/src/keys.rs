//! Key codes understood by the set-top box.
//!
//! These live in a private range above the standard keysym space and were
//! mapped out by probing the device, so names follow the buttons on the
//! physical remote rather than any published table.

pub const POWER: u16 = 0xe000;
pub const OK: u16 = 0xe001;
pub const BACK: u16 = 0xe002;
pub const CHANNEL_UP: u16 = 0xe006;
pub const CHANNEL_DOWN: u16 = 0xe007;
pub const HELP: u16 = 0xe009;
pub const MENU: u16 = 0xe00a;
pub const GUIDE: u16 = 0xe00b;
pub const INFO: u16 = 0xe00e;
pub const TEXT: u16 = 0xe00f;

pub const DPAD_UP: u16 = 0xe100;
pub const DPAD_DOWN: u16 = 0xe101;
pub const DPAD_LEFT: u16 = 0xe102;
pub const DPAD_RIGHT: u16 = 0xe103;

pub const NUM_0: u16 = 0xe300;
pub const NUM_1: u16 = 0xe301;
pub const NUM_2: u16 = 0xe302;
pub const NUM_3: u16 = 0xe303;
pub const NUM_4: u16 = 0xe304;
pub const NUM_5: u16 = 0xe305;
pub const NUM_6: u16 = 0xe306;
pub const NUM_7: u16 = 0xe307;
pub const NUM_8: u16 = 0xe308;
pub const NUM_9: u16 = 0xe309;

pub const PAUSE: u16 = 0xe400;
pub const STOP: u16 = 0xe402;
pub const RECORD: u16 = 0xe403;
pub const FAST_FORWARD: u16 = 0xe405;
pub const REWIND: u16 = 0xe407;

pub const ON_DEMAND: u16 = 0xef28;
pub const DVR: u16 = 0xef29;
pub const TV: u16 = 0xef2a;

/// The digit keys in order, for dialing a channel number.
pub const DIGITS: [u16; 10] = [
    NUM_0, NUM_1, NUM_2, NUM_3, NUM_4, NUM_5, NUM_6, NUM_7, NUM_8, NUM_9,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_map_to_their_codes() {
        for (digit, &code) in DIGITS.iter().enumerate() {
            assert_eq!(code, 0xe300 + digit as u16);
        }
    }
}
