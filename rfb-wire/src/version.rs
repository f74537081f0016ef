//! RFB protocol version line handling.

/// Length of the version line: `"RFB xxx.yyy\n"`.
pub const VERSION_LINE_LEN: usize = 12;

/// Negotiated RFB protocol version, parsed from the server's version line.
///
/// The server announces twelve ASCII bytes shaped like `RFB 003.008\n`; the
/// client echoes them back verbatim (claiming the same version) and keeps the
/// parsed major/minor numbers to route the rest of the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl ProtocolVersion {
    /// Parse the server's 12-byte version line.
    ///
    /// Returns `None` when the line does not open with the `RFB ` marker,
    /// which means the peer is not speaking this protocol at all. Each
    /// version number is taken from the first non-`'0'` of its three ASCII
    /// digits (falling back to the last digit), so `003.008` parses as 3.8.
    pub fn parse(line: &[u8]) -> Option<Self> {
        if line.len() < VERSION_LINE_LEN || &line[..4] != b"RFB " {
            return None;
        }
        Some(Self {
            major: pick_digit(line[4], line[5], line[6]),
            minor: pick_digit(line[8], line[9], line[10]),
        })
    }

    /// True for versions before 3.7, which negotiate security through a
    /// single server-chosen 4-byte word instead of an offered list.
    pub fn is_pre_3_7(&self) -> bool {
        self.major == 3 && self.minor < 7
    }

    /// True for 3.7 and older. These versions send no SecurityResult after
    /// the None security type and no reason text after a failure.
    pub fn is_at_most_3_7(&self) -> bool {
        self.major == 3 && self.minor <= 7
    }
}

fn pick_digit(a: u8, b: u8, c: u8) -> u8 {
    let digit = if a != b'0' {
        a
    } else if b != b'0' {
        b
    } else {
        c
    };
    digit.wrapping_sub(b'0')
}
