//! VNC authentication: key derivation and challenge encryption.

use des::cipher::{BlockEncrypt, KeyInit};
use des::Des;

/// Length of the server's VNC authentication challenge.
pub const CHALLENGE_LEN: usize = 16;

/// Derive the 8-byte cipher key from a password.
///
/// The first 8 password bytes are used as-is, zero-padded when the password
/// is shorter. Bytes beyond the eighth are ignored. No per-byte bit
/// reversal is applied to the key material.
pub fn derive_key(password: &[u8]) -> [u8; 8] {
    let mut key = [0u8; 8];
    let take = password.len().min(8);
    key[..take].copy_from_slice(&password[..take]);
    key
}

/// An 8-byte ECB block cipher keyed for one authentication attempt.
///
/// The engine talks to the cipher through this trait so the concrete
/// primitive is an injection point; [`DesCipher`] is the default the
/// protocol actually requires.
pub trait ChallengeCipher {
    /// Build the cipher from a derived 8-byte key.
    fn with_key(key: [u8; 8]) -> Self;

    /// Encrypt one 8-byte block in place.
    fn encrypt_block(&self, block: &mut [u8; 8]);
}

/// DES block cipher from the RustCrypto `des` crate.
pub struct DesCipher {
    inner: Des,
}

impl ChallengeCipher for DesCipher {
    fn with_key(key: [u8; 8]) -> Self {
        Self {
            inner: Des::new(&key.into()),
        }
    }

    fn encrypt_block(&self, block: &mut [u8; 8]) {
        self.inner.encrypt_block(block.into());
    }
}

/// Encrypt a 16-byte challenge into the 16-byte response.
///
/// The two 8-byte halves are encrypted independently (ECB); the ciphertext
/// is the encryption of the challenge itself, not of any fixed plaintext.
pub fn challenge_response<C: ChallengeCipher>(
    cipher: &C,
    challenge: &[u8; CHALLENGE_LEN],
) -> [u8; CHALLENGE_LEN] {
    let mut response = *challenge;
    let (lo, hi) = response.split_at_mut(8);
    for half in [lo, hi] {
        let mut block = [0u8; 8];
        block.copy_from_slice(half);
        cipher.encrypt_block(&mut block);
        half.copy_from_slice(&block);
    }
    tracing::trace!("encrypted 16-byte authentication challenge");
    response
}
