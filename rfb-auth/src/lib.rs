//! Security negotiation and VNC authentication.
//!
//! This crate covers the two authentication-related pieces of the client:
//! picking one security type out of the server's offered list, and answering
//! a VNC authentication challenge with DES.
//!
//! # Security Types
//!
//! The client recognizes four type codes. ARD wins outright whenever the
//! server offers it; otherwise the first offer that is None, VNC or Tight is
//! taken in the server's list order. Of those, only None and VNC actually
//! complete - the ARD and Tight flows stop at selection (see
//! [`SECURITY_ARD`] and [`SECURITY_TIGHT`]).
//!
//! # VNC Authentication
//!
//! The server sends a 16-byte random challenge; the client replies with the
//! challenge encrypted as two independent DES-ECB blocks under a key derived
//! from the password. The DES primitive comes from the RustCrypto `des`
//! crate, behind the [`ChallengeCipher`] seam so the engine never names a
//! concrete cipher.

pub mod security;
pub mod vnc;

pub use security::{
    choose_security_type, SECURITY_ARD, SECURITY_NONE, SECURITY_TIGHT, SECURITY_VNC,
};
pub use vnc::{challenge_response, derive_key, ChallengeCipher, DesCipher, CHALLENGE_LEN};
