//! Security-type codes and selection among the server's offer.

/// Security type constant: no authentication.
pub const SECURITY_NONE: u8 = 1;
/// Security type constant: VNC authentication (DES challenge/response).
pub const SECURITY_VNC: u8 = 2;
/// Security type constant: Tight authentication. Selectable but its
/// negotiation is not implemented; a connection that lands here stalls.
pub const SECURITY_TIGHT: u8 = 16;
/// Security type constant: Apple Remote Desktop authentication. Preferred
/// whenever offered; its challenge handling is a stub (see the engine).
pub const SECURITY_ARD: u8 = 30;

/// Pick one security type from the server's offered list.
///
/// ARD takes priority over everything else, regardless of where it sits in
/// the list. Failing that, the first offer (in the server's order, not
/// ours) that is None, VNC or Tight wins. Returns `None` when nothing in
/// the list is recognized.
pub fn choose_security_type(offered: &[u8]) -> Option<u8> {
    if offered.contains(&SECURITY_ARD) {
        return Some(SECURITY_ARD);
    }
    offered
        .iter()
        .copied()
        .find(|t| matches!(*t, SECURITY_NONE | SECURITY_VNC | SECURITY_TIGHT))
}
