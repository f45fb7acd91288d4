//! ICMP echo responder

use super::iface::Interface;
use crate::wire::checksum::adjust;
use crate::wire::icmp::{self, ECHO_REPLY, ECHO_REQUEST, IcmpEcho};
use crate::wire::TRANSPORT_OFFSET;

/// Difference between the request and reply type words in the checksum sum
const ECHO_TYPE_DELTA: u16 = (ECHO_REQUEST as u16) << 8;

/// Turn an echo request into a reply in place and send it back
///
/// The checksum is patched incrementally: only the type byte changes, so the
/// stored sum moves by a known constant. Every other message is ignored.
pub(crate) fn filter(iface: &mut dyn Interface, frame: &mut [u8], len: usize) {
    let Some(message) = frame.get_mut(TRANSPORT_OFFSET..TRANSPORT_OFFSET + len) else {
        return;
    };
    let Some(echo) = IcmpEcho::parse(message) else {
        return;
    };
    if echo.msg_type != ECHO_REQUEST {
        return;
    }

    icmp::set_type(message, ECHO_REPLY);
    icmp::set_checksum(message, adjust(icmp::stored_checksum(message), ECHO_TYPE_DELTA));

    if let Err(_err) = iface.ip_reply(frame, len) {
        #[cfg(feature = "defmt")]
        defmt::warn!("ICMP echo reply dropped: {}", _err);
    }
}
