//! SNTP message (RFC 4330), client side only

use super::read_u32;

/// Message length without authenticator
pub const PACKET_LEN: usize = 48;

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970)
pub const UNIX_EPOCH_OFFSET: u32 = 0x83AA_7E80;

/// Leap indicator "unsynchronized", version 3, mode client
pub const CLIENT_FLAGS: u8 = 0xC0 | 0x18 | 0x03;

/// Poll interval exponent sent in requests
pub const POLL_INTERVAL: u8 = 10;

/// Precision exponent sent in requests (about 15 ms)
pub const PRECISION: u8 = 0xFA;

const FLAGS: usize = 0;
const POLL: usize = 2;
const PRECISION_FIELD: usize = 3;
const TRANSMIT_SECONDS: usize = 40;

/// Write a client request to the start of `buf`
///
/// # Panics
///
/// Panics if `buf` is shorter than [`PACKET_LEN`].
pub fn emit_request(buf: &mut [u8]) {
    buf[..PACKET_LEN].fill(0);
    buf[FLAGS] = CLIENT_FLAGS;
    buf[POLL] = POLL_INTERVAL;
    buf[PRECISION_FIELD] = PRECISION;
}

/// Unix time (seconds) from the server's transmit timestamp
pub fn unix_time(buf: &[u8]) -> Option<u32> {
    if buf.len() < PACKET_LEN {
        return None;
    }
    Some(read_u32(buf, TRANSMIT_SECONDS).wrapping_sub(UNIX_EPOCH_OFFSET))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_layout() {
        let mut buf = [0xEEu8; PACKET_LEN];
        emit_request(&mut buf);

        assert_eq!(&buf[..4], &[0xDB, 0, 10, 0xFA]);
        assert!(buf[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn transmit_timestamp_to_unix() {
        let mut buf = [0u8; PACKET_LEN];
        // 2024-01-01T00:00:00Z = 1704067200 Unix
        let ntp_seconds = 1_704_067_200u32 + UNIX_EPOCH_OFFSET;
        buf[40..44].copy_from_slice(&ntp_seconds.to_be_bytes());

        assert_eq!(unix_time(&buf), Some(1_704_067_200));
        assert_eq!(unix_time(&buf[..47]), None);
    }
}
