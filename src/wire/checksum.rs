//! Internet checksum (RFC 1071)
//!
//! One accumulator serves the IPv4 header, ICMP, UDP and TCP. For UDP and
//! TCP the caller seeds the sum with `length + protocol` and starts the span
//! 8 bytes before the transport header, so the source and destination
//! addresses of the IP header are covered too. Together this is exactly the
//! RFC 768/793 pseudo-header sum without building one.

/// Sum `data` as big-endian 16-bit words on top of `seed`, fold the carries
/// and return the ones-complement.
///
/// An odd trailing byte counts as the high byte of a zero-padded word. The
/// result is in host order; store it with `to_be_bytes`.
#[must_use]
pub fn checksum(seed: u32, data: &[u8]) -> u16 {
    let mut sum = seed;
    let mut words = data.chunks_exact(2);
    for word in words.by_ref() {
        sum = sum.wrapping_add(u32::from(u16::from_be_bytes([word[0], word[1]])));
    }
    if let [last] = words.remainder() {
        sum = sum.wrapping_add(u32::from(*last) << 8);
    }
    !fold(sum)
}

/// Ones-complement add of `delta` to a stored checksum.
///
/// Used when a single header word changes by a known amount, as when an echo
/// request's type byte becomes an echo reply.
#[must_use]
pub fn adjust(checksum: u16, delta: u16) -> u16 {
    fold(u32::from(checksum) + u32::from(delta))
}

fn fold(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}
