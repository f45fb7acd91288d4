//! Protocol stack
//!
//! Everything above the Ethernet device: addressing and ARP, IPv4, ICMP
//! echo, UDP, the DHCP and SNTP clients, the TCP engine and the [`Lan`]
//! facade that ties them to one shared frame buffer.
//!
//! # Layout
//!
//! | Module    | Role                                           |
//! |-----------|------------------------------------------------|
//! | `config`  | [`LanConfig`] builder and protocol toggles     |
//! | `arp`     | Fixed-size ARP cache                           |
//! | `iface`   | Ethernet/ARP/IPv4 send, reply and resend paths |
//! | `icmp`    | Echo responder                                 |
//! | `udp`     | Datagram send/reply, [`UdpDatagram`] handle    |
//! | `dhcp`    | Lease negotiation and renewal                  |
//! | `sntp`    | Time query                                     |
//! | `tcp`     | Connection pool and state machine              |
//! | `handler` | [`LanHandler`] application callbacks           |
//! | `lan`     | [`Lan`] facade and poll loop                   |

mod arp;
mod config;
mod dhcp;
mod handler;
mod icmp;
mod iface;
mod lan;
mod sntp;
mod tcp;
mod udp;

pub use arp::{ArpCache, ArpEntry};
pub use config::{IpConfig, LanConfig, Protocols, TcpTimeout};
pub use dhcp::DhcpStatus;
pub use handler::LanHandler;
pub use lan::Lan;
pub use sntp::SntpStatus;
pub use tcp::{ConnectionId, TcpOptions, TcpRequest, TcpSocket, TcpStatus};
pub use udp::UdpDatagram;
