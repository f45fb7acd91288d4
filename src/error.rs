//! Error types for the ENC28J60 LAN stack
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Initialization and configuration failures
//! - [`NetError`]: Protocol-level failures on outward operations
//! - [`IoError`]: Driver and SPI failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by the facade methods. Inbound protocol violations never produce an
//! error: such frames are dropped without a trace.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and initialization errors
///
/// These errors occur during stack setup or controller initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Stack already initialized
    AlreadyInitialized,
    /// Invalid configuration parameter
    InvalidConfig,
    /// DHCP or SNTP enabled while UDP is disabled
    ProtocolDependency,
    /// Controller did not come out of reset
    ResetFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::AlreadyInitialized => "already initialized",
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::ProtocolDependency => "protocol requires UDP",
            ConfigError::ResetFailed => "controller reset failed",
        }
    }
}

// =============================================================================
// Network Errors
// =============================================================================

/// Protocol-level errors
///
/// Returned by operations the application initiates (opening a connection,
/// sending a datagram). A failed send drops the datagram; nothing is queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetError {
    /// Next hop not in the ARP cache; a request was broadcast instead
    Unresolved,
    /// Every TCP connection slot is in use
    NoFreeConnection,
    /// Connection id does not name a slot of the pool
    InvalidConnection,
    /// Connection is not in the ESTABLISHED state
    NotEstablished,
    /// Payload does not fit in the shared frame buffer
    PayloadTooLarge,
    /// Protocol disabled in the stack configuration
    ProtocolDisabled,
}

impl core::fmt::Display for NetError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NetError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            NetError::Unresolved => "address unresolved",
            NetError::NoFreeConnection => "no free connection slot",
            NetError::InvalidConnection => "invalid connection id",
            NetError::NotEstablished => "connection not established",
            NetError::PayloadTooLarge => "payload too large for frame buffer",
            NetError::ProtocolDisabled => "protocol disabled",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Driver and bus errors
///
/// These errors occur while talking to the Ethernet controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Operation timed out
    Timeout,
    /// Invalid state for operation (e.g., not initialized)
    InvalidState,
    /// Buffer too small for the frame
    BufferTooSmall,
    /// SPI transaction failed
    Spi,
    /// Transmission aborted after repeated TX logic resets
    TxAborted,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
            IoError::InvalidState => "invalid state for operation",
            IoError::BufferTooSmall => "buffer too small for frame",
            IoError::Spi => "SPI transfer failed",
            IoError::TxAborted => "transmission aborted",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match lan.tcp_open(addr, 80, 40000) {
///     Err(Error::Net(NetError::Unresolved)) => { /* retry next tick */ }
///     Err(Error::Net(NetError::NoFreeConnection)) => { /* pool exhausted */ }
///     Err(Error::Io(IoError::Spi)) => { /* bus failure */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Network error
    Net(NetError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Net(e) => write!(f, "net: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<NetError> for Error {
    fn from(e: NetError) -> Self {
        Error::Net(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for stack operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for network operations
pub type NetResult<T> = core::result::Result<T, NetError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn config_error_as_str_non_empty() {
        let variants = [
            ConfigError::AlreadyInitialized,
            ConfigError::InvalidConfig,
            ConfigError::ProtocolDependency,
            ConfigError::ResetFailed,
        ];

        for variant in variants {
            assert!(!variant.as_str().is_empty(), "ConfigError::{variant:?} has empty string");
        }
    }

    #[test]
    fn config_error_display() {
        let display = format!("{}", ConfigError::ProtocolDependency);
        assert_eq!(display, "protocol requires UDP");
    }

    #[test]
    fn net_error_as_str_non_empty() {
        let variants = [
            NetError::Unresolved,
            NetError::NoFreeConnection,
            NetError::InvalidConnection,
            NetError::NotEstablished,
            NetError::PayloadTooLarge,
            NetError::ProtocolDisabled,
        ];

        for variant in variants {
            assert!(!variant.as_str().is_empty(), "NetError::{variant:?} has empty string");
        }
    }

    #[test]
    fn net_error_display() {
        let display = format!("{}", NetError::NoFreeConnection);
        assert_eq!(display, "no free connection slot");
    }

    #[test]
    fn io_error_as_str_non_empty() {
        let variants = [
            IoError::Timeout,
            IoError::InvalidState,
            IoError::BufferTooSmall,
            IoError::Spi,
            IoError::TxAborted,
        ];

        for variant in variants {
            assert!(!variant.as_str().is_empty(), "IoError::{variant:?} has empty string");
        }
    }

    #[test]
    fn io_error_equality() {
        assert_eq!(IoError::Spi, IoError::Spi);
        assert_ne!(IoError::Spi, IoError::Timeout);
    }

    // =========================================================================
    // Unified Error Tests
    // =========================================================================

    #[test]
    fn error_from_domain_errors() {
        assert_eq!(
            Error::from(ConfigError::InvalidConfig),
            Error::Config(ConfigError::InvalidConfig)
        );
        assert_eq!(Error::from(NetError::Unresolved), Error::Net(NetError::Unresolved));
        assert_eq!(Error::from(IoError::TxAborted), Error::Io(IoError::TxAborted));
    }

    #[test]
    fn error_display_prefixes_domain() {
        let config = format!("{}", Error::Config(ConfigError::ResetFailed));
        assert!(config.starts_with("config:"));
        assert!(config.contains("reset"));

        let net = format!("{}", Error::Net(NetError::NotEstablished));
        assert!(net.starts_with("net:"));
        assert!(net.contains("established"));

        let io = format!("{}", Error::Io(IoError::BufferTooSmall));
        assert!(io.starts_with("io:"));
        assert!(io.contains("buffer"));
    }

    #[test]
    fn question_mark_converts_domain_errors() {
        fn open() -> Result<u8> {
            let slot: NetResult<u8> = Err(NetError::NoFreeConnection);
            Ok(slot?)
        }

        assert_eq!(open(), Err(Error::Net(NetError::NoFreeConnection)));
    }
}
