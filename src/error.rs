//! Unified error types for the weather panel.
//!
//! One top-level `Error` enum that every subsystem converts into, so the
//! control loop handles failures uniformly. All variants are `Copy` so they
//! can be handed to the supervisor and event sink without allocation.
//!
//! None of these are fatal. Poll errors become `ServiceState` transitions,
//! parse errors drop the offending message, navigation errors are ignored.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// WiFi association failed or the link dropped.
    Transport(TransportError),
    /// Environmental sensor could not be acquired or read.
    Device(DeviceError),
    /// Broker connect/subscribe/publish/receive failed.
    Broker(BrokerError),
    /// An inbound message was malformed.
    Parse(ParseError),
    /// A navigation request named a screen that does not exist.
    Navigation(NavigationError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Device(e) => write!(f, "device: {e}"),
            Self::Broker(e) => write!(f, "broker: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Navigation(e) => write!(f, "navigation: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport (WiFi)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No SSID configured.
    NoCredentials,
    /// SSID must be 1-32 printable ASCII bytes.
    InvalidSsid,
    /// Password must be empty (open network) or 8-64 bytes.
    InvalidPassword,
    /// The access point did not accept the association.
    AssociationFailed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid"),
            Self::InvalidPassword => write!(f, "password invalid"),
            Self::AssociationFailed => write!(f, "association failed"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Device (environmental sensor)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// Nothing answered on the bus.
    NotFound,
    /// A device answered but with the wrong chip id.
    WrongChip(u8),
    /// Bus transfer failed mid-read.
    BusError,
    /// Read attempted without an acquired handle.
    NotAcquired,
    /// The device returned a physically implausible value.
    OutOfRange,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "sensor not found"),
            Self::WrongChip(id) => write!(f, "unexpected chip id 0x{id:02X}"),
            Self::BusError => write!(f, "bus error"),
            Self::NotAcquired => write!(f, "sensor handle not acquired"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

// ---------------------------------------------------------------------------
// Broker (MQTT)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerError {
    /// TCP/MQTT handshake failed or timed out.
    ConnectFailed,
    /// Subscription request was rejected or could not be queued.
    SubscribeFailed,
    /// Publish could not be queued.
    PublishFailed,
    /// The connection dropped while receiving.
    ConnectionLost,
    /// Operation attempted without an open client.
    NotConnected,
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::ConnectionLost => write!(f, "connection lost"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

impl From<BrokerError> for Error {
    fn from(e: BrokerError) -> Self {
        Self::Broker(e)
    }
}

// ---------------------------------------------------------------------------
// Parse (inbound messages)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Payload bytes are not valid UTF-8.
    InvalidUtf8,
    /// Payload is not valid JSON.
    InvalidJson,
    /// Top-level JSON value is not an object.
    NotAnObject,
    /// A required field is absent.
    MissingField(&'static str),
    /// A field is present with the wrong JSON type or an unknown value.
    InvalidField(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8 => write!(f, "payload is not UTF-8"),
            Self::InvalidJson => write!(f, "payload is not valid JSON"),
            Self::NotAnObject => write!(f, "payload is not a JSON object"),
            Self::MissingField(name) => write!(f, "missing field `{name}`"),
            Self::InvalidField(name) => write!(f, "invalid field `{name}`"),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    /// No screen with this name/index exists.
    UnknownScreen,
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownScreen => write!(f, "unknown screen"),
        }
    }
}

impl From<NavigationError> for Error {
    fn from(e: NavigationError) -> Self {
        Self::Navigation(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
