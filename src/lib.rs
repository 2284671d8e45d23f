#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::too_many_lines)]

#[cfg(test)]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod address;
pub mod api;
pub mod console;
pub mod constants;
pub mod dispatcher;
pub mod processor;
pub mod renderer;
mod sink;
pub mod stack;

#[cfg(test)]
pub(crate) mod testing;

pub use address::PeerAddress;
pub use api::{SinkController, SinkDispatcher};
pub use dispatcher::{DispatchError, Dispatcher, Handler, Payload};
pub use renderer::{AudioRenderer, BitDepth, I2sPort, OutputMode, RendererConfig};
pub use sink::{CommandOutcome, Sink};
pub use stack::{DriverError, MemoryStore, PeerStore, RadioStack};

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_TICKS, DEFAULT_DEVICE_NAME, MAX_DEVICE_NAME_LENGTH};

/// A2DP link connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LinkState {
    /// No link to the host
    #[default]
    Disconnected = 0,
    /// Connect directive issued or inbound connection in progress
    Connecting = 1,
    /// Link established
    Connected = 2,
    /// Disconnect directive issued, waiting for confirmation
    Disconnecting = 3,
}

impl TryFrom<u8> for LinkState {
    type Error = SinkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Disconnected),
            1 => Ok(Self::Connecting),
            2 => Ok(Self::Connected),
            3 => Ok(Self::Disconnecting),
            _ => Err(SinkError::InvalidParameter),
        }
    }
}

/// A2DP media stream state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AudioState {
    /// Stream suspended by the remote host
    RemoteSuspend = 0,
    /// No stream
    #[default]
    Stopped = 1,
    /// Audio is being received and rendered
    Playing = 2,
}

impl TryFrom<u8> for AudioState {
    type Error = SinkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::RemoteSuspend),
            1 => Ok(Self::Stopped),
            2 => Ok(Self::Playing),
            _ => Err(SinkError::InvalidParameter),
        }
    }
}

/// Radio visibility mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanMode {
    /// Invisible and refusing inbound connections
    #[default]
    None,
    /// Accepts inbound connections but is not discoverable
    Connectable,
    /// Visible and accepting inbound connections
    ConnectableDiscoverable,
}

/// Authoritative record of the sink's connection and playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionState {
    /// Media stream state
    pub audio_state: AudioState,
    /// Link connection state
    pub link_state: LinkState,
    /// Last host that connected; `PeerAddress::UNSET` if none
    pub remembered_peer: PeerAddress,
}

/// Notification delivered by the profile stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileEvent {
    /// Link connection state changed for `peer`
    ConnectionState {
        /// Remote host
        peer: PeerAddress,
        /// New link state
        state: LinkState,
    },
    /// Media stream state changed
    AudioState(AudioState),
}

/// Errors surfaced by the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Radio controller initialization failed
    ControllerInitFailed,
    /// Radio controller enable failed
    ControllerEnableFailed,
    /// Profile stack initialization failed
    ProfileStackInitFailed,
    /// Profile stack enable failed
    ProfileStackEnableFailed,
    /// Audio renderer initialization failed
    RendererInitFailed,
    /// Device name could not be applied during initialization
    DeviceNameFailed,
    /// Profile callback registration failed
    CallbackRegistrationFailed,
    /// Event queue is full, the submission was not accepted
    QueueFull,
    /// Event dispatcher is shutting down
    DispatcherClosed,
    /// Invalid parameter provided (e.g., malformed address or oversized name)
    InvalidParameter,
}

impl SinkError {
    /// Whether this error leaves the sink unusable
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ControllerInitFailed
                | Self::ControllerEnableFailed
                | Self::ProfileStackInitFailed
                | Self::ProfileStackEnableFailed
                | Self::RendererInitFailed
                | Self::DeviceNameFailed
                | Self::CallbackRegistrationFailed
        )
    }
}

impl From<DispatchError> for SinkError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::Full => Self::QueueFull,
            DispatchError::Closed => Self::DispatcherClosed,
            DispatchError::PayloadTooLarge => Self::InvalidParameter,
        }
    }
}

/// Options for configuring a `Sink` instance
///
/// # Examples
///
/// ```rust
/// use bluesink::SinkOptions;
///
/// let options = SinkOptions::default().with_connect_timeout_ticks(5);
/// assert_eq!(options.device_name.as_str(), "ESP32_AUDIO");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkOptions {
    /// Name announced to hosts during discovery
    pub device_name: heapless::String<MAX_DEVICE_NAME_LENGTH>,
    /// Link supervision ticks tolerated in `Connecting`; 0 disables the timeout
    pub connect_timeout_ticks: u32,
}

impl SinkOptions {
    /// Replace the device name
    ///
    /// # Errors
    /// Returns `SinkError::InvalidParameter` if the name is empty or longer than
    /// `MAX_DEVICE_NAME_LENGTH` bytes
    pub fn with_device_name(mut self, name: &str) -> Result<Self, SinkError> {
        if name.is_empty() {
            return Err(SinkError::InvalidParameter);
        }
        self.device_name =
            heapless::String::try_from(name).map_err(|()| SinkError::InvalidParameter)?;
        Ok(self)
    }

    /// Replace the connect timeout
    #[must_use]
    pub fn with_connect_timeout_ticks(mut self, ticks: u32) -> Self {
        self.connect_timeout_ticks = ticks;
        self
    }
}

impl Default for SinkOptions {
    fn default() -> Self {
        let mut device_name = heapless::String::new();
        device_name.push_str(DEFAULT_DEVICE_NAME).ok();
        Self {
            device_name,
            connect_timeout_ticks: DEFAULT_CONNECT_TIMEOUT_TICKS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_default_is_zeroed() {
        let state = ConnectionState::default();
        assert_eq!(state.audio_state, AudioState::Stopped);
        assert_eq!(state.link_state, LinkState::Disconnected);
        assert!(state.remembered_peer.is_unset());
    }

    #[test]
    fn test_link_state_from_u8() {
        for state in [
            LinkState::Disconnected,
            LinkState::Connecting,
            LinkState::Connected,
            LinkState::Disconnecting,
        ] {
            assert_eq!(LinkState::try_from(state as u8), Ok(state));
        }
        assert_eq!(LinkState::try_from(4), Err(SinkError::InvalidParameter));
    }

    #[test]
    fn test_audio_state_from_u8() {
        assert_eq!(AudioState::try_from(0), Ok(AudioState::RemoteSuspend));
        assert_eq!(AudioState::try_from(2), Ok(AudioState::Playing));
        assert!(AudioState::try_from(0xFF).is_err());
    }

    #[test]
    fn test_sink_options() {
        let options = SinkOptions::default();
        assert_eq!(options.device_name.as_str(), DEFAULT_DEVICE_NAME);
        assert_eq!(options.connect_timeout_ticks, DEFAULT_CONNECT_TIMEOUT_TICKS);

        let renamed = SinkOptions::default().with_device_name("Kitchen").unwrap();
        assert_eq!(renamed.device_name.as_str(), "Kitchen");

        assert_eq!(
            SinkOptions::default().with_device_name(""),
            Err(SinkError::InvalidParameter)
        );
        let too_long = "0123456789012345678901234567890123";
        assert!(SinkOptions::default().with_device_name(too_long).is_err());

        let no_timeout = SinkOptions::default().with_connect_timeout_ticks(0);
        assert_eq!(no_timeout.connect_timeout_ticks, 0);
    }

    #[test]
    fn test_dispatch_error_mapping() {
        assert_eq!(SinkError::from(DispatchError::Full), SinkError::QueueFull);
        assert_eq!(SinkError::from(DispatchError::Closed), SinkError::DispatcherClosed);
        assert_eq!(
            SinkError::from(DispatchError::PayloadTooLarge),
            SinkError::InvalidParameter
        );
        assert!(SinkError::RendererInitFailed.is_fatal());
        assert!(!SinkError::QueueFull.is_fatal());
    }
}
