//! `Bluesink` Constants
//!
//! Limits, default values and the event codes understood by the sink handlers.

/// Depth of the event dispatcher queue
pub const EVENT_QUEUE_DEPTH: usize = 10;

/// Maximum number of bytes a copied work item payload can hold
pub const MAX_PAYLOAD_LENGTH: usize = 32;

/// Maximum device name length in bytes
pub const MAX_DEVICE_NAME_LENGTH: usize = 32;

/// `BD_ADDR` length in bytes
pub const BD_ADDR_LENGTH: usize = 6;

/// Device name announced after initialization
pub const DEFAULT_DEVICE_NAME: &str = "ESP32_AUDIO";

/// Link supervision ticks allowed in `Connecting` before reverting to `Disconnected`
pub const DEFAULT_CONNECT_TIMEOUT_TICKS: u32 = 10;

/// Default renderer sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Size of the buffer used for HCI packet reads
pub const HCI_READ_BUFFER_SIZE: usize = 255;

/// Event codes for the stack lifecycle handler
pub mod stack_event {
    /// Radio stack is up, become discoverable and connectable
    pub const STACK_UP: u16 = 0;
    /// Radio stack is going down, stop scanning
    pub const STACK_DOWN: u16 = 1;
}

/// Event codes for the sink command handler
pub mod command {
    /// Connect to the remembered host
    pub const RECONNECT: u16 = 0;
    /// Disconnect from the connected host
    pub const DISCONNECT: u16 = 1;
    /// Change the advertised device name (payload: UTF-8 name)
    pub const SET_DEVICE_NAME: u16 = 2;
}

/// Event codes for the profile event handler
pub mod profile_event {
    /// Link connection state changed (payload: state byte followed by `BD_ADDR`)
    pub const CONNECTION_STATE: u16 = 0;
    /// Media stream state changed (payload: state byte)
    pub const AUDIO_STATE: u16 = 1;
    /// Periodic link supervision tick
    pub const TICK: u16 = 2;
}
