//! External collaborators: radio/profile stack and peer persistence
//!
//! The sink never talks to a vendor stack or flash directly. Platforms implement
//! [`RadioStack`] over their Bluetooth stack (ESP-IDF Bluedroid, an HCI host,
//! ...) and [`PeerStore`] over their non-volatile storage.
//!
//! Directives are fire-and-forget: `Ok(())` means the stack accepted the
//! request, and the outcome arrives later as a [`crate::ProfileEvent`].

use crate::{PeerAddress, ScanMode};

/// Status returned by an external driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Vendor status code
    Status(i32),
    /// The driver cannot accept the request right now
    Busy,
    /// The driver does not implement the request
    Unsupported,
}

/// Radio controller and A2DP profile stack
pub trait RadioStack {
    /// Initialize the radio controller
    ///
    /// # Errors
    /// Returns the driver status if the controller cannot be initialized
    fn controller_init(&mut self) -> Result<(), DriverError>;

    /// Enable the radio controller
    ///
    /// # Errors
    /// Returns the driver status if the controller cannot be enabled
    fn controller_enable(&mut self) -> Result<(), DriverError>;

    /// Initialize the host profile stack
    ///
    /// # Errors
    /// Returns the driver status if the profile stack cannot be initialized
    fn profile_stack_init(&mut self) -> Result<(), DriverError>;

    /// Enable the host profile stack
    ///
    /// # Errors
    /// Returns the driver status if the profile stack cannot be enabled
    fn profile_stack_enable(&mut self) -> Result<(), DriverError>;

    /// Register the A2DP sink and remote-control callbacks
    ///
    /// Implementations forward the callbacks they receive to
    /// [`crate::SinkController::notify`].
    ///
    /// # Errors
    /// Returns the driver status if registration fails
    fn register_callbacks(&mut self) -> Result<(), DriverError>;

    /// Set the name announced to discovering hosts
    ///
    /// # Errors
    /// Returns the driver status if the name is rejected
    fn set_device_name(&mut self, name: &str) -> Result<(), DriverError>;

    /// Set discoverability and connectability
    ///
    /// # Errors
    /// Returns the driver status if the mode cannot be applied
    fn set_scan_mode(&mut self, mode: ScanMode) -> Result<(), DriverError>;

    /// Request an A2DP sink connection to `peer`
    ///
    /// # Errors
    /// Returns the driver status if the request is rejected
    fn sink_connect(&mut self, peer: PeerAddress) -> Result<(), DriverError>;

    /// Request termination of the A2DP link to `peer`
    ///
    /// # Errors
    /// Returns the driver status if the request is rejected
    fn sink_disconnect(&mut self, peer: PeerAddress) -> Result<(), DriverError>;
}

/// Non-volatile storage for the remembered peer
pub trait PeerStore {
    /// Read the remembered peer, `None` if nothing was stored yet
    ///
    /// # Errors
    /// Returns the driver status if the storage cannot be read
    fn load(&mut self) -> Result<Option<PeerAddress>, DriverError>;

    /// Persist `peer` as the remembered peer
    ///
    /// # Errors
    /// Returns the driver status if the storage cannot be written
    fn save(&mut self, peer: PeerAddress) -> Result<(), DriverError>;
}

/// RAM-only peer store; the remembered peer is lost on power cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStore {
    peer: Option<PeerAddress>,
}

impl MemoryStore {
    /// Create a store that already remembers `peer`
    #[must_use]
    pub const fn with_peer(peer: PeerAddress) -> Self {
        Self { peer: Some(peer) }
    }

    /// Currently stored peer
    #[must_use]
    pub const fn peer(&self) -> Option<PeerAddress> {
        self.peer
    }
}

impl PeerStore for MemoryStore {
    fn load(&mut self) -> Result<Option<PeerAddress>, DriverError> {
        Ok(self.peer)
    }

    fn save(&mut self, peer: PeerAddress) -> Result<(), DriverError> {
        self.peer = Some(peer);
        Ok(())
    }
}
