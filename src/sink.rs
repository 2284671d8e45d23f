//! Sink core - connection state machine driven by the event dispatcher
//!
//! A [`Sink`] owns the [`ConnectionState`] together with the collaborators that
//! act on it. It is created once by [`Sink::init`] and then handed `&mut` to the
//! dispatcher consumer, which is the only place its handlers run:
//!
//! - **Stack lifecycle handler** (`lifecycle.rs`): stack up/down → scan mode
//! - **Command handler** (`command_processor.rs`): reconnect, disconnect, device name
//! - **Profile event handler** (`profile_processor.rs`): connection/audio
//!   callbacks and link supervision ticks
//!
//! Producers never touch the sink directly; they go through
//! [`crate::SinkController`].

mod command_processor;
mod lifecycle;
mod profile_processor;

use crate::{
    AudioState, ConnectionState, PeerAddress, ScanMode, SinkError, SinkOptions,
    renderer::{AudioRenderer, RendererConfig},
    stack::{PeerStore, RadioStack},
};

/// Result of the last dispatched command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandOutcome {
    /// Connect directive issued to the remembered host
    ConnectRequested,
    /// Reconnect requested but no host is remembered
    NoHostRemembered,
    /// Reconnect requested while already connected
    AlreadyConnected,
    /// A connect or disconnect is already in flight
    LinkBusy,
    /// Disconnect directive issued
    DisconnectRequested,
    /// Disconnect requested while not connected
    NotConnected,
    /// Device name applied
    DeviceNameSet,
    /// The radio stack rejected the directive
    StackRejected,
    /// The command payload could not be decoded
    InvalidPayload,
}

/// A2DP sink state machine and its collaborators
pub struct Sink<R, A, S> {
    state: ConnectionState,
    scan_mode: ScanMode,
    radio: R,
    renderer: A,
    store: S,
    options: SinkOptions,
    link_peer: PeerAddress,
    transition_ticks: u32,
    last_outcome: Option<CommandOutcome>,
}

impl<R: RadioStack, A: AudioRenderer, S: PeerStore> Sink<R, A, S> {
    /// Bring up the radio, profile stack and renderer
    ///
    /// Steps run in order: controller init, controller enable, profile stack
    /// init, profile stack enable, renderer init, state reset and remembered
    /// peer load, device name, callback registration. The first failing step
    /// aborts the remaining ones.
    ///
    /// # Errors
    ///
    /// Returns the fatal `SinkError` of the failing step. The collaborators are
    /// left as the failed step left them; the caller must treat the system as
    /// non-functional.
    pub fn init(
        mut radio: R,
        mut renderer: A,
        mut store: S,
        renderer_config: &RendererConfig,
        options: SinkOptions,
    ) -> Result<Self, SinkError> {
        radio.controller_init().map_err(|e| {
            error!("[SINK] initialize controller failed: {:?}", e);
            SinkError::ControllerInitFailed
        })?;
        radio.controller_enable().map_err(|e| {
            error!("[SINK] enable controller failed: {:?}", e);
            SinkError::ControllerEnableFailed
        })?;
        radio.profile_stack_init().map_err(|e| {
            error!("[SINK] initialize profile stack failed: {:?}", e);
            SinkError::ProfileStackInitFailed
        })?;
        radio.profile_stack_enable().map_err(|e| {
            error!("[SINK] enable profile stack failed: {:?}", e);
            SinkError::ProfileStackEnableFailed
        })?;
        renderer.init(renderer_config).map_err(|e| {
            error!("[SINK] initialize renderer failed: {:?}", e);
            SinkError::RendererInitFailed
        })?;

        let mut state = ConnectionState {
            audio_state: AudioState::Stopped,
            ..ConnectionState::default()
        };
        match store.load() {
            Ok(Some(peer)) => {
                info!("[SINK] remembered host: [{}]", peer);
                state.remembered_peer = peer;
            }
            Ok(None) => debug!("[SINK] no remembered host in storage"),
            Err(e) => warn!("[SINK] reading remembered host failed: {:?}", e),
        }

        radio.set_device_name(options.device_name.as_str()).map_err(|e| {
            error!("[SINK] set device name failed: {:?}", e);
            SinkError::DeviceNameFailed
        })?;
        radio.register_callbacks().map_err(|e| {
            error!("[SINK] register profile callbacks failed: {:?}", e);
            SinkError::CallbackRegistrationFailed
        })?;

        info!("[SINK] initialized as '{}'", options.device_name.as_str());
        Ok(Self {
            state,
            scan_mode: ScanMode::None,
            radio,
            renderer,
            store,
            options,
            link_peer: PeerAddress::UNSET,
            transition_ticks: 0,
            last_outcome: None,
        })
    }
}

impl<R, A, S> Sink<R, A, S> {
    /// Current connection state
    #[must_use]
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Last scan mode the radio accepted
    #[must_use]
    pub fn scan_mode(&self) -> ScanMode {
        self.scan_mode
    }

    /// Outcome of the most recent reconnect, disconnect or device name command
    #[must_use]
    pub fn last_outcome(&self) -> Option<CommandOutcome> {
        self.last_outcome
    }

    /// Options the sink was initialized with
    #[must_use]
    pub fn options(&self) -> &SinkOptions {
        &self.options
    }

    /// Radio stack
    #[must_use]
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Audio renderer
    #[must_use]
    pub fn renderer(&self) -> &A {
        &self.renderer
    }

    /// Peer store
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut ConnectionState {
        &mut self.state
    }
}
