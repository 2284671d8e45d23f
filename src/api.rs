//! `Bluesink` API Functions
//!
//! [`SinkController`] is the producer side of the sink. Every operation only
//! submits a work item to the [`SinkDispatcher`]; the state machine runs later in
//! the consumer, so these calls never block and are safe from console commands,
//! timers and radio stack callback contexts alike.
//!
//! The API is generic and not coupled to any specific transport or platform.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bluesink::{SinkController, SinkDispatcher};
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//!
//! static DISPATCHER: SinkDispatcher<CriticalSectionRawMutex, Radio, Renderer, Nvs, 10> =
//!     SinkDispatcher::new();
//!
//! let controller = SinkController::new(&DISPATCHER);
//! controller.start()?;
//! controller.reconnect()?;
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::{
    ProfileEvent, Sink, SinkError,
    constants::{MAX_DEVICE_NAME_LENGTH, command, profile_event, stack_event},
    dispatcher::{Dispatcher, Payload},
    renderer::AudioRenderer,
    stack::{PeerStore, RadioStack},
};

/// Dispatcher whose consumer owns a [`Sink`]
pub type SinkDispatcher<M, R, A, S, const N: usize> = Dispatcher<M, Sink<R, A, S>, N>;

/// Producer handle to a running sink
pub struct SinkController<'d, M: RawMutex, R, A, S, const N: usize> {
    dispatcher: &'d SinkDispatcher<M, R, A, S, N>,
}

impl<M: RawMutex, R, A, S, const N: usize> Clone for SinkController<'_, M, R, A, S, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex, R, A, S, const N: usize> Copy for SinkController<'_, M, R, A, S, N> {}

impl<'d, M, R, A, S, const N: usize> SinkController<'d, M, R, A, S, N>
where
    M: RawMutex,
    R: RadioStack,
    A: AudioRenderer,
    S: PeerStore,
{
    /// Create a controller submitting to `dispatcher`
    #[must_use]
    pub const fn new(dispatcher: &'d SinkDispatcher<M, R, A, S, N>) -> Self {
        Self { dispatcher }
    }

    /// Make the sink discoverable and connectable
    ///
    /// # Errors
    ///
    /// Returns `SinkError::QueueFull` or `SinkError::DispatcherClosed` if the
    /// request could not be queued.
    pub fn start(&self) -> Result<(), SinkError> {
        info!("[SINK] start");
        self.submit_stack_event(stack_event::STACK_UP)
    }

    /// Disconnect the host, then stop scanning
    ///
    /// The disconnect command is queued ahead of the scan-mode change, so the
    /// link is released before the radio goes invisible.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::QueueFull` or `SinkError::DispatcherClosed` if
    /// either request could not be queued. STACK_DOWN is not queued when the
    /// disconnect was rejected.
    pub fn stop(&self) -> Result<(), SinkError> {
        info!("[SINK] stop");
        self.disconnect()?;
        self.submit_stack_event(stack_event::STACK_DOWN)
    }

    /// Connect to the remembered host
    ///
    /// # Errors
    ///
    /// Returns `SinkError::QueueFull` or `SinkError::DispatcherClosed` if the
    /// request could not be queued.
    pub fn reconnect(&self) -> Result<(), SinkError> {
        self.submit_command(command::RECONNECT, Payload::Empty)
    }

    /// Disconnect from the connected host
    ///
    /// # Errors
    ///
    /// Returns `SinkError::QueueFull` or `SinkError::DispatcherClosed` if the
    /// request could not be queued.
    pub fn disconnect(&self) -> Result<(), SinkError> {
        self.submit_command(command::DISCONNECT, Payload::Empty)
    }

    /// Change the name announced to discovering hosts
    ///
    /// # Errors
    ///
    /// Returns `SinkError::InvalidParameter` if `name` is empty or longer than
    /// `MAX_DEVICE_NAME_LENGTH` bytes, otherwise the submission error.
    pub fn set_device_name(&self, name: &str) -> Result<(), SinkError> {
        if name.is_empty() || name.len() > MAX_DEVICE_NAME_LENGTH {
            warn!("[SINK] invalid device name length {}", name.len());
            return Err(SinkError::InvalidParameter);
        }
        self.submit_command(
            command::SET_DEVICE_NAME,
            Payload::copy_from(name.as_bytes())?,
        )
    }

    /// Forward a profile stack notification to the sink
    ///
    /// Meant to be called from the radio stack callbacks registered by
    /// [`RadioStack::register_callbacks`].
    ///
    /// # Errors
    ///
    /// Returns `SinkError::QueueFull` or `SinkError::DispatcherClosed` if the
    /// notification could not be queued; it is lost in that case.
    pub fn notify(&self, event: ProfileEvent) -> Result<(), SinkError> {
        let (code, bytes) = event.encode();
        trace!("[SINK] notify {:?}", event);
        self.dispatcher
            .submit_copy(Sink::profile_event_handler, code, &bytes)
            .map_err(SinkError::from)
    }

    /// Link supervision tick, drives the connect timeout
    ///
    /// # Errors
    ///
    /// Returns `SinkError::QueueFull` or `SinkError::DispatcherClosed` if the
    /// tick could not be queued.
    pub fn tick(&self) -> Result<(), SinkError> {
        self.dispatcher
            .submit(Sink::profile_event_handler, profile_event::TICK, Payload::Empty)
            .map_err(SinkError::from)
    }

    /// Whether the dispatcher still accepts requests
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        self.dispatcher.is_accepting()
    }

    fn submit_stack_event(&self, event: u16) -> Result<(), SinkError> {
        self.dispatcher
            .submit(Sink::stack_event_handler, event, Payload::Empty)
            .map_err(SinkError::from)
    }

    fn submit_command(&self, event: u16, payload: Payload) -> Result<(), SinkError> {
        self.dispatcher
            .submit(Sink::command_handler, event, payload)
            .map_err(SinkError::from)
    }
}
