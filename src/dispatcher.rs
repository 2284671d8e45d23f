//! Event Dispatcher - ordered, single-consumer execution channel
//!
//! Any number of producers (radio stack callback contexts, console commands,
//! timers) submit work items; one consumer executes them strictly in submission
//! order. Because a handler runs to completion before the next item is taken,
//! the context it mutates behaves like a single-threaded state machine without
//! locks around the context itself.
//!
//! ## Work items
//!
//! A work item is a handler function, a `u16` event code and a [`Payload`].
//! Payloads are either copied into the item at submission time (and released
//! when the item is dropped after its handler returns) or point to `'static`
//! data that the dispatcher never releases.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bluesink::dispatcher::{Dispatcher, Payload};
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//!
//! static DISPATCHER: Dispatcher<CriticalSectionRawMutex, Counter, 8> = Dispatcher::new();
//!
//! fn bump(counter: &mut Counter, event: u16, _payload: &[u8]) {
//!     counter.0 += u32::from(event);
//! }
//!
//! // From any context
//! DISPATCHER.submit(bump, 1, Payload::Empty)?;
//!
//! // In the consumer task
//! DISPATCHER.run(&mut counter).await;
//! ```

use core::cell::Cell;

use embassy_sync::{
    blocking_mutex::{Mutex, raw::RawMutex},
    channel::Channel,
};
use heapless::Vec;

use crate::constants::MAX_PAYLOAD_LENGTH;

/// Function executed by the consumer for a work item
pub type Handler<C> = fn(&mut C, u16, &[u8]);

/// Payload carried by a work item
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    /// No payload
    #[default]
    Empty,
    /// Bytes duplicated at submission; released after the handler returns
    Copied(Vec<u8, MAX_PAYLOAD_LENGTH>),
    /// Externally owned bytes; never released by the dispatcher
    External(&'static [u8]),
}

impl Payload {
    /// Copy `bytes` into a new payload
    ///
    /// # Errors
    /// Returns `DispatchError::PayloadTooLarge` if `bytes` exceeds `MAX_PAYLOAD_LENGTH`
    pub fn copy_from(bytes: &[u8]) -> Result<Self, DispatchError> {
        Vec::from_slice(bytes)
            .map(Self::Copied)
            .map_err(|()| DispatchError::PayloadTooLarge)
    }

    /// View the payload bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::Copied(bytes) => bytes,
            Self::External(bytes) => bytes,
        }
    }

    /// Payload length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the payload carries no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the dispatcher owns (and will release) the bytes
    #[must_use]
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Copied(_))
    }
}

/// Dispatcher submission errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// The bounded queue is full
    Full,
    /// The dispatcher no longer accepts work
    Closed,
    /// Payload does not fit a copied work item
    PayloadTooLarge,
}

struct WorkItem<C> {
    handler: Handler<C>,
    event: u16,
    payload: Payload,
}

impl<C> WorkItem<C> {
    fn execute(self, ctx: &mut C) {
        (self.handler)(ctx, self.event, self.payload.as_slice());
    }
}

enum Slot<C> {
    Work(WorkItem<C>),
    Stop,
}

/// Ordered single-consumer work queue
///
/// `M` selects the mutex guarding the queue (`CriticalSectionRawMutex` when
/// producers run in interrupt or other-core contexts), `C` is the context
/// handlers mutate and `N` is the queue depth.
///
/// The closed flag and the enqueue share one critical section, so every
/// accepted item is queued ahead of the stop marker.
pub struct Dispatcher<M: RawMutex, C, const N: usize> {
    channel: Channel<M, Slot<C>, N>,
    closed: Mutex<M, Cell<bool>>,
}

impl<M: RawMutex, C, const N: usize> Dispatcher<M, C, N> {
    /// Create an empty dispatcher
    #[must_use]
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            closed: Mutex::new(Cell::new(false)),
        }
    }

    /// Enqueue a work item without blocking
    ///
    /// # Errors
    ///
    /// * `DispatchError::Closed` once `shutdown` has been called
    /// * `DispatchError::Full` if the queue has no free slot; the item is dropped
    ///   and the caller decides whether to retry
    pub fn submit(
        &self,
        handler: Handler<C>,
        event: u16,
        payload: Payload,
    ) -> Result<(), DispatchError> {
        let item = WorkItem {
            handler,
            event,
            payload,
        };
        self.closed.lock(|closed| {
            if closed.get() {
                return Err(DispatchError::Closed);
            }
            self.channel.try_send(Slot::Work(item)).map_err(|_| {
                warn!("[DISPATCH] queue full, evt {} rejected", event);
                DispatchError::Full
            })
        })
    }

    /// Enqueue a work item carrying a copy of `bytes`
    ///
    /// # Errors
    /// See [`Payload::copy_from`] and [`Dispatcher::submit`]
    pub fn submit_copy(
        &self,
        handler: Handler<C>,
        event: u16,
        bytes: &[u8],
    ) -> Result<(), DispatchError> {
        self.submit(handler, event, Payload::copy_from(bytes)?)
    }

    /// Whether new work is accepted
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        !self.closed.lock(Cell::get)
    }

    /// Number of queued entries
    #[must_use]
    pub fn pending(&self) -> usize {
        self.channel.len()
    }

    /// Consumer loop
    ///
    /// Executes work items one at a time, in submission order, until
    /// [`Dispatcher::shutdown`] is called and every item enqueued before it has
    /// run.
    pub async fn run(&self, ctx: &mut C) {
        debug!("[DISPATCH] consumer started");
        loop {
            match self.channel.receive().await {
                Slot::Work(item) => item.execute(ctx),
                Slot::Stop => break,
            }
        }
        debug!("[DISPATCH] consumer stopped");
    }

    /// Execute every item currently queued and return how many ran
    pub fn process_pending(&self, ctx: &mut C) -> usize {
        let mut executed = 0;
        while let Ok(slot) = self.channel.try_receive() {
            if let Slot::Work(item) = slot {
                item.execute(ctx);
                executed += 1;
            }
        }
        executed
    }

    /// Stop accepting work and let the consumer drain the queue
    ///
    /// Waits for a free slot to post the stop marker; the consumer returns from
    /// [`Dispatcher::run`] after executing everything queued ahead of it.
    pub async fn shutdown(&self) {
        if self.closed.lock(|closed| closed.replace(true)) {
            return;
        }
        debug!("[DISPATCH] shutdown requested, {} pending", self.channel.len());
        self.channel.send(Slot::Stop).await;
    }
}

impl<M: RawMutex, C, const N: usize> Default for Dispatcher<M, C, N> {
    fn default() -> Self {
        Self::new()
    }
}
