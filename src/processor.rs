//! Processor Tasks - dispatcher consumer and HCI event translation
//!
//! [`run`] brings the sink up and then becomes the dispatcher consumer; it is
//! the only place sink handlers execute. Platforms whose controller is reached
//! over HCI can use [`run_with_hci`] instead, which also runs
//! [`hci_event_processor`] to turn link-level HCI events into
//! [`ProfileEvent`]s.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bluesink::{RendererConfig, SinkDispatcher, SinkOptions, processor};
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//!
//! static DISPATCHER: SinkDispatcher<CriticalSectionRawMutex, Radio, Renderer, Nvs, 10> =
//!     SinkDispatcher::new();
//!
//! #[embassy_executor::task]
//! async fn sink_task(radio: Radio, renderer: Renderer, nvs: Nvs) {
//!     let options = SinkOptions::default().with_device_name("Kitchen").unwrap();
//!     let config = RendererConfig::default();
//!     if let Err(e) = processor::run(&DISPATCHER, radio, renderer, nvs, &config, options).await {
//!         defmt::error!("sink failed: {}", e);
//!     }
//! }
//! ```
//!
//! # Generic Parameters
//!
//! * `M: RawMutex` - Mutex guarding the dispatcher queue
//! * `R`, `A`, `S` - Radio stack, audio renderer and peer store
//! * `N` - Dispatcher queue depth
//! * `T: Transport`, `SLOTS` - HCI transport and controller command slots

use bt_hci::{
    ControllerToHostPacket,
    controller::{Controller, ExternalController},
    event,
    transport::Transport,
};
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::{
    LinkState, PeerAddress, ProfileEvent, Sink, SinkError, SinkOptions,
    api::{SinkController, SinkDispatcher},
    constants::HCI_READ_BUFFER_SIZE,
    renderer::{AudioRenderer, RendererConfig},
    stack::{PeerStore, RadioStack},
};

/// Initialize the sink and run the dispatcher consumer
///
/// Returns the sink once the dispatcher has been shut down and every request
/// queued before the shutdown has been handled.
///
/// # Errors
///
/// Returns the fatal initialization error from [`Sink::init`]; the consumer is
/// not started in that case.
pub async fn run<M, R, A, S, const N: usize>(
    dispatcher: &SinkDispatcher<M, R, A, S, N>,
    radio: R,
    renderer: A,
    store: S,
    renderer_config: &RendererConfig,
    options: SinkOptions,
) -> Result<Sink<R, A, S>, SinkError>
where
    M: RawMutex,
    R: RadioStack,
    A: AudioRenderer,
    S: PeerStore,
{
    let mut sink = Sink::init(radio, renderer, store, renderer_config, options)?;
    dispatcher.run(&mut sink).await;
    Ok(sink)
}

/// Initialize the sink and run the consumer alongside the HCI event processor
///
/// # Errors
///
/// Returns the fatal initialization error from [`Sink::init`].
#[allow(clippy::too_many_arguments)]
pub async fn run_with_hci<M, R, A, S, T, const N: usize, const SLOTS: usize>(
    dispatcher: &SinkDispatcher<M, R, A, S, N>,
    controller: &ExternalController<T, SLOTS>,
    radio: R,
    renderer: A,
    store: S,
    renderer_config: &RendererConfig,
    options: SinkOptions,
) -> Result<Sink<R, A, S>, SinkError>
where
    M: RawMutex,
    R: RadioStack,
    A: AudioRenderer,
    S: PeerStore,
    T: Transport,
{
    let mut sink = Sink::init(radio, renderer, store, renderer_config, options)?;
    embassy_futures::select::select(
        dispatcher.run(&mut sink),
        hci_event_processor(controller, SinkController::new(dispatcher)),
    )
    .await;
    Ok(sink)
}

/// Read HCI packets and forward link changes to the sink
pub async fn hci_event_processor<M, R, A, S, T, const N: usize, const SLOTS: usize>(
    controller: &ExternalController<T, SLOTS>,
    sink: SinkController<'_, M, R, A, S, N>,
) -> !
where
    M: RawMutex,
    R: RadioStack,
    A: AudioRenderer,
    S: PeerStore,
    T: Transport,
{
    let mut read_buffer = [0u8; HCI_READ_BUFFER_SIZE];
    let mut tracker = LinkTracker::default();

    loop {
        trace!("[PROCESSOR] Waiting for HCI event...");
        match controller.read(&mut read_buffer).await {
            Ok(ControllerToHostPacket::Event(event)) => {
                let Some(profile_event) = translate_hci_event(&mut tracker, &event) else {
                    continue;
                };
                if let Err(e) = sink.notify(profile_event) {
                    warn!("[PROCESSOR] dropped {:?}: {:?}", profile_event, e);
                }
            }
            Ok(_) => trace!("[PROCESSOR] non-event HCI packet ignored"),
            Err(_) => error!("[PROCESSOR] HCI read error"),
        }
    }
}

fn translate_hci_event(
    tracker: &mut LinkTracker,
    event: &event::Event<'_>,
) -> Option<ProfileEvent> {
    match *event {
        event::Event::ConnectionComplete(ref complete) => {
            let Ok(peer) = PeerAddress::try_from(complete.bd_addr) else {
                return None;
            };
            let succeeded = complete.status.to_result().is_ok();
            tracker.connection_complete(succeeded, peer, complete.handle.raw())
        }
        event::Event::DisconnectionComplete(ref complete) => {
            let succeeded = complete.status.to_result().is_ok();
            tracker.disconnection_complete(succeeded, complete.handle.raw())
        }
        _ => None,
    }
}

/// Connection handle of the single A2DP link
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LinkTracker {
    link: Option<(u16, PeerAddress)>,
}

impl LinkTracker {
    fn connection_complete(
        &mut self,
        succeeded: bool,
        peer: PeerAddress,
        handle: u16,
    ) -> Option<ProfileEvent> {
        if let Some((tracked, active)) = self.link {
            // Another ACL while the A2DP link is up
            debug!(
                "[PROCESSOR] [{}] ignored, link up with [{}] handle {}",
                peer, active, tracked
            );
            return None;
        }

        let state = if succeeded {
            debug!("[PROCESSOR] link up [{}] handle {}", peer, handle);
            self.link = Some((handle, peer));
            LinkState::Connected
        } else {
            debug!("[PROCESSOR] connection to [{}] failed", peer);
            LinkState::Disconnected
        };
        Some(ProfileEvent::ConnectionState { peer, state })
    }

    fn disconnection_complete(&mut self, succeeded: bool, handle: u16) -> Option<ProfileEvent> {
        if !succeeded {
            return None;
        }
        match self.link {
            Some((tracked, peer)) if tracked == handle => {
                debug!("[PROCESSOR] link down [{}] handle {}", peer, handle);
                self.link = None;
                Some(ProfileEvent::ConnectionState {
                    peer,
                    state: LinkState::Disconnected,
                })
            }
            // Some other ACL link
            _ => None,
        }
    }
}
