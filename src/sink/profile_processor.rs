use heapless::Vec;

use crate::{
    AudioState, LinkState, PeerAddress, ProfileEvent, Sink,
    constants::{BD_ADDR_LENGTH, profile_event},
    renderer::AudioRenderer,
    stack::{PeerStore, RadioStack},
};

impl<R: RadioStack, A: AudioRenderer, S: PeerStore> Sink<R, A, S> {
    /// Profile event handler (dispatched only)
    ///
    /// Connection callbacks carry `[state, addr0..addr5]`, audio callbacks
    /// carry `[state]`, ticks carry nothing.
    pub(crate) fn profile_event_handler(&mut self, event: u16, payload: &[u8]) {
        match event {
            profile_event::CONNECTION_STATE => {
                let Some((&raw_state, addr)) = payload.split_first() else {
                    error!("[SINK] empty connection state payload");
                    return;
                };
                let (Ok(state), Ok(peer)) =
                    (LinkState::try_from(raw_state), PeerAddress::try_from(addr))
                else {
                    error!(
                        "[SINK] malformed connection state payload ({} bytes)",
                        payload.len()
                    );
                    return;
                };
                self.on_connection_state(peer, state);
            }
            profile_event::AUDIO_STATE => {
                let Some(state) = payload
                    .first()
                    .and_then(|raw| AudioState::try_from(*raw).ok())
                else {
                    error!(
                        "[SINK] malformed audio state payload ({} bytes)",
                        payload.len()
                    );
                    return;
                };
                self.on_audio_state(state);
            }
            profile_event::TICK => self.on_tick(),
            _ => error!("[SINK] unhandled profile evt {}", event),
        }
    }

    fn on_connection_state(&mut self, peer: PeerAddress, state: LinkState) {
        // Only one A2DP link; other peers are ignored while it is in use
        if self.state.link_state != LinkState::Disconnected && peer != self.link_peer {
            debug!(
                "[SINK] ignoring {:?} from [{}], link busy with [{}]",
                state, peer, self.link_peer
            );
            return;
        }

        info!("[SINK] connection state {:?} [{}]", state, peer);
        self.state.link_state = state;
        self.link_peer = peer;
        self.transition_ticks = 0;

        match state {
            LinkState::Connected => self.remember(peer),
            LinkState::Disconnected => self.link_lost(),
            LinkState::Connecting | LinkState::Disconnecting => {}
        }
    }

    fn link_lost(&mut self) {
        if self.state.audio_state == AudioState::Playing {
            self.stop_renderer();
        }
        self.state.audio_state = AudioState::Stopped;
    }

    fn remember(&mut self, peer: PeerAddress) {
        if peer.is_unset() || peer == self.state.remembered_peer {
            return;
        }

        info!("[SINK] remembering host [{}]", peer);
        self.state.remembered_peer = peer;
        if let Err(e) = self.store.save(peer) {
            warn!("[SINK] persisting host [{}] failed: {:?}", peer, e);
        }
    }

    fn on_audio_state(&mut self, state: AudioState) {
        let previous = self.state.audio_state;
        info!("[SINK] audio state {:?} -> {:?}", previous, state);
        self.state.audio_state = state;

        if state == AudioState::Playing && previous != AudioState::Playing {
            if let Err(e) = self.renderer.start() {
                warn!("[SINK] renderer start failed: {:?}", e);
            }
        } else if previous == AudioState::Playing && state != AudioState::Playing {
            self.stop_renderer();
        }
    }

    fn stop_renderer(&mut self) {
        if let Err(e) = self.renderer.stop() {
            warn!("[SINK] renderer stop failed: {:?}", e);
        }
    }

    /// Supervise `Connecting` and `Disconnecting`; a transition whose callback
    /// never arrives falls back to `Disconnected`
    fn on_tick(&mut self) {
        let state = self.state.link_state;
        if !matches!(state, LinkState::Connecting | LinkState::Disconnecting) {
            return;
        }

        self.transition_ticks = self.transition_ticks.saturating_add(1);
        let timeout = self.options.connect_timeout_ticks;
        trace!("[SINK] {:?}, tick {}/{}", state, self.transition_ticks, timeout);
        if timeout > 0 && self.transition_ticks >= timeout {
            warn!(
                "[SINK] {:?} [{}] timed out after {} ticks",
                state, self.link_peer, self.transition_ticks
            );
            self.state.link_state = LinkState::Disconnected;
            self.transition_ticks = 0;
            self.link_lost();
        }
    }
}

fn connection_payload(peer: PeerAddress, state: LinkState) -> [u8; 1 + BD_ADDR_LENGTH] {
    let mut payload = [0u8; 1 + BD_ADDR_LENGTH];
    payload[0] = state as u8;
    payload[1..].copy_from_slice(peer.as_bytes());
    payload
}

impl ProfileEvent {
    /// Event code and payload understood by `profile_event_handler`
    pub(crate) fn encode(&self) -> (u16, Vec<u8, { 1 + BD_ADDR_LENGTH }>) {
        match *self {
            Self::ConnectionState { peer, state } => (
                profile_event::CONNECTION_STATE,
                Vec::from_slice(&connection_payload(peer, state)).unwrap_or_default(),
            ),
            Self::AudioState(state) => (
                profile_event::AUDIO_STATE,
                Vec::from_slice(&[state as u8]).unwrap_or_default(),
            ),
        }
    }
}
