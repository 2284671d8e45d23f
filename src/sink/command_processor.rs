use crate::{
    LinkState, Sink,
    constants::command,
    renderer::AudioRenderer,
    sink::CommandOutcome,
    stack::{PeerStore, RadioStack},
};

impl<R: RadioStack, A: AudioRenderer, S: PeerStore> Sink<R, A, S> {
    /// Command handler (dispatched only)
    ///
    /// Every check-then-act on `link_state` happens here, inside the consumer,
    /// so a profile callback can never interleave with it.
    pub(crate) fn command_handler(&mut self, event: u16, payload: &[u8]) {
        let outcome = match event {
            command::RECONNECT => self.reconnect(),
            command::DISCONNECT => self.disconnect(),
            command::SET_DEVICE_NAME => self.set_device_name(payload),
            _ => {
                error!("[SINK] unhandled command {}", event);
                return;
            }
        };
        self.last_outcome = Some(outcome);
    }

    fn reconnect(&mut self) -> CommandOutcome {
        let peer = self.state.remembered_peer;
        if peer.is_unset() {
            info!("[SINK] reconnect, no host remembered");
            return CommandOutcome::NoHostRemembered;
        }

        match self.state.link_state {
            LinkState::Disconnected => {
                info!("[SINK] reconnect, re-connecting to host: [{}]", peer);
                match self.radio.sink_connect(peer) {
                    Ok(()) => {
                        self.state.link_state = LinkState::Connecting;
                        self.link_peer = peer;
                        self.transition_ticks = 0;
                        CommandOutcome::ConnectRequested
                    }
                    Err(e) => {
                        warn!("[SINK] connect to [{}] rejected: {:?}", peer, e);
                        CommandOutcome::StackRejected
                    }
                }
            }
            LinkState::Connected => {
                info!("[SINK] reconnect, already connected to host: [{}]", peer);
                CommandOutcome::AlreadyConnected
            }
            state @ (LinkState::Connecting | LinkState::Disconnecting) => {
                info!("[SINK] reconnect, link busy ({:?})", state);
                CommandOutcome::LinkBusy
            }
        }
    }

    fn disconnect(&mut self) -> CommandOutcome {
        if self.state.link_state != LinkState::Connected {
            debug!("[SINK] disconnect, not connected ({:?})", self.state.link_state);
            return CommandOutcome::NotConnected;
        }

        let peer = self.state.remembered_peer;
        info!("[SINK] disconnect from host: [{}]", peer);
        match self.radio.sink_disconnect(peer) {
            Ok(()) => {
                self.state.link_state = LinkState::Disconnecting;
                self.transition_ticks = 0;
                CommandOutcome::DisconnectRequested
            }
            Err(e) => {
                warn!("[SINK] disconnect from [{}] rejected: {:?}", peer, e);
                CommandOutcome::StackRejected
            }
        }
    }

    fn set_device_name(&mut self, payload: &[u8]) -> CommandOutcome {
        let Ok(name) = core::str::from_utf8(payload) else {
            error!("[SINK] device name is not valid UTF-8");
            return CommandOutcome::InvalidPayload;
        };

        match self.radio.set_device_name(name) {
            Ok(()) => {
                info!("[SINK] device name set to '{}'", name);
                CommandOutcome::DeviceNameSet
            }
            Err(e) => {
                warn!("[SINK] set device name failed: {:?}", e);
                CommandOutcome::StackRejected
            }
        }
    }
}
