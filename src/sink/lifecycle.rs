use crate::{
    ScanMode, Sink,
    constants::stack_event,
    renderer::AudioRenderer,
    stack::{PeerStore, RadioStack},
};

impl<R: RadioStack, A: AudioRenderer, S: PeerStore> Sink<R, A, S> {
    /// Stack lifecycle handler (dispatched only)
    pub(crate) fn stack_event_handler(&mut self, event: u16, _payload: &[u8]) {
        debug!("[SINK] stack evt {}", event);
        match event {
            stack_event::STACK_UP => {
                // Discoverable and connectable, wait to be connected
                self.apply_scan_mode(ScanMode::ConnectableDiscoverable);
            }
            stack_event::STACK_DOWN => self.apply_scan_mode(ScanMode::None),
            _ => error!("[SINK] unhandled stack evt {}", event),
        }
    }

    fn apply_scan_mode(&mut self, mode: ScanMode) {
        match self.radio.set_scan_mode(mode) {
            Ok(()) => self.scan_mode = mode,
            Err(e) => warn!("[SINK] set scan mode {:?} failed: {:?}", mode, e),
        }
    }
}
