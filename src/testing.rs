//! Test doubles for the external collaborators

use core::cell::RefCell;
use std::{rc::Rc, vec::Vec};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::String;

use crate::{
    PeerAddress, RendererConfig, ScanMode, Sink, SinkOptions,
    api::SinkDispatcher,
    renderer::AudioRenderer,
    stack::{DriverError, PeerStore, RadioStack},
};

pub const PEER: PeerAddress = PeerAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
pub const OTHER_PEER: PeerAddress = PeerAddress::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);

/// Call recorded by `MockRadio`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    ControllerInit,
    ControllerEnable,
    ProfileStackInit,
    ProfileStackEnable,
    RegisterCallbacks,
    SetDeviceName,
    SetScanMode(ScanMode),
    Connect(PeerAddress),
    Disconnect(PeerAddress),
}

/// Shared record of radio calls, readable after the radio moved into a sink
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Directive>>>);

impl Journal {
    pub fn push(&self, directive: Directive) {
        self.0.borrow_mut().push(directive);
    }

    pub fn entries(&self) -> Vec<Directive> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

#[derive(Debug, Default)]
pub struct MockRadio {
    pub journal: Journal,
    pub device_name: String<32>,
    pub fail_on: Option<Directive>,
}

impl MockRadio {
    pub fn failing_on(directive: Directive) -> Self {
        Self {
            fail_on: Some(directive),
            ..Self::default()
        }
    }

    pub fn directives(&self) -> Vec<Directive> {
        self.journal.entries()
    }

    /// Directives that reach the radio after initialization
    pub fn runtime_directives(&self) -> Vec<Directive> {
        self.journal
            .entries()
            .into_iter()
            .filter(|d| {
                matches!(
                    d,
                    Directive::SetScanMode(_) | Directive::Connect(_) | Directive::Disconnect(_)
                )
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Directive) -> bool) -> usize {
        self.journal.entries().iter().filter(|d| pred(d)).count()
    }

    fn record(&mut self, directive: Directive) -> Result<(), DriverError> {
        self.journal.push(directive);
        if self.fail_on == Some(directive) {
            Err(DriverError::Status(-1))
        } else {
            Ok(())
        }
    }
}

impl RadioStack for MockRadio {
    fn controller_init(&mut self) -> Result<(), DriverError> {
        self.record(Directive::ControllerInit)
    }

    fn controller_enable(&mut self) -> Result<(), DriverError> {
        self.record(Directive::ControllerEnable)
    }

    fn profile_stack_init(&mut self) -> Result<(), DriverError> {
        self.record(Directive::ProfileStackInit)
    }

    fn profile_stack_enable(&mut self) -> Result<(), DriverError> {
        self.record(Directive::ProfileStackEnable)
    }

    fn register_callbacks(&mut self) -> Result<(), DriverError> {
        self.record(Directive::RegisterCallbacks)
    }

    fn set_device_name(&mut self, name: &str) -> Result<(), DriverError> {
        self.record(Directive::SetDeviceName)?;
        self.device_name = String::try_from(name).map_err(|()| DriverError::Unsupported)?;
        Ok(())
    }

    fn set_scan_mode(&mut self, mode: ScanMode) -> Result<(), DriverError> {
        self.record(Directive::SetScanMode(mode))
    }

    fn sink_connect(&mut self, peer: PeerAddress) -> Result<(), DriverError> {
        self.record(Directive::Connect(peer))
    }

    fn sink_disconnect(&mut self, peer: PeerAddress) -> Result<(), DriverError> {
        self.record(Directive::Disconnect(peer))
    }
}

#[derive(Debug, Default)]
pub struct MockRenderer {
    pub config: Option<RendererConfig>,
    pub running: bool,
    pub starts: u32,
    pub stops: u32,
    pub fail_init: bool,
}

impl AudioRenderer for MockRenderer {
    fn init(&mut self, config: &RendererConfig) -> Result<(), DriverError> {
        if self.fail_init {
            return Err(DriverError::Status(-2));
        }
        self.config = Some(*config);
        Ok(())
    }

    fn start(&mut self) -> Result<(), DriverError> {
        self.running = true;
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        self.running = false;
        self.stops += 1;
        Ok(())
    }
}

/// Peer store counting writes, optionally failing them
#[derive(Debug, Default)]
pub struct MockStore {
    pub peer: Option<PeerAddress>,
    pub saves: u32,
    pub fail_save: bool,
}

impl PeerStore for MockStore {
    fn load(&mut self) -> Result<Option<PeerAddress>, DriverError> {
        Ok(self.peer)
    }

    fn save(&mut self, peer: PeerAddress) -> Result<(), DriverError> {
        self.saves += 1;
        if self.fail_save {
            return Err(DriverError::Busy);
        }
        self.peer = Some(peer);
        Ok(())
    }
}

pub type TestSink = Sink<MockRadio, MockRenderer, MockStore>;
pub type TestDispatcher =
    SinkDispatcher<CriticalSectionRawMutex, MockRadio, MockRenderer, MockStore, 16>;

/// Initialized sink remembering `peer`, with the init directives cleared
pub fn sink_remembering(peer: Option<PeerAddress>) -> TestSink {
    let store = MockStore {
        peer,
        ..MockStore::default()
    };
    let sink = Sink::init(
        MockRadio::default(),
        MockRenderer::default(),
        store,
        &RendererConfig::default(),
        SinkOptions::default(),
    )
    .unwrap();
    sink.radio().journal.clear();
    sink
}
