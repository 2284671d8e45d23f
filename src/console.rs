//! Console command surface
//!
//! Two commands are understood:
//!
//! - `bt-setname <name>`: change the device name
//! - `bt-a2dp <start|stop|connect|disconnect>`: drive the sink
//!
//! [`execute`] returns the shell exit code: 0 when the line parsed (even if
//! the action was unknown or the sink refused the request), 1 otherwise.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::{
    SinkError,
    api::SinkController,
    constants::MAX_DEVICE_NAME_LENGTH,
    renderer::AudioRenderer,
    stack::{PeerStore, RadioStack},
};

/// `bt-a2dp` sub-command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum A2dpAction {
    /// Become discoverable and connectable
    Start,
    /// Disconnect and stop scanning
    Stop,
    /// Re-connect to the remembered host
    Connect,
    /// Disconnect from the host
    Disconnect,
}

impl A2dpAction {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "connect" => Some(Self::Connect),
            "disconnect" => Some(Self::Disconnect),
            _ => None,
        }
    }
}

/// Parsed console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand<'a> {
    /// `bt-setname <name>`
    SetName(&'a str),
    /// `bt-a2dp <action>`; `None` for an action the sink does not know
    A2dp(Option<A2dpAction>),
}

/// Console parse failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Blank line
    Empty,
    /// Not a `bt-*` command
    UnknownCommand,
    /// Required argument missing
    MissingArgument,
    /// More arguments than the command takes
    TooManyArguments,
    /// Device name longer than `MAX_DEVICE_NAME_LENGTH` bytes
    NameTooLong,
}

impl<'a> ConsoleCommand<'a> {
    /// Parse a whitespace-separated command line
    ///
    /// # Errors
    /// Returns the `ParseError` describing why the line is not a valid command
    pub fn parse(line: &'a str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(ParseError::Empty)?;
        let argument = words.next();
        if words.next().is_some() {
            return Err(ParseError::TooManyArguments);
        }

        match name {
            "bt-setname" => {
                let device_name = argument.ok_or(ParseError::MissingArgument)?;
                if device_name.len() > MAX_DEVICE_NAME_LENGTH {
                    return Err(ParseError::NameTooLong);
                }
                Ok(Self::SetName(device_name))
            }
            "bt-a2dp" => {
                let action = argument.ok_or(ParseError::MissingArgument)?;
                Ok(Self::A2dp(A2dpAction::parse(action)))
            }
            _ => Err(ParseError::UnknownCommand),
        }
    }
}

/// Parse and run one console line, returning the exit code
pub fn execute<M, R, A, S, const N: usize>(
    controller: &SinkController<'_, M, R, A, S, N>,
    line: &str,
) -> i32
where
    M: RawMutex,
    R: RadioStack,
    A: AudioRenderer,
    S: PeerStore,
{
    let command = match ConsoleCommand::parse(line) {
        Ok(command) => command,
        Err(e) => {
            warn!("[CONSOLE] invalid command: {:?}", e);
            return 1;
        }
    };

    let result: Result<(), SinkError> = match command {
        ConsoleCommand::SetName(name) => {
            info!("[CONSOLE] Set BT Device Name to '{}'", name);
            controller.set_device_name(name)
        }
        ConsoleCommand::A2dp(Some(A2dpAction::Start)) => {
            info!("[CONSOLE] Start BT A2DP Sink function");
            controller.start()
        }
        ConsoleCommand::A2dp(Some(A2dpAction::Stop)) => {
            info!("[CONSOLE] Stop BT A2DP Sink function");
            controller.stop()
        }
        ConsoleCommand::A2dp(Some(A2dpAction::Connect)) => {
            info!("[CONSOLE] BT A2DP re-connect to remembered host");
            controller.reconnect()
        }
        ConsoleCommand::A2dp(Some(A2dpAction::Disconnect)) => {
            info!("[CONSOLE] BT A2DP disconnect from host");
            controller.disconnect()
        }
        ConsoleCommand::A2dp(None) => {
            info!("[CONSOLE] Unknown BT A2DP Sink function");
            Ok(())
        }
    };

    if let Err(e) = result {
        warn!("[CONSOLE] request not accepted: {:?}", e);
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        LinkState, ScanMode,
        testing::{Directive, PEER, TestDispatcher, sink_remembering},
    };

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ConsoleCommand::parse("bt-setname Kitchen"),
            Ok(ConsoleCommand::SetName("Kitchen"))
        );
        assert_eq!(
            ConsoleCommand::parse("  bt-a2dp   start "),
            Ok(ConsoleCommand::A2dp(Some(A2dpAction::Start)))
        );
        assert_eq!(
            ConsoleCommand::parse("bt-a2dp disconnect"),
            Ok(ConsoleCommand::A2dp(Some(A2dpAction::Disconnect)))
        );
        assert_eq!(ConsoleCommand::parse("bt-a2dp restart"), Ok(ConsoleCommand::A2dp(None)));
        // Prefixes are not actions
        assert_eq!(ConsoleCommand::parse("bt-a2dp stopped"), Ok(ConsoleCommand::A2dp(None)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(ConsoleCommand::parse(""), Err(ParseError::Empty));
        assert_eq!(ConsoleCommand::parse("   "), Err(ParseError::Empty));
        assert_eq!(ConsoleCommand::parse("bt-setname"), Err(ParseError::MissingArgument));
        assert_eq!(ConsoleCommand::parse("bt-a2dp"), Err(ParseError::MissingArgument));
        assert_eq!(ConsoleCommand::parse("bt-a2dp start now"), Err(ParseError::TooManyArguments));
        assert_eq!(ConsoleCommand::parse("bt-scan on"), Err(ParseError::UnknownCommand));
        assert_eq!(
            ConsoleCommand::parse("bt-setname 0123456789012345678901234567890123"),
            Err(ParseError::NameTooLong)
        );
    }

    #[test]
    fn test_execute_return_codes() {
        let dispatcher = TestDispatcher::new();
        let controller = SinkController::new(&dispatcher);

        assert_eq!(execute(&controller, "bt-a2dp"), 1);
        assert_eq!(execute(&controller, "bt-setname"), 1);
        assert_eq!(execute(&controller, "hello"), 1);
        assert_eq!(dispatcher.pending(), 0);

        assert_eq!(execute(&controller, "bt-a2dp dance"), 0);
        assert_eq!(dispatcher.pending(), 0);

        assert_eq!(execute(&controller, "bt-a2dp start"), 0);
        assert_eq!(dispatcher.pending(), 1);
    }

    #[test]
    fn test_execute_drives_sink() {
        let dispatcher = TestDispatcher::new();
        let controller = SinkController::new(&dispatcher);
        let mut sink = sink_remembering(Some(PEER));

        assert_eq!(execute(&controller, "bt-setname Porch"), 0);
        assert_eq!(execute(&controller, "bt-a2dp start"), 0);
        assert_eq!(execute(&controller, "bt-a2dp connect"), 0);
        dispatcher.process_pending(&mut sink);

        assert_eq!(sink.radio().device_name.as_str(), "Porch");
        assert_eq!(sink.scan_mode(), ScanMode::ConnectableDiscoverable);
        assert_eq!(sink.state().link_state, LinkState::Connecting);
        assert_eq!(sink.radio().count(|d| *d == Directive::Connect(PEER)), 1);
    }

    #[test]
    fn test_execute_reports_success_when_queue_full() {
        let dispatcher = TestDispatcher::new();
        let controller = SinkController::new(&dispatcher);

        for _ in 0..16 {
            controller.tick().unwrap();
        }
        // Parsed fine, the sink just could not take it
        assert_eq!(execute(&controller, "bt-a2dp stop"), 0);
        assert_eq!(dispatcher.pending(), 16);
    }
}
