//! Interactive console commands
//!
//! Each line typed at the console maps to one `Command`, applied to a host.

use std::str::FromStr;

use crate::core::host::Host;
use crate::types::{GateOutcome, Notice, PanelTab};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Begin the mode transition
    Transition,
    /// Terminal unlock notification
    Unlock,
    /// Click on the gated element
    Click,
    /// Close the vault panel
    Close,
    /// Switch vault panel tab
    Tab(PanelTab),
    /// Start the security check
    Verify,
    /// Tear down the transition sequencer
    CancelTransition,
    /// Tear down the security check
    CancelVerify,
    /// Step virtual time manually
    Advance(u64),
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let head = parts.next().ok_or_else(|| "empty command".to_string())?;
        let arg = parts.next();

        match head.to_ascii_lowercase().as_str() {
            "transition" | "elevate" => Ok(Command::Transition),
            "unlock" => Ok(Command::Unlock),
            "click" | "open" => Ok(Command::Click),
            "close" => Ok(Command::Close),
            "tab" => {
                let name = arg.ok_or_else(|| "usage: tab <overview|records|logs>".to_string())?;
                Ok(Command::Tab(name.parse()?))
            }
            "verify" => Ok(Command::Verify),
            "cancel-transition" => Ok(Command::CancelTransition),
            "cancel-verify" => Ok(Command::CancelVerify),
            "advance" | "wait" => {
                let ms = arg
                    .ok_or_else(|| "usage: advance <ms>".to_string())?
                    .parse::<u64>()
                    .map_err(|e| format!("invalid duration: {}", e))?;
                Ok(Command::Advance(ms))
            }
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

/// What a command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Notices(Vec<Notice>),
    Gate(GateOutcome),
    TabSelected(bool),
    Status,
    Help,
    Quit,
}

/// Apply a command to the host
pub fn execute(host: &mut Host, command: Command) -> CommandResult {
    match command {
        Command::Transition => CommandResult::Notices(host.session_mut().begin_transition()),
        Command::Unlock => {
            host.session_mut().unlock();
            CommandResult::Notices(Vec::new())
        }
        Command::Click => CommandResult::Gate(host.session_mut().click_gate()),
        Command::Close => {
            host.session_mut().close_panel();
            CommandResult::Notices(Vec::new())
        }
        Command::Tab(tab) => CommandResult::TabSelected(host.session_mut().select_tab(tab)),
        Command::Verify => CommandResult::Notices(host.session_mut().start_verification()),
        Command::CancelTransition => {
            CommandResult::Notices(host.session_mut().teardown_transition())
        }
        Command::CancelVerify => CommandResult::Notices(host.session_mut().teardown_verification()),
        Command::Advance(ms) => CommandResult::Notices(host.advance(ms)),
        Command::Status => CommandResult::Status,
        Command::Help => CommandResult::Help,
        Command::Quit => CommandResult::Quit,
    }
}

pub const HELP: &str = "\
commands:
  transition          begin the ELEVATED transition
  unlock              terminal unlock notification
  click               click the vault element
  close               close the vault panel
  tab <name>          overview | records | logs
  verify              start the security check
  cancel-transition   tear down the transition
  cancel-verify       tear down the security check
  advance <ms>        step time manually
  status              print state
  quit                exit";
