//! Core modules for Vaultgate

pub mod scheduler;
pub mod mode_store;
pub mod transition;
pub mod gate;
pub mod verification;
pub mod session;
pub mod host;
pub mod command;
pub mod pacer;
pub mod api;

pub use scheduler::{Effect, Owner, RunId, Scheduler, TimerEvent, TimerId};
pub use mode_store::ModeStore;
pub use transition::{TransitionEvent, TransitionSequencer, TransitionState};
pub use gate::{evaluate, AccessGate};
pub use verification::{VerificationEvent, VerificationProcess, VerificationState};
pub use session::Session;
pub use host::Host;
pub use command::{execute, Command, CommandResult};
pub use pacer::Pacer;
pub use api::{create_router, router_with_state, run_server, AppState};
