//! Core types for Vaultgate

mod mode;
mod gate;
mod reason;
mod verification;
mod output;

pub use mode::{Mode, TransitionPhase};
pub use gate::{
    AccessLabel, AuthorizationState, GateDecision, GateOutcome, GateStatus, PanelState, PanelTab,
};
pub use reason::ReasonCode;
pub use verification::{VerificationStatus, VerificationView};
pub use output::{Notice, SessionSnapshot};
