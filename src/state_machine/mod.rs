// State machine module for per-target rollout lifecycles
//
// Each deployment target walks its own pipeline; this module tracks where that
// pipeline is (waiting on a gate, applying a wave, finished) with an explicit
// transition table so invalid moves surface as errors instead of silent drift.

pub mod errors;
pub mod events;
pub mod states;
pub mod target_state_machine;

pub use errors::{StateMachineError, StateMachineResult};
pub use events::TargetEvent;
pub use states::TargetState;
pub use target_state_machine::{TargetStateMachine, TargetTransition};
