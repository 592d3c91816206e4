//! 消歧会话：决策接口、状态机、会话驱动

pub mod decision;
pub mod driver;
pub mod machine;
pub mod state;

pub use decision::{Decision, DecisionOptions, DecisionProvider, ScriptedDecisions};
pub use driver::{merge_hints, split_inline_hint, SessionDriver, SessionReport, HINT_SEPARATOR};
pub use machine::{transition, DisambiguationMachine, DisambiguationState, MachineEvent};
pub use state::{ResolutionOutcome, SessionMode, SessionState};
