//! Conversation orchestration
//!
//! Resolves one user message into a transcript extension by looping the
//! backend and the tool bridge until a final answer (or a failure) is
//! reached.

mod context;
mod orchestrator;

pub use orchestrator::{Orchestrator, TurnOutcome, TurnPhase, TurnRequest, MAX_MODEL_TURNS};
