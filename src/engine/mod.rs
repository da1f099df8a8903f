// src/engine/mod.rs
//
// The pure decision core: scoring, the training-progress state machine,
// reward issuance and rank math. No I/O here; the submission orchestrator
// and the handlers wire these into storage and transport.

pub mod progression;
pub mod rank;
pub mod rewards;
pub mod score;
