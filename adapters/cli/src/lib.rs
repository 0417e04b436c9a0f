#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Blastfield over the referee's text
//! protocol.
//!
//! [`input::TurnReader`] materialises one board per turn, [`policy::Agent`]
//! chooses a planner and runs it, and [`output::Command`] renders the chosen
//! action. Settings come from [`config::AgentConfig`].

pub mod config;
pub mod input;
pub mod output;
pub mod policy;
