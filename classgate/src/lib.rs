//! classgate: terminal front-end for human-in-the-loop event classification.

pub mod cli;
pub mod commands;
pub mod error;
pub mod flow;
pub mod terminal;
