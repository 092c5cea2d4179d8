//! Command-line front end for `wd` scenarios.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;
pub mod styles;
