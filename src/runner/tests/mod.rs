//! Unit tests for the command runner and session.

mod cmd_runner;
mod helpers;
