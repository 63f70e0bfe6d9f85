// ABOUTME: Library root for sshrun - run shell commands on remote hosts over SSH.
// ABOUTME: The command-line front end is in main.rs.

pub mod blocking;
pub mod output;
pub mod ssh;
pub mod target;

pub use ssh::{
    CommandError, Error, ExecutionResult, HostKeyPolicy, RemoteSession, Result, SessionBuilder,
};
