// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: One invocation runs one command on one target.

use clap::Parser;
use sshrun::target::Target;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sshrun")]
#[command(about = "Run a shell command on a remote host over SSH")]
#[command(version)]
pub struct Cli {
    /// Remote host as [user@]host[:port]
    pub target: Target,

    /// Command to run on the remote host
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    /// SSH port (overrides the target's port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Remote user (overrides the target's user, default: root)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Private key file (default: ~/.ssh/id_rsa)
    #[arg(short, long, value_name = "PATH")]
    pub identity: Option<PathBuf>,

    /// Passphrase for an encrypted private key
    #[arg(long)]
    pub passphrase: Option<String>,

    /// Verify the host key against ~/.ssh/known_hosts
    #[arg(long)]
    pub strict_host_key_checking: bool,

    /// Verify the host key against this known_hosts file
    #[arg(long, value_name = "PATH")]
    pub known_hosts: Option<PathBuf>,

    /// Abort the command after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the result as JSON
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,

    /// Print only the remote output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
