// ABOUTME: Entry point for the sshrun CLI application.
// ABOUTME: Connects to the target, runs one command and mirrors its exit status.

mod cli;

use clap::Parser;
use cli::Cli;
use sshrun::output::{Output, OutputMode, exit_status};
use sshrun::{HostKeyPolicy, SessionBuilder};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    match run(cli, &mut output).await {
        Ok(code) => code,
        Err(e) => {
            output.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &mut Output) -> sshrun::Result<ExitCode> {
    let builder = cli.target.apply(SessionBuilder::new());
    let builder = apply_options(builder, &cli);
    let command = cli.command.join(" ");

    output.progress(&format!("→ Connecting to {}...", cli.target.host));
    let mut session = builder.build().await?;

    output.start_timer();
    let result = session.run(&command).await;
    session.close().await;
    let result = result?;

    output.result(&result);

    Ok(ExitCode::from(exit_status(&result)))
}

fn apply_options(mut builder: SessionBuilder, cli: &Cli) -> SessionBuilder {
    if let Some(port) = cli.port {
        builder = builder.port(port);
    }
    if let Some(user) = &cli.user {
        builder = builder.user(user);
    }
    if let Some(identity) = &cli.identity {
        builder = builder.private_key_path(identity);
    }
    if let Some(passphrase) = &cli.passphrase {
        builder = builder.key_passphrase(passphrase);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.command_timeout(Duration::from_secs(secs));
    }
    if cli.strict_host_key_checking || cli.known_hosts.is_some() {
        builder = builder.host_key_policy(HostKeyPolicy::KnownHosts {
            path: cli.known_hosts.clone(),
            trust_on_first_use: false,
        });
    }
    builder
}
