//! Demo binary running `mgmtwire` exchanges against an in-process device.
//!
//! Parses CLI arguments, installs a `tracing` subscriber at the requested
//! verbosity and performs one echo exchange over a [`MemoryConnection`].

mod cli;

use std::{process::ExitCode, time::Duration};

use bincode::{BorrowDecode, Encode};
use clap::Parser;
use cli::{Cli, Command, EchoArgs, LogLevel};
use mgmtwire::{
    CmdRunner,
    Connection,
    Group,
    MemoryConnection,
    Message,
    Op,
    RunnerConfig,
    Session,
};
use tracing::{debug, error, level_filters::LevelFilter};

/// Command identifier of echo within the default group.
const ECHO_ID: u8 = 0;

#[derive(Debug, Encode, BorrowDecode)]
struct EchoPayload {
    text: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbosity.level());

    let result = match cli.command {
        Command::Echo(args) => echo(args).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: LogLevel) {
    let filter = match level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Trace => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn echo(args: EchoArgs) -> mgmtwire::Result<()> {
    let (host, device) = MemoryConnection::pair(args.mtu);
    let device = tokio::spawn(serve_echo(device));

    let config = RunnerConfig::default().response_timeout(Duration::from_millis(args.timeout_ms));
    let session = Session::spawn(host, config)?;
    let request = Message::with_payload(
        Op::Write,
        Group::DEFAULT,
        ECHO_ID,
        &EchoPayload { text: args.text },
    )?;
    let response = session.request(request).await?;
    let reply: EchoPayload = response.decode_payload()?;
    println!("{}", reply.text);

    session.shutdown();
    device.abort();
    Ok(())
}

/// Answer echo requests until the host goes away.
async fn serve_echo<C: Connection>(device: C) -> mgmtwire::Result<()> {
    let mut device = CmdRunner::new(device)?;
    loop {
        let request = match device.read_req().await {
            Ok(request) => request,
            Err(err) if err.is_fatal() => return Ok(()),
            Err(err) => {
                debug!(error = %err, "device ignored malformed request");
                continue;
            }
        };
        let response = Message::response_to(&request, request.payload().to_vec());
        device.write_req(&response).await?;
    }
}
