//! Rest Timer CLI - counts down the rest between two sets
//!
//! The countdown runs in the terminal:
//! - a tone and a screen flash when the rest is over
//! - the display kept awake while counting
//! - one-letter commands on stdin to pause, resume, extend or finish

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::debug;

use rest_timer::alert::RodioAudioDevice;
use rest_timer::cli::{
    load_config, spawn_stdin_reader, Cli, Commands, Display, StartArgs, TerminalFlash,
};
use rest_timer::resource::{InhibitorWakeLock, SignalForegroundObserver};
use rest_timer::timer::{open, Capabilities, RestEvent};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Start(args)) => {
            run_rest(args).await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Runs one rest session in the terminal until it closes.
async fn run_rest(args: StartArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let request = args.to_request();

    let capabilities = Capabilities {
        audio: if args.no_audio {
            None
        } else {
            Some(Box::new(RodioAudioDevice::new()))
        },
        haptics: None,
        flash: Box::new(TerminalFlash::new(io::stdout().is_terminal())),
        wake_lock: if args.no_wake_lock {
            None
        } else {
            Some(Box::new(InhibitorWakeLock::new(format!(
                "Resting after {}",
                request.exercise_name
            ))))
        },
        observer: Box::new(SignalForegroundObserver::new()),
    };

    Display::show_header(&request, config.extension_seconds);
    let (driver, handle, mut events) = open(request, &config, capabilities);

    // Ctrl-C goes through cancel so the flash and the wake lock are torn down
    let interrupt = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling rest");
            interrupt.cancel();
        }
    });
    spawn_stdin_reader(handle).context("failed to start input reader")?;

    let printer = async {
        while let Some(event) = events.recv().await {
            Display::show_event(&event);
            if event == RestEvent::Closed {
                break;
            }
        }
    };
    let (session, ()) = tokio::join!(driver.run(), printer);

    Display::show_summary(&session);
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
