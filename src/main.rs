//! stderr-guard binary entry point.
//!
//! Runs a worker task under the panic guard. With `--log-file` the process's
//! stderr is captured into the log, and a `--panic` still shows up on the
//! terminal the binary was started from.

use std::panic;
use std::process::ExitCode;
use std::time::Duration;

use stderr_guard::cli::{self, Args};
use stderr_guard::{logging, Config, StderrContext};
use tracing::{error, info, warn};

async fn run_worker(ticks: u32, panic_msg: Option<String>) {
    info!("worker started");

    for tick in 1..=ticks {
        info!(tick, "worker tick");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    if let Some(msg) = panic_msg {
        panic::panic_any(msg);
    }

    info!("worker finished");
}

#[tokio::main]
async fn main() -> ExitCode {
    // Must run before anything can touch descriptor 2.
    let ctx = StderrContext::init_or_abort();

    let args: Args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Try 'stderr-guard --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = logging::init(&config.logging, &ctx) {
        eprintln!("error: {e}");
        return ExitCode::from(1);
    }

    info!("stderr-guard v{}", env!("CARGO_PKG_VERSION"));
    info!(redirected = ctx.is_redirected(), "starting worker");

    let worker_ctx = ctx.clone();
    let worker = tokio::spawn(async move {
        worker_ctx
            .recover_future(run_worker(args.ticks, args.panic))
            .await
    });

    match worker.await {
        Ok(()) => {}
        Err(e) if e.is_panic() => {
            // Already reported on the console; let the process die the
            // way an unguarded panic would.
            panic::resume_unwind(e.into_panic());
        }
        Err(e) => {
            error!("worker did not complete: {e}");
            ctx.flush();
            return ExitCode::FAILURE;
        }
    }

    info!("shutting down");
    ctx.flush();

    if ctx.is_redirected() {
        if let Err(e) = ctx.restore() {
            warn!("failed to restore stderr: {e}");
        }
    }

    ExitCode::SUCCESS
}
