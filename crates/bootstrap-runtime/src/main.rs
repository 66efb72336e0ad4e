//! # Request Bootstrap
//!
//! Boots the framework for the application in `BOOTSTRAP_APP_PATH`, runs one
//! demo request and exits with the code the bootstrap core decided on.
//!
//! ```text
//! BOOTSTRAP_SAPI=server request-bootstrap missing
//! HTTP/1.1 404 Not Found
//! ...
//! exit status 4
//! ```

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bootstrap_runtime::{exit_code, Benchmark, Kernel, ProcessHost, RequestContext, RuntimeSettings};
use bootstrap_types::{Fault, LogLevel, Severity};

/// Runs one request through the request-bootstrap core.
#[derive(Parser, Debug)]
#[command(name = "request-bootstrap")]
#[command(about = "Run one demo request through the framework bootstrap")]
struct Args {
    /// Which request to run
    #[arg(value_enum, default_value_t = Scenario::Welcome)]
    scenario: Scenario,

    /// Status code passed to show_error by the `abort` scenario
    #[arg(long, default_value_t = 500, allow_negative_numbers = true)]
    status: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Render a page and time it
    Welcome,
    /// Raise a recoverable warning, then finish normally
    Warning,
    /// Raise a fatal user error
    Fatal,
    /// Abort with show_error
    Abort,
    /// Abort with show_404
    Missing,
    /// Return an error nobody handles
    Exception,
    /// Panic inside the request
    Panic,
    /// Resolve a component that does not exist
    Unknown,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Diagnostics go to stderr; stdout is the response.
    let filter = EnvFilter::try_from_env("BOOTSTRAP_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = RuntimeSettings::from_env()?;
    let host = Arc::new(ProcessHost::from_settings(&settings));

    let outcome = Kernel::boot(&settings, Arc::clone(&host), |_| {}).and_then(|kernel| {
        kernel.install_panic_hook();
        kernel.handle(|ctx| run(ctx, &args))
    });

    host.finish(&mut io::stdout().lock())?;
    std::process::exit(exit_code(&outcome).into());
}

fn run(ctx: &RequestContext<'_>, args: &Args) -> Result<()> {
    let benchmark = ctx.library::<Benchmark>("Benchmark", None)?;
    benchmark.mark("request_start");

    match args.scenario {
        Scenario::Welcome => {}
        Scenario::Warning => {
            ctx.trigger_error(Severity::USER_WARNING, "This route is deprecated")?;
        }
        Scenario::Fatal => {
            ctx.trigger_error(Severity::USER_ERROR, "Cannot continue")?;
        }
        Scenario::Abort => {
            return Err(ctx
                .show_error("The request was aborted.", args.status, None)
                .into());
        }
        Scenario::Missing => {
            return Err(ctx.show_404("demo/missing", true).into());
        }
        Scenario::Exception => {
            return Err(Fault::raise("RuntimeException", "Demo exception").into());
        }
        Scenario::Panic => panic!("Demo panic inside the request"),
        Scenario::Unknown => {
            ctx.resolve("DoesNotExist")?;
        }
    }

    let elapsed = benchmark
        .elapsed_display("request_start", "request_end")
        .unwrap_or_default();
    ctx.log_message(LogLevel::Info, &format!("Rendered welcome in {elapsed}s"))?;

    if ctx.is_cli() {
        ctx.output(&format!("Welcome ({} environment)\n", ctx.environment()));
    } else {
        ctx.output(&format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><title>Welcome</title></head>\n\
             <body><h1>Welcome</h1><p>Page rendered in {elapsed} seconds.</p></body>\n</html>\n"
        ));
    }
    Ok(())
}
