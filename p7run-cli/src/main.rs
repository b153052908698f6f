use clap::Parser;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "p7run", version, about = "Run a pSeven workflow through its REST API")]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            workflow,
            inputs,
            set_inputs,
            outputs,
            uploads,
            upload_dirs,
            reports,
            report_dir,
            output,
            server,
            lifecycle,
            retry,
        } => {
            cmd::run::run_cmd(
                &workflow,
                inputs.as_deref(),
                &set_inputs,
                outputs,
                &uploads,
                upload_dirs,
                reports,
                &report_dir,
                output,
                server,
                lifecycle,
                retry,
            )
            .await
        }
        Command::Workflows {
            output,
            server,
            retry,
        } => cmd::workflows::workflows_cmd(output, server, retry).await,
    }
}
