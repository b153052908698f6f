use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a run of a workflow, configure it, execute it and print its outputs.
    Run {
        /// Workflow identifier as shown by `p7run workflows`.
        #[arg(long)]
        workflow: String,
        /// JSON or YAML object of input values.
        #[arg(long)]
        inputs: Option<PathBuf>,
        /// Input value; VALUE is parsed as JSON, falling back to a plain string.
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set_inputs: Vec<String>,
        /// Output port to read from the finished run.
        #[arg(long = "output", value_name = "NAME")]
        outputs: Vec<String>,
        /// File to upload before the start; DEST is relative to the run directory.
        #[arg(long = "upload", value_name = "LOCAL=DEST")]
        uploads: Vec<String>,
        /// Empty directory to create in the run directory before the start.
        #[arg(long = "upload-dir", value_name = "DIR")]
        upload_dirs: Vec<String>,
        /// File to download from the run directory once the run is done.
        #[arg(long = "report", value_name = "PATH")]
        reports: Vec<String>,
        /// Where downloaded reports are written.
        #[arg(long, default_value = ".")]
        report_dir: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        server: ServerArgs,
        #[command(flatten)]
        lifecycle: LifecycleArgs,
        #[command(flatten)]
        retry: RetryArgs,
    },
    /// List the workflows visible to the credential.
    Workflows {
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        server: ServerArgs,
        #[command(flatten)]
        retry: RetryArgs,
    },
}
