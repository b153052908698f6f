use p7run_exec::lifecycle::LifecycleConfig;
use p7run_exec::RunController;

use crate::cmd::config::{build_client, SetupError};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, RetryArgs, ServerArgs};

pub async fn workflows_cmd(output: OutputArgs, server: ServerArgs, retry: RetryArgs) -> i32 {
    let client = match build_client(&server, &retry).await {
        Ok(c) => c,
        Err(SetupError::Invalid(e)) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::VALIDATION_FAILED;
        }
        Err(SetupError::Runtime(e)) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let controller = RunController::new(client, LifecycleConfig::default());
    let entries = match controller.list_workflows().await {
        Ok(v) => v,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };

    match output.format {
        OutputFormat::Json => print_result(output.format, output.quiet, &entries),
        OutputFormat::Text if !output.quiet => {
            for entry in &entries {
                println!("{}\t{}", entry.id, entry.url);
            }
        }
        OutputFormat::Text => {}
    }
    exit_codes::SUCCESS
}
