use std::path::Path;
use std::sync::Arc;

use p7run_core::Outputs;
use p7run_exec::lifecycle::{CompositeEventSink, TracingEventSink};
use p7run_exec::{LifecycleError, RunController, RunOutcome, RunReport, RunRequest};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cmd::config::{build_client, build_lifecycle_config, load_inputs, parse_uploads, SetupError};
use crate::cmd::progress::ProgressEventSink;
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{LifecycleArgs, OutputArgs, RetryArgs, ServerArgs};

#[derive(Debug, Serialize)]
struct RunResult {
    run_url: String,
    state: String,
    outputs: Option<Outputs>,
    failed_uploads: Vec<String>,
    reports: Vec<ReportResult>,
}

#[derive(Debug, Serialize)]
struct ReportResult {
    path: String,
    saved_to: Option<String>,
    error: Option<String>,
}

#[allow(clippy::too_many_arguments)]
pub async fn run_cmd(
    workflow: &str,
    inputs_path: Option<&Path>,
    set_inputs: &[String],
    outputs: Vec<String>,
    uploads: &[String],
    upload_dirs: Vec<String>,
    reports: Vec<String>,
    report_dir: &Path,
    output: OutputArgs,
    server: ServerArgs,
    lifecycle: LifecycleArgs,
    retry: RetryArgs,
) -> i32 {
    let fail = |code: i32, msg: String| {
        print_error(output.format, output.quiet, &msg);
        code
    };

    let inputs = match load_inputs(inputs_path, set_inputs) {
        Ok(v) => v,
        Err(e) => return fail(exit_codes::VALIDATION_FAILED, e),
    };
    let upload_files = match parse_uploads(uploads) {
        Ok(v) => v,
        Err(e) => return fail(exit_codes::VALIDATION_FAILED, e),
    };
    let client = match build_client(&server, &retry).await {
        Ok(c) => c,
        Err(SetupError::Invalid(e)) => return fail(exit_codes::VALIDATION_FAILED, e),
        Err(SetupError::Runtime(e)) => return fail(exit_codes::RUNTIME_ERROR, e),
    };

    let cancel = CancellationToken::new();
    tokio::spawn(watch_interrupts(cancel.clone()));
    let client = client.with_cancellation(cancel.clone());

    let mut events = CompositeEventSink::new();
    events.add(Box::new(TracingEventSink));
    if output.format == OutputFormat::Text && !output.quiet {
        events.add(Box::new(ProgressEventSink::new(
            upload_files.len() + upload_dirs.len(),
        )));
    }
    let controller = RunController::new(client, build_lifecycle_config(&lifecycle))
        .with_event_sink(Arc::new(events));
    let request = RunRequest {
        workflow_id: workflow.to_string(),
        inputs,
        outputs,
        upload_files,
        upload_directories: upload_dirs,
        report_files: reports,
    };

    let report = match controller.run(&request, &cancel).await {
        Ok(r) => r,
        Err(e @ LifecycleError::Codec(_)) => return fail(exit_codes::VALIDATION_FAILED, e.to_string()),
        Err(e) => return fail(exit_codes::RUNTIME_ERROR, e.to_string()),
    };

    let result = summarize(&report, report_dir, output.format, output.quiet).await;
    match output.format {
        OutputFormat::Json => print_result(output.format, output.quiet, &result),
        OutputFormat::Text if !output.quiet => print_text(&result),
        OutputFormat::Text => {}
    }

    if report.failed() {
        exit_codes::RUN_FAILED
    } else if !report.malformed_outputs().is_empty() {
        exit_codes::RUNTIME_ERROR
    } else {
        exit_codes::SUCCESS
    }
}

/// First Ctrl-C cancels the run gracefully; a second one exits at once.
async fn watch_interrupts(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    tracing::warn!("interrupt received, stopping (press Ctrl-C again to exit now)");
    cancel.cancel();
    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(exit_codes::RUNTIME_ERROR);
    }
}

async fn summarize(report: &RunReport, report_dir: &Path, format: OutputFormat, quiet: bool) -> RunResult {
    let mut reports = Vec::with_capacity(report.reports.len());
    for outcome in &report.reports {
        let entry = match &outcome.result {
            Ok(file) => {
                if format == OutputFormat::Text && !quiet {
                    if let Some(text) = file.text() {
                        println!("--- {} ---\n{text}", file.path);
                    }
                }
                match file.save_to(report_dir).await {
                    Ok(saved) => ReportResult {
                        path: outcome.path.clone(),
                        saved_to: Some(saved.display().to_string()),
                        error: None,
                    },
                    Err(e) => ReportResult {
                        path: outcome.path.clone(),
                        saved_to: None,
                        error: Some(format!("failed to save: {e}")),
                    },
                }
            }
            Err(e) => ReportResult {
                path: outcome.path.clone(),
                saved_to: None,
                error: Some(e.to_string()),
            },
        };
        reports.push(entry);
    }

    RunResult {
        run_url: report.run_url.clone(),
        state: report.state.to_string(),
        outputs: match &report.outcome {
            RunOutcome::Completed { outputs } => Some(outputs.clone()),
            RunOutcome::Failed => None,
        },
        failed_uploads: report
            .uploads
            .iter()
            .filter(|u| !u.succeeded())
            .map(|u| u.item.to_string())
            .collect(),
        reports,
    }
}

fn print_text(result: &RunResult) {
    println!("run: {} ({})", result.run_url, result.state);
    if let Some(outputs) = &result.outputs {
        for (name, value) in outputs {
            match (value.as_value(), value.error()) {
                (Some(v), _) => println!("{name} = {v}"),
                (None, Some(e)) => println!("{name} = <malformed: {e}>"),
                (None, None) => println!("{name} = <missing>"),
            }
        }
    }
    for item in &result.failed_uploads {
        eprintln!("warning: upload of {item} failed");
    }
    for r in &result.reports {
        if let Some(e) = &r.error {
            eprintln!("warning: report {}: {e}", r.path);
        }
    }
}
