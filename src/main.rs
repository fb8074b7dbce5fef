use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use curlbench::backend::HttpBackend;
use curlbench::config::{parse_kv_arg, read_arg_or_file, ClientConfig, CliArgs, Command, ExecArgs};
use curlbench::controller::{Controller, Intent};
use curlbench::error::BenchError;
use curlbench::terminal::TerminalView;

type CliController = Controller<HttpBackend, TerminalView>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so rendered tables stay on stdout.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curlbench=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    let config = ClientConfig::from_args(&args)?;
    info!("Backend: {}", config.backend_url);

    let backend = Arc::new(HttpBackend::new(config.backend_url.clone())?);
    let view = Arc::new(TerminalView::new(config.assume_yes));
    let mut controller = Controller::new(
        backend,
        view,
        Duration::from_secs(config.refresh_interval_secs),
    );

    let outcome = run(&mut controller, args.command).await;
    if let Err(e) = outcome {
        // Already alerted unless it came from reading the inputs.
        if let BenchError::Config(_) | BenchError::Io(_) = e {
            eprintln!("error: {}", e);
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(controller: &mut CliController, command: Command) -> Result<(), BenchError> {
    match command {
        Command::Run(exec) => {
            fill_form(controller, &exec).await?;
            controller.handle(Intent::Execute).await
        }
        Command::Batch(batch) => {
            fill_form(controller, &batch.exec).await?;
            if let Some(path) = &batch.excel {
                upload(controller, path).await?;
            }
            if let Some(iterations) = &batch.iterations {
                controller
                    .handle(Intent::EditIterations(iterations.clone()))
                    .await?;
            }
            controller
                .handle(Intent::SelectSource(batch.effective_source()))
                .await?;
            controller.handle(Intent::ExecuteBatch).await
        }
        Command::Upload { path } => upload(controller, &path).await,
        Command::History { watch } => {
            controller.handle(Intent::LoadHistory).await?;
            if watch {
                controller.handle(Intent::SetAutoRefresh(true)).await?;
                tokio::signal::ctrl_c().await?;
                info!("Received shutdown signal");
                controller.handle(Intent::SetAutoRefresh(false)).await?;
            }
            Ok(())
        }
        Command::Show { id } => controller.handle(Intent::ShowHistoryDetail(id)).await,
        Command::Clear => controller.handle(Intent::ClearHistory).await,
    }
}

/// Replay the command-line inputs as form edits, applying each variable
/// source the way leaving its editor would.
async fn fill_form(controller: &mut CliController, exec: &ExecArgs) -> Result<(), BenchError> {
    controller
        .handle(Intent::EditCurl(read_arg_or_file(&exec.curl)?))
        .await?;

    if let Some(json) = &exec.vars_json {
        controller
            .handle(Intent::EditJson(read_arg_or_file(json)?))
            .await?;
        controller.handle(Intent::ApplyJsonVariables).await?;
    }

    if !exec.kv.is_empty() {
        for (index, raw) in exec.kv.iter().enumerate() {
            if index > 0 {
                controller.handle(Intent::AddKvRow).await?;
            }
            let row = parse_kv_arg(raw);
            controller
                .handle(Intent::EditKvRow {
                    index,
                    key: row.key,
                    value: row.value,
                })
                .await?;
        }
        controller.handle(Intent::ApplyKvVariables).await?;
    }

    for (index, text) in exec.assertions.iter().enumerate() {
        if index > 0 {
            controller.handle(Intent::AddAssertion).await?;
        }
        controller
            .handle(Intent::EditAssertion {
                index,
                text: text.clone(),
            })
            .await?;
    }
    Ok(())
}

async fn upload(controller: &mut CliController, path: &Path) -> Result<(), BenchError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| BenchError::Config(format!("not a file: {}", path.display())))?;
    controller
        .handle(Intent::UploadExcel { file_name, bytes })
        .await
}
