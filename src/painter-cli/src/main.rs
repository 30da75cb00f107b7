use anyhow::Result;
use clap::Parser;
use painter_core::{init_logging, AppDirs, Config};
use painter_remote::{PainterError, RemotePainter, ScriptExecutor, ScriptKind};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(
    name = "send-to-painter",
    version,
    about = "Send a script file to Substance Painter for remote execution"
)]
struct Cli {
    /// Path to the script to run inside the painter
    script: Option<PathBuf>,
    /// Host override (takes precedence over config)
    #[arg(long)]
    host: Option<String>,
    /// Port override (takes precedence over config)
    #[arg(long)]
    port: Option<u16>,
    /// Interpreter to run the script with; unrecognised names run as python
    #[arg(long, default_value = "python")]
    kind: String,
    /// Only verify that the painter is reachable
    #[arg(long)]
    check: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SendRequest {
    script: Option<PathBuf>,
    kind: ScriptKind,
    check_only: bool,
}

impl Cli {
    fn request(&self) -> SendRequest {
        SendRequest {
            script: self.script.clone(),
            kind: ScriptKind::from_name(&self.kind),
            check_only: self.check,
        }
    }
}

/// Failures that end the run with a non-zero exit code.
#[derive(Debug, Error)]
enum SendError {
    #[error("Connection failed: {0}")]
    Connection(PainterError),
    #[error("Error: No script file provided. Please pass a script file path.")]
    MissingScript,
    #[error("Error: Script file not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("Error reading script file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

fn read_script(path: &Path) -> Result<String, SendError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => SendError::NotFound(path.to_path_buf()),
        _ => SendError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

async fn send_script<W: Write>(
    executor: &dyn ScriptExecutor,
    request: &SendRequest,
    out: &mut W,
) -> Result<(), SendError> {
    executor
        .check_connection()
        .await
        .map_err(SendError::Connection)?;
    writeln!(out, "Connection to Substance Painter established")?;
    if request.check_only {
        return Ok(());
    }

    let path = request.script.as_deref().ok_or(SendError::MissingScript)?;
    let script = read_script(path)?;
    tracing::info!(
        "Sending {} ({} script, {} bytes)",
        path.display(),
        request.kind,
        script.len()
    );

    // a script the host rejects is reported, not fatal
    match executor.execute_script(&script, request.kind).await {
        Ok(result) => {
            tracing::info!("Script finished with status {:?}", result.status);
            writeln!(out, "Script executed successfully")?;
            if result.output.is_some() {
                writeln!(out, "Result from Substance Painter: {result}")?;
            }
        }
        Err(err) if err.is_execute_script() => {
            tracing::warn!("{err}");
            writeln!(out, "Script execution failed: {err}")?;
        }
        Err(err) => {
            tracing::error!("{err}");
            writeln!(out, "Unexpected error during execution: {err}")?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let dirs = AppDirs::discover()?;
    let config = Config::load_or_default(&dirs)?;
    let _logging = init_logging(&config.logging, &dirs)?;

    let remote = config
        .remote
        .clone()
        .with_overrides(cli.host.as_deref(), cli.port);
    remote.validate()?;
    let painter = RemotePainter::from_config(&remote)?;
    tracing::info!(
        "Using painter endpoint {}:{} (config dir: {})",
        remote.host,
        remote.port,
        dirs.config_dir().display()
    );

    let mut stdout = std::io::stdout();
    match send_script(&painter, &cli.request(), &mut stdout).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::error!("{err}");
            println!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
