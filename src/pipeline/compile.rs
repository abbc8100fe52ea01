//! External LaTeX compilation of the assembled deck.
//!
//! The compiler runs with its working directory set to the workspace so
//! relative `\includegraphics` paths resolve, without mutating the
//! process-wide current directory. A compile failure is reported, never
//! propagated: the `.tex` deck on disk is already a useful artifact.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use crate::config::ConversionConfig;
use crate::output::CompileReport;
use crate::pipeline::assemble::DECK_FILENAME;

/// Run the configured compiler over the deck in `workspace`.
pub async fn compile_deck(workspace: &Path, config: &ConversionConfig) -> CompileReport {
    let log_path = workspace.join("presentation.log");

    info!(
        "Compiling {} with {} in {}",
        DECK_FILENAME,
        config.compiler,
        workspace.display()
    );

    let child = Command::new(&config.compiler)
        .arg("-interaction=nonstopmode")
        .arg(DECK_FILENAME)
        .current_dir(workspace)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status();

    let status = match tokio::time::timeout(
        Duration::from_secs(config.compile_timeout_secs),
        child,
    )
    .await
    {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            warn!("Failed to launch {}: {}", config.compiler, e);
            return CompileReport {
                success: false,
                pdf_path: None,
                log_path,
                detail: Some(format!("failed to launch {}: {e}", config.compiler)),
            };
        }
        Err(_) => {
            warn!(
                "{} timed out after {}s",
                config.compiler, config.compile_timeout_secs
            );
            return CompileReport {
                success: false,
                pdf_path: None,
                log_path,
                detail: Some(format!(
                    "{} timed out after {}s",
                    config.compiler, config.compile_timeout_secs
                )),
            };
        }
    };

    if status.success() {
        CompileReport {
            success: true,
            pdf_path: Some(workspace.join("presentation.pdf")),
            log_path,
            detail: None,
        }
    } else {
        warn!("{} exited with {}", config.compiler, status);
        CompileReport {
            success: false,
            pdf_path: None,
            log_path,
            detail: Some(format!("{} exited with {}", config.compiler, status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_compiler(compiler: &str) -> ConversionConfig {
        ConversionConfig::builder()
            .compiler(compiler)
            .compile_timeout_secs(10)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn missing_compiler_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let report = compile_deck(dir.path(), &config_with_compiler("definitely-not-a-compiler"))
            .await;
        assert!(!report.success);
        assert!(report.pdf_path.is_none());
        assert!(report.detail.is_some());
    }

    #[tokio::test]
    async fn successful_command_reports_pdf_path() {
        // Stand-in binary that always succeeds; we only assert on the
        // report shape, not on actual PDF output.
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DECK_FILENAME), "deck").unwrap();
        let report = compile_deck(dir.path(), &config_with_compiler("true")).await;
        assert!(report.success);
        assert_eq!(report.pdf_path, Some(dir.path().join("presentation.pdf")));
    }

    #[tokio::test]
    async fn failing_command_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let report = compile_deck(dir.path(), &config_with_compiler("false")).await;
        assert!(!report.success);
        assert!(report.detail.as_deref().is_some_and(|d| d.contains("exited")));
    }
}
