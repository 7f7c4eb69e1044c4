// ─── Extraction Sidecar ───
// Runs the external asset extractor and forwards its output to the log.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::request::RequestList;
use crate::core::error::{AppResult, ApplicationError, FileOperation};

/// Everything the extractor needs for one run.
///
/// Arguments are passed in this order: pak archive directory, mappings
/// directory, request list, output directory.
#[derive(Debug, Clone)]
pub struct SidecarJob {
    pub executable: PathBuf,
    pub paks_dir: PathBuf,
    pub mappings_dir: PathBuf,
    pub request_file: PathBuf,
    pub output_dir: PathBuf,
}

/// Result of a finished extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub status: ExitStatus,
    pub produced: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

impl SidecarJob {
    pub fn args(&self) -> Vec<&Path> {
        vec![
            self.paks_dir.as_path(),
            self.mappings_dir.as_path(),
            self.request_file.as_path(),
            self.output_dir.as_path(),
        ]
    }

    /// Images the extractor should produce for `requests`.
    pub fn expected_outputs(&self, requests: &RequestList) -> Vec<PathBuf> {
        requests
            .iter()
            .filter(|request| request.is_texture())
            .map(|request| request.output_file(&self.output_dir))
            .collect()
    }

    /// Spawn the extractor, stream its output into the log, and wait for it.
    pub async fn run(&self) -> AppResult<ExitStatus> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|_| ApplicationError::file_operation(FileOperation::Write, &self.output_dir))?;

        let mut cmd = Command::new(&self.executable);
        cmd.args(self.args());
        if let Some(workdir) = self.request_file.parent() {
            if !workdir.as_os_str().is_empty() {
                cmd.current_dir(workdir);
            }
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        info!("Starting asset extractor {:?}", self.executable);
        debug!("Command: {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| {
            warn!("Failed to spawn extractor {:?}: {}", self.executable, e);
            ApplicationError::file_operation(FileOperation::Other, &self.executable)
        })?;

        let stdout = child.stdout.take().map(|out| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(out).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!("SIDECAR: {}", line);
                }
            })
        });
        let stderr = child.stderr.take().map(|err| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(err).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!("SIDECAR: {}", line);
                }
            })
        });

        let status = child
            .wait()
            .await
            .map_err(|_| ApplicationError::file_operation(FileOperation::Other, &self.executable))?;

        for pump in [stdout, stderr].into_iter().flatten() {
            let _ = pump.await;
        }

        info!("Asset extractor exited with {}", status);
        Ok(status)
    }

    /// Run the extractor and check which requested images actually landed.
    pub async fn run_and_verify(&self, requests: &RequestList) -> AppResult<ExtractionReport> {
        let status = self.run().await?;

        let mut produced = Vec::new();
        let mut missing = Vec::new();
        for expected in self.expected_outputs(requests) {
            if tokio::fs::try_exists(&expected).await.unwrap_or(false) {
                produced.push(expected);
            } else {
                missing.push(expected);
            }
        }

        if !missing.is_empty() {
            warn!("{} requested textures were not extracted", missing.len());
        }

        Ok(ExtractionReport {
            status,
            produced,
            missing,
        })
    }
}
