//! Trailer downloading via an external tool.
//!
//! The heavy lifting is delegated to yt-dlp (or a compatible tool named in
//! the config). The output path is handed to the tool verbatim via `-o`, so
//! a successful download lands exactly where the presence rule looks for it
//! and the next scan sees the gap as filled.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::config::DownloadConfig;

pub mod tools;

pub use tools::{check_tool, check_tool_with_arg, check_tools, require_tool, ToolInfo};

/// Downloads are killed after this long.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Invokes the configured download tool to fetch one trailer to a target
/// path.
#[derive(Debug, Clone)]
pub struct TrailerDownloader {
    tool: String,
    format: String,
    extra_args: Vec<String>,
    dry_run: bool,
}

impl TrailerDownloader {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            tool: config.tool.clone(),
            format: config.format.clone(),
            extra_args: config.extra_args.clone(),
            dry_run: false,
        }
    }

    /// Log what would be downloaded instead of invoking the tool.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Arguments passed to the download tool for one fetch.
    fn build_args(&self, target: &str, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.format.clone(),
            "-o".to_string(),
            output.to_string_lossy().to_string(),
            "--no-playlist".to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push(target.to_string());
        args
    }

    /// Download `target` (a watch URL or `ytsearchN:` expression) to
    /// `output`.
    ///
    /// # Errors
    ///
    /// Fails when the tool is not installed, exits non-zero, times out, or
    /// exits cleanly without producing a non-empty output file.
    pub async fn download(&self, target: &str, output: &Path) -> Result<()> {
        if self.dry_run {
            info!(target, output = %output.display(), "Dry run, skipping download");
            return Ok(());
        }

        let program = tools::require_tool(&self.tool)?;
        let args = self.build_args(target, output);

        info!(tool = %self.tool, target, "Downloading trailer");
        debug!(?args, "Invoking download tool");

        let mut cmd = tokio::process::Command::new(&program);
        cmd.args(&args)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.tool))?;

        let out = tokio::time::timeout(DOWNLOAD_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| {
                anyhow::anyhow!("{} timed out after {:?}", self.tool, DOWNLOAD_TIMEOUT)
            })?
            .with_context(|| format!("I/O error waiting for {}", self.tool))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            bail!(
                "{} exited with status {}: {}",
                self.tool,
                out.status,
                stderr.trim()
            );
        }

        // yt-dlp can remux to a different container when the requested
        // format is unavailable. The presence rule keys on the exact path,
        // so a clean exit without the file there still counts as a failure.
        if !file_is_nonempty(output) {
            bail!(
                "{} reported success but {} is missing or empty",
                self.tool,
                output.display()
            );
        }

        info!(output = %output.display(), "Trailer downloaded");
        Ok(())
    }
}

fn file_is_nonempty(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
