use std::path::Path;
use std::process::{Child, Command};

use crate::config::UploaderConfig;
use crate::error::LedgerError;

/// Starts the configured ledger uploader on a written payload.
/// The process is not waited on; submission is its business.
pub fn launch(cfg: &UploaderConfig, payload_path: &Path) -> Result<Child, LedgerError> {
    build_command(cfg, payload_path)
        .spawn()
        .map_err(|source| LedgerError::UploaderLaunch {
            program: cfg.program.clone(),
            source,
        })
}

pub fn build_command(cfg: &UploaderConfig, payload_path: &Path) -> Command {
    let mut cmd = Command::new(&cfg.program);
    cmd.args(&cfg.args).arg(payload_path);
    cmd
}
