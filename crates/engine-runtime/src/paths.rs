use std::path::{Path, PathBuf};

/// Run state lives in a dot-directory under the scanned root; the worklist
/// builder skips dot-directories, so quarantined files and the ledger are
/// never rediscovered as work.
pub const STATE_DIR: &str = ".optipress";

pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

pub fn ledger_path(root: &Path) -> PathBuf {
    state_dir(root).join("optimized.list")
}

pub fn quarantine_root(root: &Path) -> PathBuf {
    state_dir(root).join("quarantined")
}

pub fn failure_log_path(root: &Path) -> PathBuf {
    state_dir(root).join("not-optimized.log")
}
