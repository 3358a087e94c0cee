// crates/perf-gate-cli/tests/common/mod.rs
// =============================================================================
// Module: CLI Test Helpers
// Description: Temporary report trees and session construction.
// Purpose: Reduce duplication across integration tests for perf-gate-cli.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::Path;

use perf_gate_cli::FsFileProvider;
use perf_gate_cli::GateSession;
use perf_gate_config::PerfGateConfig;

/// JMeter CSV header used by every generated report.
pub const JMETER_HEADER: &str = "timeStamp,elapsed,label,responseCode,success,bytes";

/// Renders a JMeter CSV report with one row per `(label, elapsed, success)`.
pub fn jmeter_csv(rows: &[(&str, u64, bool)]) -> String {
    let mut text = format!("{JMETER_HEADER}\n");
    for (index, (label, elapsed, success)) in rows.iter().enumerate() {
        let code = if *success { 200 } else { 500 };
        let at = 1_700_000_000_000_u64 + 1_000 * index as u64;
        text.push_str(&format!("{at},{elapsed},{label},{code},{success},100\n"));
    }
    text
}

/// Writes `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Builds a session over `root` from config text.
pub fn session(root: &Path, toml: &str) -> GateSession {
    let config = PerfGateConfig::from_toml_str(toml).unwrap();
    GateSession::new(config, FsFileProvider::new(root)).unwrap()
}
