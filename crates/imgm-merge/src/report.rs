use std::collections::BTreeMap;

use serde::Serialize;

use imgm_types::AnomalyCode;

/// Summary of a completed (or in-progress) merge run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Number of captures merged.
    pub inputs: usize,
    /// Sectors in the image.
    pub total_sectors: u64,
    /// Sectors written from a selected capture.
    pub selected: u64,
    /// Sectors written as the sentinel pattern.
    pub unresolved: u64,
    /// Bytes written to the merged output.
    pub bytes_written: u64,
    /// Anomaly log entries written, per code.
    pub anomalies: BTreeMap<AnomalyCode, u64>,
}

impl MergeReport {
    /// Entries written with `code`.
    pub fn anomaly_count(&self, code: AnomalyCode) -> u64 {
        self.anomalies.get(&code).copied().unwrap_or(0)
    }

    /// Total anomaly log lines.
    pub fn total_anomalies(&self) -> u64 {
        self.anomalies.values().sum()
    }

    /// Sectors processed so far.
    pub fn processed(&self) -> u64 {
        self.selected + self.unresolved
    }

    /// Returns `true` if no sector needs manual review.
    pub fn is_clean(&self) -> bool {
        self.total_anomalies() == 0
    }
}
