use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::LedgerError;
use crate::ledger::{CarbonLedger, EmissionFactorTable};
use crate::types::{EmissionResult, MaterialBucket, MaterialRecord};

pub const UNKNOWN_PROJECT: &str = "Unknown_Project";

/// Summaries longer than this are cut down to the minimal form.
pub const SUMMARY_MAX_CHARS: usize = 1000;

/// Output of one run, in the shape the ledger uploader consumes.
/// Field names and `material_enum` numbering are a cross-system contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionPayload {
    #[serde(rename = "Concrete")]
    pub concrete: EmissionResult,
    #[serde(rename = "Steel")]
    pub steel: EmissionResult,
    #[serde(rename = "CLT")]
    pub clt: EmissionResult,
    pub grand_total: f64,
    pub unclassified_elements: BTreeMap<i64, String>,
    pub project_id: String,
    pub material_records: Vec<MaterialRecord>,
    pub timestamp: i64,
}

impl EmissionPayload {
    pub fn from_ledger(
        ledger: &CarbonLedger,
        factors: &EmissionFactorTable,
        project_id: String,
        timestamp: i64,
    ) -> Self {
        let totals = ledger.finalize(factors);
        EmissionPayload {
            concrete: totals.concrete,
            steel: totals.steel,
            clt: totals.clt,
            grand_total: totals.grand_total,
            unclassified_elements: ledger.unclassified().clone(),
            project_id,
            material_records: ledger.records().to_vec(),
            timestamp,
        }
    }

    pub fn result(&self, bucket: MaterialBucket) -> Option<&EmissionResult> {
        match bucket {
            MaterialBucket::Concrete => Some(&self.concrete),
            MaterialBucket::Steel => Some(&self.steel),
            MaterialBucket::Clt => Some(&self.clt),
            MaterialBucket::Other => None,
        }
    }

    /// Pretty JSON to `path`, creating the parent directory if needed.
    pub fn write_to(&self, path: &Path) -> Result<(), LedgerError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut w = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut w, self)?;
        w.flush()?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, LedgerError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Compact summary for the ledger: the payload without per-element
    /// records, or a minimal digest when that is still too long.
    pub fn ledger_summary(&self) -> Result<String, LedgerError> {
        let mut summary = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut summary {
            map.remove("material_records");
            map.insert("total_records".into(), json!(self.material_records.len()));
        }
        let compact = serde_json::to_string(&summary)?;
        if compact.len() <= SUMMARY_MAX_CHARS {
            return Ok(compact);
        }

        let materials: serde_json::Map<String, Value> = MaterialBucket::TRACKED
            .iter()
            .filter_map(|b| self.result(*b).map(|r| (b, r)))
            .map(|(b, r)| {
                (
                    b.name().to_string(),
                    json!({
                        "volume_m3": r.volume_m3,
                        "total": r.total,
                        "element_count": r.element_count,
                    }),
                )
            })
            .collect();
        let minimal = json!({
            "project_id": self.project_id,
            "timestamp": self.timestamp,
            "grand_total": self.grand_total,
            "total_records": self.material_records.len(),
            "materials": materials,
        });
        Ok(serde_json::to_string(&minimal)?)
    }
}

/// `<title with underscores>_<unix seconds>`.
pub fn project_id(title: Option<&str>, timestamp: i64) -> String {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNKNOWN_PROJECT);
    format!("{}_{}", title.replace(' ', "_"), timestamp)
}
