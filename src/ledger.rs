use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::types::{BucketTotals, ElementRecord, EmissionFactor, EmissionResult, MaterialBucket, MaterialRecord};
use crate::units::fallback_density;

/// Fixed-point scale shared with the ledger contract.
pub const VOLUME_SCALE: f64 = 1_000_000.0;

/// Emission factors for the tracked buckets, kg CO2e per kg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionFactorTable {
    #[serde(rename = "Concrete")]
    pub concrete: EmissionFactor,
    #[serde(rename = "Steel")]
    pub steel: EmissionFactor,
    #[serde(rename = "CLT")]
    pub clt: EmissionFactor,
}

impl Default for EmissionFactorTable {
    fn default() -> Self {
        EmissionFactorTable {
            concrete: EmissionFactor::new(0.120, 0.005, 0.008),
            steel: EmissionFactor::new(2.450, 0.032, 0.250),
            clt: EmissionFactor::new(0.437, 0.160, 0.007),
        }
    }
}

impl EmissionFactorTable {
    pub fn get(&self, bucket: MaterialBucket) -> Option<EmissionFactor> {
        match bucket {
            MaterialBucket::Concrete => Some(self.concrete),
            MaterialBucket::Steel => Some(self.steel),
            MaterialBucket::Clt => Some(self.clt),
            MaterialBucket::Other => None,
        }
    }

    /// Every stage factor must be finite and non-negative.
    pub fn validate(&self) -> Result<(), LedgerError> {
        for bucket in MaterialBucket::TRACKED {
            let Some(f) = self.get(bucket) else { continue };
            for (stage, value) in [("A1A3", f.a1a3), ("A4", f.a4), ("A5", f.a5)] {
                if !value.is_finite() || value < 0.0 {
                    return Err(LedgerError::InvalidFactor {
                        bucket: bucket.name(),
                        stage,
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

/// What `record_element` did with an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordOutcome {
    Skipped,
    Unclassified,
    Recorded { bucket: MaterialBucket, density_kg_m3: f64 },
}

/// Finalized emission figures for the three tracked buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionTotals {
    #[serde(rename = "Concrete")]
    pub concrete: EmissionResult,
    #[serde(rename = "Steel")]
    pub steel: EmissionResult,
    #[serde(rename = "CLT")]
    pub clt: EmissionResult,
    pub grand_total: f64,
}

impl EmissionTotals {
    pub fn get(&self, bucket: MaterialBucket) -> Option<&EmissionResult> {
        match bucket {
            MaterialBucket::Concrete => Some(&self.concrete),
            MaterialBucket::Steel => Some(&self.steel),
            MaterialBucket::Clt => Some(&self.clt),
            MaterialBucket::Other => None,
        }
    }
}

/// Running per-bucket totals plus the per-element ledger.
///
/// Records are kept in the order elements are recorded, and float sums follow
/// that order, so a fixed element sequence always reproduces the same bits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarbonLedger {
    concrete: BucketTotals,
    steel: BucketTotals,
    clt: BucketTotals,
    unclassified: BTreeMap<i64, String>,
    records: Vec<MaterialRecord>,
}

impl CarbonLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self, bucket: MaterialBucket) -> Option<&BucketTotals> {
        match bucket {
            MaterialBucket::Concrete => Some(&self.concrete),
            MaterialBucket::Steel => Some(&self.steel),
            MaterialBucket::Clt => Some(&self.clt),
            MaterialBucket::Other => None,
        }
    }

    fn totals_mut(&mut self, bucket: MaterialBucket) -> Option<&mut BucketTotals> {
        match bucket {
            MaterialBucket::Concrete => Some(&mut self.concrete),
            MaterialBucket::Steel => Some(&mut self.steel),
            MaterialBucket::Clt => Some(&mut self.clt),
            MaterialBucket::Other => None,
        }
    }

    pub fn unclassified(&self) -> &BTreeMap<i64, String> {
        &self.unclassified
    }

    pub fn records(&self) -> &[MaterialRecord] {
        &self.records
    }

    /// Accumulate one element. `None` (or `Other`) lands in the unclassified
    /// set; a missing density falls back to the bucket default.
    pub fn record_element(
        &mut self,
        element: &ElementRecord,
        bucket: Option<MaterialBucket>,
        density_kg_m3: Option<f64>,
    ) -> RecordOutcome {
        if !(element.volume_m3.is_finite() && element.volume_m3 > 0.0) {
            return RecordOutcome::Skipped;
        }

        let tracked = bucket.and_then(|b| Some((b, fallback_density(b)?, b.ledger_code()?)));
        let Some((bucket, fallback, code)) = tracked else {
            self.unclassified.insert(element.id, element.name.clone());
            return RecordOutcome::Unclassified;
        };
        let rho = density_kg_m3
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(fallback);

        if let Some(t) = self.totals_mut(bucket) {
            t.volume_m3 += element.volume_m3;
            t.mass_kg += element.volume_m3 * rho;
            t.element_count += 1;
        }

        self.records.push(MaterialRecord {
            material: bucket.name().to_string(),
            material_enum: code,
            volume_m3: element.volume_m3,
            scaled_volume: scaled_volume(element.volume_m3),
            element_id: element.id,
            element_name: element.name.clone(),
            category: element.category.clone(),
        });

        RecordOutcome::Recorded {
            bucket,
            density_kg_m3: rho,
        }
    }

    /// Fold a partial ledger built over a disjoint element range into this one.
    /// Merging in a fixed order keeps the result reproducible.
    pub fn merge(&mut self, other: CarbonLedger) {
        for bucket in MaterialBucket::TRACKED {
            if let (Some(src), Some(dst)) = (other.totals(bucket).copied(), self.totals_mut(bucket)) {
                dst.volume_m3 += src.volume_m3;
                dst.mass_kg += src.mass_kg;
                dst.element_count += src.element_count;
            }
        }
        self.unclassified.extend(other.unclassified);
        self.records.extend(other.records);
    }

    /// Stage-wise emissions in tonnes CO2e. Pure over the current totals.
    pub fn finalize(&self, factors: &EmissionFactorTable) -> EmissionTotals {
        let mut out = EmissionTotals::default();
        for bucket in MaterialBucket::TRACKED {
            let (Some(t), Some(f)) = (self.totals(bucket), factors.get(bucket)) else {
                continue;
            };
            let r = emission_result(t, &f);
            out.grand_total += r.total;
            match bucket {
                MaterialBucket::Concrete => out.concrete = r,
                MaterialBucket::Steel => out.steel = r,
                MaterialBucket::Clt => out.clt = r,
                MaterialBucket::Other => {}
            }
        }
        out
    }
}

/// kg -> tonnes per stage.
pub fn emission_result(totals: &BucketTotals, factor: &EmissionFactor) -> EmissionResult {
    let a1a3 = totals.mass_kg * factor.a1a3 / 1000.0;
    let a4 = totals.mass_kg * factor.a4 / 1000.0;
    let a5 = totals.mass_kg * factor.a5 / 1000.0;
    EmissionResult {
        volume_m3: totals.volume_m3,
        mass_kg: totals.mass_kg,
        a1a3,
        a4,
        a5,
        total: a1a3 + a4 + a5,
        element_count: totals.element_count,
    }
}

/// Volume in millionths of a cubic meter, truncated toward zero.
pub fn scaled_volume(volume_m3: f64) -> u64 {
    if volume_m3.is_finite() && volume_m3 > 0.0 {
        (volume_m3 * VOLUME_SCALE).trunc() as u64
    } else {
        0
    }
}
