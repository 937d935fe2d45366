#![forbid(unsafe_code)]

//! Embodied-carbon ledger core: classify building elements into material
//! buckets, accumulate volume and mass, derive A1-A3 / A4 / A5 emissions, and
//! shape the payload consumed by the ledger uploader.

pub mod classify;
pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod payload;
pub mod pipeline;
pub mod select;
pub mod types;
pub mod units;
pub mod uploader;

pub use classify::{Classification, KeywordClassifier, MatchRule, MaterialClassifier};
pub use config::{RunConfig, UploaderConfig};
pub use error::LedgerError;
pub use ledger::{CarbonLedger, EmissionFactorTable, EmissionTotals, RecordOutcome};
pub use model::{ModelAccess, ModelElement, ModelSnapshot};
pub use payload::{project_id, EmissionPayload};
pub use pipeline::{run_model, ElementTrace, RunOutcome};
pub use select::{select_bucket, Selection};
pub use types::{
    BucketTotals, ElementRecord, EmissionFactor, EmissionResult, MaterialBucket, MaterialCandidate,
    MaterialRecord,
};
pub use units::{fallback_density, resolve_density, volume_to_cubic_meters, VolumeUnit};
