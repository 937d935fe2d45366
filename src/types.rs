use serde::{Deserialize, Serialize};

/// Canonical material buckets used for aggregation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaterialBucket {
    Concrete,
    Steel,
    #[serde(rename = "CLT")]
    Clt,
    Other,
}

impl MaterialBucket {
    /// Buckets that carry carbon totals, in report order.
    pub const TRACKED: [MaterialBucket; 3] =
        [MaterialBucket::Concrete, MaterialBucket::Steel, MaterialBucket::Clt];

    pub fn name(self) -> &'static str {
        match self {
            MaterialBucket::Concrete => "Concrete",
            MaterialBucket::Steel => "Steel",
            MaterialBucket::Clt => "CLT",
            MaterialBucket::Other => "Other",
        }
    }

    /// Numeric code shared with the ledger contract (Concrete=0, CLT=1, Steel=2).
    pub fn ledger_code(self) -> Option<u8> {
        match self {
            MaterialBucket::Concrete => Some(0),
            MaterialBucket::Clt => Some(1),
            MaterialBucket::Steel => Some(2),
            MaterialBucket::Other => None,
        }
    }
}

/// One building element as seen by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub volume_m3: f64,
    pub bucket: Option<MaterialBucket>,
}

impl ElementRecord {
    pub fn new(id: i64, name: impl Into<String>, category: impl Into<String>, volume_m3: f64) -> Self {
        ElementRecord {
            id,
            name: name.into(),
            category: category.into(),
            volume_m3,
            bucket: None,
        }
    }
}

/// One material reference found on an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialCandidate {
    pub name: String,
    pub class_label: Option<String>,
    pub density_kg_m3: Option<f64>,
}

impl MaterialCandidate {
    pub fn named(name: impl Into<String>) -> Self {
        MaterialCandidate {
            name: name.into(),
            class_label: None,
            density_kg_m3: None,
        }
    }

    pub fn with_class(mut self, class_label: impl Into<String>) -> Self {
        self.class_label = Some(class_label.into());
        self
    }

    pub fn with_density(mut self, density_kg_m3: f64) -> Self {
        self.density_kg_m3 = Some(density_kg_m3);
        self
    }
}

/// Running totals for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketTotals {
    pub volume_m3: f64,
    pub mass_kg: f64,
    pub element_count: u64,
}

/// kg CO2e emitted per kg of material, per lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub a1a3: f64,
    pub a4: f64,
    pub a5: f64,
}

impl EmissionFactor {
    pub const fn new(a1a3: f64, a4: f64, a5: f64) -> Self {
        EmissionFactor { a1a3, a4, a5 }
    }
}

/// Finalized figures for one bucket. Stage values are tonnes CO2e.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionResult {
    pub volume_m3: f64,
    pub mass_kg: f64,
    #[serde(rename = "A1A3")]
    pub a1a3: f64,
    #[serde(rename = "A4")]
    pub a4: f64,
    #[serde(rename = "A5")]
    pub a5: f64,
    pub total: f64,
    pub element_count: u64,
}

/// Per-element ledger entry in the shape the uploader consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub material: String,
    pub material_enum: u8,
    pub volume_m3: f64,
    pub scaled_volume: u64,
    pub element_id: i64,
    pub element_name: String,
    pub category: String,
}
