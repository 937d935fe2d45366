use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::types::{ElementRecord, MaterialCandidate};
use crate::units::{volume_to_cubic_meters, VolumeUnit};

/// Volume parameters across schema versions, most specific first.
pub const VOLUME_PARAMETERS: [&str; 4] = [
    "HOST_VOLUME_COMPUTED",
    "HOST_VOLUME_SCHEDULED",
    "VOLUME",
    "SOLID_VOLUME",
];

/// Last-chance name lookup for families exposing a plain "Volume".
pub const VOLUME_FALLBACK_NAME: &str = "Volume";

pub const STRUCTURAL_MATERIAL_PARAM: &str = "STRUCTURAL_MATERIAL_PARAM";

/// Layer material id meaning "no material".
pub const INVALID_ELEMENT_ID: i64 = -1;

pub const DEFAULT_TARGET_CATEGORIES: [&str; 6] = [
    "StructuralFraming",
    "StructuralColumns",
    "StructuralFoundation",
    "Floors",
    "Walls",
    "Roofs",
];

pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Try each named accessor in order and return the first value `valid` accepts.
///
/// Accessors are consumed lazily, so later ones are never evaluated once an
/// earlier one yields.
pub fn resolve_first<'n, T>(
    accessors: impl IntoIterator<Item = (&'n str, Option<T>)>,
    valid: impl Fn(&T) -> bool,
) -> Option<(&'n str, T)> {
    accessors
        .into_iter()
        .find_map(|(name, v)| v.filter(|x| valid(x)).map(|x| (name, x)))
}

/// Stored parameter value with its storage type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterValue {
    Double(f64),
    Integer(i64),
    Text(String),
    ElementId(i64),
}

impl ParameterValue {
    /// Only double-storage parameters carry measured quantities.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            ParameterValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParameterValue::Double(v) => Some(*v),
            ParameterValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_element_id(&self) -> Option<i64> {
        match self {
            ParameterValue::ElementId(id) => Some(*id),
            _ => None,
        }
    }
}

/// Anything exposing parameters by name.
pub trait ParameterSource {
    fn parameter(&self, name: &str) -> Option<&ParameterValue>;
}

/// Volume of a parameterized element, in m3.
pub fn resolve_volume<S: ParameterSource + ?Sized>(source: &S, unit: VolumeUnit) -> f64 {
    let hit = resolve_first(
        VOLUME_PARAMETERS
            .iter()
            .map(|name| (*name, source.parameter(name).and_then(ParameterValue::as_double))),
        |v| v.is_finite() && *v > 0.0,
    );
    let raw = match hit {
        Some((_, v)) => Some(v),
        None => source
            .parameter(VOLUME_FALLBACK_NAME)
            .and_then(ParameterValue::as_number),
    };
    volume_to_cubic_meters(raw, unit)
}

/// One element handed to the core, with its resolved materials.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelElement {
    pub record: ElementRecord,
    pub materials: Vec<MaterialCandidate>,
    /// Referenced material ids the model could not resolve.
    pub missing_materials: Vec<i64>,
}

/// Element the adapter could not hand over, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedElement {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelWalk {
    pub elements: Vec<ModelElement>,
    pub skipped: Vec<SkippedElement>,
}

/// External model access collaborator.
pub trait ModelAccess {
    /// Document title, if the model has one.
    fn title(&self) -> Option<&str>;

    /// Elements of the given categories, in category order then model order.
    fn walk(&self, categories: &[String]) -> ModelWalk;
}

/* =========================
   JSON snapshot adapter
   ========================= */

/// Element id as exported by different schema versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawElementId {
    Plain(i64),
    Fields {
        #[serde(default)]
        value: Option<i64>,
        #[serde(default)]
        integer_value: Option<i64>,
        #[serde(default)]
        text: Option<String>,
    },
    Text(String),
}

impl RawElementId {
    fn value(&self) -> Option<i64> {
        match self {
            RawElementId::Plain(v) => Some(*v),
            RawElementId::Fields { value, .. } => *value,
            RawElementId::Text(_) => None,
        }
    }

    fn integer_value(&self) -> Option<i64> {
        match self {
            RawElementId::Fields { integer_value, .. } => *integer_value,
            _ => None,
        }
    }

    fn parsed_text(&self) -> Option<i64> {
        match self {
            RawElementId::Fields { text: Some(t), .. } | RawElementId::Text(t) => t.trim().parse().ok(),
            _ => None,
        }
    }

    /// Newest accessor first, text parse last.
    pub fn resolve(&self) -> Option<i64> {
        let accessors: [(&str, fn(&RawElementId) -> Option<i64>); 3] = [
            ("value", RawElementId::value),
            ("integer_value", RawElementId::integer_value),
            ("text", RawElementId::parsed_text),
        ];
        resolve_first(accessors.iter().map(|(n, get)| (*n, get(self))), |_| true).map(|(_, id)| id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralAsset {
    #[serde(default)]
    pub density: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMaterial {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub material_class: Option<String>,
    #[serde(default)]
    pub structural_asset: Option<StructuralAsset>,
}

impl SnapshotMaterial {
    pub fn to_candidate(&self) -> MaterialCandidate {
        MaterialCandidate {
            name: self.name.clone(),
            class_label: self.material_class.clone().filter(|c| !c.is_empty()),
            density_kg_m3: self.structural_asset.as_ref().and_then(|a| a.density),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotType {
    pub id: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub material_ids: Vec<i64>,
    #[serde(default)]
    pub compound_layers: Vec<i64>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,
}

impl ParameterSource for SnapshotType {
    fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotElement {
    pub id: RawElementId,
    pub name: String,
    pub built_in_category: String,
    #[serde(default)]
    pub is_element_type: bool,
    #[serde(default)]
    pub type_id: Option<i64>,
    #[serde(default)]
    pub material_ids: Vec<i64>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,
}

impl ParameterSource for SnapshotElement {
    fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }
}

impl SnapshotElement {
    /// "OST_Walls" and "Walls" both name the Walls category.
    pub fn category_key(&self) -> &str {
        self.built_in_category
            .strip_prefix("OST_")
            .unwrap_or(self.built_in_category.as_str())
    }
}

/// Building model exported to JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub volume_unit: VolumeUnit,
    #[serde(default)]
    pub materials: Vec<SnapshotMaterial>,
    #[serde(default)]
    pub types: Vec<SnapshotType>,
    #[serde(default)]
    pub elements: Vec<SnapshotElement>,
}

impl ModelSnapshot {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn from_json(text: &str) -> Result<Self, LedgerError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Every material id the element references: instance, type, compound
    /// layers, then structural material on instance and type. First-seen order.
    pub fn material_ids(&self, elem: &SnapshotElement, typ: Option<&SnapshotType>) -> Vec<i64> {
        let mut ids = Vec::new();
        let mut seen = HashSet::new();
        let mut push = |id: i64| {
            if id != INVALID_ELEMENT_ID && seen.insert(id) {
                ids.push(id);
            }
        };

        elem.material_ids.iter().copied().for_each(&mut push);
        if let Some(t) = typ {
            t.material_ids.iter().copied().for_each(&mut push);
            t.compound_layers.iter().copied().for_each(&mut push);
        }

        let owners: [Option<&dyn ParameterSource>; 2] =
            [Some(elem as &dyn ParameterSource), typ.map(|t| t as &dyn ParameterSource)];
        for owner in owners.into_iter().flatten() {
            if let Some(id) = owner
                .parameter(STRUCTURAL_MATERIAL_PARAM)
                .and_then(ParameterValue::as_element_id)
            {
                push(id);
            }
        }
        ids
    }
}

impl ModelAccess for ModelSnapshot {
    fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    fn walk(&self, categories: &[String]) -> ModelWalk {
        let materials: HashMap<i64, &SnapshotMaterial> =
            self.materials.iter().map(|m| (m.id, m)).collect();
        let types: HashMap<i64, &SnapshotType> = self.types.iter().map(|t| (t.id, t)).collect();

        let mut walk = ModelWalk::default();
        for cat in categories {
            let cat_key = cat.strip_prefix("OST_").unwrap_or(cat.as_str());
            for elem in self
                .elements
                .iter()
                .filter(|e| !e.is_element_type && e.category_key() == cat_key)
            {
                let Some(id) = elem.id.resolve() else {
                    walk.skipped.push(SkippedElement {
                        name: elem.name.clone(),
                        reason: "element id could not be resolved".into(),
                    });
                    continue;
                };

                let typ = elem.type_id.and_then(|tid| types.get(&tid).copied());
                let category = typ
                    .and_then(|t| t.category.clone())
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
                let volume = resolve_volume(elem, self.volume_unit);

                let mut candidates = Vec::new();
                let mut missing = Vec::new();
                for mid in self.material_ids(elem, typ) {
                    match materials.get(&mid) {
                        Some(m) => candidates.push(m.to_candidate()),
                        None => missing.push(mid),
                    }
                }

                walk.elements.push(ModelElement {
                    record: ElementRecord::new(id, elem.name.clone(), category, volume),
                    materials: candidates,
                    missing_materials: missing,
                });
            }
        }
        walk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "title": "Tower A",
        "volume_unit": "cubic_feet",
        "materials": [
            {"id": 10, "name": "Concrete, Cast-in-Place gray", "material_class": "Concrete"},
            {"id": 11, "name": "Metal - Steel 345 MPa", "structural_asset": {"density": 7800.0}},
            {"id": 12, "name": "Gypsum Wall Board", "material_class": "Gypsum"}
        ],
        "types": [
            {"id": 200, "category": "Walls", "material_ids": [12], "compound_layers": [12, -1, 10]},
            {"id": 201, "category": "Structural Framing",
             "parameters": {"STRUCTURAL_MATERIAL_PARAM": {"element_id": 11}}}
        ],
        "elements": [
            {"id": {"value": 1001}, "name": "Basic Wall 200", "built_in_category": "OST_Walls",
             "type_id": 200, "parameters": {"HOST_VOLUME_COMPUTED": {"double": 100.0}}},
            {"id": {"integer_value": 1002}, "name": "W12x26", "built_in_category": "OST_StructuralFraming",
             "type_id": 201, "parameters": {"VOLUME": {"double": 0.0}, "Volume": {"double": 10.0}}},
            {"id": "1003", "name": "Lost beam", "built_in_category": "OST_StructuralFraming",
             "material_ids": [99], "parameters": {"SOLID_VOLUME": {"double": 5.0}}},
            {"id": {"text": "n/a"}, "name": "Broken id", "built_in_category": "OST_Walls"},
            {"id": 2000, "name": "Wall type", "built_in_category": "OST_Walls", "is_element_type": true},
            {"id": 3000, "name": "Chair", "built_in_category": "OST_Furniture"}
        ]
    }"#;

    fn categories() -> Vec<String> {
        DEFAULT_TARGET_CATEGORIES.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_resolve_first_order_and_validity() {
        let hit = resolve_first([("a", Some(-1.0)), ("b", None), ("c", Some(2.0)), ("d", Some(3.0))], |v| *v > 0.0);
        assert_eq!(hit, Some(("c", 2.0)));
        assert_eq!(resolve_first([("a", None::<f64>)], |_| true), None);
    }

    #[test]
    fn test_element_id_resolution() {
        assert_eq!(RawElementId::Plain(7).resolve(), Some(7));
        let both = RawElementId::Fields {
            value: Some(8),
            integer_value: Some(9),
            text: None,
        };
        assert_eq!(both.resolve(), Some(8));
        assert_eq!(RawElementId::Text(" 42 ".into()).resolve(), Some(42));
        assert_eq!(RawElementId::Text("x".into()).resolve(), None);
    }

    #[test]
    fn test_volume_accessor_fallback() {
        let snap = ModelSnapshot::from_json(SNAPSHOT).unwrap();
        let wall = &snap.elements[0];
        assert!((resolve_volume(wall, VolumeUnit::CubicFeet) - 2.83168466).abs() < 1e-9);

        // VOLUME is zero, so the name lookup supplies the value.
        let beam = &snap.elements[1];
        assert!((resolve_volume(beam, VolumeUnit::CubicMeters) - 10.0).abs() < 1e-12);

        let broken = &snap.elements[3];
        assert_eq!(resolve_volume(broken, VolumeUnit::CubicFeet), 0.0);
    }

    #[test]
    fn test_walk_orders_and_resolves() {
        let snap = ModelSnapshot::from_json(SNAPSHOT).unwrap();
        let walk = snap.walk(&categories());

        // Framing is walked before Walls.
        let ids: Vec<i64> = walk.elements.iter().map(|e| e.record.id).collect();
        assert_eq!(ids, vec![1002, 1003, 1001]);

        let beam = &walk.elements[0];
        assert_eq!(beam.record.category, "Structural Framing");
        assert_eq!(beam.materials.len(), 1);
        assert_eq!(beam.materials[0].density_kg_m3, Some(7800.0));

        let lost = &walk.elements[1];
        assert_eq!(lost.record.category, UNKNOWN_CATEGORY);
        assert!(lost.materials.is_empty());
        assert_eq!(lost.missing_materials, vec![99]);

        let wall = &walk.elements[2];
        let names: Vec<&str> = wall.materials.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Gypsum Wall Board", "Concrete, Cast-in-Place gray"]);
        assert_eq!(wall.materials[1].class_label.as_deref(), Some("Concrete"));

        assert_eq!(walk.skipped.len(), 1);
        assert_eq!(walk.skipped[0].name, "Broken id");
    }

    #[test]
    fn test_title() {
        let snap = ModelSnapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snap.title(), Some("Tower A"));
        assert_eq!(ModelSnapshot::default().title(), None);
    }
}
