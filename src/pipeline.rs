use crate::classify::MaterialClassifier;
use crate::ledger::{CarbonLedger, EmissionFactorTable, RecordOutcome};
use crate::model::{ModelAccess, ModelElement, SkippedElement};
use crate::payload::EmissionPayload;
use crate::select::{select_bucket, ExaminedMaterial};
use crate::types::{ElementRecord, MaterialBucket};

/// What happened to one element during the walk.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementTrace {
    pub element: ElementRecord,
    pub examined: Vec<ExaminedMaterial>,
    pub missing_materials: Vec<i64>,
    pub outcome: RecordOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub ledger: CarbonLedger,
    pub traces: Vec<ElementTrace>,
    pub skipped: Vec<SkippedElement>,
}

impl RunOutcome {
    pub fn payload(&self, factors: &EmissionFactorTable, project_id: String, timestamp: i64) -> EmissionPayload {
        EmissionPayload::from_ledger(&self.ledger, factors, project_id, timestamp)
    }
}

/// Classify and accumulate one element.
pub fn process_element<C>(ledger: &mut CarbonLedger, classifier: &C, elem: ModelElement) -> ElementTrace
where
    C: MaterialClassifier + ?Sized,
{
    let mut record = elem.record;
    if record.volume_m3 <= 0.0 {
        return ElementTrace {
            element: record,
            examined: Vec::new(),
            missing_materials: elem.missing_materials,
            outcome: RecordOutcome::Skipped,
        };
    }

    let sel = select_bucket(classifier, &elem.materials);
    record.bucket = Some(sel.bucket.unwrap_or(MaterialBucket::Other));
    let outcome = ledger.record_element(&record, sel.bucket, sel.density_kg_m3);

    ElementTrace {
        element: record,
        examined: sel.examined,
        missing_materials: elem.missing_materials,
        outcome,
    }
}

/// Sequential walk over the model's target categories. Element order is the
/// walk order, which fixes the floating-point summation order.
pub fn run_model<M, C>(model: &M, classifier: &C, categories: &[String]) -> RunOutcome
where
    M: ModelAccess + ?Sized,
    C: MaterialClassifier + ?Sized,
{
    let walk = model.walk(categories);
    let mut out = RunOutcome {
        skipped: walk.skipped,
        ..RunOutcome::default()
    };
    for elem in walk.elements {
        let trace = process_element(&mut out.ledger, classifier, elem);
        out.traces.push(trace);
    }
    out
}
