use crate::classify::{MatchRule, MaterialClassifier};
use crate::types::{MaterialBucket, MaterialCandidate};

/// One examined material and what it classified as.
#[derive(Debug, Clone, PartialEq)]
pub struct ExaminedMaterial {
    pub name: String,
    pub bucket: MaterialBucket,
    pub rule: MatchRule,
}

/// Governing bucket for one element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub bucket: Option<MaterialBucket>,
    pub density_kg_m3: Option<f64>,
    pub examined: Vec<ExaminedMaterial>,
}

/// Pick one bucket under CLT > Steel > Concrete.
///
/// Candidates are scanned in the supplied order. CLT stops the scan. Steel
/// takes over unless CLT is already chosen and is re-applied on every Steel
/// candidate. Concrete only fills an empty selection.
pub fn select_bucket<C>(classifier: &C, candidates: &[MaterialCandidate]) -> Selection
where
    C: MaterialClassifier + ?Sized,
{
    let mut sel = Selection::default();

    for cand in candidates {
        let c = classifier.classify(Some(cand));
        sel.examined.push(ExaminedMaterial {
            name: cand.name.clone(),
            bucket: c.bucket,
            rule: c.rule,
        });

        match c.bucket {
            MaterialBucket::Clt => {
                sel.bucket = Some(MaterialBucket::Clt);
                sel.density_kg_m3 = c.density_kg_m3;
                break;
            }
            MaterialBucket::Steel => {
                sel.bucket = Some(MaterialBucket::Steel);
                sel.density_kg_m3 = c.density_kg_m3;
            }
            MaterialBucket::Concrete if sel.bucket.is_none() => {
                sel.bucket = Some(MaterialBucket::Concrete);
                sel.density_kg_m3 = c.density_kg_m3;
            }
            _ => {}
        }
    }

    sel
}
