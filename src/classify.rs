use crate::types::{MaterialBucket, MaterialCandidate};
use crate::units::resolve_density;

/// Lowercase name keyword -> bucket. Scanned in order; first hit wins.
pub const KEYWORD_TABLE: [(&str, MaterialBucket); 11] = [
    ("concrete", MaterialBucket::Concrete),
    ("cast-in-place", MaterialBucket::Concrete),
    ("steel", MaterialBucket::Steel),
    ("clt", MaterialBucket::Clt),
    ("cross laminated timber", MaterialBucket::Clt),
    ("cross-laminated timber", MaterialBucket::Clt),
    ("cross laminated", MaterialBucket::Clt),
    ("cross-laminated", MaterialBucket::Clt),
    ("timber", MaterialBucket::Clt),
    ("wood", MaterialBucket::Clt),
    ("lumber", MaterialBucket::Clt),
];

const CLASS_WOOD_WORDS: [&str; 3] = ["timber", "wood", "lumber"];

/// Which rule produced a classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRule {
    Keyword(&'static str),
    ClassLabel(String),
    NoMatch,
    MissingMaterial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub bucket: MaterialBucket,
    /// Declared density of the material; `None` means use the bucket fallback.
    pub density_kg_m3: Option<f64>,
    pub rule: MatchRule,
}

impl Classification {
    fn other(rule: MatchRule) -> Self {
        Classification {
            bucket: MaterialBucket::Other,
            density_kg_m3: None,
            rule,
        }
    }
}

/// Seam for material -> bucket rules.
pub trait MaterialClassifier {
    fn classify(&self, material: Option<&MaterialCandidate>) -> Classification;
}

/// Name keywords first, then the material class label.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn match_name(name: &str) -> Option<(&'static str, MaterialBucket)> {
        let name_lc = name.to_lowercase();
        KEYWORD_TABLE
            .iter()
            .find(|(kw, _)| name_lc.contains(kw))
            .copied()
    }

    fn match_class(class_label: &str) -> Option<MaterialBucket> {
        let cls = class_label.to_lowercase();
        match cls.as_str() {
            "concrete" => Some(MaterialBucket::Concrete),
            "steel" => Some(MaterialBucket::Steel),
            _ if CLASS_WOOD_WORDS.iter().any(|w| cls.contains(w)) => Some(MaterialBucket::Clt),
            _ => None,
        }
    }
}

impl MaterialClassifier for KeywordClassifier {
    fn classify(&self, material: Option<&MaterialCandidate>) -> Classification {
        let Some(mat) = material else {
            return Classification::other(MatchRule::MissingMaterial);
        };

        if let Some((kw, bucket)) = Self::match_name(&mat.name) {
            return Classification {
                bucket,
                density_kg_m3: resolve_density(mat),
                rule: MatchRule::Keyword(kw),
            };
        }

        if let Some(label) = mat.class_label.as_deref().filter(|l| !l.is_empty()) {
            if let Some(bucket) = Self::match_class(label) {
                return Classification {
                    bucket,
                    density_kg_m3: resolve_density(mat),
                    rule: MatchRule::ClassLabel(label.to_string()),
                };
            }
        }

        Classification::other(MatchRule::NoMatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(m: &MaterialCandidate) -> Classification {
        KeywordClassifier.classify(Some(m))
    }

    #[test]
    fn test_name_keywords() {
        let c = classify(&MaterialCandidate::named("Cast-in-place Concrete"));
        assert_eq!(c.bucket, MaterialBucket::Concrete);
        assert_eq!(c.rule, MatchRule::Keyword("concrete"));
        assert_eq!(c.density_kg_m3, None);

        let c = classify(&MaterialCandidate::named("Metal - Structural STEEL S355"));
        assert_eq!(c.bucket, MaterialBucket::Steel);

        for name in ["CLT Panel 5-ply", "Cross-Laminated Timber", "Oak Wood", "Glulam lumber"] {
            assert_eq!(classify(&MaterialCandidate::named(name)).bucket, MaterialBucket::Clt, "{name}");
        }
    }

    #[test]
    fn test_name_beats_class_label() {
        let m = MaterialCandidate::named("Steel Deck").with_class("Concrete");
        assert_eq!(classify(&m).bucket, MaterialBucket::Steel);
    }

    #[test]
    fn test_class_label_rules() {
        let m = MaterialCandidate::named("Mat-042").with_class("Concrete");
        let c = classify(&m);
        assert_eq!(c.bucket, MaterialBucket::Concrete);
        assert_eq!(c.rule, MatchRule::ClassLabel("Concrete".into()));

        // Exact match only for concrete/steel.
        let m = MaterialCandidate::named("Mat-043").with_class("Steel alloy");
        assert_eq!(classify(&m).bucket, MaterialBucket::Other);

        let m = MaterialCandidate::named("Mat-044").with_class("Softwood");
        assert_eq!(classify(&m).bucket, MaterialBucket::Clt);
    }

    #[test]
    fn test_declared_density_carried() {
        let m = MaterialCandidate::named("Concrete C40").with_density(2450.0);
        assert_eq!(classify(&m).density_kg_m3, Some(2450.0));
    }

    #[test]
    fn test_unmatched_and_missing() {
        let glass = MaterialCandidate::named("Glass").with_class("Glazing").with_density(2500.0);
        let c = classify(&glass);
        assert_eq!(c.bucket, MaterialBucket::Other);
        assert_eq!(c.density_kg_m3, None);
        assert_eq!(c.rule, MatchRule::NoMatch);

        let c = KeywordClassifier.classify(None);
        assert_eq!(c.bucket, MaterialBucket::Other);
        assert_eq!(c.rule, MatchRule::MissingMaterial);
    }
}
