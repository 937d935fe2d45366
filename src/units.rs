use serde::{Deserialize, Serialize};

use crate::types::{MaterialBucket, MaterialCandidate};

/// Authoring tools store volumes in imperial feet internally.
pub const FT3_TO_M3: f64 = 0.0283168466;

/// Unit basis of a raw volume reading.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeUnit {
    #[default]
    CubicFeet,
    CubicMeters,
}

impl VolumeUnit {
    pub fn to_m3_factor(self) -> f64 {
        match self {
            VolumeUnit::CubicFeet => FT3_TO_M3,
            VolumeUnit::CubicMeters => 1.0,
        }
    }
}

/// Convert a raw volume reading to m3. Missing, non-positive or
/// non-finite readings contribute nothing.
pub fn volume_to_cubic_meters(raw: Option<f64>, unit: VolumeUnit) -> f64 {
    match raw {
        Some(v) if v.is_finite() && v > 0.0 => v * unit.to_m3_factor(),
        _ => 0.0,
    }
}

/// Declared physical density, if the material carries a usable one.
pub fn resolve_density(material: &MaterialCandidate) -> Option<f64> {
    material
        .density_kg_m3
        .filter(|rho| rho.is_finite() && *rho > 0.0)
}

/// Fallback density in kg/m3 used when a material declares none.
pub fn fallback_density(bucket: MaterialBucket) -> Option<f64> {
    match bucket {
        MaterialBucket::Concrete => Some(2400.0),
        MaterialBucket::Steel => Some(7850.0),
        MaterialBucket::Clt => Some(500.0),
        MaterialBucket::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_conversion() {
        let v = volume_to_cubic_meters(Some(100.0), VolumeUnit::CubicFeet);
        assert!((v - 2.83168466).abs() < 1e-12);
        assert_eq!(volume_to_cubic_meters(Some(3.5), VolumeUnit::CubicMeters), 3.5);
    }

    #[test]
    fn test_volume_no_contribution() {
        assert_eq!(volume_to_cubic_meters(None, VolumeUnit::CubicFeet), 0.0);
        assert_eq!(volume_to_cubic_meters(Some(0.0), VolumeUnit::CubicFeet), 0.0);
        assert_eq!(volume_to_cubic_meters(Some(-4.0), VolumeUnit::CubicMeters), 0.0);
        assert_eq!(volume_to_cubic_meters(Some(f64::NAN), VolumeUnit::CubicMeters), 0.0);
    }

    #[test]
    fn test_density_resolution() {
        let declared = MaterialCandidate::named("C30/37").with_density(2350.0);
        assert_eq!(resolve_density(&declared), Some(2350.0));

        let zero = MaterialCandidate::named("C30/37").with_density(0.0);
        assert_eq!(resolve_density(&zero), None);
        assert_eq!(resolve_density(&MaterialCandidate::named("C30/37")), None);

        assert_eq!(fallback_density(MaterialBucket::Steel), Some(7850.0));
        assert_eq!(fallback_density(MaterialBucket::Other), None);
    }
}
