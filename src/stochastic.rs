//! Reduction of uncertain panel output to a deterministic storage requirement.
//!
//! Daily panel output is assumed to be normally distributed. For a confidence level `c`, the
//! output which is met or exceeded with probability `c` is:
//!
//! ```text
//! guaranteed = capacity * (mean_fraction - z * std_dev_fraction),   z = Φ⁻¹(c)
//! ```
//!
//! Each installed panel contributes `demand - guaranteed` to the storage which must be provided.
use crate::component::PanelType;
use crate::parameters::check_confidence_level;
use crate::units::{Dimensionless, Energy};
use anyhow::Result;

/// Coefficients for the central region of the rational approximation to Φ⁻¹
const A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_69e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];

/// Coefficients for the tails
const C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];

/// Boundary between the central region and the tails
const P_LOW: f64 = 0.024_25;

/// Inverse of the standard normal cumulative distribution function.
///
/// Uses Acklam's rational approximation (relative error below 1.2e-9). `p` must lie strictly
/// between zero and one; the infinities are returned at the end points and NaN outside them.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        tail(q)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -tail(q)
    }
}

/// Rational approximation for the lower tail
fn tail(q: f64) -> f64 {
    (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
        / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
}

/// Get the z-score for the given confidence level.
///
/// Fails unless the confidence level is strictly between zero and one.
pub fn z_score(confidence_level: Dimensionless) -> Result<Dimensionless> {
    check_confidence_level(confidence_level)?;

    Ok(Dimensionless(inverse_normal_cdf(confidence_level.value())))
}

/// Daily output of a single panel which is met or exceeded with the confidence given by `z`
pub fn guaranteed_output(panel: &PanelType, z: Dimensionless) -> Energy {
    let fraction = panel.output.mean_fraction - z * panel.output.std_dev_fraction;
    panel.component.capacity * fraction
}

/// Storage needed for each installed panel of this type to cover the daily demand
pub fn storage_shortfall(panel: &PanelType, demand: Energy, z: Dimensionless) -> Energy {
    demand - guaranteed_output(panel, z)
}

/// Total storage required for the given numbers of each panel type.
///
/// This is the numeric counterpart of the battery storage constraint in the model.
pub fn required_storage<'a, I>(panels: I, demand: Energy, z: Dimensionless) -> Energy
where
    I: IntoIterator<Item = (&'a PanelType, u32)>,
{
    panels
        .into_iter()
        .map(|(panel, quantity)| storage_shortfall(panel, demand, z) * Dimensionless::from(quantity))
        .sum()
}
