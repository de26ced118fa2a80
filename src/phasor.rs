//! Current phasor extraction from raw calculation responses.
//!
//! The service returns, per element, an `I` list of `[re, im]` samples
//! (multiple phase or sequence components). Each element collapses to the
//! single max-magnitude sample, or to "no current" when nothing exceeds the
//! negligibility floor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Magnitudes at or below this are treated as "no current".
pub const NEGLIGIBLE_CURRENT: f64 = 1e-6;

/// One current phasor in polar form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phasor {
    /// |I|, in the unit the service reports (kA).
    pub magnitude: f64,
    /// atan2(im, re) in degrees, range (-180, 180].
    pub angle_deg: f64,
}

impl Phasor {
    pub fn from_complex(re: f64, im: f64) -> Self {
        Self {
            magnitude: re.hypot(im),
            angle_deg: im.atan2(re).to_degrees(),
        }
    }
}

/// Per-element phasors; `None` marks an element with no observable current.
pub type PhasorMap = BTreeMap<String, Option<Phasor>>;

/// Collapses a raw per-element response to one representative phasor each.
///
/// A missing or non-list `I`, a malformed sample, or a best magnitude at or
/// below [`NEGLIGIBLE_CURRENT`] all map to `None`; anomalies in one element
/// never affect the others.
pub fn extract_currents(raw: &Value) -> PhasorMap {
    let mut out = PhasorMap::new();
    let Some(elements) = raw.as_object() else {
        return out;
    };
    for (id, data) in elements {
        let best = data
            .get("I")
            .and_then(Value::as_array)
            .and_then(|samples| best_sample(samples));
        out.insert(id.clone(), best);
    }
    out
}

/// Max-magnitude sample wins; ties keep the first seen. This is the documented
/// rule for collapsing multi-sequence fault data to one representative value.
fn best_sample(samples: &[Value]) -> Option<Phasor> {
    let mut best: Option<Phasor> = None;
    for sample in samples {
        let Some(pair) = sample.as_array() else {
            continue;
        };
        if pair.len() != 2 {
            continue;
        }
        let (Some(re), Some(im)) = (pair[0].as_f64(), pair[1].as_f64()) else {
            continue;
        };
        let candidate = Phasor::from_complex(re, im);
        if best.map_or(true, |b| candidate.magnitude > b.magnitude) {
            best = Some(candidate);
        }
    }
    best.filter(|p| p.magnitude > NEGLIGIBLE_CURRENT)
}
