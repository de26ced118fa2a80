//! The contingency sweep: exhaustive N-k enumeration of breaker outages.
//!
//! Combinations are processed strictly sequentially in lexicographic order
//! over the breaker list. One accumulator crosses combination boundaries;
//! the tie lists in it are order-sensitive, so the enumeration order is part
//! of the contract.

pub mod aggregate;

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::client::CalcClient;
use crate::model::{variant, Breaker, NetworkModel};
use crate::phasor::{extract_currents, PhasorMap};
use aggregate::GlobalResult;

/// One analyzed outage case.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CaseResult {
    /// Opened breaker IDs, in enumeration order.
    pub opened: Vec<String>,
    /// Largest current magnitude observed in this case, 0 when nothing flows.
    pub local_max: f64,
    /// Display name of the breaker carrying the local maximum.
    pub max_element: Option<String>,
}

/// All k-subsets of `ids`, lexicographic over the input order. k = 0 yields
/// exactly one empty case; k beyond the population yields none.
pub fn outage_cases(ids: &[String], k: usize) -> Vec<Vec<String>> {
    ids.iter().cloned().combinations(k).collect()
}

/// Runs the full C(n, k) sweep. A failed calculation degrades that combination
/// to an empty phasor map with a warning; the sweep always completes.
pub async fn run_sweep(
    calc: &CalcClient,
    base: &NetworkModel,
    breakers: &[Breaker],
    k: usize,
) -> (Vec<CaseResult>, GlobalResult) {
    let ids: Vec<String> = breakers.iter().map(|b| b.id.clone()).collect();
    let cases = outage_cases(&ids, k);
    info!(total = cases.len(), k, "starting contingency sweep");

    let mut results = Vec::with_capacity(cases.len());
    let mut global = GlobalResult::default();

    for (idx, case) in cases.iter().enumerate() {
        let label = display_names(breakers, case).join(" + ");
        info!("[{}/{}] opening: {label}", idx + 1, cases.len());

        let variant = variant::outage_variant(base, case);
        let currents = match calc.calculate(&variant).await {
            Ok(raw) => extract_currents(&raw),
            Err(err) => {
                warn!(%err, "calculation failed, treating combination as currentless");
                PhasorMap::new()
            }
        };

        let (local_max, max_element) = local_maximum(breakers, &currents);
        if let Some(name) = &max_element {
            debug!("max fault current through {name}: {local_max:.3} kA");
        }

        global.fold(local_max, max_element.as_deref(), case);
        results.push(CaseResult {
            opened: case.clone(),
            local_max,
            max_element,
        });
    }

    (results, global)
}

/// Largest-magnitude breaker current in one case; (0, None) when nothing
/// flows. Strict comparison, so among equal magnitudes the first breaker in
/// enumeration order is attributed.
fn local_maximum(breakers: &[Breaker], currents: &PhasorMap) -> (f64, Option<String>) {
    let mut local_max = 0.0;
    let mut max_element = None;
    for breaker in breakers {
        if let Some(Some(phasor)) = currents.get(&breaker.id) {
            debug!(
                "{}: |I|={:.3} kA angle {:.1} deg",
                breaker.name, phasor.magnitude, phasor.angle_deg
            );
            if phasor.magnitude > local_max {
                local_max = phasor.magnitude;
                max_element = Some(breaker.name.clone());
            }
        }
    }
    (local_max, max_element)
}

/// Human labels for a set of breaker IDs, falling back to the raw ID.
pub fn display_names(breakers: &[Breaker], ids: &[String]) -> Vec<String> {
    ids.iter()
        .map(|id| {
            breakers
                .iter()
                .find(|b| &b.id == id)
                .map(|b| b.name.clone())
                .unwrap_or_else(|| id.clone())
        })
        .collect()
}
