//! Derived model variants.
//!
//! The base model is read-only once loaded; every perturbation works on an
//! independent clone, so no variant can leak state into the base or into
//! another variant.

use super::{Element, NetworkModel};

/// Clone of `base` with every breaker in `opened_ids` forced open on all three
/// phases. IDs that are unknown or do not name a breaker are ignored; callers
/// only pass IDs taken from [`NetworkModel::breakers`].
pub fn outage_variant(base: &NetworkModel, opened_ids: &[String]) -> NetworkModel {
    let mut variant = base.clone();
    for id in opened_ids {
        if let Some(el) = variant.elements.get_mut(id) {
            if el.is_breaker() {
                open_all_phases(el);
            }
        }
    }
    variant
}

/// Clone of `base` with every short-circuit element's fault disabled. The
/// topology is untouched; used once before the sweep to characterize the
/// pre-fault currents.
pub fn normal_mode_variant(base: &NetworkModel) -> NetworkModel {
    let mut variant = base.clone();
    for el in variant.elements.values_mut() {
        if el.is_short_circuit() {
            if let Some(faults) = el.faults.as_mut() {
                if let Some(state) = faults.states.first_mut() {
                    state.enabled = Some(false);
                }
            }
        }
    }
    variant
}

// Partial-phase opening is not modeled; a breaker opens atomically.
fn open_all_phases(el: &mut Element) {
    if let Some(states) = el.states.as_mut() {
        if let Some(state) = states.first_mut() {
            state.a_closed = Some(false);
            state.b_closed = Some(false);
            state.c_closed = Some(false);
        }
    }
}
