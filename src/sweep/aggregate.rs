//! Global-maximum accumulator and the persisted sweep report.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::phasor::PhasorMap;

/// Magnitudes closer than this are ties, consistent with the phasor
/// negligibility floor.
pub const MAGNITUDE_EPS: f64 = 1e-6;

/// Running global maximum across the sweep, folded once per combination.
/// The maximum is monotonically non-decreasing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GlobalResult {
    pub global_max: f64,
    /// Breaker names that attained the maximum, across all winning cases.
    pub winning_names: BTreeSet<String>,
    /// Winning outage combinations, in enumeration order.
    pub winning_cases: Vec<Vec<String>>,
}

impl GlobalResult {
    /// Folds one case into the accumulator.
    ///
    /// Strictly larger (beyond the epsilon) replaces the winner set; within
    /// the epsilon, and only when a current was attributed to an element, the
    /// case accumulates as a tie. Anything else leaves the state untouched.
    pub fn fold(&mut self, local_max: f64, max_element: Option<&str>, case: &[String]) {
        if local_max > self.global_max + MAGNITUDE_EPS {
            self.global_max = local_max;
            self.winning_names = max_element.map(str::to_owned).into_iter().collect();
            self.winning_cases = vec![case.to_vec()];
        } else if (local_max - self.global_max).abs() < MAGNITUDE_EPS {
            if let Some(name) = max_element {
                self.winning_names.insert(name.to_owned());
                self.winning_cases.push(case.to_vec());
            }
        }
    }

    /// True when no combination produced a non-negligible current.
    pub fn no_currents(&self) -> bool {
        self.global_max <= MAGNITUDE_EPS
    }
}

/// Final state of a completed sweep, written once as JSON.
#[derive(Debug, Serialize)]
pub struct SweepReport {
    pub generated_at: DateTime<FixedOffset>,
    /// Pre-fault currents (fault suppressed, topology intact).
    pub normal: PhasorMap,
    /// Fault currents with every breaker still closed.
    pub fault_no_outage: PhasorMap,
    pub winning_cases: Vec<Vec<String>>,
    pub global_max: f64,
}

impl SweepReport {
    pub fn new(normal: PhasorMap, fault_no_outage: PhasorMap, global: &GlobalResult) -> Self {
        Self {
            generated_at: chrono::Local::now().fixed_offset(),
            normal,
            fault_no_outage,
            winning_cases: global.winning_cases.clone(),
            global_max: global.global_max,
        }
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("failed to serialize sweep report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write sweep report to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phasor::Phasor;

    fn case(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn larger_maximum_replaces_the_winner_set() {
        let mut global = GlobalResult::default();
        global.fold(9.0, Some("Feeder A"), &case(&["b2"]));
        global.fold(12.5, Some("Feeder B"), &case(&["b1"]));

        assert_eq!(global.global_max, 12.5);
        assert_eq!(global.winning_names, BTreeSet::from(["Feeder B".to_string()]));
        assert_eq!(global.winning_cases, vec![case(&["b1"])]);
    }

    #[test]
    fn near_equal_maxima_accumulate_as_ties() {
        let mut global = GlobalResult::default();
        global.fold(12.5, Some("Feeder B"), &case(&["b1"]));
        global.fold(12.5 + 5e-7, Some("Feeder C"), &case(&["b3"]));

        assert_eq!(global.global_max, 12.5);
        assert_eq!(
            global.winning_names,
            BTreeSet::from(["Feeder B".to_string(), "Feeder C".to_string()])
        );
        assert_eq!(global.winning_cases, vec![case(&["b1"]), case(&["b3"])]);
    }

    #[test]
    fn clearly_smaller_maxima_leave_the_state_untouched() {
        let mut global = GlobalResult::default();
        global.fold(12.5, Some("Feeder B"), &case(&["b1"]));
        global.fold(9.0, Some("Feeder A"), &case(&["b2"]));

        assert_eq!(global.global_max, 12.5);
        assert_eq!(global.winning_cases, vec![case(&["b1"])]);
    }

    #[test]
    fn currentless_cases_never_accumulate() {
        let mut global = GlobalResult::default();
        global.fold(0.0, None, &case(&["b1"]));
        global.fold(0.0, None, &case(&["b2"]));

        assert_eq!(global.global_max, 0.0);
        assert!(global.winning_names.is_empty());
        assert!(global.winning_cases.is_empty());
        assert!(global.no_currents());
    }

    #[test]
    fn duplicate_winning_names_collapse_in_the_set() {
        let mut global = GlobalResult::default();
        global.fold(12.5, Some("Feeder B"), &case(&["b1"]));
        global.fold(12.5, Some("Feeder B"), &case(&["b2"]));

        assert_eq!(global.winning_names.len(), 1);
        assert_eq!(global.winning_cases, vec![case(&["b1"]), case(&["b2"])]);
    }

    #[test]
    fn report_serializes_final_state() {
        let mut global = GlobalResult::default();
        global.fold(12.5, Some("Feeder B"), &case(&["b1"]));

        let mut fault_map = PhasorMap::new();
        fault_map.insert("b2".into(), Some(Phasor { magnitude: 12.5, angle_deg: 10.0 }));
        fault_map.insert("b1".into(), None);

        let report = SweepReport::new(PhasorMap::new(), fault_map, &global);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["global_max"], serde_json::json!(12.5));
        assert_eq!(value["winning_cases"], serde_json::json!([["b1"]]));
        assert_eq!(value["fault_no_outage"]["b1"], serde_json::Value::Null);
        assert_eq!(value["fault_no_outage"]["b2"]["magnitude"], serde_json::json!(12.5));
    }

    #[test]
    fn report_writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let report = SweepReport::new(PhasorMap::new(), PhasorMap::new(), &GlobalResult::default());
        report.write(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["global_max"], serde_json::json!(0.0));
    }
}
