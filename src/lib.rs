//! N-k breaker contingency sweep for short-circuit fault currents.
//!
//! Drives a remote fault-calculation service: enumerates every combination of
//! k simultaneously opened breakers, resubmits the perturbed network model,
//! extracts per-element current phasors, and tracks which outage combination
//! produces the globally maximum fault current.

pub mod client;
pub mod config;
pub mod model;
pub mod phasor;
pub mod sweep;
pub mod telemetry;
