pub mod auth;
pub mod calc;

pub use calc::{CalcClient, CalcError};
