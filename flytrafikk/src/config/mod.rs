//! Configuration for all flytrafikk components.
//!
//! Split the way the rest of the crate consumes it:
//!
//! - `settings`: plain data structs, one per concern
//! - `defaults`: every default value and named constant
//! - `env`: the once-at-startup environment loader

mod defaults;
mod env;
mod settings;

pub use defaults::*;
pub use settings::{
    AeroDataBoxSettings, AirLabsSettings, AppConfig, BudgetSettings, EnrichmentSettings,
    OpenSkySettings, RetrySettings,
};
