//! Flytrafikk - server-side flight surveillance aggregation.
//!
//! Turns a raw aircraft-surveillance snapshot from OpenSky Network into
//! an enriched, UI-ready dataset under a hard wall-clock budget,
//! degrading gracefully when secondary sources are slow, rate-limited or
//! absent.
//!
//! # High-Level API
//!
//! ```ignore
//! use flytrafikk::airlines::AirlineTable;
//! use flytrafikk::budget::RequestBudget;
//! use flytrafikk::config::AppConfig;
//! use flytrafikk::model::BoundingBox;
//! use flytrafikk::orchestrator::Orchestrator;
//! use flytrafikk::provider::ReqwestClient;
//!
//! let config = AppConfig::from_env();
//! let table = AirlineTable::global(&config.data_dir);
//! let orchestrator = Orchestrator::new(ReqwestClient::new()?, config.clone(), table);
//!
//! let budget = RequestBudget::new(config.budget.ceiling());
//! let snapshot = orchestrator
//!     .bounding_box_snapshot(&BoundingBox { lamin: 58.0, lamax: 62.0, lomin: 4.0, lomax: 8.0 }, &budget)
//!     .await;
//! ```

pub mod airlines;
pub mod budget;
pub mod config;
pub mod enrich;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod provider;

/// Version of the flytrafikk library, synchronized across the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
