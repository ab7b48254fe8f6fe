//! Seeded synthetic analytics datasets and the mock query console.

pub mod generator;
pub mod query;

pub use generator::{SyntheticMetricsGenerator, DEFAULT_SEED};
pub use query::{QueryConsole, QueryResult};
