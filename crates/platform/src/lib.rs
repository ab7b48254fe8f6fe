//! Dashboard session handling: demo login gate, data source selection and filters.

pub mod session;

pub use session::{DeviceType, Platform, Region, SessionContext, SessionFilters};
