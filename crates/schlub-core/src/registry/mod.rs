//! The service registry and its reference records.

mod container;
mod reference;

pub use container::Registry;
pub use reference::{RegistrationOptions, ServiceReference, ServiceSummary};
