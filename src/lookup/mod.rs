//! Lookup service composition

mod builder;
mod service;

pub use builder::CardLookupBuilder;
pub use service::CardLookup;
