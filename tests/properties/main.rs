//! Property-based test suite entry point.

mod contract_properties;
mod validation_properties;
