//! Shared test utilities for skilltest.

pub mod fixtures;
pub mod logging;

pub use fixtures::{CONTRACT, HANDLER_SCRIPT, MANIFEST, SkillProjectFixture};
pub use logging::TestLogger;
