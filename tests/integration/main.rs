//! Integration test suite entry point.

mod end_to_end;
mod process_handler_tests;
