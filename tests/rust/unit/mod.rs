//! Unit tests over the public library surface
//!
//! Component-level coverage lives in the `#[cfg(test)]` modules next to the
//! code; these tests exercise the documented end-to-end translation behavior.

mod parser_robustness_tests;
mod translation_scenario_tests;
