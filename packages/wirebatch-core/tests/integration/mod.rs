//! Integration test suite.
//!
//! 1. Batch encode/decode end to end
//! 2. Round-trip property over arbitrary operation sequences
//! 3. Callback registry under concurrent registration and lookup

pub mod batch_tests;
pub mod registry_tests;
pub mod roundtrip_property;
