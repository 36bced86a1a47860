//! Integration test crate for Gale.
//!
//! This crate has no library code. It only contains tests that drive the fee
//! engine and the attestation protocol together across workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p gale-integration-tests
//! ```
