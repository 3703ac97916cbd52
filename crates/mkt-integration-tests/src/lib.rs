//! Integration test crate for marketplace audit recording.
//!
//! This crate exists solely to run end-to-end recording scenarios.
//! It has no public API - all functionality is in the test modules.

#![forbid(unsafe_code)]
