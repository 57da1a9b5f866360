// Shared fixtures for the intake integration tests
#![allow(dead_code)]

pub mod test_harness;
