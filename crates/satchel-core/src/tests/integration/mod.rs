#![cfg(test)]

pub mod lifecycle_tests;
pub mod host_tests;
