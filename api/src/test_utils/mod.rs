//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Why manual mocks instead of mockall?
//! - mockall has lifetime issues with traits containing `&str` parameters
//! - Manual mocks are more explicit and easier to debug
//! - The engagement mock shares its model store with the model mock, which a
//!   generated mock cannot express

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
