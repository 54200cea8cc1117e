//! Shared test fixtures for PlanForge crates.
//!
//! This crate provides toy planning problems and oracles for testing.
//! It depends only on `planforge-core` so every other crate can use it as a
//! dev-dependency.
//!
//! - [`problems`] - Small planning problems with a known set of behaviours
//! - [`oracles`] - Enumerating, scripted, sleeping and panicking oracles
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! planforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```
//! use planforge_core::{Oracle, OracleContext, OracleOptions, OracleOutcome};
//! use planforge_test::{delivery_problem, EnumeratingOracle};
//!
//! let problem = delivery_problem();
//! let oracle = EnumeratingOracle::new(3);
//! let outcome = oracle.solve(&problem, &OracleOptions::new(), &OracleContext::new());
//! assert!(matches!(outcome, OracleOutcome::Solved(_)));
//! ```

pub mod oracles;
pub mod problems;

pub use oracles::{
    CountingOracle, EnumeratingOracle, PanickingOracle, ScriptedOracle, SleepingOracle,
};
pub use problems::{counter_problem, delivery_problem, DELIVERY_FUEL_USAGES};
