//! # eurocode_core - EN 1990 Load-Combination Engine
//!
//! `eurocode_core` turns a structural engineer's list of permanent and variable
//! loads into the complete set of Eurocode 0 combinations: the fundamental
//! ultimate limit state (ELU) and the characteristic, frequent and
//! quasi-permanent serviceability states (ELS).
//!
//! ## Design Philosophy
//!
//! - **Pure generation**: [`loads::generate`] reads an immutable snapshot and
//!   returns derived data; nothing is mutated, nothing is persisted
//! - **JSON-First**: All types implement Serialize (and Deserialize for inputs)
//! - **Rich Errors**: User-facing validation failures are distinct from
//!   contract violations
//! - **Formula/result lockstep**: every formula is rendered from the very terms
//!   that were summed
//!
//! ## Quick Start
//!
//! ```rust
//! use eurocode_core::loads::{generate, FormulaStyle, LoadRegistry, display_string};
//!
//! let registry = LoadRegistry::with_seed_data();
//! let set = generate(&registry.snapshot()).unwrap();
//!
//! let first = display_string(&set.combinations[0], FormulaStyle::Numeric, 3);
//! assert_eq!(first, "ELU — Q1 dominant : 1.35×25 + 1.5×15 = 56.25");
//! ```
//!
//! ## Modules
//!
//! - [`loads`] - Loads, coefficient table, registry, generator and formulas
//! - [`session`] - Session container with automatic invalidation of stale results
//! - [`errors`] - Structured error types

pub mod errors;
pub mod loads;
pub mod session;

// Re-export commonly used types at crate root for convenience
pub use errors::{CalcError, CalcResult};
pub use loads::{generate, Combination, CombinationSet, Load, LoadCategory, LoadRegistry, UsageCategory};
pub use session::{Session, SessionMetadata};
