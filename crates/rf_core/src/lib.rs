//! rf_core — Core types, domains, ordering helpers, and numeric guards.
//!
//! This crate is **I/O-free**. It defines the stable types/APIs used across
//! the engine (`rf_io`, `rf_algo`, `rf_pipeline`, `rf_cli`):
//!
//! - Registry tokens: `ProjectId`, `MetricId`
//! - Entities: `ProjectRecord`, `ProjectRegistry`, `Ballot`
//! - Round parameters: `Params` (budget, cap, floor, surplus mode)
//! - The one named deterministic total order used by every allocation pass
//! - Float guards that make 0/0 an explicit branch instead of NaN
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken,
        DomainOutOfRange(&'static str),
        DuplicateProject,
        DuplicateMetric,
        EmptyRegistry,
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken => write!(f, "invalid token"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
                CoreError::DuplicateProject => write!(f, "duplicate project id"),
                CoreError::DuplicateMetric => write!(f, "duplicate metric id"),
                CoreError::EmptyRegistry => write!(f, "registry has no projects"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod tokens;
pub mod entities;
pub mod determinism;
pub mod numeric;
pub mod variables;

pub use entities::{Ballot, ProjectRecord, ProjectRegistry};
pub use errors::CoreError;
pub use tokens::{MetricId, ProjectId};
pub use variables::{validate_domains, Params, SurplusMode};
