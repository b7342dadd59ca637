//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod api;
pub mod capacity;
pub mod config;
pub mod credentials;
pub mod error;
pub mod git;
pub mod permissions;
pub mod report;
pub mod workspace;

pub use api::{ApiRequest, ApiResponse, Audience, CliReply, HttpMethod, StatusClass};
pub use config::{GitConfig, Pacing, SolutionConfig};
pub use error::{AuthError, ConfigError, ProvisionError};
pub use report::{RunReport, Step};
