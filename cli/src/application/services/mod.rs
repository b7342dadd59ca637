//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod auth;
pub mod capacity;
pub mod dev_sync;
pub mod feature;
pub mod git_sync;
pub mod permissions;
pub mod provision;
pub mod session;
pub mod workspace;
