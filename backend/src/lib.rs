//! Job Board Backend
//!
//! REST surface over the job board entity store:
//! - Jobs: post, edit, close, delete, search
//! - Applications: apply, review, per-job / per-applicant views
//! - Dashboards: employer and applicant stats, board summary

pub mod api;
pub mod config;
pub mod identity;

pub use api::*;
pub use config::*;
