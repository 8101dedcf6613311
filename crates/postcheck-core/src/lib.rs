//! postcheck-core: Posting model, matching and reconciliation logic
//!
//! This crate provides the fundamental types for exercising a blog-post API:
//! the Posting record, presence-aware matching, set reconciliation, the
//! update workflow, response verification checks, and the typed fixture
//! configuration.

pub mod apispec;
pub mod check;
pub mod config;
pub mod context;
pub mod matcher;
pub mod posting;
pub mod reconcile;
pub mod report;

pub use apispec::{ApiSpec, FieldKind, FieldSpec};
pub use check::{AssertionError, ResponseSnapshot};
pub use config::{Actor, ActorProfile, Config, ConfigError, ExpectedOptions};
pub use context::{ContextError, ScenarioContext};
pub use matcher::{find_match, find_match_index};
pub use posting::{Posting, resource_path, validate_url};
pub use reconcile::{
    MatchNotFoundError, UpdateError, Updated, get_subset, is_none_found, is_subset,
    modify_content, update_target_postings,
};
pub use report::{ScenarioReport, StepOutcome, StepStatus};
