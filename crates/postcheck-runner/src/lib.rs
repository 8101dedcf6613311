//! postcheck-runner: HTTP sessions and the scripted scenario
//!
//! Builds on postcheck-core: sessions issue the raw requests, the scenario
//! sequences them and records per-step outcomes.

mod scenario;
mod session;

pub use scenario::{ScenarioRunner, StepError};
pub use session::{ApiSession, SessionError};
