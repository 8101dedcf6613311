//! The scripted end-to-end scenario
//!
//! Sequential CRUD suite against a live blog-post API: pin the published
//! description, create the fixture postings, reconcile them against the
//! registered collection, run the update workflow, and clean up. One
//! [`StepOutcome`] per step; a failed step skips everything that depends
//! on it.

use std::time::Instant;

use postcheck_core::check::{
    AssertionError, verify_created_posting, verify_deleted, verify_not_found,
    verify_options_response, verify_postings_response, verify_updated_posting,
};
use postcheck_core::config::{Actor, Config};
use postcheck_core::context::{
    ContextError, REGISTERED_POSTINGS, ScenarioContext, TARGET_POSTINGS,
};
use postcheck_core::matcher::find_match;
use postcheck_core::posting::Posting;
use postcheck_core::reconcile::{
    UpdateError, get_subset, is_none_found, is_subset, modify_content, update_target_postings,
};
use postcheck_core::report::{ScenarioReport, StepOutcome, StepStatus};

use crate::session::{ApiSession, SessionError};

/// Why one scenario step failed.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Assertion(#[from] AssertionError),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Update(#[from] UpdateError<SessionError>),
}

/// Runs the scenario and produces a [`ScenarioReport`].
pub struct ScenarioRunner {
    config: Config,
    skip_cleanup: bool,
}

impl ScenarioRunner {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            skip_cleanup: false,
        }
    }

    /// Leave the created postings in place after the run.
    #[must_use]
    pub fn with_skip_cleanup(mut self, skip: bool) -> Self {
        self.skip_cleanup = skip;
        self
    }

    /// Open both actor sessions and run every step.
    ///
    /// # Errors
    ///
    /// Returns error only when a session cannot be built; step failures are
    /// recorded in the report, not raised.
    pub fn run(&self) -> Result<ScenarioReport, SessionError> {
        let config = &self.config;
        let admin = ApiSession::open(config, Actor::Admin)?;
        let user = ApiSession::open(config, Actor::User)?;

        eprintln!(
            "Running scenario against {} ({} fixture postings)...",
            config.base_url,
            config.postings.len()
        );

        let started = Instant::now();
        let mut context = ScenarioContext::new();
        let mut recorder = Recorder::default();

        recorder.run("verify published api description", || {
            let response = admin.options_postings()?;
            verify_options_response(&response, &config.options_response, &config.api_spec)?;
            Ok("status, headers and document pinned".to_string())
        });

        recorder.run("reject unknown postings route", || {
            let response = admin.fetch_postings_invalid()?;
            verify_not_found(&response)?;
            Ok(format!("{} answered 404", config.invalid_postings_uri))
        });

        recorder.run("create target postings", || {
            for fixture in &config.postings {
                let response = admin.create_posting(fixture)?;
                verify_created_posting(&response, fixture, &config.api_spec, &config.base_url)?;
            }
            Ok(format!("{} postings created", config.postings.len()))
        });

        recorder.run("fetch registered postings", || {
            let response = admin.fetch_postings()?;
            let registered = verify_postings_response(&response, &config.base_url)?;
            let count = registered.len();
            context.set_postings(REGISTERED_POSTINGS, &registered);
            Ok(format!("{count} postings registered"))
        });

        recorder.run("verify target postings registered", || {
            let registered = context.postings(REGISTERED_POSTINGS)?;
            require_registered(&config.postings, &registered)?;
            let targets = get_subset(&config.postings, &registered);
            let count = targets.len();
            context.set_postings(TARGET_POSTINGS, &targets);
            Ok(format!("{count} targets resolved to full records"))
        });

        recorder.run("verify postings visible to regular user", || {
            let targets = context.postings(TARGET_POSTINGS)?;
            let response = user.fetch_postings()?;
            let seen = verify_postings_response(&response, &config.base_url)?;
            require_registered(&targets, &seen)?;
            Ok(format!("{} targets visible as {}", targets.len(), user.label()))
        });

        recorder.run("update target postings", || {
            let targets = context.postings(TARGET_POSTINGS)?;
            let mut registered = context.postings(REGISTERED_POSTINGS)?;

            let updated =
                update_target_postings(&targets, &mut registered, modify_content, |posting| {
                    admin.update_posting(posting)
                })?;
            for update in &updated {
                verify_updated_posting(&update.response, &update.posting)?;
            }

            // Reconcile: the mutated records must now be registered.
            let response = admin.fetch_postings()?;
            let refreshed = verify_postings_response(&response, &config.base_url)?;
            let mutated: Vec<Posting> = updated.into_iter().map(|u| u.posting).collect();
            require_registered(&mutated, &refreshed)?;

            let count = mutated.len();
            context.set_postings(REGISTERED_POSTINGS, &refreshed);
            context.set_postings(TARGET_POSTINGS, &mutated);
            Ok(format!("{count} postings updated and reconciled"))
        });

        if self.skip_cleanup {
            recorder.skip_with("delete target postings", "cleanup skipped on request");
        } else {
            recorder.run("delete target postings", || {
                let targets = context.postings(TARGET_POSTINGS)?;
                for target in &targets {
                    let response = admin.delete_posting(target)?;
                    verify_deleted(&response)?;
                }

                let response = admin.fetch_postings()?;
                let remaining = verify_postings_response(&response, &config.base_url)?;
                require_unregistered(&targets, &remaining)?;
                Ok(format!("{} postings deleted", targets.len()))
            });
        }

        Ok(ScenarioReport::new(
            config.base_url.clone(),
            recorder.steps,
            started.elapsed().as_secs_f64(),
        ))
    }
}

/// Assert that every element of `subset` is registered in `superset`,
/// naming the first one that is not.
fn require_registered(subset: &[Posting], superset: &[Posting]) -> Result<(), AssertionError> {
    if is_subset(subset, superset) {
        return Ok(());
    }
    let missing = subset
        .iter()
        .find(|t| find_match(t, superset).is_none())
        .map(Posting::label)
        .unwrap_or_default();
    Err(AssertionError::NotRegistered { target: missing })
}

/// Assert that no element of `subset` remains in `superset`, naming the
/// first one still present.
fn require_unregistered(subset: &[Posting], superset: &[Posting]) -> Result<(), AssertionError> {
    if is_none_found(subset, superset) {
        return Ok(());
    }
    let present = subset
        .iter()
        .find(|t| find_match(t, superset).is_some())
        .map(Posting::label)
        .unwrap_or_default();
    Err(AssertionError::StillRegistered { target: present })
}

/// Records step outcomes; after the first failure every further step is
/// skipped (the suite is strictly sequential).
#[derive(Default)]
struct Recorder {
    steps: Vec<StepOutcome>,
    aborted: bool,
}

impl Recorder {
    fn run(&mut self, name: &str, step: impl FnOnce() -> Result<String, StepError>) {
        if self.aborted {
            eprintln!("  skip {name}");
            self.steps.push(StepOutcome::skipped(name));
            return;
        }
        match step() {
            Ok(detail) => {
                eprintln!("  ok   {name} ({detail})");
                self.steps.push(StepOutcome::passed(name, detail));
            }
            Err(e) => {
                eprintln!("  FAIL {name}: {e}");
                self.steps.push(StepOutcome::failed(name, e.to_string()));
                self.aborted = true;
            }
        }
    }

    fn skip_with(&mut self, name: &str, reason: &str) {
        eprintln!("  skip {name} ({reason})");
        self.steps.push(StepOutcome {
            name: name.to_string(),
            status: StepStatus::Skipped,
            detail: Some(reason.to_string()),
        });
    }
}
