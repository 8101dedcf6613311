//! Set reconciliation over registered postings
//!
//! Subset containment, subset projection, exclusion, and the
//! update-and-reconcile workflow. All built on [`crate::matcher`]; the
//! update workflow additionally takes the write operation as an injected
//! collaborator so this module stays free of I/O.

use thiserror::Error;

use crate::matcher::{find_match, find_match_index};
use crate::posting::Posting;

/// Replacement value applied by [`modify_content`].
pub const MODIFIED_CONTENT: &str = "modified content";

/// A target posting had no match among the registered postings. This is a
/// precondition violation: the workflow aborts, writes already issued are
/// preserved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no registered posting matches target `{target}`")]
pub struct MatchNotFoundError {
    /// Label of the unmatched target.
    pub target: String,
}

impl MatchNotFoundError {
    fn new(target: &Posting) -> Self {
        Self {
            target: target.label(),
        }
    }
}

/// Update-workflow failure.
#[derive(Debug, Error)]
pub enum UpdateError<E> {
    #[error(transparent)]
    MatchNotFound(#[from] MatchNotFoundError),

    /// The injected write operation failed. Carried through unmodified.
    #[error("write request failed: {0}")]
    Write(E),
}

/// One mutated record together with the response its write produced.
///
/// The workflow never inspects the response; it is carried so the caller
/// can assert on it in a separate verification step.
#[derive(Debug, Clone)]
pub struct Updated<R> {
    pub posting: Posting,
    pub response: R,
}

/// True iff every element of `subset` has a match in `superset`.
/// Short-circuits on the first miss.
#[must_use]
pub fn is_subset(subset: &[Posting], superset: &[Posting]) -> bool {
    subset.iter().all(|t| find_match(t, superset).is_some())
}

/// Project each element of `subset` onto its matched record in `superset`.
///
/// The result preserves `subset`'s order, holds the full registered records
/// (not the partial targets), and skips elements without a match.
#[must_use]
pub fn get_subset(subset: &[Posting], superset: &[Posting]) -> Vec<Posting> {
    subset
        .iter()
        .filter_map(|t| find_match(t, superset).cloned())
        .collect()
}

/// True iff no element of `subset` has any match in `superset`.
/// Short-circuits on the first match found.
#[must_use]
pub fn is_none_found(subset: &[Posting], superset: &[Posting]) -> bool {
    subset.iter().all(|t| find_match(t, superset).is_none())
}

/// Default mutation: overwrite `content` with [`MODIFIED_CONTENT`].
pub fn modify_content(posting: &mut Posting) {
    posting.content = Some(MODIFIED_CONTENT.to_string());
}

/// Resolve each target against `registered`, mutate the matched record in
/// place, and issue the injected write with the mutated full record.
///
/// Targets are processed in order. Returns the mutated records paired with
/// their write responses.
///
/// # Errors
///
/// - [`UpdateError::MatchNotFound`] when a target has no match; remaining
///   targets are not processed.
/// - [`UpdateError::Write`] when the write operation fails; surfaced
///   immediately, unmodified.
pub fn update_target_postings<R, E>(
    targets: &[Posting],
    registered: &mut [Posting],
    mut mutation: impl FnMut(&mut Posting),
    mut write: impl FnMut(&Posting) -> Result<R, E>,
) -> Result<Vec<Updated<R>>, UpdateError<E>> {
    let mut updated = Vec::with_capacity(targets.len());
    for target in targets {
        let index =
            find_match_index(target, registered).ok_or_else(|| MatchNotFoundError::new(target))?;
        mutation(&mut registered[index]);
        let response = write(&registered[index]).map_err(UpdateError::Write)?;
        updated.push(Updated {
            posting: registered[index].clone(),
            response,
        });
    }
    Ok(updated)
}
