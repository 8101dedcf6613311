//! Posting matcher — presence-aware matching on the identifying fields
//!
//! A target constrains a candidate only through the fields present on both
//! sides. This lets a partial fixture (say, `title` only) resolve to the
//! full record the server returned for it, while a full target still
//! requires both identifying fields to agree.

use crate::posting::Posting;

/// Per-field agreement: `Some(equal)` when the field is present on both
/// sides, `None` when either side omits it.
fn agreement(target: &Option<String>, candidate: &Option<String>) -> Option<bool> {
    match (target, candidate) {
        (Some(t), Some(c)) => Some(t == c),
        _ => None,
    }
}

/// Whether `candidate` matches `target`.
///
/// Both identifying fields shared → both must agree. One shared → it alone
/// decides. None shared → no match.
#[must_use]
pub fn matches(target: &Posting, candidate: &Posting) -> bool {
    let title = agreement(&target.title, &candidate.title);
    let content = agreement(&target.content, &candidate.content);
    match (title, content) {
        (Some(t), Some(c)) => t && c,
        (Some(t), None) => t,
        (None, Some(c)) => c,
        (None, None) => false,
    }
}

/// First candidate (in iteration order) matching `target`.
#[must_use]
pub fn find_match<'a>(target: &Posting, candidates: &'a [Posting]) -> Option<&'a Posting> {
    find_match_index(target, candidates).map(|i| &candidates[i])
}

/// Index form of [`find_match`], for callers that mutate the matched record.
#[must_use]
pub fn find_match_index(target: &Posting, candidates: &[Posting]) -> Option<usize> {
    candidates.iter().position(|c| matches(target, c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered() -> Vec<Posting> {
        vec![
            Posting {
                url: Some("https://blog.example.com/api/postings/1/".into()),
                id: Some(1),
                ..Posting::new("Posting 1", "Posting 1 content")
            },
            Posting {
                url: Some("https://blog.example.com/api/postings/2/".into()),
                id: Some(2),
                ..Posting::new("Posting 2", "Posting 2 content")
            },
        ]
    }

    #[test]
    fn full_target_matches_on_both_fields() {
        let target = Posting::new("Posting 2", "Posting 2 content");
        let registered = registered();
        let found = find_match(&target, &registered).unwrap();
        assert_eq!(found.id, Some(2));
    }

    #[test]
    fn other_field_differences_are_ignored() {
        // Same title+content, different id/url: still a match.
        let target = Posting {
            id: Some(999),
            ..Posting::new("Posting 1", "Posting 1 content")
        };
        let registered = registered();
        let found = find_match(&target, &registered).unwrap();
        assert_eq!(found.id, Some(1));
    }

    #[test]
    fn title_only_target_matches_on_title_alone() {
        let target = Posting {
            title: Some("Posting 2".into()),
            ..Posting::default()
        };
        let registered = registered();
        let found = find_match(&target, &registered).unwrap();
        assert_eq!(found.id, Some(2));
    }

    #[test]
    fn content_only_target_matches_on_content_alone() {
        let target = Posting {
            content: Some("Posting 1 content".into()),
            ..Posting::default()
        };
        let registered = registered();
        let found = find_match(&target, &registered).unwrap();
        assert_eq!(found.id, Some(1));
    }

    #[test]
    fn one_agreeing_field_is_not_enough_when_both_shared() {
        let target = Posting::new("Posting 1", "Posting 2 content");
        assert!(find_match(&target, &registered()).is_none());
    }

    #[test]
    fn no_shared_identifying_field_is_no_match() {
        // Target carries neither title nor content.
        let target = Posting {
            id: Some(1),
            ..Posting::default()
        };
        assert!(find_match(&target, &registered()).is_none());

        // Candidate carries neither.
        let bare = vec![Posting {
            id: Some(1),
            ..Posting::default()
        }];
        assert!(find_match(&Posting::new("t", "c"), &bare).is_none());
    }

    #[test]
    fn first_match_in_order_wins() {
        let dupes = vec![
            Posting {
                id: Some(1),
                ..Posting::new("same", "same content")
            },
            Posting {
                id: Some(2),
                ..Posting::new("same", "same content")
            },
        ];
        let found = find_match(&Posting::new("same", "same content"), &dupes).unwrap();
        assert_eq!(found.id, Some(1));
    }

    #[test]
    fn empty_candidates_never_match() {
        assert!(find_match(&Posting::new("t", "c"), &[]).is_none());
    }
}
