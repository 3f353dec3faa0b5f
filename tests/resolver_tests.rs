use std::path::PathBuf;

use org_chart::resolver::{FileResolution, FileResolver};
use org_chart::session::{InMemorySessionStore, SessionStore};

fn candidates() -> Vec<String> {
    vec![
        "employees_2024.csv".to_string(),
        "contractors.xlsx".to_string(),
        "org_snapshot.csv".to_string(),
    ]
}

fn resolver() -> FileResolver<InMemorySessionStore> {
    FileResolver::new("/data", 60.0, InMemorySessionStore::new())
}

#[test]
fn test_exact_match_returns_path_without_caching() {
    let r = resolver();
    for name in candidates() {
        let res = r.resolve(Some(&name), &candidates(), "s1", None);
        assert_eq!(res, FileResolution::Resolved(PathBuf::from("/data").join(&name)));
    }
    assert!(r.store().is_empty());
}

#[test]
fn test_exact_match_is_case_sensitive() {
    let r = resolver();
    let res = r.resolve(Some("EMPLOYEES_2024.CSV"), &candidates(), "s1", None);
    // falls through to the fuzzy step, which is case-insensitive
    assert!(matches!(res, FileResolution::Suggestion { ref candidate, .. } if candidate == "employees_2024.csv"));
}

#[test]
fn test_low_scores_never_prompt() {
    let r = resolver();
    for reference in ["qqq", "zz", "xwv"] {
        let res = r.resolve(Some(reference), &candidates(), "s1", None);
        assert!(
            matches!(res, FileResolution::NotFound { .. }),
            "'{}' should not match",
            reference
        );
    }
    assert!(r.store().is_empty());
}

#[test]
fn test_score_equal_to_threshold_is_not_found() {
    let r = resolver();
    let boundary = vec!["azcze.csv".to_string()];

    // best window "azcze" keeps a, c, e of "abcde": exactly 60
    let res = r.resolve(Some("abcde"), &boundary, "s1", None);
    assert_eq!(
        res,
        FileResolution::NotFound {
            reference: Some("abcde".to_string()),
            candidates: boundary.clone(),
        }
    );
    assert!(r.store().is_empty());
}

#[test]
fn test_score_just_above_threshold_suggests() {
    let r = resolver();
    let above = vec!["azcdezzg.csv".to_string()];

    let res = r.resolve(Some("abcdefgh"), &above, "s1", None);
    assert_eq!(
        res,
        FileResolution::Suggestion {
            candidate: "azcdezzg.csv".to_string(),
            score: 62.5,
        }
    );
    assert_eq!(r.store().get("s1"), Some(PathBuf::from("/data/azcdezzg.csv")));
}

#[test]
fn test_suggest_then_confirm_consumes_entry() {
    let r = resolver();

    let res = r.resolve(Some("employes"), &candidates(), "s1", None);
    assert!(matches!(res, FileResolution::Suggestion { .. }));
    assert_eq!(
        r.store().get("s1"),
        Some(PathBuf::from("/data/employees_2024.csv"))
    );

    let res = r.resolve(None, &candidates(), "s1", Some("yes"));
    assert_eq!(
        res,
        FileResolution::Resolved(PathBuf::from("/data/employees_2024.csv"))
    );
    assert!(r.store().get("s1").is_none());

    // second confirmation has nothing left to consume
    let res = r.resolve(None, &candidates(), "s1", Some("yes"));
    assert!(matches!(res, FileResolution::NotFound { reference: None, .. }));
}

#[test]
fn test_confirm_without_suggestion_is_a_cache_miss() {
    let r = resolver();
    let res = r.resolve(None, &candidates(), "fresh", Some("Yes"));
    assert_eq!(
        res,
        FileResolution::NotFound {
            reference: None,
            candidates: candidates(),
        }
    );
}

#[test]
fn test_new_suggestion_replaces_pending_one() {
    let r = resolver();
    r.resolve(Some("employes"), &candidates(), "s1", None);
    r.resolve(Some("snapshot"), &candidates(), "s1", None);
    assert_eq!(
        r.store().get("s1"),
        Some(PathBuf::from("/data/org_snapshot.csv"))
    );
}

#[test]
fn test_sessions_do_not_share_suggestions() {
    let r = resolver();
    r.resolve(Some("contractor"), &candidates(), "alice", None);
    let res = r.resolve(None, &candidates(), "bob", Some("yes"));
    assert!(matches!(res, FileResolution::NotFound { .. }));
    assert!(r.store().get("alice").is_some());
}

#[test]
fn test_no_candidates_is_not_found() {
    let r = resolver();
    let res = r.resolve(Some("employees"), &[], "s1", None);
    assert_eq!(
        res.to_string(),
        "No matching file found for 'employees'. Available files: []"
    );
}
