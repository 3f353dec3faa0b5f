use glob::{MatchOptions, Pattern};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use walkdir::WalkDir;

use super::fuzzy;
use crate::session::SessionStore;

/// Outcome of resolving a user supplied file reference.
#[derive(Debug, Clone, PartialEq)]
pub enum FileResolution {
    /// A file to load: an exact match or a confirmed suggestion.
    Resolved(PathBuf),
    /// A close match was cached for the session and needs confirmation.
    Suggestion { candidate: String, score: f64 },
    /// Nothing usable; the candidate list is returned for discoverability.
    NotFound {
        reference: Option<String>,
        candidates: Vec<String>,
    },
}

impl fmt::Display for FileResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileResolution::Resolved(path) => write!(f, "Resolved file: {}", path.display()),
            FileResolution::Suggestion { candidate, .. } => write!(
                f,
                "Did you mean '{}'? Reply with proceed=yes to continue.",
                candidate
            ),
            FileResolution::NotFound {
                reference: Some(reference),
                candidates,
            } => write!(
                f,
                "No matching file found for '{}'. Available files: {:?}",
                reference, candidates
            ),
            FileResolution::NotFound {
                reference: None,
                candidates,
            } => write!(
                f,
                "No file reference provided. Available files: {:?}",
                candidates
            ),
        }
    }
}

/// File names directly under `data_dir` matching any of `patterns`
/// (case-insensitive), sorted by name.
pub fn list_candidates(data_dir: &Path, patterns: &[String]) -> io::Result<Vec<String>> {
    let patterns: Vec<Pattern> = patterns
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut candidates = Vec::new();
    for entry in WalkDir::new(data_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if patterns.iter().any(|p| p.matches_with(&name, options)) {
            candidates.push(name);
        }
    }

    debug!("{} candidate files in {}", candidates.len(), data_dir.display());
    Ok(candidates)
}

/// Resolves partial or misspelled file references against the candidate
/// set, remembering one pending suggestion per session.
pub struct FileResolver<S: SessionStore> {
    data_dir: PathBuf,
    threshold: f64,
    store: S,
}

impl<S: SessionStore> FileResolver<S> {
    pub fn new(data_dir: impl Into<PathBuf>, threshold: f64, store: S) -> Self {
        Self {
            data_dir: data_dir.into(),
            threshold,
            store,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolution in priority order:
    /// 1. `confirm == "yes"` with a cached suggestion: return and consume it.
    /// 2. `reference` names a candidate exactly: return it, cache untouched.
    /// 3. best fuzzy score above the threshold: cache it and ask to confirm.
    /// 4. otherwise not found.
    pub fn resolve(
        &self,
        reference: Option<&str>,
        candidates: &[String],
        session_id: &str,
        confirm: Option<&str>,
    ) -> FileResolution {
        if confirm.is_some_and(|c| c.trim().eq_ignore_ascii_case("yes")) {
            if let Some(path) = self.store.remove(session_id) {
                info!("Session '{}' confirmed {}", session_id, path.display());
                return FileResolution::Resolved(path);
            }
            debug!("Session '{}' confirmed with no pending suggestion", session_id);
        }

        let reference = reference.map(str::trim).filter(|r| !r.is_empty());

        let Some(reference) = reference else {
            return FileResolution::NotFound {
                reference: None,
                candidates: candidates.to_vec(),
            };
        };

        if candidates.iter().any(|c| c == reference) {
            return FileResolution::Resolved(self.data_dir.join(reference));
        }

        match fuzzy::best_match(reference, candidates) {
            Some((name, score)) if score > self.threshold => {
                debug!(
                    "Best match for '{}' is '{}' (score {:.1})",
                    reference, name, score
                );
                self.store.put(session_id, self.data_dir.join(name));
                FileResolution::Suggestion {
                    candidate: name.to_string(),
                    score,
                }
            }
            _ => FileResolution::NotFound {
                reference: Some(reference.to_string()),
                candidates: candidates.to_vec(),
            },
        }
    }
}
