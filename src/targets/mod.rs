//! Target list handling
//!
//! A target list is plain text with one URI per line. Lines are trimmed and
//! blank lines are dropped; nothing else is validated before dispatch.

use std::fmt;
use std::path::Path;

/// A single URI to fetch
///
/// Always trimmed and never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTarget(String);

impl FetchTarget {
    /// Creates a target from a raw entry, or `None` if the entry is blank
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FetchTarget {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parses a target list, one URI per line
///
/// Input order is kept. Blank and whitespace-only lines produce no target.
///
/// # Example
///
/// ```
/// use harvest::targets::parse_targets;
///
/// let targets = parse_targets("https://a.example\n\n  https://b.example  \n");
/// assert_eq!(targets.len(), 2);
/// assert_eq!(targets[1].as_str(), "https://b.example");
/// ```
pub fn parse_targets(text: &str) -> Vec<FetchTarget> {
    let mut skipped = 0usize;
    let targets: Vec<FetchTarget> = text
        .lines()
        .filter_map(|line| {
            let target = FetchTarget::new(line);
            if target.is_none() {
                skipped += 1;
            }
            target
        })
        .collect();

    if skipped > 0 {
        tracing::debug!("Skipped {} blank lines in target list", skipped);
    }

    targets
}

/// Reads and parses a target list file
///
/// # Arguments
///
/// * `path` - Path to a text file with one URI per line
///
/// # Returns
///
/// * `Ok(Vec<FetchTarget>)` - The non-blank targets, possibly empty
/// * `Err(std::io::Error)` - The file could not be read
pub fn load_targets(path: &Path) -> std::io::Result<Vec<FetchTarget>> {
    let content = std::fs::read_to_string(path)?;
    let targets = parse_targets(&content);
    tracing::debug!("Loaded {} targets from {}", targets.len(), path.display());
    Ok(targets)
}
