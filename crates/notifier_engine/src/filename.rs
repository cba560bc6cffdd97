use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

/// Filesystem-safe digest name for a run started at `at`:
/// `YYYY-MM-DD_HH-MM-SS.md`.
pub fn digest_filename<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%Y-%m-%d_%H-%M-%S.md").to_string()
}

/// Digest path in `dir` that does not clobber an earlier run from the same
/// second; appends `-1`, `-2`, ... before the extension when needed.
pub fn unique_digest_path<Tz>(dir: &Path, at: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let name = digest_filename(at);
    let candidate = dir.join(&name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = name.trim_end_matches(".md");
    (1u32..)
        .map(|n| dir.join(format!("{stem}-{n}.md")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
