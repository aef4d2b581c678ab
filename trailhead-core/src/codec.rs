//! Bidirectional codec between hierarchical workspace paths and the
//! flattened, separator-free directory names the assistants' own storage
//! layers produce.
//!
//! The encoded convention is bit-exact with existing on-disk data:
//!
//! - POSIX: `/home/user/proj` ⇔ `-home-user-proj` (leading dash = root)
//! - Windows: `C:\Users\x\y` ⇔ `C--Users-x-y` (second dash replaces the
//!   drive colon)
//!
//! Encoding is pure and always succeeds, but is not invertible in general:
//! a literal dash inside an original path segment is indistinguishable from
//! a separator. [`decode_naive`] accepts that ambiguity (documented, lossy);
//! [`decode_verified`] resolves it where a filesystem oracle is available by
//! greedily re-merging tokens against real directory entries.
//!
//! Filesystem access is abstracted behind [`PathOracle`] so the decode
//! logic is testable against in-memory fixtures ([`FixtureOracle`]).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Single-method capability: does this path exist in the namespace the
/// oracle speaks for?
pub trait PathOracle {
    fn exists(&self, path: &Path) -> bool;
}

/// Production oracle backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsOracle;

impl PathOracle for FsOracle {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory oracle over a fixed path set, for tests and for callers that
/// already know the namespace's contents.
#[derive(Debug, Default)]
pub struct FixtureOracle {
    paths: HashSet<PathBuf>,
}

impl FixtureOracle {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// An oracle that reports nothing as existing.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl PathOracle for FixtureOracle {
    fn exists(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }
}

/// Result of a verified decode: the longest existing prefix that could be
/// reconstructed, plus any tokens that matched nothing under the root.
///
/// A non-empty remainder is not an error; it is how encoded names referring
/// to paths that no longer exist on this machine (another user's export,
/// another machine's logs) decode without failing outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedDecode {
    /// Path resolved against the oracle (equals the search root when
    /// nothing matched)
    pub path: PathBuf,
    /// Tokens past the resolved prefix, in encoded order
    pub unresolved: Vec<String>,
}

impl VerifiedDecode {
    /// True when every token was consumed by the oracle walk.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// The unresolved tokens naively dash-joined, for display.
    pub fn remainder(&self) -> Option<String> {
        if self.unresolved.is_empty() {
            None
        } else {
            Some(self.unresolved.join("-"))
        }
    }
}

/// Flatten a hierarchical path into a single filesystem segment.
///
/// Every path separator (either flavor) becomes a dash; a drive-letter
/// colon becomes a dash as well, which is why Windows-style names carry a
/// double dash after the drive letter. Pure, never fails, not invertible
/// when a segment itself contains a dash.
pub fn encode(path: &Path) -> String {
    let text = path.to_string_lossy();
    text.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '-',
            other => other,
        })
        .collect()
}

/// True if `text` starts like a Windows drive root: a single ASCII letter,
/// a colon, and a path separator (`C:\` or `C:/`).
pub fn looks_like_windows_drive(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(letter), Some(':'), Some('/' | '\\')) if letter.is_ascii_alphabetic()
    )
}

/// True if an encoded name begins with a drive-letter token (`C--...`),
/// meaning it must decode using the Windows convention. The token is
/// rebuilt into drive-root form and classified via
/// [`looks_like_windows_drive`].
fn has_drive_token(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.len() < 3 || bytes[1] != b'-' || bytes[2] != b'-' {
        return false;
    }
    looks_like_windows_drive(&format!("{}:\\", &name[..1]))
}

/// Decode an encoded name by splitting on dashes, without consulting any
/// filesystem.
///
/// Selects the Windows convention when the name carries a drive token
/// (confirmed via [`looks_like_windows_drive`] on the rebuilt prefix),
/// otherwise treats a leading dash as the POSIX root. Ambiguous when an
/// original segment contained a dash; that is an accepted limitation of
/// oracle-free decoding, not resolved at this layer.
pub fn decode_naive(name: &str) -> PathBuf {
    if name.is_empty() {
        return PathBuf::new();
    }

    if has_drive_token(name) {
        let drive = &name[..1];
        let rest = &name[3..];
        let segments: Vec<&str> = rest.split('-').filter(|s| !s.is_empty()).collect();
        return PathBuf::from(format!("{}:\\{}", drive, segments.join("\\")));
    }

    let (root, rest) = match name.strip_prefix('-') {
        Some(rest) => ("/", rest),
        None => ("", name),
    };
    let segments: Vec<&str> = rest.split('-').filter(|s| !s.is_empty()).collect();
    PathBuf::from(format!("{}{}", root, segments.join("/")))
}

/// Decode an encoded name against a real directory tree.
///
/// Splits the name into dash tokens and greedily reconstructs the longest
/// existing path under `search_root`: at each position it tries merging the
/// remaining tokens back together with literal dashes, longest merge first,
/// and accepts the first candidate the oracle confirms. Longest-first order
/// is the tie-break — it maximizes use of the oracle and avoids splitting
/// segments that legitimately contained dashes (`my-proj` beats `my/proj`
/// whenever `my-proj` exists).
///
/// When no merge at the current position exists, the walk stops and the
/// unconsumed tokens come back in [`VerifiedDecode::unresolved`].
pub fn decode_verified(
    name: &str,
    search_root: &Path,
    oracle: &dyn PathOracle,
) -> VerifiedDecode {
    let stripped = if has_drive_token(name) {
        &name[3..]
    } else {
        name.strip_prefix('-').unwrap_or(name)
    };

    let tokens: Vec<String> = if stripped.is_empty() {
        Vec::new()
    } else {
        stripped.split('-').map(str::to_string).collect()
    };

    let mut current = search_root.to_path_buf();
    let mut pos = 0;

    while pos < tokens.len() {
        let mut advanced = false;

        for take in (1..=tokens.len() - pos).rev() {
            let candidate = tokens[pos..pos + take].join("-");
            if candidate.is_empty() {
                continue;
            }
            let candidate_path = current.join(&candidate);
            if oracle.exists(&candidate_path) {
                current = candidate_path;
                pos += take;
                advanced = true;
                break;
            }
        }

        if !advanced {
            break;
        }
    }

    VerifiedDecode {
        path: current,
        unresolved: tokens[pos..].to_vec(),
    }
}

/// Human-readable label for an encoded workspace name: the final segment of
/// the naive decode (good enough for list views; full resolution goes
/// through [`decode_verified`]).
pub fn workspace_label(name: &str) -> String {
    let decoded = decode_naive(name);
    decoded
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| decoded.to_string_lossy().to_string())
}
