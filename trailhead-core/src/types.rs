//! Core domain types for trailhead
//!
//! These types describe the resolver's data model:
//!
//! | Term | Definition |
//! |------|------------|
//! | **AgentKind** | A coding-assistant product whose storage layout we search (Claude Code, Codex, Gemini CLI) |
//! | **Environment** | A filesystem namespace with its own root-resolution rules (local, WSL distro, Windows seen from WSL, SSH remote) |
//! | **SessionStore** | A directory root believed to hold conversation logs for one agent kind in one environment |
//! | **Located** | The outcome of a locate/probe call, carrying an explicit reason when absent |
//! | **Resolution** | The aggregator's ordered, deduplicated output plus probe warnings |

use serde::Serialize;
use std::path::PathBuf;

// ============================================
// Agent kinds
// ============================================

/// Supported AI coding assistants (products, not subprocess agents).
///
/// The variant order is the canonical enumeration order used when sorting
/// aggregated session stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Claude,
    Codex,
    Gemini,
}

impl AgentKind {
    /// All kinds, in enumeration order.
    pub const ALL: [AgentKind; 3] = [AgentKind::Claude, AgentKind::Codex, AgentKind::Gemini];

    /// Returns the display name for this agent kind
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::Claude => "Claude Code",
            AgentKind::Codex => "Codex",
            AgentKind::Gemini => "Gemini CLI",
        }
    }

    /// Returns the identifier used in config keys and output
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Claude => "claude",
            AgentKind::Codex => "codex",
            AgentKind::Gemini => "gemini",
        }
    }

    /// Session-store directory relative to a home directory.
    ///
    /// - Claude Code: `.claude/projects` (one flattened-name dir per workspace)
    /// - Codex: `.codex/sessions` (nested `YYYY/MM/DD/rollout-*.jsonl` below)
    /// - Gemini CLI: `.gemini/tmp` (nested `<projectHash>/chats` below)
    pub fn store_suffix(&self) -> &'static str {
        match self {
            AgentKind::Claude => ".claude/projects",
            AgentKind::Codex => ".codex/sessions",
            AgentKind::Gemini => ".gemini/tmp",
        }
    }

    /// Glob patterns for session files below the store root, matching the
    /// agent's nesting convention.
    pub fn session_patterns(&self) -> &'static [&'static str] {
        match self {
            // projects/<flattened-name>/<uuid>.jsonl
            AgentKind::Claude => &["*/*.jsonl"],
            // sessions/YYYY/MM/DD/rollout-*.jsonl
            AgentKind::Codex => &["*/*/*/rollout-*.jsonl"],
            // tmp/<projectHash>/chats/*.json
            AgentKind::Gemini => &["*/chats/*.json"],
        }
    }

    /// Sort rank within one environment (enumeration order).
    pub(crate) fn rank(&self) -> usize {
        Self::ALL.iter().position(|k| k == self).unwrap_or(usize::MAX)
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "claude" | "claude_code" => Ok(AgentKind::Claude),
            "codex" => Ok(AgentKind::Codex),
            "gemini" => Ok(AgentKind::Gemini),
            _ => Err(format!("unknown agent kind: {}", s)),
        }
    }
}

// ============================================
// Environments
// ============================================

/// A distinct filesystem namespace reachable from this process.
///
/// Constructed fresh on every resolver invocation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Environment {
    /// The native OS filesystem of the current process.
    Local,
    /// A WSL distribution's filesystem, reached from the Windows host.
    CompatLayer { distro: String },
    /// The Windows host filesystem, reached from inside WSL via `/mnt/<drive>`.
    WindowsFromCompatLayer,
    /// A remote host reachable over SSH.
    Remote { user: String, host: String },
}

impl Environment {
    /// Primary sort rank: local first, then compat layers in discovery
    /// order, then the Windows bridge, then remotes in declaration order.
    ///
    /// Ties within a rank (multiple distros, multiple remotes) fall back to
    /// the environment's display string, which is stable across runs.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Environment::Local => 0,
            Environment::CompatLayer { .. } => 1,
            Environment::WindowsFromCompatLayer => 2,
            Environment::Remote { .. } => 3,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "local"),
            Environment::CompatLayer { distro } => write!(f, "wsl:{}", distro),
            Environment::WindowsFromCompatLayer => write!(f, "windows"),
            Environment::Remote { user, host } => write!(f, "{}@{}", user, host),
        }
    }
}

// ============================================
// Session stores
// ============================================

/// A directory root believed to contain conversation-log files for one
/// agent kind in one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStore {
    /// Namespace the store lives in
    pub environment: Environment,
    /// Which assistant's layout convention the store follows
    pub agent: AgentKind,
    /// Store root path, in the namespace's own path convention
    pub root: PathBuf,
    /// True only when existence was confirmed by direct filesystem access
    /// or an affirmative remote probe; heuristic-only entries stay false
    pub verified: bool,
}

impl SessionStore {
    /// A confirmed store.
    pub fn verified(environment: Environment, agent: AgentKind, root: PathBuf) -> Self {
        Self {
            environment,
            agent,
            root,
            verified: true,
        }
    }

    /// A store inferred without an existence check (callers should warn,
    /// not silently drop).
    pub fn speculative(environment: Environment, agent: AgentKind, root: PathBuf) -> Self {
        Self {
            environment,
            agent,
            root,
            verified: false,
        }
    }
}

// ============================================
// Probe outcomes
// ============================================

/// Why a locate/probe call came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentReason {
    /// The namespace itself was not detected on this machine
    NotDetected,
    /// The namespace exists but the agent's store directory does not
    NotInstalled,
    /// The store may exist but could not be read
    PermissionDenied,
    /// A remote probe exceeded its time budget
    TimedOut,
    /// Connection or authentication to a remote failed
    Unreachable,
}

impl AbsentReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbsentReason::NotDetected => "not detected",
            AbsentReason::NotInstalled => "not installed",
            AbsentReason::PermissionDenied => "permission denied",
            AbsentReason::TimedOut => "timed out",
            AbsentReason::Unreachable => "unreachable",
        }
    }
}

/// Outcome of a single locate/probe call.
///
/// Probe failures never escape as errors; they collapse to an [`Absent`]
/// variant carrying the cause so callers and tests can assert on it.
///
/// [`Absent`]: Located::Absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Found(SessionStore),
    Absent(AbsentReason),
}

impl Located {
    /// The store, if one was found.
    pub fn into_store(self) -> Option<SessionStore> {
        match self {
            Located::Found(store) => Some(store),
            Located::Absent(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Located::Found(_))
    }
}

// ============================================
// Aggregated output
// ============================================

/// The aggregator's output: an ordered, deduplicated store list plus any
/// per-probe warning diagnostics accumulated along the way.
#[derive(Debug, Default, Serialize)]
pub struct Resolution {
    /// Deduped stores, sorted by (environment rank, agent order, root)
    pub sources: Vec<SessionStore>,
    /// Non-fatal diagnostics (one per failed probe)
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_agent_kind_roundtrip() {
        for kind in AgentKind::ALL {
            assert_eq!(AgentKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(AgentKind::from_str("cursor").is_err());
    }

    #[test]
    fn test_agent_kind_order() {
        assert!(AgentKind::Claude.rank() < AgentKind::Codex.rank());
        assert!(AgentKind::Codex.rank() < AgentKind::Gemini.rank());
    }

    #[test]
    fn test_environment_rank_order() {
        let local = Environment::Local;
        let wsl = Environment::CompatLayer {
            distro: "Ubuntu".to_string(),
        };
        let remote = Environment::Remote {
            user: "dev".to_string(),
            host: "build1".to_string(),
        };
        assert!(local.rank() < wsl.rank());
        assert!(wsl.rank() < Environment::WindowsFromCompatLayer.rank());
        assert!(Environment::WindowsFromCompatLayer.rank() < remote.rank());
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Local.to_string(), "local");
        assert_eq!(
            Environment::CompatLayer {
                distro: "Debian".to_string()
            }
            .to_string(),
            "wsl:Debian"
        );
        assert_eq!(
            Environment::Remote {
                user: "dev".to_string(),
                host: "build1".to_string()
            }
            .to_string(),
            "dev@build1"
        );
    }

    #[test]
    fn test_located_into_store() {
        let store = SessionStore::verified(
            Environment::Local,
            AgentKind::Claude,
            PathBuf::from("/tmp/store"),
        );
        assert_eq!(
            Located::Found(store.clone()).into_store(),
            Some(store)
        );
        assert_eq!(Located::Absent(AbsentReason::NotInstalled).into_store(), None);
    }
}
