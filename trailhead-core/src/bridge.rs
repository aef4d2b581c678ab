//! Compatibility bridge
//!
//! Locates session stores across the boundary between a Windows host and
//! its Linux compatibility layer, in both directions:
//!
//! - from the host into a layer distribution, through the reserved
//!   network-style prefix (`//wsl.localhost/<distro>/...`)
//! - from inside the layer back into the host, through the reserved mount
//!   point (`/mnt/<drive>/...`)
//!
//! Distribution enumeration and home-directory lookup shell out to the
//! layer's own tooling (`wsl.exe`), which is expensive, so results memoize
//! in an explicit [`BridgeCache`] passed in by the resolver. Tests build
//! the cache from fixtures and never spawn a process.
//!
//! Every locate function returns [`Located`], never an error: a missing
//! distribution, an unresolvable home, or an absent store all collapse to
//! `Absent` with the reason attached.

use crate::types::{AbsentReason, AgentKind, Environment, Located, SessionStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable naming the current distribution when running
/// inside the compatibility layer.
const DISTRO_ENV: &str = "WSL_DISTRO_NAME";

/// Host name of the reserved network prefix for layer filesystems.
const UNC_HOSTS: [&str; 2] = ["wsl.localhost", "wsl$"];

/// Returns the current distribution name when running inside the layer.
pub fn current_distro() -> Option<String> {
    std::env::var(DISTRO_ENV).ok().filter(|name| !name.is_empty())
}

// ============================================
// Cache
// ============================================

/// Explicit memo for the bridge's expensive lookups: the installed
/// distribution list and each distribution's home directory.
///
/// Constructed once per resolver invocation and passed in, so tests can
/// inject deterministic fixtures instead of relying on hidden global
/// state. [`invalidate`](Self::invalidate) drops memoized results; fixture
/// caches keep their seeded data and never shell out.
#[derive(Debug, Default)]
pub struct BridgeCache {
    distros: Option<Vec<String>>,
    homes: HashMap<String, PathBuf>,
    fixture: bool,
}

impl BridgeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-seeded with fixture data; lookups never leave memory.
    pub fn with_fixtures(distros: Vec<String>, homes: HashMap<String, PathBuf>) -> Self {
        Self {
            distros: Some(distros),
            homes,
            fixture: true,
        }
    }

    /// Drop memoized results so the next lookup re-probes. Fixture data
    /// is retained.
    pub fn invalidate(&mut self) {
        if !self.fixture {
            self.distros = None;
            self.homes.clear();
        }
    }

    /// Installed compatibility-layer distributions, memoized.
    pub fn distros(&mut self) -> Vec<String> {
        if let Some(cached) = &self.distros {
            return cached.clone();
        }

        let listed = list_distros_uncached();
        tracing::debug!(count = listed.len(), "Enumerated compat-layer distributions");
        self.distros = Some(listed.clone());
        listed
    }

    /// Home directory of one distribution, memoized.
    pub fn home_for(&mut self, distro: &str) -> Option<PathBuf> {
        if let Some(cached) = self.homes.get(distro) {
            return Some(cached.clone());
        }
        if self.fixture {
            return None;
        }

        let home = distro_home_uncached(distro)?;
        self.homes.insert(distro.to_string(), home.clone());
        Some(home)
    }
}

/// Run the layer's distribution-listing command. The console tool emits
/// UTF-16LE; decode accordingly.
fn list_distros_uncached() -> Vec<String> {
    let output = match Command::new("wsl.exe").args(["-l", "-q"]).output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            tracing::debug!(status = ?output.status, "Distribution listing failed");
            return Vec::new();
        }
        Err(e) => {
            tracing::debug!(error = %e, "Distribution listing tool not reachable");
            return Vec::new();
        }
    };

    decode_console_output(&output.stdout)
        .lines()
        .map(|line| {
            line.trim_matches(|c: char| c == '\r' || c == '\u{0}' || c == ' ')
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Resolve a distribution's home directory by running a namespace-scoped
/// shell command inside it.
fn distro_home_uncached(distro: &str) -> Option<PathBuf> {
    let output = Command::new("wsl.exe")
        .args(["-d", distro, "sh", "-c", "echo $HOME"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let home = decode_console_output(&output.stdout);
    let home = home.trim();
    if home.is_empty() {
        None
    } else {
        Some(PathBuf::from(home))
    }
}

/// Decode console-tool output that may be UTF-16LE (interleaved NULs) or
/// plain UTF-8.
fn decode_console_output(bytes: &[u8]) -> String {
    if bytes.contains(&0) {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let decoded: String = char::decode_utf16(units.into_iter())
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        decoded.trim_start_matches('\u{feff}').to_string()
    } else {
        String::from_utf8_lossy(bytes).to_string()
    }
}

// ============================================
// Prefix translation
// ============================================

/// The network-style root under which a distribution's filesystem is
/// visible from the host.
pub fn unc_root(distro: &str) -> PathBuf {
    PathBuf::from(format!("//{}/{}", UNC_HOSTS[0], distro))
}

/// Strip the reserved network prefix from a path, returning the inner
/// absolute path. Idempotent: a path with no prefix comes back unchanged.
pub fn strip_unc_prefix(path: &Path) -> PathBuf {
    let text = path.to_string_lossy().replace('\\', "/");
    for host in UNC_HOSTS {
        let prefix = format!("//{}/", host);
        if let Some(rest) = text.strip_prefix(&prefix) {
            // Skip the distro segment; what follows is the inner path.
            match rest.find('/') {
                Some(idx) => return PathBuf::from(&rest[idx..]),
                None => return PathBuf::from("/"),
            }
        }
    }
    path.to_path_buf()
}

/// Translate a Windows drive path to its reserved mount point inside the
/// layer (`C:\Users\x` → `<mount_root>/c/Users/x`). A path already below
/// the mount root comes back unchanged.
pub fn windows_to_mount_path(path: &Path, mount_root: &Path) -> Option<PathBuf> {
    if path.starts_with(mount_root) {
        return Some(path.to_path_buf());
    }

    let text = path.to_string_lossy();
    if !crate::codec::looks_like_windows_drive(&text) {
        return None;
    }

    let drive = text[..1].to_ascii_lowercase();
    let rest = text[2..].replace('\\', "/");
    let rest = rest.trim_start_matches('/');
    Some(mount_root.join(drive).join(rest))
}

/// Translate a reserved-mount path back to Windows drive form
/// (`<mount_root>/c/Users/x` → `C:\Users\x`). A path already in drive form
/// comes back unchanged.
pub fn mount_to_windows_path(path: &Path, mount_root: &Path) -> Option<PathBuf> {
    let text = path.to_string_lossy();
    if crate::codec::looks_like_windows_drive(&text) {
        return Some(path.to_path_buf());
    }

    let rel = path.strip_prefix(mount_root).ok()?;
    let mut components = rel.components();
    let drive = components
        .next()?
        .as_os_str()
        .to_str()
        .filter(|s| s.len() == 1 && s.chars().all(|c| c.is_ascii_alphabetic()))?
        .to_ascii_uppercase();

    let rest: Vec<String> = components
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(PathBuf::from(format!("{}:\\{}", drive, rest.join("\\"))))
}

// ============================================
// Store location
// ============================================

/// Locate an agent's store inside a layer distribution, from the host
/// side. The store root is expressed under the network prefix so the host
/// can read it directly.
pub fn locate_compat_store_from_windows(
    cache: &mut BridgeCache,
    distro: &str,
    agent: AgentKind,
) -> Located {
    let Some(home) = cache.home_for(distro) else {
        tracing::debug!(distro, "No home directory resolvable for distribution");
        return Located::Absent(AbsentReason::NotDetected);
    };

    let inner = home.join(agent.store_suffix());
    let root = join_under_unc(distro, &inner);

    if root.is_dir() {
        Located::Found(SessionStore::verified(
            Environment::CompatLayer {
                distro: distro.to_string(),
            },
            agent,
            root,
        ))
    } else {
        Located::Absent(AbsentReason::NotInstalled)
    }
}

/// Locate an agent's store inside a layer distribution when the current
/// process is itself running in the layer. For the current distribution
/// the home is on the native path; sibling distributions are reached
/// through the network prefix like the host would.
pub fn locate_compat_store(cache: &mut BridgeCache, distro: &str, agent: AgentKind) -> Located {
    let native = current_distro().as_deref() == Some(distro);

    let root = if native {
        match dirs::home_dir() {
            Some(home) => home.join(agent.store_suffix()),
            None => return Located::Absent(AbsentReason::NotDetected),
        }
    } else {
        let Some(home) = cache.home_for(distro) else {
            return Located::Absent(AbsentReason::NotDetected);
        };
        join_under_unc(distro, &home.join(agent.store_suffix()))
    };

    match root.metadata() {
        Ok(meta) if meta.is_dir() => Located::Found(SessionStore::verified(
            Environment::CompatLayer {
                distro: distro.to_string(),
            },
            agent,
            root,
        )),
        Ok(_) => Located::Absent(AbsentReason::NotInstalled),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Located::Absent(AbsentReason::PermissionDenied)
        }
        Err(_) => Located::Absent(AbsentReason::NotInstalled),
    }
}

/// Locate a Windows-host store from inside the layer, by scanning user
/// profiles under the reserved mount point.
///
/// Takes the mount root the environment probe validated. Service profiles
/// are skipped; the first real profile carrying the agent's store wins.
pub fn locate_windows_store_from_compat(mount: &Path, agent: AgentKind) -> Located {
    let users_dir = mount.join("Users");
    let entries = match std::fs::read_dir(&users_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Located::Absent(AbsentReason::PermissionDenied);
        }
        Err(_) => return Located::Absent(AbsentReason::NotDetected),
    };

    let mut profiles: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && !is_service_profile(path))
        .collect();
    profiles.sort();

    for profile in profiles {
        let root = profile.join(agent.store_suffix());
        if root.is_dir() {
            tracing::debug!(root = %root.display(), agent = %agent, "Found host store via mount point");
            return Located::Found(SessionStore::verified(
                Environment::WindowsFromCompatLayer,
                agent,
                root,
            ));
        }
    }

    Located::Absent(AbsentReason::NotInstalled)
}

fn is_service_profile(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|n| n.to_str()),
        Some("Public" | "Default" | "Default User" | "All Users" | "desktop.ini")
    )
}

fn join_under_unc(distro: &str, inner: &Path) -> PathBuf {
    let inner_text = inner.to_string_lossy();
    let trimmed = inner_text.trim_start_matches('/');
    unc_root(distro).join(trimmed)
}
