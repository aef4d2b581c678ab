//! Source resolution and aggregation
//!
//! Orchestrates the environment probe, compatibility bridge, and remote
//! registry into one pass producing the deduplicated, stable-ordered list
//! of session stores the listing/export/statistics layers consume.
//!
//! Probes have no data dependencies on each other; remote probes fan out
//! over a bounded worker pool. Whatever order results arrive in, the
//! aggregator re-sorts deterministically before returning, so output never
//! depends on probe completion order. Per-probe failures are converted to
//! warnings at the probe boundary; only contract violations escape as hard
//! errors.

use crate::bridge::{self, BridgeCache};
use crate::codec::{self, PathOracle};
use crate::config::{Config, OverrideNamespace};
use crate::error::{Error, Result};
use crate::probe::EnvironmentProbe;
use crate::remote::{RemoteEndpoint, RemoteProber, SshProber};
use crate::types::{AbsentReason, AgentKind, Environment, Located, Resolution, SessionStore};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{mpsc, Mutex};
use std::time::Duration;

/// Which namespaces one invocation should probe.
#[derive(Debug, Clone)]
pub struct Selection {
    pub local: bool,
    pub compat_layer: bool,
    pub windows: bool,
    pub remote: bool,
    /// Explicit endpoints; when empty, the configured list is used
    pub remotes: Vec<RemoteEndpoint>,
    /// True when the user named namespaces instead of scanning everything.
    /// Unavailable namespaces surface as warnings (or an error when nothing
    /// else produced a source); auto scans skip them silently.
    pub explicit: bool,
}

impl Selection {
    /// Probe everything that is detected.
    pub fn auto() -> Self {
        Self {
            local: true,
            compat_layer: true,
            windows: true,
            remote: true,
            remotes: Vec::new(),
            explicit: false,
        }
    }

    /// Start from nothing; the caller switches on what was requested.
    pub fn none() -> Self {
        Self {
            local: false,
            compat_layer: false,
            windows: false,
            remote: false,
            remotes: Vec::new(),
            explicit: true,
        }
    }
}

/// The resolver. Construct once per invocation; nothing persists across
/// runs. The bridge cache, environment probe, and remote prober are
/// injectable so tests run against fixtures.
pub struct SourceResolver<'a> {
    config: &'a Config,
    probe: EnvironmentProbe,
    cache: BridgeCache,
    prober: Box<dyn RemoteProber>,
}

impl<'a> SourceResolver<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            probe: EnvironmentProbe::new(),
            cache: BridgeCache::new(),
            prober: Box::new(SshProber),
        }
    }

    /// Resolver with injected parts, for tests.
    pub fn with_parts(
        config: &'a Config,
        probe: EnvironmentProbe,
        cache: BridgeCache,
        prober: Box<dyn RemoteProber>,
    ) -> Self {
        Self {
            config,
            probe,
            cache,
            prober,
        }
    }

    /// Run every selected probe and aggregate the results.
    pub fn resolve(&mut self, selection: &Selection) -> Result<Resolution> {
        let report = self.probe.detect();

        let mut env_order: Vec<Environment> = Vec::new();
        let mut candidates: Vec<SessionStore> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut unavailable: Vec<(String, String)> = Vec::new();

        // Local namespace: plain home-relative stores, override-aware.
        if selection.local {
            env_order.push(Environment::Local);
            for agent in AgentKind::ALL {
                match self.locate_local(agent) {
                    Located::Found(store) => candidates.push(store),
                    Located::Absent(reason) => {
                        tracing::debug!(agent = %agent, reason = reason.as_str(), "No local store");
                    }
                }
            }
        }

        // Compatibility-layer distributions.
        if selection.compat_layer && self.config.probe.enable_compat_layer {
            let reachable = report.native_windows
                || (report.inside_compat_layer && report.windows_mount.is_some());

            // An override bypasses distro probing entirely for its agent.
            let mut overridden: HashSet<AgentKind> = HashSet::new();
            for agent in AgentKind::ALL {
                if let Some(root) = self
                    .config
                    .overrides
                    .root_for(OverrideNamespace::CompatLayer, agent)
                {
                    let distro = bridge::current_distro().unwrap_or_else(|| "default".to_string());
                    let environment = Environment::CompatLayer { distro };
                    if !env_order.contains(&environment) {
                        env_order.push(environment.clone());
                    }
                    candidates.push(store_from_override(environment, agent, root));
                    overridden.insert(agent);
                }
            }

            if reachable {
                let distros = self.cache.distros();
                if distros.is_empty() && overridden.is_empty() {
                    unavailable.push((
                        "compatibility-layer".to_string(),
                        "no distributions enumerable".to_string(),
                    ));
                }
                for distro in distros {
                    let environment = Environment::CompatLayer {
                        distro: distro.clone(),
                    };
                    env_order.push(environment);
                    for agent in AgentKind::ALL {
                        if overridden.contains(&agent) {
                            continue;
                        }
                        let located = if report.inside_compat_layer {
                            bridge::locate_compat_store(&mut self.cache, &distro, agent)
                        } else {
                            bridge::locate_compat_store_from_windows(
                                &mut self.cache,
                                &distro,
                                agent,
                            )
                        };
                        match located {
                            Located::Found(store) => candidates.push(store),
                            Located::Absent(reason) => tracing::debug!(
                                distro,
                                agent = %agent,
                                reason = reason.as_str(),
                                "No compat-layer store"
                            ),
                        }
                    }
                }
            } else if overridden.is_empty() {
                unavailable.push((
                    "compatibility-layer".to_string(),
                    AbsentReason::NotDetected.as_str().to_string(),
                ));
            }
        }

        // Windows host, seen from inside the layer through the mount point.
        if selection.windows {
            let mut overridden = false;
            for agent in AgentKind::ALL {
                if let Some(root) = self
                    .config
                    .overrides
                    .root_for(OverrideNamespace::Windows, agent)
                {
                    if !env_order.contains(&Environment::WindowsFromCompatLayer) {
                        env_order.push(Environment::WindowsFromCompatLayer);
                    }
                    candidates.push(store_from_override(
                        Environment::WindowsFromCompatLayer,
                        agent,
                        root,
                    ));
                    overridden = true;
                }
            }

            if let Some(mount) = &report.windows_mount {
                env_order.push(Environment::WindowsFromCompatLayer);
                for agent in AgentKind::ALL {
                    match bridge::locate_windows_store_from_compat(mount, agent) {
                        Located::Found(store) => candidates.push(store),
                        Located::Absent(reason) => tracing::debug!(
                            agent = %agent,
                            reason = reason.as_str(),
                            "No Windows store via mount"
                        ),
                    }
                }
            } else if !report.native_windows && !overridden {
                // On a native Windows host the local pass already covers
                // these stores; only the bridged case is unavailable here.
                unavailable.push((
                    "windows".to_string(),
                    AbsentReason::NotDetected.as_str().to_string(),
                ));
            }
        }

        // Declared remotes, probed over the worker pool.
        if selection.remote && self.config.probe.enable_remote {
            let endpoints = if selection.remotes.is_empty() {
                self.configured_endpoints(&mut warnings)
            } else {
                selection.remotes.clone()
            };

            for endpoint in &endpoints {
                env_order.push(endpoint.environment());
            }

            let timeout = Duration::from_secs(self.config.probe.remote_timeout_secs);
            let results = self.probe_remotes(&endpoints, timeout);

            for endpoint in &endpoints {
                let mut found_any = false;
                let mut hard_failure: Option<AbsentReason> = None;
                for (ep, _agent, located) in &results {
                    if ep != endpoint {
                        continue;
                    }
                    match located {
                        Located::Found(store) => {
                            found_any = true;
                            candidates.push(store.clone());
                        }
                        Located::Absent(
                            reason @ (AbsentReason::TimedOut
                            | AbsentReason::Unreachable
                            | AbsentReason::PermissionDenied),
                        ) => {
                            hard_failure.get_or_insert(*reason);
                        }
                        Located::Absent(_) => {}
                    }
                }
                if !found_any {
                    if let Some(reason) = hard_failure {
                        warnings.push(format!(
                            "remote {} probe failed: {}",
                            endpoint,
                            reason.as_str()
                        ));
                    }
                }
            }
        }

        if selection.explicit {
            for (namespace, reason) in &unavailable {
                warnings.push(format!("namespace unavailable: {}: {}", namespace, reason));
            }
        }

        let sources = aggregate(candidates, &env_order);

        if sources.is_empty() {
            if selection.explicit {
                if let Some((namespace, reason)) = unavailable.into_iter().next() {
                    return Err(Error::NamespaceUnavailable { namespace, reason });
                }
            }
            return Err(Error::NoSourcesFound);
        }

        tracing::info!(
            sources = sources.len(),
            warnings = warnings.len(),
            "Source resolution complete"
        );
        Ok(Resolution { sources, warnings })
    }

    /// Drop memoized bridge lookups so the next resolve re-probes.
    pub fn refresh(&mut self) {
        self.cache.invalidate();
    }

    fn locate_local(&self, agent: AgentKind) -> Located {
        if let Some(root) = self
            .config
            .overrides
            .root_for(OverrideNamespace::Local, agent)
        {
            return Located::Found(store_from_override(Environment::Local, agent, root));
        }

        let Some(home) = dirs::home_dir() else {
            return Located::Absent(AbsentReason::NotDetected);
        };
        let root = home.join(agent.store_suffix());
        if root.is_dir() {
            Located::Found(SessionStore::verified(Environment::Local, agent, root))
        } else {
            Located::Absent(AbsentReason::NotInstalled)
        }
    }

    fn configured_endpoints(&self, warnings: &mut Vec<String>) -> Vec<RemoteEndpoint> {
        let mut endpoints = Vec::new();
        for spec in &self.config.remotes {
            match RemoteEndpoint::from_str(spec) {
                Ok(endpoint) => endpoints.push(endpoint),
                Err(e) => warnings.push(e.to_string()),
            }
        }
        endpoints
    }

    /// Probe every (endpoint, agent) pair over a bounded worker pool.
    ///
    /// Pool width is capped so a burst of configured remotes cannot swamp
    /// the remote-shell daemon with simultaneous connections.
    fn probe_remotes(
        &self,
        endpoints: &[RemoteEndpoint],
        timeout: Duration,
    ) -> Vec<(RemoteEndpoint, AgentKind, Located)> {
        let tasks: VecDeque<(RemoteEndpoint, AgentKind)> = endpoints
            .iter()
            .flat_map(|ep| AgentKind::ALL.iter().map(move |agent| (ep.clone(), *agent)))
            .collect();
        if tasks.is_empty() {
            return Vec::new();
        }

        let width = self.config.probe.max_workers.clamp(1, tasks.len());
        let queue = Mutex::new(tasks);
        let (tx, rx) = mpsc::channel();
        let prober = self.prober.as_ref();

        std::thread::scope(|scope| {
            for _ in 0..width {
                let tx = tx.clone();
                let queue = &queue;
                scope.spawn(move || loop {
                    let task = queue.lock().expect("probe queue poisoned").pop_front();
                    let Some((endpoint, agent)) = task else {
                        break;
                    };
                    let located = prober.probe(&endpoint, agent, timeout);
                    if tx.send((endpoint, agent, located)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);
        });

        rx.into_iter().collect()
    }
}

fn store_from_override(environment: Environment, agent: AgentKind, root: PathBuf) -> SessionStore {
    // Overrides are trusted as-is but still existence-checked where the
    // path is locally reachable; an unconfirmable root stays speculative.
    if root.is_dir() {
        SessionStore::verified(environment, agent, root)
    } else {
        SessionStore::speculative(environment, agent, root)
    }
}

/// Canonicalize, deduplicate, and order candidate stores.
///
/// Dedupe key is `(environment, agent, canonical root)`; roots in locally
/// statable namespaces are resolved through symlinks first, remote roots
/// are taken literally. Order is environment discovery order, then agent
/// enumeration order, then root lexical order. Speculative entries are
/// never dropped, only flagged.
pub fn aggregate(candidates: Vec<SessionStore>, env_order: &[Environment]) -> Vec<SessionStore> {
    let mut seen: HashSet<(Environment, AgentKind, PathBuf)> = HashSet::new();
    let mut sources: Vec<SessionStore> = Vec::new();

    for mut store in candidates {
        if !matches!(store.environment, Environment::Remote { .. }) {
            if let Ok(canonical) = std::fs::canonicalize(&store.root) {
                store.root = canonical;
            }
        }
        let key = (
            store.environment.clone(),
            store.agent,
            store.root.clone(),
        );
        if seen.insert(key) {
            sources.push(store);
        }
    }

    sources.sort_by(|a, b| {
        env_index(env_order, &a.environment)
            .cmp(&env_index(env_order, &b.environment))
            .then_with(|| a.agent.rank().cmp(&b.agent.rank()))
            .then_with(|| a.root.cmp(&b.root))
    });
    sources
}

fn env_index(env_order: &[Environment], environment: &Environment) -> usize {
    env_order
        .iter()
        .position(|e| e == environment)
        .unwrap_or(usize::MAX)
}

// ============================================
// Workspace listing
// ============================================

/// A workspace discovered inside a Claude-style store: one flattened-name
/// project directory, decoded back to a label and path.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Workspace {
    /// The flattened directory name as found on disk
    pub encoded: String,
    /// Short human-readable label (final path segment)
    pub label: String,
    /// Decoded workspace path (verified where the oracle allowed, naive
    /// otherwise)
    pub path: PathBuf,
    /// False when part of the name could not be confirmed against the
    /// oracle and fell back to the naive split
    pub fully_resolved: bool,
}

/// Enumerate session files inside a locally readable store, following the
/// agent's nesting convention below the root.
pub fn list_session_files(store: &SessionStore) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in store.agent.session_patterns() {
        let full_pattern = store.root.join(pattern);
        let entries = glob::glob(&full_pattern.to_string_lossy()).map_err(|e| {
            Error::Discovery {
                agent: store.agent.to_string(),
                message: format!("invalid glob pattern: {}", e),
            }
        })?;
        for entry in entries.flatten() {
            files.push(entry);
        }
    }

    files.sort();
    Ok(files)
}

/// Enumerate the workspaces of a locally readable store.
///
/// Only Claude-style stores use flattened workspace names; other layouts
/// return an empty list. Each name is decoded against the oracle from the
/// filesystem root, falling back to the naive split for names whose paths
/// no longer exist on this machine.
pub fn list_workspaces(store: &SessionStore, oracle: &dyn PathOracle) -> Result<Vec<Workspace>> {
    if store.agent != AgentKind::Claude {
        return Ok(Vec::new());
    }

    let mut workspaces = Vec::new();
    for entry in std::fs::read_dir(&store.root)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let encoded = entry.file_name().to_string_lossy().to_string();

        let decoded = codec::decode_verified(&encoded, Path::new("/"), oracle);
        let fully_resolved = decoded.is_complete();
        let path = if fully_resolved {
            decoded.path
        } else {
            codec::decode_naive(&encoded)
        };

        workspaces.push(Workspace {
            label: codec::workspace_label(&encoded),
            encoded,
            path,
            fully_resolved,
        });
    }

    workspaces.sort_by(|a, b| a.encoded.cmp(&b.encoded));
    Ok(workspaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::EnvironmentProbe;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Scripted remote prober: per-host outcomes, no network.
    struct FakeProber {
        outcomes: HashMap<String, AbsentReason>,
    }

    impl FakeProber {
        fn new(failing: &[(&str, AbsentReason)]) -> Self {
            Self {
                outcomes: failing
                    .iter()
                    .map(|(host, reason)| (host.to_string(), *reason))
                    .collect(),
            }
        }
    }

    impl RemoteProber for FakeProber {
        fn probe(
            &self,
            endpoint: &RemoteEndpoint,
            agent: AgentKind,
            _timeout: Duration,
        ) -> Located {
            match self.outcomes.get(&endpoint.host) {
                Some(reason) => Located::Absent(*reason),
                None => Located::Found(SessionStore::verified(
                    endpoint.environment(),
                    agent,
                    endpoint.store_root(agent),
                )),
            }
        }
    }

    fn offline_probe(temp: &TempDir) -> EnvironmentProbe {
        // Points at paths that do not exist: detects nothing beyond local.
        EnvironmentProbe::with_paths(temp.path().join("version"), temp.path().join("mnt"))
    }

    fn remote_only_selection(hosts: &[&str]) -> Selection {
        let mut selection = Selection::none();
        selection.remote = true;
        selection.remotes = hosts
            .iter()
            .map(|h| RemoteEndpoint::from_str(&format!("dev@{}", h)).unwrap())
            .collect();
        selection
    }

    #[test]
    fn test_fault_isolation_one_remote_times_out() {
        let temp = TempDir::new().unwrap();
        let config = Config::default();
        let prober = FakeProber::new(&[("flaky", AbsentReason::TimedOut)]);
        let mut resolver = SourceResolver::with_parts(
            &config,
            offline_probe(&temp),
            BridgeCache::with_fixtures(Vec::new(), HashMap::new()),
            Box::new(prober),
        );

        let selection = remote_only_selection(&["build1", "flaky", "build2"]);
        let resolution = resolver.resolve(&selection).unwrap();

        // Two healthy remotes, three agent kinds each
        assert_eq!(resolution.sources.len(), 6);
        assert!(resolution.sources.iter().all(|s| s.verified));
        assert!(resolution
            .sources
            .iter()
            .all(|s| !matches!(&s.environment, Environment::Remote { host, .. } if host == "flaky")));

        // Exactly one diagnostic, for the one failed endpoint
        assert_eq!(resolution.warnings.len(), 1);
        assert!(resolution.warnings[0].contains("flaky"));
        assert!(resolution.warnings[0].contains("timed out"));
    }

    #[test]
    fn test_remote_results_ordered_by_declaration() {
        let temp = TempDir::new().unwrap();
        let config = Config::default();
        let mut resolver = SourceResolver::with_parts(
            &config,
            offline_probe(&temp),
            BridgeCache::with_fixtures(Vec::new(), HashMap::new()),
            Box::new(FakeProber::new(&[])),
        );

        let selection = remote_only_selection(&["zeta", "alpha"]);
        let resolution = resolver.resolve(&selection).unwrap();

        // Declaration order wins over lexical host order
        let hosts: Vec<String> = resolution
            .sources
            .iter()
            .map(|s| match &s.environment {
                Environment::Remote { host, .. } => host.clone(),
                other => panic!("unexpected environment {:?}", other),
            })
            .collect();
        assert_eq!(hosts, vec!["zeta", "zeta", "zeta", "alpha", "alpha", "alpha"]);

        // Within one endpoint, agent enumeration order
        assert_eq!(
            resolution.sources[0].agent,
            AgentKind::Claude
        );
        assert_eq!(resolution.sources[1].agent, AgentKind::Codex);
        assert_eq!(resolution.sources[2].agent, AgentKind::Gemini);
    }

    #[test]
    fn test_all_remotes_down_is_no_sources() {
        let temp = TempDir::new().unwrap();
        let config = Config::default();
        let prober = FakeProber::new(&[("down", AbsentReason::Unreachable)]);
        let mut resolver = SourceResolver::with_parts(
            &config,
            offline_probe(&temp),
            BridgeCache::with_fixtures(Vec::new(), HashMap::new()),
            Box::new(prober),
        );

        let selection = remote_only_selection(&["down"]);
        match resolver.resolve(&selection) {
            Err(Error::NoSourcesFound) => {}
            other => panic!("expected NoSourcesFound, got {:?}", other.map(|r| r.sources)),
        }
    }

    #[test]
    fn test_explicit_compat_layer_unavailable() {
        let temp = TempDir::new().unwrap();
        let config = Config::default();
        let mut resolver = SourceResolver::with_parts(
            &config,
            offline_probe(&temp),
            BridgeCache::with_fixtures(Vec::new(), HashMap::new()),
            Box::new(FakeProber::new(&[])),
        );

        let mut selection = Selection::none();
        selection.compat_layer = true;

        match resolver.resolve(&selection) {
            Err(Error::NamespaceUnavailable { namespace, .. }) => {
                assert_eq!(namespace, "compatibility-layer");
            }
            other => panic!("expected NamespaceUnavailable, got {:?}", other.map(|r| r.sources)),
        }
    }

    #[test]
    fn test_aggregate_dedupes_canonical_identity() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("store");
        std::fs::create_dir_all(&real).unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let env_order = vec![Environment::Local];
        let candidates = vec![
            SessionStore::verified(Environment::Local, AgentKind::Claude, real.clone()),
            SessionStore::verified(Environment::Local, AgentKind::Claude, link),
        ];

        let sources = aggregate(candidates, &env_order);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].root, std::fs::canonicalize(&real).unwrap());
    }

    #[test]
    fn test_aggregate_keeps_speculative_entries() {
        let env_order = vec![Environment::Local];
        let candidates = vec![SessionStore::speculative(
            Environment::Local,
            AgentKind::Codex,
            PathBuf::from("/srv/missing"),
        )];

        let sources = aggregate(candidates, &env_order);
        assert_eq!(sources.len(), 1);
        assert!(!sources[0].verified);
    }

    #[test]
    fn test_aggregate_sort_is_stable_across_shuffles() {
        let env_order = vec![
            Environment::Local,
            Environment::CompatLayer {
                distro: "Ubuntu".to_string(),
            },
        ];
        let a = SessionStore::verified(
            Environment::Local,
            AgentKind::Gemini,
            PathBuf::from("/srv/a"),
        );
        let b = SessionStore::verified(
            Environment::CompatLayer {
                distro: "Ubuntu".to_string(),
            },
            AgentKind::Claude,
            PathBuf::from("/srv/b"),
        );
        let c = SessionStore::verified(
            Environment::Local,
            AgentKind::Claude,
            PathBuf::from("/srv/c"),
        );

        let forward = aggregate(vec![a.clone(), b.clone(), c.clone()], &env_order);
        let backward = aggregate(vec![b, a, c], &env_order);
        assert_eq!(forward, backward);

        // Local before compat layer; claude before gemini within local
        assert_eq!(forward[0].root, PathBuf::from("/srv/c"));
        assert_eq!(forward[1].root, PathBuf::from("/srv/a"));
        assert_eq!(
            forward[2].environment,
            Environment::CompatLayer {
                distro: "Ubuntu".to_string()
            }
        );
    }

    #[test]
    fn test_list_workspaces_decodes_names() {
        let temp = TempDir::new().unwrap();

        // A real workspace tree the oracle can confirm
        let project = temp.path().join("work/my-proj");
        std::fs::create_dir_all(&project).unwrap();

        // The store, holding one resolvable and one stale encoded name
        let store_root = temp.path().join("projects");
        let resolvable = codec::encode(&project);
        std::fs::create_dir_all(store_root.join(&resolvable)).unwrap();
        std::fs::create_dir_all(store_root.join("-gone-machine-proj")).unwrap();

        let store = SessionStore::verified(Environment::Local, AgentKind::Claude, store_root);
        let workspaces = list_workspaces(&store, &codec::FsOracle).unwrap();

        assert_eq!(workspaces.len(), 2);

        let stale = &workspaces[0];
        assert_eq!(stale.encoded, "-gone-machine-proj");
        assert!(!stale.fully_resolved);
        assert_eq!(stale.path, PathBuf::from("/gone/machine/proj"));

        let live = workspaces.iter().find(|w| w.encoded == resolvable).unwrap();
        assert!(live.fully_resolved);
        assert_eq!(live.path, project);
        assert_eq!(live.label, "my-proj");
    }

    #[test]
    fn test_list_session_files_per_layout() {
        let temp = TempDir::new().unwrap();

        // Claude: projects/<flattened>/<uuid>.jsonl
        let claude_root = temp.path().join("claude");
        std::fs::create_dir_all(claude_root.join("-home-dev-proj")).unwrap();
        std::fs::write(claude_root.join("-home-dev-proj/abc.jsonl"), "{}\n").unwrap();

        // Codex: sessions/YYYY/MM/DD/rollout-*.jsonl
        let codex_root = temp.path().join("codex");
        std::fs::create_dir_all(codex_root.join("2026/08/07")).unwrap();
        std::fs::write(codex_root.join("2026/08/07/rollout-x.jsonl"), "{}\n").unwrap();
        std::fs::write(codex_root.join("2026/08/07/other.txt"), "").unwrap();

        // Gemini: tmp/<hash>/chats/*.json
        let gemini_root = temp.path().join("gemini");
        std::fs::create_dir_all(gemini_root.join("a1b2c3/chats")).unwrap();
        std::fs::write(gemini_root.join("a1b2c3/chats/session.json"), "{}").unwrap();

        let cases = [
            (AgentKind::Claude, claude_root, "abc.jsonl"),
            (AgentKind::Codex, codex_root, "rollout-x.jsonl"),
            (AgentKind::Gemini, gemini_root, "session.json"),
        ];
        for (agent, root, expected) in cases {
            let store = SessionStore::verified(Environment::Local, agent, root);
            let files = list_session_files(&store).unwrap();
            assert_eq!(files.len(), 1, "{} store", agent);
            assert!(files[0].ends_with(expected));
        }
    }

    #[test]
    fn test_list_workspaces_non_claude_store_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::verified(
            Environment::Local,
            AgentKind::Codex,
            temp.path().to_path_buf(),
        );
        assert!(list_workspaces(&store, &codec::FsOracle).unwrap().is_empty());
    }
}
