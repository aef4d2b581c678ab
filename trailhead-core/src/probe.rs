//! Environment detection
//!
//! Determines which filesystem namespaces the current process can see,
//! without resolving any specific workspace. Detection is read-only
//! (kernel-info and filesystem inspection, no subprocesses) and strictly
//! best-effort: any inspection failure reads as "not detected" and is never
//! raised to the caller.

use crate::types::AgentKind;
use std::path::{Path, PathBuf};

/// Namespace kinds the probe can report. Remote namespaces are declared by
/// configuration, not detected, so they do not appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentKind {
    Local,
    CompatLayer,
    WindowsFromCompatLayer,
}

/// What the probe saw, with enough detail for a diagnostic report.
#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    /// Kernel identification string names the compatibility layer
    pub inside_compat_layer: bool,
    /// Reserved mount point for the Windows host drive, if reachable and sane
    pub windows_mount: Option<PathBuf>,
    /// Native Windows session directories are directly visible
    pub native_windows: bool,
}

impl ProbeReport {
    /// The detected namespace kinds, local first.
    pub fn environments(&self) -> Vec<EnvironmentKind> {
        let mut kinds = vec![EnvironmentKind::Local];

        // Compat-layer distro filesystems are reachable from a native
        // Windows host, or from inside the layer itself (sibling distros)
        // whenever the host mount is sane enough to carry wsl.exe.
        if self.native_windows || (self.inside_compat_layer && self.windows_mount.is_some()) {
            kinds.push(EnvironmentKind::CompatLayer);
        }

        if self.inside_compat_layer && self.windows_mount.is_some() {
            kinds.push(EnvironmentKind::WindowsFromCompatLayer);
        }

        kinds
    }
}

/// Probes the current process's view of the world.
///
/// Inspection paths are injectable so tests can point the probe at fixture
/// trees instead of the real `/proc` and `/mnt`.
pub struct EnvironmentProbe {
    kernel_info: PathBuf,
    mount_root: PathBuf,
}

impl EnvironmentProbe {
    /// Probe with the well-known system paths.
    pub fn new() -> Self {
        Self {
            kernel_info: PathBuf::from("/proc/version"),
            mount_root: PathBuf::from("/mnt"),
        }
    }

    /// Probe against fixture paths (for tests).
    pub fn with_paths(kernel_info: PathBuf, mount_root: PathBuf) -> Self {
        Self {
            kernel_info,
            mount_root,
        }
    }

    /// Run all detections.
    pub fn detect(&self) -> ProbeReport {
        let report = ProbeReport {
            inside_compat_layer: self.inside_compat_layer(),
            windows_mount: self.windows_mount(),
            native_windows: self.native_windows_stores_visible(),
        };
        tracing::debug!(
            inside_compat_layer = report.inside_compat_layer,
            windows_mount = ?report.windows_mount,
            native_windows = report.native_windows,
            "Environment probe complete"
        );
        report
    }

    /// True when the kernel identification string names the Windows
    /// compatibility layer ("microsoft" appears in `/proc/version`).
    pub fn inside_compat_layer(&self) -> bool {
        match std::fs::read_to_string(&self.kernel_info) {
            Ok(version) => version.to_ascii_lowercase().contains("microsoft"),
            Err(_) => false,
        }
    }

    /// The first Windows drive mount under the mount root that looks like a
    /// real mounted drive.
    ///
    /// Existence alone is not enough: an empty `/mnt/c` left behind by a
    /// stale mount must not count. A drive qualifies when it carries a
    /// `Users` or `Windows` directory.
    pub fn windows_mount(&self) -> Option<PathBuf> {
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(&self.mount_root)
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.len() == 1 && n.chars().all(|c| c.is_ascii_alphabetic()))
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort();

        candidates.into_iter().find(|drive| Self::is_real_drive(drive))
    }

    fn is_real_drive(drive: &Path) -> bool {
        drive.join("Users").is_dir() || drive.join("Windows").is_dir()
    }

    /// True when running natively on Windows and at least one agent's
    /// session directory is directly visible under the user profile.
    pub fn native_windows_stores_visible(&self) -> bool {
        if !cfg!(target_os = "windows") {
            return false;
        }
        let Some(home) = dirs::home_dir() else {
            return false;
        };
        AgentKind::ALL
            .iter()
            .any(|kind| home.join(kind.store_suffix()).is_dir())
    }
}

impl Default for EnvironmentProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture_probe(kernel_text: &str, with_drive: bool) -> (TempDir, EnvironmentProbe) {
        let temp = TempDir::new().unwrap();
        let kernel_info = temp.path().join("version");
        std::fs::write(&kernel_info, kernel_text).unwrap();

        let mount_root = temp.path().join("mnt");
        std::fs::create_dir_all(&mount_root).unwrap();
        if with_drive {
            std::fs::create_dir_all(mount_root.join("c/Windows")).unwrap();
            std::fs::create_dir_all(mount_root.join("c/Users/dev")).unwrap();
        }

        let probe = EnvironmentProbe::with_paths(kernel_info, mount_root);
        (temp, probe)
    }

    #[test]
    fn test_detects_compat_layer_kernel() {
        let (_temp, probe) = fixture_probe(
            "Linux version 5.15.90.1-microsoft-standard-WSL2 (gcc ...)",
            true,
        );
        assert!(probe.inside_compat_layer());
    }

    #[test]
    fn test_plain_kernel_not_detected() {
        let (_temp, probe) = fixture_probe("Linux version 6.8.0-39-generic (buildd@...)", false);
        assert!(!probe.inside_compat_layer());
    }

    #[test]
    fn test_missing_kernel_info_not_detected() {
        let temp = TempDir::new().unwrap();
        let probe = EnvironmentProbe::with_paths(
            temp.path().join("no-such-file"),
            temp.path().join("mnt"),
        );
        assert!(!probe.inside_compat_layer());
        assert!(probe.windows_mount().is_none());
    }

    #[test]
    fn test_windows_mount_requires_real_drive() {
        let temp = TempDir::new().unwrap();
        let mount_root = temp.path().join("mnt");
        // Empty /mnt/c: exists but is not a real mounted drive
        std::fs::create_dir_all(mount_root.join("c")).unwrap();

        let probe = EnvironmentProbe::with_paths(temp.path().join("version"), mount_root.clone());
        assert!(probe.windows_mount().is_none());

        // Once the drive carries Windows/, it qualifies
        std::fs::create_dir_all(mount_root.join("c/Windows")).unwrap();
        assert_eq!(probe.windows_mount(), Some(mount_root.join("c")));
    }

    #[test]
    fn test_windows_mount_skips_non_drive_entries() {
        let temp = TempDir::new().unwrap();
        let mount_root = temp.path().join("mnt");
        std::fs::create_dir_all(mount_root.join("wsl")).unwrap();
        std::fs::create_dir_all(mount_root.join("d/Users")).unwrap();

        let probe = EnvironmentProbe::with_paths(temp.path().join("version"), mount_root.clone());
        assert_eq!(probe.windows_mount(), Some(mount_root.join("d")));
    }

    #[test]
    fn test_environment_report_inside_layer() {
        let (_temp, probe) = fixture_probe("Linux version 5.15.90.1-microsoft-standard-WSL2", true);
        let report = probe.detect();
        let kinds = report.environments();

        assert_eq!(kinds[0], EnvironmentKind::Local);
        assert!(kinds.contains(&EnvironmentKind::CompatLayer));
        assert!(kinds.contains(&EnvironmentKind::WindowsFromCompatLayer));
    }

    #[test]
    fn test_environment_report_plain_linux() {
        let (_temp, probe) = fixture_probe("Linux version 6.8.0-39-generic", false);
        let kinds = probe.detect().environments();
        assert_eq!(kinds, vec![EnvironmentKind::Local]);
    }
}
