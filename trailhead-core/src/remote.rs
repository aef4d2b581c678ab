//! Remote source registry
//!
//! Probes user-declared `user@host` endpoints for session stores by
//! running a short existence check over the remote-shell protocol. Probes
//! are non-interactive (batch authentication only) and carry a bounded
//! wall-clock timeout enforced locally, so one unreachable endpoint can
//! never hang or abort resolution against the others.

use crate::error::Error;
use crate::types::{AbsentReason, AgentKind, Environment, Located, SessionStore};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// A declared remote endpoint. No DNS validation happens here beyond what
/// the remote-shell client itself requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteEndpoint {
    pub user: String,
    pub host: String,
}

impl RemoteEndpoint {
    /// The environment this endpoint maps to.
    pub fn environment(&self) -> Environment {
        Environment::Remote {
            user: self.user.clone(),
            host: self.host.clone(),
        }
    }

    /// The remote-side store root for an agent kind. Kept in `~/...` form;
    /// expansion happens in the remote shell, and the local process never
    /// stats this path.
    pub fn store_root(&self, agent: AgentKind) -> PathBuf {
        PathBuf::from(format!("~/{}", agent.store_suffix()))
    }
}

impl std::str::FromStr for RemoteEndpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((user, host)) if !user.is_empty() && !host.is_empty() => Ok(Self {
                user: user.to_string(),
                host: host.to_string(),
            }),
            _ => Err(Error::InvalidEndpoint(s.to_string())),
        }
    }
}

impl std::fmt::Display for RemoteEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}

/// Probes one endpoint for one agent's store. Injectable so resolver tests
/// can simulate timeouts and refusals without a network.
pub trait RemoteProber: Send + Sync {
    fn probe(&self, endpoint: &RemoteEndpoint, agent: AgentKind, timeout: Duration) -> Located;
}

/// Production prober: `ssh -o BatchMode=yes` running `test -d` on the
/// remote store path.
#[derive(Debug, Default, Clone, Copy)]
pub struct SshProber;

impl RemoteProber for SshProber {
    fn probe(&self, endpoint: &RemoteEndpoint, agent: AgentKind, timeout: Duration) -> Located {
        let connect_timeout = timeout.as_secs().max(1);
        let check = format!("test -d ~/{}", agent.store_suffix());

        let mut command = Command::new("ssh");
        command
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!("ConnectTimeout={}", connect_timeout))
            .arg(endpoint.to_string())
            .arg(check)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "Failed to spawn remote-shell client");
                return Located::Absent(AbsentReason::Unreachable);
            }
        };

        match wait_with_timeout(child, timeout) {
            WaitOutcome::Exited(code) => match code {
                // The remote shell ran our check and the path exists.
                0 => Located::Found(SessionStore::verified(
                    endpoint.environment(),
                    agent,
                    endpoint.store_root(agent),
                )),
                // ssh reserves 255 for connection/authentication failure;
                // anything else means the check itself said "no".
                255 => Located::Absent(AbsentReason::Unreachable),
                _ => Located::Absent(AbsentReason::NotInstalled),
            },
            WaitOutcome::TimedOut => {
                tracing::warn!(endpoint = %endpoint, timeout_secs = timeout.as_secs(), "Remote probe timed out");
                Located::Absent(AbsentReason::TimedOut)
            }
            WaitOutcome::Failed => Located::Absent(AbsentReason::Unreachable),
        }
    }
}

enum WaitOutcome {
    Exited(i32),
    TimedOut,
    Failed,
}

/// Wait for a child process with a deadline; kill it on expiry. The child
/// is polled rather than force-joined so an unkillable transport never
/// blocks the caller past the timeout.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> WaitOutcome {
    let deadline = Instant::now() + timeout;

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return WaitOutcome::Exited(status.code().unwrap_or(-1)),
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return WaitOutcome::TimedOut;
                }
                std::thread::sleep(Duration::from_millis(25));
            }
            Err(_) => return WaitOutcome::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_endpoint() {
        let ep = RemoteEndpoint::from_str("dev@build1.example.com").unwrap();
        assert_eq!(ep.user, "dev");
        assert_eq!(ep.host, "build1.example.com");
        assert_eq!(ep.to_string(), "dev@build1.example.com");
    }

    #[test]
    fn test_parse_endpoint_rejects_malformed() {
        assert!(RemoteEndpoint::from_str("no-at-sign").is_err());
        assert!(RemoteEndpoint::from_str("@host").is_err());
        assert!(RemoteEndpoint::from_str("user@").is_err());
    }

    #[test]
    fn test_store_root_stays_remote_side() {
        let ep = RemoteEndpoint::from_str("dev@build1").unwrap();
        assert_eq!(
            ep.store_root(AgentKind::Claude),
            PathBuf::from("~/.claude/projects")
        );
        assert_eq!(
            ep.store_root(AgentKind::Gemini),
            PathBuf::from("~/.gemini/tmp")
        );
    }

    #[test]
    fn test_wait_with_timeout_fast_exit() {
        let child = Command::new("true").spawn().unwrap();
        match wait_with_timeout(child, Duration::from_secs(5)) {
            WaitOutcome::Exited(0) => {}
            _ => panic!("expected clean exit"),
        }
    }

    #[test]
    fn test_wait_with_timeout_nonzero_exit() {
        let child = Command::new("false").spawn().unwrap();
        match wait_with_timeout(child, Duration::from_secs(5)) {
            WaitOutcome::Exited(code) => assert_ne!(code, 0),
            _ => panic!("expected exit"),
        }
    }

    #[test]
    fn test_wait_with_timeout_kills_hung_child() {
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let start = Instant::now();
        match wait_with_timeout(child, Duration::from_millis(200)) {
            WaitOutcome::TimedOut => {}
            _ => panic!("expected timeout"),
        }
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
