//! trailhead - cross-environment session-store browser
//!
//! Locates every on-disk store of AI-coding-assistant conversation logs
//! reachable from this machine (native, compatibility layer, Windows host,
//! SSH remotes) and lists them under one naming scheme.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Logs: $XDG_STATE_HOME/trailhead/trailhead.log (~/.local/state/trailhead/trailhead.log)
//! - Config: $XDG_CONFIG_HOME/trailhead/config.toml (~/.config/trailhead/config.toml)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use trailhead_core::codec::{self, FsOracle};
use trailhead_core::probe::EnvironmentProbe;
use trailhead_core::remote::RemoteEndpoint;
use trailhead_core::{
    list_session_files, list_workspaces, AgentKind, Config, Environment, Error, Selection,
    SourceResolver,
};

#[derive(Parser)]
#[command(name = "trailhead")]
#[command(about = "Locate AI-assistant session stores across environments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve and list session stores across the selected namespaces
    Sources {
        /// Probe the local namespace
        #[arg(long)]
        local: bool,

        /// Probe compatibility-layer distributions
        #[arg(long)]
        compat_layer: bool,

        /// Probe the Windows host namespace
        #[arg(long)]
        windows: bool,

        /// Probe a remote endpoint (repeatable)
        #[arg(long = "remote", value_name = "USER@HOST")]
        remotes: Vec<String>,

        /// Skip compatibility-layer and remote probing entirely
        #[arg(long)]
        offline: bool,

        /// Also list decoded workspaces inside each readable store
        #[arg(long)]
        workspaces: bool,

        /// Emit JSON instead of the human-readable listing
        #[arg(long)]
        json: bool,
    },

    /// Report which filesystem namespaces are detected from here
    Environments,

    /// Flatten a workspace path into an encoded store name
    Encode {
        /// Hierarchical path to flatten
        path: PathBuf,
    },

    /// Expand an encoded store name back into a workspace path
    Decode {
        /// Encoded name (e.g. -home-user-my-proj)
        #[arg(allow_hyphen_values = true)]
        name: String,

        /// Search root for filesystem verification
        #[arg(long, default_value = "/")]
        root: PathBuf,

        /// Split on dashes only, without consulting the filesystem
        #[arg(long)]
        naive: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Ensure XDG environment variables are set before using core library
    Config::ensure_xdg_env();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = trailhead_core::logging::init(&config.logging).ok();

    match cli.command {
        Command::Sources {
            local,
            compat_layer,
            windows,
            remotes,
            offline,
            workspaces,
            json,
        } => {
            let selection =
                build_selection(local, compat_layer, windows, &remotes, offline)?;
            run_sources(&config, &selection, workspaces, json)
        }
        Command::Environments => run_environments(),
        Command::Encode { path } => {
            println!("{}", codec::encode(&path));
            Ok(ExitCode::SUCCESS)
        }
        Command::Decode { name, root, naive } => run_decode(&name, &root, naive),
    }
}

/// Map CLI flags onto a namespace selection. No namespace flag at all means
/// an auto scan of everything detected.
fn build_selection(
    local: bool,
    compat_layer: bool,
    windows: bool,
    remotes: &[String],
    offline: bool,
) -> Result<Selection> {
    let mut selection = if !local && !compat_layer && !windows && remotes.is_empty() {
        Selection::auto()
    } else {
        let mut s = Selection::none();
        s.local = local;
        s.compat_layer = compat_layer;
        s.windows = windows;
        s.remote = !remotes.is_empty();
        for spec in remotes {
            let endpoint = RemoteEndpoint::from_str(spec)
                .with_context(|| format!("invalid --remote argument: {}", spec))?;
            s.remotes.push(endpoint);
        }
        s
    };

    if offline {
        selection.compat_layer = false;
        selection.remote = false;
    }

    Ok(selection)
}

fn run_sources(
    config: &Config,
    selection: &Selection,
    workspaces: bool,
    json: bool,
) -> Result<ExitCode> {
    let mut resolver = SourceResolver::new(config);

    let resolution = match resolver.resolve(selection) {
        Ok(resolution) => resolution,
        Err(Error::NoSourcesFound) => {
            eprintln!("No session stores found in any probed namespace.");
            return Ok(ExitCode::FAILURE);
        }
        Err(Error::NamespaceUnavailable { namespace, reason }) => {
            eprintln!("Namespace unavailable: {}: {}", namespace, reason);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e).context("source resolution failed"),
    };

    for warning in &resolution.warnings {
        eprintln!("warning: {}", warning);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Resolved {} session store(s):", resolution.sources.len());
    for store in &resolution.sources {
        let marker = if store.verified { "" } else { "  (unverified)" };
        println!(
            "  {} [{}] {}{}",
            store.environment,
            store.agent.display_name(),
            store.root.display(),
            marker
        );

        let local_readable =
            store.verified && !matches!(store.environment, Environment::Remote { .. });
        if workspaces && local_readable {
            if store.agent == AgentKind::Claude {
                match list_workspaces(store, &FsOracle) {
                    Ok(list) => {
                        for workspace in list {
                            let hint = if workspace.fully_resolved { "" } else { " (?)" };
                            println!(
                                "      {} -> {}{}",
                                workspace.label,
                                workspace.path.display(),
                                hint
                            );
                        }
                    }
                    Err(e) => {
                        tracing::warn!(root = %store.root.display(), error = %e, "Failed to list workspaces");
                    }
                }
            } else if let Ok(files) = list_session_files(store) {
                println!("      {} session file(s)", files.len());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_environments() -> Result<ExitCode> {
    let report = EnvironmentProbe::new().detect();

    println!("Detected namespaces:");
    println!("  local: yes");
    println!(
        "  compatibility layer (running inside): {}",
        if report.inside_compat_layer { "yes" } else { "no" }
    );
    match &report.windows_mount {
        Some(mount) => println!("  windows host mount: {}", mount.display()),
        None => println!("  windows host mount: not reachable"),
    }
    println!(
        "  native windows stores: {}",
        if report.native_windows { "yes" } else { "no" }
    );

    Ok(ExitCode::SUCCESS)
}

fn run_decode(name: &str, root: &PathBuf, naive: bool) -> Result<ExitCode> {
    if naive {
        println!("{}", codec::decode_naive(name).display());
        return Ok(ExitCode::SUCCESS);
    }

    let decoded = codec::decode_verified(name, root, &FsOracle);
    if decoded.is_complete() {
        println!("{}", decoded.path.display());
    } else {
        // Partial resolution: show what the filesystem confirmed and what
        // it could not.
        println!("{}", codec::decode_naive(name).display());
        if let Some(remainder) = decoded.remainder() {
            eprintln!(
                "note: only {} exists here; unresolved remainder: {}",
                decoded.path.display(),
                remainder
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}
