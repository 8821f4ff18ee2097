//! `dspw`: browse a Ceph Salt proposal tree and try out node and role
//! assignments before deploying anything.
//!
//! ```bash
//! dspw --proposal-dir ./proposals show
//! dspw plan --add node1 --add node2 --assign mon=node1 --format yaml
//! DSPW_LOG_LEVEL=debug dspw roles
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use dspw_cluster::{Cluster, NodeId, RoleRegistry, ROLE_PREFIX};
use dspw_common::ProposalError;

mod render;
mod settings;

use render::OutputFormat;
use settings::load_settings;

#[derive(Parser, Debug)]
#[command(name = "dspw", version, about = "Ceph Salt proposal profile wizard")]
struct Cli {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Proposal tree root, overrides settings
    #[arg(short, long, global = true)]
    proposal_dir: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show nodes and roles as discovered
    Show,

    /// List discovered and unsupported roles
    Roles,

    /// Apply assignments in memory and show the result
    Plan(PlanArgs),
}

#[derive(clap::Args, Debug, Default)]
struct PlanArgs {
    /// Node to add to the cluster
    #[arg(long = "add", value_name = "NODE")]
    add: Vec<NodeId>,

    /// Role assignment, applied after all adds
    #[arg(long = "assign", value_name = "ROLE=NODE", value_parser = parse_assignment)]
    assign: Vec<(String, NodeId)>,

    /// Node to remove from the cluster, applied last
    #[arg(long = "remove", value_name = "NODE")]
    remove: Vec<NodeId>,
}

/// `mon=node1` or `role-mon=node1`
fn parse_assignment(s: &str) -> Result<(String, NodeId), String> {
    let (role, node) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ROLE=NODE, got '{}'", s))?;

    let token = if role.starts_with(ROLE_PREFIX) {
        role.to_string()
    } else {
        format!("{}{}", ROLE_PREFIX, role)
    };

    let node = NodeId::new(node).map_err(|e| e.to_string())?;
    Ok((token, node))
}

fn plan(cluster: &mut Cluster, args: &PlanArgs) -> anyhow::Result<()> {
    for node in &args.add {
        cluster
            .add(node)
            .with_context(|| format!("cannot add {}", node))?;
    }

    for (token, node) in &args.assign {
        let kind = cluster.registry().lookup(token)?;
        cluster
            .assign_role(kind, node)
            .with_context(|| format!("cannot assign {} to {}", token, node))?;
    }

    for node in &args.remove {
        cluster
            .remove(node)
            .with_context(|| format!("cannot remove {}", node))?;
    }

    Ok(())
}

/// Exit status for a failed run: 2 when the operator asked for something the
/// proposal does not allow (nothing was changed), 1 for anything else.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ProposalError>() {
        Some(e) if e.is_recoverable() => 2,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.config.as_deref(), cli.proposal_dir.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    debug!(?settings, "Loaded settings");

    let mut cluster = Cluster::open(settings.cluster, RoleRegistry::standard())
        .context("failed to open proposal")?;

    let output = match &cli.command {
        Command::Show => render::render(&cluster.snapshot(), cli.format)?,
        Command::Roles => match cli.format {
            OutputFormat::Text => render::render_roles(&cluster.snapshot()),
            format => render::render(&cluster.snapshot(), format)?,
        },
        Command::Plan(args) => {
            plan(&mut cluster, args)?;
            render::render(&cluster.snapshot(), cli.format)?
        }
    };

    print!("{}", output);

    Ok(())
}
