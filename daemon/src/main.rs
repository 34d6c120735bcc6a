//! Credence daemon: entry point for running the credential ledger.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;

use credence_ledger::LedgerEvent;
use credence_node::{load_snapshot, CallEnvelope, LedgerNode, NodeConfig};
use credence_nullables::{NullStore, NullTransferSink};
use credence_store::FeeTransfer;
use credence_types::{Height, Principal, ProofHash};
use credence_utils::LogFormat;

#[derive(Parser)]
#[command(name = "credence-daemon", about = "Credence credential ledger daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-user proof quota.
    #[arg(long, env = "CREDENCE_MAX_PROOFS_PER_USER")]
    max_proofs_per_user: Option<u64>,

    /// Fee charged per proof submission.
    #[arg(long, env = "CREDENCE_VERIFICATION_FEE")]
    verification_fee: Option<u64>,

    /// Governance authority installed at startup.
    #[arg(long, env = "CREDENCE_AUTHORITY")]
    authority: Option<String>,

    /// Only the authority may change governance parameters.
    #[arg(long, env = "CREDENCE_RESTRICT_GOVERNANCE")]
    restrict_governance: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "CREDENCE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "CREDENCE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Execute a JSON-lines call log and print one outcome per call.
    Replay {
        /// File with one call envelope per line (`-` for stdin).
        #[arg(long)]
        calls: PathBuf,

        /// Start from this snapshot instead of an empty ledger.
        #[arg(long)]
        snapshot_in: Option<PathBuf>,

        /// Write a snapshot of the final ledger here.
        #[arg(long)]
        snapshot_out: Option<PathBuf>,
    },
    /// Print the proof hash (hex Blake2b-256) of a credential file.
    Hash {
        file: PathBuf,
    },
    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    /// File config (or defaults) with CLI flags and env vars applied on top.
    fn effective_config(&self) -> anyhow::Result<NodeConfig> {
        let base = match &self.config {
            Some(path) => NodeConfig::from_toml_file(path)?,
            None => NodeConfig::default(),
        };
        let config = NodeConfig {
            max_proofs_per_user: self.max_proofs_per_user.unwrap_or(base.max_proofs_per_user),
            verification_fee: self.verification_fee.unwrap_or(base.verification_fee),
            authority: self.authority.clone().map(Principal::new).or(base.authority),
            restrict_governance_to_authority: self.restrict_governance
                || base.restrict_governance_to_authority,
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            log_format: self.log_format.unwrap_or(base.log_format),
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.effective_config()?;
    credence_utils::init_logging(config.log_format, &config.log_level);

    match &cli.command {
        Command::Replay {
            calls,
            snapshot_in,
            snapshot_out,
        } => replay(&config, calls, snapshot_in.as_deref(), snapshot_out.as_deref()),
        Command::Hash { file } => {
            let content =
                std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
            println!("{}", ProofHash::digest(&content));
            Ok(())
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

/// Final line of replay output.
#[derive(Serialize)]
struct SummaryLine {
    summary: ReplaySummary,
}

#[derive(Serialize)]
struct ReplaySummary {
    calls: usize,
    failed: usize,
    height: Height,
    transfers: Vec<FeeTransfer>,
    events: Vec<LedgerEvent>,
}

fn replay(
    config: &NodeConfig,
    calls: &Path,
    snapshot_in: Option<&Path>,
    snapshot_out: Option<&Path>,
) -> anyhow::Result<()> {
    let node = match snapshot_in {
        Some(path) => {
            let snapshot = load_snapshot(path)
                .with_context(|| format!("loading snapshot {}", path.display()))?;
            LedgerNode::from_snapshot(&snapshot, NullStore::new(), NullTransferSink::new(), config)?
        }
        None => LedgerNode::in_memory(config)?,
    };

    let reader: Box<dyn BufRead> = if calls == Path::new("-") {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = std::fs::File::open(calls)
            .with_context(|| format!("opening call log {}", calls.display()))?;
        Box::new(BufReader::new(file))
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut total = 0usize;
    let mut failed = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let envelope: CallEnvelope = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(e) => bail!("line {}: malformed call envelope: {e}", index + 1),
        };
        let outcome = node
            .dispatch(&envelope)
            .with_context(|| format!("line {}", index + 1))?;
        total += 1;
        if !outcome.is_ok() {
            failed += 1;
        }
        serde_json::to_writer(&mut out, &outcome)?;
        writeln!(out)?;
    }

    let transfers = node.with_engine(|e| e.sink().transfers())?;
    let events = node.drain_events()?;
    let summary = SummaryLine {
        summary: ReplaySummary {
            calls: total,
            failed,
            height: node.height()?,
            transfers,
            events,
        },
    };
    serde_json::to_writer(&mut out, &summary)?;
    writeln!(out)?;
    tracing::info!(calls = total, failed, "replay finished");

    if let Some(path) = snapshot_out {
        node.save_snapshot(path)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
    }
    Ok(())
}
