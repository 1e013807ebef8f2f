//! ecstep
//!
//! Plans the decoding step for one block group and prints it as JSON.
//!
//! ```text
//! ecstep --data-units 6 --parity-units 3 --chunk-size 1048576 --erased 2,7
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ecstep::ec::config::{RELEASE_POLICY_KEY, RS_RAWCODER_KEY, RS_USE_XOR_KEY};
use ecstep::{CoderConf, EcBlockGroup, RsErasureDecoder, UnitShape};

// =============================================================================
// CLI Arguments
// =============================================================================

/// ecstep - Erasure coding decode-step planner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of data units (k)
    #[arg(long, env = "EC_DATA_UNITS", default_value = "6")]
    data_units: usize,

    /// Number of parity units (m)
    #[arg(long, env = "EC_PARITY_UNITS", default_value = "3")]
    parity_units: usize,

    /// Chunk size in bytes
    #[arg(long, env = "EC_CHUNK_SIZE", default_value = "1048576")]
    chunk_size: usize,

    /// Erased unit indexes, comma separated
    #[arg(long, value_delimiter = ',')]
    erased: Vec<usize>,

    /// Disable the single-erasure XOR decoder
    #[arg(long, env = "EC_NO_XOR")]
    no_xor: bool,

    /// Alternate Reed-Solomon raw decoder identifier
    #[arg(long, env = "EC_RS_RAWCODER")]
    rs_raw_coder: Option<String>,

    /// Backends released on teardown (all, prefer-xor)
    #[arg(long, env = "EC_RELEASE_POLICY")]
    release_policy: Option<String>,

    /// Extra coder configuration as key=value, repeatable
    #[arg(long = "conf", value_name = "KEY=VALUE")]
    conf: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn coder_conf(&self) -> anyhow::Result<CoderConf> {
        let mut conf = CoderConf::new();
        for entry in &self.conf {
            let Some((key, value)) = entry.split_once('=') else {
                bail!("--conf expects KEY=VALUE, got '{}'", entry);
            };
            conf.set(key.trim(), value.trim());
        }
        if self.no_xor {
            conf.set(RS_USE_XOR_KEY, "false");
        }
        if let Some(name) = &self.rs_raw_coder {
            conf.set(RS_RAWCODER_KEY, name.as_str());
        }
        if let Some(policy) = &self.release_policy {
            conf.set(RELEASE_POLICY_KEY, policy.as_str());
        }
        Ok(conf)
    }
}

// =============================================================================
// Main
// =============================================================================

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let shape = UnitShape::new(args.data_units, args.parity_units, args.chunk_size)
        .context("invalid unit shape")?;
    if let Some(bad) = args.erased.iter().find(|i| **i >= shape.total_units()) {
        bail!("erased index {} outside 0..{}", bad, shape.total_units());
    }

    let mut coordinator = RsErasureDecoder::new(shape)?;
    coordinator.configure(&args.coder_conf()?);

    info!("Planning decode for {}", shape);
    info!("  Erased units: {:?}", args.erased);
    info!("  XOR when possible: {}", coordinator.use_xor_when_possible());
    info!("  Release policy: {}", coordinator.release_policy());

    let group = EcBlockGroup::with_erasures(&shape, &args.erased);
    let plan = coordinator.prepare_decoding_step(&group)?;

    println!("{}", serde_json::to_string_pretty(&plan)?);

    drop(plan);
    let released = coordinator.release();
    info!("Released backends: {:?}", released);

    Ok(())
}

// =============================================================================
// Logging
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // Logs go to stderr so stdout carries only the plan
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
