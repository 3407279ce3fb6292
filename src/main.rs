use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use kube_capacity_auditor::{
    audit_cluster, build_descriptors, Cli, Config, Connector, KubeConnector, OutputFormat, UtilizationReport,
};

/// Why a run ended without a report.
#[derive(Debug)]
enum Failure {
    /// Arguments parsed but could not be decoded.
    Usage(anyhow::Error),
    Audit(anyhow::Error),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            // same status clap uses for usage errors
            Failure::Usage(_) => 2,
            Failure::Audit(_) => 1,
        }
    }

    fn error(&self) -> &anyhow::Error {
        match self {
            Failure::Usage(e) | Failure::Audit(e) => e,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    // Usage errors exit with status 2 from inside clap.
    let cli = Cli::parse();

    match audit(cli, &KubeConnector, &mut std::io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error!("{:#}", failure.error());
            ExitCode::from(failure.exit_code())
        }
    }
}

async fn audit<C: Connector>(cli: Cli, connector: &C, out: &mut impl Write) -> Result<(), Failure> {
    let cfg = Config::from_cli(cli).map_err(Failure::Usage)?;
    run(&cfg, connector, out).await.map_err(Failure::Audit)
}

async fn run<C: Connector>(cfg: &Config, connector: &C, out: &mut impl Write) -> Result<()> {
    let descriptors = build_descriptors(cfg)?;
    info!("{} candidate API server(s)", descriptors.len());

    let report = audit_cluster(connector, &descriptors).await?;
    for node in report.undefined_nodes() {
        warn!("{}: zero allocatable capacity, percentages unavailable", node.label());
    }
    print_report(&report, cfg.output, out)
}

fn print_report(report: &UtilizationReport, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for line in report.lines() {
                writeln!(out, "{}", line)?;
            }
        }
        OutputFormat::Json => writeln!(out, "{}", report.to_json()?)?,
    }
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
