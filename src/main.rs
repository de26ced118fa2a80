use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use faultsweep::client::{auth, CalcClient};
use faultsweep::config::Config;
use faultsweep::model::{variant, Breaker, NetworkModel};
use faultsweep::phasor::{extract_currents, PhasorMap};
use faultsweep::sweep::{self, aggregate::SweepReport};
use faultsweep::telemetry::init_tracing;

/// N-k breaker contingency sweep for short-circuit fault currents.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of breakers opened simultaneously per contingency.
    #[arg(short, long, default_value_t = 1)]
    k: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let cfg = Config::load()?;

    if cfg.auth.username.is_empty() || cfg.auth.username.starts_with("__SET_VIA_ENV") {
        anyhow::bail!(
            "service credentials missing: set FAULTSWEEP__AUTH__USERNAME and \
            FAULTSWEEP__AUTH__PASSWORD (a .env file works)"
        );
    }

    let client = auth::login(&cfg.service, &cfg.auth).await?;
    let calc = CalcClient::new(client, &cfg.service.base_url);

    let base = NetworkModel::from_file(&cfg.model.path)?;
    let breakers = base.breakers();
    info!("found {} breakers", breakers.len());
    for breaker in &breakers {
        info!("  {} (id={})", breaker.name, breaker.id);
    }

    info!("calculating normal mode (fault suppressed)");
    let normal = run_single(&calc, &variant::normal_mode_variant(&base)).await;
    log_breaker_currents(&breakers, &normal);

    info!("calculating fault mode, no outages");
    let fault_no_outage = run_single(&calc, &base).await;
    log_breaker_currents(&breakers, &fault_no_outage);

    let (_cases, global) = sweep::run_sweep(&calc, &base, &breakers, args.k).await;

    if global.no_currents() {
        info!("no non-negligible currents found in any contingency");
    } else {
        let names = global
            .winning_names
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let cases = global
            .winning_cases
            .iter()
            .map(|case| sweep::display_names(&breakers, case).join(" + "))
            .collect::<Vec<_>>()
            .join("; ");
        info!(
            "maximum fault current {:.3} kA through {names}, when opening {cases}",
            global.global_max
        );
    }

    let report = SweepReport::new(normal, fault_no_outage, &global);
    report.write(&cfg.output.path)?;
    info!("report written to {}", cfg.output.path);

    Ok(())
}

/// One calculation outside the sweep. Failures degrade to an empty map, same
/// as a failed contingency; only auth, config, and model load are fatal.
async fn run_single(calc: &CalcClient, model: &NetworkModel) -> PhasorMap {
    match calc.calculate(model).await {
        Ok(raw) => extract_currents(&raw),
        Err(err) => {
            warn!(%err, "calculation failed");
            PhasorMap::new()
        }
    }
}

fn log_breaker_currents(breakers: &[Breaker], currents: &PhasorMap) {
    for breaker in breakers {
        match currents.get(&breaker.id) {
            Some(Some(p)) => info!(
                "  {}: |I|={:.3} kA angle {:.1} deg",
                breaker.name, p.magnitude, p.angle_deg
            ),
            _ => info!("  {}: no current", breaker.name),
        }
    }
}
