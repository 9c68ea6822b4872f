use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::info;

use lanscope_common::config::ScanConfig;
use lanscope_core::results::ScanSession;
use lanscope_core::scanner;

use crate::commands::ScanArgs;
use crate::terminal::print;

pub async fn run(args: ScanArgs) -> anyhow::Result<()> {
    let range = args.target.resolve()?;
    let cfg = ScanConfig {
        timeout: Duration::from_secs(args.timeout),
        max_hosts: args.max_hosts,
        interface: args.interface.clone(),
        ..ScanConfig::default()
    };

    info!("scanning {range}");
    let start = Instant::now();
    let session = tokio::task::spawn_blocking(move || scanner::scan_network(&range, &cfg))
        .await
        .context("scan task panicked")??;

    print_hosts(&session);
    print_summary(&session, start.elapsed());
    write_report(&session, &args.output)
}

fn print_hosts(session: &ScanSession) {
    if session.hosts().is_empty() {
        println!("{}", "no hosts replied inside the window".yellow());
        return;
    }
    println!(
        "{:<16} {:<18} {}",
        "IP".bold(),
        "MAC".bold(),
        "VENDOR".bold()
    );
    for host in session.hosts() {
        let flag = if host.mac_changed {
            " (mac changed mid-scan)".red().to_string()
        } else {
            String::new()
        };
        println!("{:<16} {:<18} {}{}", host.ip, host.mac, host.vendor, flag);
    }
}

fn print_summary(session: &ScanSession, elapsed: Duration) {
    print::separator();
    let hosts = format!("{} active hosts", session.hosts().len()).green().bold();
    let took = format!("{:.2}s", elapsed.as_secs_f64()).yellow();
    println!("discovery complete: {hosts} identified in {took}");
}

fn write_report(session: &ScanSession, dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {dir}"))?;
    let path = Path::new(dir).join(format!(
        "scan_results_{}.json",
        session.started.format("%Y%m%d_%H%M%S")
    ));
    let json = session.export().context("serializing scan results")?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    info!("results saved to {}", path.display());
    Ok(())
}
