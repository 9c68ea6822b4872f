use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use colored::*;
use tracing::info;

use lanscope_common::config::CaptureConfig;
use lanscope_common::network::packet::Protocol;
use lanscope_core::capture::CaptureEngine;
use lanscope_core::classify;
use lanscope_core::results::{ResultStore, SniffSession};

use crate::commands::SniffArgs;
use crate::terminal::print;

pub async fn run(args: SniffArgs) -> anyhow::Result<()> {
    let cfg = CaptureConfig {
        filter: args.filter.clone(),
        count_limit: (args.count > 0).then_some(args.count),
        interface: args.interface.clone(),
    };

    let mut log = open_log(&args.log_file)?;
    let mut session = CaptureEngine::start(&cfg)?;
    let mut store = ResultStore::new();

    println!("capturing... press Ctrl+C to stop");
    loop {
        // The recv future borrows the session, so the stop request is
        // handled after the select block releases it.
        let next = tokio::select! {
            frame = session.recv() => Some(frame),
            _ = tokio::signal::ctrl_c() => None,
        };
        match next {
            Some(Some(frame)) => {
                let record = classify::classify(&frame.bytes);
                let packet = store.append(record, frame.timestamp);
                let line = packet.log_line();
                println!("{packet}");
                writeln!(log, "{line}").context("writing sniff log")?;
            }
            // Producer reached a terminal state and the queue is drained.
            Some(None) => break,
            None => {
                println!();
                info!("stop requested");
                session.stop();
            }
        }
    }
    let state = session.wait();

    let stats = store.protocol_stats();
    let finished = store.finish(session.started, args.filter, cfg.count_limit, state);
    print_stats(&finished, &stats);
    info!("logs saved to {}", args.log_file);
    Ok(())
}

fn open_log(path: &str) -> anyhow::Result<std::fs::File> {
    if let Some(dir) = Path::new(path).parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {path}"))
}

fn print_stats(session: &SniffSession, stats: &[(Protocol, u64)]) {
    print::separator();
    let total = session.packets.len();
    println!(
        "session {:?}: {} packets between {} and {}",
        session.state,
        total,
        session.started.format("%H:%M:%S"),
        session.ended.format("%H:%M:%S"),
    );

    for (protocol, count) in stats {
        let share = 100.0 * *count as f64 / total.max(1) as f64;
        println!(
            "{:>6}: {:4} packets ({:5.1}%)",
            protocol.to_string().bold(),
            count,
            share
        );
    }
}
