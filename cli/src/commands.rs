pub mod interfaces;
pub mod scan;
pub mod sniff;

use clap::{Args, Parser, Subcommand};
use lanscope_common::network::target::Target;

#[derive(Parser)]
#[command(name = "lanscope")]
#[command(about = "LAN host discovery and live traffic classification.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover hosts in a network range via ARP
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// Capture and classify live traffic
    #[command(alias = "n")]
    Sniff(SniffArgs),
    /// List the available capture interfaces
    #[command(alias = "i")]
    Interfaces,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Target: "lan", a CIDR block, a single IP, or start-end
    #[arg(default_value = "lan")]
    pub target: Target,
    /// Reply-collection window in seconds
    #[arg(short, long, default_value_t = 3)]
    pub timeout: u64,
    /// Stop after this many hosts replied
    #[arg(long)]
    pub max_hosts: Option<usize>,
    /// Interface to probe from (autodetected by default)
    #[arg(short, long)]
    pub interface: Option<String>,
    /// Directory for the results document
    #[arg(short, long, default_value = "output")]
    pub output: String,
}

#[derive(Args)]
pub struct SniffArgs {
    /// Filter, e.g. "tcp", "udp port 53", "port 443"
    #[arg(short, long, default_value = "")]
    pub filter: String,
    /// Stop after this many matching packets (0 = unlimited)
    #[arg(short, long, default_value_t = 0)]
    pub count: usize,
    /// Interface to capture on (autodetected by default)
    #[arg(short, long)]
    pub interface: Option<String>,
    /// Append the per-packet log here
    #[arg(long, default_value = "output/sniff_logs.txt")]
    pub log_file: String,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
