use colored::*;

use lanscope_common::network::interface;

pub fn run() -> anyhow::Result<()> {
    for intf in interface::list() {
        let mac = intf
            .mac
            .map_or_else(|| String::from("-"), |mac| mac.to_string());
        let state = if intf.is_up() {
            "up".green()
        } else {
            "down".red()
        };
        let addrs: Vec<String> = intf.ips.iter().map(|ip| ip.to_string()).collect();
        println!(
            "{:<12} {:<6} {:<18} {}",
            intf.name.bold(),
            state,
            mac,
            addrs.join(", ")
        );
    }
    Ok(())
}
