mod commands;
mod terminal;

use commands::{CommandLine, Commands, interfaces, scan, sniff};
use terminal::print;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    terminal::logging::init();

    match commands.command {
        Commands::Scan(args) => {
            print::header("network discovery");
            scan::run(args).await
        }
        Commands::Sniff(args) => {
            print::header("live capture");
            sniff::run(args).await
        }
        Commands::Interfaces => {
            print::header("capture interfaces");
            interfaces::run()
        }
    }
}
