use clap::Parser;
use skema_drv::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = skema_drv::run(&cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
