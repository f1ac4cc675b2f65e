use clap::Parser;
use env_logger::Env;

use investpro::api::{Cli, run};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("investpro: {e}");
        std::process::exit(1);
    }
}
