use clap::Parser;
use contacts_router::Config;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    contacts_router::run(&config)
}
