use std::sync::Arc;

use tracing::info;

pub use config::Config;
pub use request::{Request, RequestLine};
pub use response_writer::ResponseWriter;
pub use router::matcher::{normalize, Match, RouteNotFound, RouteTable, RouteTemplate};
pub use router::Router;
pub use server::{Handler, HttpMethod, Server};
pub use users::{new_user_router, InMemoryUserRepo, UserRepo};

mod config;
mod request;
mod response_writer;
mod router;
mod server;
mod status_code_registry;
mod users;

#[cfg(test)]
mod test_utils;

pub fn run(config: &Config) -> anyhow::Result<()> {
    let server = Server::bind(config)?;
    let router = new_user_router(&config.prefix, Arc::new(InMemoryUserRepo::new()));

    info!(
        addr = %server.local_addr()?,
        prefix = %config.prefix,
        read_timeout = ?config.read_timeout(),
        "listening"
    );
    server.serve(router);
    Ok(())
}
