//! share a directory or a single file over http
#![forbid(unsafe_code)]
#![deny(
    // missing_docs,
    future_incompatible,
    rustdoc::all,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::enum_glob_use)]

use args::{Args, OpenErrorPolicy};
use axum::{middleware, Router};
use clap::Parser;
use easy_sgr::{Color::*, Style::*};
use target::Target;

/// implements clap
pub mod args;

/// startup errors
pub mod error;

/// directory and single file handlers
pub mod handler;

/// request logging
pub mod log;

/// listener and serving loop
pub mod server;

/// server end signal
pub mod signal;

/// classifies the shared path
pub mod target;

pub use error::{Error, Result};
pub use server::Server;

pub async fn run() -> miette::Result<()> {
    miette::set_panic_hook();
    let args = parse_args();
    log::init(args.log_level);

    let config = args.resolve()?;
    let addr = config.addr();
    tracing::info!("try to bind to {addr}");
    tracing::info!("the shared path is {}", config.path.display());

    let target = Target::classify(&config.path)?;
    let server = Server::bind(addr, router(&target, config.open_error)).await?;

    eprintln!(
        "{GreenFg}\
            fshare serving {} {} on port {}\
         {Reset}",
        target.mode(),
        target.path().display(),
        config.port,
    );

    server.serve(signal::shutdown()).await?;
    eprintln!("{GreenFg}fshare stopped{Reset}");

    Ok(())
}

/// Like `Args::parse`, but usage and help always go to stderr.
fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprint!("{}", e.render());
            std::process::exit(e.exit_code());
        }
    }
}

/// The handler for `target` wrapped in the request logger.
pub fn router(target: &Target, policy: OpenErrorPolicy) -> Router {
    handler::router(target, policy).layer(middleware::from_fn(log::log_request))
}
