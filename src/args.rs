use std::{
    env,
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;
use tracing::Level;

use crate::error::{Error, Result};

/// share a directory or a single file over http
#[derive(Parser, Debug)]
#[command(name = "fshare")]
pub struct Args {
    /// The path to share, defaults to the current directory
    pub path: Option<PathBuf>,
    /// Port to listen on
    #[arg(short, long, default_value_t = 3232)]
    pub port: u16,
    /// Exit the process when the shared file cannot be opened for a request
    #[arg(long)]
    pub exit_on_open_error: bool,
    /// Maximum log level
    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

/// What to do when the shared file can't be opened while serving a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenErrorPolicy {
    /// answer that request with an error status
    #[default]
    Respond,
    /// log and terminate the whole process
    Exit,
}

/// Resolved startup configuration, never mutated after [`Args::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub path: PathBuf,
    pub open_error: OpenErrorPolicy,
}

impl Config {
    /// Listen address on all interfaces.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

impl Args {
    pub fn resolve(self) -> Result<Config> {
        let path = match self.path {
            Some(path) => path,
            None => env::current_dir().map_err(Error::CurrentDir)?,
        };
        let open_error = if self.exit_on_open_error {
            OpenErrorPolicy::Exit
        } else {
            OpenErrorPolicy::Respond
        };

        Ok(Config {
            port: self.port,
            path,
            open_error,
        })
    }
}
