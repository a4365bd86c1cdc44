use std::{io, net::SocketAddr, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Startup failures. Every variant is fatal to the process.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Failed to get current working directory")]
    #[diagnostic(code(fshare::current_dir))]
    CurrentDir(#[source] io::Error),

    #[error("The given path \"{}\" does not exist", .path.display())]
    #[diagnostic(code(fshare::not_found))]
    NotFound { path: PathBuf },

    #[error("Cannot read metadata of \"{}\"", .path.display())]
    #[diagnostic(code(fshare::metadata))]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("\"{}\" is neither a directory nor a regular file", .path.display())]
    #[diagnostic(
        code(fshare::unsupported),
        help("only directories and regular files can be shared")
    )]
    Unsupported { path: PathBuf },

    #[error("Failed to bind to {addr}")]
    #[diagnostic(code(fshare::bind))]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Server error")]
    #[diagnostic(code(fshare::serve))]
    Serve(#[source] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
