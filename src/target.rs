use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// The filesystem entry being shared, classified once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Directory(PathBuf),
    File(PathBuf),
}

impl Target {
    /// Follows symlinks, so a dangling link is reported as not found.
    pub fn classify(path: &Path) -> Result<Self> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::NotFound {
                    path: path.to_owned(),
                })
            }
            Err(source) => {
                return Err(Error::Metadata {
                    path: path.to_owned(),
                    source,
                })
            }
        };

        if meta.is_dir() {
            Ok(Self::Directory(path.to_owned()))
        } else if meta.is_file() {
            Ok(Self::File(path.to_owned()))
        } else {
            Err(Error::Unsupported {
                path: path.to_owned(),
            })
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::File(path) => path,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Directory(_) => "directory",
            Self::File(_) => "file",
        }
    }
}
