use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error(
        "no infrastructure file found. Looked for:\n\
        - current directory: convoy.local.yml, convoy.yml, convoy.yaml, infrastructure.yml\n\
        - the same names under ./.convoy/\n\
        - ~/.config/convoy/convoy.yml\n\
        Pass --file or set CONVOY_CONFIG_PATH to point at one directly"
    )]
    NotFound,

    #[error("infrastructure file {0} does not exist")]
    ExplicitPathMissing(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
