use crate::book::ContactId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Co-occurrence model is already initialized")]
    AlreadyInitialized,

    #[error("Contact not found: {0}")]
    UnknownContact(ContactId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model encoding error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Configuration serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}
