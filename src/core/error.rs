use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Training job {name} already exists")]
    AlreadyExists { name: String },

    #[error("Could not find training job {name}")]
    NotFound { name: String },

    #[error("Training job registry lock was poisoned")]
    Poisoned,
}

pub type RegistryResult<T> = Result<T, RegistryError>;
