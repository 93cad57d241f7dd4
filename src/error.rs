use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("global input listener failed: {0}")]
    Listen(String),
    #[error("built without the `hooks` feature; global hotkeys are unavailable")]
    HooksUnavailable,
    #[error("invalid key name: {0:?}")]
    InvalidKey(String),
    #[error("control panel failed: {0}")]
    Ui(#[from] eframe::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
