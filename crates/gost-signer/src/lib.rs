pub mod cli;
pub mod config;
pub mod server;
pub mod error;
pub mod signing;

pub use config::SignerConfig;
pub use error::{SignError, SignerServerError};
pub use server::{AppState, run, router};
pub use signing::{CommandRunner, CryptoProSigner, PayloadSigner, ProcessRunner};
