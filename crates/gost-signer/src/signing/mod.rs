mod signer;
mod command;
mod container;
mod files;
mod encoding;
mod cryptopro;

pub use signer::PayloadSigner;
pub use command::{CommandError, CommandRunner, ProcessRunner};
pub use container::{ContainerHash, parse_container_hash};
pub use files::SigningFiles;
pub use encoding::{GOST_2012_256_SIGNATURE_LEN, decode_signature, encode_signature};
pub use cryptopro::{CryptoProSigner, SIGN_ALGORITHM};
