use futures::future::BoxFuture;

use crate::error::SignError;

/// Trait for signing string payloads.
///
/// Implementations delegate to an external provider, so every call is
/// async and may suspend on process and file I/O.
pub trait PayloadSigner: Send + Sync {
    /// Sign `payload`. Returns the encoded signature.
    fn sign<'a>(&'a self, payload: &'a str) -> BoxFuture<'a, Result<String, SignError>>;

    /// Identifier of the signing certificate (e.g. its SHA1 thumbprint).
    fn key_id(&self) -> BoxFuture<'_, Result<String, SignError>>;

    /// Algorithm identifier string (e.g. "GOST12_256").
    fn algorithm(&self) -> &str;
}
