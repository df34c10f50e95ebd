use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tempfile::NamedTempFile;
use tracing::warn;

const FILE_PREFIX: &str = "gost-";
const UNSIGNED_SUFFIX: &str = ".unsigned";
const SIGNED_SUFFIX: &str = ".sgn";

/// The `.unsigned` / `.sgn` file pair used by one signing call.
///
/// Both files are removed when the value is dropped, whether the call
/// succeeded, failed or was cancelled.
pub struct SigningFiles {
    unsigned: NamedTempFile,
    signed: PathBuf,
}

impl SigningFiles {
    /// Creates a uniquely named `.unsigned` file in `dir` (or the system
    /// temp dir) holding `payload`.
    pub async fn create(dir: Option<&Path>, payload: &str) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(FILE_PREFIX).suffix(UNSIGNED_SUFFIX);
        let unsigned = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .context("creating unsigned temp file")?;

        let mut signed = OsString::from(unsigned.path().as_os_str());
        signed.push(SIGNED_SUFFIX);

        let files = Self {
            unsigned,
            signed: PathBuf::from(signed),
        };
        tokio::fs::write(files.unsigned_path(), payload)
            .await
            .context("writing payload to temp file")?;
        Ok(files)
    }

    pub fn unsigned_path(&self) -> &Path {
        self.unsigned.path()
    }

    pub fn signed_path(&self) -> &Path {
        &self.signed
    }

    /// Reads the signature the provider wrote to the `.sgn` file.
    pub async fn read_signature(&self) -> Result<Vec<u8>> {
        let signature = tokio::fs::read(&self.signed)
            .await
            .with_context(|| format!("reading signature file {}", self.signed.display()))?;
        if signature.is_empty() {
            bail!("signature file {} is empty", self.signed.display());
        }
        Ok(signature)
    }
}

impl Drop for SigningFiles {
    fn drop(&mut self) {
        // The unsigned file is removed by `NamedTempFile`.
        if let Err(e) = std::fs::remove_file(&self.signed) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %self.signed.display(), "failed to remove signature file: {e}");
            }
        }
    }
}
