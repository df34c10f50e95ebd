use std::fmt;
use std::path::PathBuf;

/// Key container used when none is configured.
pub const DEFAULT_KEY_CONTAINER: &str = r"\\.\HDIMAGE\IPK_NONAME";
pub const DEFAULT_CERTMGR: &str = "certmgr";
pub const DEFAULT_CSPTEST: &str = "csptest";

/// Settings for [`CryptoProSigner`](crate::CryptoProSigner).
#[derive(Clone)]
pub struct SignerConfig {
    /// Path to the `certmgr` utility.
    pub certmgr: String,
    /// Path to the `csptest` utility.
    pub csptest: String,
    /// Key container passed to `csptest -cont`.
    pub key_container: String,
    /// PIN protecting the key container.
    pub certificate_pin: String,
    /// Directory for the per-call temp files; system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
}

impl SignerConfig {
    pub fn new(certificate_pin: impl Into<String>) -> Self {
        Self {
            certmgr: DEFAULT_CERTMGR.to_string(),
            csptest: DEFAULT_CSPTEST.to_string(),
            key_container: DEFAULT_KEY_CONTAINER.to_string(),
            certificate_pin: certificate_pin.into(),
            temp_dir: None,
        }
    }
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("certmgr", &self.certmgr)
            .field("csptest", &self.csptest)
            .field("key_container", &self.key_container)
            .field("certificate_pin", &"<redacted>")
            .field("temp_dir", &self.temp_dir)
            .finish()
    }
}
