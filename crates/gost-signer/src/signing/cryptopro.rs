use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use tracing::{debug, error};

use super::command::{CommandRunner, ProcessRunner};
use super::container::ContainerHash;
use super::encoding::encode_signature;
use super::files::SigningFiles;
use super::signer::PayloadSigner;
use crate::config::SignerConfig;
use crate::error::SignError;

/// `csptest -sign` selector for GOST R 34.10-2012 with a 256-bit key.
pub const SIGN_ALGORITHM: &str = "GOST12_256";

const KEY_TYPE: &str = "exchange";
const LOG_COMPONENT: &str = "CryptoProSign";

/// Signs payloads through the CryptoPro CSP command-line utilities.
///
/// Each call writes the payload to a temp file, runs `csptest -sign` over
/// it and reads back the `.sgn` output. The container hash reported by
/// `certmgr -list` must resolve before anything is signed; it is looked up
/// once per signer and reused afterwards.
pub struct CryptoProSigner {
    config: SignerConfig,
    runner: Arc<dyn CommandRunner>,
    container_hash: ContainerHash,
}

impl CryptoProSigner {
    pub fn new(config: SignerConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }

    pub fn with_runner(config: SignerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            runner,
            container_hash: ContainerHash::new(),
        }
    }

    /// Resolves (and caches) the container hash.
    pub async fn container_hash(&self) -> Result<&str, SignError> {
        self.container_hash
            .get_or_fetch(self.runner.as_ref(), &self.config.certmgr)
            .await
            .map_err(|cause| {
                error!(component = LOG_COMPONENT, "container hash error {cause:#}");
                SignError::configuration(cause)
            })
    }

    /// Signs `payload`, returning the reversed signature as base64url.
    pub async fn sign_payload(&self, payload: &str) -> Result<String, SignError> {
        let container_hash = self.container_hash().await?;
        debug!(container_hash, len = payload.len(), "signing payload");

        match self.create_signature(payload).await {
            Ok(signature) => Ok(encode_signature(&signature)),
            Err(cause) => {
                error!(component = LOG_COMPONENT, "sign error {cause:#}");
                Err(SignError::signing(cause))
            }
        }
    }

    async fn create_signature(&self, payload: &str) -> Result<Vec<u8>> {
        let files = SigningFiles::create(self.config.temp_dir.as_deref(), payload).await?;
        let args = self.sign_args(&files);
        self.runner
            .run(&self.config.csptest, &args)
            .await
            .context("running sign command")?;
        files.read_signature().await
    }

    fn sign_args(&self, files: &SigningFiles) -> Vec<String> {
        vec![
            "-keys".to_string(),
            "-cont".to_string(),
            self.config.key_container.clone(),
            "-password".to_string(),
            self.config.certificate_pin.clone(),
            "-sign".to_string(),
            SIGN_ALGORITHM.to_string(),
            "-in".to_string(),
            files.unsigned_path().to_string_lossy().into_owned(),
            "-out".to_string(),
            files.signed_path().to_string_lossy().into_owned(),
            "-keytype".to_string(),
            KEY_TYPE.to_string(),
        ]
    }
}

impl PayloadSigner for CryptoProSigner {
    fn sign<'a>(&'a self, payload: &'a str) -> BoxFuture<'a, Result<String, SignError>> {
        Box::pin(self.sign_payload(payload))
    }

    fn key_id(&self) -> BoxFuture<'_, Result<String, SignError>> {
        Box::pin(async move { self.container_hash().await.map(str::to_string) })
    }

    fn algorithm(&self) -> &str {
        SIGN_ALGORITHM
    }
}
