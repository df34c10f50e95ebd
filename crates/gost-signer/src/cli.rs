use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{DEFAULT_CERTMGR, DEFAULT_CSPTEST, DEFAULT_KEY_CONTAINER, SignerConfig};
use crate::server::run;
use crate::signing::{CryptoProSigner, PayloadSigner};

#[derive(Parser, Debug)]
#[command(name = "gost-signer")]
#[command(about = "GOST R 34.10-2012 signing service backed by CryptoPro CSP")]
pub struct Args {
    #[command(flatten)]
    pub signer: SignerArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Args, Debug)]
pub struct SignerArgs {
    /// PIN of the key container
    #[arg(long, env = "CERTIFICATE_PIN", hide_env_values = true, global = true)]
    pub certificate_pin: Option<String>,

    /// Path to the certmgr utility
    #[arg(long, env = "CERTMGR_PATH", default_value = DEFAULT_CERTMGR, global = true)]
    pub certmgr: String,

    /// Path to the csptest utility
    #[arg(long, env = "CSPTEST_PATH", default_value = DEFAULT_CSPTEST, global = true)]
    pub csptest: String,

    /// Key container passed to `csptest -cont`
    #[arg(long, env = "KEY_CONTAINER", default_value = DEFAULT_KEY_CONTAINER, global = true)]
    pub key_container: String,

    /// Directory for temporary payload and signature files
    #[arg(long, env = "SIGNER_TEMP_DIR", global = true)]
    pub temp_dir: Option<PathBuf>,
}

impl SignerArgs {
    /// `None` when no certificate PIN was supplied.
    pub fn into_config(self) -> Option<SignerConfig> {
        let certificate_pin = self.certificate_pin?;
        Some(SignerConfig {
            certmgr: self.certmgr,
            csptest: self.csptest,
            key_container: self.key_container,
            certificate_pin,
            temp_dir: self.temp_dir,
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP signing service (default)
    Serve(ServeCommand),
    /// Sign a single payload and print the signature
    Sign(SignCommand),
}

#[derive(clap::Args, Debug)]
pub struct ServeCommand {
    #[arg(long, env = "SIGNER_HOST", default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, env = "SIGNER_PORT", default_value = "3000")]
    pub port: u16,
}

impl Default for ServeCommand {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct SignCommand {
    /// Payload to sign
    pub payload: String,
}

impl Args {
    pub async fn run(self) -> Result<()> {
        init_tracing();

        let config = self.signer.into_config();
        let command = self
            .command
            .unwrap_or(Command::Serve(ServeCommand::default()));

        match command {
            Command::Serve(cmd) => cmd.run(config).await,
            Command::Sign(cmd) => cmd.run(config).await,
        }
    }
}

impl ServeCommand {
    pub async fn run(self, config: Option<SignerConfig>) -> Result<()> {
        let signer = config.map(|config| {
            info!(?config, "signing enabled");
            let signer: Arc<dyn PayloadSigner> = Arc::new(CryptoProSigner::new(config));
            signer
        });
        if signer.is_none() {
            warn!("no certificate PIN configured, signing endpoints will answer 503");
        }

        run(self.host, self.port, signer).await
    }
}

impl SignCommand {
    pub async fn run(self, config: Option<SignerConfig>) -> Result<()> {
        let Some(config) = config else {
            bail!("certificate PIN is required (set --certificate-pin or CERTIFICATE_PIN)");
        };

        let signature = CryptoProSigner::new(config).sign_payload(&self.payload).await?;
        println!("{signature}");
        Ok(())
    }
}

/// Logs go to stderr so `sign` output stays clean on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
