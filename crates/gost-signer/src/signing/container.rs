use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use tokio::sync::OnceCell;
use tracing::debug;

use super::command::CommandRunner;

const LIST_FLAG: &str = "-list";

// `R` makes `$` stop before `\r\n` too; certmgr output is CRLF on some builds.
static SHA1_HASH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mR)SHA1 Hash\s*: ([0-9A-Za-z_]+)$").expect("valid SHA1 hash pattern")
});

/// Extracts the first `SHA1 Hash : <hex>` value from `certmgr -list` output.
pub fn parse_container_hash(listing: &str) -> Option<&str> {
    SHA1_HASH_LINE
        .captures(listing)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Lazily resolved container identifier.
///
/// The first successful lookup is kept for the lifetime of the value and
/// never refreshed. Failed lookups are not cached, so the next call runs
/// the listing again. Concurrent first calls share one listing run.
#[derive(Debug, Default)]
pub struct ContainerHash {
    cell: OnceCell<String>,
}

impl ContainerHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch(&self, runner: &dyn CommandRunner, certmgr: &str) -> Result<&str> {
        let hash = self
            .cell
            .get_or_try_init(|| async move {
                let args = [LIST_FLAG.to_string()];
                let listing = runner
                    .run(certmgr, &args)
                    .await
                    .context("listing certificates")?;
                let hash = parse_container_hash(&listing)
                    .ok_or_else(|| anyhow!("no `SHA1 Hash` entry in {certmgr} {LIST_FLAG} output"))?;
                debug!(container_hash = hash, "resolved container hash");
                Ok::<_, anyhow::Error>(hash.to_string())
            })
            .await?;
        Ok(hash)
    }
}
