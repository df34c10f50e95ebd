#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use gost_signer::signing::{CommandError, CommandRunner, GOST_2012_256_SIGNATURE_LEN};
use gost_signer::{CryptoProSigner, SignerConfig};

pub const CONTAINER_HASH: &str = "4c3a7f1e0b9d2c6a8e5f4d3c2b1a09f8e7d6c5b4";
pub const PIN: &str = "12345678";
/// Diagnostic text the fake provider prints on failure; must never reach callers.
pub const PROVIDER_DIAGNOSTIC: &str = "Error number 0x8009001d (-2146893795): wrong PIN";

pub fn listing() -> String {
    format!(
        "Certmgr 1.1 (c) \"Crypto-Pro\",  2007-2020.\n\
         1-------\n\
         Subject             : CN=Service\n\
         SHA1 Hash           : {CONTAINER_HASH}\n\
         [ErrorCode: 0x00000000]\n"
    )
}

/// Deterministic stand-in for a GOST signature over `payload`.
pub fn fake_signature(payload: &str) -> Vec<u8> {
    let mut signature = vec![0u8; GOST_2012_256_SIGNATURE_LEN];
    for (i, byte) in payload.bytes().enumerate() {
        signature[i % GOST_2012_256_SIGNATURE_LEN] ^= byte;
    }
    signature[GOST_2012_256_SIGNATURE_LEN - 1] ^= 0xa5;
    signature
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum SignBehavior {
    /// Write `fake_signature(payload)` to `-out`.
    Succeed,
    /// Exit nonzero with `PROVIDER_DIAGNOSTIC`.
    Fail,
    /// Exit zero without writing anything.
    NoOutput,
    /// Exit zero after writing an empty file.
    EmptyOutput,
}

/// In-memory `certmgr` / `csptest`.
pub struct FakeCsp {
    pub listing: Option<String>,
    pub sign: SignBehavior,
    pub list_calls: AtomicUsize,
    pub sign_calls: AtomicUsize,
    pub sign_args: Mutex<Vec<Vec<String>>>,
}

impl FakeCsp {
    pub fn new(listing: Option<String>, sign: SignBehavior) -> Arc<Self> {
        Arc::new(Self {
            listing,
            sign,
            list_calls: AtomicUsize::new(0),
            sign_calls: AtomicUsize::new(0),
            sign_args: Mutex::new(Vec::new()),
        })
    }

    pub fn working() -> Arc<Self> {
        Self::new(Some(listing()), SignBehavior::Succeed)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    fn arg_after<'a>(args: &'a [String], flag: &str) -> &'a str {
        let i = args.iter().position(|a| a == flag).expect("flag present");
        &args[i + 1]
    }

    async fn run_sign(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        self.sign_args.lock().unwrap().push(args.to_vec());

        let input = PathBuf::from(Self::arg_after(args, "-in"));
        let output = PathBuf::from(Self::arg_after(args, "-out"));
        let payload = tokio::fs::read_to_string(&input).await.expect("input file exists");
        tokio::task::yield_now().await;

        match self.sign {
            SignBehavior::Succeed => {
                tokio::fs::write(&output, fake_signature(&payload)).await.unwrap();
                Ok("[ErrorCode: 0x00000000]\n".to_string())
            }
            SignBehavior::Fail => Err(CommandError::Failed {
                program: program.to_string(),
                code: 1,
                output: PROVIDER_DIAGNOSTIC.to_string(),
            }),
            SignBehavior::NoOutput => Ok(String::new()),
            SignBehavior::EmptyOutput => {
                tokio::fs::write(&output, b"").await.unwrap();
                Ok(String::new())
            }
        }
    }
}

impl CommandRunner for FakeCsp {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> BoxFuture<'a, Result<String, CommandError>> {
        Box::pin(async move {
            match program {
                "certmgr" => {
                    self.list_calls.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    self.listing.clone().ok_or_else(|| CommandError::Failed {
                        program: program.to_string(),
                        code: 1,
                        output: PROVIDER_DIAGNOSTIC.to_string(),
                    })
                }
                "csptest" => self.run_sign(program, args).await,
                other => Err(CommandError::Spawn {
                    program: other.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                }),
            }
        })
    }
}

pub fn signer(csp: &Arc<FakeCsp>, temp_dir: &Path) -> CryptoProSigner {
    let mut config = SignerConfig::new(PIN);
    config.temp_dir = Some(temp_dir.to_path_buf());
    CryptoProSigner::with_runner(config, csp.clone())
}

pub fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

/// Shell stand-ins for the CryptoPro utilities, run through the real process runner.
#[cfg(unix)]
pub mod scripts {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use gost_signer::SignerConfig;

    use super::{CONTAINER_HASH, PIN, PROVIDER_DIAGNOSTIC};

    /// Parses `-in` / `-out` like csptest and fails unless the input exists.
    const READ_ARGS: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    -in) input="$2"; shift ;;
    -out) output="$2"; shift ;;
  esac
  shift
done
[ -f "$input" ] || exit 2
"#;

    pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    pub fn certmgr(dir: &Path) -> PathBuf {
        write_script(dir, "certmgr", &format!("echo 'SHA1 Hash           : {CONTAINER_HASH}'"))
    }

    /// Writes 64 ASCII `0` bytes as the signature.
    pub fn csptest_ok(dir: &Path) -> PathBuf {
        write_script(dir, "csptest", &format!("{READ_ARGS}printf '%064d' 0 > \"$output\""))
    }

    pub fn csptest_failing(dir: &Path) -> PathBuf {
        write_script(dir, "csptest", &format!("echo '{PROVIDER_DIAGNOSTIC}'\nexit 1"))
    }

    /// Writes the signature only after `delay` seconds.
    pub fn csptest_slow(dir: &Path, delay: &str) -> PathBuf {
        write_script(
            dir,
            "csptest",
            &format!("{READ_ARGS}sleep {delay}\nprintf '%064d' 0 > \"$output\""),
        )
    }

    pub fn config(certmgr: &Path, csptest: &Path, temp_dir: &Path) -> SignerConfig {
        let mut config = SignerConfig::new(PIN);
        config.certmgr = certmgr.to_string_lossy().into_owned();
        config.csptest = csptest.to_string_lossy().into_owned();
        config.temp_dir = Some(temp_dir.to_path_buf());
        config
    }
}
