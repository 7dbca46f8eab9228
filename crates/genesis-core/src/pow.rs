//! Proof-of-work hash algorithms applied to the serialized header.
//!
//! Every algorithm yields a primary and a secondary digest in natural byte
//! order. Single-hash algorithms report the same digest twice; the dual
//! memory-hard algorithm requires two unrelated functions to clear the target.

use std::path::PathBuf;
use std::process::Command;

use argon2::{Argon2, Params as Argon2Params, Version};
use tracing::debug;

use crate::block::HEADER_SIZE;
use crate::config::Algorithm;
use crate::difficulty::hash_meets_target;
use crate::error::{Error, Result};
use crate::hash::{double_sha256, double_sha512};

/// scrypt cost: N = 2^10.
const SCRYPT_LOG_N: u8 = 10;
const SCRYPT_R: u32 = 1;
const SCRYPT_P: u32 = 1;

/// Argon2id stages of the dual proof-of-work, memory in KiB.
const ARGON2_T_COST: u32 = 2;
const ARGON2_P_COST: u32 = 2;
const ARGON2_STAGE1_M_COST: u32 = 4096;
const ARGON2_STAGE2_M_COST: u32 = 32768;

const DIGEST_LEN: usize = 32;

/// The digests a header is judged by, in natural byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowDigests {
    pub primary: [u8; 32],
    pub secondary: [u8; 32],
}

impl PowDigests {
    /// Digests of a single-hash algorithm.
    pub fn single(digest: [u8; 32]) -> Self {
        PowDigests {
            primary: digest,
            secondary: digest,
        }
    }

    /// True only when both digests are below the target.
    pub fn meets_target(&self, target: &[u8; 32]) -> bool {
        hash_meets_target(&self.primary, target) && hash_meets_target(&self.secondary, target)
    }
}

/// Maps a serialized header to the digests compared against the target.
pub trait PowHasher {
    fn pow_digests(&self, header: &[u8; HEADER_SIZE]) -> Result<PowDigests>;
}

impl<H: PowHasher + ?Sized> PowHasher for &H {
    fn pow_digests(&self, header: &[u8; HEADER_SIZE]) -> Result<PowDigests> {
        (**self).pow_digests(header)
    }
}

/// The yespower function of the dual proof-of-work.
///
/// Implementations return the digest in natural byte order.
pub trait YespowerHash {
    fn pow_hash(&self, header: &[u8]) -> Result<[u8; 32]>;
}

/// Yespower computed by an external program.
///
/// The program receives the header as lowercase hex in its last argument and
/// must print the 32-byte digest as 64 hex characters on stdout.
#[derive(Debug, Clone)]
pub struct ExternalYespower {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalYespower {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        ExternalYespower {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace into program and arguments.
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::config("yespower command is empty"))?;

        Ok(Self::new(program, parts.map(str::to_string).collect()))
    }

    fn parse_output(stdout: &[u8]) -> Result<[u8; 32]> {
        let text = String::from_utf8_lossy(stdout);
        let text = text.trim();

        let mut digest = [0u8; 32];
        hex::decode_to_slice(text, &mut digest).map_err(|e| {
            Error::yespower(format!(
                "expected {} hex characters on stdout, got '{}': {}",
                DIGEST_LEN * 2,
                text,
                e
            ))
        })?;

        Ok(digest)
    }
}

impl YespowerHash for ExternalYespower {
    fn pow_hash(&self, header: &[u8]) -> Result<[u8; 32]> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(hex::encode(header))
            .output()
            .map_err(|e| {
                Error::yespower(format!(
                    "failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(Error::yespower(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Self::parse_output(&output.stdout)
    }
}

/// The supported proof-of-work algorithms, fixed when the search is set up.
pub enum HashAlgorithm {
    /// SHA256(SHA256(header)).
    Sha256d,
    /// scrypt(header, salt = header, N=1024, r=1, p=1, 32 bytes).
    Scrypt { params: scrypt::Params },
    /// Argon2id chain plus yespower; both must clear the target.
    DualMemoryHard {
        stage1: Argon2<'static>,
        stage2: Argon2<'static>,
        yespower: Box<dyn YespowerHash>,
    },
}

impl HashAlgorithm {
    pub fn scrypt() -> Result<Self> {
        let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, DIGEST_LEN)
            .map_err(|e| Error::hash(format!("invalid scrypt parameters: {}", e)))?;

        Ok(HashAlgorithm::Scrypt { params })
    }

    pub fn dual_memory_hard(yespower: Box<dyn YespowerHash>) -> Result<Self> {
        Ok(HashAlgorithm::DualMemoryHard {
            stage1: argon2id(ARGON2_STAGE1_M_COST)?,
            stage2: argon2id(ARGON2_STAGE2_M_COST)?,
            yespower,
        })
    }

    /// Set up `algorithm`.
    ///
    /// `dpowcoin` needs a yespower backend; a missing backend, or one that
    /// fails a probe hash, is reported as a missing dependency.
    pub fn for_algorithm(
        algorithm: Algorithm,
        yespower: Option<Box<dyn YespowerHash>>,
    ) -> Result<Self> {
        match algorithm {
            Algorithm::Sha256 => Ok(HashAlgorithm::Sha256d),
            Algorithm::Scrypt => Self::scrypt(),
            Algorithm::Dpowcoin => {
                let yespower = yespower.ok_or_else(|| {
                    Error::dependency("dpowcoin requires a yespower backend (--yespower-cmd)")
                })?;

                yespower.pow_hash(&[0u8; HEADER_SIZE]).map_err(|e| {
                    Error::dependency(format!("yespower backend is not usable: {}", e))
                })?;
                debug!("yespower backend probe succeeded");

                Self::dual_memory_hard(yespower)
            }
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            HashAlgorithm::Sha256d => Algorithm::Sha256,
            HashAlgorithm::Scrypt { .. } => Algorithm::Scrypt,
            HashAlgorithm::DualMemoryHard { .. } => Algorithm::Dpowcoin,
        }
    }
}

impl PowHasher for HashAlgorithm {
    fn pow_digests(&self, header: &[u8; HEADER_SIZE]) -> Result<PowDigests> {
        match self {
            HashAlgorithm::Sha256d => Ok(PowDigests::single(double_sha256(header))),
            HashAlgorithm::Scrypt { params } => {
                let mut digest = [0u8; 32];
                scrypt::scrypt(header, header, params, &mut digest)
                    .map_err(|e| Error::hash(format!("scrypt failed: {}", e)))?;
                Ok(PowDigests::single(digest))
            }
            HashAlgorithm::DualMemoryHard {
                stage1,
                stage2,
                yespower,
            } => {
                let salt = double_sha512(header);

                let mut stage1_digest = [0u8; 32];
                stage1
                    .hash_password_into(header, &salt, &mut stage1_digest)
                    .map_err(|e| Error::hash(format!("argon2id stage 1 failed: {}", e)))?;

                let mut primary = [0u8; 32];
                stage2
                    .hash_password_into(header, &stage1_digest, &mut primary)
                    .map_err(|e| Error::hash(format!("argon2id stage 2 failed: {}", e)))?;

                let secondary = yespower.pow_hash(header)?;

                Ok(PowDigests { primary, secondary })
            }
        }
    }
}

fn argon2id(m_cost: u32) -> Result<Argon2<'static>> {
    let params = Argon2Params::new(m_cost, ARGON2_T_COST, ARGON2_P_COST, Some(DIGEST_LEN))
        .map_err(|e| Error::hash(format!("invalid argon2 parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}
