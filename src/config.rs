//! Client configuration: network profiles and operator options.

use std::{env, env::VarError, fs, path::Path, str::FromStr};

use alloy::primitives::{Address, address};
use serde::Deserialize;

use crate::error::MegaphoneError;

const MEGAPHONE_ADDRESS: Address = address!("0x0327683f5a1af9b23093d7d62d628e4140eeeb07");
const USDC_ADDRESS: Address = address!("0x833589fCD6eDb6E08f4c7Cee35AB0c1bCef3B4c7");
const BASE_CHAIN_ID: u64 = 8453;
const BACKEND_URL: &str = "https://megaphone-backend-production.up.railway.app";

const MEGAPHONE_SEPOLIA_ADDRESS: Address = address!("0x5f1c0b58110b03fb8f9d2d0c6e2e8b77a48dbf5c");
const USDC_SEPOLIA_ADDRESS: Address = address!("0x036cbd53842c5426634e7929541ec2318f3dcf7e");
const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;
const BACKEND_STAGING_URL: &str = "https://megaphone-backend-staging.up.railway.app";

/// Deployment profile fixing the chain id, contract addresses and the
/// backend endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    /// Base mainnet.
    #[default]
    Mainnet,
    /// Base Sepolia.
    Testnet,
}

impl Network {
    pub fn chain_id(self) -> u64 {
        match self {
            Self::Mainnet => BASE_CHAIN_ID,
            Self::Testnet => BASE_SEPOLIA_CHAIN_ID,
        }
    }

    pub fn megaphone_address(self) -> Address {
        match self {
            Self::Mainnet => MEGAPHONE_ADDRESS,
            Self::Testnet => MEGAPHONE_SEPOLIA_ADDRESS,
        }
    }

    pub fn usdc_address(self) -> Address {
        match self {
            Self::Mainnet => USDC_ADDRESS,
            Self::Testnet => USDC_SEPOLIA_ADDRESS,
        }
    }

    pub fn backend_url(self) -> &'static str {
        match self {
            Self::Mainnet => BACKEND_URL,
            Self::Testnet => BACKEND_STAGING_URL,
        }
    }
}

impl FromStr for Network {
    type Err = MegaphoneError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "mainnet" | "base" => Ok(Self::Mainnet),
            "testnet" | "sepolia" | "base-sepolia" => Ok(Self::Testnet),
            other => Err(MegaphoneError::config(format!(
                "unknown network {other:?} (expected \"mainnet\" or \"testnet\")"
            ))),
        }
    }
}

/// Operator-side options for a [`crate::Megaphone`] client.
#[derive(Debug, Clone)]
pub struct MegaphoneOptions {
    /// Backend API key; required for rev-share signatures and
    /// incentivized interactions.
    pub api_key: Option<String>,
    pub network: Network,
    /// Operator fid credited as referrer when purchases are reported.
    pub operator_fid: u64,
}

impl MegaphoneOptions {
    pub fn new(operator_fid: u64) -> Self {
        Self {
            api_key: None,
            network: Network::Mainnet,
            operator_fid,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Reads options from the environment, loading a `.env` file when one
    /// is present. `MEGAPHONE_OPERATOR_FID` is required;
    /// `MEGAPHONE_API_KEY` and `MEGAPHONE_NETWORK` are optional.
    pub fn from_env() -> Result<Self, MegaphoneError> {
        dotenvy::dotenv().ok();
        Self::from_env_only()
    }

    /// Like [`Self::from_env`] but without touching `.env` files.
    pub fn from_env_only() -> Result<Self, MegaphoneError> {
        let operator_fid = parse_env("MEGAPHONE_OPERATOR_FID", "decimal Farcaster id", |value| {
            value.parse::<u64>().map_err(|_| {
                MegaphoneError::config(format!(
                    "MEGAPHONE_OPERATOR_FID is not a valid fid: {value}"
                ))
            })
        })?;

        let api_key = optional_env("MEGAPHONE_API_KEY", |value| Ok(value.to_owned()))?;

        let network = optional_env("MEGAPHONE_NETWORK", Network::from_str)?.unwrap_or_default();

        Ok(Self {
            api_key,
            network,
            operator_fid,
        })
    }

    /// Loads an operator profile from a TOML file:
    ///
    /// ```toml
    /// [operator]
    /// fid = 9152
    /// network = "testnet"
    /// api_key = "..."
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MegaphoneError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| {
            MegaphoneError::config(format!(
                "failed to read options file at {}: {err}",
                path.display()
            ))
        })?;
        let file: OptionsFile = toml::from_str(&contents).map_err(|err| {
            MegaphoneError::config(format!(
                "failed to parse options file (expected TOML format): {err}"
            ))
        })?;

        file.operator.into_options()
    }

    /// The configured API key, or a configuration error for operations
    /// that cannot run without one.
    pub fn require_api_key(&self) -> Result<&str, MegaphoneError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| MegaphoneError::config("an API key is required for this operation"))
    }
}

#[derive(Debug, Deserialize)]
struct OptionsFile {
    operator: OperatorTable,
}

#[derive(Debug, Deserialize)]
struct OperatorTable {
    fid: u64,
    network: Option<String>,
    api_key: Option<String>,
}

impl OperatorTable {
    fn into_options(self) -> Result<MegaphoneOptions, MegaphoneError> {
        let network = match self.network {
            Some(raw) => raw.trim().parse()?,
            None => Network::default(),
        };

        Ok(MegaphoneOptions {
            api_key: self.api_key,
            network,
            operator_fid: self.fid,
        })
    }
}

fn parse_env<T, F>(key: &str, desc: &str, parser: F) -> Result<T, MegaphoneError>
where
    F: FnOnce(&str) -> Result<T, MegaphoneError>,
{
    let raw =
        env::var(key).map_err(|_| MegaphoneError::config(format!("missing {key} ({desc})")))?;
    let value = raw.trim();
    if value.is_empty() {
        return Err(MegaphoneError::config(format!(
            "{key} cannot be empty ({desc})"
        )));
    }

    parser(value)
}

fn optional_env<T, F>(key: &str, parser: F) -> Result<Option<T>, MegaphoneError>
where
    F: FnOnce(&str) -> Result<T, MegaphoneError>,
{
    match env::var(key) {
        Ok(raw) => {
            let value = raw.trim();
            if value.is_empty() {
                Ok(None)
            } else {
                parser(value).map(Some)
            }
        }
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(MegaphoneError::config(format!(
            "{key} is not valid unicode"
        ))),
    }
}
