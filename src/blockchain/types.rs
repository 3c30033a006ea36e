// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain descriptors and constants.

use serde::{Deserialize, Serialize};

/// Native currency descriptor carried by an `wallet_addEthereumChain` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Network configuration for the whitelist deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
    /// Native currency of the chain
    pub native_currency: NativeCurrency,
}

const ETH: NativeCurrency = NativeCurrency {
    name: "ETH",
    symbol: "ETH",
    decimals: 18,
};

/// Arbitrum One configuration (default network of the protected data service).
pub const ARBITRUM_ONE: NetworkConfig = NetworkConfig {
    name: "Arbitrum One",
    chain_id: 42161,
    rpc_url: "https://arb1.arbitrum.io/rpc",
    explorer_url: "https://arbiscan.io/",
    native_currency: ETH,
};

/// Arbitrum Sepolia testnet configuration.
pub const ARBITRUM_SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Arbitrum Sepolia",
    chain_id: 421614,
    rpc_url: "https://sepolia-rollup.arbitrum.io/rpc",
    explorer_url: "https://sepolia.arbiscan.io/",
    native_currency: ETH,
};

/// Network identifier for Arbitrum One.
pub const NETWORK_ARBITRUM_ONE: &str = "arbitrum-one";

/// Network identifier for Arbitrum Sepolia.
pub const NETWORK_ARBITRUM_SEPOLIA: &str = "arbitrum-sepolia";

impl NetworkConfig {
    /// Chain id as the `0x`-prefixed lowercase hex string wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format_chain_id(self.chain_id)
    }

    /// Full descriptor for an `wallet_addEthereumChain` request.
    pub fn add_chain_params(&self) -> AddChainParams {
        AddChainParams {
            chain_id: self.chain_id_hex(),
            chain_name: self.name.to_string(),
            native_currency: NativeCurrencyParams {
                name: self.native_currency.name.to_string(),
                symbol: self.native_currency.symbol.to_string(),
                decimals: self.native_currency.decimals,
            },
            rpc_urls: vec![self.rpc_url.to_string()],
            block_explorer_urls: vec![self.explorer_url.to_string()],
        }
    }
}

/// Resolve a network by its identifier (`arbitrum-one`, `arbitrum-sepolia`).
///
/// `None` selects the testnet.
pub fn network_by_name(raw: Option<&str>) -> Result<NetworkConfig, String> {
    let value = raw
        .unwrap_or(NETWORK_ARBITRUM_SEPOLIA)
        .trim()
        .to_ascii_lowercase();
    match value.as_str() {
        NETWORK_ARBITRUM_SEPOLIA => Ok(ARBITRUM_SEPOLIA),
        NETWORK_ARBITRUM_ONE => Ok(ARBITRUM_ONE),
        _ => Err(format!(
            "Unsupported network `{value}` (expected `{NETWORK_ARBITRUM_SEPOLIA}` or `{NETWORK_ARBITRUM_ONE}`)"
        )),
    }
}

/// Encode a chain id the way EIP-1193 wallets report it (`0x66eee`).
pub fn format_chain_id(chain_id: u64) -> String {
    format!("{chain_id:#x}")
}

/// Parse a wallet-reported chain id. Accepts hex (`0xa4b1`) and decimal.
pub fn parse_chain_id(raw: &str) -> Result<u64, String> {
    let value = raw.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid chain id `{value}`: {e}"))
}

/// Parameters of `wallet_addEthereumChain` (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrencyParams,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrencyParams {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids_render_as_wallet_hex() {
        assert_eq!(ARBITRUM_SEPOLIA.chain_id_hex(), "0x66eee");
        assert_eq!(ARBITRUM_ONE.chain_id_hex(), "0xa4b1");
    }

    #[test]
    fn parse_chain_id_accepts_hex_and_decimal() {
        assert_eq!(parse_chain_id("0x66eee"), Ok(421614));
        assert_eq!(parse_chain_id("0xA4B1"), Ok(42161));
        assert_eq!(parse_chain_id("42161"), Ok(42161));
        assert!(parse_chain_id("0xzz").is_err());
        assert!(parse_chain_id("").is_err());
    }

    #[test]
    fn network_by_name_defaults_to_testnet() {
        assert_eq!(network_by_name(None), Ok(ARBITRUM_SEPOLIA));
        assert_eq!(network_by_name(Some(" Arbitrum-One ")), Ok(ARBITRUM_ONE));
        assert!(network_by_name(Some("fuji")).is_err());
    }

    #[test]
    fn add_chain_params_carry_full_descriptor() {
        let params = ARBITRUM_SEPOLIA.add_chain_params();
        let json = serde_json::to_value(&params).expect("serialize");
        assert_eq!(json["chainId"], "0x66eee");
        assert_eq!(json["chainName"], "Arbitrum Sepolia");
        assert_eq!(json["nativeCurrency"]["symbol"], "ETH");
        assert_eq!(json["nativeCurrency"]["decimals"], 18);
        assert_eq!(json["rpcUrls"][0], "https://sepolia-rollup.arbitrum.io/rpc");
        assert_eq!(json["blockExplorerUrls"][0], "https://sepolia.arbiscan.io/");
    }
}
