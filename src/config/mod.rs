use ethers::types::U256;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub database_url: String,

    // Blockchain settings
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Address of the deployed roulette contract. Spin endpoints are
    /// disabled when empty.
    #[serde(default)]
    pub roulette_contract_address: String,

    /// Backend signer key authorizing spin transactions. Spin endpoints
    /// are disabled when empty. Never logged.
    #[serde(default)]
    pub signer_private_key: String,

    /// Per-spin fee charged by the contract, in gwei.
    #[serde(default = "default_spin_fee_gwei")]
    pub spin_fee_gwei: u64,
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_rpc_url() -> String {
    "https://arb1.arbitrum.io/rpc".to_string()
}

fn default_chain_id() -> u64 {
    42161 // Arbitrum One
}

fn default_spin_fee_gwei() -> u64 {
    1000 // 0.000001 ETH
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        Ok(app_config)
    }

    /// Check if the on-chain spin pipeline is configured
    pub fn has_spin_config(&self) -> bool {
        !self.roulette_contract_address.is_empty() && !self.signer_private_key.is_empty()
    }

    /// Per-spin fee in wei
    pub fn spin_fee_wei(&self) -> U256 {
        U256::from(self.spin_fee_gwei) * U256::exp10(9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fee_is_1000_gwei() {
        assert_eq!(default_spin_fee_gwei(), 1000);
        let config = AppConfig {
            environment: default_environment(),
            port: default_port(),
            database_url: String::new(),
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            roulette_contract_address: String::new(),
            signer_private_key: String::new(),
            spin_fee_gwei: default_spin_fee_gwei(),
        };
        assert_eq!(config.spin_fee_wei(), U256::from(1_000_000_000_000u64));
    }

    #[test]
    fn test_spin_config_gate() {
        let mut config = AppConfig {
            environment: default_environment(),
            port: default_port(),
            database_url: String::new(),
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            roulette_contract_address: String::new(),
            signer_private_key: String::new(),
            spin_fee_gwei: default_spin_fee_gwei(),
        };
        assert!(!config.has_spin_config());

        config.roulette_contract_address =
            "0x1111111111111111111111111111111111111111".to_string();
        assert!(!config.has_spin_config());

        config.signer_private_key =
            "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".to_string();
        assert!(config.has_spin_config());
    }
}
