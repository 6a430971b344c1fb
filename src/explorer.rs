//! Explorer links for transactions and accounts

use crate::endpoints::Network;
use solana_sdk::{pubkey::Pubkey, signature::Signature};

const EXPLORER_BASE: &str = "https://explorer.solana.com";

fn cluster_query(network: Network) -> &'static str {
    match network {
        Network::MainnetBeta => "",
        Network::Testnet => "?cluster=testnet",
        Network::Devnet => "?cluster=devnet",
        Network::Localnet => "?cluster=custom&customUrl=http%3A%2F%2F127.0.0.1%3A8899",
    }
}

/// Explorer page for a transaction
pub fn transaction_url(signature: &Signature, network: Network) -> String {
    format!("{}/tx/{}{}", EXPLORER_BASE, signature, cluster_query(network))
}

/// Explorer page for an account
pub fn account_url(account: &Pubkey, network: Network) -> String {
    format!("{}/address/{}{}", EXPLORER_BASE, account, cluster_query(network))
}
