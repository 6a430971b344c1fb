//! Static endpoint descriptors for the supported Solana clusters
//!
//! One descriptor per network. The default network is picked from the
//! `DEX_NETWORK` environment variable, falling back to mainnet-beta.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use url::Url;

/// Environment variable selecting the default network
pub const NETWORK_ENV: &str = "DEX_NETWORK";

/// Supported network identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    MainnetBeta,
    Testnet,
    Devnet,
    Localnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "mainnet-beta",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Localnet => "localnet",
        }
    }

    /// Descriptor for this network
    pub fn descriptor(&self) -> &'static EndpointDescriptor {
        // ENDPOINTS holds exactly one entry per variant
        ENDPOINTS
            .iter()
            .find(|e| e.name == *self)
            .unwrap_or(&ENDPOINTS[0])
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a network name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown network: {0}")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(Network::MainnetBeta),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "localnet" | "localhost" => Ok(Network::Localnet),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

/// Immutable description of one cluster endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub name: Network,
    pub url: &'static str,
    pub chain_id: u32,
}

/// All supported endpoints, first entry is the fallback network.
///
/// Local validators report the devnet chain id.
pub const ENDPOINTS: [EndpointDescriptor; 4] = [
    EndpointDescriptor {
        name: Network::MainnetBeta,
        url: "https://api.mainnet-beta.solana.com",
        chain_id: 101,
    },
    EndpointDescriptor {
        name: Network::Testnet,
        url: "https://api.testnet.solana.com",
        chain_id: 102,
    },
    EndpointDescriptor {
        name: Network::Devnet,
        url: "https://api.devnet.solana.com",
        chain_id: 103,
    },
    EndpointDescriptor {
        name: Network::Localnet,
        url: "http://127.0.0.1:8899",
        chain_id: 103,
    },
];

/// Resolve the network for an endpoint URL.
///
/// Custom URLs that match no descriptor resolve to the first descriptor.
pub fn network_for_endpoint(endpoint: &str) -> Network {
    let wanted = endpoint.trim_end_matches('/');
    ENDPOINTS
        .iter()
        .find(|e| e.url == wanted)
        .map(|e| e.name)
        .unwrap_or(ENDPOINTS[0].name)
}

/// Network named by `DEX_NETWORK`, if set and recognised
pub fn network_from_env() -> Option<Network> {
    let raw = std::env::var(NETWORK_ENV).ok()?;
    match raw.parse::<Network>() {
        Ok(network) => Some(network),
        Err(e) => {
            warn!(variable = NETWORK_ENV, value = %raw, "{}, ignoring", e);
            None
        }
    }
}

/// Default network: environment first, then mainnet-beta
pub fn default_network() -> Network {
    network_from_env().unwrap_or(ENDPOINTS[0].name)
}

/// Check that an endpoint is an absolute http(s) URL
pub fn is_valid_endpoint(endpoint: &str) -> bool {
    match Url::parse(endpoint) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

/// Derive the websocket URL used for subscriptions from an RPC endpoint.
///
/// `http` maps to `ws`, `https` to `wss`; an explicit port is incremented
/// by one, matching the validator's default pubsub port layout.
pub fn websocket_url(endpoint: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(endpoint)?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    let explicit_port = url.port();

    // http(s) -> ws(s) is always a permitted scheme change
    let _ = url.set_scheme(scheme);
    if let Some(port) = explicit_port {
        let _ = url.set_port(Some(port.saturating_add(1)));
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_network_has_one_descriptor() {
        for network in [
            Network::MainnetBeta,
            Network::Testnet,
            Network::Devnet,
            Network::Localnet,
        ] {
            let count = ENDPOINTS.iter().filter(|e| e.name == network).count();
            assert_eq!(count, 1, "{} should have exactly one descriptor", network);
            assert_eq!(network.descriptor().name, network);
        }
    }

    #[test]
    fn test_chain_ids() {
        assert_eq!(Network::MainnetBeta.descriptor().chain_id, 101);
        assert_eq!(Network::Testnet.descriptor().chain_id, 102);
        assert_eq!(Network::Devnet.descriptor().chain_id, 103);
        assert_eq!(Network::Localnet.descriptor().chain_id, 103);
    }

    #[test]
    fn test_network_parse_and_display() {
        assert_eq!("devnet".parse::<Network>().unwrap(), Network::Devnet);
        assert_eq!("Mainnet-Beta".parse::<Network>().unwrap(), Network::MainnetBeta);
        assert_eq!("localhost".parse::<Network>().unwrap(), Network::Localnet);
        assert!("moonnet".parse::<Network>().is_err());
        assert_eq!(Network::Testnet.to_string(), "testnet");
    }

    #[test]
    fn test_network_for_endpoint() {
        assert_eq!(
            network_for_endpoint("https://api.devnet.solana.com"),
            Network::Devnet
        );
        assert_eq!(
            network_for_endpoint("https://api.devnet.solana.com/"),
            Network::Devnet
        );
        assert_eq!(
            network_for_endpoint("https://rpc.example.org"),
            Network::MainnetBeta
        );
    }

    #[test]
    fn test_websocket_url() {
        assert_eq!(
            websocket_url("https://api.devnet.solana.com").unwrap(),
            "wss://api.devnet.solana.com/"
        );
        assert_eq!(
            websocket_url("http://127.0.0.1:8899").unwrap(),
            "ws://127.0.0.1:8900/"
        );
        assert!(websocket_url("not a url").is_err());
    }

    #[test]
    fn test_is_valid_endpoint() {
        assert!(is_valid_endpoint("https://api.mainnet-beta.solana.com"));
        assert!(is_valid_endpoint("http://127.0.0.1:8899"));
        assert!(!is_valid_endpoint("ftp://example.com"));
        assert!(!is_valid_endpoint("devnet"));
    }

    #[test]
    fn test_network_serde_names() {
        let json = serde_json::to_string(&Network::MainnetBeta).unwrap();
        assert_eq!(json, "\"mainnet-beta\"");
        let parsed: Network = serde_json::from_str("\"localnet\"").unwrap();
        assert_eq!(parsed, Network::Localnet);
    }
}
