//! Wallet signing capability
//!
//! A wallet exposes an optional public key (absent while disconnected) and
//! signs whole transactions.

use anyhow::Context;
use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Wallet not connected")]
    NotConnected,

    /// Returned by external wallet implementations when the user declines
    #[error("Wallet rejected the signing request: {0}")]
    Rejected(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Async signer provided by the user's wallet
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Public key of the connected account, `None` while disconnected
    fn public_key(&self) -> Option<Pubkey>;

    /// Add the wallet's signature to `transaction`
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, WalletError>;
}

/// Wallet backed by a local keypair
#[derive(Clone)]
pub struct KeypairWallet {
    keypair: Arc<Keypair>,
}

impl KeypairWallet {
    /// Load a wallet from a keypair file (JSON byte array or 64 raw bytes)
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let keypair_bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read keypair file: {}", path.display()))?;

        let bytes = if keypair_bytes.len() == 64 {
            keypair_bytes
        } else {
            serde_json::from_slice::<Vec<u8>>(&keypair_bytes)
                .context("Failed to parse keypair JSON")?
        };

        if bytes.len() != 64 {
            anyhow::bail!("Invalid keypair length: expected 64 bytes, got {}", bytes.len());
        }
        if bytes.iter().all(|&b| b == 0) {
            anyhow::bail!("Invalid keypair: all-zero key rejected");
        }

        let keypair = Keypair::try_from(bytes.as_slice()).context("Invalid keypair bytes")?;
        Ok(Self::from_keypair(keypair))
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

impl std::fmt::Debug for KeypairWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairWallet")
            .field("pubkey", &self.keypair.pubkey())
            .finish()
    }
}

#[async_trait]
impl WalletSigner for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn sign_transaction(
        &self,
        mut transaction: Transaction,
    ) -> Result<Transaction, WalletError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[self.keypair.as_ref()], blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(transaction)
    }
}

/// Wallet with no connected account
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedWallet;

#[async_trait]
impl WalletSigner for DisconnectedWallet {
    fn public_key(&self) -> Option<Pubkey> {
        None
    }

    async fn sign_transaction(&self, _transaction: Transaction) -> Result<Transaction, WalletError> {
        Err(WalletError::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{hash::Hash, message::Message, system_instruction};
    use std::io::Write;

    #[test]
    fn test_from_file_json_format() {
        let keypair = Keypair::new();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let wallet = KeypairWallet::from_file(file.path()).unwrap();
        assert_eq!(wallet.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_from_file_rejects_zero_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        assert!(KeypairWallet::from_file(file.path()).is_err());
    }

    #[test]
    fn test_from_file_rejects_short_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[1,2,3]").unwrap();
        let err = KeypairWallet::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("expected 64 bytes"));
    }

    #[tokio::test]
    async fn test_keypair_wallet_signs_fee_payer_slot() {
        let wallet = KeypairWallet::from_keypair(Keypair::new());
        let payer = wallet.pubkey();
        let ix = system_instruction::transfer(&payer, &Pubkey::new_unique(), 1);
        let mut message = Message::new(&[ix], Some(&payer));
        message.recent_blockhash = Hash::new_unique();

        let signed = wallet
            .sign_transaction(Transaction::new_unsigned(message))
            .await
            .unwrap();
        assert!(signed.is_signed());
    }

    #[tokio::test]
    async fn test_disconnected_wallet() {
        let wallet = DisconnectedWallet;
        assert!(wallet.public_key().is_none());

        let message = Message::new(&[], None);
        let err = wallet
            .sign_transaction(Transaction::new_unsigned(message))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::NotConnected));
    }
}
