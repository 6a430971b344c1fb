//! No-op subscriptions that keep a connection's websocket from idling out

use crate::metrics::metrics;
use crate::rpc::{RpcTransport, Subscription};
use solana_sdk::signature::{Keypair, Signer};
use tracing::debug;

/// One account-change and one slot-change subscription for a handle
#[derive(Debug)]
pub struct KeepAlive {
    endpoint: String,
    subscriptions: Vec<Subscription>,
    established: usize,
}

impl KeepAlive {
    /// Subscribe on `transport`.
    ///
    /// The watched account is a freshly generated key nobody will ever
    /// write to, so the subscription never produces notifications.
    pub fn establish(transport: &dyn RpcTransport) -> Self {
        let idle_account = Keypair::new().pubkey();
        let subscriptions = vec![
            transport.on_account_change(idle_account),
            transport.on_slot_change(),
        ];

        let established = subscriptions.len();
        metrics().keepalive_subscriptions.add(established as i64);
        debug!(
            endpoint = %transport.endpoint(),
            account = %idle_account,
            "Keep-alive subscriptions established"
        );

        Self {
            endpoint: transport.endpoint().to_string(),
            subscriptions,
            established,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Cancel both subscriptions and wait for their tasks
    pub async fn cancel(mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel().await;
        }
        debug!(endpoint = %self.endpoint, "Keep-alive subscriptions cancelled");
    }
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        // Remaining subscriptions signal cancellation from their own Drop
        metrics()
            .keepalive_subscriptions
            .sub(self.established as i64);
    }
}
