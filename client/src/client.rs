use serde::de::DeserializeOwned;
use serde::Serialize;

use fabkv_gateway::{GatewayError, LedgerConnector, NetworkSession, SessionOptions};
use fabkv_types::TransactionRequest;
use fabkv_wallet::{ensure_app_user, FileSystemWallet, IdentityStore};

use crate::codec;
use crate::{ClientConfig, ClientError};

/// Key-value operations on one contract through an open session.
///
/// Owns its [`NetworkSession`]; call [`close`](Self::close) when done.
#[derive(Debug)]
pub struct KvClient {
    session: NetworkSession,
}

impl KvClient {
    /// Open the wallet, provision the configured application user if the
    /// wallet lacks it, and open a session with that identity.
    pub async fn connect(
        config: &ClientConfig,
        connector: &dyn LedgerConnector,
    ) -> Result<Self, ClientError> {
        let wallet = FileSystemWallet::open(&config.wallet_path)?;
        Self::connect_with_store(config, &wallet, connector).await
    }

    /// [`connect`](Self::connect) with a caller-supplied identity store.
    pub async fn connect_with_store<S: IdentityStore + ?Sized>(
        config: &ClientConfig,
        store: &S,
        connector: &dyn LedgerConnector,
    ) -> Result<Self, ClientError> {
        let identity = ensure_app_user(store, &config.msp_id, &config.app_user)?;
        let options = SessionOptions::new(&config.channel_name, &config.contract_id, identity)
            .with_membership_id(&config.msp_id)
            .with_endorsing_peers(config.endorsing_peers.clone());
        let session = NetworkSession::open(options, &config.connection_profile, connector).await?;
        Ok(Self { session })
    }

    pub fn from_session(session: NetworkSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &NetworkSession {
        &self.session
    }

    /// Store `value` under `key`, replacing any previous value.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), ClientError> {
        check_key(key)?;
        let payload = codec::encode(key, value)?;
        let request = TransactionRequest::set(key, payload).map_err(GatewayError::from)?;
        self.session.executor().submit(&request).await?;
        tracing::debug!(key, "value set");
        Ok(())
    }

    /// The value under `key`, or `None` if the key was never set or has
    /// been deleted.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ClientError> {
        check_key(key)?;
        let request = TransactionRequest::get(key).map_err(GatewayError::from)?;
        match self.session.executor().evaluate(&request).await {
            Ok(payload) => codec::decode(key, &payload),
            Err(GatewayError::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove `key`. Removing an absent key succeeds.
    pub async fn delete(&self, key: &str) -> Result<(), ClientError> {
        check_key(key)?;
        let request = TransactionRequest::delete(key).map_err(GatewayError::from)?;
        self.session.executor().submit(&request).await?;
        tracing::debug!(key, "key deleted");
        Ok(())
    }

    /// Submit the contract's `InitLedger` bootstrap transaction.
    pub async fn init_ledger(&self) -> Result<(), ClientError> {
        self.session
            .executor()
            .submit(&TransactionRequest::init_ledger())
            .await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.session.close().await;
    }
}

fn check_key(key: &str) -> Result<(), ClientError> {
    if key.is_empty() {
        Err(ClientError::InvalidKey)
    } else {
        Ok(())
    }
}
