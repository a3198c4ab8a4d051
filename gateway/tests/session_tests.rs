//! Session lifecycle and transaction dispatch against a nullable ledger.

use std::sync::Arc;

use fabkv_gateway::{
    EndorsementTargets, GatewayError, LedgerFault, NetworkSession, SessionOptions,
};
use fabkv_nullables::{
    test_topology, write_topology, CallMode, NullConnector, NullLedger, TestIdentity,
    TEST_CHANNEL, TEST_CONTRACT, TEST_MSP_ID,
};
use fabkv_types::{ErrorKind, PeerAddress, SubmitOutcome, TransactionRequest};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn options() -> SessionOptions {
    let identity = TestIdentity::new("appUser", TEST_MSP_ID).identity();
    SessionOptions::new(TEST_CHANNEL, TEST_CONTRACT, identity)
}

fn peers(addresses: &[&str]) -> Vec<PeerAddress> {
    addresses
        .iter()
        .map(|a| PeerAddress::new(*a).unwrap())
        .collect()
}

async fn open(options: SessionOptions) -> (NetworkSession, NullConnector) {
    let connector = NullConnector::default();
    let session = NetworkSession::open_with_topology(options, test_topology(), &connector)
        .await
        .unwrap();
    (session, connector)
}

// ---------------------------------------------------------------------------
// Open / close
// ---------------------------------------------------------------------------

#[tokio::test]
async fn open_binds_channel_and_contract() {
    let (session, connector) = open(options()).await;

    assert_eq!(connector.connect_count(), 1);
    let binding = &connector.bindings()[0];
    assert_eq!(binding.channel, TEST_CHANNEL);
    assert_eq!(binding.contract, TEST_CONTRACT);
    assert_eq!(binding.gateway_peer.name, "peer0.org1.example.com");
    assert_eq!(session.gateway_peer().url, "http://localhost:7051");
    assert!(!session.is_closed());

    session.close().await;
}

#[tokio::test]
async fn open_from_topology_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_topology(dir.path()).unwrap();
    let connector = NullConnector::default();

    let session = NetworkSession::open(options(), &path, &connector).await.unwrap();
    assert_eq!(session.topology().name, "test-network-org1");
    session.close().await;
}

#[tokio::test]
async fn unknown_channel_fails() {
    let identity = TestIdentity::new("appUser", TEST_MSP_ID).identity();
    let options = SessionOptions::new("otherchannel", TEST_CONTRACT, identity);
    let connector = NullConnector::default();

    let err = NetworkSession::open_with_topology(options, test_topology(), &connector)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ChannelNotFound(ref c) if c == "otherchannel"));
    assert_eq!(err.kind(), ErrorKind::ChannelNotFound);
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn unknown_contract_fails() {
    let identity = TestIdentity::new("appUser", TEST_MSP_ID).identity();
    let options = SessionOptions::new(TEST_CHANNEL, "marbles", identity);
    let connector = NullConnector::default();

    let err = NetworkSession::open_with_topology(options, test_topology(), &connector)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContractNotFound);
}

#[tokio::test]
async fn undeclared_endorsing_peer_fails() {
    let options = options().with_endorsing_peers(peers(&[
        "peer0.org1.example.com:7051",
        "peer9.org9.example.com:7051",
    ]));
    let connector = NullConnector::default();

    let err = NetworkSession::open_with_topology(options, test_topology(), &connector)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Topology(ref m) if m.contains("peer9.org9.example.com:7051")));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn membership_mismatch_is_invalid_identity() {
    let options = options().with_membership_id("Org2MSP");
    let connector = NullConnector::default();

    let err = NetworkSession::open_with_topology(options, test_topology(), &connector)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidIdentity);
}

#[tokio::test]
async fn unknown_organisation_is_invalid_identity() {
    let identity = TestIdentity::new("appUser", "Org9MSP").identity();
    let options = SessionOptions::new(TEST_CHANNEL, TEST_CONTRACT, identity);
    let connector = NullConnector::default();

    let err = NetworkSession::open_with_topology(options, test_topology(), &connector)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidIdentity);
}

#[tokio::test]
async fn mismatched_key_is_invalid_identity() {
    let user = TestIdentity::new("appUser", TEST_MSP_ID).identity();
    let other = TestIdentity::new("otherUser", TEST_MSP_ID).identity();
    let franken = fabkv_types::Identity::new(
        "appUser",
        TEST_MSP_ID,
        user.certificate().to_vec(),
        other.private_key().clone(),
    );
    let options = SessionOptions::new(TEST_CHANNEL, TEST_CONTRACT, franken);
    let connector = NullConnector::default();

    let err = NetworkSession::open_with_topology(options, test_topology(), &connector)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidIdentity);
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let connector = NullConnector::default();
    connector.refuse_connections("connection refused");

    let err = NetworkSession::open_with_topology(options(), test_topology(), &connector)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn close_is_idempotent() {
    let (session, connector) = open(options()).await;

    session.close().await;
    session.close().await;
    assert!(session.is_closed());
    assert_eq!(connector.ledger().close_count(), 1);
}

#[tokio::test]
async fn closed_session_rejects_calls() {
    let (session, connector) = open(options()).await;
    session.close().await;

    let executor = session.executor();
    let set = TransactionRequest::set("k", "1").unwrap();
    let get = TransactionRequest::get("k").unwrap();
    assert!(matches!(executor.submit(&set).await, Err(GatewayError::SessionClosed)));
    assert!(matches!(executor.evaluate(&get).await, Err(GatewayError::SessionClosed)));
    assert!(connector.ledger().calls().is_empty());
}

// ---------------------------------------------------------------------------
// Submit / evaluate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_then_evaluate() {
    let (session, connector) = open(options()).await;
    let executor = session.executor();

    executor
        .submit(&TransactionRequest::set("color", "\"blue\"").unwrap())
        .await
        .unwrap();
    let value = executor
        .evaluate(&TransactionRequest::get("color").unwrap())
        .await
        .unwrap();
    assert_eq!(value, b"\"blue\"");

    let calls = connector.ledger().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].mode, CallMode::Submit);
    assert_eq!(calls[0].args, vec!["color".to_string(), "\"blue\"".to_string()]);
    assert_eq!(calls[1].mode, CallMode::Evaluate);
    assert_ne!(calls[0].tx_id, calls[1].tx_id);

    session.close().await;
}

#[tokio::test]
async fn explicit_endorsing_peers_are_targeted_exactly() {
    let configured = peers(&["peer0.org1.example.com:7051", "peer0.org2.example.com:9051"]);
    let (session, connector) = open(options().with_endorsing_peers(configured.clone())).await;

    session
        .executor()
        .submit(&TransactionRequest::set("k", "1").unwrap())
        .await
        .unwrap();
    session
        .executor()
        .submit(&TransactionRequest::delete("k").unwrap())
        .await
        .unwrap();

    for call in connector.ledger().calls() {
        assert_eq!(call.targets, Some(EndorsementTargets::Explicit(configured.clone())));
    }
    session.close().await;
}

#[tokio::test]
async fn no_endorsing_peers_means_discovery() {
    let (session, connector) = open(options()).await;

    session
        .executor()
        .submit(&TransactionRequest::init_ledger())
        .await
        .unwrap();

    let calls = connector.ledger().calls();
    assert_eq!(calls[0].function, "InitLedger");
    assert_eq!(calls[0].targets, Some(EndorsementTargets::Discovery));
    session.close().await;
}

#[tokio::test]
async fn read_and_write_modes_are_enforced() {
    let (session, connector) = open(options()).await;
    let executor = session.executor();

    let err = executor
        .submit(&TransactionRequest::get("k").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = executor
        .evaluate(&TransactionRequest::delete("k").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert!(connector.ledger().calls().is_empty());
    session.close().await;
}

#[tokio::test]
async fn named_calls_validate_before_sending() {
    let (session, connector) = open(options()).await;
    let executor = session.executor();

    assert!(executor.submit_named("Set", &["k", "1"]).await.is_ok());
    assert_eq!(executor.evaluate_named("Get", &["k"]).await.unwrap(), b"1");

    let err = executor.submit_named("Set", &["", "1"]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = executor.submit_named("Transfer", &["a", "b"]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert_eq!(connector.ledger().calls().len(), 2);
    session.close().await;
}

#[tokio::test]
async fn endorsement_failure_is_not_committed() {
    let (session, connector) = open(options()).await;
    connector
        .ledger()
        .push_fault(LedgerFault::Endorsement("policy not satisfied".into()));

    let err = session
        .executor()
        .submit(&TransactionRequest::set("k", "1").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EndorsementFailed);
    assert_eq!(err.kind().submit_outcome(), SubmitOutcome::NotCommitted);
    assert!(connector.ledger().state_value("k").is_none());
    session.close().await;
}

#[tokio::test]
async fn timeout_after_commit_is_uncertain() {
    let (session, connector) = open(options()).await;
    connector
        .ledger()
        .push_fault_after_commit(LedgerFault::Timeout("no commit event".into()));

    let err = session
        .executor()
        .submit(&TransactionRequest::set("k", "1").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransactionTimeout);
    assert_eq!(err.kind().submit_outcome(), SubmitOutcome::Uncertain);
    assert_eq!(connector.ledger().state_value("k").unwrap(), b"1");
    session.close().await;
}

#[tokio::test]
async fn contract_rejection_on_submit() {
    let (session, connector) = open(options()).await;
    connector
        .ledger()
        .push_fault(LedgerFault::Rejected("chaincode panicked".into()));

    let err = session
        .executor()
        .submit(&TransactionRequest::delete("k").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationRejected);
    session.close().await;
}

#[tokio::test]
async fn evaluate_faults() {
    let (session, connector) = open(options()).await;
    let executor = session.executor();

    let err = executor
        .evaluate(&TransactionRequest::get("missing").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::KeyNotFound(ref k) if k == "missing"));

    connector
        .ledger()
        .push_fault(LedgerFault::Unavailable("peer down".into()));
    let err = executor
        .evaluate(&TransactionRequest::get("k").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EvaluationFailed);
    session.close().await;
}

#[tokio::test]
async fn concurrent_calls_share_one_session() {
    let ledger = Arc::new(NullLedger::new());
    let connector = NullConnector::new(ledger.clone());
    let session = Arc::new(
        NetworkSession::open_with_topology(options(), test_topology(), &connector)
            .await
            .unwrap(),
    );

    let mut handles = Vec::new();
    for i in 0..16 {
        let session = Arc::clone(&session);
        handles.push(tokio::spawn(async move {
            let key = format!("key{i}");
            let request = TransactionRequest::set(key.as_str(), i.to_string().as_str()).unwrap();
            session.executor().submit(&request).await.unwrap();
            session
                .executor()
                .evaluate(&TransactionRequest::get(key.as_str()).unwrap())
                .await
                .unwrap()
        }));
    }
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), i.to_string().into_bytes());
    }

    assert_eq!(ledger.key_count(), 16);
    assert_eq!(ledger.calls().len(), 32);
    session.close().await;
}
