use proptest::prelude::*;

use fabkv_types::{Operation, PeerAddress, TransactionRequest};

fn operation() -> impl Strategy<Value = Operation> {
    prop::sample::select(Operation::ALL.to_vec())
}

proptest! {
    /// A request is accepted exactly when the arity matches and no argument is empty.
    #[test]
    fn request_validation_matches_schema(
        op in operation(),
        args in prop::collection::vec(".{0,8}", 0..4),
    ) {
        let valid = args.len() == op.arity() && args.iter().all(|a| !a.is_empty());
        let result = TransactionRequest::new(op, args.clone());
        prop_assert_eq!(result.is_ok(), valid);
        if let Ok(request) = result {
            prop_assert_eq!(request.args(), args.as_slice());
            prop_assert_eq!(request.operation(), op);
        }
    }

    /// Operation names resolve back to the same operation.
    #[test]
    fn operation_name_roundtrip(op in operation()) {
        prop_assert_eq!(Operation::from_name(op.name()).unwrap(), op);
    }

    /// Peer addresses without whitespace are accepted verbatim.
    #[test]
    fn peer_address_accepts_non_blank(address in "[a-z0-9.\\-]{1,30}(:[0-9]{1,5})?") {
        let peer = PeerAddress::new(address.clone()).unwrap();
        prop_assert_eq!(peer.as_str(), address.as_str());
    }

    /// Any whitespace makes an address invalid.
    #[test]
    fn peer_address_rejects_whitespace(prefix in "[a-z]{0,5}", suffix in "[a-z]{0,5}") {
        let address = format!("{prefix} {suffix}");
        prop_assert!(PeerAddress::new(address).is_err());
    }
}
