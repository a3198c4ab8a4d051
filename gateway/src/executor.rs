//! Operation dispatch: submit for mutations, evaluate for reads.
//!
//! No retries happen here. A failed `submit` is reported with a kind that
//! tells the caller whether the transaction may still have committed
//! (`TransactionTimeout`, `Transport`) or definitely did not.

use fabkv_types::{Operation, TransactionRequest};

use crate::session::NetworkSession;
use crate::transport::{EndorsementTargets, LedgerFault};
use crate::GatewayError;

/// Executes transactions through a session's contract binding.
#[derive(Clone, Copy, Debug)]
pub struct TransactionExecutor<'s> {
    session: &'s NetworkSession,
}

impl<'s> TransactionExecutor<'s> {
    pub fn new(session: &'s NetworkSession) -> Self {
        Self { session }
    }

    /// The configured endorsing peers, or discovery when none are configured.
    pub fn endorsement_targets(&self) -> EndorsementTargets {
        EndorsementTargets::from_peers(self.session.options().endorsing_peers())
    }

    /// Submit a mutating operation for endorsement, ordering and commit.
    pub async fn submit(&self, request: &TransactionRequest) -> Result<Vec<u8>, GatewayError> {
        self.session.ensure_open()?;
        if !request.operation().is_mutating() {
            return Err(GatewayError::InvalidArgument(format!(
                "{} does not modify state; evaluate it instead",
                request.operation()
            )));
        }

        let proposal = self.session.sign(request)?;
        let targets = self.endorsement_targets();
        tracing::debug!(
            tx_id = proposal.tx_id(),
            function = proposal.function(),
            targets = ?targets.peers(),
            "submitting transaction"
        );

        let payload = self
            .session
            .transport()
            .submit(&proposal, &targets)
            .await
            .map_err(|fault| {
                tracing::debug!(tx_id = proposal.tx_id(), %fault, "submit failed");
                submit_error(fault)
            })?;

        tracing::debug!(
            tx_id = proposal.tx_id(),
            payload_len = payload.len(),
            "transaction committed"
        );
        Ok(payload)
    }

    /// Evaluate a read-only operation on a single peer.
    pub async fn evaluate(&self, request: &TransactionRequest) -> Result<Vec<u8>, GatewayError> {
        self.session.ensure_open()?;
        if request.operation().is_mutating() {
            return Err(GatewayError::InvalidArgument(format!(
                "{} modifies state; submit it instead",
                request.operation()
            )));
        }

        let proposal = self.session.sign(request)?;
        tracing::debug!(
            tx_id = proposal.tx_id(),
            function = proposal.function(),
            "evaluating transaction"
        );

        self.session
            .transport()
            .evaluate(&proposal)
            .await
            .map_err(evaluate_error)
    }

    /// [`submit`](Self::submit) by function name and string arguments.
    pub async fn submit_named(&self, function: &str, args: &[&str]) -> Result<Vec<u8>, GatewayError> {
        let request = named_request(function, args)?;
        self.submit(&request).await
    }

    /// [`evaluate`](Self::evaluate) by function name and string arguments.
    pub async fn evaluate_named(&self, function: &str, args: &[&str]) -> Result<Vec<u8>, GatewayError> {
        let request = named_request(function, args)?;
        self.evaluate(&request).await
    }
}

fn named_request(function: &str, args: &[&str]) -> Result<TransactionRequest, GatewayError> {
    let operation = Operation::from_name(function)?;
    let args = args.iter().map(|a| a.to_string()).collect();
    Ok(TransactionRequest::new(operation, args)?)
}

fn submit_error(fault: LedgerFault) -> GatewayError {
    match fault {
        LedgerFault::Endorsement(msg) => GatewayError::EndorsementFailed(msg),
        LedgerFault::Timeout(msg) => GatewayError::TransactionTimeout(msg),
        LedgerFault::Rejected(msg) => GatewayError::OperationRejected(msg),
        LedgerFault::InvalidArgument(msg) => GatewayError::OperationRejected(msg),
        fault @ LedgerFault::KeyNotFound(_) => GatewayError::OperationRejected(fault.to_string()),
        LedgerFault::Unavailable(msg) => GatewayError::Transport(msg),
    }
}

fn evaluate_error(fault: LedgerFault) -> GatewayError {
    match fault {
        LedgerFault::KeyNotFound(key) => GatewayError::KeyNotFound(key),
        other => GatewayError::EvaluationFailed(other.to_string()),
    }
}
