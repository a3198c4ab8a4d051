//! Nullable ledger: runs the key-value contract in memory instead of on a
//! network, and records every proposal it receives.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fabkv_chaincode::{ContractError, KvContract, MemoryState, WorldState};
use fabkv_gateway::{
    ChannelBinding, EndorsementTargets, GatewayError, LedgerConnector, LedgerFault,
    LedgerTransport, SignedProposal,
};

/// How a proposal reached the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallMode {
    Submit,
    Evaluate,
}

/// One proposal as the ledger saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    pub mode: CallMode,
    pub tx_id: String,
    pub function: String,
    pub args: Vec<String>,
    /// Endorsement targets of a submit; `None` for evaluations.
    pub targets: Option<EndorsementTargets>,
}

struct ScriptedFault {
    fault: LedgerFault,
    /// Apply the transaction before reporting the fault.
    commit: bool,
}

/// An in-memory ledger for testing.
pub struct NullLedger {
    contract: KvContract,
    state: Mutex<MemoryState>,
    calls: Mutex<Vec<RecordedCall>>,
    faults: Mutex<VecDeque<ScriptedFault>>,
    closes: AtomicUsize,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            contract: KvContract::new(),
            state: Mutex::new(MemoryState::new()),
            calls: Mutex::new(Vec::new()),
            faults: Mutex::new(VecDeque::new()),
            closes: AtomicUsize::new(0),
        }
    }

    /// Fail the next call with `fault`; the transaction is not applied.
    pub fn push_fault(&self, fault: LedgerFault) {
        self.faults.lock().unwrap().push_back(ScriptedFault {
            fault,
            commit: false,
        });
    }

    /// Apply the next submitted transaction, then report `fault` anyway.
    /// Models a commit whose acknowledgement was lost.
    pub fn push_fault_after_commit(&self, fault: LedgerFault) {
        self.faults.lock().unwrap().push_back(ScriptedFault {
            fault,
            commit: true,
        });
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Raw world-state value under `key`.
    pub fn state_value(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().get_state(key).ok().flatten()
    }

    /// Write straight into world state, bypassing the contract.
    pub fn seed(&self, key: &str, value: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .put_state(key, value.to_vec())
            .expect("memory state put");
    }

    pub fn key_count(&self) -> usize {
        self.state.lock().unwrap().len()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn record(&self, mode: CallMode, proposal: &SignedProposal, targets: Option<&EndorsementTargets>) {
        self.calls.lock().unwrap().push(RecordedCall {
            mode,
            tx_id: proposal.tx_id().to_string(),
            function: proposal.function().to_string(),
            args: proposal.args().to_vec(),
            targets: targets.cloned(),
        });
    }

    fn next_fault(&self) -> Option<ScriptedFault> {
        self.faults.lock().unwrap().pop_front()
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerTransport for NullLedger {
    async fn submit(
        &self,
        proposal: &SignedProposal,
        targets: &EndorsementTargets,
    ) -> Result<Vec<u8>, LedgerFault> {
        self.record(CallMode::Submit, proposal, Some(targets));
        let after_commit = match self.next_fault() {
            Some(ScriptedFault { fault, commit: false }) => return Err(fault),
            Some(ScriptedFault { fault, commit: true }) => Some(fault),
            None => None,
        };

        let payload = {
            let mut state = self.state.lock().unwrap();
            self.contract
                .invoke(&mut *state, proposal.function(), proposal.args())
                .map_err(contract_fault)?
        };
        match after_commit {
            Some(fault) => Err(fault),
            None => Ok(payload),
        }
    }

    async fn evaluate(&self, proposal: &SignedProposal) -> Result<Vec<u8>, LedgerFault> {
        self.record(CallMode::Evaluate, proposal, None);
        if let Some(ScriptedFault { fault, .. }) = self.next_fault() {
            return Err(fault);
        }
        let state = self.state.lock().unwrap();
        self.contract
            .query(&*state, proposal.function(), proposal.args())
            .map_err(contract_fault)
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn contract_fault(error: ContractError) -> LedgerFault {
    match error {
        ContractError::KeyNotFound(key) => LedgerFault::KeyNotFound(key),
        e @ ContractError::InvalidArgument(_) => LedgerFault::InvalidArgument(e.to_string()),
        e => LedgerFault::Rejected(e.to_string()),
    }
}

/// Hands out the same [`NullLedger`] to every session.
pub struct NullConnector {
    ledger: Arc<NullLedger>,
    connects: AtomicUsize,
    bindings: Mutex<Vec<ChannelBinding>>,
    refuse: Mutex<Option<String>>,
}

impl NullConnector {
    pub fn new(ledger: Arc<NullLedger>) -> Self {
        Self {
            ledger,
            connects: AtomicUsize::new(0),
            bindings: Mutex::new(Vec::new()),
            refuse: Mutex::new(None),
        }
    }

    pub fn ledger(&self) -> &Arc<NullLedger> {
        &self.ledger
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Bindings of every successful connect.
    pub fn bindings(&self) -> Vec<ChannelBinding> {
        self.bindings.lock().unwrap().clone()
    }

    /// Fail every following connect with a transport error.
    pub fn refuse_connections(&self, reason: impl Into<String>) {
        *self.refuse.lock().unwrap() = Some(reason.into());
    }
}

impl Default for NullConnector {
    fn default() -> Self {
        Self::new(Arc::new(NullLedger::new()))
    }
}

#[async_trait]
impl LedgerConnector for NullConnector {
    async fn connect(
        &self,
        binding: &ChannelBinding,
    ) -> Result<Arc<dyn LedgerTransport>, GatewayError> {
        if let Some(reason) = self.refuse.lock().unwrap().clone() {
            return Err(GatewayError::Transport(reason));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.bindings.lock().unwrap().push(binding.clone());
        Ok(self.ledger.clone())
    }
}
