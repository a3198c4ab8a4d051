//! The key-value contract and its by-name dispatch.

use fabkv_types::Operation;

use crate::error::ContractError;
use crate::state::WorldState;

/// Set/Get/Delete over world state.
///
/// Every function validates its key before touching state. `Set` also rejects
/// an empty value, so an empty state entry never exists and `Get` can treat
/// "no bytes" as "absent" without ambiguity.
#[derive(Clone, Copy, Debug, Default)]
pub struct KvContract;

impl KvContract {
    pub fn new() -> Self {
        Self
    }

    /// No-op bootstrap.
    pub fn init_ledger<S: WorldState + ?Sized>(&self, _state: &mut S) -> Result<(), ContractError> {
        Ok(())
    }

    pub fn set<S: WorldState + ?Sized>(
        &self,
        state: &mut S,
        key: &str,
        value: &str,
    ) -> Result<(), ContractError> {
        if key.is_empty() {
            return Err(ContractError::InvalidArgument("key"));
        }
        if value.is_empty() {
            return Err(ContractError::InvalidArgument("value"));
        }
        state.put_state(key, value.as_bytes().to_vec())
    }

    pub fn get<S: WorldState + ?Sized>(&self, state: &S, key: &str) -> Result<Vec<u8>, ContractError> {
        if key.is_empty() {
            return Err(ContractError::InvalidArgument("key"));
        }
        match state.get_state(key)? {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ContractError::KeyNotFound(key.to_string())),
        }
    }

    /// Deleting an absent key succeeds.
    pub fn delete<S: WorldState + ?Sized>(&self, state: &mut S, key: &str) -> Result<(), ContractError> {
        if key.is_empty() {
            return Err(ContractError::InvalidArgument("key"));
        }
        state.del_state(key)
    }

    /// Dispatch a transaction by function name, as the peer does for
    /// submitted transactions. Returns the function's response payload
    /// (empty for functions without a return value).
    pub fn invoke<S: WorldState + ?Sized>(
        &self,
        state: &mut S,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        let operation = resolve(function, args)?;
        tracing::trace!(function, "invoking contract function");
        match operation {
            Operation::InitLedger => self.init_ledger(state).map(|()| Vec::new()),
            Operation::Set => self.set(state, &args[0], &args[1]).map(|()| Vec::new()),
            Operation::Get => self.get(state, &args[0]),
            Operation::Delete => self.delete(state, &args[0]).map(|()| Vec::new()),
        }
    }

    /// Dispatch a read-only function against a state snapshot.
    pub fn query<S: WorldState + ?Sized>(
        &self,
        state: &S,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        let operation = resolve(function, args)?;
        match operation {
            Operation::Get => self.get(state, &args[0]),
            other => Err(ContractError::ReadOnlyViolation(other.name())),
        }
    }
}

fn resolve(function: &str, args: &[String]) -> Result<Operation, ContractError> {
    let operation = Operation::from_name(function)
        .map_err(|_| ContractError::UnknownFunction(function.to_string()))?;
    if args.len() != operation.arity() {
        return Err(ContractError::Arity {
            function: operation.name(),
            expected: operation.arity(),
            got: args.len(),
        });
    }
    Ok(operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryState;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn set_then_get() {
        let mut state = MemoryState::new();
        let cc = KvContract::new();
        cc.set(&mut state, "k", "v1").unwrap();
        assert_eq!(cc.get(&state, "k").unwrap(), b"v1");
        cc.set(&mut state, "k", "v2").unwrap();
        assert_eq!(cc.get(&state, "k").unwrap(), b"v2");
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn get_absent_is_key_not_found() {
        let state = MemoryState::new();
        assert_eq!(
            KvContract.get(&state, "missing"),
            Err(ContractError::KeyNotFound("missing".into()))
        );
    }

    #[test]
    fn delete_is_idempotent() {
        let mut state = MemoryState::new();
        let cc = KvContract::new();
        cc.delete(&mut state, "never-set").unwrap();
        cc.set(&mut state, "k", "v").unwrap();
        cc.delete(&mut state, "k").unwrap();
        cc.delete(&mut state, "k").unwrap();
        assert!(state.is_empty());
        assert!(matches!(
            cc.get(&state, "k"),
            Err(ContractError::KeyNotFound(_))
        ));
    }

    #[test]
    fn empty_key_rejected_before_state_access() {
        let mut state = MemoryState::new();
        let cc = KvContract::new();
        assert_eq!(
            cc.set(&mut state, "", "v"),
            Err(ContractError::InvalidArgument("key"))
        );
        assert_eq!(cc.get(&state, ""), Err(ContractError::InvalidArgument("key")));
        assert_eq!(
            cc.delete(&mut state, ""),
            Err(ContractError::InvalidArgument("key"))
        );
    }

    #[test]
    fn empty_value_rejected() {
        let mut state = MemoryState::new();
        assert_eq!(
            KvContract.set(&mut state, "k", ""),
            Err(ContractError::InvalidArgument("value"))
        );
        assert!(state.is_empty());
    }

    #[test]
    fn invoke_dispatches_by_name() {
        let mut state = MemoryState::new();
        let cc = KvContract::new();
        assert!(cc.invoke(&mut state, "InitLedger", &[]).unwrap().is_empty());
        cc.invoke(&mut state, "Set", &args(&["a", "1"])).unwrap();
        assert_eq!(cc.invoke(&mut state, "Get", &args(&["a"])).unwrap(), b"1");
        cc.invoke(&mut state, "Delete", &args(&["a"])).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn invoke_rejects_unknown_and_bad_arity() {
        let mut state = MemoryState::new();
        let cc = KvContract::new();
        assert_eq!(
            cc.invoke(&mut state, "Drop", &[]),
            Err(ContractError::UnknownFunction("Drop".into()))
        );
        assert_eq!(
            cc.invoke(&mut state, "Set", &args(&["a"])),
            Err(ContractError::Arity {
                function: "Set",
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn query_refuses_mutations() {
        let mut state = MemoryState::new();
        let cc = KvContract::new();
        cc.set(&mut state, "a", "1").unwrap();
        assert_eq!(cc.query(&state, "Get", &args(&["a"])).unwrap(), b"1");
        assert_eq!(
            cc.query(&state, "Delete", &args(&["a"])),
            Err(ContractError::ReadOnlyViolation("Delete"))
        );
    }
}
