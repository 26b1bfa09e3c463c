//! Opt-in event reporting around a [`Contract`].

use super::manager::EventHub;
use super::types::{SubscriptionConfig, SubscriptionHandle, SubscriptionId};
use crate::contract::{ChaincodeResponse, Contract, Response};
use crate::error::Result;
use crate::state::{StateStore, WriteSet};
use crate::types::TxId;

/// A [`Contract`] paired with an [`EventHub`].
///
/// Each invocation runs through a [`WriteSet`] view of the host state. When it
/// succeeds and wrote at least one key, subscribers receive a
/// [`super::LedgerEvent::Written`]. The wrapped contract is unchanged and
/// can still be called directly without any event bookkeeping.
pub struct ObservedContract {
    contract: Contract,
    hub: EventHub,
}

impl ObservedContract {
    pub fn new(contract: Contract) -> Self {
        Self {
            contract,
            hub: EventHub::new(),
        }
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.hub.subscribe(config)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.hub.unsubscribe(id);
    }

    pub fn subscription_count(&self) -> usize {
        self.hub.subscription_count()
    }

    /// Like [`Contract::handle`], reporting writes to subscribers.
    pub fn handle(
        &self,
        state: &dyn StateStore,
        function: &str,
        args: &[String],
    ) -> ChaincodeResponse {
        ChaincodeResponse::from_result(self.dispatch(state, function, args))
    }

    /// Like [`Contract::dispatch`], reporting writes to subscribers.
    pub fn dispatch(
        &self,
        state: &dyn StateStore,
        function: &str,
        args: &[String],
    ) -> Result<Response> {
        let writes = WriteSet::new(state);
        let response = self.contract.dispatch(&writes, function, args)?;

        let keys = writes.keys();
        if !keys.is_empty() {
            let tx_id = TxId::for_invocation(function, args);
            tracing::debug!(operation = function, writes = keys.len(), "broadcasting writes");
            self.hub.broadcast_written(&tx_id.to_string(), function, keys);
        }
        Ok(response)
    }
}

impl From<Contract> for ObservedContract {
    fn from(contract: Contract) -> Self {
        Self::new(contract)
    }
}
