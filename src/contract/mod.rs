//! The card ledger contract.
//!
//! [`Contract::dispatch`] parses an invocation into an [`Operation`] and runs
//! its handler against the state view the host supplies for that call. Handlers
//! read and write records directly, maintain relation indexes through
//! [`SecondaryIndex`], and answer queries through [`QueryAggregator`].

mod operation;
mod response;
mod seed;

pub use operation::Operation;
pub use response::{ChaincodeResponse, Response, ERROR, OK};

use crate::error::{ContractError, Result};
use crate::index::SecondaryIndex;
use crate::keys::{KeySpace, RelationIndex};
use crate::query::QueryAggregator;
use crate::state::StateStore;
use crate::types::{Card, CardItem, Digest32, ResearchUser, TxId};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Contract configuration.
#[derive(Clone, Debug)]
pub struct ContractConfig {
    /// Cards written by `initLedger`.
    pub seed_cards: usize,

    /// Items written per seeded card.
    pub seed_items_per_card: usize,

    /// Log full query payloads at trace level.
    pub log_query_results: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            seed_cards: 20,
            seed_items_per_card: 20,
            log_query_results: false,
        }
    }
}

/// Routes invocations to handlers.
///
/// Holds no ledger state; every call works on the view passed in.
pub struct Contract {
    config: ContractConfig,
}

impl Contract {
    pub fn new(config: ContractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Shim entry point: never fails, errors become a status-500 response.
    pub fn handle(
        &self,
        state: &dyn StateStore,
        function: &str,
        args: &[String],
    ) -> ChaincodeResponse {
        ChaincodeResponse::from_result(self.dispatch(state, function, args))
    }

    /// Parse and run one invocation.
    pub fn dispatch(
        &self,
        state: &dyn StateStore,
        function: &str,
        args: &[String],
    ) -> Result<Response> {
        let tx_id = TxId::for_invocation(function, args);
        let span = tracing::debug_span!("invoke", function, tx_id = %tx_id);
        let _enter = span.enter();

        let op = Operation::parse(function, args).map_err(|e| {
            tracing::warn!(error = %e, "rejected invocation");
            e
        })?;
        self.execute(state, op)
    }

    /// Run an already-parsed operation.
    pub fn execute(&self, state: &dyn StateStore, op: Operation) -> Result<Response> {
        let name = op.name();

        let result = self.run(state, op);
        match &result {
            Ok(response) => {
                tracing::debug!(operation = name, "invocation succeeded");
                if self.config.log_query_results {
                    if let Some(query) = response.as_query() {
                        let json = query.to_write_through_json();
                        tracing::trace!(
                            operation = name,
                            result = %String::from_utf8_lossy(&json),
                            "query result"
                        );
                    }
                }
            }
            Err(e) => tracing::warn!(operation = name, error = %e, "invocation failed"),
        }
        result
    }

    fn run(&self, state: &dyn StateStore, op: Operation) -> Result<Response> {
        let queries = QueryAggregator::new(state);

        match op {
            Operation::InitLedger => {
                self.init_ledger(state)?;
                Ok(Response::Unit)
            }
            Operation::QueryUser { key } => Ok(Response::Record(state.get_state(&key)?)),
            Operation::QueryAllUsers => {
                Ok(Response::Query(queries.collect_key_space(KeySpace::User)?))
            }
            Operation::CreateUser { key, user } => {
                put_json(state, &key, &user)?;
                Ok(Response::Unit)
            }
            Operation::ChangeCardOwner { card_key, user_key } => {
                change_card_owner(state, &card_key, user_key)?;
                Ok(Response::Unit)
            }
            Operation::QueryAllCompanies => {
                Ok(Response::Query(queries.collect_key_space(KeySpace::Company)?))
            }
            Operation::QueryAllResearches => {
                Ok(Response::Query(queries.collect_key_space(KeySpace::Research)?))
            }
            Operation::CreateResearch { key, research } => {
                put_json(state, &key, &research)?;
                Ok(Response::Unit)
            }
            Operation::Subscribe {
                research_key,
                user_key,
            } => Ok(Response::Record(Some(subscribe(state, research_key, user_key)?))),
            Operation::QueryAllSubscribers => {
                Ok(Response::Query(queries.collect_key_space(KeySpace::ResearchUser)?))
            }
            Operation::QuerySubscribersByResearch { research_key } => {
                let name = RelationIndex::SubscriptionByResearch.name();
                Ok(Response::Query(queries.collect_by_index(name, &[research_key])?))
            }
            Operation::CreateCard { key, card } => {
                store_card(state, &key, &card)?;
                Ok(Response::Unit)
            }
            Operation::CreateCardItem { key, item } => {
                store_card_item(state, &key, &item)?;
                Ok(Response::Unit)
            }
            Operation::QueryCardItemsByCard { card_key } => Ok(Response::Query(
                queries.collect_by_index(RelationIndex::CardItemByCard.name(), &[card_key])?,
            )),
            Operation::QueryCardsByUser { user_key } => Ok(Response::Query(
                queries.collect_by_index(RelationIndex::CardByUser.name(), &[user_key])?,
            )),
        }
    }

    fn init_ledger(&self, state: &dyn StateStore) -> Result<()> {
        let users = seed::users();
        for (i, user) in users.iter().enumerate() {
            put_json(state, &KeySpace::User.key(i as u64), user)?;
        }

        let companies = seed::companies();
        for (i, company) in companies.iter().enumerate() {
            put_json(state, &KeySpace::Company.key(i as u64), company)?;
        }

        let owner = KeySpace::User.key(0);
        let issuer = KeySpace::Company.key(0);
        let per_card = self.config.seed_items_per_card;

        for j in 0..self.config.seed_cards {
            let card_key = KeySpace::Card.key(j as u64);
            store_card(state, &card_key, &seed::card(&owner, &issuer))?;

            for k in 0..per_card {
                let item_key = KeySpace::CardItem.key((j * per_card + k) as u64);
                store_card_item(state, &item_key, &seed::card_item(&card_key))?;
            }
        }

        tracing::info!(
            users = users.len(),
            companies = companies.len(),
            cards = self.config.seed_cards,
            items = self.config.seed_cards * per_card,
            "ledger initialised"
        );
        Ok(())
    }
}

impl Default for Contract {
    fn default() -> Self {
        Self::new(ContractConfig::default())
    }
}

fn put_json<T: Serialize>(state: &dyn StateStore, key: &str, value: &T) -> Result<Vec<u8>> {
    let bytes = serde_json::to_vec(value)?;
    state.put_state(key, &bytes)?;
    Ok(bytes)
}

fn get_json<T: DeserializeOwned>(state: &dyn StateStore, key: &str) -> Result<Option<T>> {
    match state.get_state(key)? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ContractError::Serialization(format!("record {:?}: {}", key, e))),
        None => Ok(None),
    }
}

/// Write a card and keep its `card~user` entry in step with `userID`.
fn store_card(state: &dyn StateStore, key: &str, card: &Card) -> Result<()> {
    let index = SecondaryIndex::new(state);
    let name = RelationIndex::CardByUser.name();

    if let Some(previous) = get_json::<Card>(state, key)? {
        if previous.user_id != card.user_id {
            index.remove(name, &[previous.user_id.as_str()], key)?;
        }
    }
    index.add(name, &[card.user_id.as_str()], key)?;
    put_json(state, key, card)?;
    Ok(())
}

/// Write a card item and keep its `carditem~card` entry in step with `cardID`.
fn store_card_item(state: &dyn StateStore, key: &str, item: &CardItem) -> Result<()> {
    let index = SecondaryIndex::new(state);
    let name = RelationIndex::CardItemByCard.name();

    if let Some(previous) = get_json::<CardItem>(state, key)? {
        if previous.card_id != item.card_id {
            index.remove(name, &[previous.card_id.as_str()], key)?;
        }
    }
    index.add(name, &[item.card_id.as_str()], key)?;
    put_json(state, key, item)?;
    Ok(())
}

fn change_card_owner(state: &dyn StateStore, card_key: &str, user_key: String) -> Result<()> {
    let mut card: Card =
        get_json(state, card_key)?.ok_or_else(|| ContractError::NotFound(card_key.to_string()))?;

    let previous = std::mem::replace(&mut card.user_id, user_key);
    SecondaryIndex::new(state).reindex(
        RelationIndex::CardByUser.name(),
        &[previous.as_str()],
        &[card.user_id.as_str()],
        card_key,
    )?;
    put_json(state, card_key, &card)?;

    tracing::debug!(card = card_key, from = %previous, to = %card.user_id, "card owner changed");
    Ok(())
}

/// Subscribe a user to a research programme. The subscription key is derived
/// from the pair, so subscribing twice rewrites the same record.
fn subscribe(state: &dyn StateStore, research_key: String, user_key: String) -> Result<Vec<u8>> {
    for key in [&research_key, &user_key] {
        if state.get_state(key)?.is_none() {
            return Err(ContractError::NotFound(key.clone()));
        }
    }

    let id = Digest32::of_fields([research_key.as_str(), user_key.as_str()]).leading_u64();
    let key = KeySpace::ResearchUser.key(id);
    let subscription = ResearchUser {
        user_id: user_key,
        research_id: research_key,
    };
    let bytes = serde_json::to_vec(&subscription)?;

    SecondaryIndex::new(state).add(
        RelationIndex::SubscriptionByResearch.name(),
        &[subscription.research_id.as_str()],
        &key,
    )?;
    state.put_state(&key, &bytes)?;
    Ok(bytes)
}
