//! Integration tests for the card ledger contract.

use card_ledger::{
    CardItem, Contract, ContractConfig, EventFilter, LedgerEvent, MemoryState, ObservedContract,
    QueryAggregator, RelationIndex, ResearchUser, StateStore, SubscriptionConfig,
};
use serde_json::Value;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn seeded() -> (MemoryState, Contract) {
    init_tracing();
    let state = MemoryState::new();
    let contract = Contract::default();
    let response = contract.handle(&state, "initLedger", &[]);
    assert!(response.is_success(), "{}", response.message);
    (state, contract)
}

fn rows(payload: &[u8]) -> Vec<Value> {
    match serde_json::from_slice(payload).unwrap() {
        Value::Array(rows) => rows,
        other => panic!("expected array, got {}", other),
    }
}

// --- Seeded Ledger ---

#[test]
fn test_every_seeded_card_has_twenty_items() {
    let (state, contract) = seeded();

    for j in 0..20 {
        let card_key = format!("CARD{}", j);
        let response = contract.handle(&state, "queryCardItemByCARDID", &args(&[&card_key]));
        assert!(response.is_success());

        let rows = rows(&response.payload);
        assert_eq!(rows.len(), 20, "{}", card_key);

        let mut keys: Vec<String> = rows
            .iter()
            .map(|row| row["Key"].as_str().unwrap().to_string())
            .collect();
        let mut expected: Vec<String> =
            (0..20).map(|k| format!("CARDITEM{}", j * 20 + k)).collect();
        keys.sort();
        expected.sort();
        assert_eq!(keys, expected);

        for row in &rows {
            assert_eq!(row["Record"]["cardID"], card_key.as_str());
        }
    }

    assert_eq!(state.stats().open_cursors, 0);
}

#[test]
fn test_index_rows_equal_stored_records() {
    let (state, _) = seeded();

    let result = QueryAggregator::new(&state)
        .collect_by_index(RelationIndex::CardItemByCard.name(), &["CARD7"])
        .unwrap();
    assert_eq!(result.len(), 20);

    for entry in &result {
        let stored = state.get_state(&entry.key).unwrap().unwrap();
        assert_eq!(entry.record.as_deref(), Some(stored.as_slice()));

        let item: CardItem = serde_json::from_slice(&stored).unwrap();
        assert_eq!(item.card_id, "CARD7");
        assert_eq!(item.date, "2017.06.18");
    }
}

#[test]
fn test_lower_case_card_id_is_accepted() {
    let (state, contract) = seeded();

    let upper = contract.handle(&state, "queryCardItemByCARDID", &args(&["CARD3"]));
    let lower = contract.handle(&state, "queryCardItemByCARDID", &args(&["card3"]));
    assert_eq!(upper.payload, lower.payload);
}

#[test]
fn test_query_all_users_and_companies() {
    let (state, contract) = seeded();

    let users = rows(&contract.handle(&state, "queryPersons", &[]).payload);
    assert_eq!(users.len(), 6);
    assert_eq!(users[0]["Key"], "USER0");
    assert_eq!(users[0]["Record"]["firstName"], "Pavel");

    let companies = rows(&contract.handle(&state, "queryAllClinics", &[]).payload);
    assert_eq!(companies.len(), 18);
    assert!(companies
        .iter()
        .all(|row| row["Key"].as_str().unwrap().starts_with("COMPANY")));
}

#[test]
fn test_card_range_does_not_include_items() {
    let (state, _) = seeded();

    let cards = QueryAggregator::new(&state)
        .collect_key_space(card_ledger::KeySpace::Card)
        .unwrap();
    assert_eq!(cards.len(), 20);
    assert!(cards.keys().iter().all(|k| !k.starts_with("CARDITEM")));
}

#[test]
fn test_write_through_payload_shape() {
    let (state, contract) = seeded();

    let response = contract.handle(&state, "queryCardsByUser", &args(&["USER0"]));
    let text = String::from_utf8(response.payload).unwrap();
    assert!(text.starts_with("[{\"Key\":\"CARD"));
    assert!(text.contains(", \"Record\":{"));
    assert!(text.ends_with("}]"));
    assert_eq!(rows(text.as_bytes()).len(), 20);
}

#[test]
fn test_query_without_matches_is_empty_array() {
    let (state, contract) = seeded();

    let response = contract.handle(&state, "queryCardsByUser", &args(&["USER5"]));
    assert!(response.is_success());
    assert_eq!(response.payload, b"[]");
}

// --- Writes ---

#[test]
fn test_create_card_and_items() {
    let (state, contract) = seeded();

    contract
        .dispatch(&state, "createCard", &args(&["CARD100", "USER3", "COMPANY4", "Dental"]))
        .unwrap();
    for (i, value) in ["120/80", "118/79"].iter().enumerate() {
        let key = format!("CARDITEM{}", 900 + i);
        contract
            .dispatch(
                &state,
                "createCardItem",
                &args(&[&key, "CARD100", "pressure", value, "", "2018.01.01"]),
            )
            .unwrap();
    }

    let cards = rows(&contract.handle(&state, "queryCardsByUser", &args(&["USER3"])).payload);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["Record"]["companyID"], "COMPANY4");
    assert_eq!(cards[0]["Record"]["name"], "Dental");

    let response = contract.handle(&state, "queryCardItemByCARDID", &args(&["CARD100"]));
    let items = rows(&response.payload);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["Record"]["value"], "120/80");
    assert_eq!(items[1]["Record"]["aditionalData"], "");
}

#[test]
fn test_moving_an_item_between_cards() {
    let (state, contract) = seeded();

    contract
        .dispatch(
            &state,
            "createCardItem",
            &args(&["CARDITEM0", "CARD1", "k", "v", "a", "d"]),
        )
        .unwrap();

    let card0 = rows(&contract.handle(&state, "queryCardItemByCARDID", &args(&["CARD0"])).payload);
    let card1 = rows(&contract.handle(&state, "queryCardItemByCARDID", &args(&["CARD1"])).payload);
    assert_eq!(card0.len(), 19);
    assert_eq!(card1.len(), 21);
    assert!(card1.iter().any(|row| row["Key"] == "CARDITEM0"));
}

#[test]
fn test_research_subscription_flow() {
    let (state, contract) = seeded();

    contract
        .dispatch(
            &state,
            "createResearch",
            &args(&["RESEARCH1", "Trial", "Active", "2018.01.01", "2018.12.31"]),
        )
        .unwrap();

    let first = contract.handle(&state, "queryResearche", &args(&["RESEARCH1", "USER2"]));
    assert!(first.is_success(), "{}", first.message);
    let subscription: ResearchUser = serde_json::from_slice(&first.payload).unwrap();
    assert_eq!(subscription.user_id, "USER2");
    assert_eq!(subscription.research_id, "RESEARCH1");

    // Same pair again rewrites the same subscription.
    let again = contract.handle(&state, "queryResearche", &args(&["RESEARCH1", "USER2"]));
    assert_eq!(again.payload, first.payload);
    contract.handle(&state, "queryResearche", &args(&["RESEARCH1", "USER4"]));

    let by_research = rows(
        &contract
            .handle(&state, "getSubscribersByResearch", &args(&["RESEARCH1"]))
            .payload,
    );
    assert_eq!(by_research.len(), 2);

    let all = rows(&contract.handle(&state, "getAllSubscribers", &[]).payload);
    assert_eq!(all.len(), 2);

    let researches = rows(&contract.handle(&state, "queryAllResearches", &[]).payload);
    assert_eq!(researches.len(), 1);
    assert_eq!(researches[0]["Record"]["dateFrom"], "2018.01.01");
}

#[test]
fn test_subscription_requires_existing_records() {
    let (state, contract) = seeded();

    let response = contract.handle(&state, "queryResearche", &args(&["RESEARCH9", "USER0"]));
    assert!(!response.is_success());
    assert!(response.message.contains("RESEARCH9"));
}

// --- Events ---

#[test]
fn test_write_events_carry_touched_keys() {
    init_tracing();
    let state = MemoryState::new();
    let contract = ObservedContract::new(Contract::new(ContractConfig {
        seed_cards: 1,
        seed_items_per_card: 1,
        ..Default::default()
    }));
    let events = contract.subscribe(SubscriptionConfig::default());

    contract.dispatch(&state, "initLedger", &[]).unwrap();
    contract.dispatch(&state, "queryPersons", &[]).unwrap();
    contract
        .dispatch(&state, "changeCarOwner", &args(&["CARD0", "USER1"]))
        .unwrap();

    match events.recv_timeout(Duration::from_secs(1)).unwrap() {
        LedgerEvent::Written { operation, keys, .. } => {
            assert_eq!(operation, "initLedger");
            assert!(keys.contains(&"CARD0".to_string()));
            assert!(keys.contains(&"CARDITEM0".to_string()));
        }
        other => panic!("unexpected event {:?}", other),
    }

    // Queries are silent; the next event is the owner change.
    match events.recv_timeout(Duration::from_secs(1)).unwrap() {
        LedgerEvent::Written { operation, keys, .. } => {
            assert_eq!(operation, "changeCarOwner");
            // card record, old index entry, new index entry
            assert_eq!(keys.len(), 3);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(events.try_recv().is_err());
}

#[test]
fn test_filtered_subscription() {
    let (state, contract) = seeded();
    let contract = ObservedContract::from(contract);
    let events = contract.subscribe(SubscriptionConfig {
        filter: EventFilter::operations(["createResearch"]),
        ..Default::default()
    });

    contract
        .dispatch(&state, "createCar", &args(&["USER9", "A", "B", "", "h"]))
        .unwrap();
    contract
        .dispatch(&state, "createResearch", &args(&["RESEARCH2", "R", "Open", "", ""]))
        .unwrap();

    match events.recv_timeout(Duration::from_secs(1)).unwrap() {
        LedgerEvent::Written { operation, keys, .. } => {
            assert_eq!(operation, "createResearch");
            assert_eq!(keys, vec!["RESEARCH2".to_string()]);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(events.try_recv().is_err());
}
