//! Invocation parsing.
//!
//! Every supported function is a variant of [`Operation`]. Parsing checks the
//! argument count and validates every key argument, so a rejected invocation
//! never reaches the state.

use crate::error::{ContractError, Result};
use crate::keys::KeySpace;
use crate::types::{Card, CardItem, Research, User};

/// A parsed invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    InitLedger,
    QueryUser { key: String },
    QueryAllUsers,
    CreateUser { key: String, user: User },
    ChangeCardOwner { card_key: String, user_key: String },
    QueryAllCompanies,
    QueryAllResearches,
    CreateResearch { key: String, research: Research },
    Subscribe { research_key: String, user_key: String },
    QueryAllSubscribers,
    QuerySubscribersByResearch { research_key: String },
    CreateCard { key: String, card: Card },
    CreateCardItem { key: String, item: CardItem },
    QueryCardItemsByCard { card_key: String },
    QueryCardsByUser { user_key: String },
}

impl Operation {
    /// Every wire name, in declaration order.
    pub const NAMES: [&'static str; 15] = [
        "initLedger",
        "queryPerson",
        "queryPersons",
        "createCar",
        "changeCarOwner",
        "queryAllClinics",
        "queryAllResearches",
        "createResearch",
        "queryResearche",
        "getAllSubscribers",
        "getSubscribersByResearch",
        "createCard",
        "createCardItem",
        "queryCardItemByCARDID",
        "queryCardsByUser",
    ];

    /// Parse a function name and its arguments.
    pub fn parse(function: &str, args: &[String]) -> Result<Self> {
        let op = match function {
            "initLedger" => {
                arity("initLedger", args, 0)?;
                Operation::InitLedger
            }
            "queryPerson" => {
                arity("queryPerson", args, 1)?;
                Operation::QueryUser {
                    key: key_arg(KeySpace::User, &args[0])?,
                }
            }
            "queryPersons" => {
                arity("queryPersons", args, 0)?;
                Operation::QueryAllUsers
            }
            "createCar" => {
                arity("createCar", args, 5)?;
                Operation::CreateUser {
                    key: key_arg(KeySpace::User, &args[0])?,
                    user: User {
                        first_name: args[1].clone(),
                        last_name: args[2].clone(),
                        image_url: args[3].clone(),
                        hash: args[4].clone(),
                    },
                }
            }
            "changeCarOwner" => {
                arity("changeCarOwner", args, 2)?;
                Operation::ChangeCardOwner {
                    card_key: key_arg(KeySpace::Card, &args[0])?,
                    user_key: key_arg(KeySpace::User, &args[1])?,
                }
            }
            "queryAllClinics" => {
                arity("queryAllClinics", args, 0)?;
                Operation::QueryAllCompanies
            }
            "queryAllResearches" => {
                arity("queryAllResearches", args, 0)?;
                Operation::QueryAllResearches
            }
            "createResearch" => {
                arity("createResearch", args, 5)?;
                Operation::CreateResearch {
                    key: key_arg(KeySpace::Research, &args[0])?,
                    research: Research {
                        name: args[1].clone(),
                        status: args[2].clone(),
                        date_from: args[3].clone(),
                        date_to: args[4].clone(),
                    },
                }
            }
            "queryResearche" => {
                arity("queryResearche", args, 2)?;
                Operation::Subscribe {
                    research_key: key_arg(KeySpace::Research, &args[0])?,
                    user_key: key_arg(KeySpace::User, &args[1])?,
                }
            }
            "getAllSubscribers" => {
                arity("getAllSubscribers", args, 0)?;
                Operation::QueryAllSubscribers
            }
            "getSubscribersByResearch" => {
                arity("getSubscribersByResearch", args, 1)?;
                Operation::QuerySubscribersByResearch {
                    research_key: key_arg(KeySpace::Research, &args[0])?,
                }
            }
            "createCard" => {
                arity("createCard", args, 4)?;
                Operation::CreateCard {
                    key: key_arg(KeySpace::Card, &args[0])?,
                    card: Card {
                        user_id: key_arg(KeySpace::User, &args[1])?,
                        company_id: key_arg(KeySpace::Company, &args[2])?,
                        name: args[3].clone(),
                    },
                }
            }
            "createCardItem" => {
                arity("createCardItem", args, 6)?;
                Operation::CreateCardItem {
                    key: key_arg(KeySpace::CardItem, &args[0])?,
                    item: CardItem {
                        card_id: key_arg(KeySpace::Card, &args[1])?,
                        key: args[2].clone(),
                        value: args[3].clone(),
                        additional_data: args[4].clone(),
                        date: args[5].clone(),
                    },
                }
            }
            "queryCardItemByCARDID" => {
                arity("queryCardItemByCARDID", args, 1)?;
                Operation::QueryCardItemsByCard {
                    card_key: key_arg(KeySpace::Card, &args[0].to_uppercase())?,
                }
            }
            "queryCardsByUser" => {
                arity("queryCardsByUser", args, 1)?;
                Operation::QueryCardsByUser {
                    user_key: key_arg(KeySpace::User, &args[0])?,
                }
            }
            other => return Err(ContractError::UnknownOperation(other.to_string())),
        };
        Ok(op)
    }

    /// The wire name this operation was parsed from.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::InitLedger => "initLedger",
            Operation::QueryUser { .. } => "queryPerson",
            Operation::QueryAllUsers => "queryPersons",
            Operation::CreateUser { .. } => "createCar",
            Operation::ChangeCardOwner { .. } => "changeCarOwner",
            Operation::QueryAllCompanies => "queryAllClinics",
            Operation::QueryAllResearches => "queryAllResearches",
            Operation::CreateResearch { .. } => "createResearch",
            Operation::Subscribe { .. } => "queryResearche",
            Operation::QueryAllSubscribers => "getAllSubscribers",
            Operation::QuerySubscribersByResearch { .. } => "getSubscribersByResearch",
            Operation::CreateCard { .. } => "createCard",
            Operation::CreateCardItem { .. } => "createCardItem",
            Operation::QueryCardItemsByCard { .. } => "queryCardItemByCARDID",
            Operation::QueryCardsByUser { .. } => "queryCardsByUser",
        }
    }
}

fn arity(operation: &'static str, args: &[String], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(ContractError::ArityMismatch {
            operation,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn key_arg(space: KeySpace, key: &str) -> Result<String> {
    Ok(space.check(key)?.to_string())
}
