use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Months, Utc};
use thiserror::Error;

use crate::db_types::BuyerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionVerb {
    PayOk,
    PayReject,
    SubOk,
    SubReject,
}

impl DecisionVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionVerb::PayOk => "pay_ok",
            DecisionVerb::PayReject => "pay_reject",
            DecisionVerb::SubOk => "sub_ok",
            DecisionVerb::SubReject => "sub_reject",
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Malformed decision token: {0}")]
pub struct MalformedToken(String);

/// The `{verb}:{entity_id}:{buyer_id}` payload carried by the administrator's decision buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionToken {
    pub verb: DecisionVerb,
    pub entity_id: i64,
    pub buyer_id: BuyerId,
}

impl DecisionToken {
    pub fn new(verb: DecisionVerb, entity_id: i64, buyer_id: BuyerId) -> Self {
        Self { verb, entity_id, buyer_id }
    }
}

impl Display for DecisionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.verb.as_str(), self.entity_id, self.buyer_id)
    }
}

impl FromStr for DecisionToken {
    type Err = MalformedToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.trim().split(':').collect::<Vec<&str>>();
        let [verb, entity, buyer] = parts.as_slice() else {
            return Err(MalformedToken(format!("expected 3 fields in '{s}'")));
        };
        let verb = match *verb {
            "pay_ok" => DecisionVerb::PayOk,
            "pay_reject" => DecisionVerb::PayReject,
            "sub_ok" => DecisionVerb::SubOk,
            "sub_reject" => DecisionVerb::SubReject,
            v => return Err(MalformedToken(format!("unknown verb '{v}'"))),
        };
        let entity_id = entity
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| MalformedToken(format!("invalid entity id '{entity}'")))?;
        let buyer_id = buyer.parse::<BuyerId>().map_err(|e| MalformedToken(e.to_string()))?;
        Ok(Self { verb, entity_id, buyer_id })
    }
}

/// One calendar month after `t`. Days past the end of the next month clamp to its last day, so 31 January becomes
/// 28 or 29 February.
pub fn one_month_after(t: DateTime<Utc>) -> DateTime<Utc> {
    t.checked_add_months(Months::new(1)).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
