#![forbid(unsafe_code)]

//! Initial grudge lists read from JSON.
//!
//! A seed file is an array of records, newest first:
//!
//! ```json
//! [
//!   { "person": "Bo", "reason": "ate my lunch" },
//!   { "person": "Al", "reason": "parked badly", "forgiven": true }
//! ]
//! ```
//!
//! Ids are assigned so that the first record gets the highest id, matching
//! what a sequence of adds would have produced.

use serde::Deserialize;

use crate::grudge::{Grudge, GrudgeId, Grudges};

/// One record as written in a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedGrudge {
    pub person: String,
    pub reason: String,
    #[serde(default)]
    pub forgiven: bool,
}

/// Parse a JSON seed into a grudge list.
pub fn parse_seed(json: &str) -> serde_json::Result<Grudges> {
    let records: Vec<SeedGrudge> = serde_json::from_str(json)?;
    Ok(from_records(records))
}

/// Number seed records into a grudge list.
#[must_use]
pub fn from_records(records: Vec<SeedGrudge>) -> Grudges {
    let count = records.len() as u64;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| Grudge {
            id: GrudgeId(count - index as u64),
            person: record.person,
            reason: record.reason,
            forgiven: record.forgiven,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grudge::next_id;

    #[test]
    fn parses_records_newest_first() {
        let list = parse_seed(
            r#"[
                {"person": "Bo", "reason": "ate my lunch"},
                {"person": "Al", "reason": "parked badly", "forgiven": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, GrudgeId(2));
        assert_eq!(list[0].person, "Bo");
        assert!(!list[0].forgiven);
        assert_eq!(list[1].id, GrudgeId(1));
        assert!(list[1].forgiven);
        assert_eq!(next_id(&list), GrudgeId(3));
    }

    #[test]
    fn empty_array_is_empty_list() {
        assert!(parse_seed("[]").unwrap().is_empty());
    }

    #[test]
    fn missing_reason_is_an_error() {
        assert!(parse_seed(r#"[{"person": "Al"}]"#).is_err());
    }
}
