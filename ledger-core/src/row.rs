//! Row mapping for the hosted tables
//!
//! `remboursement` columns: `id, from_user, to_user, montant, description,
//! status, created_at`. `from_user` is the debtor, `to_user` the creditor and
//! `status` a free-text literal: only `"remboursé"` marks a record as
//! settled, anything else (NULL included) reads as unpaid.
//!
//! `event` columns: `id, nom, dateDebut, heure, lieu`.

use crate::{
    events::{Event, EventDraft},
    types::{DebtDraft, DebtRecord, DebtStatus, MemberId, RecordId},
    Error, Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A full row as read back from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtRow {
    /// Primary key
    pub id: Uuid,
    /// Debtor
    pub from_user: String,
    /// Creditor
    pub to_user: String,
    /// Amount (`numeric` column, arrives as a JSON number or string)
    #[serde(deserialize_with = "montant::deserialize")]
    pub montant: Decimal,
    /// Free-text label
    #[serde(default)]
    pub description: Option<String>,
    /// Status literal
    #[serde(default)]
    pub status: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Payload of an insert; the store fills `id` and `created_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertRow {
    /// Debtor
    pub from_user: String,
    /// Creditor
    pub to_user: String,
    /// Amount
    pub montant: Decimal,
    /// Free-text label
    pub description: Option<String>,
    /// Status literal, always the unpaid one
    pub status: String,
}

/// Payload of the settle update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// New status literal
    pub status: String,
}

impl From<&DebtDraft> for InsertRow {
    fn from(draft: &DebtDraft) -> Self {
        Self {
            from_user: draft.debtor().to_string(),
            to_user: draft.creditor().to_string(),
            montant: draft.amount(),
            description: draft.description().map(str::to_string),
            status: DebtStatus::Unpaid.literal().to_string(),
        }
    }
}

impl StatusUpdate {
    /// Update that marks a record as settled
    pub fn settled() -> Self {
        Self {
            status: DebtStatus::Settled.literal().to_string(),
        }
    }
}

impl From<&DebtRecord> for DebtRow {
    fn from(record: &DebtRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            from_user: record.debtor.to_string(),
            to_user: record.creditor.to_string(),
            montant: record.amount,
            description: record.description.clone(),
            status: Some(record.status.literal().to_string()),
            created_at: record.created_at,
        }
    }
}

impl TryFrom<DebtRow> for DebtRecord {
    type Error = Error;

    fn try_from(row: DebtRow) -> Result<Self> {
        let status = stored_status(row.status.as_deref());

        let draft = DebtDraft::new(
            MemberId::new(row.from_user),
            MemberId::new(row.to_user),
            row.montant,
            row.description,
        )
        .map_err(|e| Error::Serialization(format!("Invalid row {}: {}", row.id, e)))?;

        let mut record = DebtRecord::from_draft(draft, RecordId::from_uuid(row.id), row.created_at);
        record.status = status;
        Ok(record)
    }
}

/// Status of a stored literal. Only the settled literal counts as settled.
fn stored_status(literal: Option<&str>) -> DebtStatus {
    match literal.and_then(DebtStatus::from_literal) {
        Some(DebtStatus::Settled) => DebtStatus::Settled,
        _ => DebtStatus::Unpaid,
    }
}

mod montant {
    use rust_decimal::Decimal;
    use serde::{de, Deserialize, Deserializer};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        };
        Decimal::from_str(&text).map_err(de::Error::custom)
    }
}

/// Decode a JSON array of rows.
///
/// Rows that break a record invariant are logged and skipped so that one bad
/// row does not hide the rest of a member's history.
pub fn records_from_json(json: &str) -> Result<Vec<DebtRecord>> {
    let rows: Vec<DebtRow> = serde_json::from_str(json)?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let id = row.id;
            match DebtRecord::try_from(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(row_id = %id, error = %e, "Skipping invalid row");
                    None
                }
            }
        })
        .collect())
}

/// Encode drafts as the JSON body of a bulk insert
pub fn insert_body(drafts: &[DebtDraft]) -> Result<String> {
    let rows: Vec<InsertRow> = drafts.iter().map(InsertRow::from).collect();
    Ok(serde_json::to_string(&rows)?)
}

/// Row filter selecting the records visible to `me`
pub fn visibility_filter(me: &MemberId) -> String {
    format!("from_user.eq.{me},to_user.eq.{me}")
}

/// A row of the `event` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    /// Primary key
    pub id: Uuid,
    /// Event name
    pub nom: String,
    /// Start date (ISO date)
    #[serde(rename = "dateDebut")]
    pub date_debut: NaiveDate,
    /// Start time as entered
    #[serde(default)]
    pub heure: Option<String>,
    /// Location
    #[serde(default)]
    pub lieu: Option<String>,
}

/// Payload of an event insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInsertRow {
    /// Event name
    pub nom: String,
    /// Start date
    #[serde(rename = "dateDebut")]
    pub date_debut: NaiveDate,
    /// Start time, empty when not given
    pub heure: String,
    /// Location
    pub lieu: String,
}

impl From<&EventDraft> for EventInsertRow {
    fn from(draft: &EventDraft) -> Self {
        Self {
            nom: draft.name().to_string(),
            date_debut: draft.starts_on(),
            heure: draft.time().unwrap_or_default().to_string(),
            lieu: draft.location().to_string(),
        }
    }
}

impl TryFrom<EventRow> for Event {
    type Error = Error;

    fn try_from(row: EventRow) -> Result<Self> {
        let draft = EventDraft::new(row.nom, row.date_debut, row.heure, row.lieu)
            .map_err(|e| Error::Serialization(format!("Invalid event row {}: {}", row.id, e)))?;
        Ok(Event::from_draft(draft, row.id))
    }
}

/// Decode a JSON array of event rows, skipping unnamed events
pub fn events_from_json(json: &str) -> Result<Vec<Event>> {
    let rows: Vec<EventRow> = serde_json::from_str(json)?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let id = row.id;
            Event::try_from(row)
                .map_err(|e| tracing::warn!(row_id = %id, error = %e, "Skipping invalid event row"))
                .ok()
        })
        .collect())
}

/// Encode a draft as the JSON body of an event insert
pub fn event_insert_body(draft: &EventDraft) -> Result<String> {
    Ok(serde_json::to_string(&[EventInsertRow::from(draft)])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_read_rows() {
        let json = r#"[
            {
                "id": "0190a5a4-8d3e-7cc1-9b51-3a2b1c0d9e8f",
                "from_user": "bob",
                "to_user": "alice",
                "montant": 12.5,
                "description": "Courses",
                "status": "remboursé",
                "created_at": "2025-02-01T18:30:00Z"
            },
            {
                "id": "0190a5a4-8d3e-7cc1-9b51-3a2b1c0d9e90",
                "from_user": "alice",
                "to_user": "carol",
                "montant": "7.20",
                "description": null,
                "status": null,
                "created_at": "2025-02-02T09:00:00+00:00"
            }
        ]"#;

        let records = records_from_json(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, DebtStatus::Settled);
        assert_eq!(records[0].amount, dec!(12.5));
        assert_eq!(records[0].debtor, MemberId::new("bob"));
        assert_eq!(records[1].status, DebtStatus::Unpaid);
        assert_eq!(records[1].amount, dec!(7.20));
        assert_eq!(records[1].description, None);
    }

    #[test]
    fn test_unknown_status_reads_as_unpaid() {
        assert_eq!(stored_status(Some("en attente")), DebtStatus::Unpaid);
        assert_eq!(stored_status(Some("")), DebtStatus::Unpaid);
        assert_eq!(stored_status(None), DebtStatus::Unpaid);
        assert_eq!(stored_status(Some("à payer")), DebtStatus::Unpaid);
        assert_eq!(stored_status(Some("remboursé")), DebtStatus::Settled);
    }

    #[test]
    fn test_invalid_rows_skipped() {
        let json = r#"[
            {
                "id": "0190a5a4-8d3e-7cc1-9b51-3a2b1c0d9e01",
                "from_user": "bob",
                "to_user": "alice",
                "montant": 3,
                "status": "à payer",
                "created_at": "2025-02-01T18:30:00Z"
            },
            {
                "id": "0190a5a4-8d3e-7cc1-9b51-3a2b1c0d9e02",
                "from_user": "carol",
                "to_user": "alice",
                "montant": "4.50",
                "status": "en attente",
                "created_at": "2025-02-01T19:30:00Z"
            },
            {
                "id": "0190a5a4-8d3e-7cc1-9b51-3a2b1c0d9e03",
                "from_user": "alice",
                "to_user": "alice",
                "montant": 3,
                "created_at": "2025-02-01T20:30:00Z"
            },
            {
                "id": "0190a5a4-8d3e-7cc1-9b51-3a2b1c0d9e04",
                "from_user": "dan",
                "to_user": "alice",
                "montant": 0,
                "created_at": "2025-02-01T21:30:00Z"
            }
        ]"#;

        let records = records_from_json(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].debtor, MemberId::new("bob"));
        assert_eq!(records[1].debtor, MemberId::new("carol"));
        assert!(records.iter().all(|r| r.status == DebtStatus::Unpaid));

        let balance = crate::Balance::compute(&MemberId::new("alice"), &records);
        assert_eq!(balance.owed_to_me, dec!(7.50));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = records_from_json("{\"not\": \"an array\"}").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_insert_body() {
        let draft = DebtDraft::new("bob".into(), "alice".into(), dec!(15.00), Some("split".into()))
            .unwrap();
        let body = insert_body(&[draft]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(value[0]["from_user"], "bob");
        assert_eq!(value[0]["to_user"], "alice");
        assert_eq!(value[0]["montant"], "15.00");
        assert_eq!(value[0]["status"], "à payer");
    }

    #[test]
    fn test_status_update_literal() {
        assert_eq!(StatusUpdate::settled().status, "remboursé");
    }

    #[test]
    fn test_read_event_rows() {
        let json = r#"[
            {
                "id": "0190a5a4-8d3e-7cc1-9b51-3a2b1c0d9e10",
                "nom": "Soirée jeux",
                "dateDebut": "2025-03-14",
                "heure": "20h",
                "lieu": ""
            },
            {
                "id": "0190a5a4-8d3e-7cc1-9b51-3a2b1c0d9e11",
                "nom": "  ",
                "dateDebut": "2025-03-15",
                "heure": null,
                "lieu": "Lyon"
            }
        ]"#;

        let events = events_from_json(json).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Soirée jeux");
        assert_eq!(events[0].starts_on, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(events[0].time.as_deref(), Some("20h"));
        assert_eq!(events[0].location, crate::events::DEFAULT_LOCATION);
    }

    #[test]
    fn test_event_insert_body() {
        let day = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
        let draft = EventDraft::new("Rando", day, None, Some("Annecy".into())).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&event_insert_body(&draft).unwrap()).unwrap();

        assert_eq!(value[0]["nom"], "Rando");
        assert_eq!(value[0]["dateDebut"], "2025-08-02");
        assert_eq!(value[0]["heure"], "");
        assert_eq!(value[0]["lieu"], "Annecy");
    }

    #[test]
    fn test_visibility_filter() {
        assert_eq!(
            visibility_filter(&MemberId::new("u-1")),
            "from_user.eq.u-1,to_user.eq.u-1"
        );
    }
}
