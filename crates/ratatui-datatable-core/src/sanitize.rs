//! Record de-duplication and schema validation.
//!
//! Every record handed to the table goes through [`Sanitizer::sanitize`] first:
//!
//! 1. a record without an `id` field gets a generated identity (kept on the [`Row`], not added
//!    to the record's fields),
//! 2. the first record to claim an identity wins, later ones are discarded,
//! 3. a record whose field keys differ from the schema keys is discarded.
//!
//! Discarded records are routine filtering, not errors; they only show up in `debug` traces.
use crate::record::Record;
use crate::record::RecordId;
use crate::record::Row;
use crate::schema::ColumnSchema;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;
use tracing::trace;
use uuid::Uuid;

/// How a record's field keys are compared with the schema keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyMatch {
    /// Same keys in the same order.
    #[default]
    Exact,
    /// Same key set in any order. Surviving records are reordered to schema order.
    AnyOrder,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sanitizer {
    pub key_match: KeyMatch,
}

impl Sanitizer {
    pub fn new(key_match: KeyMatch) -> Self {
        Self { key_match }
    }

    /// Returns the de-duplicated, schema-conformant rows of `records`, in input order.
    pub fn sanitize(&self, records: &[Record], schema: &ColumnSchema) -> Vec<Row> {
        self.sanitize_with_ids(records, schema, Uuid::new_v4)
    }

    /// Like [`Sanitizer::sanitize`], drawing identities for id-less records from `next_id`.
    pub fn sanitize_with_ids<F>(
        &self,
        records: &[Record],
        schema: &ColumnSchema,
        mut next_id: F,
    ) -> Vec<Row>
    where
        F: FnMut() -> Uuid,
    {
        let mut seen: HashSet<RecordId> = HashSet::with_capacity(records.len());
        let mut rows = Vec::with_capacity(records.len());
        let mut duplicates = 0usize;
        let mut malformed = 0usize;

        for (index, record) in records.iter().enumerate() {
            let id = record
                .explicit_id()
                .unwrap_or_else(|| RecordId::Generated(next_id()));
            if !seen.insert(id.clone()) {
                duplicates += 1;
                trace!(index, %id, "dropping duplicate record");
                continue;
            }
            match self.conform(record, schema) {
                Some(record) => rows.push(Row::new(id, record)),
                None => {
                    malformed += 1;
                    trace!(index, %id, "dropping record that does not match the columns");
                }
            }
        }

        if duplicates > 0 || malformed > 0 {
            debug!(
                kept = rows.len(),
                duplicates, malformed, "sanitized table records"
            );
        }
        rows
    }

    fn conform(&self, record: &Record, schema: &ColumnSchema) -> Option<Record> {
        if record.len() != schema.len() {
            return None;
        }
        match self.key_match {
            KeyMatch::Exact => record.keys().eq(schema.keys()).then(|| record.clone()),
            KeyMatch::AnyOrder => {
                if !record.keys().all(|k| schema.index_of(k).is_some()) {
                    return None;
                }
                schema
                    .keys()
                    .map(|k| record.get(k).map(|v| (k, v.clone())))
                    .collect()
            }
        }
    }
}

/// Sanitizes with exact key matching and random identities.
pub fn sanitize(records: &[Record], schema: &ColumnSchema) -> Vec<Row> {
    Sanitizer::default().sanitize(records, schema)
}
