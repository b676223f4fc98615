//! Row normalization: schema-free records in, typed columnar tables out.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::row::{is_reserved_column, DataRow};
use crate::table::{CellValue, Slot, Table, TableBuilder};
use crate::{FrameError, UtcDateTime};

/// Normalizes experiment data rows into one uniform [`Table`].
///
/// The column set is the union of every row's columns: the mandatory
/// identity/time columns first, then all custom columns in sorted order.
/// Rows missing a custom column receive [`CellValue::Absent`] there. The
/// identity columns are dictionary-encoded and the time columns parsed,
/// so the result is ready for analysis without further coercion.
///
/// A custom field that shadows a mandatory column name is a caller schema
/// error and is reported, never merged.
pub fn normalize(rows: &[DataRow]) -> Result<Table, FrameError> {
    if rows.is_empty() {
        return Ok(Table::empty());
    }

    let mut custom_columns = BTreeSet::new();
    for row in rows {
        for name in row.values.keys() {
            if is_reserved_column(name) {
                return Err(FrameError::ReservedColumn { name: name.clone() });
            }
            custom_columns.insert(name.clone());
        }
    }

    let mut builder = TableBuilder::with_rows(rows.len());

    builder.push_raw_column("id", rows.iter().map(|row| CellValue::Int(row.id)).collect());
    builder.push_categorical_column(
        "experiment_uuid",
        rows.iter()
            .map(|row| Slot::Value(row.experiment_uuid.hyphenated().to_string()))
            .collect(),
    );
    builder.push_categorical_column(
        "participant_id",
        rows.iter()
            .map(|row| Slot::Value(row.participant_id.clone()))
            .collect(),
    );
    builder.push_timestamp_column(
        "created_at",
        rows.iter().map(|row| Slot::Value(row.created_at)).collect(),
    );
    builder.push_timestamp_column(
        "updated_at",
        rows.iter().map(|row| Slot::Value(row.updated_at)).collect(),
    );

    for name in &custom_columns {
        let cells = rows
            .iter()
            .map(|row| match row.values.get(name) {
                Some(value) => CellValue::from_json(value),
                None => CellValue::Absent,
            })
            .collect();
        builder.push_raw_column(name.clone(), cells);
    }

    Ok(builder.finish())
}

/// Builds a [`Table`] from arbitrary JSON object records.
///
/// Columns named in `timestamp_columns` are parsed into timestamps and
/// columns named in `categorical_columns` are dictionary-encoded; all
/// other columns keep their source type. Used by the list endpoints whose
/// records carry a fixed, non-dynamic shape.
pub fn records_to_table(
    records: &[Map<String, Value>],
    timestamp_columns: &[&str],
    categorical_columns: &[&str],
) -> Result<Table, FrameError> {
    if records.is_empty() {
        return Ok(Table::empty());
    }

    let mut columns = BTreeSet::new();
    for record in records {
        for name in record.keys() {
            columns.insert(name.clone());
        }
    }

    let mut builder = TableBuilder::with_rows(records.len());

    for name in &columns {
        if timestamp_columns.contains(&name.as_str()) {
            let mut slots = Vec::with_capacity(records.len());
            for record in records {
                slots.push(timestamp_slot(name, record.get(name))?);
            }
            builder.push_timestamp_column(name.clone(), slots);
        } else if categorical_columns.contains(&name.as_str()) {
            let values = records
                .iter()
                .map(|record| categorical_slot(record.get(name)))
                .collect();
            builder.push_categorical_column(name.clone(), values);
        } else {
            let cells = records
                .iter()
                .map(|record| match record.get(name) {
                    Some(value) => CellValue::from_json(value),
                    None => CellValue::Absent,
                })
                .collect();
            builder.push_raw_column(name.clone(), cells);
        }
    }

    Ok(builder.finish())
}

fn timestamp_slot(column: &str, value: Option<&Value>) -> Result<Slot<UtcDateTime>, FrameError> {
    match value {
        None => Ok(Slot::Absent),
        Some(Value::Null) => Ok(Slot::Null),
        Some(Value::String(text)) => UtcDateTime::parse(text).map(Slot::Value).map_err(|_| {
            FrameError::InvalidTimestamp {
                column: column.to_owned(),
                value: text.clone(),
            }
        }),
        Some(other) => Err(FrameError::InvalidTimestamp {
            column: column.to_owned(),
            value: other.to_string(),
        }),
    }
}

fn categorical_slot(value: Option<&Value>) -> Slot<String> {
    match value {
        None => Slot::Absent,
        Some(Value::Null) => Slot::Null,
        Some(Value::String(text)) => Slot::Value(text.clone()),
        Some(other) => Slot::Value(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnType;
    use serde_json::json;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn sample_row(id: i64, participant: &str, values: BTreeMap<String, Value>) -> DataRow {
        DataRow {
            id,
            experiment_uuid: Uuid::parse_str("0192a0c6-2f2b-7e8e-b9d1-54a1c8d2e9aa")
                .expect("valid uuid"),
            participant_id: participant.to_owned(),
            created_at: UtcDateTime::parse("2024-03-01T09:00:00Z").expect("timestamp"),
            updated_at: UtcDateTime::parse("2024-03-01T09:05:00Z").expect("timestamp"),
            values,
        }
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = normalize(&[]).expect("empty input is not an error");
        assert!(table.is_empty());
        assert!(table.column_names().is_empty());
    }

    #[test]
    fn disjoint_custom_schemas_union_with_absence_markers() {
        let row_a = sample_row(
            1,
            "SUBJ-001",
            BTreeMap::from([(String::from("reaction_time"), json!(0.42))]),
        );
        let row_b = sample_row(
            2,
            "SUBJ-002",
            BTreeMap::from([(String::from("accuracy"), json!(0.91))]),
        );

        let table = normalize(&[row_a, row_b]).expect("rows should normalize");

        assert_eq!(
            table.column_names(),
            [
                "id",
                "experiment_uuid",
                "participant_id",
                "created_at",
                "updated_at",
                "accuracy",
                "reaction_time",
            ]
        );
        assert_eq!(table.cell(0, "reaction_time"), Some(CellValue::Float(0.42)));
        assert_eq!(table.cell(0, "accuracy"), Some(CellValue::Absent));
        assert_eq!(table.cell(1, "accuracy"), Some(CellValue::Float(0.91)));
        assert_eq!(table.cell(1, "reaction_time"), Some(CellValue::Absent));
    }

    #[test]
    fn explicit_null_is_not_the_absence_marker() {
        let row_a = sample_row(
            1,
            "SUBJ-001",
            BTreeMap::from([(String::from("accuracy"), Value::Null)]),
        );
        let row_b = sample_row(2, "SUBJ-002", BTreeMap::new());

        let table = normalize(&[row_a, row_b]).expect("rows should normalize");

        assert_eq!(table.cell(0, "accuracy"), Some(CellValue::Null));
        assert_eq!(table.cell(1, "accuracy"), Some(CellValue::Absent));
    }

    #[test]
    fn reserved_column_collision_is_reported_not_merged() {
        let row = sample_row(
            1,
            "SUBJ-001",
            BTreeMap::from([(String::from("Participant_ID"), json!("shadow"))]),
        );

        let err = normalize(&[row]).expect_err("collision must be a schema error");
        assert!(matches!(err, FrameError::ReservedColumn { .. }));
    }

    #[test]
    fn identity_columns_are_categorical_and_uuid_is_canonical_text() {
        let row = sample_row(1, "SUBJ-001", BTreeMap::new());
        let table = normalize(&[row]).expect("row should normalize");

        let uuid_column = table.column("experiment_uuid").expect("column exists");
        assert_eq!(uuid_column.column_type(), ColumnType::Categorical);
        assert_eq!(
            uuid_column.cell(0),
            Some(CellValue::Text(String::from(
                "0192a0c6-2f2b-7e8e-b9d1-54a1c8d2e9aa"
            )))
        );

        let created = table.column("created_at").expect("column exists");
        assert_eq!(created.column_type(), ColumnType::Timestamp);
    }

    #[test]
    fn records_table_parses_declared_timestamp_columns() {
        let records: Vec<Map<String, Value>> = vec![
            serde_json::from_value(json!({
                "id": 1,
                "name": "memory",
                "created_at": "2024-03-01T09:00:00Z",
                "updated_at": "2024-03-01T09:00:00Z"
            }))
            .expect("record"),
            serde_json::from_value(json!({
                "id": 2,
                "name": "vision",
                "created_at": "2024-03-02T09:00:00Z",
                "updated_at": null
            }))
            .expect("record"),
        ];

        let table = records_to_table(&records, &["created_at", "updated_at"], &[])
            .expect("records should normalize");

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column("created_at").expect("column").column_type(),
            ColumnType::Timestamp
        );
        assert_eq!(table.cell(1, "updated_at"), Some(CellValue::Null));
        assert_eq!(table.cell(0, "name"), Some(CellValue::Text(String::from("memory"))));
    }

    #[test]
    fn records_table_rejects_unparseable_timestamp() {
        let records: Vec<Map<String, Value>> =
            vec![serde_json::from_value(json!({ "created_at": "yesterday" })).expect("record")];

        let err = records_to_table(&records, &["created_at"], &[]).expect_err("must fail");
        assert!(matches!(err, FrameError::InvalidTimestamp { .. }));
    }
}
