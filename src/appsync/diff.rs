// backendtool/src/appsync/diff.rs
use aws_sdk_dynamodb::types::TableDescription;
use serde::{Deserialize, Serialize};

/// Placeholder written into dressed backend info in place of account-specific
/// role ARNs.
pub const MANAGED_BY_TOOL: &str = "managed-by-backendtool";

pub const DEFAULT_READ_CAPACITY_UNITS: i64 = 5;
pub const DEFAULT_WRITE_CAPACITY_UNITS: i64 = 5;

/// Local shape of a DynamoDB table spec. Volatile remote fields (status,
/// timestamps, sizes, counts, ARNs, ids) have no place here, so dressing a
/// remote description into this form drops them by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    pub table_name: String,
    #[serde(default)]
    pub attribute_definitions: Vec<AttributeSpec>,
    #[serde(default)]
    pub key_schema: Vec<KeySpec>,
    #[serde(default = "default_read_capacity")]
    pub read_capacity_units: i64,
    #[serde(default = "default_write_capacity")]
    pub write_capacity_units: i64,
}

fn default_read_capacity() -> i64 {
    DEFAULT_READ_CAPACITY_UNITS
}

fn default_write_capacity() -> i64 {
    DEFAULT_WRITE_CAPACITY_UNITS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSpec {
    pub attribute_name: String,
    pub attribute_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySpec {
    pub attribute_name: String,
    pub key_type: String,
}

/// Outcome of comparing a local spec against the remote state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMark {
    Create,
    Update,
    Delete,
    None,
}

pub fn diff_table(local: Option<&TableSpec>, remote: Option<&TableSpec>) -> DiffMark {
    match (local, remote) {
        (Some(_), None) => DiffMark::Create,
        (Some(local), Some(remote)) if local == remote => DiffMark::None,
        (Some(_), Some(_)) => DiffMark::Update,
        (None, Some(_)) => DiffMark::Delete,
        (None, None) => DiffMark::None,
    }
}

/// Pairs every table named on either side with its diff mark. The returned
/// spec is the local one where present, otherwise the remote one (for
/// `Delete` marks).
pub fn diff_tables(local: &[TableSpec], remote: &[TableSpec]) -> Vec<(DiffMark, TableSpec)> {
    let mut result = Vec::new();

    for local_spec in local {
        let remote_spec = remote.iter().find(|r| r.table_name == local_spec.table_name);
        result.push((diff_table(Some(local_spec), remote_spec), local_spec.clone()));
    }
    for remote_spec in remote {
        if !local.iter().any(|l| l.table_name == remote_spec.table_name) {
            result.push((DiffMark::Delete, remote_spec.clone()));
        }
    }

    result
}

/// Reduces a remote table description to the local spec shape.
pub fn dress_table(description: &TableDescription) -> TableSpec {
    let attribute_definitions = description
        .attribute_definitions()
        .iter()
        .map(|attr| AttributeSpec {
            attribute_name: attr.attribute_name().to_string(),
            attribute_type: attr.attribute_type().as_str().to_string(),
        })
        .collect();

    let key_schema = description
        .key_schema()
        .iter()
        .map(|key| KeySpec {
            attribute_name: key.attribute_name().to_string(),
            key_type: key.key_type().as_str().to_string(),
        })
        .collect();

    let read_capacity_units = description
        .provisioned_throughput()
        .and_then(|t| t.read_capacity_units())
        .unwrap_or(DEFAULT_READ_CAPACITY_UNITS);
    let write_capacity_units = description
        .provisioned_throughput()
        .and_then(|t| t.write_capacity_units())
        .unwrap_or(DEFAULT_WRITE_CAPACITY_UNITS);

    TableSpec {
        table_name: description.table_name().unwrap_or_default().to_string(),
        attribute_definitions,
        key_schema,
        read_capacity_units,
        write_capacity_units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec(name: &str) -> TableSpec {
        TableSpec {
            table_name: name.to_string(),
            attribute_definitions: vec![AttributeSpec {
                attribute_name: "id".to_string(),
                attribute_type: "S".to_string(),
            }],
            key_schema: vec![KeySpec {
                attribute_name: "id".to_string(),
                key_type: "HASH".to_string(),
            }],
            read_capacity_units: 5,
            write_capacity_units: 5,
        }
    }

    #[test]
    fn test_diff_table_create() {
        let local = sample_spec("posts");
        assert_eq!(diff_table(Some(&local), None), DiffMark::Create);
    }

    #[test]
    fn test_diff_table_none_when_equal() {
        let local = sample_spec("posts");
        let remote = sample_spec("posts");
        assert_eq!(diff_table(Some(&local), Some(&remote)), DiffMark::None);
    }

    #[test]
    fn test_diff_table_update_on_field_change() {
        let local = sample_spec("posts");
        let mut remote = sample_spec("posts");
        remote.write_capacity_units = 10;
        assert_eq!(diff_table(Some(&local), Some(&remote)), DiffMark::Update);
    }

    #[test]
    fn test_diff_table_delete() {
        let remote = sample_spec("posts");
        assert_eq!(diff_table(None, Some(&remote)), DiffMark::Delete);
    }

    #[test]
    fn test_diff_tables_covers_both_sides() {
        let local = vec![sample_spec("posts"), sample_spec("comments")];
        let mut changed = sample_spec("comments");
        changed.read_capacity_units = 25;
        let remote = vec![changed, sample_spec("orphans")];

        let marks = diff_tables(&local, &remote);
        assert_eq!(marks.len(), 3);
        assert!(
            marks
                .iter()
                .any(|(m, s)| *m == DiffMark::Create && s.table_name == "posts")
        );
        assert!(
            marks
                .iter()
                .any(|(m, s)| *m == DiffMark::Update && s.table_name == "comments")
        );
        assert!(
            marks
                .iter()
                .any(|(m, s)| *m == DiffMark::Delete && s.table_name == "orphans")
        );
    }

    #[test]
    fn test_table_spec_yaml_round_trip() -> anyhow::Result<()> {
        let spec = sample_spec("posts");
        let yaml = serde_yaml::to_string(&spec)?;
        assert!(yaml.contains("tableName: posts"));
        let parsed: TableSpec = serde_yaml::from_str(&yaml)?;
        assert_eq!(parsed, spec);
        Ok(())
    }
}
