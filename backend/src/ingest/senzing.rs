//! Senzing JSON-lines adapter
//!
//! Two inputs, one JSON object per line:
//!
//! - datasets loaded into Senzing (`RECORD_ID`, `RECORD_TYPE`, names,
//!   addresses, countries in several alternative shapes)
//! - the entity resolution export (`RESOLVED_ENTITY`, `RELATED_ENTITIES`)
//!
//! Blank lines are skipped. Line numbers in errors are 1-based.

use super::IngestError;
use crate::graph::{RelatedEntity, ResolutionGroup, ResolvedMember};
use crate::models::{Record, RecordType};
use crate::text::{scrub_field, scrub_text};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::BufRead;

const COUNTRY_KEYS: [&str; 3] = ["CITIZENSHIP", "NATIONALITY", "REGISTRATION_COUNTRY"];

// ============================================================================
// Datasets
// ============================================================================

/// Parse one dataset line into a record
pub fn parse_record_line(line: &str, line_no: usize) -> Result<Record, IngestError> {
    let dat: Map<String, Value> =
        serde_json::from_str(line).map_err(|source| IngestError::Json { line: line_no, source })?;

    let id = string_field(&dat, "RECORD_ID").ok_or(IngestError::MissingField {
        line: line_no,
        field: "RECORD_ID",
    })?;

    let raw_type = dat
        .get("RECORD_TYPE")
        .and_then(Value::as_str)
        .ok_or(IngestError::MissingField {
            line: line_no,
            field: "RECORD_TYPE",
        })?;
    let record_type = RecordType::parse(raw_type)?;

    let name = extract_name(&dat).unwrap_or_default();
    let address = extract_addr(&dat);
    let country = extract_country(&dat);

    Ok(Record::new(id, record_type, name, address, country)?)
}

/// Read every record from a dataset stream
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<Record>, IngestError> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_record_line(&line, i + 1)?);
    }
    Ok(records)
}

/// Primary name, scrubbed; `None` when absent or a placeholder
fn extract_name(dat: &Map<String, Value>) -> Option<String> {
    if let Some(name) = dat.get("PRIMARY_NAME_FULL").and_then(Value::as_str) {
        return scrub_field(Some(name));
    }

    let names = dat.get("NAMES")?.as_array()?;
    let name = names.iter().filter_map(Value::as_object).find_map(|rec| {
        if rec.get("NAME_TYPE").and_then(Value::as_str) == Some("PRIMARY") {
            rec.get("NAME_FULL")
                .or_else(|| rec.get("NAME_ORG"))
                .and_then(Value::as_str)
        } else {
            rec.get("PRIMARY_NAME_ORG").and_then(Value::as_str)
        }
    });

    scrub_field(name)
}

/// First full address, scrubbed
fn extract_addr(dat: &Map<String, Value>) -> Option<String> {
    let addr = dat
        .get("ADDRESSES")?
        .as_array()?
        .iter()
        .find_map(|rec| rec.get("ADDR_FULL").and_then(Value::as_str));

    scrub_field(addr)
}

/// Country code from the first source key present on the record
///
/// Only one source is consulted: a record carrying `COUNTRIES` without a
/// usable entry does not fall through to `ADDRESSES`. Within a list, the
/// last entry holding a matching key wins.
fn extract_country(dat: &Map<String, Value>) -> Option<String> {
    let raw = if let Some(value) = dat.get("REGISTRATION_COUNTRY") {
        value.as_str()
    } else if dat.contains_key("COUNTRIES") {
        last_in_list(dat, "COUNTRIES", &COUNTRY_KEYS)
    } else if dat.contains_key("ADDRESSES") {
        last_in_list(dat, "ADDRESSES", &["ADDR_COUNTRY"])
    } else if dat.contains_key("ATTRIBUTES") {
        last_in_list(dat, "ATTRIBUTES", &["NATIONALITY"])
    } else {
        None
    };

    let code = raw?.trim().to_uppercase();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

/// Value under the first of `keys` found in the last matching object of a list
fn last_in_list<'a>(dat: &'a Map<String, Value>, list: &str, keys: &[&str]) -> Option<&'a str> {
    dat.get(list)?.as_array()?.iter().rev().find_map(|rec| {
        keys.iter()
            .find_map(|key| rec.get(*key).and_then(Value::as_str))
    })
}

/// String field that may be encoded as a JSON string or number
fn string_field(dat: &Map<String, Value>, key: &str) -> Option<String> {
    match dat.get(key)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// ER export
// ============================================================================

#[derive(Debug, Deserialize)]
struct ExportLine {
    #[serde(rename = "RESOLVED_ENTITY")]
    resolved_entity: ExportEntity,

    #[serde(rename = "RELATED_ENTITIES", default)]
    related_entities: Vec<ExportRelated>,
}

#[derive(Debug, Deserialize)]
struct ExportEntity {
    #[serde(rename = "ENTITY_ID")]
    entity_id: Value,

    #[serde(rename = "RECORDS", default)]
    records: Vec<ExportRecord>,
}

#[derive(Debug, Deserialize)]
struct ExportRecord {
    #[serde(rename = "RECORD_ID")]
    record_id: Value,

    #[serde(rename = "MATCH_KEY", default)]
    match_key: String,

    #[serde(rename = "MATCH_LEVEL", default)]
    match_level: u8,

    #[serde(rename = "ENTITY_DESC", default)]
    entity_desc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExportRelated {
    #[serde(rename = "ENTITY_ID")]
    entity_id: Value,

    #[serde(rename = "MATCH_KEY", default)]
    match_key: String,

    #[serde(rename = "MATCH_LEVEL", default)]
    match_level: u8,
}

/// Parse one ER export line into a resolution group
pub fn parse_export_line(line: &str, line_no: usize) -> Result<ResolutionGroup, IngestError> {
    let dat: ExportLine =
        serde_json::from_str(line).map_err(|source| IngestError::Json { line: line_no, source })?;

    let resolved_entity_id = id_string(&dat.resolved_entity.entity_id).ok_or(IngestError::MissingField {
        line: line_no,
        field: "RESOLVED_ENTITY.ENTITY_ID",
    })?;

    let members = dat
        .resolved_entity
        .records
        .into_iter()
        .map(|rec| {
            let record_id = id_string(&rec.record_id).ok_or(IngestError::MissingField {
                line: line_no,
                field: "RECORDS.RECORD_ID",
            })?;
            Ok(ResolvedMember {
                record_id,
                match_key: rec.match_key,
                match_level: rec.match_level,
                description: rec.entity_desc.map(|d| scrub_text(&d)),
            })
        })
        .collect::<Result<Vec<_>, IngestError>>()?;

    let related = dat
        .related_entities
        .into_iter()
        .map(|rel| {
            let entity_id = id_string(&rel.entity_id).ok_or(IngestError::MissingField {
                line: line_no,
                field: "RELATED_ENTITIES.ENTITY_ID",
            })?;
            Ok(RelatedEntity {
                entity_id,
                match_key: rel.match_key,
                match_level: rel.match_level,
            })
        })
        .collect::<Result<Vec<_>, IngestError>>()?;

    Ok(ResolutionGroup {
        resolved_entity_id,
        members,
        related,
    })
}

/// Read every resolution group from an ER export stream
pub fn read_export<R: BufRead>(reader: R) -> Result<Vec<ResolutionGroup>, IngestError> {
    let mut groups = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        groups.push(parse_export_line(&line, i + 1)?);
    }
    Ok(groups)
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
