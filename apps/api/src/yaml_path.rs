//! Dotted-path access into untyped YAML documents.
//!
//! A path such as `workExperience.0.bubbles.1` is split on `.`; segments made
//! only of digits index into sequences, every other segment is a mapping key.
//! Updates always go through the whole document: parse, [`set`] once,
//! re-serialize. Comments and custom formatting do not survive the round trip.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// How many null slots [`set`] will insert to reach an index past the end.
pub const MAX_SEQUENCE_GAP: usize = 1024;

#[derive(Debug, Error)]
pub enum YamlPathError {
    #[error("YAML path is empty")]
    EmptyPath,

    #[error("Expected a sequence at segment '{segment}' of path '{path}'")]
    ExpectedSequence { path: String, segment: String },

    #[error("Expected a mapping at segment '{segment}' of path '{path}'")]
    ExpectedMapping { path: String, segment: String },

    #[error("Index {segment} in path '{path}' is too far past the end of a sequence of length {len}")]
    IndexOutOfRange {
        path: String,
        segment: String,
        len: usize,
    },

    #[error("Failed to parse YAML: {0}")]
    Parse(serde_yaml::Error),

    #[error("Failed to serialize YAML: {0}")]
    Serialize(serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    fn as_text(&self) -> String {
        match self {
            Segment::Key(k) => k.clone(),
            Segment::Index(i) => i.to_string(),
        }
    }
}

pub fn parse_path(path: &str) -> Vec<Segment> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split('.')
        .map(|raw| {
            let numeric = !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit());
            match raw.parse::<usize>() {
                Ok(index) if numeric => Segment::Index(index),
                _ => Segment::Key(raw.to_string()),
            }
        })
        .collect()
}

/// Value at `path`, or `None` as soon as a segment is missing or lands on the
/// wrong kind of node. The empty path addresses the document root.
pub fn get<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    parse_path(path)
        .iter()
        .try_fold(doc, |current, segment| match segment {
            Segment::Index(i) => current.as_sequence()?.get(*i),
            Segment::Key(k) => current.as_mapping()?.get(k.as_str()),
        })
}

/// Assigns `value` at `path`, creating missing intermediate containers: a
/// sequence when the following segment is numeric, a mapping otherwise.
/// Sequences are padded with nulls up to the target index, at most
/// [`MAX_SEQUENCE_GAP`] slots past their current end.
pub fn set(doc: &mut Value, path: &str, value: Value) -> Result<(), YamlPathError> {
    let segments = parse_path(path);
    let (last, _) = segments.split_last().ok_or(YamlPathError::EmptyPath)?;

    if doc.is_null() {
        *doc = empty_container_for(&segments[0]);
    }

    let mut current = doc;
    for pair in segments.windows(2) {
        current = child_mut(current, &pair[0], &pair[1], path)?;
    }

    match last {
        Segment::Index(i) => {
            let seq = current
                .as_sequence_mut()
                .ok_or_else(|| expected_sequence(path, last))?;
            pad_to(seq, *i, path, last)?;
            seq[*i] = value;
        }
        Segment::Key(k) => {
            let map = current
                .as_mapping_mut()
                .ok_or_else(|| expected_mapping(path, last))?;
            map.insert(Value::String(k.clone()), value);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patched {
    /// The whole document, re-serialized.
    pub yaml: String,
    /// What was at the path before the update.
    pub previous: Option<Value>,
}

/// Parses `text`, sets one value and re-serializes the whole document.
/// Blank input is treated as an empty document.
pub fn patch_document(text: &str, path: &str, value: Value) -> Result<Patched, YamlPathError> {
    let mut doc = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(text).map_err(YamlPathError::Parse)?
    };
    let previous = get(&doc, path).cloned();
    set(&mut doc, path, value)?;
    let yaml = serde_yaml::to_string(&doc).map_err(YamlPathError::Serialize)?;
    Ok(Patched { yaml, previous })
}

fn child_mut<'a>(
    current: &'a mut Value,
    segment: &Segment,
    next: &Segment,
    path: &str,
) -> Result<&'a mut Value, YamlPathError> {
    let slot = match segment {
        Segment::Index(i) => {
            let seq = current
                .as_sequence_mut()
                .ok_or_else(|| expected_sequence(path, segment))?;
            pad_to(seq, *i, path, segment)?;
            &mut seq[*i]
        }
        Segment::Key(k) => {
            let map = current
                .as_mapping_mut()
                .ok_or_else(|| expected_mapping(path, segment))?;
            if !map.contains_key(k.as_str()) {
                map.insert(Value::String(k.clone()), Value::Null);
            }
            map.get_mut(k.as_str())
                .ok_or_else(|| expected_mapping(path, segment))?
        }
    };

    if slot.is_null() {
        *slot = empty_container_for(next);
    }
    Ok(slot)
}

fn empty_container_for(next: &Segment) -> Value {
    match next {
        Segment::Index(_) => Value::Sequence(Vec::new()),
        Segment::Key(_) => Value::Mapping(Mapping::new()),
    }
}

fn pad_to(
    seq: &mut Vec<Value>,
    index: usize,
    path: &str,
    segment: &Segment,
) -> Result<(), YamlPathError> {
    if index < seq.len() {
        return Ok(());
    }
    let new_len = index
        .checked_add(1)
        .filter(|_| index - seq.len() <= MAX_SEQUENCE_GAP)
        .ok_or_else(|| YamlPathError::IndexOutOfRange {
            path: path.to_string(),
            segment: segment.as_text(),
            len: seq.len(),
        })?;
    seq.resize(new_len, Value::Null);
    Ok(())
}

fn expected_sequence(path: &str, segment: &Segment) -> YamlPathError {
    YamlPathError::ExpectedSequence {
        path: path.to_string(),
        segment: segment.as_text(),
    }
}

fn expected_mapping(path: &str, segment: &Segment) -> YamlPathError {
    YamlPathError::ExpectedMapping {
        path: path.to_string(),
        segment: segment.as_text(),
    }
}

/// Converts a YAML tree into JSON. Non-string mapping keys are stringified
/// and non-finite floats become null.
pub fn yaml_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::from(i)
            } else if let Some(u) = n.as_u64() {
                serde_json::Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            }
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => serde_json::Value::Array(items.iter().map(yaml_to_json).collect()),
        Value::Mapping(map) => {
            let object = map
                .iter()
                .map(|(k, v)| (key_to_string(k), yaml_to_json(v)))
                .collect::<serde_json::Map<_, _>>();
            serde_json::Value::Object(object)
        }
        Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

/// Converts a JSON request value into a YAML node.
pub fn json_to_yaml(value: &serde_json::Value) -> Result<Value, YamlPathError> {
    serde_yaml::to_value(value).map_err(YamlPathError::Serialize)
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_parse_path_segments() {
        assert_eq!(
            parse_path("workExperience.0.bubbles.12"),
            vec![
                Segment::Key("workExperience".to_string()),
                Segment::Index(0),
                Segment::Key("bubbles".to_string()),
                Segment::Index(12),
            ]
        );
        assert_eq!(parse_path("a.-1"), vec![Segment::Key("a".into()), Segment::Key("-1".into())]);
        assert!(parse_path("").is_empty());
    }

    #[test]
    fn test_get_nested() {
        let doc = yaml("workExperience:\n  - company: Acme\n    bubbles: [Rust, Go]\n");
        assert_eq!(
            get(&doc, "workExperience.0.bubbles.1"),
            Some(&Value::String("Go".to_string()))
        );
        assert_eq!(
            get(&doc, "workExperience.0.company").and_then(Value::as_str),
            Some("Acme")
        );
    }

    #[test]
    fn test_get_missing_or_wrong_shape() {
        let doc = yaml("name: Ada\nskills: [Rust]\n");
        assert!(get(&doc, "skills.3").is_none());
        assert!(get(&doc, "name.first").is_none());
        assert!(get(&doc, "skills.lang").is_none());
        assert!(get(&doc, "missing.0").is_none());
    }

    #[test]
    fn test_set_vivifies_sequence_then_mapping() {
        let mut doc = Value::Mapping(Mapping::new());
        set(&mut doc, "a.0.b", Value::from("v")).unwrap();
        assert_eq!(doc, yaml("a:\n  - b: v\n"));
    }

    #[test]
    fn test_set_on_empty_document() {
        let mut doc = Value::Null;
        set(&mut doc, "profile.name", Value::from("Ada")).unwrap();
        assert_eq!(doc, yaml("profile:\n  name: Ada\n"));
    }

    #[test]
    fn test_set_pads_sequence() {
        let mut doc = yaml("skills: [Rust]\n");
        set(&mut doc, "skills.2", Value::from("Go")).unwrap();
        assert_eq!(doc, yaml("skills: [Rust, null, Go]\n"));
    }

    #[test]
    fn test_set_rejects_index_far_past_end() {
        let mut doc = yaml("skills: [Rust]\n");
        let err = set(&mut doc, "skills.10000000000", Value::from("Go")).unwrap_err();
        assert!(matches!(err, YamlPathError::IndexOutOfRange { len: 1, .. }));
        assert_eq!(doc, yaml("skills: [Rust]\n"));

        let err = set(&mut doc, "work.5000.role", Value::from("x")).unwrap_err();
        assert!(matches!(err, YamlPathError::IndexOutOfRange { len: 0, .. }));
    }

    #[test]
    fn test_set_max_index_does_not_overflow() {
        let path = format!("skills.{}", usize::MAX);
        let err = patch_document("skills: [Rust]\n", &path, Value::from("Go")).unwrap_err();
        assert!(matches!(err, YamlPathError::IndexOutOfRange { .. }));
    }

    #[test]
    fn test_set_allows_gap_up_to_limit() {
        let mut doc = yaml("skills: []\n");
        let path = format!("skills.{MAX_SEQUENCE_GAP}");
        set(&mut doc, &path, Value::from("Go")).unwrap();
        assert_eq!(get(&doc, &path), Some(&Value::from("Go")));
    }

    #[test]
    fn test_set_leaves_siblings_untouched() {
        let mut doc = yaml("name: Ada\nwork:\n  - company: Acme\n    role: Eng\n  - company: Initech\n");
        set(&mut doc, "work.0.role", Value::from("Staff Eng")).unwrap();
        assert_eq!(
            doc,
            yaml("name: Ada\nwork:\n  - company: Acme\n    role: Staff Eng\n  - company: Initech\n")
        );
    }

    #[test]
    fn test_set_index_into_mapping_fails() {
        let mut doc = yaml("work:\n  company: Acme\n");
        let err = set(&mut doc, "work.0.role", Value::from("x")).unwrap_err();
        assert!(matches!(err, YamlPathError::ExpectedSequence { .. }));
        assert_eq!(
            err.to_string(),
            "Expected a sequence at segment '0' of path 'work.0.role'"
        );
    }

    #[test]
    fn test_set_key_into_scalar_fails() {
        let mut doc = yaml("name: Ada\n");
        let err = set(&mut doc, "name.first", Value::from("x")).unwrap_err();
        assert!(matches!(err, YamlPathError::ExpectedMapping { .. }));
    }

    #[test]
    fn test_set_empty_path_fails() {
        let mut doc = yaml("a: 1\n");
        assert!(matches!(
            set(&mut doc, "", Value::Null),
            Err(YamlPathError::EmptyPath)
        ));
    }

    #[test]
    fn test_patch_document_rewrites_whole_document() {
        let out = patch_document("name: Ada\nage: 30\n", "age", Value::from(31)).unwrap();
        assert_eq!(out.yaml, "name: Ada\nage: 31\n");
        assert_eq!(out.previous, Some(Value::from(30)));
    }

    #[test]
    fn test_patch_blank_document() {
        let out = patch_document("", "skills.0", Value::from("Rust")).unwrap();
        assert_eq!(out.yaml, "skills:\n- Rust\n");
        assert_eq!(out.previous, None);
    }

    #[test]
    fn test_patch_document_rejects_invalid_yaml() {
        let err = patch_document("a: [broken", "a", Value::Null).unwrap_err();
        assert!(matches!(err, YamlPathError::Parse(_)));
    }

    #[test]
    fn test_round_trip_is_structurally_equal() {
        let text = "name: Ada\nwork:\n  - company: Acme\n    years: 3\n    tags: [a, b]\nactive: true\n";
        let parsed = yaml(text);
        let again: Value = serde_yaml::from_str(&serde_yaml::to_string(&parsed).unwrap()).unwrap();
        assert_eq!(parsed, again);
    }

    #[test]
    fn test_yaml_to_json_stringifies_keys() {
        let doc = yaml("1: one\ntrue: yes\nnested:\n  list: [1, 2.5]\n");
        assert_eq!(
            yaml_to_json(&doc),
            serde_json::json!({"1": "one", "true": "yes", "nested": {"list": [1, 2.5]}})
        );
    }

    #[test]
    fn test_json_to_yaml() {
        let value = json_to_yaml(&serde_json::json!({"b": [1, "x"]})).unwrap();
        assert_eq!(value, yaml("b: [1, x]\n"));
    }
}
