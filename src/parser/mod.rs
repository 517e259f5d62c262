//! Document Parser Adapter
//!
//! Decodes YAML or JSON text into the format-independent [`Value`] tree.
//! The decoders themselves are `serde_yaml` and `serde_json`; this module
//! only normalizes their output (ordered string-keyed mappings, exact
//! integers, tags stripped).

pub mod error;
pub mod value;

pub use error::ParseError;
pub use value::{Mapping, Number, Value};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Text format of an input document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

impl Format {
    /// Guess the format from a file name, defaulting to YAML
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Parse document text into a value tree.
///
/// Blank input means nothing has been written yet; it decodes to an empty
/// mapping so validation reports the missing `services` key rather than a
/// malformed root.
pub fn parse_document(text: &str, format: Format) -> Result<Value, ParseError> {
    if text.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }

    match format {
        Format::Yaml => {
            let mut yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
            // `<<: *anchor` stays a literal key until merged
            yaml.apply_merge()?;
            Ok(from_yaml(yaml))
        }
        Format::Json => {
            let json: serde_json::Value = serde_json::from_str(text)?;
            Ok(from_json(json))
        }
    }
}

/// Convert a `serde_yaml` value into a [`Value`]
pub fn from_yaml(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => Value::Number(yaml_number(&n)),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(from_yaml).collect()),
        serde_yaml::Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (yaml_key(k), from_yaml(v)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

/// Convert a `serde_json` value into a [`Value`]
pub fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(if let Some(i) = n.as_i64() {
            Number::Int(i)
        } else if let Some(u) = n.as_u64() {
            Number::UInt(u)
        } else {
            Number::Float(n.as_f64().unwrap_or(f64::NAN))
        }),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Sequence(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            Value::Mapping(map.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::Int(i)
    } else if let Some(u) = n.as_u64() {
        Number::UInt(u)
    } else {
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// YAML keys can be any node; render non-string keys as their scalar text
fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => serde_yaml::to_string(&key)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        other => from_yaml(other).to_display_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_preserves_key_order() {
        let doc = parse_document("services:\n  web:\n    image: nginx\n  db:\n    image: postgres\n", Format::Yaml)
            .expect("parse");
        let services = doc.get("services").and_then(Value::as_mapping).expect("services");
        let names: Vec<&str> = services.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["web", "db"]);
    }

    #[test]
    fn test_parse_blank_is_empty_mapping() {
        assert_eq!(parse_document("", Format::Yaml), Ok(Value::Mapping(Mapping::new())));
        assert_eq!(parse_document("  \n", Format::Json), Ok(Value::Mapping(Mapping::new())));
        // an explicit null document is still null
        assert_eq!(parse_document("~\n", Format::Yaml), Ok(Value::Null));
    }

    #[test]
    fn test_parse_scalars() {
        let doc = parse_document("a: 80\nb: true\nc: ~\nd: \"8080:80\"\ne: 1.5\n", Format::Yaml).expect("parse");
        assert_eq!(doc.get("a"), Some(&Value::Number(Number::Int(80))));
        assert_eq!(doc.get("b"), Some(&Value::Bool(true)));
        assert_eq!(doc.get("c"), Some(&Value::Null));
        assert_eq!(doc.get("d"), Some(&Value::from("8080:80")));
        assert_eq!(doc.get("e"), Some(&Value::Number(Number::Float(1.5))));
    }

    #[test]
    fn test_parse_applies_merge_keys() {
        let doc = parse_document(
            "x-base: &base\n  image: nginx\n  restart: always\nservices:\n  web:\n    <<: *base\n    restart: \"no\"\n",
            Format::Yaml,
        )
        .expect("parse");
        let web = doc
            .get("services")
            .and_then(|s| s.get("web"))
            .and_then(Value::as_mapping)
            .expect("web");
        assert!(!web.contains_key("<<"));
        assert_eq!(web.get("image"), Some(&Value::from("nginx")));
        // local keys win over merged ones
        assert_eq!(web.get("restart"), Some(&Value::from("no")));
    }

    #[test]
    fn test_parse_non_string_keys() {
        let doc = parse_document("80: http\ntrue: yes\n", Format::Yaml).expect("parse");
        let map = doc.as_mapping().expect("mapping");
        assert!(map.contains_key("80"));
        assert!(map.contains_key("true"));
    }

    #[test]
    fn test_parse_json() {
        let doc = parse_document(r#"{"services": {"web": {"image": "nginx", "ports": [80]}}}"#, Format::Json)
            .expect("parse");
        let ports = doc
            .get("services")
            .and_then(|s| s.get("web"))
            .and_then(|w| w.get("ports"))
            .and_then(Value::as_sequence)
            .expect("ports");
        assert_eq!(ports, &[Value::from(80)]);
    }

    #[test]
    fn test_yaml_syntax_error_has_location() {
        let err = parse_document("services:\n  web: [unclosed\n", Format::Yaml).unwrap_err();
        assert!(matches!(err, ParseError::Yaml { .. }));
        assert!(err.location().is_some());
    }

    #[test]
    fn test_json_syntax_error() {
        let err = parse_document("{\"services\": }", Format::Json).unwrap_err();
        assert!(matches!(err, ParseError::Json { .. }));
        assert_eq!(err.location().map(|(line, _)| line), Some(1));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(std::path::Path::new("compose.json")), Format::Json);
        assert_eq!(Format::from_path(std::path::Path::new("compose.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(std::path::Path::new("docker-compose")), Format::Yaml);
    }
}
