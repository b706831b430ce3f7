//! Flat XML request encoding and XML-to-JSON response conversion
//!
//! The target server accepts a flat `<root><key>value</key>...</root>` body
//! and answers with simple element trees. Responses are converted into
//! `serde_json::Value` (repeated sibling tags become arrays, leaf text becomes
//! strings) so the one structural matcher serves both media types.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::{CheckError, CheckResult};

/// Serialize a flat mapping as `<root><key>value</key>...</root>`.
///
/// String interpolation only: no escaping, no nesting, no attributes. Spec
/// validation rejects payloads the encoder cannot represent.
pub fn encode_flat(fields: &Map<String, Value>) -> String {
    let mut out = String::from("<root>");
    for (key, value) in fields {
        out.push_str(&format!("<{key}>{}</{key}>", scalar_text(value)));
    }
    out.push_str("</root>");
    out
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse an XML document into a JSON-like value.
///
/// The root tag is preserved as the outer key. Elements with children become
/// objects, repeated sibling tags collapse into arrays, and leaf text becomes
/// a string (empty elements become the empty string).
pub fn parse_document(text: &str) -> CheckResult<Value> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = tag_name(start.name().as_ref());
                let value = parse_element(&mut reader, &name)?;
                let mut root = Map::new();
                root.insert(name, value);
                return Ok(Value::Object(root));
            }
            Event::Empty(start) => {
                let name = tag_name(start.name().as_ref());
                let mut root = Map::new();
                root.insert(name, Value::String(String::new()));
                return Ok(Value::Object(root));
            }
            Event::Eof => {
                return Err(CheckError::BodyParse("empty XML document".to_string()));
            }
            _ => {}
        }
    }
}

fn parse_element(reader: &mut Reader<&[u8]>, name: &str) -> CheckResult<Value> {
    let mut children: Vec<(String, Value)> = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let child_name = tag_name(start.name().as_ref());
                let child = parse_element(reader, &child_name)?;
                children.push((child_name, child));
            }
            Event::Empty(start) => {
                let child_name = tag_name(start.name().as_ref());
                children.push((child_name, Value::String(String::new())));
            }
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::End(_) => break,
            Event::Eof => {
                return Err(CheckError::BodyParse(format!("unclosed <{name}> element")));
            }
            _ => {}
        }
    }

    if children.is_empty() {
        return Ok(Value::String(text));
    }

    let mut map = Map::new();
    for (tag, value) in children {
        match map.get_mut(&tag) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(tag, value);
            }
        }
    }
    Ok(Value::Object(map))
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_flat_mapping_in_key_order() {
        let Value::Object(fields) = json!({"doneStatus": false, "title": "scan"}) else {
            unreachable!()
        };
        assert_eq!(
            encode_flat(&fields),
            "<root><doneStatus>false</doneStatus><title>scan</title></root>"
        );
    }

    #[test]
    fn encoder_does_not_escape_by_design() {
        let Value::Object(fields) = json!({"title": "a < b"}) else {
            unreachable!()
        };
        assert_eq!(encode_flat(&fields), "<root><title>a < b</title></root>");
    }

    #[test]
    fn parses_leaf_text_as_strings() {
        let value = parse_document("<todo><id>1</id><title>scan paperwork</title></todo>").unwrap();
        assert_eq!(value, json!({"todo": {"id": "1", "title": "scan paperwork"}}));
    }

    #[test]
    fn repeated_tags_become_arrays() {
        let doc = "<todos>\
            <todo><id>1</id></todo>\
            <todo><id>2</id></todo>\
        </todos>";
        let value = parse_document(doc).unwrap();
        assert_eq!(
            value,
            json!({"todos": {"todo": [{"id": "1"}, {"id": "2"}]}})
        );
    }

    #[test]
    fn empty_elements_become_empty_strings() {
        let value = parse_document("<todo><description/></todo>").unwrap();
        assert_eq!(value, json!({"todo": {"description": ""}}));
    }

    #[test]
    fn rejects_non_xml_text() {
        assert!(parse_document("").is_err());
        assert!(parse_document("   ").is_err());
    }

    #[test]
    fn converted_tree_works_with_the_matcher() {
        let doc = "<projects><project>\
            <id>1</id><title>Office Work</title><completed>false</completed>\
        </project></projects>";
        let value = parse_document(doc).unwrap();
        let expected = crate::matcher::Expected::from(json!({"title": "Office Work"}));
        assert!(crate::matcher::contains(&expected, &value).is_ok());
    }
}
