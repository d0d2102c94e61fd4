//! Structural translation between Harvester XML and JSON.
//!
//! Records map object keys to child elements, arrays to repeated sibling
//! elements and scalars to element text. A JSON `null` is written as an empty
//! element. Reading back, attributes become string fields prefixed with `@`,
//! `xsi:nil="true"` becomes `null` and whitespace between child elements is
//! dropped, while the text of leaf elements is kept exactly as sent.
//!
//! XML carries no scalar types, so numbers and booleans read back as strings
//! and a one-element array reads back as its single item.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Key holding the text of a leaf element that also carries attributes
pub const TEXT_KEY: &str = "#text";

/// Prefix marking a field that came from, and goes back to, an XML attribute
pub const ATTRIBUTE_PREFIX: char = '@';

/// Key holding the record count in a translated collection
pub const TOTAL_RECORDS_KEY: &str = "totalRecords";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("XML document has no root element")]
    EmptyDocument,

    #[error("Malformed JSON: {0}")]
    Json(String),

    #[error("Record wrapped in <{0}> must be a JSON object")]
    NotAnObject(String),

    #[error("'{0}' is not a valid XML element name")]
    InvalidName(String),

    #[error("Field '{0}' must hold a scalar to be written as XML text")]
    NotText(String),
}

fn xml_error(err: impl std::fmt::Display) -> CodecError {
    CodecError::Xml(err.to_string())
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, CodecError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(xml_error)?;
            if attr.key.as_ref().starts_with(b"xmlns") {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_error)?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn into_value(self) -> Value {
        if self.attribute("nil") == Some("true") {
            return Value::Null;
        }
        if self.children.is_empty() && self.attributes.is_empty() {
            return Value::String(self.text);
        }

        let mut map = Map::new();
        for (key, value) in self.attributes {
            map.insert(format!("{ATTRIBUTE_PREFIX}{key}"), Value::String(value));
        }

        if self.children.is_empty() {
            if !self.text.trim().is_empty() {
                map.insert(TEXT_KEY.to_string(), Value::String(self.text));
            }
            return Value::Object(map);
        }

        // Repeated siblings collapse into one array, in document order
        let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
        for child in self.children {
            let name = child.name.clone();
            let value = child.into_value();
            match groups.iter_mut().find(|(n, _)| *n == name) {
                Some((_, values)) => values.push(value),
                None => groups.push((name, vec![value])),
            }
        }
        for (name, mut values) in groups {
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            };
            map.insert(name, value);
        }

        Value::Object(map)
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), CodecError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => {
            return Err(CodecError::Xml(format!(
                "unexpected second root element <{}>",
                element.name
            )));
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn parse_document(xml: &str) -> Result<Element, CodecError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let element = Element::open(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| CodecError::Xml("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(CodecError::Xml(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or(CodecError::EmptyDocument)
}

/// Translates a single-record document into `{ "<root element>": record }`
pub fn xml_to_json(xml: &str) -> Result<Value, CodecError> {
    let root = parse_document(xml)?;
    let mut map = Map::new();
    let name = root.name.clone();
    map.insert(name, root.into_value());
    Ok(Value::Object(map))
}

/// Translates a record-set document such as `<storages count="2">…</storages>`
/// into `{ "storages": [ … ], "totalRecords": 2 }`.
pub fn collection_xml_to_json(xml: &str) -> Result<Value, CodecError> {
    let root = parse_document(xml)?;
    let count = root.attribute("count").and_then(|c| c.trim().parse::<usize>().ok());

    let records: Vec<Value> = root.children.into_iter().map(Element::into_value).collect();
    let total = count.unwrap_or(records.len());

    let mut map = Map::new();
    map.insert(root.name, Value::Array(records));
    map.insert(TOTAL_RECORDS_KEY.to_string(), Value::from(total));
    Ok(Value::Object(map))
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn scalar_text(key: &str, value: &Value) -> Result<Option<String>, CodecError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Bool(_) | Value::Number(_) => Ok(Some(value.to_string())),
        Value::Array(_) | Value::Object(_) => Err(CodecError::NotText(key.to_string())),
    }
}

fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), CodecError> {
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<(), CodecError> {
    if !is_valid_name(name) {
        return Err(CodecError::InvalidName(name.to_string()));
    }

    match value {
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        Value::Null => {
            writer
                .write_event(Event::Empty(BytesStart::new(name)))
                .map_err(xml_error)?;
            Ok(())
        }
        Value::Object(fields) => write_object(writer, name, fields),
        scalar => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(xml_error)?;
            if let Some(text) = scalar_text(name, scalar)? {
                write_text(writer, &text)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_error)?;
            Ok(())
        }
    }
}

/// `@` keys go back onto the start tag and `#text` becomes the element's text
fn write_object(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    fields: &Map<String, Value>,
) -> Result<(), CodecError> {
    let mut start = BytesStart::new(name);
    let mut text = None;
    let mut children = Vec::new();

    for (key, field) in fields {
        if key == TEXT_KEY {
            text = scalar_text(key, field)?;
        } else if let Some(attribute) = key.strip_prefix(ATTRIBUTE_PREFIX) {
            if !is_valid_name(attribute) {
                return Err(CodecError::InvalidName(key.clone()));
            }
            if let Some(value) = scalar_text(key, field)? {
                start.push_attribute((attribute, value.as_str()));
            }
        } else {
            children.push((key, field));
        }
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    for (key, field) in children {
        write_element(writer, key, field)?;
    }
    if let Some(text) = text {
        write_text(writer, &text)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)?;
    Ok(())
}

/// Serializes `record` as an XML document whose root element is `root`
pub fn record_to_xml(root: &str, record: &Value) -> Result<String, CodecError> {
    if !record.is_object() {
        return Err(CodecError::NotAnObject(root.to_string()));
    }

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_error)?;
    write_element(&mut writer, root, record)?;

    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

/// Parses an inbound JSON body and serializes it under `root`
pub fn json_body_to_xml(root: &str, body: &[u8]) -> Result<String, CodecError> {
    let record: Value =
        serde_json::from_slice(body).map_err(|e| CodecError::Json(e.to_string()))?;
    record_to_xml(root, &record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_round_trip() {
        let step = json!({
            "name": "parse",
            "description": "Parse MARC & <friends>",
            "outputFormat": {"name": "XML", "version": "1.0"},
            "tags": ["a", "b"]
        });

        let xml = record_to_xml("step", &step).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<step><name>parse</name>"));
        assert!(xml.contains("&amp; &lt;friends&gt;"));
        assert!(xml.contains("<tags>a</tags><tags>b</tags>"));

        assert_eq!(xml_to_json(&xml).unwrap(), json!({ "step": step }));
    }

    #[test]
    fn test_scalars_and_null() {
        let xml = record_to_xml("storage", &json!({"enabled": true, "id": 7, "url": null})).unwrap();
        assert!(xml.contains("<enabled>true</enabled><id>7</id><url/>"));

        assert_eq!(
            xml_to_json(&xml).unwrap(),
            json!({"storage": {"enabled": "true", "id": "7", "url": ""}})
        );
    }

    #[test]
    fn test_leaf_text_is_kept_verbatim() {
        let xml = "<step>\n  <name>parse</name>\n  <script>line1\r\nline2\r  </script>\n</step>";
        let json = xml_to_json(xml).unwrap();
        assert_eq!(json["step"]["script"], "line1\r\nline2\r  ");
        assert_eq!(json["step"]["name"], "parse");
    }

    #[test]
    fn test_attributes_namespaces_and_nil() {
        let xml = r#"<ns2:harvestable xmlns:ns2="http://indexdata.com" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" uri="http://h/1">
            <ns2:id>1</ns2:id>
            <lastHarvestFinished xsi:nil="true"/>
            <status code="ok">RUNNING</status>
            <![CDATA[ ignored between children ]]>
        </ns2:harvestable>"#;

        let json = xml_to_json(xml).unwrap();
        let harvestable = &json["harvestable"];
        assert_eq!(harvestable["@uri"], "http://h/1");
        assert_eq!(harvestable["id"], "1");
        assert_eq!(harvestable["lastHarvestFinished"], Value::Null);
        assert_eq!(harvestable["status"], json!({"@code": "ok", "#text": "RUNNING"}));
    }

    #[test]
    fn test_attributed_record_writes_back_unchanged() {
        let xml = r#"<step uri="http://h/steps/42"><name>parse</name><status code="ok">RUNNING</status><script>old</script></step>"#;
        let json = xml_to_json(xml).unwrap();

        let written = record_to_xml("step", &json["step"]).unwrap();
        assert!(written.contains(xml), "{written}");
        assert_eq!(xml_to_json(&written).unwrap(), json);
    }

    #[test]
    fn test_attributes_are_escaped_and_nulls_skipped() {
        let record = json!({"@uri": "http://h/?a=1&b=\"2\"", "@gone": null, "@port": 8080, "#text": 5});
        let xml = record_to_xml("storage", &record).unwrap();

        assert!(xml.contains(r#"<storage uri="http://h/?a=1&amp;b=&quot;2&quot;" port="8080">5</storage>"#), "{xml}");
        assert_eq!(
            xml_to_json(&xml).unwrap(),
            json!({"storage": {"@uri": "http://h/?a=1&b=\"2\"", "@port": "8080", "#text": "5"}})
        );
    }

    #[test]
    fn test_scalar_types_do_not_survive_the_round_trip() {
        let record = json!({"id": 42, "enabled": true, "tags": ["a"]});
        let xml = record_to_xml("step", &record).unwrap();

        assert_eq!(
            xml_to_json(&xml).unwrap(),
            json!({"step": {"id": "42", "enabled": "true", "tags": "a"}})
        );
    }

    #[test]
    fn test_collection_translation() {
        let xml = r#"<?xml version="1.0"?>
            <storages count="2" start="0" max="100">
              <storage><id>1</id><name>Inventory</name></storage>
              <storage><id>2</id><name>Solr</name></storage>
            </storages>"#;

        assert_eq!(
            collection_xml_to_json(xml).unwrap(),
            json!({
                "storages": [
                    {"id": "1", "name": "Inventory"},
                    {"id": "2", "name": "Solr"}
                ],
                "totalRecords": 2
            })
        );
    }

    #[test]
    fn test_collection_of_one_is_still_an_array() {
        let xml = "<steps><step><id>9</id></step></steps>";
        assert_eq!(
            collection_xml_to_json(xml).unwrap(),
            json!({"steps": [{"id": "9"}], "totalRecords": 1})
        );

        let empty = collection_xml_to_json("<steps/>").unwrap();
        assert_eq!(empty, json!({"steps": [], "totalRecords": 0}));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(xml_to_json("<step><name>x</step>"), Err(CodecError::Xml(_))));
        assert!(matches!(xml_to_json("<step><name>x</name>"), Err(CodecError::Xml(_))));
        assert_eq!(xml_to_json("   "), Err(CodecError::EmptyDocument));
        assert!(matches!(xml_to_json("<a/><b/>"), Err(CodecError::Xml(_))));
    }

    #[test]
    fn test_invalid_records() {
        assert_eq!(
            record_to_xml("step", &json!(["x"])),
            Err(CodecError::NotAnObject("step".to_string()))
        );
        assert_eq!(
            record_to_xml("step", &json!({"bad key": 1})),
            Err(CodecError::InvalidName("bad key".to_string()))
        );
        assert_eq!(
            record_to_xml("step", &json!({"@code": {"nested": 1}})),
            Err(CodecError::NotText("@code".to_string()))
        );
        assert_eq!(
            record_to_xml("step", &json!({"#text": ["a"]})),
            Err(CodecError::NotText("#text".to_string()))
        );
        assert_eq!(
            record_to_xml("step", &json!({"@": "x"})),
            Err(CodecError::InvalidName("@".to_string()))
        );
        assert!(matches!(
            json_body_to_xml("step", b"{not json"),
            Err(CodecError::Json(_))
        ));
    }
}
