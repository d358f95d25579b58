//! Conversion of XML response bodies into a [`Value`] tree.
//!
//! The mapping follows the usual "XML as hash" conventions:
//!
//! - the document root becomes a single-key map,
//! - an element with only text becomes [`Value::Text`], an empty one [`Value::Null`],
//! - sibling elements sharing a name collapse into a [`Value::List`] in document order,
//! - attributes become keys of the element's map; text next to attributes or
//!   child elements is kept under `__content__`.
//!
//! Numbers are not interpreted; typed accessors parse them where needed.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::error::{AsinError, Result};

/// Key under which mixed text content is stored.
pub const CONTENT_KEY: &str = "__content__";

/// A node of a parsed response document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Looks up a direct child of a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Follows a key path through nested maps. `Null` nodes count as absent.
    pub fn path(&self, keys: &[&str]) -> Option<&Value> {
        let mut current = self;
        for key in keys {
            current = current.get(key)?;
        }
        if current.is_null() { None } else { Some(current) }
    }

    /// Text at `keys`, if present and textual.
    pub fn path_str(&self, keys: &[&str]) -> Option<&str> {
        self.path(keys).and_then(Value::as_str)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Normalises singleton-vs-array: `Null` is empty, a `List` yields its
    /// elements and anything else is a one-element list.
    pub fn to_list(&self) -> Vec<&Value> {
        match self {
            Value::Null => Vec::new(),
            Value::List(values) => values.iter().collect(),
            other => vec![other],
        }
    }

    /// Owned counterpart of [`Value::to_list`].
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Value::Null => Vec::new(),
            Value::List(values) => values,
            other => vec![other],
        }
    }

    /// Moves the node at `keys` out of the tree.
    pub fn into_path(self, keys: &[&str]) -> Option<Value> {
        let mut current = self;
        for key in keys {
            current = match current {
                Value::Map(mut map) => map.remove(*key)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Rewrites every map key from `CamelCase` to `snake_case`
    /// (`ItemAttributes` -> `item_attributes`, `DetailPageURL` -> `detail_page_url`).
    pub fn with_underscored_keys(self) -> Value {
        match self {
            Value::Map(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (underscore(&k), v.with_underscored_keys()))
                    .collect(),
            ),
            Value::List(values) => Value::List(
                values
                    .into_iter()
                    .map(Value::with_underscored_keys)
                    .collect(),
            ),
            other => other,
        }
    }
}

fn underscore(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        if c == '-' {
            out.push('_');
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

/// An element whose end tag has not been seen yet.
struct Frame {
    name: String,
    children: BTreeMap<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut children = BTreeMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            insert_child(&mut children, key, Value::Text(value));
        }
        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        let value = if self.children.is_empty() {
            if text.is_empty() {
                Value::Null
            } else {
                Value::Text(text.to_string())
            }
        } else {
            let mut children = self.children;
            if !text.is_empty() {
                children.insert(CONTENT_KEY.to_string(), Value::Text(text.to_string()));
            }
            Value::Map(children)
        };
        (self.name, value)
    }
}

/// Adds `value` under `key`, turning repeated keys into a list.
fn insert_child(map: &mut BTreeMap<String, Value>, key: String, value: Value) {
    match map.remove(&key) {
        None => {
            map.insert(key, value);
        }
        Some(Value::List(mut values)) => {
            values.push(value);
            map.insert(key, Value::List(values));
        }
        Some(existing) => {
            map.insert(key, Value::List(vec![existing, value]));
        }
    }
}

/// Parses an XML document into a [`Value`].
///
/// # Errors
///
/// Returns [`AsinError::Xml`] for malformed XML and
/// [`AsinError::UnexpectedResponse`] for a document without a root element.
pub fn parse(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = Frame::open(&start)?.close();
                attach(&mut stack, &mut root, name, value);
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| {
                    AsinError::UnexpectedResponse("unbalanced closing tag".into())
                })?;
                let (name, value) = frame.close();
                attach(&mut stack, &mut root, name, value);
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&*data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match root {
        Some((name, value)) => Ok(Value::Map(BTreeMap::from([(name, value)]))),
        None => Err(AsinError::UnexpectedResponse(
            "document has no root element".into(),
        )),
    }
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) {
    match stack.last_mut() {
        Some(parent) => insert_child(&mut parent.children, name, value),
        None => *root = Some((name, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOKUP: &str = r#"<?xml version="1.0" ?>
<ItemLookupResponse xmlns="http://webservices.amazon.com/AWSECommerceService/2011-08-01">
  <Items>
    <Request><IsValid>True</IsValid></Request>
    <Item>
      <ASIN>1430218150</ASIN>
      <ItemAttributes>
        <Author>Mark Dalrymple</Author>
        <Author>Scott Knaster</Author>
        <Title>Learn Objective-C on the Mac &amp; more</Title>
      </ItemAttributes>
    </Item>
  </Items>
</ItemLookupResponse>"#;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn root_becomes_single_key_map() {
        let value = parse(LOOKUP).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("ItemLookupResponse"));
    }

    #[test]
    fn namespace_declarations_are_dropped() {
        let value = parse(LOOKUP).unwrap();
        assert!(value.path(&["ItemLookupResponse", "xmlns"]).is_none());
    }

    #[test]
    fn text_and_entities() {
        let value = parse(LOOKUP).unwrap();
        let item = value.path(&["ItemLookupResponse", "Items", "Item"]).unwrap();
        assert_eq!(item.path_str(&["ASIN"]), Some("1430218150"));
        assert_eq!(
            item.path_str(&["ItemAttributes", "Title"]),
            Some("Learn Objective-C on the Mac & more")
        );
    }

    #[test]
    fn repeated_siblings_become_a_list() {
        let value = parse(LOOKUP).unwrap();
        let authors = value
            .path(&["ItemLookupResponse", "Items", "Item", "ItemAttributes", "Author"])
            .unwrap();
        assert_eq!(
            authors,
            &Value::List(vec![text("Mark Dalrymple"), text("Scott Knaster")])
        );
    }

    #[test]
    fn empty_elements_are_null() {
        let value = parse("<Cart><CartItems/><CartId>1</CartId><Empty></Empty></Cart>").unwrap();
        assert_eq!(value.get("Cart").unwrap().get("CartItems"), Some(&Value::Null));
        assert_eq!(value.get("Cart").unwrap().get("Empty"), Some(&Value::Null));
        assert!(value.path(&["Cart", "CartItems"]).is_none());
    }

    #[test]
    fn attributes_and_mixed_content() {
        let value = parse(r#"<Price currency="USD">39.99</Price>"#).unwrap();
        let price = value.get("Price").unwrap();
        assert_eq!(price.path_str(&["currency"]), Some("USD"));
        assert_eq!(price.path_str(&[CONTENT_KEY]), Some("39.99"));
    }

    #[test]
    fn cdata_is_text() {
        let value = parse("<Content><![CDATA[<b>bold</b>]]></Content>").unwrap();
        assert_eq!(value.path_str(&["Content"]), Some("<b>bold</b>"));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = parse("<a><b></a>").unwrap_err();
        assert!(matches!(err, AsinError::Xml(_)));
    }

    #[test]
    fn empty_document_is_an_error() {
        let err = parse("   ").unwrap_err();
        assert!(matches!(err, AsinError::UnexpectedResponse(_)));
    }

    #[test]
    fn to_list_normalises_singletons() {
        let single = text("a");
        assert_eq!(single.to_list(), vec![&single]);
        assert!(Value::Null.to_list().is_empty());

        let list = Value::List(vec![text("a"), text("b")]);
        assert_eq!(list.to_list().len(), 2);
        assert_eq!(list.into_list(), vec![text("a"), text("b")]);
    }

    #[test]
    fn into_path_moves_subtree() {
        let value = parse(LOOKUP).unwrap();
        let items = value
            .into_path(&["ItemLookupResponse", "Items", "Item"])
            .unwrap();
        assert_eq!(items.path_str(&["ASIN"]), Some("1430218150"));
    }

    #[test]
    fn underscore_conversion() {
        assert_eq!(underscore("ItemAttributes"), "item_attributes");
        assert_eq!(underscore("ASIN"), "asin");
        assert_eq!(underscore("DetailPageURL"), "detail_page_url");
        assert_eq!(underscore("URLEncodedHMAC"), "url_encoded_hmac");
        assert_eq!(underscore("CartItemId"), "cart_item_id");
        assert_eq!(underscore("Item2Name"), "item2_name");
        assert_eq!(underscore("x-header"), "x_header");
    }

    #[test]
    fn underscored_keys_are_applied_recursively() {
        let value = parse(LOOKUP).unwrap().with_underscored_keys();
        assert_eq!(
            value.path_str(&["item_lookup_response", "items", "item", "asin"]),
            Some("1430218150")
        );
    }

    #[test]
    fn serializes_as_plain_json() {
        let value = parse("<Node><Name>Comedy</Name><Id>1</Id><Id>2</Id><Gone/></Node>").unwrap();
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Node": {"Name": "Comedy", "Id": ["1", "2"], "Gone": null}})
        );
    }
}
