//! Tag-based XML mapping for serde values
//!
//! Writing goes through a `serde_json::Value` tree:
//!
//! - object members become child elements named after their keys; keys that
//!   are not XML names are written as `<entry key="...">`, `null` members are
//!   left out
//! - array items become `<item>` children, an empty array an empty element
//! - scalars become text content
//! - a `null` root or array item is an empty element marked `nil="true"`
//!
//! Reading parses the document into a small element tree and lets the target
//! type drive interpretation, so `<count>5</count>` is a number or a string
//! depending on what is asked for.

use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer, IntoDeserializer, Visitor,
};
use serde::forward_to_deserialize_any;
use serde_json::Value;
use std::fmt;

const ITEM: &str = "item";
const ENTRY: &str = "entry";
const KEY_ATTR: &str = "key";
const NIL_ATTR: &str = "nil";
const FALLBACK_ROOT: &str = "value";

fn xml_err(cause: impl fmt::Display) -> Error {
    Error::codec("xml", cause)
}

/// Root element name for `T`: last path segment of the type name, generics
/// stripped (`alloc::vec::Vec<i32>` becomes `Vec`)
pub(super) fn root_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    let name = base.rsplit("::").next().unwrap_or(base);
    if is_xml_name(name) { name } else { FALLBACK_ROOT }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

// =============================================================================
// Writing
// =============================================================================

pub(super) fn to_bytes(root: &str, value: &Value) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, root, None, value)?;
    Ok(writer.into_inner())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(xml_err)
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    key: Option<&str>,
    value: &Value,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    if let Some(key) = key {
        start.push_attribute((KEY_ATTR, key));
    }

    match value {
        Value::Null => {
            start.push_attribute((NIL_ATTR, "true"));
            emit(writer, Event::Empty(start))
        }
        Value::Bool(b) => write_text(writer, start, name, &b.to_string()),
        Value::Number(n) => write_text(writer, start, name, &n.to_string()),
        Value::String(s) => write_text(writer, start, name, s),
        Value::Array(items) => {
            emit(writer, Event::Start(start))?;
            for item in items {
                write_element(writer, ITEM, None, item)?;
            }
            emit(writer, Event::End(BytesEnd::new(name)))
        }
        Value::Object(members) => {
            emit(writer, Event::Start(start))?;
            for (member, value) in members.iter().filter(|(_, v)| !v.is_null()) {
                if is_xml_name(member) {
                    write_element(writer, member, None, value)?;
                } else {
                    write_element(writer, ENTRY, Some(member), value)?;
                }
            }
            emit(writer, Event::End(BytesEnd::new(name)))
        }
    }
}

fn write_text(
    writer: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    name: &str,
    text: &str,
) -> Result<()> {
    if text.is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

// =============================================================================
// Reading
// =============================================================================

#[derive(Debug, Default)]
struct Node {
    name: String,
    key: Option<String>,
    nil: bool,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let qname = start.name();
        let name = std::str::from_utf8(qname.as_ref()).map_err(xml_err)?;
        let mut node = Node {
            name: name.to_string(),
            ..Node::default()
        };

        for attr in start.attributes() {
            let attr = attr.map_err(xml_err)?;
            let attr_name = attr.key.as_ref();
            if attr_name == KEY_ATTR.as_bytes() {
                node.key = Some(attr.unescape_value().map_err(xml_err)?.into_owned());
            } else if attr_name == NIL_ATTR.as_bytes() {
                node.nil = &*attr.value == b"true";
            }
        }
        Ok(node)
    }

    /// Map key or variant name this element stands for
    fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
}

fn close(open: &mut Vec<Node>, root: &mut Option<Node>, node: Node) -> Result<()> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(xml_err("document has more than one root element"));
    }
    *root = Some(node);
    Ok(())
}

fn append_text(open: &mut [Node], text: &str) -> Result<()> {
    match open.last_mut() {
        Some(node) => {
            node.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(xml_err("text outside the root element")),
    }
}

fn parse(text: &str) -> Result<Node> {
    let mut reader = Reader::from_str(text);
    let mut open: Vec<Node> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(start) => open.push(Node::open(&start)?),
            Event::Empty(start) => close(&mut open, &mut root, Node::open(&start)?)?,
            Event::End(_) => {
                let node = open
                    .pop()
                    .ok_or_else(|| xml_err("closing tag without an open element"))?;
                close(&mut open, &mut root, node)?;
            }
            Event::Text(text) => append_text(&mut open, &text.unescape().map_err(xml_err)?)?,
            Event::CData(data) => {
                append_text(&mut open, std::str::from_utf8(&data).map_err(xml_err)?)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(node) = open.last() {
        return Err(xml_err(format!("element <{}> is never closed", node.name)));
    }
    root.ok_or_else(|| xml_err("document has no root element"))
}

pub(super) fn from_str<T: DeserializeOwned>(text: &str) -> Result<T> {
    let root = parse(text)?;
    T::deserialize(NodeDe(&root)).map_err(xml_err)
}

// =============================================================================
// Deserializer over the element tree
// =============================================================================

#[derive(Debug)]
struct DeError(String);

impl fmt::Display for DeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for DeError {}

impl de::Error for DeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DeError(msg.to_string())
    }
}

type DeResult<T> = std::result::Result<T, DeError>;

/// Scalar text: element content, map keys and variant names
struct TextDe<'a>(&'a str);

macro_rules! parse_text {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
                let parsed = self.0.trim().parse::<$ty>().map_err(|e| {
                    DeError(format!("'{}' is not a valid {}: {e}", self.0, stringify!($ty)))
                })?;
                visitor.$visit(parsed)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for TextDe<'_> {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        visitor.visit_str(self.0)
    }

    parse_text! {
        deserialize_bool => visit_bool: bool,
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(DeError(format!("'{}' is not a single character", self.0))),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DeResult<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DeResult<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> DeResult<V::Value> {
        let variant: de::value::StrDeserializer<'_, DeError> = self.0.trim().into_deserializer();
        visitor.visit_enum(variant)
    }

    forward_to_deserialize_any! {
        str string bytes byte_buf seq tuple tuple_struct map struct identifier ignored_any
    }
}

#[derive(Clone, Copy)]
struct NodeDe<'a>(&'a Node);

macro_rules! node_text {
    ($($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
                TextDe(&self.0.text).$method(visitor)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for NodeDe<'_> {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        let node = self.0;
        if node.nil {
            visitor.visit_unit()
        } else if node.children.is_empty() {
            visitor.visit_str(&node.text)
        } else if node.children.iter().all(|c| c.name == ITEM && c.key.is_none()) {
            self.deserialize_seq(visitor)
        } else {
            self.deserialize_map(visitor)
        }
    }

    node_text! {
        deserialize_bool
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
        deserialize_f32 deserialize_f64 deserialize_char
        deserialize_str deserialize_string deserialize_identifier
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        if self.0.nil {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DeResult<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DeResult<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        visitor.visit_seq(Items(self.0.children.iter()))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> DeResult<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> DeResult<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        visitor.visit_map(Members {
            iter: self.0.children.iter(),
            value: None,
        })
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> DeResult<V::Value> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> DeResult<V::Value> {
        match self.0.children.first() {
            Some(variant) => visitor.visit_enum(Variant(variant)),
            None => TextDe(&self.0.text).deserialize_enum(name, variants, visitor),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        visitor.visit_unit()
    }
}

struct Items<'a>(std::slice::Iter<'a, Node>);

impl<'de> de::SeqAccess<'de> for Items<'_> {
    type Error = DeError;

    fn next_element_seed<S: DeserializeSeed<'de>>(
        &mut self,
        seed: S,
    ) -> DeResult<Option<S::Value>> {
        self.0.next().map(|node| seed.deserialize(NodeDe(node))).transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.0.len())
    }
}

struct Members<'a> {
    iter: std::slice::Iter<'a, Node>,
    value: Option<&'a Node>,
}

impl<'de> de::MapAccess<'de> for Members<'_> {
    type Error = DeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> DeResult<Option<K::Value>> {
        match self.iter.next() {
            Some(node) => {
                self.value = Some(node);
                seed.deserialize(TextDe(node.key())).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> DeResult<S::Value> {
        let node = self
            .value
            .take()
            .ok_or_else(|| DeError("map value requested before its key".into()))?;
        seed.deserialize(NodeDe(node))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Externally tagged variant: `<Variant>payload</Variant>`
struct Variant<'a>(&'a Node);

impl<'de, 'a> de::EnumAccess<'de> for Variant<'a> {
    type Error = DeError;
    type Variant = NodeDe<'a>;

    fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> DeResult<(S::Value, NodeDe<'a>)> {
        let tag = seed.deserialize(TextDe(self.0.key()))?;
        Ok((tag, NodeDe(self.0)))
    }
}

impl<'de> de::VariantAccess<'de> for NodeDe<'_> {
    type Error = DeError;

    fn unit_variant(self) -> DeResult<()> {
        Ok(())
    }

    fn newtype_variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> DeResult<S::Value> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> DeResult<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> DeResult<V::Value> {
        self.deserialize_map(visitor)
    }
}
