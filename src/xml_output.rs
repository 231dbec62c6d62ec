//! XML wire backend.
//!
//! The document's single top-level member becomes the root element;
//! attributes map to real XML attributes, booleans to `true`/`false`
//! literals, and a list attached under key `K` is flattened to one `<K>`
//! element per item with no wrapper, a single item included; an empty list
//! emits nothing. Output starts with the
//! `<?xml version="1.0" encoding="UTF-8"?>` declaration; escaping is left
//! to the `quick-xml` event writer.

use std::io::Write;
use std::sync::Arc;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::err::{GeneratorError, GeneratorResult};
use crate::field_value::FieldValue;
use crate::generator::{DocumentBuilder, Generator};
use crate::hash_generator::{FieldTypeHashGenerator, XmlFieldTypeHashGenerator};
use crate::node::{Node, ObjectNode, Scalar, ValueNode};
use crate::normalizer::NormalizerRegistry;
use crate::settings::OutputSettings;

pub struct XmlGenerator {
    builder: DocumentBuilder,
    hash_generator: XmlFieldTypeHashGenerator,
    vendor: String,
    pretty: bool,
}

impl XmlGenerator {
    pub fn new(settings: &OutputSettings) -> Self {
        Self::with_normalizers(settings, Arc::new(NormalizerRegistry::new()))
    }

    pub fn with_normalizers(
        settings: &OutputSettings,
        normalizers: Arc<NormalizerRegistry>,
    ) -> Self {
        XmlGenerator {
            builder: DocumentBuilder::new(),
            hash_generator: XmlFieldTypeHashGenerator::new(normalizers, settings.is_strict()),
            vendor: settings.vendor_name().to_owned(),
            pretty: settings.should_pretty_print(),
        }
    }
}

impl Generator for XmlGenerator {
    fn start_document(&mut self, name: &str) -> GeneratorResult<()> {
        self.builder.start_document(name)
    }

    fn end_document(&mut self, name: &str) -> GeneratorResult<String> {
        let mut members = self.builder.take_document(name)?;

        if members.len() != 1 {
            return Err(GeneratorError::contract(
                "end_document",
                format!(
                    "an XML document requires exactly one root element, found {}",
                    members.len()
                ),
            ));
        }
        let (root_name, root) = members.remove(0);
        if let Node::List(_) = root {
            return Err(GeneratorError::contract(
                "end_document",
                format!("the XML document root `{root_name}` must be an object element, not a list"),
            ));
        }

        let mut buffer = Vec::new();
        let mut writer = if self.pretty {
            Writer::new_with_indent(&mut buffer, b' ', 2)
        } else {
            Writer::new(&mut buffer)
        };
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write_node(&mut writer, &root_name, &root)?;

        String::from_utf8(buffer).map_err(|err| GeneratorError::XmlOutput {
            message: format!("generated document is not valid UTF-8: {err}"),
        })
    }

    fn start_object_element_with_media_type(
        &mut self,
        name: &str,
        _media_type_name: Option<&str>,
    ) -> GeneratorResult<()> {
        // No synthesized media-type attribute here: the root element name
        // binds the resource kind on the XML side.
        self.builder.start_object_element(name)
    }

    fn end_object_element(&mut self, name: &str) -> GeneratorResult<()> {
        self.builder.end_object_element(name)
    }

    fn start_list(&mut self, name: &str) -> GeneratorResult<()> {
        self.builder.start_list(name)
    }

    fn end_list(&mut self, name: &str) -> GeneratorResult<()> {
        self.builder.end_list(name)
    }

    fn start_attribute(&mut self, name: &str, value: Scalar) -> GeneratorResult<()> {
        self.builder.start_attribute(name, value)
    }

    fn end_attribute(&mut self, name: &str) -> GeneratorResult<()> {
        self.builder.end_attribute(name)
    }

    fn start_value_element_with_attributes(
        &mut self,
        name: &str,
        value: Scalar,
        attributes: &[(&str, Scalar)],
    ) -> GeneratorResult<()> {
        self.builder.start_value_element(name, value, attributes)
    }

    fn end_value_element(&mut self, name: &str) -> GeneratorResult<()> {
        self.builder.end_value_element(name)
    }

    fn generate_field_type_hash(&mut self, name: &str, value: &FieldValue) -> GeneratorResult<()> {
        let node = self.hash_generator.generate_value(name, value)?;
        self.builder.attach_hash(name, node)
    }

    fn is_empty(&self) -> bool {
        self.builder.is_empty()
    }

    fn reset(&mut self) {
        self.builder.reset();
    }

    fn get_media_type(&self, name: &str) -> String {
        format!("application/{}.{name}+xml", self.vendor)
    }

    fn serialize_bool(&self, value: bool) -> Scalar {
        Scalar::String(if value { "true" } else { "false" }.to_owned())
    }
}

fn write_node<W: Write>(writer: &mut Writer<W>, name: &str, node: &Node) -> GeneratorResult<()> {
    match node {
        Node::Scalar(scalar) => write_scalar_element(writer, name, &[], scalar),
        Node::Value(ValueNode { attributes, value }) => {
            write_scalar_element(writer, name, attributes, value)
        }
        Node::Object(object) => write_object_element(writer, name, object),
        // Repeat the list's own tag name for every item.
        Node::List(list) => {
            for item in &list.items {
                write_node(writer, &list.name, item)?;
            }
            Ok(())
        }
    }
}

fn write_object_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    object: &ObjectNode,
) -> GeneratorResult<()> {
    let mut start = BytesStart::new(name);
    for (attr_name, attr_value) in &object.attributes {
        start.push_attribute((attr_name.as_str(), attr_value.to_xml_text().as_ref()));
    }

    if object.members.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for (member_name, member) in &object.members {
        write_node(writer, member_name, member)?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_scalar_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(String, Scalar)],
    value: &Scalar,
) -> GeneratorResult<()> {
    let mut start = BytesStart::new(name);
    for (attr_name, attr_value) in attributes {
        start.push_attribute((attr_name.as_str(), attr_value.to_xml_text().as_ref()));
    }

    if let Scalar::Null = value {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(value.to_xml_text().as_ref())))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
