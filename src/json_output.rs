//! JSON wire backend.
//!
//! Reserved-key conventions: attributes are prefixed with `_`
//! (`media-type` becomes `_media-type`), a scalar carrying its own
//! attributes is rendered as `{"_<attr>": ..., "#text": <value>}`, lists
//! are native anonymous arrays. Every started object element is stamped
//! with the vendor media type of its (overridable) element name.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::err::{GeneratorError, GeneratorResult};
use crate::field_value::FieldValue;
use crate::generator::{DocumentBuilder, Generator};
use crate::hash_generator::{FieldTypeHashGenerator, JsonFieldTypeHashGenerator};
use crate::node::{Node, Scalar};
use crate::normalizer::NormalizerRegistry;
use crate::settings::OutputSettings;

const TEXT_KEY: &str = "#text";

pub struct JsonGenerator {
    builder: DocumentBuilder,
    hash_generator: JsonFieldTypeHashGenerator,
    vendor: String,
    pretty: bool,
}

impl JsonGenerator {
    pub fn new(settings: &OutputSettings) -> Self {
        Self::with_normalizers(settings, Arc::new(NormalizerRegistry::new()))
    }

    pub fn with_normalizers(
        settings: &OutputSettings,
        normalizers: Arc<NormalizerRegistry>,
    ) -> Self {
        JsonGenerator {
            builder: DocumentBuilder::new(),
            hash_generator: JsonFieldTypeHashGenerator::new(normalizers, settings.is_strict()),
            vendor: settings.vendor_name().to_owned(),
            pretty: settings.should_pretty_print(),
        }
    }
}

impl Generator for JsonGenerator {
    fn start_document(&mut self, name: &str) -> GeneratorResult<()> {
        self.builder.start_document(name)
    }

    fn end_document(&mut self, name: &str) -> GeneratorResult<String> {
        let members = self.builder.take_document(name)?;

        let mut root = Map::with_capacity(members.len());
        for (key, node) in members {
            root.insert(key, node_to_json(node)?);
        }
        let document = Value::Object(root);

        let encoded = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(encoded)
    }

    fn start_object_element_with_media_type(
        &mut self,
        name: &str,
        media_type_name: Option<&str>,
    ) -> GeneratorResult<()> {
        self.builder.start_object_element(name)?;
        let media_type = self.get_media_type(media_type_name.unwrap_or(name));
        self.builder
            .start_attribute("media-type", Scalar::String(media_type))?;
        self.builder.end_attribute("media-type")
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
        format!("application/{}.{name}+json", self.vendor)
    }

    fn serialize_bool(&self, value: bool) -> Scalar {
        Scalar::Bool(value)
    }
}

fn node_to_json(node: Node) -> GeneratorResult<Value> {
    match node {
        Node::Scalar(scalar) => scalar_to_json(scalar),
        Node::Value(value) => {
            let mut map = Map::with_capacity(value.attributes.len() + 1);
            for (name, attribute) in value.attributes {
                map.insert(format!("_{name}"), scalar_to_json(attribute)?);
            }
            map.insert(TEXT_KEY.to_owned(), scalar_to_json(value.value)?);
            Ok(Value::Object(map))
        }
        Node::Object(object) => {
            let mut map = Map::with_capacity(object.attributes.len() + object.members.len());
            for (name, attribute) in object.attributes {
                map.insert(format!("_{name}"), scalar_to_json(attribute)?);
            }
            for (name, member) in object.members {
                map.insert(name, node_to_json(member)?);
            }
            Ok(Value::Object(map))
        }
        Node::List(list) => {
            let mut items = Vec::with_capacity(list.items.len());
            for item in list.items {
                items.push(node_to_json(item)?);
            }
            Ok(Value::Array(items))
        }
    }
}

fn scalar_to_json(scalar: Scalar) -> GeneratorResult<Value> {
    match scalar {
        Scalar::Null => Ok(Value::Null),
        Scalar::Bool(value) => Ok(Value::Bool(value)),
        Scalar::Int(value) => Ok(Value::from(value)),
        Scalar::Float(value) => serde_json::Number::from_f64(value)
            .map(Value::Number)
            .ok_or(GeneratorError::NonFiniteFloat { value }),
        Scalar::String(value) => Ok(Value::String(value)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::node::Scalar;
    use crate::settings::OutputSettings;

    use super::*;

    fn generator() -> JsonGenerator {
        JsonGenerator::new(&OutputSettings::new())
    }

    #[test]
    fn test_media_type() {
        let generator = generator();
        assert_eq!(
            generator.get_media_type("Section"),
            "application/vnd.ibexa.api.Section+json"
        );
    }

    #[test]
    fn test_media_type_with_custom_vendor() {
        let generator = JsonGenerator::new(&OutputSettings::new().vendor("vnd.example.cms"));
        assert_eq!(
            generator.get_media_type("Section"),
            "application/vnd.example.cms.Section+json"
        );
    }

    #[test]
    fn test_object_element_carries_media_type_attribute() {
        let mut generator = generator();
        generator.start_document("test").unwrap();
        generator.start_object_element("element").unwrap();
        generator
            .attribute("attribute", Scalar::from("value"))
            .unwrap();
        generator.end_object_element("element").unwrap();

        assert_eq!(
            generator.end_document("test").unwrap(),
            r#"{"element":{"_media-type":"application/vnd.ibexa.api.element+json","_attribute":"value"}}"#
        );
    }

    #[test]
    fn test_media_type_name_override() {
        let mut generator = generator();
        generator.start_document("test").unwrap();
        generator
            .start_object_element_with_media_type("element", Some("Section"))
            .unwrap();
        generator.end_object_element("element").unwrap();

        assert_eq!(
            generator.end_document("test").unwrap(),
            r#"{"element":{"_media-type":"application/vnd.ibexa.api.Section+json"}}"#
        );
    }

    #[test]
    fn test_lists_render_as_anonymous_arrays() {
        let mut generator = generator();
        generator.start_document("test").unwrap();
        generator.start_object_element("SectionList").unwrap();
        generator.start_list("sections").unwrap();
        generator.start_object_element("Section").unwrap();
        generator.end_object_element("Section").unwrap();
        generator.start_object_element("Section").unwrap();
        generator.end_object_element("Section").unwrap();
        generator.end_list("sections").unwrap();
        generator.end_object_element("SectionList").unwrap();

        assert_eq!(
            generator.end_document("test").unwrap(),
            concat!(
                r#"{"SectionList":{"_media-type":"application/vnd.ibexa.api.SectionList+json","#,
                r#""sections":[{"_media-type":"application/vnd.ibexa.api.Section+json"},"#,
                r#"{"_media-type":"application/vnd.ibexa.api.Section+json"}]}}"#
            )
        );
    }

    #[test]
    fn test_empty_list_renders_as_empty_array() {
        let mut generator = generator();
        generator.start_document("test").unwrap();
        generator.start_object_element("element").unwrap();
        generator.start_list("items").unwrap();
        generator.end_list("items").unwrap();
        generator.end_object_element("element").unwrap();

        assert_eq!(
            generator.end_document("test").unwrap(),
            r#"{"element":{"_media-type":"application/vnd.ibexa.api.element+json","items":[]}}"#
        );
    }

    #[test]
    fn test_value_element_with_attributes() {
        let mut generator = generator();
        generator.start_document("test").unwrap();
        generator.start_object_element("element").unwrap();
        generator
            .start_value_element_with_attributes(
                "value",
                Scalar::Int(42),
                &[("unit", Scalar::from("px"))],
            )
            .unwrap();
        generator.end_value_element("value").unwrap();
        generator.end_object_element("element").unwrap();

        assert_eq!(
            generator.end_document("test").unwrap(),
            concat!(
                r#"{"element":{"_media-type":"application/vnd.ibexa.api.element+json","#,
                r##""value":{"_unit":"px","#text":42}}}"##
            )
        );
    }

    #[test]
    fn test_booleans_are_native() {
        let mut generator = generator();
        assert_eq!(generator.serialize_bool(true), Scalar::Bool(true));
        assert_eq!(generator.serialize_bool(false), Scalar::Bool(false));

        generator.start_document("test").unwrap();
        generator.start_object_element("element").unwrap();
        let hidden = generator.serialize_bool(true);
        generator.start_value_element("hidden", hidden).unwrap();
        generator.end_value_element("hidden").unwrap();
        generator.end_object_element("element").unwrap();

        assert_eq!(
            generator.end_document("test").unwrap(),
            r#"{"element":{"_media-type":"application/vnd.ibexa.api.element+json","hidden":true}}"#
        );
    }

    #[test]
    fn test_non_finite_float_fails_encoding() {
        let mut generator = generator();
        generator.start_document("test").unwrap();
        generator.start_object_element("element").unwrap();
        generator
            .start_value_element("ratio", Scalar::Float(f64::NAN))
            .unwrap();
        generator.end_value_element("ratio").unwrap();
        generator.end_object_element("element").unwrap();

        match generator.end_document("test") {
            Err(GeneratorError::NonFiniteFloat { .. }) => {}
            other => panic!("expected a non-finite float error, got {other:?}"),
        }
    }

    #[test]
    fn test_pretty_printing() {
        let mut generator = JsonGenerator::new(&OutputSettings::new().pretty(true));
        generator.start_document("test").unwrap();
        generator.start_object_element("element").unwrap();
        generator.end_object_element("element").unwrap();

        let expected = "{\n  \"element\": {\n    \"_media-type\": \"application/vnd.ibexa.api.element+json\"\n  }\n}";
        assert_eq!(generator.end_document("test").unwrap(), expected);
    }

    #[test]
    fn test_field_type_hash_renders_as_plain_object() {
        let mut generator = generator();
        generator.start_document("test").unwrap();
        generator.start_object_element("field").unwrap();
        generator
            .generate_field_type_hash(
                "fieldValue",
                &FieldValue::Map(vec![
                    ("north".to_owned(), FieldValue::from(56.7)),
                    ("east".to_owned(), FieldValue::from(11.9)),
                ]),
            )
            .unwrap();
        generator.end_object_element("field").unwrap();

        assert_eq!(
            generator.end_document("test").unwrap(),
            concat!(
                r#"{"field":{"_media-type":"application/vnd.ibexa.api.field+json","#,
                r#""fieldValue":{"north":56.7,"east":11.9}}}"#
            )
        );
    }
}
