//! Recursive folding of field-type hash values into document nodes.
//!
//! The shared recursion is a total match over the closed [`FieldValue`]
//! set; only the two array constructors differ per wire format, mirroring
//! the object/array split the backends already make:
//!
//! - JSON keeps hashes as plain objects and lists as native arrays.
//! - XML renders both as repeated `<value>` elements, hash entries carrying
//!   their key as a `key` attribute:
//!   `<fieldValue><value key="north">56.7</value></fieldValue>`.

use std::sync::Arc;

use log::error;

use crate::err::GeneratorResult;
use crate::field_value::{FieldValue, OpaqueValue};
use crate::node::{ListNode, Node, ObjectNode, Scalar, ValueNode};
use crate::normalizer::NormalizerRegistry;

pub trait FieldTypeHashGenerator {
    fn normalizers(&self) -> &NormalizerRegistry;

    fn is_strict(&self) -> bool;

    /// Builds the node for a hash (string-keyed) array.
    fn generate_hash_array(&self, entries: &[(String, FieldValue)]) -> GeneratorResult<Node>;

    /// Builds the node for a list (integer-keyed) array attached under
    /// `name`.
    fn generate_list_array(&self, name: &str, items: &[FieldValue]) -> GeneratorResult<Node>;

    /// Converts one hash value into a document node. Scalars pass through;
    /// arrays recurse through the format hooks; opaque objects go through
    /// the normalizer chain first.
    fn generate_value(&self, name: &str, value: &FieldValue) -> GeneratorResult<Node> {
        match value {
            FieldValue::Null => Ok(Node::Scalar(Scalar::Null)),
            FieldValue::Bool(value) => Ok(Node::Scalar(Scalar::Bool(*value))),
            FieldValue::Int(value) => Ok(Node::Scalar(Scalar::Int(*value))),
            FieldValue::Float(value) => Ok(Node::Scalar(Scalar::Float(*value))),
            FieldValue::String(value) => Ok(Node::Scalar(Scalar::String(value.clone()))),
            FieldValue::List(items) => self.generate_list_array(name, items),
            FieldValue::Map(entries) => self.generate_hash_array(entries),
            FieldValue::Opaque(opaque) => self.generate_object_value(name, opaque),
        }
    }

    /// Normalizes an opaque object and recurses into the result. Outside
    /// strict mode a failure degrades to a logged error and a `null` node:
    /// one unserializable field must not abort the whole response.
    fn generate_object_value(&self, name: &str, opaque: &OpaqueValue) -> GeneratorResult<Node> {
        match self.normalizers().normalize(opaque) {
            Ok(normalized) => self.generate_value(name, &FieldValue::from_json(normalized)),
            Err(error) => {
                if self.is_strict() {
                    return Err(error.into());
                }
                error!(
                    "unable to serialize value of type `{}` under `{name}`: {error}",
                    opaque.type_name()
                );
                Ok(Node::Scalar(Scalar::Null))
            }
        }
    }
}

pub struct JsonFieldTypeHashGenerator {
    normalizers: Arc<NormalizerRegistry>,
    strict: bool,
}

impl JsonFieldTypeHashGenerator {
    pub fn new(normalizers: Arc<NormalizerRegistry>, strict: bool) -> Self {
        JsonFieldTypeHashGenerator {
            normalizers,
            strict,
        }
    }
}

impl FieldTypeHashGenerator for JsonFieldTypeHashGenerator {
    fn normalizers(&self) -> &NormalizerRegistry {
        &self.normalizers
    }

    fn is_strict(&self) -> bool {
        self.strict
    }

    fn generate_hash_array(&self, entries: &[(String, FieldValue)]) -> GeneratorResult<Node> {
        let mut object = ObjectNode::new();
        for (key, value) in entries {
            object.push_member(key.clone(), self.generate_value(key, value)?);
        }
        Ok(Node::Object(object))
    }

    fn generate_list_array(&self, name: &str, items: &[FieldValue]) -> GeneratorResult<Node> {
        let mut list = ListNode::new(name);
        for item in items {
            list.push_item(self.generate_value(name, item)?);
        }
        Ok(Node::List(list))
    }
}

pub struct XmlFieldTypeHashGenerator {
    normalizers: Arc<NormalizerRegistry>,
    strict: bool,
}

impl XmlFieldTypeHashGenerator {
    pub fn new(normalizers: Arc<NormalizerRegistry>, strict: bool) -> Self {
        XmlFieldTypeHashGenerator {
            normalizers,
            strict,
        }
    }
}

/// Tag name repeated for every hash entry and list item in XML field
/// values.
const VALUE_TAG: &str = "value";

/// Attribute carrying the original hash key of an entry.
const KEY_ATTRIBUTE: &str = "key";

fn with_key_attribute(node: Node, key: &str) -> Node {
    match node {
        Node::Scalar(value) => Node::Value(ValueNode {
            attributes: vec![(KEY_ATTRIBUTE.to_owned(), Scalar::from(key))],
            value,
        }),
        Node::Value(mut value) => {
            value
                .attributes
                .insert(0, (KEY_ATTRIBUTE.to_owned(), Scalar::from(key)));
            Node::Value(value)
        }
        Node::Object(mut object) => {
            object.set_attribute(KEY_ATTRIBUTE, Scalar::from(key));
            Node::Object(object)
        }
        // Lists cannot carry attributes; wrap one in a keyed container.
        Node::List(list) => {
            let mut object = ObjectNode::new();
            object.set_attribute(KEY_ATTRIBUTE, Scalar::from(key));
            object.push_member(list.name.clone(), Node::List(list));
            Node::Object(object)
        }
    }
}

impl FieldTypeHashGenerator for XmlFieldTypeHashGenerator {
    fn normalizers(&self) -> &NormalizerRegistry {
        &self.normalizers
    }

    fn is_strict(&self) -> bool {
        self.strict
    }

    fn generate_hash_array(&self, entries: &[(String, FieldValue)]) -> GeneratorResult<Node> {
        let mut object = ObjectNode::new();
        for (key, value) in entries {
            let child = self.generate_value(VALUE_TAG, value)?;
            object.push_member(VALUE_TAG, with_key_attribute(child, key));
        }
        Ok(Node::Object(object))
    }

    fn generate_list_array(&self, _name: &str, items: &[FieldValue]) -> GeneratorResult<Node> {
        let mut object = ObjectNode::new();
        for item in items {
            object.push_member(VALUE_TAG, self.generate_value(VALUE_TAG, item)?);
        }
        Ok(Node::Object(object))
    }
}
