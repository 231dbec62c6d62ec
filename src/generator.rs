//! The one API visitors use to build an output document.
//!
//! Visitors are written once against the [`Generator`] trait; the wire
//! format divergence (attribute conventions, list representation, root
//! element derivation, boolean literals) lives entirely in the two
//! concrete backends. Both backends drive the same [`DocumentBuilder`]
//! state machine, which enforces the legal call sequence and fails fast on
//! every violation.

use log::trace;

use crate::err::{GeneratorError, GeneratorResult};
use crate::field_value::FieldValue;
use crate::node::{ListNode, Node, ObjectNode, Scalar, ValueNode};

pub trait Generator {
    /// Initializes the document. Fails if a document is already in
    /// progress or was ended without an intervening [`reset`](Self::reset).
    fn start_document(&mut self, name: &str) -> GeneratorResult<()>;

    /// Serializes the finished tree to the wire format and returns it.
    /// Fails unless `name` matches `start_document` and every started
    /// scope has been ended.
    fn end_document(&mut self, name: &str) -> GeneratorResult<String>;

    fn start_object_element(&mut self, name: &str) -> GeneratorResult<()> {
        self.start_object_element_with_media_type(name, None)
    }

    /// Starts an object element whose media type is derived from
    /// `media_type_name` instead of `name`.
    fn start_object_element_with_media_type(
        &mut self,
        name: &str,
        media_type_name: Option<&str>,
    ) -> GeneratorResult<()>;

    fn end_object_element(&mut self, name: &str) -> GeneratorResult<()>;

    fn start_list(&mut self, name: &str) -> GeneratorResult<()>;

    fn end_list(&mut self, name: &str) -> GeneratorResult<()>;

    fn start_attribute(&mut self, name: &str, value: Scalar) -> GeneratorResult<()>;

    fn end_attribute(&mut self, name: &str) -> GeneratorResult<()>;

    /// Single-call form of `start_attribute` / `end_attribute`.
    fn attribute(&mut self, name: &str, value: Scalar) -> GeneratorResult<()> {
        self.start_attribute(name, value)?;
        self.end_attribute(name)
    }

    fn start_value_element(&mut self, name: &str, value: Scalar) -> GeneratorResult<()> {
        self.start_value_element_with_attributes(name, value, &[])
    }

    /// Attaches a scalar, wrapped with its own attributes when any are
    /// given, as a named member of the current object element, or
    /// positionally when the current container is a list.
    fn start_value_element_with_attributes(
        &mut self,
        name: &str,
        value: Scalar,
        attributes: &[(&str, Scalar)],
    ) -> GeneratorResult<()>;

    fn end_value_element(&mut self, name: &str) -> GeneratorResult<()>;

    /// Recursively folds a field-type hash value into the document under
    /// `name`, delegating opaque objects to the normalizer chain.
    fn generate_field_type_hash(&mut self, name: &str, value: &FieldValue) -> GeneratorResult<()>;

    /// True until the first `start_object_element` or `start_list` after
    /// `start_document`. Callers use this to skip serialization entirely
    /// (e.g. a no-content response).
    fn is_empty(&self) -> bool;

    /// Clears all state so the same instance can build another document;
    /// used to re-render an error document after a partial build failed.
    fn reset(&mut self);

    /// Vendor media type for `name` in this generator's wire format, e.g.
    /// `application/vnd.ibexa.api.Section+json`.
    fn get_media_type(&self, name: &str) -> String;

    /// Format-specific boolean representation: native for JSON, the
    /// `true`/`false` literal text for XML.
    fn serialize_bool(&self, value: bool) -> Scalar;
}

#[derive(Debug)]
enum Frame {
    Root { members: Vec<(String, Node)> },
    Object { name: String, node: ObjectNode },
    List { node: ListNode },
    Value { name: String },
    Attribute { name: String },
}

impl Frame {
    fn describe(&self) -> String {
        match self {
            Frame::Root { .. } => "the document root".to_owned(),
            Frame::Object { name, .. } => format!("object element `{name}`"),
            Frame::List { node } => format!("list `{}`", node.name),
            Frame::Value { name } => format!("value element `{name}`"),
            Frame::Attribute { name } => format!("attribute `{name}`"),
        }
    }
}

/// Explicit stack of in-progress nodes plus the document name and emptiness
/// flag. Every public generator operation is a precondition check against
/// this state; a node is attached to its parent only when its scope ends.
#[derive(Debug)]
pub(crate) struct DocumentBuilder {
    stack: Vec<Frame>,
    document_name: Option<String>,
    finished: bool,
    empty: bool,
}

impl DocumentBuilder {
    pub(crate) fn new() -> Self {
        DocumentBuilder {
            stack: Vec::new(),
            document_name: None,
            finished: false,
            empty: true,
        }
    }

    pub(crate) fn reset(&mut self) {
        trace!("reset");
        *self = DocumentBuilder::new();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.empty
    }

    fn require_open(&self, operation: &'static str) -> GeneratorResult<()> {
        if self.finished {
            return Err(GeneratorError::contract(
                operation,
                "the document has already been ended, reset the generator before reuse",
            ));
        }
        if self.document_name.is_none() {
            return Err(GeneratorError::contract(
                operation,
                "no document has been started",
            ));
        }
        Ok(())
    }

    /// Top of stack; the root frame outlives every operation between
    /// `start_document` and `end_document`, so the stack is never empty
    /// here.
    fn top(&self) -> &Frame {
        self.stack
            .last()
            .unwrap_or_else(|| unreachable!("require_open guarantees an open root frame"))
    }

    fn attach(&mut self, name: String, node: Node) {
        match self
            .stack
            .last_mut()
            .unwrap_or_else(|| unreachable!("require_open guarantees an open root frame"))
        {
            Frame::Root { members } => members.push((name, node)),
            Frame::Object { node: parent, .. } => parent.push_member(name, node),
            Frame::List { node: parent } => parent.push_item(node),
            Frame::Value { .. } | Frame::Attribute { .. } => {
                unreachable!("start checks reject children of value elements and attributes")
            }
        }
    }

    pub(crate) fn start_document(&mut self, name: &str) -> GeneratorResult<()> {
        trace!("start_document: {name}");
        if let Some(current) = &self.document_name {
            return Err(GeneratorError::contract(
                "start_document",
                format!("a document named `{current}` is already in progress, reset the generator first"),
            ));
        }
        self.stack.push(Frame::Root {
            members: Vec::new(),
        });
        self.document_name = Some(name.to_owned());
        self.empty = true;
        Ok(())
    }

    /// Validates the end-of-document contract and hands the top-level
    /// members to the backend for serialization.
    pub(crate) fn take_document(&mut self, name: &str) -> GeneratorResult<Vec<(String, Node)>> {
        trace!("end_document: {name}");
        self.require_open("end_document")?;

        let document_name = self
            .document_name
            .as_deref()
            .unwrap_or_else(|| unreachable!("require_open checked the document name"));
        if document_name != name {
            return Err(GeneratorError::contract(
                "end_document",
                format!("expected to end document `{document_name}`, got `{name}`"),
            ));
        }
        if self.stack.len() != 1 {
            return Err(GeneratorError::contract(
                "end_document",
                format!("{} is still open", self.top().describe()),
            ));
        }

        if let Frame::Root { members } = self.top() {
            if members.is_empty() {
                return Err(GeneratorError::contract(
                    "end_document",
                    "the document is empty, nothing to serialize",
                ));
            }
        }
        let Some(Frame::Root { members }) = self.stack.pop() else {
            unreachable!("depth check left exactly the root frame");
        };
        self.finished = true;
        Ok(members)
    }

    pub(crate) fn start_object_element(&mut self, name: &str) -> GeneratorResult<()> {
        trace!("start_object_element: {name}");
        self.require_open("start_object_element")?;
        match self.top() {
            Frame::Root { .. } | Frame::Object { .. } | Frame::List { .. } => {}
            other => {
                return Err(GeneratorError::contract(
                    "start_object_element",
                    format!("cannot start object element `{name}` inside {}", other.describe()),
                ));
            }
        }
        self.stack.push(Frame::Object {
            name: name.to_owned(),
            node: ObjectNode::new(),
        });
        self.empty = false;
        Ok(())
    }

    pub(crate) fn end_object_element(&mut self, name: &str) -> GeneratorResult<()> {
        trace!("end_object_element: {name}");
        self.require_open("end_object_element")?;
        match self.top() {
            Frame::Object { name: current, .. } if current == name => {}
            other => {
                return Err(GeneratorError::contract(
                    "end_object_element",
                    format!("expected to end {}, got object element `{name}`", other.describe()),
                ));
            }
        }
        let Some(Frame::Object { name, node }) = self.stack.pop() else {
            unreachable!("top was just matched as an object frame");
        };
        self.attach(name, Node::Object(node));
        Ok(())
    }

    pub(crate) fn start_list(&mut self, name: &str) -> GeneratorResult<()> {
        trace!("start_list: {name}");
        self.require_open("start_list")?;
        match self.top() {
            Frame::Root { .. } | Frame::Object { .. } | Frame::List { .. } => {}
            other => {
                return Err(GeneratorError::contract(
                    "start_list",
                    format!("cannot start list `{name}` inside {}", other.describe()),
                ));
            }
        }
        self.stack.push(Frame::List {
            node: ListNode::new(name),
        });
        self.empty = false;
        Ok(())
    }

    pub(crate) fn end_list(&mut self, name: &str) -> GeneratorResult<()> {
        trace!("end_list: {name}");
        self.require_open("end_list")?;
        match self.top() {
            Frame::List { node } if node.name == name => {}
            other => {
                return Err(GeneratorError::contract(
                    "end_list",
                    format!("expected to end {}, got list `{name}`", other.describe()),
                ));
            }
        }
        let Some(Frame::List { node }) = self.stack.pop() else {
            unreachable!("top was just matched as a list frame");
        };
        self.attach(node.name.clone(), Node::List(node));
        Ok(())
    }

    pub(crate) fn start_attribute(&mut self, name: &str, value: Scalar) -> GeneratorResult<()> {
        trace!("start_attribute: {name}");
        self.require_open("start_attribute")?;
        match self
            .stack
            .last_mut()
            .unwrap_or_else(|| unreachable!("require_open guarantees an open root frame"))
        {
            Frame::Object { node, .. } => node.set_attribute(name, value),
            Frame::List { .. } => {
                return Err(GeneratorError::contract(
                    "start_attribute",
                    format!("attributes are not valid directly under a list, tried `{name}`"),
                ));
            }
            other => {
                return Err(GeneratorError::contract(
                    "start_attribute",
                    format!("cannot attach attribute `{name}` to {}", other.describe()),
                ));
            }
        }
        self.stack.push(Frame::Attribute {
            name: name.to_owned(),
        });
        Ok(())
    }

    pub(crate) fn end_attribute(&mut self, name: &str) -> GeneratorResult<()> {
        trace!("end_attribute: {name}");
        self.require_open("end_attribute")?;
        match self.top() {
            Frame::Attribute { name: current } if current == name => {}
            other => {
                return Err(GeneratorError::contract(
                    "end_attribute",
                    format!("expected to end {}, got attribute `{name}`", other.describe()),
                ));
            }
        }
        self.stack.pop();
        Ok(())
    }

    pub(crate) fn start_value_element(
        &mut self,
        name: &str,
        value: Scalar,
        attributes: &[(&str, Scalar)],
    ) -> GeneratorResult<()> {
        trace!("start_value_element: {name}");
        self.require_open("start_value_element")?;
        match self.top() {
            Frame::Object { .. } | Frame::List { .. } => {}
            Frame::Root { .. } => {
                return Err(GeneratorError::contract(
                    "start_value_element",
                    format!(
                        "value element `{name}` requires an enclosing object element or list"
                    ),
                ));
            }
            other => {
                return Err(GeneratorError::contract(
                    "start_value_element",
                    format!("cannot start value element `{name}` inside {}", other.describe()),
                ));
            }
        }

        let node = if attributes.is_empty() {
            Node::Scalar(value)
        } else {
            Node::Value(ValueNode {
                attributes: attributes
                    .iter()
                    .map(|(attr_name, attr_value)| ((*attr_name).to_owned(), attr_value.clone()))
                    .collect(),
                value,
            })
        };
        self.attach(name.to_owned(), node);
        self.stack.push(Frame::Value {
            name: name.to_owned(),
        });
        Ok(())
    }

    pub(crate) fn end_value_element(&mut self, name: &str) -> GeneratorResult<()> {
        trace!("end_value_element: {name}");
        self.require_open("end_value_element")?;
        match self.top() {
            Frame::Value { name: current } if current == name => {}
            other => {
                return Err(GeneratorError::contract(
                    "end_value_element",
                    format!("expected to end {}, got value element `{name}`", other.describe()),
                ));
            }
        }
        self.stack.pop();
        Ok(())
    }

    /// Attaches an already-built hash node under `name`.
    pub(crate) fn attach_hash(&mut self, name: &str, node: Node) -> GeneratorResult<()> {
        trace!("generate_field_type_hash: {name}");
        self.require_open("generate_field_type_hash")?;
        match self.top() {
            Frame::Object { .. } | Frame::List { .. } => {}
            other => {
                return Err(GeneratorError::contract(
                    "generate_field_type_hash",
                    format!(
                        "field type hash `{name}` requires an enclosing object element or list, \
                         current scope is {}",
                        other.describe()
                    ),
                ));
            }
        }
        self.attach(name.to_owned(), node);
        Ok(())
    }
}
