//! Output generation for a content-repository REST API.
//!
//! A value-object visitor walks a domain object and issues calls against
//! the [`Generator`] trait; the generator builds an in-memory document
//! tree and, at [`Generator::end_document`], serializes it to the
//! negotiated wire format. [`JsonGenerator`] and [`XmlGenerator`] share
//! one stack state machine, so a visitor written once produces both
//! formats without branching:
//!
//! ```
//! use restgen::{Generator, JsonGenerator, OutputSettings, Scalar};
//!
//! let mut generator = JsonGenerator::new(&OutputSettings::new());
//! generator.start_document("Section")?;
//! generator.start_object_element("Section")?;
//! generator.attribute("href", Scalar::from("/content/sections/1"))?;
//! generator.end_object_element("Section")?;
//!
//! let body = generator.end_document("Section")?;
//! assert!(body.contains("application/vnd.ibexa.api.Section+json"));
//! # Ok::<(), restgen::GeneratorError>(())
//! ```
//!
//! Field values with arbitrary nested shapes go through
//! [`Generator::generate_field_type_hash`], which classifies lists against
//! maps and delegates rich objects to the [`NormalizerRegistry`].

pub mod err;
mod field_value;
mod generator;
mod hash_generator;
mod json_output;
mod node;
mod normalizer;
mod settings;
mod visitor;
mod xml_output;

pub use err::{GeneratorError, GeneratorResult, NormalizationError, NormalizationResult};
pub use field_value::{FieldValue, OpaqueValue};
pub use generator::Generator;
pub use hash_generator::{
    FieldTypeHashGenerator, JsonFieldTypeHashGenerator, XmlFieldTypeHashGenerator,
};
pub use json_output::JsonGenerator;
pub use node::{ListNode, Node, ObjectNode, Scalar, ValueNode};
pub use normalizer::{FieldTypeNormalizer, NormalizerRegistry, TypedNormalizer};
pub use settings::{DEFAULT_VENDOR, OutputSettings};
pub use visitor::{ValueObjectVisitor, VisitorDispatcher, http_status_message};
pub use xml_output::XmlGenerator;
