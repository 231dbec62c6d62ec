use fixtures::*;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use restgen::{
    FieldValue, Generator, JsonGenerator, NormalizerRegistry, OutputSettings, TypedNormalizer,
    XmlGenerator,
};

struct Coordinates {
    latitude: f64,
    longitude: f64,
}

fn registry_with_coordinates() -> Arc<NormalizerRegistry> {
    let mut registry = NormalizerRegistry::new();
    registry.register(TypedNormalizer::new(|value: &Coordinates| {
        Ok(json!({"latitude": value.latitude, "longitude": value.longitude}))
    }));
    Arc::new(registry)
}

fn render_json(settings: &OutputSettings, registry: Arc<NormalizerRegistry>, value: &FieldValue) -> String {
    let mut generator = JsonGenerator::with_normalizers(settings, registry);
    generator.start_document("Field").unwrap();
    generator.start_object_element("Field").unwrap();
    generator.generate_field_type_hash("fieldValue", value).unwrap();
    generator.end_object_element("Field").unwrap();
    generator.end_document("Field").unwrap()
}

#[test]
fn test_normalized_object_renders_like_a_hash() {
    ensure_capture_logger_initialized();

    let value = FieldValue::opaque(Coordinates {
        latitude: 56.7,
        longitude: 11.9,
    });
    let output = render_json(
        &OutputSettings::new(),
        registry_with_coordinates(),
        &value,
    );

    assert_eq!(
        output,
        concat!(
            r#"{"Field":{"_media-type":"application/vnd.ibexa.api.Field+json","#,
            r#""fieldValue":{"latitude":56.7,"longitude":11.9}}}"#
        )
    );
}

#[test]
fn test_unregistered_object_degrades_to_null_and_logs_once() {
    ensure_capture_logger_initialized();
    struct UnrenderableWidget;

    take_captured_errors();
    let value = FieldValue::opaque(UnrenderableWidget);
    let output = render_json(
        &OutputSettings::new(),
        Arc::new(NormalizerRegistry::new()),
        &value,
    );

    assert_eq!(
        output,
        r#"{"Field":{"_media-type":"application/vnd.ibexa.api.Field+json","fieldValue":null}}"#
    );

    let errors: Vec<String> = take_captured_errors()
        .into_iter()
        .filter(|message| message.contains("UnrenderableWidget"))
        .collect();
    assert_eq!(errors.len(), 1, "expected exactly one logged error: {errors:?}");
    assert!(
        errors[0].contains("FieldTypeNormalizer"),
        "the error should name the registration seam: {}",
        errors[0]
    );
}

#[test]
fn test_strict_mode_propagates_and_produces_no_node() {
    ensure_capture_logger_initialized();
    struct UnrenderableWidget;

    let mut generator = JsonGenerator::with_normalizers(
        &OutputSettings::new().strict(true),
        Arc::new(NormalizerRegistry::new()),
    );
    generator.start_document("Field").unwrap();
    generator.start_object_element("Field").unwrap();

    let value = FieldValue::opaque(UnrenderableWidget);
    assert!(generator.generate_field_type_hash("fieldValue", &value).is_err());

    // The failed hash left nothing behind; the element is still usable.
    generator.end_object_element("Field").unwrap();
    assert_eq!(
        generator.end_document("Field").unwrap(),
        r#"{"Field":{"_media-type":"application/vnd.ibexa.api.Field+json"}}"#
    );
}

#[test]
fn test_numeric_keyed_hash_renders_as_list_in_both_formats() {
    ensure_capture_logger_initialized();

    // All-integer keys classify as a list even when sparse; the original
    // indices are dropped.
    let value = FieldValue::from_json(json!({"0": "first", "2": "second"}));

    let json_output = render_json(
        &OutputSettings::new(),
        Arc::new(NormalizerRegistry::new()),
        &value,
    );
    assert_eq!(
        json_output,
        concat!(
            r#"{"Field":{"_media-type":"application/vnd.ibexa.api.Field+json","#,
            r#""fieldValue":["first","second"]}}"#
        )
    );

    let mut generator = XmlGenerator::new(&OutputSettings::new());
    generator.start_document("Field").unwrap();
    generator.start_object_element("Field").unwrap();
    generator.generate_field_type_hash("fieldValue", &value).unwrap();
    generator.end_object_element("Field").unwrap();

    assert_eq!(
        generator.end_document("Field").unwrap(),
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<Field><fieldValue><value>first</value><value>second</value></fieldValue></Field>"#
        )
    );
}

#[test]
fn test_nested_hash_value_in_xml() {
    ensure_capture_logger_initialized();

    let value = FieldValue::from_json(json!({
        "authors": [
            {"id": 138, "name": "Ben"}
        ]
    }));

    let mut generator = XmlGenerator::new(&OutputSettings::new());
    generator.start_document("Field").unwrap();
    generator.start_object_element("Field").unwrap();
    generator.generate_field_type_hash("fieldValue", &value).unwrap();
    generator.end_object_element("Field").unwrap();

    assert_eq!(
        generator.end_document("Field").unwrap(),
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<Field><fieldValue><value key="authors">"#,
            r#"<value><value key="id">138</value><value key="name">Ben</value></value>"#,
            r#"</value></fieldValue></Field>"#
        )
    );
}
