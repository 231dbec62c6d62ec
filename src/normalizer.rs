//! Pluggable normalizers for opaque field values.
//!
//! A normalizer flattens one family of rich domain objects into the plain
//! JSON shape the hash generator knows how to fold. Normalizers are tried
//! in registration order; the first one claiming support wins.

use std::any::Any;
use std::marker::PhantomData;

use serde_json::Value;

use crate::err::{NormalizationError, NormalizationResult};
use crate::field_value::OpaqueValue;

pub trait FieldTypeNormalizer: Send + Sync {
    fn supports(&self, value: &dyn Any) -> bool;

    fn normalize(&self, value: &dyn Any) -> NormalizationResult<Value>;
}

#[derive(Default)]
pub struct NormalizerRegistry {
    normalizers: Vec<Box<dyn FieldTypeNormalizer>>,
}

impl NormalizerRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn register(&mut self, normalizer: impl FieldTypeNormalizer + 'static) {
        self.normalizers.push(Box::new(normalizer));
    }

    pub fn normalize(&self, value: &OpaqueValue) -> NormalizationResult<Value> {
        for normalizer in &self.normalizers {
            if normalizer.supports(value.as_any()) {
                return normalizer.normalize(value.as_any());
            }
        }
        Err(NormalizationError::UnsupportedType {
            type_name: value.type_name(),
        })
    }
}

/// Normalizer for a single concrete type, adapting a plain conversion
/// function. Saves implementors the `dyn Any` downcast boilerplate.
pub struct TypedNormalizer<T, F> {
    convert: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> TypedNormalizer<T, F>
where
    T: Any,
    F: Fn(&T) -> NormalizationResult<Value> + Send + Sync,
{
    pub fn new(convert: F) -> Self {
        TypedNormalizer {
            convert,
            _marker: PhantomData,
        }
    }
}

impl<T, F> FieldTypeNormalizer for TypedNormalizer<T, F>
where
    T: Any,
    F: Fn(&T) -> NormalizationResult<Value> + Send + Sync,
{
    fn supports(&self, value: &dyn Any) -> bool {
        value.is::<T>()
    }

    fn normalize(&self, value: &dyn Any) -> NormalizationResult<Value> {
        let value = value.downcast_ref::<T>().ok_or_else(|| {
            NormalizationError::NormalizerFailure {
                type_name: std::any::type_name::<T>(),
                message: "value no longer matches the supported type".to_owned(),
            }
        })?;
        (self.convert)(value)
    }
}
