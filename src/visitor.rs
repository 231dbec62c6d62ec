//! Dispatch of domain value objects onto the generator.
//!
//! Visitors are the only producers of generator calls; the dispatcher
//! selects one by runtime type and reports a distinct error when no
//! visitor claims the value. Everything a visitor may do is the
//! [`Generator`] trait surface.

use std::any::Any;

use crate::err::{GeneratorError, GeneratorResult};
use crate::generator::Generator;

pub trait ValueObjectVisitor: Send + Sync {
    fn supports(&self, value: &dyn Any) -> bool;

    fn visit(&self, generator: &mut dyn Generator, value: &dyn Any) -> GeneratorResult<()>;
}

#[derive(Default)]
pub struct VisitorDispatcher {
    visitors: Vec<Box<dyn ValueObjectVisitor>>,
}

impl VisitorDispatcher {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn register(&mut self, visitor: impl ValueObjectVisitor + 'static) {
        self.visitors.push(Box::new(visitor));
    }

    /// Routes `value` to the first visitor claiming support for it.
    pub fn visit<T: Any>(
        &self,
        generator: &mut dyn Generator,
        value: &T,
    ) -> GeneratorResult<()> {
        let any: &dyn Any = value;
        for visitor in &self.visitors {
            if visitor.supports(any) {
                return visitor.visit(generator, any);
            }
        }
        Err(GeneratorError::InvalidTypeForVisiting {
            type_name: std::any::type_name::<T>(),
        })
    }
}

/// Reason phrase for an HTTP status code, used by error-document visitors.
pub fn http_status_message(code: u16) -> Option<&'static str> {
    let message = match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        409 => "Conflict",
        410 => "Gone",
        412 => "Precondition Failed",
        413 => "Content Too Large",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Content",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => return None,
    };
    Some(message)
}
