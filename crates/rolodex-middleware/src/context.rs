//! Per-request state carried through the middleware pipeline.

use rolodex_core::RequestId;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// State one request carries through the stages.
///
/// Holds the request ID assigned by the first stage, plus a typed slot
/// map where stages leave records (e.g. the access log entry) for outer
/// stages and tests.
///
/// # Example
///
/// ```
/// use rolodex_middleware::context::MiddlewareContext;
///
/// #[derive(Debug, PartialEq)]
/// struct RouteName(&'static str);
///
/// let mut ctx = MiddlewareContext::new();
/// ctx.set_extension(RouteName("list_contacts"));
///
/// assert_eq!(ctx.get_extension::<RouteName>(), Some(&RouteName("list_contacts")));
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    request_id: RequestId,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a context with a provisional request ID.
    ///
    /// The request ID stage replaces it once the chain starts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Replaces the request ID. Called by the request ID stage only.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Stores `value`, replacing an earlier value of the same type.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Returns the stored value of type `T`, if any.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Takes the stored value of type `T` out of the context.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contexts_get_distinct_ids() {
        let a = MiddlewareContext::new();
        let b = MiddlewareContext::new();
        assert_ne!(a.request_id(), b.request_id());
    }

    #[test]
    fn test_set_request_id() {
        let mut ctx = MiddlewareContext::new();
        let id = RequestId::new();
        ctx.set_request_id(id);
        assert_eq!(ctx.request_id(), id);
    }

    #[test]
    fn test_typed_slots() {
        let mut ctx = MiddlewareContext::new();
        assert!(ctx.get_extension::<u32>().is_none());

        ctx.set_extension(7_u32);
        ctx.set_extension("label");
        assert_eq!(ctx.get_extension::<u32>(), Some(&7));
        assert_eq!(ctx.get_extension::<&str>(), Some(&"label"));

        assert_eq!(ctx.remove_extension::<u32>(), Some(7));
        assert!(ctx.get_extension::<u32>().is_none());
    }
}
