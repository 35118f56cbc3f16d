//! Supplier of the opaque professional-context block.

use serde_json::Value;

/// Provides the context block copied verbatim into each report.
pub trait ProfessionalContextProvider {
    /// Returns the block for this run.
    fn professional_context(&self) -> Value;
}

impl ProfessionalContextProvider for Value {
    fn professional_context(&self) -> Value {
        self.clone()
    }
}

/// Context block that is always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl ProfessionalContextProvider for NoContext {
    fn professional_context(&self) -> Value {
        Value::Object(serde_json::Map::new())
    }
}
