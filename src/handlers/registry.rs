//! Handler registry
//!
//! Maps file extensions to document handlers. The registry is built once at
//! startup and passed by reference to the extractor; there is no global
//! table.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use log::debug;

use crate::errors::{ExtractError, ExtractResult};
use super::factory::{DocumentFormat, HandlerFactory};
use super::handler::ExtractorHandler;

/// Registry of document handlers keyed by lower-case extension
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn ExtractorHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        HandlerRegistry {
            handlers: HashMap::new(),
        }
    }

    /// Create a registry with a handler for every supported format
    pub fn with_default_handlers() -> Self {
        let mut registry = HandlerRegistry::new();
        for format in DocumentFormat::all() {
            registry.register(format.extensions(), HandlerFactory::create_handler(*format));
        }
        registry
    }

    /// Register a handler for one or more extensions
    ///
    /// Extensions are normalized (leading dot removed, lower-cased). When an
    /// extension is already registered, the new handler replaces the old one.
    pub fn register(&mut self, extensions: &[&str], handler: Box<dyn ExtractorHandler>) {
        let handler: Arc<dyn ExtractorHandler> = Arc::from(handler);
        for ext in extensions {
            let key = normalize_extension(ext);
            if let Some(previous) = self.handlers.insert(key.clone(), Arc::clone(&handler)) {
                debug!("Extension .{} moved from {} handler to {} handler", key, previous.name(), handler.name());
            }
        }
    }

    /// Find the handler for an extension
    pub fn resolve(&self, extension: &str) -> ExtractResult<&dyn ExtractorHandler> {
        let key = normalize_extension(extension);
        match self.handlers.get(&key) {
            Some(handler) => Ok(handler.as_ref()),
            None => Err(ExtractError::UnsupportedFormat {
                extension: key,
                supported: self.supported_extensions(),
            }),
        }
    }

    /// Find the handler for a file based on its extension
    pub fn resolve_path(&self, path: &Path) -> ExtractResult<&dyn ExtractorHandler> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.resolve(&extension)
    }

    /// Registered extensions, sorted
    pub fn supported_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.handlers.keys().cloned().collect();
        extensions.sort();
        extensions
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_default_handlers()
    }
}

/// Lower-case an extension and strip a leading dot
fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}
