//! Raw Decoder Registry
//!
//! Resolves the raw-decoder identifier found in configuration to a
//! constructor. Callers register alternate Reed-Solomon implementations here.

use std::collections::BTreeMap;

use super::{RsRawDecoder, XorRawDecoder};
use crate::domain::ports::RawErasureDecoder;

/// Constructor for a fresh, uninitialized raw decoder.
pub type RawDecoderFactory = fn() -> Box<dyn RawErasureDecoder>;

/// Identifier of the built-in Reed-Solomon decoder.
pub const RS_DEFAULT: &str = "rs-default";

/// Identifier of the built-in XOR decoder.
pub const XOR: &str = "xor";

/// Name to factory mapping.
#[derive(Clone)]
pub struct RawDecoderRegistry {
    factories: BTreeMap<String, RawDecoderFactory>,
}

impl std::fmt::Debug for RawDecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDecoderRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl Default for RawDecoderRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl RawDecoderRegistry {
    /// A registry with no entries.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry holding the built-in decoders.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("rs", RsRawDecoder::boxed);
        registry.register(RS_DEFAULT, RsRawDecoder::boxed);
        registry.register(XOR, XorRawDecoder::boxed);
        registry
    }

    /// Register (or replace) a factory under `name`.
    pub fn register(&mut self, name: impl Into<String>, factory: RawDecoderFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Build a new decoder for `name`, if registered.
    pub fn create(&self, name: &str) -> Option<Box<dyn RawErasureDecoder>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}
