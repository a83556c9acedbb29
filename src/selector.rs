//! Choosing which signatures to replace.
//!
//! The updater asks a [`SignatureSelector`] about every signature in the
//! manifest, in manifest order. Returning `None` skips the signature;
//! returning a reader replaces its body with everything the reader yields.

use std::collections::HashMap;
use std::io::{Cursor, Read};

/// Decides, per signature name, whether and with what to replace it.
pub trait SignatureSelector {
    /// New body for the signature called `name`, or `None` to leave it alone.
    fn select(&mut self, name: &str) -> Option<&mut dyn Read>;
}

/// Selects a single signature by name and replaces it with `body`.
///
/// Records whether the name was ever offered, so the caller can tell
/// "nothing matched" apart from "everything succeeded". Mail allows several
/// signatures with the same name; each of them gets the full body.
#[derive(Debug)]
pub struct NamedSignature {
    name: String,
    body: Cursor<Vec<u8>>,
    found: bool,
}

impl NamedSignature {
    /// Replace the signature called `name` with `body`.
    pub fn new(name: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            body: Cursor::new(body.into()),
            found: false,
        }
    }

    /// Replace the signature called `name` with everything `reader` yields.
    ///
    /// The reader is drained up front so duplicate names all see the same
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if `reader` fails.
    pub fn from_reader(name: impl Into<String>, reader: &mut dyn Read) -> std::io::Result<Self> {
        let mut body = Vec::new();
        reader.read_to_end(&mut body)?;
        Ok(Self::new(name, body))
    }

    /// Name being looked for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a manifest entry with this name was seen.
    pub fn found(&self) -> bool {
        self.found
    }
}

impl SignatureSelector for NamedSignature {
    fn select(&mut self, name: &str) -> Option<&mut dyn Read> {
        if name != self.name {
            return None;
        }
        self.found = true;
        self.body.set_position(0);
        Some(&mut self.body)
    }
}

/// Replaces several signatures with in-memory bodies.
#[derive(Debug, Default)]
pub struct SignatureContents {
    bodies: HashMap<String, Cursor<Vec<u8>>>,
}

impl SignatureContents {
    /// An empty selector that skips everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the signature called `name` with `body`.
    pub fn with(mut self, name: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(name.into(), Cursor::new(body.into()));
        self
    }
}

impl SignatureSelector for SignatureContents {
    fn select(&mut self, name: &str) -> Option<&mut dyn Read> {
        let body = self.bodies.get_mut(name)?;
        // Duplicate names in the manifest each get the full body.
        body.set_position(0);
        Some(body)
    }
}
