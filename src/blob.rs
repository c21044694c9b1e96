//! Named byte payloads flowing through actions.

/// An immutable named byte payload.
///
/// `ByteBlob` is the unit of data flowing through every action: container
/// actions produce one blob per entry, leaf actions consume a blob and either
/// report "no change" or produce a new blob. A blob is never mutated in
/// place; a transformation yields a fresh `ByteBlob`.
///
/// The name is a `/`-separated entry path relative to the enclosing
/// container (e.g. `META-INF/MANIFEST.MF`), or a plain file name for
/// top-level inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBlob {
    name: String,
    data: Vec<u8>,
}

impl ByteBlob {
    /// Creates a new blob from a name and its content bytes.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Returns the entry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the content bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the content length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the blob has no content.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a copy of this blob under a new name.
    ///
    /// Used by actions that rename a resource without touching its content
    /// (e.g. service-loader configuration files whose file name is itself a
    /// qualified class name).
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: self.data.clone(),
        }
    }

    /// Consumes the blob and returns its content bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
