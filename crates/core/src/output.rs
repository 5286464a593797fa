//! The dump document and how it reaches disk.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Text of a whole dump, assembled in memory before anything is written.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DumpDocument {
    text: String,
}

impl DumpDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// One line of the image index printed ahead of the declarations.
    pub fn push_image(&mut self, index: usize, name: &str) {
        let _ = writeln!(self.text, "// Image {index}: {name}");
    }

    /// Header that introduces the types of an assembly.
    pub fn begin_assembly(&mut self, name: &str) {
        let _ = write!(self.text, "\n// Dll : {name}");
    }

    pub fn push_type(&mut self, declaration: &str) {
        self.text.push_str(declaration);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Create (or truncate) `path` and write the document to it.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.text.as_bytes())?;
        writer.flush()
    }
}
