//! Turning uploaded files into funnel content.
//!
//! [`FunnelProcessor`] is the seam between the store and whatever knows
//! how to read a funnel out of a file. [`JsonFunnelProcessor`] reads
//! JSON funnel documents (see [`crate::types`]).

use std::collections::HashSet;
use std::future::Future;

use serde_json::error::Category;

use crate::file::{FunnelFile, extension};
use crate::types::FunnelContent;

/// Successful processor output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFunnel {
    pub data: FunnelContent,
}

/// Reasons a file could not be turned into a funnel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessorError {
    /// The file is not a type this processor reads.
    #[error("unsupported file type: {name}")]
    InvalidFileType { name: String },

    /// The file has no content.
    #[error("file is empty: {name}")]
    EmptyFile { name: String },

    /// The file is not well-formed JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The JSON is well-formed but does not describe a funnel.
    #[error("invalid funnel: {0}")]
    InvalidFunnel(String),
}

/// Something that can read a funnel out of a file.
///
/// Implementations may suspend (e.g. to hand the work to a web worker),
/// so the method is async. The returned future does not need to be
/// `Send`; the store runs on a single-threaded executor.
pub trait FunnelProcessor {
    /// Parse `file` into funnel content.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessorError`] describing why the file was rejected.
    fn read_funnel_from_file(
        &self,
        file: &FunnelFile,
    ) -> impl Future<Output = Result<ParsedFunnel, ProcessorError>>;
}

/// Reads funnels from JSON documents.
///
/// Accepts files named `*.json` or typed `application/json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonFunnelProcessor;

impl JsonFunnelProcessor {
    /// Synchronous form of [`FunnelProcessor::read_funnel_from_file`].
    ///
    /// # Errors
    ///
    /// Returns [`ProcessorError::InvalidFileType`] for non-JSON files,
    /// [`ProcessorError::EmptyFile`] for files with only whitespace,
    /// [`ProcessorError::InvalidJson`] for syntax errors, and
    /// [`ProcessorError::InvalidFunnel`] when the document has the wrong
    /// shape or reuses page or block ids.
    pub fn parse(file: &FunnelFile) -> Result<ParsedFunnel, ProcessorError> {
        if !is_json_file(file) {
            return Err(ProcessorError::InvalidFileType {
                name: file.name.clone(),
            });
        }
        if file.bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ProcessorError::EmptyFile {
                name: file.name.clone(),
            });
        }

        let data: FunnelContent = serde_json::from_slice(&file.bytes).map_err(|e| {
            match e.classify() {
                Category::Data => ProcessorError::InvalidFunnel(e.to_string()),
                Category::Io | Category::Syntax | Category::Eof => {
                    ProcessorError::InvalidJson(e.to_string())
                }
            }
        })?;
        check_unique_ids(&data)?;
        Ok(ParsedFunnel { data })
    }
}

impl FunnelProcessor for JsonFunnelProcessor {
    fn read_funnel_from_file(
        &self,
        file: &FunnelFile,
    ) -> impl Future<Output = Result<ParsedFunnel, ProcessorError>> {
        std::future::ready(Self::parse(file))
    }
}

fn is_json_file(file: &FunnelFile) -> bool {
    file.mime_type.eq_ignore_ascii_case("application/json")
        || extension(&file.name).is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Page ids must be unique within a funnel, and block ids across all pages.
fn check_unique_ids(content: &FunnelContent) -> Result<(), ProcessorError> {
    let mut pages = HashSet::new();
    let mut blocks = HashSet::new();
    for page in &content.pages {
        if !pages.insert(page.id.as_str()) {
            return Err(ProcessorError::InvalidFunnel(format!(
                "duplicate page id: {}",
                page.id
            )));
        }
        for block in &page.blocks {
            if !blocks.insert(block.id()) {
                return Err(ProcessorError::InvalidFunnel(format!(
                    "duplicate block id: {}",
                    block.id()
                )));
            }
        }
    }
    Ok(())
}
