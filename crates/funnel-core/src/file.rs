//! In-memory representation of a user-supplied file.

/// MIME types for the extensions the app commonly sees.
///
/// Browsers report a file's type from the same kind of table, so the
/// extension is the only input needed.
const KNOWN_TYPES: &[(&str, &str)] = &[
    ("json", "application/json"),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("pdf", "application/pdf"),
];

/// Extension of a filename without the dot, if it has one.
#[must_use]
pub fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Guess a MIME type from a filename's extension.
///
/// Returns an empty string for unknown extensions, matching what a
/// browser reports for `File.type` in that case.
#[must_use]
pub fn guess_mime_type(name: &str) -> &'static str {
    extension(name)
        .and_then(|ext| {
            KNOWN_TYPES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        })
        .map_or("", |(_, mime)| *mime)
}

/// The type the browser reported for a file, or a guess from its name
/// when the browser left it blank.
#[must_use]
pub fn resolve_mime_type(name: &str, reported: Option<&str>) -> String {
    reported
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
        .map_or_else(|| guess_mime_type(name).to_owned(), str::to_owned)
}

/// A file handed to the app by the user, fully read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelFile {
    /// Filename as reported by the picker or drop event.
    pub name: String,
    /// MIME type, empty when unknown.
    pub mime_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl FunnelFile {
    /// Build a file whose MIME type is guessed from its name.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = guess_mime_type(&name).to_owned();
        Self {
            name,
            mime_type,
            bytes,
        }
    }

    /// Build a file carrying the type reported by the picker or drop
    /// event, guessing only when none was reported.
    #[must_use]
    pub fn with_reported_type(
        name: impl Into<String>,
        reported: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        let name = name.into();
        let mime_type = resolve_mime_type(&name, reported);
        Self {
            name,
            mime_type,
            bytes,
        }
    }
}
