//! Reading picked or dropped files into memory.

use std::future::Future;

use dioxus::html::FileData;
use funnel_core::file::resolve_mime_type;
use funnel_core::{AcceptFilter, FunnelFile};

/// A file from a picker or drop event that has not been read yet.
pub trait PickedFile {
    fn file_name(&self) -> String;

    /// MIME type reported by the browser, `None` or empty when unknown.
    fn reported_type(&self) -> Option<String>;

    fn read_contents(&self) -> impl Future<Output = Result<Vec<u8>, String>>;
}

impl PickedFile for FileData {
    fn file_name(&self) -> String {
        self.name()
    }

    fn reported_type(&self) -> Option<String> {
        self.content_type()
    }

    fn read_contents(&self) -> impl Future<Output = Result<Vec<u8>, String>> {
        async move {
            self.read_bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .map_err(|e| e.to_string())
        }
    }
}

/// Read every file `filter` accepts, in the order given.
///
/// Files are matched on their name and the type the browser reported,
/// falling back to a guess from the extension. Rejected files are
/// skipped silently. Files the browser fails to read are logged and
/// skipped.
#[allow(clippy::future_not_send)] // WASM is single-threaded; FileData is !Send
pub async fn read_accepted<F: PickedFile>(
    files: Vec<F>,
    filter: &AcceptFilter,
) -> Vec<FunnelFile> {
    let accepted = filter.retain_accepted(files, |file| {
        let name = file.file_name();
        let mime_type = resolve_mime_type(&name, file.reported_type().as_deref());
        (name, mime_type)
    });

    let mut read = Vec::with_capacity(accepted.len());
    for file in accepted {
        let name = file.file_name();
        let reported = file.reported_type();
        match file.read_contents().await {
            Ok(bytes) => read.push(FunnelFile::with_reported_type(
                name,
                reported.as_deref(),
                bytes,
            )),
            Err(e) => tracing::warn!(file = %name, error = %e, "failed to read file"),
        }
    }
    read
}

/// Read the accepted files and hand them to `on_upload` in one call.
///
/// `on_upload` is not called when nothing was accepted and read.
#[allow(clippy::future_not_send)] // WASM is single-threaded
pub async fn deliver<F: PickedFile>(
    files: Vec<F>,
    filter: &AcceptFilter,
    on_upload: impl FnOnce(Vec<FunnelFile>),
) {
    let accepted = read_accepted(files, filter).await;
    if !accepted.is_empty() {
        on_upload(accepted);
    }
}
