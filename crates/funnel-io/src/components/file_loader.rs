//! File loader component with drag-and-drop and file picker.

use dioxus::html::HasFileData;
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;
use funnel_core::{AcceptFilter, FunnelFile};

use crate::files::deliver;

/// Props for the [`FileLoader`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileLoaderProps {
    /// Called once per drop or selection with the accepted files.
    on_file_upload: EventHandler<Vec<FunnelFile>>,
    /// File-type filter in HTML `accept` syntax, e.g.
    /// `".json,application/json"`. Everything is accepted when absent.
    accept: Option<String>,
}

/// A drop zone that doubles as a file picker.
///
/// Clicking anywhere opens the picker. Dropped and picked files go
/// through the same `accept` filter; rejected files are left out of the
/// callback without being reported. Nothing is emitted when no file
/// passes the filter.
#[component]
pub fn FileLoader(props: FileLoaderProps) -> Element {
    let mut dragging = use_signal(|| false);
    let filter = AcceptFilter::from(props.accept.as_deref());
    let accept = props.accept.clone().unwrap_or_default();
    let on_file_upload = props.on_file_upload;

    let handle_files = {
        let filter = filter.clone();
        move |evt: FormEvent| {
            let filter = filter.clone();
            async move {
                deliver(evt.files(), &filter, |files| on_file_upload.call(files)).await;
            }
        }
    };

    let handle_drop = move |evt: DragEvent| {
        evt.prevent_default();
        dragging.set(false);
        let filter = filter.clone();
        async move {
            deliver(evt.files(), &filter, |files| on_file_upload.call(files)).await;
        }
    };

    let zone_class = if dragging() {
        "border-[var(--border-accent)] bg-[var(--surface-active)]"
    } else {
        "border-[var(--border-muted)] bg-[var(--surface)] hover:bg-[var(--surface-active)]"
    };

    rsx! {
        label {
            class: "cursor-pointer rounded-2xl border-2 border-dashed w-full min-h-[200px] py-8 flex flex-col gap-2 items-center justify-center transition-colors {zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            input {
                r#type: "file",
                multiple: true,
                accept: "{accept}",
                class: "hidden",
                "data-testid": "file-input",
                onchange: handle_files,
            }

            Icon {
                icon: LdUpload,
                width: 64,
                height: 64,
                class: "text-[var(--muted)]",
            }

            if dragging() {
                p { class: "text-[var(--text-secondary)]", "Drop the files here ..." }
            } else {
                p { class: "text-[var(--text-secondary)]",
                    "Drop some files here, or click to select files"
                }
            }
        }
    }
}
