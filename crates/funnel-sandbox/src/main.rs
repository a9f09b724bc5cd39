use dioxus::prelude::*;
use funnel_core::{FunnelFile, JsonFunnelProcessor, PersistOptions};
use funnel_io::{BrowserFunnelStore, BrowserStorage, FileLoader, FunnelList, FunnelPreview};

/// Files the loader offers and passes on.
const FUNNEL_ACCEPT: &str = ".json,application/json";

fn main() {
    funnel_io::console::init_logging(tracing::Level::INFO);
    dioxus::launch(app);
}

/// Root application component.
///
/// Opens the persisted funnel store, mirrors its contents into a signal,
/// and wires together the file loader, funnel list, and preview.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    // --- Store ---
    let store = use_hook(|| {
        BrowserFunnelStore::open(
            BrowserStorage::detect(),
            JsonFunnelProcessor,
            PersistOptions::default(),
        )
    });

    // --- Application state ---
    let funnels = use_signal(|| store.funnels());
    let mut selected = use_signal(|| Option::<String>::None);
    let mut errors = use_signal(Vec::<String>::new);
    let mut pending = use_signal(|| 0usize);

    // Keep `funnels` in sync with every store change.
    use_hook({
        let store = store.clone();
        move || {
            store.subscribe(move |list| {
                let mut funnels = funnels;
                funnels.set(list.to_vec());
            })
        }
    });

    // --- File upload handler ---
    // Each file is imported in its own task; funnels appear in the order
    // their imports finish.
    let on_file_upload = {
        let store = store.clone();
        move |files: Vec<FunnelFile>| {
            errors.set(Vec::new());
            for file in files {
                let store = store.clone();
                pending += 1;
                spawn(async move {
                    match store.add_funnel_from_file(&file).await {
                        Ok(id) => selected.set(Some(id)),
                        Err(e) => errors.write().push(format!("{}: {e}", file.name)),
                    }
                    pending -= 1;
                });
            }
        }
    };

    // --- List handlers ---
    let on_select = move |id: String| {
        selected.set(Some(id));
    };

    let on_remove = {
        let store = store.clone();
        move |id: String| {
            store.remove_funnel(&id);
            if selected.peek().as_deref() == Some(id.as_str()) {
                selected.set(None);
            }
        }
    };

    let current = selected().and_then(|id| funnels.read().iter().find(|f| f.id == id).cloned());
    let error_list = errors();
    let durable = store.storage().is_durable();

    // --- Layout ---
    rsx! {
        // Tailwind's browser build compiles the utility classes at runtime.
        script { src: "https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" }
        style { dangerous_inner_html: include_str!("../assets/theme.css") }

        div { class: "min-h-screen bg-[var(--bg)] text-[var(--text)] flex flex-col",
            // Header
            header { class: "px-6 py-4 border-b border-[var(--border)]",
                h1 { class: "text-2xl font-semibold", "Funnel sandbox" }
                p { class: "text-[var(--muted)] text-sm",
                    "Load funnel definitions from JSON files and preview them page by page"
                }
            }

            div { class: "flex-1 flex flex-col lg:flex-row gap-6 p-6",
                // Left column: loader + stored funnels
                div { class: "lg:w-80 flex-shrink-0 flex flex-col gap-4",
                    FileLoader {
                        on_file_upload: on_file_upload,
                        accept: Some(FUNNEL_ACCEPT.to_owned()),
                    }

                    if pending() > 0 {
                        p { class: "text-[var(--text-secondary)] text-sm animate-pulse",
                            "Processing {pending()} file(s)..."
                        }
                    }

                    // Error display
                    for err in error_list.iter() {
                        div { class: "bg-[var(--error-bg)] border border-[var(--error-border)] rounded p-3",
                            p { class: "text-[var(--text-error)] text-sm", "{err}" }
                        }
                    }

                    if !durable {
                        p { class: "text-[var(--muted)] text-xs",
                            "Browser storage is unavailable; funnels will be lost on reload."
                        }
                    }

                    h3 { class: "text-lg font-semibold text-[var(--text-heading)]", "Funnels" }
                    FunnelList {
                        funnels: funnels(),
                        selected: selected(),
                        on_select: on_select,
                        on_remove: on_remove,
                    }
                }

                // Main area: preview of the selected funnel
                div { class: "flex-1",
                    if let Some(ref funnel) = current {
                        FunnelPreview { funnel: funnel.clone() }
                    } else {
                        div { class: "h-full flex items-center justify-center",
                            p { class: "text-[var(--text-placeholder)] text-lg",
                                "Upload or select a funnel to preview it"
                            }
                        }
                    }
                }
            }
        }
    }
}
