//! Paged preview of a funnel.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdChevronLeft, LdChevronRight};
use funnel_core::Funnel;

use super::BlockView;

/// Props for the [`FunnelPreview`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FunnelPreviewProps {
    funnel: Funnel,
}

/// Shows one page of a funnel at a time, with previous/next buttons.
///
/// The page index resets when a different funnel is shown.
#[component]
pub fn FunnelPreview(props: FunnelPreviewProps) -> Element {
    let mut page = use_signal(|| 0usize);

    // Back to the first page when switching funnels.
    use_effect(use_reactive((&props.funnel.id,), move |(_,)| page.set(0)));

    let content = &props.funnel.content;
    let total = content.pages.len();
    let current = clamp_page(page(), total);
    let label = page_label(current, total);
    let bg = if content.bg_color.trim().is_empty() {
        "var(--preview-bg)"
    } else {
        content.bg_color.as_str()
    };

    let nav_class = "p-2 rounded bg-[var(--surface)] hover:bg-[var(--surface-active)] disabled:opacity-40 disabled:cursor-not-allowed";

    rsx! {
        div { class: "flex flex-col gap-3",
            div { class: "flex items-center justify-between",
                h2 { class: "text-xl font-semibold text-[var(--text-heading)]", "{content.name}" }
                div { class: "flex items-center gap-2",
                    button {
                        class: "{nav_class}",
                        aria_label: "Previous page",
                        disabled: current == 0,
                        onclick: move |_| page.set(current.saturating_sub(1)),
                        Icon { icon: LdChevronLeft, width: 20, height: 20 }
                    }
                    span { class: "text-sm text-[var(--text-secondary)] tabular-nums", "{label}" }
                    button {
                        class: "{nav_class}",
                        aria_label: "Next page",
                        disabled: current + 1 >= total,
                        onclick: move |_| page.set(clamp_page(current + 1, total)),
                        Icon { icon: LdChevronRight, width: 20, height: 20 }
                    }
                }
            }

            div {
                class: "rounded-lg p-6 flex flex-col gap-4 max-w-xl w-full mx-auto",
                style: "background-color: {bg};",

                if let Some(shown) = content.pages.get(current) {
                    for block in shown.blocks.iter() {
                        BlockView { key: "{block.id()}", block: block.clone() }
                    }
                    if shown.blocks.is_empty() {
                        p { class: "text-[var(--muted)] text-center", "This page is empty" }
                    }
                } else {
                    p { class: "text-[var(--muted)] text-center", "This funnel has no pages" }
                }
            }
        }
    }
}

/// Clamp a page index into `0..total` (0 when there are no pages).
const fn clamp_page(index: usize, total: usize) -> usize {
    if total == 0 {
        0
    } else if index >= total {
        total - 1
    } else {
        index
    }
}

/// Human-readable page position, e.g. `"2 / 5"`.
fn page_label(current: usize, total: usize) -> String {
    if total == 0 {
        "0 / 0".to_owned()
    } else {
        format!("{} / {total}", current + 1)
    }
}
