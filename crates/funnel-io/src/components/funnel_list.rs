//! List of stored funnels with select and remove actions.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdTrash2;
use funnel_core::Funnel;

/// Props for the [`FunnelList`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FunnelListProps {
    /// Funnels in store order.
    funnels: Vec<Funnel>,
    /// Id of the highlighted funnel.
    selected: Option<String>,
    /// Fired with a funnel's id when its entry is clicked.
    on_select: EventHandler<String>,
    /// Fired with a funnel's id when its remove button is clicked.
    on_remove: EventHandler<String>,
}

#[component]
pub fn FunnelList(props: FunnelListProps) -> Element {
    if props.funnels.is_empty() {
        return rsx! {
            p { class: "text-[var(--text-placeholder)] text-sm", "No funnels loaded yet" }
        };
    }

    rsx! {
        ul { class: "flex flex-col gap-1",
            for funnel in props.funnels.iter() {
                {render_entry(funnel, props.selected.as_deref() == Some(funnel.id.as_str()), props.on_select, props.on_remove)}
            }
        }
    }
}

fn render_entry(
    funnel: &Funnel,
    is_selected: bool,
    on_select: EventHandler<String>,
    on_remove: EventHandler<String>,
) -> Element {
    let border = if is_selected {
        "border-2 border-[var(--border-accent)]"
    } else {
        "border border-[var(--border)]"
    };
    let name = display_name(funnel);
    let summary = summary(funnel);
    let select_id = funnel.id.clone();
    let remove_id = funnel.id.clone();

    rsx! {
        li { key: "{funnel.id}", class: "flex items-center gap-2 rounded p-2 bg-[var(--surface)] {border}",
            button {
                class: "flex-1 text-left cursor-pointer",
                "aria-pressed": "{is_selected}",
                onclick: move |_| on_select.call(select_id.clone()),
                p { class: "font-medium text-[var(--text-heading)]", "{name}" }
                p { class: "text-xs text-[var(--muted)]", "{summary}" }
            }
            button {
                class: "p-1 rounded hover:bg-[var(--surface-active)] text-[var(--text-error)] cursor-pointer",
                aria_label: "Remove {name}",
                title: "Remove",
                onclick: move |_| on_remove.call(remove_id.clone()),
                Icon { icon: LdTrash2, width: 18, height: 18 }
            }
        }
    }
}

/// The funnel's name, or a placeholder when it has none.
fn display_name(funnel: &Funnel) -> &str {
    let name = funnel.content.name.trim();
    if name.is_empty() { "Untitled funnel" } else { name }
}

/// Page and block counts, e.g. `"2 pages, 5 blocks"`.
fn summary(funnel: &Funnel) -> String {
    let pages = funnel.content.pages.len();
    let blocks: usize = funnel.content.pages.iter().map(|p| p.blocks.len()).sum();
    format!(
        "{pages} {}, {blocks} {}",
        if pages == 1 { "page" } else { "pages" },
        if blocks == 1 { "block" } else { "blocks" },
    )
}

#[cfg(test)]
mod tests {
    use funnel_core::{Block, FunnelContent, Page, TextAlign, TextBlock};

    use super::*;

    fn text(id: &str) -> Block {
        Block::Text(TextBlock {
            id: id.into(),
            text: "hi".into(),
            color: String::new(),
            align: TextAlign::Left,
        })
    }

    fn funnel(name: &str, pages: Vec<Page>) -> Funnel {
        Funnel::new(
            "id".into(),
            FunnelContent {
                name: name.into(),
                bg_color: String::new(),
                pages,
            },
        )
    }

    #[test]
    fn summary_pluralizes() {
        let one = funnel(
            "One",
            vec![Page {
                id: "p".into(),
                blocks: vec![text("a")],
            }],
        );
        assert_eq!(summary(&one), "1 page, 1 block");

        let many = funnel(
            "Many",
            vec![
                Page {
                    id: "p1".into(),
                    blocks: vec![text("a"), text("b")],
                },
                Page {
                    id: "p2".into(),
                    blocks: Vec::new(),
                },
            ],
        );
        assert_eq!(summary(&many), "2 pages, 2 blocks");
        assert_eq!(summary(&funnel("Empty", Vec::new())), "0 pages, 0 blocks");
    }

    #[test]
    fn blank_names_get_placeholder() {
        assert_eq!(display_name(&funnel("  ", Vec::new())), "Untitled funnel");
        assert_eq!(display_name(&funnel(" Launch ", Vec::new())), "Launch");
    }
}
