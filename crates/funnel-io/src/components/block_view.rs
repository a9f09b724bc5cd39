//! Rendering of individual funnel blocks.

use dioxus::prelude::*;
use funnel_core::{Block, ButtonBlock, ListBlock, TextBlock};

use super::ImageBlock;

/// Props for the [`BlockView`] component.
#[derive(Props, Clone, PartialEq)]
pub struct BlockViewProps {
    block: Block,
}

/// Renders one block according to its type.
#[component]
pub fn BlockView(props: BlockViewProps) -> Element {
    match &props.block {
        Block::Text(text) => render_text(text),
        Block::Image(image) => rsx! {
            ImageBlock { src: image.src.clone(), alt: image.alt.clone() }
        },
        Block::List(list) => render_list(list),
        Block::Button(button) => render_button(button),
    }
}

fn render_text(block: &TextBlock) -> Element {
    let style = format!(
        "color: {}; text-align: {};",
        css_or(&block.color, "inherit"),
        block.align.as_css()
    );
    rsx! {
        p { class: "text-lg whitespace-pre-line", style: "{style}", "{block.text}" }
    }
}

fn render_list(block: &ListBlock) -> Element {
    rsx! {
        ul { class: "flex flex-col gap-3",
            for item in block.items.iter() {
                li { key: "{item.id}", class: "flex items-start gap-3",
                    if !item.src.is_empty() {
                        img {
                            class: "w-12 h-12 flex-shrink-0 rounded",
                            src: "{item.src}",
                            alt: "",
                        }
                    }
                    div {
                        h4 { class: "font-semibold", "{item.title}" }
                        if !item.description.is_empty() {
                            p { class: "text-sm text-[var(--text-secondary)]", "{item.description}" }
                        }
                    }
                }
            }
        }
    }
}

fn render_button(block: &ButtonBlock) -> Element {
    let style = format!(
        "color: {}; background-color: {};",
        css_or(&block.color, "#ffffff"),
        css_or(&block.bg_color, "var(--btn-primary)")
    );
    rsx! {
        button {
            class: "w-full px-4 py-2 rounded font-medium",
            r#type: "button",
            style: "{style}",
            "{block.text}"
        }
    }
}

/// `value` unless it is blank, then `fallback`.
fn css_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_or_falls_back_on_blank() {
        assert_eq!(css_or("#123", "inherit"), "#123");
        assert_eq!(css_or("  ", "inherit"), "inherit");
        assert_eq!(css_or("", "inherit"), "inherit");
    }
}
