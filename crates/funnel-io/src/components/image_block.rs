//! Image block component.

use dioxus::prelude::*;

/// Props for the [`ImageBlock`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ImageBlockProps {
    /// Image URL.
    src: String,
    /// Alternative text.
    alt: String,
}

/// Renders an image block's source and alt text as a responsive `<img>`.
#[component]
pub fn ImageBlock(props: ImageBlockProps) -> Element {
    rsx! {
        img {
            class: "w-full h-auto rounded",
            src: "{props.src}",
            alt: "{props.alt}",
            loading: "lazy",
        }
    }
}
