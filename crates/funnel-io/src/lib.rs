//! funnel-io: Browser I/O and Dioxus component library.
//!
//! Backs the funnel store with `localStorage`, reads dropped or picked
//! files into memory, routes `tracing` output to the browser console,
//! and provides the UI components for the funnel sandbox app.

pub mod components;
pub mod console;
pub mod files;
pub mod local_storage;

pub use components::{BlockView, FileLoader, FunnelList, FunnelPreview, ImageBlock};
pub use local_storage::{BrowserStorage, LocalStorage};

/// The store type used by the browser app.
pub type BrowserFunnelStore =
    funnel_core::FunnelStore<BrowserStorage, funnel_core::JsonFunnelProcessor>;
