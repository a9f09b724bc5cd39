//! funnel-core: funnel model, file processing, and the persisted store (sans-IO).
//!
//! A funnel is a named sequence of pages made of typed content blocks.
//! Funnels enter the [`FunnelStore`] either fully formed or by parsing
//! an uploaded [`FunnelFile`] through a [`FunnelProcessor`]. The store
//! keeps them in insertion order and writes a snapshot to a
//! [`KeyValueStorage`] slot after every change.
//!
//! This crate has **no browser dependencies**. `localStorage`, file
//! reading, and UI components live in `funnel-io`.

pub mod accept;
pub mod file;
pub mod processor;
pub mod storage;
pub mod store;
pub mod types;

pub use accept::AcceptFilter;
pub use file::FunnelFile;
pub use processor::{FunnelProcessor, JsonFunnelProcessor, ParsedFunnel, ProcessorError};
pub use storage::{KeyValueStorage, MemoryStorage, PersistOptions, StorageError};
pub use store::{FunnelStore, Subscription};
pub use types::{
    Block, ButtonBlock, Funnel, FunnelContent, ImageBlock, ListBlock, ListItem, Page, TextAlign,
    TextBlock,
};
