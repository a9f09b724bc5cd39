//! Dioxus UI components for the funnel sandbox.
//!
//! Provides the file loader drop zone, block renderers (including the
//! image block), the paged funnel preview, and the stored-funnel list.

mod block_view;
mod file_loader;
mod funnel_list;
mod funnel_preview;
mod image_block;

pub use block_view::BlockView;
pub use file_loader::FileLoader;
pub use funnel_list::FunnelList;
pub use funnel_preview::FunnelPreview;
pub use image_block::ImageBlock;
