//! Presentation logic for the photo gallery.
//!
//! Everything here is pure: the image-URL resolver priority chain and the
//! view state (filters, modal selection, per-photo error tracking) used by
//! both the HTTP handlers and the embedded gallery page.

mod resolver;
mod state;

pub use resolver::{
    extract_file_id, fallback_chain, proxy_url, resolve, SizeClass, PLACEHOLDER_URL,
};
pub use state::{matches_date, matches_name, GalleryState};
