//! Output generation for the website.
//!
//! # Submodules
//!
//! - [`json`]: Atomically writes the [`Snapshot`](crate::models::Snapshot) the site polls
//!
//! # Output Structure
//!
//! ```text
//! site_root/
//! ├── ai_news.json          # the snapshot, replaced atomically
//! └── .ai_news.json.tmp     # transient, only while a write is in flight
//! ```

pub mod json;
