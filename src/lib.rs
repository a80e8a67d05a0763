//! # Image Tag
//!
//! Resolve inline image directives into resized images and the HTML that
//! references them. A static site generator hands over a directive string;
//! image-tag reads the source image, writes the requested sizes into a
//! content-addressed output directory, and returns markup.
//!
//! ```text
//! gallery posters/poster.jpg alt="Poster"
//!   → _site/generated/posters/poster-400x300-1a2b3c.jpg
//!   → <img src="/generated/posters/poster-400x300-1a2b3c.jpg" class="gal-img" alt="Poster" >
//! ```
//!
//! # Architecture: Prepare, Then Render
//!
//! Each directive goes through two steps:
//!
//! ```text
//! 1. Prepare   directive + config  →  PreparedTag   (no I/O)
//! 2. Render    PreparedTag         →  files + markup
//! ```
//!
//! Preparing parses the directive, resolves the size token against presets,
//! and merges attributes. Nothing touches the disk, so `image-tag check` can
//! validate a whole site's directives without opening an image. Rendering
//! decodes the source, plans each output size, and generates only the files
//! that are not already present.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`directive`] | Splits a directive into size token, source path, and raw attributes |
//! | [`attrs`] | Ordered HTML attribute sets: parsing, merging, escaped rendering |
//! | [`size`] | Size tokens: preset lookup and `WIDTHxHEIGHT` patterns |
//! | [`config`] | `_image.toml` loading over stock defaults, validation, presets |
//! | [`imaging`] | Dimension planning and pure-Rust decode, crop, and encode |
//! | [`cache`] | Content-addressed output names and the generate-if-absent cache |
//! | [`markup`] | `<img>`, `<picture>`, and picturefill markup composition |
//! | [`tag`] | [`tag::Renderer`]: the prepare/render pipeline and parallel batches |
//! | [`output`] | CLI output formatting for render, batch, and check |
//!
//! # Design Decisions
//!
//! ## Content-Addressed Output
//!
//! Generated names carry the output size and a digest of the decoded pixels:
//!
//! ```text
//! {dir}/{stem}-{width}x{height}-{digest}.{ext}
//! ```
//!
//! A changed source gets a new name, so stale files are never served and no
//! invalidation step is needed. An existing file with the right name is reused
//! as-is; see [`cache::GenerationCache`].
//!
//! ## Never Upscale
//!
//! A request larger than the source shrinks to the largest box that fits
//! while keeping the requested aspect ratio. Oversized requests log a warning
//! and still render. The math lives in [`imaging::plan_dimensions`].
//!
//! ## Concurrent Writers
//!
//! Batches render in parallel with rayon, and several directives often name
//! the same output. Files are written to a temporary name in the target
//! directory and moved into place without clobbering, so a reader never sees
//! a partial image and the first writer wins.

pub mod attrs;
pub mod cache;
pub mod config;
pub mod directive;
pub mod imaging;
pub mod markup;
pub mod output;
pub mod size;
pub mod tag;

#[cfg(test)]
pub(crate) mod test_helpers;
