//! # icolib
//!
//! Batch-produces app icons from one source image. A template lists the
//! sizes a platform wants and what each file is called; exporting runs the
//! source through a Catmull-Rom resampler once per entry and writes the
//! results under a per-template directory.
//!
//! ```text
//! logo.png ──decode──▶ PixelBuffer ──resample × N──▶ output/iOS/Icon-20.png
//!                                                     output/iOS/Icon-20@2x.png
//!                                                     ...
//! ```
//!
//! The same pixel engine backs the single-image commands: `invert`,
//! `invert-channels`, `adjust` and `resize`.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel buffers, colour transforms, resampling, and the codec boundary |
//! | [`naming`] | `%w`/`%h` naming-pattern expansion |
//! | [`template`] | Export templates, their XML format, and the on-disk template store |
//! | [`presets`] | Built-in iOS and Android templates |
//! | [`export`] | Runs a template against a source image, one report entry per item |
//! | [`config`] | `icolib.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Partial Exports Are Reported, Not Aborted
//!
//! A bad template entry (zero size, no usable name) or an unwritable path
//! fails that one item. The rest of the batch still runs and the
//! [`export::ExportReport`] says exactly which items failed and why. Only a
//! source image that cannot be decoded stops the export up front.
//!
//! ## Explicit Template Schema
//!
//! Templates are XML in a fixed namespace, checked element by element on
//! load. Unknown elements, unknown attributes and malformed sizes are errors
//! rather than silently ignored fields.
//!
//! ## Codec Behind a Trait
//!
//! Decoding and encoding go through [`imaging::ImageCodec`]. The production
//! [`imaging::RustBackend`] wraps the `image` crate; tests swap in a recording
//! mock so the export pipeline can be checked without touching image files.

pub mod config;
pub mod export;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod presets;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
