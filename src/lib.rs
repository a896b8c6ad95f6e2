// font-depot/src/lib.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `font-depot` ingests uploaded font files into a directory store and re-encodes them for web
//! delivery.
//!
//! Every upload is decoded (plain sfnt, WOFF 1.0 or WOFF 2.0), identified by its family and
//! subfamily names and its weight class, and stored at `<root>/<family>/<subfamily>/`. Next to
//! the original, the store holds a `.ttf`, `.otf`, `.woff` and `.woff2` rendition and a small
//! `_preview.woff2` subset. Each rendition starts from a fresh decode of the original bytes, so
//! a failure in one format never affects another.
//!
//! ```no_run
//! use font_depot::config::Config;
//! use font_depot::ingest::Ingestor;
//!
//! let ingestor = Ingestor::new(&Config::new("/srv/fonts"));
//! let bytes = std::fs::read("Inter-Bold.ttf").unwrap();
//! match ingestor.ingest("Inter-Bold.ttf", bytes) {
//!     Ok(outcome) => println!("{}", outcome.message()),
//!     Err(error) => eprintln!("{} ({})", error, error.status_code()),
//! }
//! for family in ingestor.list_fonts().unwrap() {
//!     println!("{}: {} subfamilies", family.name, family.subfamilies.len());
//! }
//! ```
//!
//! WOFF 2.0 needs the `brotli` codec, enabled by the default `woff2` feature. Without it the
//! `.woff2` rendition and the preview are reported as failed conversions.

pub mod binary;
pub mod codecs;
pub mod config;
pub mod convert;
pub mod error;
pub mod family;
pub mod file_type;
pub mod font;
pub mod identity;
pub mod ingest;
pub mod properties;
pub mod store;
pub mod subset;
pub mod tables;

#[doc(hidden)]
pub mod fixture;

mod utils;
