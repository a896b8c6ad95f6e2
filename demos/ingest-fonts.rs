// font-depot/demos/ingest-fonts.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ingests font files into a store directory.

extern crate clap;
extern crate colored;
extern crate font_depot;
extern crate pbr;

use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use font_depot::binary::FontBinary;
use font_depot::config::{Config, Formats};
use font_depot::ingest::{BatchEntry, Ingestor};
use pbr::ProgressBar;
use std::path::PathBuf;

fn get_args() -> ArgMatches {
    let store_arg = Arg::new("store")
        .help("Directory that holds the font store")
        .short('s')
        .long("store")
        .value_names(["DIR"])
        .default_value("fonts");
    let no_preview_arg = Arg::new("no-preview")
        .help("Don't produce the WOFF 2.0 preview subset")
        .long("no-preview")
        .action(ArgAction::SetTrue);
    let preview_chars_arg = Arg::new("preview-chars")
        .help("Characters to keep in the preview subset")
        .long("preview-chars")
        .value_names(["CHARS"]);
    let json_arg = Arg::new("json")
        .help("Print the batch results as JSON")
        .long("json")
        .action(ArgAction::SetTrue);
    let files_arg = Arg::new("FILE")
        .help("Font files to ingest")
        .required(true)
        .num_args(1..)
        .index(1);
    Command::new("ingest-fonts")
        .version("0.1")
        .author("The Pathfinder Project Developers")
        .about("Ingests fonts into a `font-depot` store")
        .arg(store_arg)
        .arg(no_preview_arg)
        .arg(preview_chars_arg)
        .arg(json_arg)
        .arg(files_arg)
        .get_matches()
}

fn main() {
    env_logger::init();
    let matches = get_args();

    let mut config = Config::new(matches.get_one::<String>("store").unwrap());
    if matches.get_flag("no-preview") {
        config.formats(Formats::all() - Formats::WOFF2_PREVIEW);
    }
    if let Some(characters) = matches.get_one::<String>("preview-chars") {
        config.preview_characters(characters);
    }
    let ingestor = Ingestor::new(&config);

    let paths: Vec<PathBuf> = matches
        .get_many::<String>("FILE")
        .unwrap()
        .map(PathBuf::from)
        .collect();
    let mut progress_bar = ProgressBar::new(paths.len() as u64);
    progress_bar.message("Ingesting fonts… ");

    let mut results = vec![];
    for path in &paths {
        let filename = path.to_string_lossy().into_owned();
        let outcome = FontBinary::from_path(path)
            .map_err(|error| error.to_string())
            .and_then(|binary| {
                ingestor
                    .ingest_binary(&binary)
                    .map_err(|error| error.to_string())
            });
        let result = match outcome {
            Ok(outcome) => BatchEntry {
                filename,
                success: true,
                message: outcome.message(),
            },
            Err(message) => BatchEntry {
                filename,
                success: false,
                message,
            },
        };
        results.push(result);
        progress_bar.inc();
    }
    progress_bar.finish_print("");

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&results).unwrap());
        return;
    }
    for result in &results {
        if result.success {
            println!("{} {}", "✓".green(), result.message);
        } else {
            println!("{} {}", "✗".red(), result.message.bold());
        }
    }
}
