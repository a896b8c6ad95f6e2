// font-depot/demos/list-fonts.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Lists all fonts in a store.

extern crate clap;
extern crate font_depot;
extern crate prettytable;

use clap::{Arg, ArgAction, ArgMatches, Command};
use font_depot::config::Config;
use font_depot::ingest::Ingestor;
use prettytable::{Attr, Cell, Row, Table};

fn get_args() -> ArgMatches {
    let json_arg = Arg::new("json")
        .help("Print the listing as JSON")
        .long("json")
        .action(ArgAction::SetTrue);
    let store_arg = Arg::new("STORE")
        .help("Directory that holds the font store")
        .default_value("fonts")
        .index(1);
    Command::new("list-fonts")
        .version("0.1")
        .author("The Pathfinder Project Developers")
        .about("Lists the fonts in a `font-depot` store")
        .arg(json_arg)
        .arg(store_arg)
        .get_matches()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let matches = get_args();
    let root = matches.get_one::<String>("STORE").unwrap();
    let json = matches.get_flag("json");

    let families = Ingestor::new(&Config::new(root)).list_fonts()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&families)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(vec![
        Cell::new("Family").with_style(Attr::Bold),
        Cell::new("Subfamily").with_style(Attr::Bold),
        Cell::new("Weight").with_style(Attr::Bold),
        Cell::new("Formats").with_style(Attr::Bold),
    ]));

    for family in &families {
        for subfamily in &family.subfamilies {
            let mut name = subfamily.name.clone();
            if subfamily.name == family.default_subfamily.name {
                name.push_str(" *");
            }
            let formats: Vec<String> = subfamily
                .files
                .iter()
                .map(|file| file.kind.to_string())
                .collect();
            table.add_row(Row::new(vec![
                Cell::new(&family.name),
                Cell::new(&name),
                Cell::new(&subfamily.weight_class.to_string()),
                Cell::new(&formats.join(", ")),
            ]));
        }
    }

    table.printstd();
    Ok(())
}
