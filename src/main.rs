// mavtrack - a live GPS track visualizer for MAVLink vehicles
// Copyright (C) 2026  Datong Sun (dndx@idndx.com)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Live GPS map in the browser.

#[macro_use]
extern crate log;

use mavtrack::app::App;
use mavtrack::config::Config;
use mavtrack::shell::web::WebShell;
use mavtrack::{source, Result};
use std::process;

fn run() -> Result<()> {
    let config = Config::from_env()?;

    if !config.has_tile_token() {
        warn!("MAPBOX_TOKEN not set, falling back to OpenStreetMap tiles");
    }

    let mut app = App::new(&config);
    app.handle_interrupt()?;

    let source = source::open(&config.connection)?;
    let mut shell = WebShell::bind(&config.listen, config.tile_token.as_deref())?;

    app.spawn_ingest(source)?;
    app.run(&mut shell)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}
