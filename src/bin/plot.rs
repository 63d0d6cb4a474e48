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

//! Live GPS track plotted in the terminal.

#[macro_use]
extern crate log;

use mavtrack::app::App;
use mavtrack::config::Config;
use mavtrack::shell::terminal::TerminalShell;
use mavtrack::{source, Result};
use std::process;

fn run() -> Result<()> {
    let config = Config::from_env()?;

    let mut app = App::new(&config);
    app.handle_interrupt()?;

    let source = source::open(&config.connection)?;
    app.spawn_ingest(source)?;

    // restores the terminal when dropped, before any error is logged
    let mut shell = TerminalShell::new()?;
    app.run(&mut shell)
}

fn main() {
    // log lines would land on top of the plot, keep quiet unless asked
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    if let Err(e) = run() {
        error!("{}", e);
        eprintln!("mavtrack-plot: {}", e);
        process::exit(1);
    }
}
