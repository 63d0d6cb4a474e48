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

use super::RenderOptions;
use crate::telemetry::Snapshot;
use std::fmt::Display;

pub const WAITING: &str = "Waiting for data (GPS_RAW_INT)...";
pub const NO_TOKEN_WARNING: &str = "  |  (MAPBOX_TOKEN not set, satellite tiles may not render)";
const NOT_AVAILABLE: &str = "N/A";

fn or_na<T: Display>(v: Option<T>) -> String {
    v.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

/// One line summary of the latest fix
pub fn compose(s: &Snapshot, opts: &RenderOptions) -> String {
    let mut status = match s.position {
        None => WAITING.to_string(),
        Some(p) => format!(
            "lat={:.6}, lon={:.6} | speed={} | sats={} | fix={}",
            p.lat,
            p.lon,
            s.ground_speed_mps
                .map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{:.2} m/s", v)),
            or_na(s.satellites_visible),
            or_na(s.fix_type)
        ),
    };

    if !opts.tile_token {
        status.push_str(NO_TOKEN_WARNING);
    }

    status
}
