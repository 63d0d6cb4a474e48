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

//! Turns the shared telemetry into a `Frame`: map view, track traces and
//! a status line. Rendering is read only, two calls with no ingestion in
//! between produce equal frames.

pub mod status;

use crate::config::Config;
use crate::telemetry::{Coordinate, Telemetry};
use chrono::prelude::*;

/// Street level, for following the vehicle
pub const TRACKING_ZOOM: u8 = 17;
/// Whole world, used until the first fix
pub const WORLD_ZOOM: u8 = 2;
pub const DEFAULT_CENTER: Coordinate = Coordinate { lat: 0.0, lon: 0.0 };
pub const MAP_STYLE: &str = "satellite";

#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Line,
    Marker,
}

/// Which track a trace belongs to
#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    Raw,
    Estimate,
}

#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dash {
    Solid,
    Dot,
}

#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
pub struct TraceStyle {
    /// Line width in px
    pub width: Option<u8>,
    /// Marker diameter in px
    pub size: Option<u8>,
    pub dash: Dash,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Trace {
    pub kind: TraceKind,
    pub series: Series,
    pub name: &'static str,
    pub points: Vec<Coordinate>,
    pub style: TraceStyle,
}

#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub style: &'static str,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Scene {
    pub view: MapView,
    pub traces: Vec<Trace>,
}

/// Everything a shell needs for one refresh. Always a full replacement.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Frame {
    pub scene: Scene,
    pub status: String,
    pub last_fix: Option<DateTime<Utc>>,
}

#[derive(PartialEq, Debug, Default, Copy, Clone)]
pub struct RenderOptions {
    /// Whether a map tile credential is configured
    pub tile_token: bool,
}

impl<'a> From<&'a Config> for RenderOptions {
    fn from(c: &'a Config) -> Self {
        Self {
            tile_token: c.has_tile_token(),
        }
    }
}

impl Series {
    fn line_name(self) -> &'static str {
        match self {
            Series::Raw => "GPS_RAW_INT trail",
            Series::Estimate => "GLOBAL_POSITION_INT (est)",
        }
    }

    fn marker_name(self) -> &'static str {
        match self {
            Series::Raw => "GPS_RAW_INT current",
            Series::Estimate => "Est current",
        }
    }

    fn line_style(self) -> TraceStyle {
        match self {
            Series::Raw => TraceStyle {
                width: Some(4),
                size: None,
                dash: Dash::Solid,
            },
            Series::Estimate => TraceStyle {
                width: Some(3),
                size: None,
                dash: Dash::Dot,
            },
        }
    }

    fn marker_style(self) -> TraceStyle {
        TraceStyle {
            width: None,
            size: Some(match self {
                Series::Raw => 12,
                Series::Estimate => 10,
            }),
            dash: Dash::Solid,
        }
    }
}

/// Appends a line through `points` and a marker on the newest one.
/// Fewer than two points draw nothing.
fn push_track(traces: &mut Vec<Trace>, series: Series, points: Vec<Coordinate>) {
    let last = match points.last() {
        Some(&p) if points.len() >= 2 => p,
        _ => return,
    };

    traces.push(Trace {
        kind: TraceKind::Line,
        series,
        name: series.line_name(),
        points,
        style: series.line_style(),
    });
    traces.push(Trace {
        kind: TraceKind::Marker,
        series,
        name: series.marker_name(),
        points: vec![last],
        style: series.marker_style(),
    });
}

pub fn render(t: &Telemetry, opts: &RenderOptions) -> Frame {
    let latest = t.latest.read();

    let view = match latest.position {
        Some(p) => MapView {
            center: p,
            zoom: TRACKING_ZOOM,
            style: MAP_STYLE,
        },
        None => MapView {
            center: DEFAULT_CENTER,
            zoom: WORLD_ZOOM,
            style: MAP_STYLE,
        },
    };

    let mut traces = Vec::with_capacity(4);
    push_track(&mut traces, Series::Raw, t.raw.snapshot());
    push_track(&mut traces, Series::Estimate, t.estimate.snapshot());

    Frame {
        scene: Scene { view, traces },
        status: status::compose(&latest, opts),
        last_fix: latest.updated_at,
    }
}
