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

//! State shared between the ingestion thread and the render loop.

pub mod history;
pub mod snapshot;

pub use self::history::HistoryBuffer;
pub use self::snapshot::{FixUpdate, LatestState, Snapshot};

/// Default number of points kept per track
pub const DEFAULT_CAPACITY: usize = 3000;

#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
pub struct Coordinate {
    /// Latitude in deg
    pub lat: f64,
    /// Longitude in deg
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Decode a position reported in degrees * 1e7. Range is not checked.
    pub fn from_e7(lat: i32, lon: i32) -> Self {
        Self {
            lat: deg_e7!(lat),
            lon: deg_e7!(lon),
        }
    }
}

/// Everything the render side reads. Only the ingestion loop writes.
#[derive(Debug)]
pub struct Telemetry {
    /// `GPS_RAW_INT` track
    pub raw: HistoryBuffer,
    /// `GLOBAL_POSITION_INT` track
    pub estimate: HistoryBuffer,
    pub latest: LatestState,
}

impl Telemetry {
    pub fn new(capacity: usize) -> Self {
        Self {
            raw: HistoryBuffer::new(capacity),
            estimate: HistoryBuffer::new(capacity),
            latest: LatestState::new(),
        }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Telemetry::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_e7() {
        let c = Coordinate::from_e7(400087100, -1052479300);

        assert!((c.lat - 40.00871).abs() < 1e-9);
        assert!((c.lon - -105.24793).abs() < 1e-9);
    }

    #[test]
    fn test_from_e7_passes_out_of_range() {
        // 214.7483647 deg, clearly invalid but kept as-is
        let c = Coordinate::from_e7(i32::MAX, i32::MIN);

        assert!(c.lat > 90_f64);
        assert!(c.lon < -180_f64);
    }

    #[test]
    fn test_new_telemetry_is_empty() {
        let t = Telemetry::new(10);

        assert!(t.raw.is_empty());
        assert!(t.estimate.is_empty());
        assert_eq!(t.raw.capacity(), 10);
        assert_eq!(t.latest.read(), Snapshot::default());
    }
}
