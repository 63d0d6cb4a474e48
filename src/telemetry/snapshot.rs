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

use super::Coordinate;
use chrono::prelude::*;
use std::sync::{PoisonError, RwLock};

/// Most recent raw fix as seen by the renderer. `None` means no data,
/// which is different from a reading of zero.
#[derive(PartialEq, Debug, Default, Copy, Clone, Serialize)]
pub struct Snapshot {
    pub position: Option<Coordinate>,
    pub ground_speed_mps: Option<f64>,
    pub satellites_visible: Option<u8>,
    pub fix_type: Option<u8>,
    /// Wall clock time the fix was ingested
    pub updated_at: Option<DateTime<Utc>>,
}

/// One raw fix worth of fields. Position is mandatory, every optional
/// field left `None` clears the previous value.
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct FixUpdate {
    pub position: Coordinate,
    pub ground_speed_mps: Option<f64>,
    pub satellites_visible: Option<u8>,
    pub fix_type: Option<u8>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct LatestState {
    inner: RwLock<Snapshot>,
}

impl LatestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, u: FixUpdate) {
        let next = Snapshot {
            position: Some(u.position),
            ground_speed_mps: u.ground_speed_mps,
            satellites_visible: u.satellites_visible,
            fix_type: u.fix_type,
            updated_at: Some(u.received_at),
        };

        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub fn read(&self) -> Snapshot {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}
