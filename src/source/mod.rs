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

pub mod fake;
pub mod link;

use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use self::fake::FakeSource;
use self::link::MavlinkSource;

/// Connection strings with this prefix select the synthetic vehicle
pub const FAKE_PREFIX: &str = "fake:";

/// How long a single wait inside `wait_for_liveness` may block before
/// the shutdown flag is checked again
pub const LIVENESS_POLL: Duration = Duration::from_secs(1);

/// `GPS_RAW_INT` fields, as sent on the wire
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct RawFix {
    /// Latitude in deg * 1e7
    pub lat: i32,
    /// Longitude in deg * 1e7
    pub lon: i32,
    /// Ground speed in cm/s
    pub vel: Option<u16>,
    pub satellites_visible: Option<u8>,
    /// GPS_FIX_TYPE code
    pub fix_type: Option<u8>,
}

/// `GLOBAL_POSITION_INT` fields we care about
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct FusedPosition {
    /// Latitude in deg * 1e7
    pub lat: i32,
    /// Longitude in deg * 1e7
    pub lon: i32,
}

/// Represents a message received from the vehicle link
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum TelemetryMessage {
    Heartbeat,
    RawFix(RawFix),
    FusedPosition(FusedPosition),
    /// Anything else, tagged with its message id
    Other(u32),
}

/// A type for representing a vehicle link
pub trait TelemetrySource {
    /// Human readable name of the link, used for logging
    fn describe(&self) -> &str;

    /// Wait at most `timeout` for the next message. `Ok(None)` means
    /// nothing arrived in time.
    fn receive(&mut self, timeout: Duration) -> Result<Option<TelemetryMessage>>;

    /// Block until the remote end sends a heartbeat. There is no timeout,
    /// returns `Ok(false)` only if `shutdown` was raised first.
    fn wait_for_liveness(&mut self, shutdown: &AtomicBool) -> Result<bool> {
        while !shutdown.load(Ordering::Relaxed) {
            if let Some(TelemetryMessage::Heartbeat) = self.receive(LIVENESS_POLL)? {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// Open the link named by `conn`
pub fn open(conn: &str) -> Result<Box<dyn TelemetrySource + Send>> {
    if conn.starts_with(FAKE_PREFIX) {
        info!("using synthetic telemetry source");
        return Ok(Box::new(FakeSource::default()));
    }

    Ok(Box::new(MavlinkSource::connect(conn)?))
}
