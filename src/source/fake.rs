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

//! A synthetic vehicle flying small circles, for trying out the shells
//! without a simulator.

use super::*;
use std::thread::sleep;

const BASE_LAT: f64 = 40.00871;
const BASE_LON: f64 = -105.24793;
/// Radius of the raw track in deg
const RADIUS: f64 = 0.0002;
/// The estimate runs on a slightly tighter circle so both tracks stay visible
const ESTIMATE_RADIUS: f64 = 0.00018;
const STEP_RAD: f64 = 0.1;
/// Every n-th raw fix is sent without a ground speed
const NO_SPEED_EVERY: u32 = 10;
const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

pub struct FakeSource {
    interval: Duration,
    seq: u32,
}

impl FakeSource {
    /// `interval` is the delay between two messages
    pub fn new(interval: Duration) -> Self {
        Self { interval, seq: 0 }
    }

    fn next_message(&mut self) -> TelemetryMessage {
        let seq = self.seq;
        self.seq = self.seq.wrapping_add(1);

        if seq == 0 {
            return TelemetryMessage::Heartbeat;
        }

        let step = seq / 2;
        let angle = step as f64 * STEP_RAD;

        if seq % 2 == 1 {
            TelemetryMessage::RawFix(RawFix {
                lat: to_e7(BASE_LAT + RADIUS * angle.sin()),
                lon: to_e7(BASE_LON + RADIUS * angle.cos()),
                vel: if step % NO_SPEED_EVERY == NO_SPEED_EVERY - 1 {
                    None
                } else {
                    Some(150)
                },
                satellites_visible: Some(10),
                fix_type: Some(3),
            })
        } else {
            TelemetryMessage::FusedPosition(FusedPosition {
                lat: to_e7(BASE_LAT + ESTIMATE_RADIUS * angle.sin()),
                lon: to_e7(BASE_LON + ESTIMATE_RADIUS * angle.cos()),
            })
        }
    }
}

fn to_e7(deg: f64) -> i32 {
    (deg * 1e7_f64).round() as i32
}

impl TelemetrySource for FakeSource {
    fn describe(&self) -> &str {
        FAKE_PREFIX
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<TelemetryMessage>> {
        if timeout < self.interval {
            sleep(timeout);
            return Ok(None);
        }

        sleep(self.interval);

        Ok(Some(self.next_message()))
    }
}

impl Default for FakeSource {
    fn default() -> Self {
        FakeSource::new(DEFAULT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_source_sequence() {
        let mut s = FakeSource::new(Duration::from_millis(0));

        assert!(s.wait_for_liveness(&AtomicBool::new(false)).unwrap());

        let mut raw = 0;
        let mut fused = 0;
        let mut no_speed = 0;

        for _ in 0..40 {
            match s.receive(Duration::from_secs(1)).unwrap() {
                Some(TelemetryMessage::RawFix(f)) => {
                    raw += 1;
                    assert_eq!(f.satellites_visible, Some(10));
                    assert_eq!(f.fix_type, Some(3));
                    assert!((f.lat - 400087100).abs() <= 2000);
                    if f.vel.is_none() {
                        no_speed += 1;
                    }
                }
                Some(TelemetryMessage::FusedPosition(p)) => {
                    fused += 1;
                    assert!((p.lon - -1052479300).abs() <= 2000);
                }
                m => panic!("unexpected message {:?}", m),
            }
        }

        assert_eq!(raw, 20);
        assert_eq!(fused, 20);
        assert_eq!(no_speed, 2);
    }

    #[test]
    fn test_fake_source_short_timeout() {
        let mut s = FakeSource::new(Duration::from_millis(50));

        assert_eq!(s.receive(Duration::from_millis(1)).unwrap(), None);
    }
}
