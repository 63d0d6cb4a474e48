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

//! Pulls messages off the vehicle link and folds them into `Telemetry`.

use crate::error::{Error, Result};
use crate::source::{TelemetryMessage, TelemetrySource};
use crate::telemetry::{Coordinate, FixUpdate, Telemetry};
use chrono::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Bounded wait of a single receive, also how often shutdown is checked
pub const RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(PartialEq, Debug, Copy, Clone)]
pub enum Ingested {
    RawFix,
    FusedPosition,
    Ignored,
}

#[derive(PartialEq, Debug, Default, Copy, Clone)]
pub struct IngestStats {
    pub raw_fixes: u64,
    pub fused_positions: u64,
    pub ignored: u64,
}

impl IngestStats {
    fn count(&mut self, i: Ingested) {
        match i {
            Ingested::RawFix => self.raw_fixes += 1,
            Ingested::FusedPosition => self.fused_positions += 1,
            Ingested::Ignored => self.ignored += 1,
        }
    }
}

/// Apply a single message. Raw fixes update the raw track and the latest
/// state, fused positions only the estimate track.
pub fn apply(t: &Telemetry, msg: &TelemetryMessage, received_at: DateTime<Utc>) -> Ingested {
    match *msg {
        TelemetryMessage::RawFix(ref f) => {
            let position = Coordinate::from_e7(f.lat, f.lon);
            let speed = f.vel.map(|v| cmps_to_mps!(v));

            t.raw.append(position);
            t.latest.update(FixUpdate {
                position,
                ground_speed_mps: speed,
                satellites_visible: f.satellites_visible,
                fix_type: f.fix_type,
                received_at,
            });

            debug!(
                "lat={:.7}, lon={:.7}, speed={:?} m/s, sats={:?}",
                position.lat, position.lon, speed, f.satellites_visible
            );

            Ingested::RawFix
        }
        TelemetryMessage::FusedPosition(ref p) => {
            t.estimate.append(Coordinate::from_e7(p.lat, p.lon));
            Ingested::FusedPosition
        }
        ref m => {
            trace!("ignoring {:?}", m);
            Ingested::Ignored
        }
    }
}

pub struct IngestLoop {
    source: Box<dyn TelemetrySource + Send>,
    telemetry: Arc<Telemetry>,
    shutdown: Arc<AtomicBool>,
    timeout: Duration,
    stats: IngestStats,
}

impl IngestLoop {
    pub fn new(
        source: Box<dyn TelemetrySource + Send>,
        telemetry: Arc<Telemetry>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            telemetry,
            shutdown,
            timeout: RECEIVE_TIMEOUT,
            stats: IngestStats::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs until shutdown is raised or the source closes. Blocks without
    /// limit waiting for the first heartbeat.
    pub fn run(mut self) -> Result<IngestStats> {
        info!("waiting for heartbeat on {}", self.source.describe());

        if !self.source.wait_for_liveness(&self.shutdown)? {
            info!("shutdown requested before any heartbeat");
            return Ok(self.stats);
        }

        info!("heartbeat received on {}", self.source.describe());

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.source.receive(self.timeout) {
                Ok(Some(msg)) => {
                    let i = apply(&self.telemetry, &msg, Utc::now());
                    self.stats.count(i);
                }
                Ok(None) => continue,
                Err(Error::SourceClosed) => {
                    warn!("telemetry source {} closed", self.source.describe());
                    break;
                }
                Err(e) => debug!("receive failed: {}", e),
            }
        }

        info!(
            "ingestion stopped: {} raw fixes, {} fused positions, {} ignored",
            self.stats.raw_fixes, self.stats.fused_positions, self.stats.ignored
        );

        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FusedPosition, RawFix};
    use crate::telemetry::Snapshot;
    use std::collections::VecDeque;
    use std::thread;

    fn raw(lat: i32, lon: i32, vel: Option<u16>) -> TelemetryMessage {
        TelemetryMessage::RawFix(RawFix {
            lat,
            lon,
            vel,
            satellites_visible: Some(9),
            fix_type: Some(3),
        })
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    /// Replays a fixed script, then reports timeouts or a closed link
    struct Scripted {
        q: VecDeque<Result<Option<TelemetryMessage>>>,
        close_when_empty: bool,
    }

    impl TelemetrySource for Scripted {
        fn describe(&self) -> &str {
            "scripted"
        }

        fn receive(&mut self, _timeout: Duration) -> Result<Option<TelemetryMessage>> {
            match self.q.pop_front() {
                Some(r) => r,
                None if self.close_when_empty => Err(Error::SourceClosed),
                None => {
                    thread::sleep(Duration::from_millis(1));
                    Ok(None)
                }
            }
        }
    }

    #[test]
    fn test_apply_raw_fix() {
        let t = Telemetry::new(10);

        assert_eq!(
            apply(&t, &raw(400087100, -1052479300, Some(150)), now()),
            Ingested::RawFix
        );

        let s = t.latest.read();
        let p = s.position.unwrap();
        assert!((p.lat - 40.00871).abs() < 1e-9);
        assert!((p.lon - -105.24793).abs() < 1e-9);
        assert!((s.ground_speed_mps.unwrap() - 1.5).abs() < 1e-9);
        assert_eq!(s.satellites_visible, Some(9));
        assert_eq!(s.fix_type, Some(3));
        assert_eq!(s.updated_at, Some(now()));
        assert_eq!(t.raw.snapshot(), vec![p]);
        assert!(t.estimate.is_empty());
    }

    #[test]
    fn test_apply_raw_fix_without_speed() {
        let t = Telemetry::new(10);
        apply(&t, &raw(1, 1, Some(150)), now());
        apply(&t, &raw(2, 2, None), now());

        assert_eq!(t.latest.read().ground_speed_mps, None);
        assert_eq!(t.raw.len(), 2);
    }

    #[test]
    fn test_apply_fused_position() {
        let t = Telemetry::new(10);

        assert_eq!(
            apply(
                &t,
                &TelemetryMessage::FusedPosition(FusedPosition {
                    lat: 400087100,
                    lon: -1052479300,
                }),
                now()
            ),
            Ingested::FusedPosition
        );

        assert_eq!(t.estimate.len(), 1);
        assert!(t.raw.is_empty());
        assert_eq!(t.latest.read(), Snapshot::default());
    }

    #[test]
    fn test_apply_ignores_other() {
        let t = Telemetry::new(10);

        assert_eq!(apply(&t, &TelemetryMessage::Other(1), now()), Ingested::Ignored);
        assert_eq!(apply(&t, &TelemetryMessage::Heartbeat, now()), Ingested::Ignored);
        assert!(t.raw.is_empty());
        assert!(t.estimate.is_empty());
        assert_eq!(t.latest.read(), Snapshot::default());
    }

    #[test]
    fn test_run_until_source_closes() {
        let t = Arc::new(Telemetry::new(10));
        let source = Scripted {
            q: vec![
                Ok(Some(raw(1, 1, Some(1)))),
                Ok(Some(TelemetryMessage::Heartbeat)),
                Ok(Some(raw(2, 2, Some(2)))),
                Ok(None),
                Err(Error::Config {
                    key: "X",
                    value: String::new(),
                    reason: "bad frame",
                }),
                Ok(Some(TelemetryMessage::FusedPosition(FusedPosition { lat: 3, lon: 3 }))),
                Ok(Some(TelemetryMessage::Other(42))),
            ].into_iter()
                .collect(),
            close_when_empty: true,
        };

        let stats = IngestLoop::new(Box::new(source), t.clone(), Arc::new(AtomicBool::new(false)))
            .run()
            .unwrap();

        // the fix before the heartbeat is discarded
        assert_eq!(
            stats,
            IngestStats {
                raw_fixes: 1,
                fused_positions: 1,
                ignored: 1,
            }
        );
        assert_eq!(t.raw.snapshot(), vec![Coordinate::from_e7(2, 2)]);
        assert_eq!(t.estimate.len(), 1);
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let t = Arc::new(Telemetry::new(10));
        let shutdown = Arc::new(AtomicBool::new(false));
        let source = Scripted {
            q: vec![Ok(Some(TelemetryMessage::Heartbeat))]
                .into_iter()
                .collect(),
            close_when_empty: false,
        };

        let handle = {
            let t = t.clone();
            let shutdown = shutdown.clone();

            thread::spawn(move || {
                IngestLoop::new(Box::new(source), t, shutdown)
                    .with_timeout(Duration::from_millis(5))
                    .run()
            })
        };

        thread::sleep(Duration::from_millis(20));
        shutdown.store(true, Ordering::Relaxed);

        assert_eq!(handle.join().unwrap().unwrap(), IngestStats::default());
    }

    #[test]
    fn test_run_shutdown_before_heartbeat() {
        let source = Scripted {
            q: VecDeque::new(),
            close_when_empty: false,
        };

        let stats = IngestLoop::new(
            Box::new(source),
            Arc::new(Telemetry::new(10)),
            Arc::new(AtomicBool::new(true)),
        ).run()
            .unwrap();

        assert_eq!(stats, IngestStats::default());
    }
}
