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

use crate::config::Config;
use crate::error::Result;
use crate::ingest::{IngestLoop, IngestStats};
use crate::render::{render, RenderOptions};
use crate::shell::{Control, Shell};
use crate::source::TelemetrySource;
use crate::telemetry::Telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, sleep, JoinHandle};
use std::time::{Duration, Instant};

/// Owns the shared telemetry, the ingestion thread and the render loop
pub struct App {
    telemetry: Arc<Telemetry>,
    shutdown: Arc<AtomicBool>,
    interval: Duration,
    options: RenderOptions,
    ingest: Option<JoinHandle<Option<IngestStats>>>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        App {
            telemetry: Arc::new(Telemetry::new(config.history_capacity)),
            shutdown: Arc::new(AtomicBool::new(false)),
            interval: config.refresh_interval,
            options: RenderOptions::from(config),
            ingest: None,
        }
    }

    pub fn telemetry(&self) -> &Arc<Telemetry> {
        &self.telemetry
    }

    /// Raising this flag stops both the ingestion thread and the render loop
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Raise the shutdown flag on SIGINT/SIGTERM
    pub fn handle_interrupt(&self) -> Result<()> {
        let flag = self.shutdown.clone();

        ctrlc::set_handler(move || {
            info!("interrupted, shutting down");
            flag.store(true, Ordering::Relaxed);
        })?;

        Ok(())
    }

    pub fn spawn_ingest(&mut self, source: Box<dyn TelemetrySource + Send>) -> Result<()> {
        let l = IngestLoop::new(source, self.telemetry.clone(), self.shutdown.clone());
        let shutdown = self.shutdown.clone();

        let handle = thread::Builder::new()
            .name("ingest".to_string())
            .spawn(move || match l.run() {
                Ok(stats) => Some(stats),
                Err(e) => {
                    error!("ingestion failed: {}", e);
                    shutdown.store(true, Ordering::Relaxed);
                    None
                }
            })?;
        debug!("spawned ingestion thread");

        self.ingest = Some(handle);

        Ok(())
    }

    /// Render into `shell` at the configured interval until shutdown, the
    /// user quitting or the shell failing
    pub fn run<S: Shell + ?Sized>(&mut self, shell: &mut S) -> Result<()> {
        let res = self.render_loop(shell);
        self.stop();

        res
    }

    fn render_loop<S: Shell + ?Sized>(&mut self, shell: &mut S) -> Result<()> {
        while !self.shutdown.load(Ordering::Relaxed) {
            let before = Instant::now();

            let frame = render(&self.telemetry, &self.options);
            trace!("{}", frame.status);

            if shell.present(&frame)? == Control::Quit {
                info!("quit requested");
                break;
            }

            let elapsed = before.elapsed();

            if elapsed < self.interval {
                sleep(self.interval - elapsed);
            } else {
                warn!("render loop unable to keep up with the set refresh interval");
            }
        }

        Ok(())
    }

    /// Raise shutdown and wait for the ingestion thread
    pub fn stop(&mut self) -> Option<IngestStats> {
        self.shutdown.store(true, Ordering::Relaxed);

        let handle = self.ingest.take()?;
        match handle.join() {
            Ok(stats) => stats,
            Err(_) => {
                error!("ingestion thread panicked");
                None
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Frame;
    use crate::source::fake::FakeSource;
    use crate::source::{RawFix, TelemetryMessage};
    use std::collections::VecDeque;

    fn config() -> Config {
        Config {
            history_capacity: 8,
            refresh_interval: Duration::from_millis(5),
            tile_token: Some("pk.test".to_string()),
            ..Config::default()
        }
    }

    /// Records frames and quits after `limit` of them
    struct Recorder {
        frames: Vec<Frame>,
        limit: usize,
    }

    impl Shell for Recorder {
        fn present(&mut self, frame: &Frame) -> Result<Control> {
            self.frames.push(frame.clone());

            if self.frames.len() >= self.limit {
                return Ok(Control::Quit);
            }

            Ok(Control::Continue)
        }
    }

    struct Scripted(VecDeque<TelemetryMessage>);

    impl TelemetrySource for Scripted {
        fn describe(&self) -> &str {
            "scripted"
        }

        fn receive(&mut self, timeout: Duration) -> Result<Option<TelemetryMessage>> {
            match self.0.pop_front() {
                Some(m) => Ok(Some(m)),
                None => {
                    sleep(timeout.min(Duration::from_millis(2)));
                    Ok(None)
                }
            }
        }
    }

    #[test]
    fn test_run_until_quit() {
        let mut app = App::new(&config());
        let mut shell = Recorder {
            frames: vec![],
            limit: 3,
        };

        app.run(&mut shell).unwrap();

        assert_eq!(shell.frames.len(), 3);
        assert!(shell.frames[0].status.starts_with("Waiting for data"));
        assert!(app.shutdown_flag().load(Ordering::Relaxed));
    }

    #[test]
    fn test_ingest_feeds_frames() {
        let mut app = App::new(&config());
        let mut q = VecDeque::new();
        q.push_back(TelemetryMessage::Heartbeat);
        for i in 0..20 {
            q.push_back(TelemetryMessage::RawFix(RawFix {
                lat: 400087100 + i,
                lon: -1052479300,
                vel: Some(150),
                satellites_visible: Some(10),
                fix_type: Some(3),
            }));
        }

        app.spawn_ingest(Box::new(Scripted(q))).unwrap();

        // wait for the script to be consumed
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.telemetry().latest.read().position.map(|p| p.lat) != Some(deg_e7!(400087119))
            && Instant::now() < deadline
        {
            sleep(Duration::from_millis(1));
        }

        let mut shell = Recorder {
            frames: vec![],
            limit: 1,
        };
        app.run(&mut shell).unwrap();

        let f = &shell.frames[0];
        assert_eq!(f.scene.traces.len(), 2);
        // capacity bounds the trail
        assert_eq!(f.scene.traces[0].points.len(), 8);
        assert_eq!(f.status, "lat=40.008712, lon=-105.247930 | speed=1.50 m/s | sats=10 | fix=3");

        assert_eq!(app.stop(), None);
    }

    #[test]
    fn test_stop_returns_stats() {
        let mut app = App::new(&config());
        app.spawn_ingest(Box::new(FakeSource::new(Duration::from_millis(1))))
            .unwrap();

        sleep(Duration::from_millis(50));

        let stats = app.stop().unwrap();
        assert!(stats.raw_fixes > 0);
        assert!(stats.fused_positions > 0);
        assert!(app.telemetry().raw.len() <= 8);
    }
}
