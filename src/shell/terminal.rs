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

//! Plots the tracks on a braille canvas in the terminal.

use super::*;
use crate::render::{Dash, Scene, Series, TraceKind, TRACKING_ZOOM};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Map, MapResolution};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

/// Fraction of the data span added on each side
const PADDING: f64 = 0.05;
/// Smallest span in deg shown on either axis, about 10 m of latitude
const MIN_SPAN: f64 = 1e-4;

/// x is longitude, y is latitude, both `[min, max]`
#[derive(PartialEq, Debug, Copy, Clone)]
struct PlotBounds {
    x: [f64; 2],
    y: [f64; 2],
}

const WORLD: PlotBounds = PlotBounds {
    x: [-180.0, 180.0],
    y: [-90.0, 90.0],
};

fn padded(min: f64, max: f64) -> [f64; 2] {
    let span = (max - min).max(MIN_SPAN);
    let mid = (min + max) / 2_f64;
    let half = span * (0.5 + PADDING);

    [mid - half, mid + half]
}

/// Autoscale to every drawn point. With nothing to draw, frame the map
/// view: close around the vehicle once it has a fix, the world otherwise.
fn plot_bounds(scene: &Scene) -> PlotBounds {
    let mut points = scene.traces.iter().flat_map(|t| t.points.iter());

    let first = match points.next() {
        Some(p) => *p,
        None if scene.view.zoom >= TRACKING_ZOOM => {
            let c = scene.view.center;
            return PlotBounds {
                x: padded(c.lon, c.lon),
                y: padded(c.lat, c.lat),
            };
        }
        None => return WORLD,
    };

    let (mut x0, mut x1, mut y0, mut y1) = (first.lon, first.lon, first.lat, first.lat);
    for p in points {
        x0 = x0.min(p.lon);
        x1 = x1.max(p.lon);
        y0 = y0.min(p.lat);
        y1 = y1.max(p.lat);
    }

    PlotBounds {
        x: padded(x0, x1),
        y: padded(y0, y1),
    }
}

fn color(series: Series, kind: TraceKind) -> Color {
    match (series, kind) {
        (Series::Raw, TraceKind::Line) => Color::Cyan,
        (Series::Raw, TraceKind::Marker) => Color::Yellow,
        (Series::Estimate, TraceKind::Line) => Color::Magenta,
        (Series::Estimate, TraceKind::Marker) => Color::LightMagenta,
    }
}

fn draw(f: &mut ratatui::Frame, frame: &Frame) {
    let [plot, status] = Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(f.area());
    let scene = &frame.scene;
    let bounds = plot_bounds(scene);

    let legend: Vec<Span> = scene
        .traces
        .iter()
        .filter(|t| t.kind == TraceKind::Line)
        .map(|t| Span::styled(format!(" {} ", t.name), Style::default().fg(color(t.series, t.kind))))
        .collect();
    let mut title = vec![Span::raw(" Live GPS_RAW_INT track ")];
    title.extend(legend);

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(title))
                .title_top(Line::from(" Latitude (deg) ").right_aligned())
                .title_bottom(Line::from(" Longitude (deg) ").centered()),
        )
        .marker(Marker::Braille)
        .x_bounds(bounds.x)
        .y_bounds(bounds.y)
        .paint(|ctx| {
            if scene.traces.is_empty() && bounds == WORLD {
                ctx.draw(&Map {
                    color: Color::DarkGray,
                    resolution: MapResolution::High,
                });
                ctx.layer();
            }

            for t in scene.traces.iter().filter(|t| t.kind == TraceKind::Line) {
                let c = color(t.series, t.kind);

                for (i, w) in t.points.windows(2).enumerate() {
                    // dotted lines skip every other segment
                    if t.style.dash == Dash::Dot && i % 2 == 1 {
                        continue;
                    }

                    ctx.draw(&CanvasLine {
                        x1: w[0].lon,
                        y1: w[0].lat,
                        x2: w[1].lon,
                        y2: w[1].lat,
                        color: c,
                    });
                }
            }

            ctx.layer();

            for t in scene.traces.iter().filter(|t| t.kind == TraceKind::Marker) {
                for p in &t.points {
                    ctx.print(
                        p.lon,
                        p.lat,
                        Span::styled("●", Style::default().fg(color(t.series, t.kind))),
                    );
                }
            }
        });
    f.render_widget(canvas, plot);

    let text = Paragraph::new(frame.status.as_str())
        .block(Block::default().borders(Borders::ALL).title(" Status (q to quit) "));
    f.render_widget(text, status);
}

pub struct TerminalShell {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalShell {
    /// Switches the terminal to raw mode on the alternate screen until the
    /// shell is dropped
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self { terminal })
    }

    /// Drain pending key presses without blocking
    fn quit_requested(&self) -> Result<bool> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                    // raw mode swallows SIGINT
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(true)
                    }
                    _ => {}
                }
            }
        }

        Ok(false)
    }
}

impl Shell for TerminalShell {
    fn present(&mut self, frame: &Frame) -> Result<Control> {
        self.terminal.draw(|f| draw(f, frame))?;

        if self.quit_requested()? {
            return Ok(Control::Quit);
        }

        Ok(Control::Continue)
    }
}

impl Drop for TerminalShell {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render, RenderOptions};
    use crate::telemetry::{Coordinate, FixUpdate, Telemetry};
    use chrono::prelude::*;
    use ratatui::backend::TestBackend;

    fn tracked() -> Telemetry {
        let t = Telemetry::new(16);
        for &(lat, lon) in &[(40.0, -105.0), (40.001, -105.002), (40.002, -105.001)] {
            t.raw.append(Coordinate::new(lat, lon));
            t.estimate.append(Coordinate::new(lat, lon + 0.0005));
            t.latest.update(FixUpdate {
                position: Coordinate::new(lat, lon),
                ground_speed_mps: Some(2.0),
                satellites_visible: Some(11),
                fix_type: Some(3),
                received_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            });
        }
        t
    }

    #[test]
    fn test_bounds_world_without_fix() {
        let f = render(&Telemetry::new(4), &RenderOptions::default());

        assert_eq!(plot_bounds(&f.scene), WORLD);
    }

    #[test]
    fn test_bounds_around_single_fix() {
        let t = Telemetry::new(4);
        t.latest.update(FixUpdate {
            position: Coordinate::new(10.0, 20.0),
            ground_speed_mps: None,
            satellites_visible: None,
            fix_type: None,
            received_at: Utc::now(),
        });

        let b = plot_bounds(&render(&t, &RenderOptions::default()).scene);
        assert!(b.x[0] < 20.0 && 20.0 < b.x[1]);
        assert!(b.y[0] < 10.0 && 10.0 < b.y[1]);
        assert!(b.x[1] - b.x[0] >= MIN_SPAN);
    }

    #[test]
    fn test_bounds_cover_all_traces() {
        let b = plot_bounds(&render(&tracked(), &RenderOptions::default()).scene);

        assert!(b.x[0] < -105.002 && b.x[1] > -104.9995);
        assert!(b.y[0] < 40.0 && b.y[1] > 40.002);
    }

    #[test]
    fn test_draw_status_line() {
        let frame = render(&tracked(), &RenderOptions { tile_token: true });
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();

        terminal.draw(|f| draw(f, &frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("sats=11"));
        assert!(text.contains("Live GPS_RAW_INT track"));
        assert!(text.contains("GPS_RAW_INT trail"));
        assert!(text.contains("Latitude (deg)"));
        assert!(text.contains("Longitude (deg)"));
    }
}
