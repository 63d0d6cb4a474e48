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

//! Serves the map page and pushes every frame to connected browsers over
//! a WebSocket.

use super::*;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const TOKEN_PLACEHOLDER: &str = "{{MAPBOX_TOKEN}}";
pub const WS_PATH: &str = "/ws";

#[derive(PartialEq, Debug, Copy, Clone)]
enum Route {
    Upgrade,
    Index,
    NotFound,
}

fn route(resource: &str) -> Route {
    // ignore any query string
    let path = resource.split('?').next().unwrap_or(resource);

    match path {
        WS_PATH => Route::Upgrade,
        "/" | "/index.html" => Route::Index,
        _ => Route::NotFound,
    }
}

/// The page with the tile token baked in. An empty token makes the page
/// fall back to OpenStreetMap tiles.
fn index_page(token: Option<&str>) -> String {
    INDEX_HTML.replace(TOKEN_PLACEHOLDER, token.unwrap_or(""))
}

/// The frame as pushed to browsers, tagged like every other message
fn envelope(frame: &Frame) -> Result<String> {
    let mut js = serde_json::to_value(frame)?;
    js["type"] = "Frame".into();

    Ok(js.to_string())
}

/// One browser connection. Browsers only listen, anything they send is
/// dropped.
struct Client {
    page: Arc<Vec<u8>>,
}

impl ws::Handler for Client {
    fn on_request(&mut self, req: &ws::Request) -> ws::Result<ws::Response> {
        match route(req.resource()) {
            Route::Upgrade => ws::Response::from_request(req),
            Route::Index => {
                let mut res = ws::Response::new(200, "OK", self.page.to_vec());
                res.headers_mut()
                    .push(("Content-Type".to_string(), b"text/html; charset=utf-8".to_vec()));
                Ok(res)
            }
            Route::NotFound => {
                debug!("no such resource {}", req.resource());
                Ok(ws::Response::new(404, "Not Found", b"404 - Not Found".to_vec()))
            }
        }
    }

    fn on_message(&mut self, _msg: ws::Message) -> ws::Result<()> {
        Ok(())
    }
}

pub struct WebShell {
    broadcaster: ws::Sender,
    handle: Option<JoinHandle<()>>,
}

impl WebShell {
    pub fn bind(addr: &str, token: Option<&str>) -> Result<Self> {
        let page = Arc::new(index_page(token).into_bytes());

        let socket = ws::WebSocket::new(move |_: ws::Sender| Client { page: page.clone() })?.bind(addr)?;
        let broadcaster = socket.broadcaster();

        let handle = thread::Builder::new()
            .name("web-shell".to_string())
            .spawn(move || {
                if let Err(e) = socket.run() {
                    error!("WebSocket server stopped: {}", e);
                }
            })?;
        info!("serving live map on http://{}/", addr);

        Ok(Self {
            broadcaster,
            handle: Some(handle),
        })
    }
}

impl Shell for WebShell {
    fn present(&mut self, frame: &Frame) -> Result<Control> {
        self.broadcaster.send(envelope(frame)?)?;

        Ok(Control::Continue)
    }
}

impl Drop for WebShell {
    fn drop(&mut self) {
        if let Err(e) = self.broadcaster.shutdown() {
            warn!("unable to stop WebSocket server: {}", e);
        }

        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                error!("WebSocket thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render, RenderOptions};
    use crate::telemetry::Telemetry;

    #[test]
    fn test_route() {
        assert_eq!(route("/ws"), Route::Upgrade);
        assert_eq!(route("/ws?client=1"), Route::Upgrade);
        assert_eq!(route("/"), Route::Index);
        assert_eq!(route("/index.html"), Route::Index);
        assert_eq!(route("/favicon.ico"), Route::NotFound);
    }

    #[test]
    fn test_index_page_token() {
        let page = index_page(Some("pk.secret"));
        assert!(page.contains("pk.secret"));
        assert!(!page.contains(TOKEN_PLACEHOLDER));

        assert!(!index_page(None).contains(TOKEN_PLACEHOLDER));
    }

    #[test]
    fn test_index_page_connects_to_socket() {
        assert!(INDEX_HTML.contains(WS_PATH));
        assert!(INDEX_HTML.contains(TOKEN_PLACEHOLDER));
    }

    #[test]
    fn test_envelope() {
        let frame = render(&Telemetry::new(4), &RenderOptions::default());
        let js: serde_json::Value = serde_json::from_str(&envelope(&frame).unwrap()).unwrap();

        assert_eq!(js["type"], "Frame");
        assert_eq!(js["status"], frame.status.as_str());
        assert_eq!(js["scene"]["view"]["zoom"], 2);
        assert!(js["scene"]["traces"].as_array().unwrap().is_empty());
        assert!(js["last_fix"].is_null());
    }
}
