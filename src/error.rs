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

use std::error;
use std::fmt;
use std::io;
use std::result;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    WebSocket(ws::Error),
    Json(serde_json::Error),
    Signal(ctrlc::Error),
    /// An environment setting could not be used
    Config {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
    /// The telemetry source will not yield any more messages
    SourceClosed,
}

pub type Result<T> = result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ws::Error> for Error {
    fn from(err: ws::Error) -> Error {
        Error::WebSocket(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<ctrlc::Error> for Error {
    fn from(err: ctrlc::Error) -> Error {
        Error::Signal(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => write!(f, "I/O error: {}", e),
            Error::WebSocket(ref e) => write!(f, "WebSocket error: {}", e),
            Error::Json(ref e) => write!(f, "unable to encode frame: {}", e),
            Error::Signal(ref e) => write!(f, "unable to install signal handler: {}", e),
            Error::Config {
                key,
                ref value,
                reason,
            } => write!(f, "invalid {}={:?}: {}", key, value, reason),
            Error::SourceClosed => write!(f, "telemetry source closed"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            Error::WebSocket(ref e) => Some(e),
            Error::Json(ref e) => Some(e),
            Error::Signal(ref e) => Some(e),
            _ => None,
        }
    }
}
