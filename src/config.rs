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

//! Runtime settings, read from the environment.

use crate::error::{Error, Result};
use crate::telemetry::DEFAULT_CAPACITY;
use std::env;
use std::time::Duration;

pub const CONN_VAR: &str = "MAVLINK_CONN";
pub const TOKEN_VAR: &str = "MAPBOX_TOKEN";
pub const HISTORY_VAR: &str = "TRACK_HISTORY";
pub const REFRESH_VAR: &str = "TRACK_REFRESH_MS";
pub const LISTEN_VAR: &str = "TRACK_LISTEN";

/// PX4 SITL sends to 14540, QGC style setups usually use 14550
pub const DEFAULT_CONNECTION: &str = "udpin:0.0.0.0:14540";
pub const DEFAULT_REFRESH_MS: u64 = 500; // 2 Hz
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8050";
/// Upper bound on `TRACK_HISTORY`, about 16 MB per track
pub const MAX_HISTORY: u64 = 1_000_000;

#[derive(PartialEq, Debug, Clone)]
pub struct Config {
    /// MAVLink connection string
    pub connection: String,
    /// Map tile access token, `None` if unset or empty
    pub tile_token: Option<String>,
    pub history_capacity: usize,
    pub refresh_interval: Duration,
    /// Address the web shell binds to
    pub listen: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: DEFAULT_CONNECTION.to_string(),
            tile_token: None,
            history_capacity: DEFAULT_CAPACITY,
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_MS),
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

fn positive(key: &'static str, value: String) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::Config {
            key,
            value,
            reason: "expected a positive integer",
        }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Build a config from `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut c = Config::default();

        if let Some(conn) = lookup(CONN_VAR) {
            if conn.trim().is_empty() {
                return Err(Error::Config {
                    key: CONN_VAR,
                    value: conn,
                    reason: "connection string must not be empty",
                });
            }
            c.connection = conn.trim().to_string();
        }

        c.tile_token = lookup(TOKEN_VAR).filter(|t| !t.trim().is_empty());

        if let Some(v) = lookup(HISTORY_VAR) {
            let n = positive(HISTORY_VAR, v.clone())?;
            c.history_capacity = match usize::try_from(n) {
                Ok(n) if n as u64 <= MAX_HISTORY => n,
                _ => {
                    return Err(Error::Config {
                        key: HISTORY_VAR,
                        value: v,
                        reason: "track history too large",
                    })
                }
            };
        }

        if let Some(v) = lookup(REFRESH_VAR) {
            c.refresh_interval = Duration::from_millis(positive(REFRESH_VAR, v)?);
        }

        if let Some(addr) = lookup(LISTEN_VAR) {
            c.listen = addr.trim().to_string();
        }

        debug!("{:?}", c);

        Ok(c)
    }

    pub fn has_tile_token(&self) -> bool {
        self.tile_token.is_some()
    }
}
