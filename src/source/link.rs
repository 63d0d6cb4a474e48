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

//! MAVLink connections, through the `mavlink` crate.

use super::*;
use crate::error::Error;
use mavlink::common::MavMessage;
use mavlink::error::MessageReadError;
use mavlink::{MavConnection, Message};
use std::io::ErrorKind;
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};

/// Messages buffered between the reader thread and the ingestion loop
const CHANNEL_DEPTH: usize = 1024;

type Connection = Box<dyn MavConnection<MavMessage> + Sync + Send>;

/// The `mavlink` crate only offers a blocking `recv()`, so a reader thread
/// owns the connection and feeds a channel that can be waited on with a
/// timeout.
pub struct MavlinkSource {
    conn: String,
    rx: Receiver<TelemetryMessage>,
    _reader: JoinHandle<()>,
}

impl MavlinkSource {
    /// `conn` is a mavlink connection string, e.g. `udpin:0.0.0.0:14540`
    pub fn connect(conn: &str) -> Result<Self> {
        let link = mavlink::connect::<MavMessage>(conn)?;
        let (tx, rx) = sync_channel(CHANNEL_DEPTH);

        let reader = thread::Builder::new()
            .name("mavlink-reader".to_string())
            .spawn(move || read_link(link, tx))?;
        debug!("spawned MAVLink reader thread for {}", conn);

        Ok(Self {
            conn: conn.to_string(),
            rx,
            _reader: reader,
        })
    }
}

fn read_link(link: Connection, tx: SyncSender<TelemetryMessage>) {
    loop {
        match link.recv() {
            Ok((_, msg)) => {
                if tx.send(translate(&msg)).is_err() {
                    debug!("telemetry receiver gone, stopping MAVLink reader");
                    return;
                }
            }
            Err(MessageReadError::Parse(e)) => debug!("dropping undecodable MAVLink frame: {}", e),
            Err(MessageReadError::Io(ref e)) if e.kind() == ErrorKind::Interrupted => continue,
            Err(MessageReadError::Io(ref e)) if e.kind() == ErrorKind::UnexpectedEof => {
                warn!("MAVLink connection reached end of stream");
                return;
            }
            // the link is gone, dropping `tx` reports the source closed
            Err(MessageReadError::Io(e)) => {
                error!("MAVLink connection failed: {}", e);
                return;
            }
        }
    }
}

/// Map a decoded MAVLink message onto what the ingestion loop understands.
/// `UINT16_MAX`/`UINT8_MAX` are the protocol's "unknown" markers.
pub fn translate(msg: &MavMessage) -> TelemetryMessage {
    match *msg {
        MavMessage::HEARTBEAT(_) => TelemetryMessage::Heartbeat,
        MavMessage::GPS_RAW_INT(ref d) => TelemetryMessage::RawFix(RawFix {
            lat: d.lat,
            lon: d.lon,
            vel: if d.vel == u16::MAX { None } else { Some(d.vel) },
            satellites_visible: if d.satellites_visible == u8::MAX {
                None
            } else {
                Some(d.satellites_visible)
            },
            fix_type: Some(d.fix_type as u8),
        }),
        MavMessage::GLOBAL_POSITION_INT(ref d) => {
            TelemetryMessage::FusedPosition(FusedPosition {
                lat: d.lat,
                lon: d.lon,
            })
        }
        ref other => TelemetryMessage::Other(other.message_id()),
    }
}

impl TelemetrySource for MavlinkSource {
    fn describe(&self) -> &str {
        &self.conn
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<TelemetryMessage>> {
        match self.rx.recv_timeout(timeout) {
            Ok(m) => Ok(Some(m)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::SourceClosed),
        }
    }
}
