// DAA Display - telemetry core for a cockpit situational display
// Copyright (C) 2017-2018  Datong Sun (dndx@idndx.com)
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

use super::*;
use std::net::SocketAddr;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{spawn, JoinHandle};

/// One connected display. Anything it sends must be a [`Request`].
struct Display {
    tx: Sender<Request>,
}

fn decode_request(text: &str) -> serde_json::Result<Request> {
    serde_json::from_str(text)
}

impl ws::Handler for Display {
    fn on_message(&mut self, msg: ws::Message) -> ws::Result<()> {
        let text = match msg {
            ws::Message::Text(t) => t,
            ws::Message::Binary(_) => {
                warn!("ignoring binary message from display");
                return Ok(());
            }
        };

        match decode_request(&text) {
            Ok(r) => {
                if self.tx.send(r).is_err() {
                    debug!("event loop went away, dropping display request");
                }
            }
            Err(e) => warn!("invalid display request: {}", e),
        }

        Ok(())
    }
}

/// Broadcasts snapshots and notices to every connected display, and passes
/// their requests back to the session.
pub struct DisplayServer {
    ws_broadcaster: ws::Sender,
    local_addr: SocketAddr,
    rx: Receiver<Request>,
    _handle: JoinHandle<()>,
}

impl DisplayServer {
    pub fn new(addr: &str) -> ws::Result<Box<Self>> {
        let (tx, rx) = channel();

        let socket = ws::WebSocket::new(move |_: ws::Sender| Display { tx: tx.clone() })?.bind(addr)?;

        let local_addr = socket.local_addr()?;
        let ws_broadcaster = socket.broadcaster();

        let handle = spawn(move || {
            if let Err(e) = socket.run() {
                error!("display server stopped: {}", e);
            }
        });
        debug!("spawned display server thread");

        Ok(Box::new(Self {
            ws_broadcaster,
            local_addr,
            rx,
            _handle: handle,
        }))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn broadcast(&self, msg: serde_json::Result<String>) {
        let result = msg
            .map_err(|e| e.to_string())
            .and_then(|m| self.ws_broadcaster.send(m).map_err(|e| e.to_string()));

        if let Err(e) = result {
            warn!("display broadcast failed: {}", e);
        }
    }
}

fn encode_snapshot(s: &Snapshot) -> serde_json::Result<String> {
    let mut js = serde_json::to_value(s)?;
    js["type"] = "Snapshot".into();

    Ok(js.to_string())
}

impl View for DisplayServer {
    fn run(&mut self, handle: &mut dyn Pushable<Request>, snapshot: Option<&Snapshot>, notices: ChainedIter<Notice>) {
        for r in self.rx.try_iter() {
            handle.push_data(r);
        }

        for n in notices {
            self.broadcast(serde_json::to_string(n));
        }

        if let Some(s) = snapshot {
            self.broadcast(encode_snapshot(s));
        }
    }
}
