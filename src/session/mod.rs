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

//! The registry of tracked aircraft and everything that mutates it.
//!
//! Aircraft come into existence with their first HEARTBEAT and leave with a
//! SHUT_DOWN. Frames for an aircraft we have not seen a heartbeat from are
//! dropped, since there is nothing to attach them to yet.

pub mod aircraft;
pub mod bands;
pub mod traffic;

use self::aircraft::Aircraft;
use crate::daa::handle::Pushable;
use crate::message::{self, Frame, Message};
use std::time::Instant;

/// Things the outside world should hear about.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Notice {
    /// Needs the user's attention
    Alert { message: String },
    /// The set of aircraft changed, ids in registry order
    Aircraft { ids: Vec<i64> },
    StatusText {
        aircraft: i64,
        severity: u8,
        text: String,
    },
}

/// What a display can ask of the session.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Show this aircraft
    Select { id: i64 },
}

pub struct Session {
    aircraft: Vec<Aircraft>,
}

impl Session {
    pub fn new() -> Self {
        Self { aircraft: vec![] }
    }

    #[cfg(test)]
    pub fn aircraft(&self) -> &[Aircraft] {
        &self.aircraft
    }

    pub fn get(&self, id: i64) -> Option<&Aircraft> {
        self.aircraft.iter().find(|ac| ac.id == id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut Aircraft> {
        self.aircraft.iter_mut().find(|ac| ac.id == id)
    }

    pub fn active(&self) -> Option<&Aircraft> {
        self.aircraft.iter().find(|ac| ac.active)
    }

    /// Makes `id` the displayed aircraft. Unknown ids change nothing.
    pub fn select(&mut self, id: i64) -> bool {
        if self.get(id).is_none() {
            return false;
        }

        for ac in self.aircraft.iter_mut() {
            ac.active = ac.id == id;
        }

        true
    }

    pub fn apply(&mut self, r: &Request) {
        match *r {
            Request::Select { id } => {
                if self.select(id) {
                    info!("aircraft {} selected", id);
                } else {
                    warn!("cannot select unknown aircraft {}", id);
                }
            }
        }
    }

    /// Decodes and applies one text frame. Frames that do not decode are
    /// logged and dropped.
    pub fn process(&mut self, handle: &mut dyn Pushable<Notice>, text: &str) {
        match message::decode(text) {
            Ok(f) => self.dispatch(handle, f),
            Err(e) => {
                warn!("dropping frame: {}", e);
                debug!("{}", text);
            }
        }
    }

    pub fn dispatch(&mut self, handle: &mut dyn Pushable<Notice>, f: Frame) {
        let clock = handle.get_clock();

        if let Message::ConnectionFailed = f.message {
            handle.push_data(Notice::Alert { message: "Connection Failed".to_string() });
            return;
        }

        let id = match f.aircraft {
            Some(id) => id,
            None => {
                trace!("frame without a usable AIRCRAFT: {:?}", f.message);
                return;
            }
        };

        if self.get(id).is_none() {
            match f.message {
                Message::Heartbeat(_) => self.create(handle, id),
                _ => {
                    trace!("aircraft {} not initialized yet, dropping frame", id);
                    return;
                }
            }
        }

        if let Message::ShutDown = f.message {
            self.remove(handle, id);
            return;
        }

        match f.message {
            Message::Heartbeat(ref h) => self.with(id, |ac| ac.update_heartbeat(h, clock)),
            Message::GlobalPositionInt(ref p) => self.with(id, |ac| ac.update_position(p, clock)),
            Message::Attitude(ref a) => self.with(id, |ac| ac.update_attitude(a)),
            Message::Traffic(ref t) => self.with(id, |ac| ac.update_traffic(t, clock)),
            Message::KinematicBands(ref b) => self.with(id, |ac| {
                if ac.update_bands(b, clock).is_none() {
                    debug!("aircraft {} bands with unknown type {:?}", ac.id, b.entries[0].kind);
                }
            }),
            Message::CommandAck(ref a) => {
                if a.result != 0 {
                    warn!("aircraft {} command {:?} failed: {}", id, a.command, a.result);
                }
            }
            Message::StatusText(ref s) => {
                handle.push_data(Notice::StatusText {
                    aircraft: id,
                    severity: s.severity,
                    text: s.text.clone(),
                });
            }
            Message::Other(ref kind) => trace!("ignoring {:?} from aircraft {}", kind, id),
            Message::ConnectionFailed | Message::ShutDown => {}
        }
    }

    fn with<F>(&mut self, id: i64, f: F)
    where
        F: FnOnce(&mut Aircraft),
    {
        match self.get_mut(id) {
            Some(ac) => f(ac),
            None => warn!("aircraft {} vanished while dispatching", id),
        }
    }

    fn create(&mut self, handle: &mut dyn Pushable<Notice>, id: i64) {
        let mut ac = Aircraft::new(id);
        ac.active = self.aircraft.is_empty();

        info!("new aircraft {}", id);
        self.aircraft.push(ac);

        handle.push_data(Notice::Aircraft { ids: self.ids() });
    }

    fn remove(&mut self, handle: &mut dyn Pushable<Notice>, id: i64) {
        let pos = match self.aircraft.iter().position(|ac| ac.id == id) {
            Some(p) => p,
            None => return,
        };

        let ac = self.aircraft.remove(pos);
        info!("aircraft {} shut down", id);

        if ac.active {
            if let Some(next) = self.aircraft.first_mut() {
                next.active = true;
            }
        }

        handle.push_data(Notice::Aircraft { ids: self.ids() });
    }

    fn ids(&self) -> Vec<i64> {
        self.aircraft.iter().map(|ac| ac.id).collect()
    }

    /// Periodic housekeeping for every aircraft.
    pub fn maintain(&mut self, now: Instant) {
        for ac in self.aircraft.iter_mut() {
            ac.maintain(now);
        }
    }
}

impl Default for Session {
    fn default() -> Session {
        Session::new()
    }
}
