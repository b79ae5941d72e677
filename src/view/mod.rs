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

pub mod console;
pub mod websocket;

use crate::daa::handle::Pushable;
use crate::session::aircraft::{Aircraft, FlightMode};
use crate::session::bands::KinematicBands;
use crate::session::traffic::Descriptor;
use crate::session::{Notice, Request};
use chrono::{DateTime, Utc};
use std::iter::Chain;
use std::slice::Iter;

pub type ChainedIter<'a, T> = Chain<Iter<'a, T>, Iter<'a, T>>;

/// What the rendering widgets see of the active aircraft, in display units.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Snapshot {
    pub utc: DateTime<Utc>,
    pub id: i64,
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,
    pub rel_alt: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub hdg: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub roll_speed: f64,
    pub pitch_speed: f64,
    pub yaw_speed: f64,
    pub has_comms: bool,
    pub gps_status: bool,
    pub flight_mode: Option<FlightMode>,
    pub rerender: bool,
    pub ic_bands: KinematicBands,
    pub traffic: Vec<Descriptor>,
}

impl Snapshot {
    pub fn capture(ac: &Aircraft, utc: DateTime<Utc>) -> Self {
        Snapshot {
            utc,
            id: ac.id,
            lat: ac.lat,
            lng: ac.lng,
            alt: ac.alt,
            rel_alt: ac.rel_alt,
            vx: ac.vx,
            vy: ac.vy,
            vz: ac.vz,
            hdg: ac.hdg,
            roll: ac.roll,
            pitch: ac.pitch,
            yaw: ac.yaw,
            roll_speed: ac.roll_speed,
            pitch_speed: ac.pitch_speed,
            yaw_speed: ac.yaw_speed,
            has_comms: ac.has_comms,
            gps_status: ac.gps_status,
            flight_mode: ac.flight_mode,
            rerender: ac.rerender,
            ic_bands: ac.bands.clone(),
            traffic: ac.traffic.iter().map(|t| t.descriptor()).collect(),
        }
    }
}

/// Consumes the state of every loop iteration, and may hand requests back to
/// the session for the next one
pub trait View {
    /// `snapshot` is `None` while no aircraft is active
    fn run(&mut self, handle: &mut dyn Pushable<Request>, snapshot: Option<&Snapshot>, notices: ChainedIter<Notice>);
}
