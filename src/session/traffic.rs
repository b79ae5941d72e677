// DAA Display - telemetry core for a cockpit situational display
// Copyright (C) 2017  Datong Sun (dndx@idndx.com)
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

//! Traffic around an ownship, as relayed from its ADS-B receiver.

use crate::message::TrafficReport;
use std::f64::consts::PI;
use std::time::{Duration, Instant};

/// Traffic not heard from for this long is dropped.
pub const MAX_STALE: Duration = Duration::from_millis(2000);
const SYMBOL: &str = "daa-traffic-monitor";

#[derive(Debug, PartialEq, Copy, Clone, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrafficSource {
    Sim,
    Sensor,
    ADSB,
    Unknown,
}

impl TrafficSource {
    pub fn from_emitter(emitter_type: Option<i64>) -> Self {
        match emitter_type {
            Some(255) => TrafficSource::Sim,
            Some(100) => TrafficSource::Sensor,
            Some(0) => TrafficSource::ADSB,
            _ => TrafficSource::Unknown,
        }
    }
}

/// A tracked traffic target, in display units.
///
/// `last_update` is an [`Instant`] so staleness is not affected by
/// system clock jumps.
#[derive(Debug, PartialEq, Clone)]
pub struct Traffic {
    /// ICAO address
    pub id: String,
    pub callsign: String,
    /// Latitude in deg
    pub lat: f64,
    /// Longitude in deg
    pub lon: f64,
    /// Altitude in m
    pub alt: f64,
    /// Ground speed in m/s
    pub vel: f64,
    /// Heading in deg
    pub hdg: f64,
    /// Velocity in the display frame, heading 0 points along +y
    pub x: f64,
    pub y: f64,
    pub source: TrafficSource,
    pub last_update: Instant,
}

#[derive(Debug, PartialEq, Copy, Clone, Serialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

#[derive(Debug, PartialEq, Copy, Clone, Serialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// What the traffic widgets draw for one target.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Descriptor {
    pub s: Position,
    pub v: Velocity,
    pub symbol: &'static str,
    #[serde(rename = "callSign")]
    pub call_sign: String,
}

impl Traffic {
    pub fn new(r: &TrafficReport, clock: Instant) -> Self {
        let callsign = callsign_of(r).unwrap_or(r.icao_address.as_str()).to_string();

        let mut t = Traffic {
            id: r.icao_address.clone(),
            callsign,
            lat: 0_f64,
            lon: 0_f64,
            alt: 0_f64,
            vel: 0_f64,
            hdg: 0_f64,
            x: 0_f64,
            y: 0_f64,
            source: TrafficSource::from_emitter(r.emitter_type),
            last_update: clock,
        };

        t.update(r, clock);
        t
    }

    /// Overwrites the kinematic state. A callsign, once known, sticks. Until
    /// then the address stands in for it.
    pub fn update(&mut self, r: &TrafficReport, clock: Instant) {
        if self.callsign == self.id {
            if let Some(cs) = callsign_of(r) {
                debug!("traffic {} is {}", self.id, cs);
                self.callsign = cs.to_string();
            }
        }

        self.lat = e7_to_deg!(r.lat);
        self.lon = e7_to_deg!(r.lon);
        self.alt = mm_to_m!(r.altitude);
        self.vel = centi!(r.hor_velocity);
        self.hdg = centi!(r.heading);

        if r.emitter_type.is_some() {
            self.source = TrafficSource::from_emitter(r.emitter_type);
        }

        self.last_update = clock;
        self.convert_velocity();
    }

    fn convert_velocity(&mut self) {
        let rad = (self.hdg + 90_f64) * PI / 180_f64;

        self.x = self.vel * rad.cos();
        self.y = self.vel * rad.sin();
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_update) >= MAX_STALE
    }

    pub fn descriptor(&self) -> Descriptor {
        Descriptor {
            s: Position {
                lat: self.lat,
                lon: self.lon,
                alt: self.alt,
            },
            v: Velocity {
                x: self.x,
                y: self.y,
                z: 0_f64,
            },
            symbol: SYMBOL,
            call_sign: self.callsign.clone(),
        }
    }
}

/// The reported callsign without padding, `None` when blank.
fn callsign_of(r: &TrafficReport) -> Option<&str> {
    r.callsign
        .as_ref()
        .map(|cs| cs.trim_matches(|c: char| c.is_whitespace() || c == '\0'))
        .filter(|cs| !cs.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(addr: &str, callsign: Option<&str>) -> TrafficReport {
        TrafficReport {
            icao_address: addr.to_string(),
            lat: 284967330_f64,
            lon: -805303440_f64,
            altitude: 120000_f64,
            hor_velocity: 1500_f64,
            heading: 0_f64,
            callsign: callsign.map(String::from),
            emitter_type: Some(255),
        }
    }

    #[test]
    fn test_new_traffic_units() {
        let t = Traffic::new(&report("11259375", Some("N268AK  ")), Instant::now());

        assert_eq!(t.id, "11259375");
        assert_eq!(t.callsign, "N268AK");
        assert_eq!(t.lat, 28.496733);
        assert_eq!(t.lon, -80.530344);
        assert_eq!(t.alt, 120_f64);
        assert_eq!(t.vel, 15_f64);
        assert_eq!(t.source, TrafficSource::Sim);
    }

    #[test]
    fn test_callsign_falls_back_to_address() {
        let clock = Instant::now();

        assert_eq!(Traffic::new(&report("A1B2C3", Some("")), clock).callsign, "A1B2C3");
        assert_eq!(Traffic::new(&report("A1B2C3", None), clock).callsign, "A1B2C3");
    }

    #[test]
    fn test_callsign_learned_later() {
        let clock = Instant::now();
        let mut t = Traffic::new(&report("A1B2C3", Some("\0\0\0")), clock);
        assert_eq!(t.callsign, "A1B2C3");

        t.update(&report("A1B2C3", None), clock);
        assert_eq!(t.callsign, "A1B2C3");

        t.update(&report("A1B2C3", Some("DAL42 ")), clock);
        assert_eq!(t.callsign, "DAL42");

        // known callsigns are not replaced
        t.update(&report("A1B2C3", Some("OTHER")), clock);
        assert_eq!(t.callsign, "DAL42");
    }

    #[test]
    fn test_velocity_rotation() {
        let clock = Instant::now();
        let mut r = report("1", None);
        let mut t = Traffic::new(&r, clock);

        // heading 0 points up the display
        assert!(t.x.abs() < 1e-9);
        assert!((t.y - 15_f64).abs() < 1e-9);

        r.heading = 9000_f64;
        t.update(&r, clock);
        assert_eq!(t.hdg, 90_f64);
        assert!((t.x + 15_f64).abs() < 1e-9);
        assert!(t.y.abs() < 1e-9);

        let d = t.descriptor();
        assert_eq!(d.v.x, t.x);
        assert_eq!(d.v.z, 0_f64);
        assert_eq!(d.s.alt, 120_f64);
        assert_eq!(d.symbol, "daa-traffic-monitor");
        assert_eq!(d.call_sign, "1");
    }

    #[test]
    fn test_is_stale() {
        let t0 = Instant::now();
        let t = Traffic::new(&report("1", None), t0);

        assert!(!t.is_stale(t0 + Duration::from_millis(1999)));
        assert!(t.is_stale(t0 + Duration::from_millis(2000)));
        assert!(t.is_stale(t0 + Duration::from_millis(2001)));
    }

    #[test]
    fn test_descriptor_json() {
        let t = Traffic::new(&report("1", Some("UAV1")), Instant::now());
        let js = serde_json::to_value(t.descriptor()).unwrap();

        assert_eq!(js["callSign"], "UAV1");
        assert_eq!(js["s"]["lat"], 28.496733);
        assert_eq!(js["symbol"], "daa-traffic-monitor");
    }
}
