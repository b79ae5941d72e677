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

use super::bands::{Category, KinematicBands};
use super::traffic::Traffic;
use crate::message::{self, Attitude, GlobalPositionInt, Heartbeat, TrafficReport};
use std::time::{Duration, Instant};

/// Bands not refreshed for longer than this are cleared.
pub const BANDS_TIMEOUT: Duration = Duration::from_millis(1000);
/// Without any position or heartbeat for this long we have lost the link.
pub const COMMS_TIMEOUT: Duration = Duration::from_secs(10);
/// Altitude shown until the first position report, in m
const INITIAL_ALT: f64 = 5_f64;

#[derive(Debug, PartialEq, Copy, Clone, Serialize)]
pub enum FlightMode {
    #[serde(rename = "PRE-FLIGHT")]
    PreFlight,
    #[serde(rename = "STABILIZE DISARMED")]
    StabilizeDisarmed,
    #[serde(rename = "STABILIZE ARMED")]
    StabilizeArmed,
    #[serde(rename = "GUIDED DISARMED")]
    GuidedDisarmed,
    #[serde(rename = "GUIDED ARMED")]
    GuidedArmed,
    #[serde(rename = "AUTO DISARMED")]
    AutoDisarmed,
    #[serde(rename = "AUTO ARMED")]
    AutoArmed,
}

impl FlightMode {
    /// Maps the ArduPilot style `base_mode` bits we know about.
    pub fn from_base_mode(base_mode: i64) -> Option<FlightMode> {
        match base_mode {
            1 => Some(FlightMode::PreFlight),
            81 => Some(FlightMode::StabilizeDisarmed),
            209 => Some(FlightMode::StabilizeArmed),
            89 => Some(FlightMode::GuidedDisarmed),
            217 => Some(FlightMode::GuidedArmed),
            93 => Some(FlightMode::AutoDisarmed),
            221 => Some(FlightMode::AutoArmed),
            _ => None,
        }
    }
}

/// A tracked ownship.
#[derive(Debug, Clone)]
pub struct Aircraft {
    pub id: i64,
    /// The one being displayed
    pub active: bool,
    /// Latitude in deg
    pub lat: f64,
    /// Longitude in deg
    pub lng: f64,
    /// Altitude in m
    pub alt: f64,
    /// Altitude above home in m
    pub rel_alt: f64,
    /// Velocity north, east and down in m/s
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    /// Heading in deg
    pub hdg: f64,
    /// Attitude in deg
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    /// Angular rates in deg/s
    pub roll_speed: f64,
    pub pitch_speed: f64,
    pub yaw_speed: f64,
    pub has_comms: bool,
    pub comms_last: Option<Instant>,
    pub gps_status: bool,
    pub flight_mode: Option<FlightMode>,
    pub bands: KinematicBands,
    pub last_bands_update: Option<Instant>,
    pub traffic: Vec<Traffic>,
    /// Traffic disappeared during the last maintenance, redraw even if
    /// nothing moved
    pub rerender: bool,
}

impl Aircraft {
    pub fn new(id: i64) -> Self {
        Aircraft {
            id,
            active: false,
            lat: 0_f64,
            lng: 0_f64,
            alt: INITIAL_ALT,
            rel_alt: 0_f64,
            vx: 0_f64,
            vy: 0_f64,
            vz: 0_f64,
            hdg: 0_f64,
            roll: 0_f64,
            pitch: 0_f64,
            yaw: 0_f64,
            roll_speed: 0_f64,
            pitch_speed: 0_f64,
            yaw_speed: 0_f64,
            has_comms: false,
            comms_last: None,
            gps_status: false,
            flight_mode: None,
            bands: KinematicBands::new(),
            last_bands_update: None,
            traffic: vec![],
            rerender: false,
        }
    }

    fn touch_comms(&mut self, clock: Instant) {
        self.has_comms = true;
        self.comms_last = Some(clock);
    }

    pub fn update_heartbeat(&mut self, h: &Heartbeat, clock: Instant) {
        self.touch_comms(clock);

        if let Some(mode) = h.base_mode.and_then(FlightMode::from_base_mode) {
            if self.flight_mode != Some(mode) {
                debug!("aircraft {} flight mode {:?}", self.id, mode);
            }
            self.flight_mode = Some(mode);
        }
    }

    pub fn update_position(&mut self, p: &GlobalPositionInt, clock: Instant) {
        self.touch_comms(clock);

        self.lat = e7_to_deg!(p.lat);
        self.lng = e7_to_deg!(p.lon);
        self.alt = mm_to_m!(p.relative_alt);
        self.rel_alt = mm_to_m!(p.relative_alt);
        self.vx = centi!(p.vx);
        self.vy = centi!(p.vy);
        self.vz = centi!(p.vz);
        self.hdg = centi!(p.hdg);

        self.gps_status = true;
    }

    pub fn update_attitude(&mut self, a: &Attitude) {
        self.roll = rad_to_deg!(a.roll);
        self.pitch = rad_to_deg!(a.pitch);
        self.yaw = rad_to_deg!(a.yaw);
        self.roll_speed = rad_to_deg!(a.rollspeed);
        self.pitch_speed = rad_to_deg!(a.pitchspeed);
        self.yaw_speed = rad_to_deg!(a.yawspeed);
    }

    /// Updates the matching traffic in place, or starts tracking it.
    pub fn update_traffic(&mut self, r: &TrafficReport, clock: Instant) {
        if let Some(t) = self.traffic.iter_mut().find(|t| t.id == r.icao_address) {
            t.update(r, clock);
            return;
        }

        debug!("aircraft {} new traffic {}", self.id, r.icao_address);
        self.traffic.push(Traffic::new(r, clock));
    }

    pub fn update_bands(&mut self, m: &message::KinematicBands, clock: Instant) -> Option<Category> {
        let cat = self.bands.ingest(m);

        if cat.is_some() {
            self.last_bands_update = Some(clock);
        }

        cat
    }

    /// The 1 Hz housekeeping: expire bands, traffic and the comms flag.
    pub fn maintain(&mut self, now: Instant) {
        self.rerender = false;

        let bands_fresh = self.last_bands_update
            .map_or(false, |t| now.saturating_duration_since(t) <= BANDS_TIMEOUT);
        if !bands_fresh {
            self.bands.clear();
        }

        let before = self.traffic.len();
        self.traffic.retain(|t| !t.is_stale(now));
        if self.traffic.len() != before {
            debug!("aircraft {} dropped {} stale traffic", self.id, before - self.traffic.len());
            self.rerender = true;
        }

        let comms_fresh = self.comms_last
            .map_or(false, |t| now.saturating_duration_since(t) < COMMS_TIMEOUT);
        if self.has_comms && !comms_fresh {
            warn!("lost comms with aircraft {}", self.id);
            self.has_comms = false;
            self.gps_status = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{BandEntry, NUM_BAND_ENTRIES};
    use std::f64::consts::PI;

    fn position() -> GlobalPositionInt {
        GlobalPositionInt {
            lat: 284967330_f64,
            lon: -805303440_f64,
            relative_alt: 5000_f64,
            vx: 1000_f64,
            vy: 0_f64,
            vz: 0_f64,
            hdg: 9000_f64,
        }
    }

    fn traffic(addr: &str) -> TrafficReport {
        TrafficReport {
            icao_address: addr.to_string(),
            lat: 0_f64,
            lon: 0_f64,
            altitude: 0_f64,
            hor_velocity: 0_f64,
            heading: 0_f64,
            callsign: None,
            emitter_type: None,
        }
    }

    fn far_band() -> message::KinematicBands {
        let mut entries = [BandEntry::default(); NUM_BAND_ENTRIES];
        entries[0] = BandEntry {
            kind: Some(5),
            min: Some(10_f64),
            max: Some(20_f64),
        };

        message::KinematicBands {
            num_bands: 1,
            entries,
        }
    }

    #[test]
    fn test_new_aircraft() {
        let ac = Aircraft::new(3);

        assert_eq!(ac.alt, 5_f64);
        assert_eq!(ac.rel_alt, 0_f64);
        assert!(!ac.active && !ac.has_comms && !ac.gps_status);
        assert!(ac.traffic.is_empty());
    }

    #[test]
    fn test_position_units() {
        let mut ac = Aircraft::new(1);
        ac.update_position(&position(), Instant::now());

        assert_eq!(ac.lat, 28.496733);
        assert_eq!(ac.lng, -80.530344);
        assert_eq!(ac.rel_alt, 5.0);
        assert_eq!(ac.alt, 5.0);
        assert_eq!(ac.vx, 10.0);
        assert_eq!(ac.vy, 0_f64);
        assert_eq!(ac.vz, 0_f64);
        assert_eq!(ac.hdg, 90.0);
        assert!(ac.gps_status);
        assert!(ac.has_comms);
    }

    #[test]
    fn test_attitude_units() {
        let mut ac = Aircraft::new(1);
        ac.update_attitude(&Attitude {
            roll: PI / 2_f64,
            pitch: -PI / 4_f64,
            yaw: PI,
            rollspeed: 0_f64,
            pitchspeed: 0_f64,
            yawspeed: PI / 180_f64,
        });

        assert!((ac.roll - 90_f64).abs() < 1e-9);
        assert!((ac.pitch + 45_f64).abs() < 1e-9);
        assert!((ac.yaw - 180_f64).abs() < 1e-9);
        assert!((ac.yaw_speed - 1_f64).abs() < 1e-9);
    }

    #[test]
    fn test_heartbeat_flight_mode() {
        let mut ac = Aircraft::new(1);

        ac.update_heartbeat(&Heartbeat { base_mode: Some(209) }, Instant::now());
        assert_eq!(ac.flight_mode, Some(FlightMode::StabilizeArmed));
        assert!(ac.has_comms);

        // unknown modes keep the last known one
        ac.update_heartbeat(&Heartbeat { base_mode: Some(18) }, Instant::now());
        assert_eq!(ac.flight_mode, Some(FlightMode::StabilizeArmed));
    }

    #[test]
    fn test_traffic_updated_in_place() {
        let t0 = Instant::now();
        let mut ac = Aircraft::new(1);

        ac.update_traffic(&traffic("AAA"), t0);
        ac.update_traffic(&traffic("BBB"), t0);

        let mut moved = traffic("AAA");
        moved.lat = 10_000_000_f64;
        ac.update_traffic(&moved, t0 + Duration::from_millis(500));

        assert_eq!(ac.traffic.len(), 2);
        assert_eq!(ac.traffic[0].id, "AAA");
        assert_eq!(ac.traffic[0].lat, 1_f64);
        assert_eq!(ac.traffic[0].last_update, t0 + Duration::from_millis(500));
        assert!(ac.traffic.iter().any(|t| t.id == "BBB"));
        assert!(!ac.traffic.iter().any(|t| t.id == "CCC"));
    }

    #[test]
    fn test_maintain_expires_traffic() {
        let t0 = Instant::now();
        let mut ac = Aircraft::new(1);

        ac.update_traffic(&traffic("OLD"), t0);
        ac.update_traffic(&traffic("NEW"), t0 + Duration::from_millis(2));

        ac.maintain(t0 + Duration::from_millis(2001));
        assert_eq!(ac.traffic.len(), 1);
        assert_eq!(ac.traffic[0].id, "NEW");
        assert!(ac.rerender);

        // nothing removed, flag is reset
        ac.maintain(t0 + Duration::from_millis(2001));
        assert!(!ac.rerender);
    }

    #[test]
    fn test_maintain_keeps_recent_traffic() {
        let t0 = Instant::now();
        let mut ac = Aircraft::new(1);

        ac.update_traffic(&traffic("AAA"), t0);
        ac.maintain(t0 + Duration::from_millis(1999));

        assert_eq!(ac.traffic.len(), 1);
        assert!(!ac.rerender);
    }

    #[test]
    fn test_maintain_expires_bands() {
        let t0 = Instant::now();
        let mut ac = Aircraft::new(1);

        assert_eq!(ac.update_bands(&far_band(), t0), Some(Category::Heading));
        ac.maintain(t0 + Duration::from_millis(900));
        assert!(!ac.bands.is_empty());

        // exactly one second old is still fresh
        ac.maintain(t0 + Duration::from_millis(1000));
        assert!(!ac.bands.is_empty());

        ac.maintain(t0 + Duration::from_millis(1001));
        assert!(ac.bands.is_empty());
        assert_eq!(ac.bands, KinematicBands::new());
    }

    #[test]
    fn test_maintain_comms_timeout() {
        let t0 = Instant::now();
        let mut ac = Aircraft::new(1);

        ac.update_position(&position(), t0);
        ac.maintain(t0 + Duration::from_secs(9));
        assert!(ac.has_comms);

        ac.maintain(t0 + Duration::from_secs(10));
        assert!(!ac.has_comms);
        assert!(!ac.gps_status);
    }
}
