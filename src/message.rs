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

//! Decoding of inbound telemetry frames.
//!
//! The ground station relays MAVLink messages as flat JSON objects. Which
//! fields are present depends on three discriminators: `info`/`INFO`, `name`
//! and `TYPE`. [`decode`] resolves them once and hands the session a typed
//! [`Message`], so dispatch never checks for field presence.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{self, Map, Value};
use thiserror::Error;

pub const NUM_BAND_ENTRIES: usize = 5;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("invalid {kind} frame: {source}")]
    Body {
        kind: &'static str,
        source: serde_json::Error,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct Frame {
    /// `AIRCRAFT` field, if it parses as an integer
    pub aircraft: Option<i64>,
    pub message: Message,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Message {
    /// The ground station could not reach the vehicle
    ConnectionFailed,
    /// The vehicle process went away
    ShutDown,
    Heartbeat(Heartbeat),
    GlobalPositionInt(GlobalPositionInt),
    Attitude(Attitude),
    Traffic(TrafficReport),
    KinematicBands(KinematicBands),
    CommandAck(CommandAck),
    StatusText(StatusText),
    /// Anything else, carrying its `TYPE` if there was one
    Other(Option<String>),
}

#[derive(Debug, PartialEq, Clone, Default, Deserialize)]
pub struct Heartbeat {
    #[serde(default, deserialize_with = "lenient_int")]
    pub base_mode: Option<i64>,
}

/// Fixed-point position report: degE7, millimeters, cm/s and centidegrees.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct GlobalPositionInt {
    pub lat: f64,
    pub lon: f64,
    pub relative_alt: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub hdg: f64,
}

/// Attitude and angular rates in radians.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub rollspeed: f64,
    pub pitchspeed: f64,
    pub yawspeed: f64,
}

/// A relayed ADSB_VEHICLE message.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct TrafficReport {
    #[serde(rename = "ICAO_address", deserialize_with = "address")]
    pub icao_address: String,
    /// degE7
    pub lat: f64,
    /// degE7
    pub lon: f64,
    /// mm
    pub altitude: f64,
    /// cm/s
    pub hor_velocity: f64,
    /// centidegrees
    pub heading: f64,
    #[serde(default)]
    pub callsign: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub emitter_type: Option<i64>,
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct BandEntry {
    /// Raw band type: `category * 7 + severity`
    pub kind: Option<i64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(from = "RawKinematicBands")]
pub struct KinematicBands {
    pub num_bands: i64,
    pub entries: [BandEntry; NUM_BAND_ENTRIES],
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct CommandAck {
    #[serde(default, deserialize_with = "lenient_int")]
    pub command: Option<i64>,
    pub result: i64,
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct StatusText {
    pub severity: u8,
    pub text: String,
}

#[derive(Deserialize)]
#[allow(non_snake_case)]
struct RawKinematicBands {
    numBands: i64,
    type1: i64,
    type2: Option<i64>,
    type3: Option<i64>,
    type4: Option<i64>,
    type5: Option<i64>,
    min1: Option<f64>,
    min2: Option<f64>,
    min3: Option<f64>,
    min4: Option<f64>,
    min5: Option<f64>,
    max1: Option<f64>,
    max2: Option<f64>,
    max3: Option<f64>,
    max4: Option<f64>,
    max5: Option<f64>,
}

impl From<RawKinematicBands> for KinematicBands {
    fn from(r: RawKinematicBands) -> Self {
        let entry = |kind, min, max| BandEntry { kind, min, max };

        KinematicBands {
            num_bands: r.numBands,
            entries: [
                entry(Some(r.type1), r.min1, r.max1),
                entry(r.type2, r.min2, r.max2),
                entry(r.type3, r.min3, r.max3),
                entry(r.type4, r.min4, r.max4),
                entry(r.type5, r.min5, r.max5),
            ],
        }
    }
}

pub fn decode(text: &str) -> Result<Frame, DecodeError> {
    let obj = match serde_json::from_str::<Value>(text)? {
        Value::Object(o) => o,
        _ => return Err(DecodeError::NotAnObject),
    };

    let aircraft = obj.get("AIRCRAFT").and_then(parse_int);
    let message = decode_message(obj)?;

    Ok(Frame { aircraft, message })
}

fn decode_message(obj: Map<String, Value>) -> Result<Message, DecodeError> {
    let info = obj.get("info").or_else(|| obj.get("INFO"));
    if info.and_then(Value::as_str) == Some("CONNECTION_FAILED") {
        return Ok(Message::ConnectionFailed);
    }

    if obj.get("name").and_then(Value::as_str) == Some("SHUT_DOWN") {
        return Ok(Message::ShutDown);
    }

    let kind = match obj.get("TYPE").and_then(Value::as_str) {
        Some(k) => k.to_owned(),
        None => return Ok(Message::Other(None)),
    };

    let body = Value::Object(obj);

    Ok(match kind.as_str() {
        "HEARTBEAT" => Message::Heartbeat(body_of("HEARTBEAT", body)?),
        "GLOBAL_POSITION_INT" => Message::GlobalPositionInt(body_of("GLOBAL_POSITION_INT", body)?),
        "ATTITUDE" => Message::Attitude(body_of("ATTITUDE", body)?),
        "TRAFFIC" => Message::Traffic(body_of("TRAFFIC", body)?),
        "ICAROUS_KINEMATIC_BANDS" => {
            Message::KinematicBands(body_of("ICAROUS_KINEMATIC_BANDS", body)?)
        }
        "COMMAND_ACK" => Message::CommandAck(body_of("COMMAND_ACK", body)?),
        "STATUSTEXT" => Message::StatusText(body_of("STATUSTEXT", body)?),
        _ => Message::Other(Some(kind)),
    })
}

fn body_of<T: DeserializeOwned>(kind: &'static str, body: Value) -> Result<T, DecodeError> {
    serde_json::from_value(body).map_err(|source| DecodeError::Body { kind, source })
}

/// Integer coercion the ground station relies on: numbers are truncated,
/// strings contribute their leading integer.
fn parse_int(v: &Value) -> Option<i64> {
    match *v {
        Value::Number(ref n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(ref s) => parse_int_prefix(s),
        _ => None,
    }
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let digits_from = if s.starts_with('-') || s.starts_with('+') {
        1
    } else {
        0
    };

    let len = s[digits_from..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if len == 0 {
        return None;
    }

    s[..digits_from + len].parse().ok()
}

fn lenient_int<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_int(&Value::deserialize(d)?))
}

fn address<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(d)? {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s),
        other => Err(de::Error::custom(format!("invalid ICAO address {}", other))),
    }
}
