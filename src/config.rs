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

use crate::link::backoff::Backoff;
use clap::Parser;
use std::time::Duration;

/// Telemetry core for a DAA cockpit display
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Ground station telemetry relay to connect to.
    #[arg(long, value_name = "URL", default_value = "ws://127.0.0.1:8083")]
    pub url: String,

    /// Text sent to the relay once the connection is open.
    #[arg(long, default_value = "Connection Established")]
    pub handshake: String,

    /// Event loop rate in Hz
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..=50))]
    pub frequency: u16,

    /// Listen on host:port and broadcast snapshots to connected displays.
    #[arg(long, value_name = "ADDR")]
    pub display_listen: Option<String>,

    /// Stay disconnected once the telemetry link drops.
    #[arg(long, default_value_t = false)]
    pub no_reconnect: bool,

    /// First reconnect delay ceiling in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 500)]
    pub reconnect_initial_ms: u64,

    /// Upper bound for reconnect delays in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub reconnect_max_secs: u64,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// The reconnect policy, `None` when reconnection is off.
    pub fn backoff(&self) -> Option<Backoff> {
        if self.no_reconnect {
            return None;
        }

        Some(Backoff::new(
            Duration::from_millis(self.reconnect_initial_ms),
            Duration::from_secs(self.reconnect_max_secs),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::try_parse_from(&["daa-display"]).unwrap();

        assert_eq!(c.url, "ws://127.0.0.1:8083");
        assert_eq!(c.handshake, "Connection Established");
        assert_eq!(c.frequency, 4);
        assert_eq!(c.display_listen, None);
        assert!(!c.verbose);

        let b = c.backoff().unwrap();
        assert_eq!(b.ceiling(), Duration::from_millis(500));
    }

    #[test]
    fn test_flags() {
        let c = Config::try_parse_from(&[
            "daa-display",
            "--url",
            "ws://gcs:9000",
            "--frequency",
            "10",
            "--display-listen",
            "0.0.0.0:9001",
            "--no-reconnect",
            "-v",
        ]).unwrap();

        assert_eq!(c.url, "ws://gcs:9000");
        assert_eq!(c.frequency, 10);
        assert_eq!(c.display_listen.as_ref().map(String::as_str), Some("0.0.0.0:9001"));
        assert!(c.verbose);
        assert!(c.backoff().is_none());
    }

    #[test]
    fn test_frequency_range() {
        assert!(Config::try_parse_from(&["daa-display", "--frequency", "0"]).is_err());
        assert!(Config::try_parse_from(&["daa-display", "--frequency", "51"]).is_err());
        assert!(Config::try_parse_from(&["daa-display", "--frequency", "50"]).is_ok());
    }
}
