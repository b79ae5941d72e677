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
use log::Level;

/// Writes notices to the log and the active aircraft to the debug log once a
/// second.
pub struct LogView {
    counter: u32,
}

impl LogView {
    pub fn new() -> Box<Self> {
        Box::new(LogView { counter: 0 })
    }
}

/// Log level for a MAVLink `STATUSTEXT` severity.
pub fn status_level(severity: u8) -> Level {
    match severity {
        0..=1 => Level::Error,
        2..=3 => Level::Warn,
        _ => Level::Info,
    }
}

impl View for LogView {
    fn run(&mut self, handle: &mut dyn Pushable<Request>, snapshot: Option<&Snapshot>, notices: ChainedIter<Notice>) {
        for n in notices {
            match *n {
                Notice::Alert { ref message } => error!("{}", message),
                Notice::Aircraft { ref ids } => info!("aircraft online: {:?}", ids),
                Notice::StatusText {
                    aircraft,
                    severity,
                    ref text,
                } => log!(status_level(severity), "aircraft {}: {}", aircraft, text),
            }
        }

        run_every!(1, self.counter, handle, {
            match snapshot {
                Some(s) => debug!(
                    "aircraft {} at {:.6}, {:.6} alt {:.1} m hdg {:.0} comms {} traffic {} bands {}",
                    s.id,
                    s.lat,
                    s.lng,
                    s.alt,
                    s.hdg,
                    s.has_comms,
                    s.traffic.len(),
                    !s.ic_bands.is_empty()
                ),
                None => trace!("no active aircraft"),
            }
        });
    }
}
