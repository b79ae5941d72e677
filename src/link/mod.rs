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

pub mod backoff;
pub mod websocket;

use crate::daa::handle::Pushable;

#[derive(PartialEq, Debug, Clone)]
/// Represents what happened on the telemetry connection
pub enum LinkEvent {
    Opened,
    Frame(String),
    Closed,
}

/// A source of telemetry frames
pub trait Link {
    /// Hand over everything received since the last call, never blocks
    fn run(&mut self, h: &mut dyn Pushable<LinkEvent>);
}
