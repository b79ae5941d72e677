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

#[macro_export]
macro_rules! e7_to_deg {
    ($x:expr) => (($x as f64) / 10_000_000_f64);
}

#[macro_export]
macro_rules! mm_to_m {
    ($x:expr) => (($x as f64) / 1000_f64);
}

/// Also used for centidegrees to degrees.
#[macro_export]
macro_rules! centi {
    ($x:expr) => (($x as f64) / 100_f64);
}

#[macro_export]
macro_rules! rad_to_deg {
    ($x:expr) => (($x as f64) * 180_f64 / ::std::f64::consts::PI);
}

#[macro_export]
macro_rules! run_every {
    ($hz:expr, $counter:expr, $handle:expr, $action:block) => {
        $counter += 1;
        if $counter >= ($handle.get_frequency() as f32 / $hz as f32) as u32 {
            $counter = 0;
            $action;
        }
    }
}
