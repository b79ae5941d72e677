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

use rand::Rng;
use std::time::Duration;

/// Exponential reconnect delays with "equal jitter": attempt `n` waits a
/// uniform time in `[c/2, c]` where `c = min(max, initial * 2^n)`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            attempt: 0,
        }
    }

    /// Upper bound of the next delay.
    pub fn ceiling(&self) -> Duration {
        let factor = 1_u32.checked_shl(self.attempt).unwrap_or(u32::MAX);

        self.initial
            .checked_mul(factor)
            .map_or(self.max, |c| c.min(self.max))
    }

    pub fn next(&mut self) -> Duration {
        let ms = self.ceiling().as_millis() as u64;
        let delay = rand::rng().random_range(ms / 2..=ms);

        self.attempt = self.attempt.saturating_add(1);
        Duration::from_millis(delay)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
