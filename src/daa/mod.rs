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

pub mod handle;

use self::handle::{BasicHandle, Handle, PushableHandle};
use crate::link::{Link, LinkEvent};
use crate::session::{Notice, Request, Session};
use crate::view::{Snapshot, View};
use std::collections::VecDeque;
use std::thread::sleep;
use std::time::{Duration, Instant};

const MAINTENANCE_FREQ: u16 = 1;

pub struct Daa {
    links: Vec<Box<dyn Link>>,
    views: Vec<Box<dyn View>>,
    session: Session,
    interval: Duration,
    frequency: u16,
    link_queue: VecDeque<LinkEvent>,
    notice_queue: VecDeque<Notice>,
    request_queue: VecDeque<Request>,
    maintenance_counter: u32,
    /// Maintenance only runs once the link has been opened
    started: bool,
    handle: BasicHandle,
}

impl Daa {
    pub fn new(freq: u16) -> Self {
        let freq = freq.max(1);

        Daa {
            links: vec![],
            views: vec![],
            session: Session::default(),
            link_queue: VecDeque::new(),
            notice_queue: VecDeque::new(),
            request_queue: VecDeque::new(),
            maintenance_counter: 0,
            started: false,
            frequency: freq,
            interval: Duration::from_millis((1000 / freq) as u64),
            handle: BasicHandle::new(freq),
        }
    }

    pub fn link_link(&mut self, l: Box<dyn Link>) {
        self.links.push(l);
    }

    pub fn link_view(&mut self, v: Box<dyn View>) {
        self.views.push(v);
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn run_links(&mut self) {
        let mut handle = PushableHandle::new(&self.handle, &mut self.link_queue);

        for l in self.links.iter_mut() {
            l.run(&mut handle);
        }
    }

    /// Applies what the views asked for during the last iteration.
    fn run_requests(&mut self) {
        while let Some(r) = self.request_queue.pop_front() {
            debug!("display request {:?}", r);
            self.session.apply(&r);
        }
    }

    fn run_session(&mut self) {
        let mut handle = PushableHandle::new(&self.handle, &mut self.notice_queue);

        debug!("total {} link events to process", self.link_queue.len());

        while let Some(e) = self.link_queue.pop_front() {
            match e {
                LinkEvent::Opened => {
                    if !self.started {
                        info!("telemetry started, maintenance enabled");
                    }
                    self.started = true;
                }
                LinkEvent::Closed => warn!("telemetry link lost"),
                LinkEvent::Frame(ref text) => {
                    trace!("{}", text);
                    self.session.process(&mut handle, text);
                }
            }
        }
    }

    fn run_maintenance(&mut self) {
        if !self.started {
            return;
        }

        let session = &mut self.session;
        let now = self.handle.get_clock();

        run_every!(MAINTENANCE_FREQ, self.maintenance_counter, self.handle, {
            session.maintain(now);
        });
    }

    fn run_views(&mut self) {
        let snapshot = self.session
            .active()
            .map(|ac| Snapshot::capture(ac, self.handle.get_utc()));

        {
            let mut handle = PushableHandle::new(&self.handle, &mut self.request_queue);
            let (first, second) = self.notice_queue.as_slices();
            debug!("total {} notices to deliver", self.notice_queue.len());
            trace!("{:?}", first);
            trace!("{:?}", second);

            for v in self.views.iter_mut() {
                v.run(&mut handle, snapshot.as_ref(), first.iter().chain(second));
            }
        }

        self.notice_queue.clear();
    }

    /// One loop iteration with "now" pinned to `clock`.
    pub fn step_at(&mut self, clock: Instant) {
        self.handle = BasicHandle::at(self.frequency, clock);

        self.run_links();
        self.run_requests();
        self.run_session();
        self.run_maintenance();
        self.run_views();
    }

    pub fn step(&mut self) {
        self.step_at(Instant::now());
    }

    pub fn run(&mut self) {
        loop {
            // main event loop
            let before = Instant::now();

            self.step();

            let elapsed = before.elapsed();

            if elapsed < self.interval {
                sleep(self.interval - elapsed);
            } else {
                warn!("loop unable to keep up with the set frequency");
            }
        }
    }
}
