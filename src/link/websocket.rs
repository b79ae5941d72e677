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

use super::backoff::Backoff;
use super::*;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{sleep, spawn, JoinHandle};

/// Connection state shared between the handler and the reconnect loop.
#[derive(Default)]
struct State {
    opened: Cell<bool>,
    hung_up: Cell<bool>,
}

struct Client {
    out: ws::Sender,
    tx: Sender<LinkEvent>,
    handshake: String,
    state: Rc<State>,
}

impl Client {
    fn emit(&self, e: LinkEvent) -> ws::Result<()> {
        if self.tx.send(e).is_err() {
            debug!("event loop went away, closing telemetry link");
            self.state.hung_up.set(true);
            return self.out.shutdown();
        }

        Ok(())
    }
}

impl ws::Handler for Client {
    fn on_open(&mut self, _: ws::Handshake) -> ws::Result<()> {
        info!("telemetry link open");
        self.state.opened.set(true);

        self.out.send(self.handshake.as_str())?;
        self.emit(LinkEvent::Opened)
    }

    fn on_message(&mut self, msg: ws::Message) -> ws::Result<()> {
        match msg {
            ws::Message::Text(t) => self.emit(LinkEvent::Frame(t)),
            ws::Message::Binary(b) => match String::from_utf8(b) {
                Ok(t) => self.emit(LinkEvent::Frame(t)),
                Err(e) => {
                    warn!("dropping binary frame: {}", e);
                    Ok(())
                }
            },
        }
    }

    fn on_close(&mut self, code: ws::CloseCode, reason: &str) {
        info!("telemetry link closed: {:?} {}", code, reason);

        if self.tx.send(LinkEvent::Closed).is_err() {
            self.state.hung_up.set(true);
        }
    }

    fn on_error(&mut self, err: ws::Error) {
        error!("telemetry link error: {}", err);
    }
}

/// Runs one connection to completion, blocking the calling thread.
fn connect_once(url: &str, handshake: &str, tx: &Sender<LinkEvent>, state: &Rc<State>) -> ws::Result<()> {
    ws::connect(url, |out: ws::Sender| Client {
        out,
        tx: tx.clone(),
        handshake: handshake.to_string(),
        state: Rc::clone(state),
    })
}

fn connect_loop(url: String, handshake: String, mut backoff: Option<Backoff>, tx: Sender<LinkEvent>) {
    let state = Rc::new(State::default());

    loop {
        state.opened.set(false);
        debug!("connecting to {}", url);

        if let Err(e) = connect_once(&url, &handshake, &tx, &state) {
            error!("unable to connect to {}: {}", url, e);
        }

        if state.hung_up.get() {
            return;
        }

        let b = match backoff {
            Some(ref mut b) => b,
            None => {
                info!("reconnection disabled, telemetry link stays down");
                return;
            }
        };

        if state.opened.get() {
            b.reset();
        }

        let delay = b.next();
        info!("reconnecting to {} in {} ms", url, delay.as_millis());
        sleep(delay);
    }
}

pub struct WebSocketLink {
    _handle: JoinHandle<()>,
    rx: Receiver<LinkEvent>,
}

impl WebSocketLink {
    pub fn new(url: String, handshake: String, backoff: Option<Backoff>) -> Box<Self> {
        let (tx, rx) = channel();

        let handle = spawn(move || connect_loop(url, handshake, backoff, tx));
        debug!("spawned telemetry link thread");

        Box::new(Self {
            _handle: handle,
            rx,
        })
    }
}

impl Link for WebSocketLink {
    fn run(&mut self, h: &mut dyn Pushable<LinkEvent>) {
        for e in self.rx.try_iter() {
            h.push_data(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daa::handle::{BasicHandle, PushableHandle};
    use std::collections::VecDeque;

    #[test]
    fn test_bad_url_gives_up_without_reconnect() {
        let (tx, rx) = channel();
        let state = Rc::new(State::default());

        assert!(connect_once("not a url", "hello", &tx, &state).is_err());
        assert!(!state.opened.get());

        drop(tx);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_link_thread_exits_and_run_is_empty() {
        let link = WebSocketLink::new("not a url".to_string(), "hello".to_string(), None);
        let b = BasicHandle::new(4);
        let mut q = VecDeque::new();

        // the thread finishes on its own once connecting fails
        let WebSocketLink { _handle: handle, rx } = *link;
        handle.join().unwrap();
        let mut link = WebSocketLink { _handle: spawn(|| {}), rx };

        link.run(&mut PushableHandle::new(&b, &mut q));
        assert!(q.is_empty());
    }
}
