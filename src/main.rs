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

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

#[macro_use]
mod utils;
mod config;
mod daa;
mod link;
mod message;
mod session;
mod view;

use clap::Parser;
use config::Config;
use daa::Daa;
use log::LevelFilter;
use std::process;

fn main() {
    let config = Config::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if config.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    let mut d = Daa::new(config.frequency);

    d.link_link(link::websocket::WebSocketLink::new(
        config.url.clone(),
        config.handshake.clone(),
        config.backoff(),
    ));

    d.link_view(view::console::LogView::new());

    if let Some(ref addr) = config.display_listen {
        match view::websocket::DisplayServer::new(addr) {
            Ok(s) => {
                info!("displays connect to ws://{}", s.local_addr());
                d.link_view(s);
            }
            Err(e) => {
                error!("unable to start display server on {}: {}", addr, e);
                process::exit(1);
            }
        }
    }

    info!("connecting to {} at {} Hz", config.url, config.frequency);
    d.run();
}
