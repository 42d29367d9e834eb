/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Command-line shell: feeds JSON snapshot messages (one per line) from
//! stdin or a file into the channel and reports the reconciled state.

use bpaf::Bpaf;
use log::{error, info};
use std::io::BufRead;
use std::path::PathBuf;

use topodesk::app::TopodeskApp;
use topodesk::config::TopodeskConfig;

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
struct Options {
    /// Snapshot channel name (overrides the config file)
    #[bpaf(long, argument("NAME"))]
    channel: Option<String>,

    /// Load configuration from this file instead of the default location
    #[bpaf(long, argument("PATH"))]
    config: Option<PathBuf>,

    /// Read snapshot messages from this file instead of stdin
    #[bpaf(long, argument("PATH"))]
    input: Option<PathBuf>,
}

fn main() -> std::io::Result<()> {
    env_logger::init();
    let options = options().run();

    let mut config = match &options.config {
        Some(path) => TopodeskConfig::load_from(path),
        None => TopodeskConfig::load(),
    };
    if let Some(channel) = options.channel {
        config.channel = channel;
    }

    let mut app = TopodeskApp::new(&config);
    info!("subscribed to channel {}", app.channel_name());
    app.request_refresh();

    let publisher = app.publisher();
    let reader: Box<dyn BufRead> = match &options.input {
        Some(path) => Box::new(std::io::BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(std::io::stdin().lock()),
    };

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = publisher.publish_raw(&line) {
            error!("{e}");
            continue;
        }
        app.pump();
        app.step_layout(1.0 / 60.0);
    }

    info!(
        "final topology: {} nodes, {} links, {} host circles",
        app.map_view.node_count(),
        app.map_view.link_count(),
        app.map_view.sink().circle_count(),
    );
    Ok(())
}
