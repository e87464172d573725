//! # Sunshine Watch Face Entry Point
//!
//! Wires the face to the system clock, the companion link on stdin, and a
//! frame sink. In development mode (`--stdout`) every frame is printed as
//! ASCII art; otherwise frames are rasterised into an in-memory canvas and
//! only logged.
//!
//! Usage:
//!   sunshine-watchface [--stdout] [--config PATH]
//!
//! Verbosity follows `RUST_LOG` (e.g. `RUST_LOG=debug`).

use anyhow::Context;
use embedded_graphics::{prelude::*, primitives::Rectangle};
use log::{debug, info, warn};
use std::env;
use tokio::io::BufReader;
use tokio::sync::mpsc::unbounded_channel;
use watchface_lib::{
    clock::SystemClock,
    config::Config,
    engine::{Insets, WatchFaceEngine},
    host::{self, HostEvent},
    preview::PreviewCanvas,
    sync::LinkDataLayer,
};

/// Downsampling for the ASCII preview: one character per 4×8 pixel block
const PREVIEW_CELL: (u32, u32) = (4, 8);

struct Args {
    development_mode: bool,
    config_path: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        development_mode: false,
        config_path: None,
    };
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--stdout" => args.development_mode = true,
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config_path = Some(path);
            }
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }
    Ok(args)
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let config = match &args.config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let bounds = Rectangle::new(
        Point::zero(),
        Size::new(config.display.width, config.display.height),
    );

    // The face runs on one thread, like the platform's dispatch loop
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let (tx, mut rx) = unbounded_channel();

        let mut engine =
            WatchFaceEngine::create(&config, LinkDataLayer::new(tx.clone()), SystemClock);

        // What the platform sends when the face is first shown
        tx.send(HostEvent::Insets(Insets {
            round: config.display.round,
        }))?;
        tx.send(HostEvent::Visibility(true))?;

        let link_tx = tx.clone();
        tokio::spawn(async move {
            let stdin = BufReader::new(tokio::io::stdin());
            if let Err(e) = host::read_link(stdin, link_tx.clone()).await {
                warn!("Companion link failed: {}", e);
                link_tx.send(HostEvent::Destroy).ok();
            }
        });

        let signal_tx = tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, shutting down");
                signal_tx.send(HostEvent::Destroy).ok();
            }
        });
        drop(tx);

        let mut canvas = PreviewCanvas::new(bounds.size);
        host::run(&mut engine, &mut rx, bounds, |frame| {
            frame.render(&mut canvas);
            if args.development_mode {
                println!("{}", canvas.to_ascii(PREVIEW_CELL.0, PREVIEW_CELL.1));
            } else {
                debug!("Rendered frame with {} commands", frame.commands.len());
            }
        })
        .await;

        anyhow::Ok(())
    })
}
