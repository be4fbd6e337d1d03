mod config;
mod driver;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io::{self, BufWriter};
use torus::FrameRenderer;

use crate::config::Config;
use crate::driver::{Animation, TerminalSink};

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the frames.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let torus = config
        .torus_config()
        .context("invalid torus configuration")?;

    info!(
        "Rendering {} frames on a {}x{} grid (k1={}, parallel={})",
        config.frames,
        torus.width(),
        torus.height(),
        torus.k1(),
        config.parallel
    );

    let animation = Animation::new(FrameRenderer::new(torus), config.schedule(), config.parallel);

    let stdout = io::stdout();
    let mut sink = TerminalSink::new(BufWriter::new(stdout.lock()), !config.no_clear);
    let stats = animation.run(&mut sink)?;

    info!(
        "Rendered {} frames in {:.2?} ({:.1} fps)",
        stats.frames,
        stats.elapsed,
        stats.fps()
    );

    Ok(())
}
