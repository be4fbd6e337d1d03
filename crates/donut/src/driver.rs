use anyhow::{Context, Result};
use log::{debug, trace};
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};
use torus::{Frame, FrameRenderer, Orientation};

/// Cursor home, then clear to the end of the screen.
pub const CLEAR_SEQUENCE: &str = "\x1b[H\x1b[J";

/// Which angles to render and when to stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    pub frames: u64,
    pub start: Orientation,
    pub a_step: f64,
    pub b_step: f64,
    pub delay: Duration,
    /// Wall-clock limit checked before each frame.
    pub budget: Option<Duration>,
}

impl Schedule {
    #[inline]
    pub fn orientation(&self, index: u64) -> Orientation {
        Orientation::new(
            self.start.a + self.a_step * index as f64,
            self.start.b + self.b_step * index as f64,
        )
    }
}

/// Writes frames to a text stream, optionally redrawing in place.
pub struct TerminalSink<W: Write> {
    out: W,
    clear: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, clear: bool) -> Self {
        Self { out, clear }
    }

    pub fn present(&mut self, frame: &Frame) -> io::Result<()> {
        if self.clear {
            self.out.write_all(CLEAR_SEQUENCE.as_bytes())?;
        }

        write!(self.out, "{frame}")?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    pub frames: u64,
    pub elapsed: Duration,
}

impl RunStats {
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

pub struct Animation {
    renderer: FrameRenderer,
    schedule: Schedule,
    parallel: bool,
}

impl Animation {
    pub fn new(renderer: FrameRenderer, schedule: Schedule, parallel: bool) -> Self {
        Self {
            renderer,
            schedule,
            parallel,
        }
    }

    pub fn run<W: Write>(&self, sink: &mut TerminalSink<W>) -> Result<RunStats> {
        let started = Instant::now();
        let mut frames = 0u64;

        for index in 0..self.schedule.frames {
            if let Some(budget) = self.schedule.budget {
                if started.elapsed() >= budget {
                    debug!("Time budget {:?} reached after {} frames", budget, frames);
                    break;
                }
            }

            let orientation = self.schedule.orientation(index);
            let frame = if self.parallel {
                self.renderer.render_par(orientation)
            } else {
                self.renderer.render(orientation)
            };

            sink.present(&frame)
                .with_context(|| format!("failed to write frame {index}"))?;
            frames += 1;
            trace!("Frame {} presented ({} cells)", index, frame.filled_cells());

            if !self.schedule.delay.is_zero() {
                thread::sleep(self.schedule.delay);
            }
        }

        Ok(RunStats {
            frames,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(frames: u64) -> Schedule {
        Schedule {
            frames,
            start: Orientation::new(0.0, 1.0),
            a_step: 0.05,
            b_step: 0.0,
            delay: Duration::ZERO,
            budget: None,
        }
    }

    #[test]
    fn orientation_advances_linearly() {
        let schedule = Schedule {
            b_step: 0.5,
            ..schedule(10)
        };
        assert_eq!(schedule.orientation(0), Orientation::new(0.0, 1.0));
        let fourth = schedule.orientation(4);
        assert!((fourth.a - 0.2).abs() < 1e-12);
        assert!((fourth.b - 3.0).abs() < 1e-12);
    }

    #[test]
    fn sink_clears_then_prints_rows() {
        let renderer = FrameRenderer::default();
        let frame = renderer.render(Orientation::new(0.0, 1.0));

        let mut sink = TerminalSink::new(Vec::new(), true);
        sink.present(&frame).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();

        let body = text.strip_prefix(CLEAR_SEQUENCE).expect("clear sequence first");
        assert_eq!(body, frame.to_string());
        assert_eq!(body.lines().count(), 30);
        assert!(body.lines().all(|row| row.chars().count() == 60));
    }

    #[test]
    fn sink_without_clear_prints_only_rows() {
        let frame = FrameRenderer::default().render(Orientation::default());
        let mut sink = TerminalSink::new(Vec::new(), false);
        sink.present(&frame).unwrap();
        assert_eq!(sink.into_inner(), frame.to_string().into_bytes());
    }

    #[test]
    fn run_renders_every_scheduled_frame() {
        let animation = Animation::new(FrameRenderer::default(), schedule(3), false);
        let mut sink = TerminalSink::new(Vec::new(), true);

        let stats = animation.run(&mut sink).unwrap();
        assert_eq!(stats.frames, 3);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.matches(CLEAR_SEQUENCE).count(), 3);
        assert_eq!(text.lines().count(), 90);
    }

    #[test]
    fn parallel_run_prints_the_same_frames() {
        let sequential = Animation::new(FrameRenderer::default(), schedule(2), false);
        let parallel = Animation::new(FrameRenderer::default(), schedule(2), true);

        let mut a = TerminalSink::new(Vec::new(), true);
        let mut b = TerminalSink::new(Vec::new(), true);
        sequential.run(&mut a).unwrap();
        parallel.run(&mut b).unwrap();

        assert_eq!(a.into_inner(), b.into_inner());
    }

    #[test]
    fn exhausted_budget_stops_before_rendering() {
        let schedule = Schedule {
            budget: Some(Duration::ZERO),
            ..schedule(5)
        };
        let animation = Animation::new(FrameRenderer::default(), schedule, false);
        let mut sink = TerminalSink::new(Vec::new(), true);

        let stats = animation.run(&mut sink).unwrap();
        assert_eq!(stats.frames, 0);
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn write_failures_are_reported() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let animation = Animation::new(FrameRenderer::default(), schedule(1), false);
        let err = animation
            .run(&mut TerminalSink::new(Broken, true))
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to write frame 0"));
    }
}
