//! Per-frame scheduling: the engine never steps itself, the driver does.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use polychaos_core::{ChaosEngine, FrameSnapshot, RandomSource};
use polychaos_platform::{FrameSink, Result};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: usize,
    pub steps: usize,
    pub exhausted: bool,
    pub stopped: bool,
}

pub struct FrameDriver {
    steps_per_frame: usize,
    max_frames: Option<usize>,
    stop: Arc<AtomicBool>,
}

impl FrameDriver {
    pub fn new(steps_per_frame: usize) -> Self {
        Self {
            steps_per_frame: steps_per_frame.max(1),
            max_frames: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Setting the flag ends the run at the next frame boundary.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Callback that requests a stop, suitable for a signal handler.
    pub fn interrupt_handler(&self) -> impl Fn() + Send + 'static {
        let stop = self.stop_handle();
        move || {
            if !stop.swap(true, Ordering::Relaxed) {
                info!("driver: interrupt received, finishing current frame");
            }
        }
    }

    pub fn run<R: RandomSource>(
        &self,
        engine: &mut ChaosEngine<R>,
        sink: &mut dyn FrameSink,
    ) -> Result<RunStats> {
        let mut stats = RunStats::default();
        let mut snapshot = FrameSnapshot::default();
        loop {
            if self.stop.load(Ordering::Relaxed) {
                stats.stopped = true;
                info!("driver: stop requested after {} frames", stats.frames);
                break;
            }
            if self.max_frames.is_some_and(|max| stats.frames >= max) {
                debug!("driver: frame limit reached");
                break;
            }

            let mut stepped = 0;
            while stepped < self.steps_per_frame && engine.step().is_some() {
                stepped += 1;
            }
            stats.steps += stepped;

            engine.snapshot_into(&mut snapshot);
            sink.submit(&snapshot)?;
            stats.frames += 1;

            if !engine.is_running() {
                stats.exhausted = true;
                break;
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polychaos_core::GameConfig;

    #[derive(Default)]
    struct Collect {
        lens: Vec<usize>,
        stop_after: Option<(usize, Arc<AtomicBool>)>,
    }

    impl FrameSink for Collect {
        fn submit(&mut self, frame: &FrameSnapshot) -> Result<()> {
            self.lens.push(frame.len());
            if let Some((after, flag)) = &self.stop_after {
                if self.lens.len() == *after {
                    flag.store(true, Ordering::Relaxed);
                }
            }
            Ok(())
        }
    }

    fn engine(capacity: usize) -> ChaosEngine {
        let config = GameConfig::default().with_capacity(capacity).unwrap();
        ChaosEngine::seeded(config, 42)
    }

    #[test]
    fn runs_until_exhausted() {
        let mut engine = engine(25);
        let mut sink = Collect::default();
        let stats = FrameDriver::new(10).run(&mut engine, &mut sink).unwrap();
        assert_eq!(sink.lens, vec![10, 20, 25]);
        assert_eq!(
            stats,
            RunStats {
                frames: 3,
                steps: 25,
                exhausted: true,
                stopped: false
            }
        );
    }

    #[test]
    fn honours_frame_limit() {
        let mut engine = engine(100);
        let mut sink = Collect::default();
        let stats = FrameDriver::new(5)
            .with_max_frames(Some(2))
            .run(&mut engine, &mut sink)
            .unwrap();
        assert_eq!(stats.frames, 2);
        assert!(!stats.exhausted);
        assert!(engine.is_running());
    }

    #[test]
    fn stop_flag_ends_run_at_frame_boundary() {
        let driver = FrameDriver::new(3);
        let mut sink = Collect {
            stop_after: Some((4, driver.stop_handle())),
            ..Collect::default()
        };
        let mut engine = engine(1000);
        let stats = driver.run(&mut engine, &mut sink).unwrap();
        assert!(stats.stopped);
        assert_eq!(stats.frames, 4);
        assert_eq!(engine.len(), 12);
    }

    #[test]
    fn interrupt_before_run_renders_nothing() {
        let driver = FrameDriver::new(3);
        let interrupt = driver.interrupt_handler();
        interrupt();
        interrupt();
        let mut engine = engine(100);
        let mut sink = Collect::default();
        let stats = driver.run(&mut engine, &mut sink).unwrap();
        assert!(stats.stopped);
        assert_eq!(stats.frames, 0);
        assert!(sink.lens.is_empty());
        assert!(engine.is_empty());
    }

    #[test]
    fn interrupt_from_another_thread_stops_the_run() {
        let driver = FrameDriver::new(1);
        let interrupt = driver.interrupt_handler();
        std::thread::spawn(interrupt).join().unwrap();
        let mut engine = engine(100);
        let stats = driver.run(&mut engine, &mut Collect::default()).unwrap();
        assert!(stats.stopped);
        assert!(engine.is_running());
    }

    #[test]
    fn exhausted_engine_yields_one_frame() {
        let mut engine = engine(3);
        engine.updates().for_each(drop);
        let mut sink = Collect::default();
        let stats = FrameDriver::new(10).run(&mut engine, &mut sink).unwrap();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.steps, 0);
    }
}
