use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Per-frame hook. The frame loop calls this once per frame on every
/// registered entity, in registration order, on the calling thread.
pub trait Update {
    fn update(&mut self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FrameTiming {
    pub delta_seconds: f32,
    pub fps: f32,
}

pub struct FixedTimestep {
    frame_duration: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn from_fps(fps: u32) -> Self {
        let frame_duration = 1.0 / fps.max(1) as f32;
        Self {
            frame_duration,
            accumulator: 0.0,
        }
    }

    pub fn accumulate(&mut self, delta: f32) {
        self.accumulator += delta;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.frame_duration {
            self.accumulator -= self.frame_duration;
            true
        } else {
            false
        }
    }
}

/// Headless cooperative driver. Owns the registered entities and steps each
/// of them exactly once per frame; nothing blocks or spawns inside a frame.
pub struct FrameLoop {
    updatables: Vec<Rc<RefCell<dyn Update>>>,
    timestep: FixedTimestep,
    frame_count: u64,
}

impl FrameLoop {
    pub fn new(target_fps: u32) -> Self {
        Self {
            updatables: Vec::new(),
            timestep: FixedTimestep::from_fps(target_fps),
            frame_count: 0,
        }
    }

    pub fn register(&mut self, entity: Rc<RefCell<dyn Update>>) {
        self.updatables.push(entity);
    }

    pub fn registered(&self) -> usize {
        self.updatables.len()
    }

    /// Runs exactly one frame.
    pub fn frame(&mut self) {
        self.frame_count += 1;
        for entity in &self.updatables {
            entity.borrow_mut().update();
        }
        tracing::trace!(
            target: "engine",
            frame = self.frame_count,
            entities = self.updatables.len(),
            "frame tick"
        );
    }

    /// Paces real frames at the target rate until `done` reports true.
    pub fn run_until(&mut self, mut done: impl FnMut() -> bool) {
        let mut last_frame = Instant::now();
        while !done() {
            let now = Instant::now();
            let delta = now.duration_since(last_frame).as_secs_f32();
            last_frame = now;

            let timing = FrameTiming {
                delta_seconds: delta,
                fps: if delta > 0.0 { 1.0 / delta } else { 0.0 },
            };
            tracing::trace!(
                target: "engine",
                delta_ms = timing.delta_seconds * 1000.0,
                fps = timing.fps,
                "pacing"
            );

            self.timestep.accumulate(delta);
            while self.timestep.should_step() {
                self.frame();
                if done() {
                    return;
                }
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}
