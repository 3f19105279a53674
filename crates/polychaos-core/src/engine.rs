use std::iter::FusedIterator;

use bytemuck::{Pod, Zeroable};
use glam::DVec2;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::polygon::polygon_vertices;
use crate::random::{self, RandomSource};
use crate::selection::{SelectionRule, VertexSelector};

// Upper bound on the history buffer reserved up front; larger capacities grow on demand.
const MAX_PREALLOCATED_POINTS: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    Exhausted,
}

/// Result of a single successful step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepUpdate {
    /// Insertion index of the new point in the history.
    pub index: usize,
    /// Vertex the walker jumped toward.
    pub vertex: usize,
    pub point: DVec2,
    pub tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgedPoint {
    pub position: DVec2,
    pub age: u64,
}

/// Per-point record in the layout a GPU instance buffer expects.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 2],
    pub age: u32,
}

/// Owned copy of everything a renderer needs for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub radius: f64,
    pub exhausted: bool,
    pub vertices: Vec<[f32; 2]>,
    pub instances: Vec<PointInstance>,
}

impl FrameSnapshot {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Raw instance bytes, ready for upload.
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

/// Chaos-game walker over a regular polygon with a bounded, aged point history.
///
/// Ages are derived from the tick each point was recorded at, so stepping does
/// not have to touch older points.
pub struct ChaosEngine<R: RandomSource = StdRng> {
    config: GameConfig,
    vertices: Vec<DVec2>,
    current: DVec2,
    positions: Vec<DVec2>,
    births: Vec<u64>,
    tick: u64,
    state: EngineState,
    selector: Box<dyn VertexSelector>,
    rng: R,
}

impl ChaosEngine<StdRng> {
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::new(config, random::seeded(seed))
    }

    pub fn from_entropy(config: GameConfig) -> Self {
        Self::new(config, random::from_entropy())
    }
}

impl<R: RandomSource> ChaosEngine<R> {
    pub fn new(config: GameConfig, mut rng: R) -> Self {
        let vertices = polygon_vertices(config.vertex_count(), config.radius());
        let current = seed_position(config.radius(), &mut rng);
        let reserve = config.capacity().min(MAX_PREALLOCATED_POINTS);
        info!("chaos engine created: {config}");
        Self {
            config,
            vertices,
            current,
            positions: Vec::with_capacity(reserve),
            births: Vec::with_capacity(reserve),
            tick: 0,
            state: EngineState::Running,
            selector: config.selection().selector(),
            rng,
        }
    }

    /// Replaces the vertex selection policy. Kept across resets that keep the same rule.
    pub fn with_selector(mut self, selector: Box<dyn VertexSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    pub fn current(&self) -> DVec2 {
        self.current
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    pub fn remaining(&self) -> usize {
        self.capacity().saturating_sub(self.len())
    }

    /// Advances the walker by one jump and records the new point.
    ///
    /// Returns `None` once the history is full; the engine then stays
    /// exhausted until [`reset`](Self::reset).
    pub fn step(&mut self) -> Option<StepUpdate> {
        if self.state == EngineState::Exhausted {
            return None;
        }
        let vertex_count = self.vertices.len();
        let vertex = self.selector.select(vertex_count, &mut self.rng);
        debug_assert!(vertex < vertex_count, "selector returned {vertex} of {vertex_count}");
        let target = self.vertices[vertex % vertex_count];

        // (current + target) / ratio, not a lerp toward the target.
        self.current = (self.current + target) / self.config.jump_ratio();

        self.tick += 1;
        let index = self.positions.len();
        self.positions.push(self.current);
        self.births.push(self.tick);

        if self.positions.len() >= self.config.capacity() {
            self.state = EngineState::Exhausted;
            debug!(points = self.positions.len(), tick = self.tick, "history full, engine exhausted");
        }

        Some(StepUpdate {
            index,
            vertex,
            point: self.current,
            tick: self.tick,
        })
    }

    /// Lazy stream of step updates, ending when the engine is exhausted.
    pub fn updates(&mut self) -> Updates<'_, R> {
        Updates { engine: self }
    }

    /// Clears the history and starts over from `config`, keeping the allocated buffers.
    pub fn reset(&mut self, config: GameConfig) {
        if config.selection() == self.config.selection() {
            self.selector.reset();
        } else {
            self.selector = config.selection().selector();
        }
        self.vertices = polygon_vertices(config.vertex_count(), config.radius());
        self.current = seed_position(config.radius(), &mut self.rng);
        self.positions.clear();
        self.births.clear();
        self.tick = 0;
        self.state = EngineState::Running;
        self.config = config;
        info!("chaos engine reset: {config}");
    }

    pub fn age_of(&self, index: usize) -> Option<u64> {
        self.births.get(index).map(|birth| self.tick - birth)
    }

    /// Recorded points in insertion order with their current ages.
    pub fn points(&self) -> impl ExactSizeIterator<Item = AgedPoint> + '_ {
        let tick = self.tick;
        self.positions
            .iter()
            .zip(&self.births)
            .map(move |(position, birth)| AgedPoint {
                position: *position,
                age: tick - birth,
            })
    }

    /// Refills `out` with one instance per recorded point.
    pub fn write_instances(&self, out: &mut Vec<PointInstance>) {
        out.clear();
        out.extend(self.points().map(|point| PointInstance {
            position: point.position.as_vec2().to_array(),
            age: u32::try_from(point.age).unwrap_or(u32::MAX),
        }));
    }

    /// Copies the current state into `snapshot`, reusing its buffers.
    pub fn snapshot_into(&self, snapshot: &mut FrameSnapshot) {
        snapshot.tick = self.tick;
        snapshot.radius = self.config.radius();
        snapshot.exhausted = self.state == EngineState::Exhausted;
        snapshot.vertices.clear();
        snapshot
            .vertices
            .extend(self.vertices.iter().map(|v| v.as_vec2().to_array()));
        self.write_instances(&mut snapshot.instances);
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let mut snapshot = FrameSnapshot::default();
        self.snapshot_into(&mut snapshot);
        snapshot
    }

    pub fn selection(&self) -> SelectionRule {
        self.config.selection()
    }
}

fn seed_position(radius: f64, rng: &mut dyn RandomSource) -> DVec2 {
    let x = (rng.next_unit() * 2.0 - 1.0) * radius;
    let y = (rng.next_unit() * 2.0 - 1.0) * radius;
    DVec2::new(x, y)
}

/// Iterator returned by [`ChaosEngine::updates`].
pub struct Updates<'a, R: RandomSource> {
    engine: &'a mut ChaosEngine<R>,
}

impl<R: RandomSource> Iterator for Updates<'_, R> {
    type Item = StepUpdate;

    fn next(&mut self) -> Option<Self::Item> {
        self.engine.step()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.engine.is_running() {
            self.engine.remaining()
        } else {
            0
        };
        (remaining, Some(remaining))
    }
}

impl<R: RandomSource> ExactSizeIterator for Updates<'_, R> {}

impl<R: RandomSource> FusedIterator for Updates<'_, R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameSettings;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Replays a fixed script of draws.
    struct Scripted {
        units: Vec<f64>,
        indices: Vec<usize>,
        cursor: usize,
    }

    impl RandomSource for Scripted {
        fn next_unit(&mut self) -> f64 {
            let value = self.units[self.cursor % self.units.len()];
            self.cursor += 1;
            value
        }

        fn next_index(&mut self, bound: usize) -> usize {
            let value = self.indices[self.cursor % self.indices.len()] % bound;
            self.cursor += 1;
            value
        }
    }

    fn config(vertices: i64, ratio: f64, capacity: usize) -> GameConfig {
        GameSettings {
            vertices,
            jump_ratio: ratio,
            capacity,
            ..GameSettings::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn update_divides_sum_by_ratio() {
        let rng = Scripted {
            units: vec![0.75, 0.25],
            indices: vec![0],
            cursor: 0,
        };
        let mut engine = ChaosEngine::new(config(4, 3.0, 10), rng);
        // seed = ((0.75*2-1), (0.25*2-1)) = (0.5, -0.5)
        assert_relative_eq!(engine.current().x, 0.5);
        assert_relative_eq!(engine.current().y, -0.5);

        let update = engine.step().unwrap();
        assert_eq!(update.vertex, 0);
        // vertex 0 = (1, 0): ((0.5 + 1) / 3, (-0.5 + 0) / 3)
        assert_relative_eq!(update.point.x, 0.5);
        assert_relative_eq!(update.point.y, -0.5 / 3.0);
    }

    #[test]
    fn ages_follow_insertion_order() {
        let mut engine = ChaosEngine::seeded(config(3, 2.0, 100), 9);
        engine.step();
        assert_eq!(engine.age_of(0), Some(0));
        engine.step();
        engine.step();
        let ages: Vec<u64> = engine.points().map(|p| p.age).collect();
        assert_eq!(ages, vec![2, 1, 0]);
        assert_eq!(engine.age_of(3), None);
    }

    #[test]
    fn exhausts_at_capacity() {
        let mut engine = ChaosEngine::seeded(config(5, 2.0, 4), 1);
        let updates: Vec<_> = engine.updates().collect();
        assert_eq!(updates.len(), 4);
        assert_eq!(engine.state(), EngineState::Exhausted);
        assert!(engine.step().is_none());
        assert_eq!(engine.len(), 4);
        assert_eq!(engine.tick(), 4);
    }

    #[test]
    fn updates_reports_exact_size() {
        let mut engine = ChaosEngine::seeded(config(3, 2.0, 10), 2);
        engine.step();
        assert_eq!(engine.updates().len(), 9);
    }

    #[test]
    fn reset_keeps_buffers_and_restarts() {
        let mut engine = ChaosEngine::seeded(config(3, 2.0, 8), 4);
        engine.updates().for_each(drop);
        let reserved = engine.positions.capacity();
        engine.reset(config(6, 4.0, 8).with_selection(SelectionRule::NoRepeat));
        assert!(engine.is_running());
        assert!(engine.is_empty());
        assert_eq!(engine.tick(), 0);
        assert_eq!(engine.vertices().len(), 6);
        assert_eq!(engine.selection(), SelectionRule::NoRepeat);
        assert!(engine.positions.capacity() >= reserved);
    }

    #[derive(Debug)]
    struct AlwaysVertexOne {
        resets: Arc<AtomicUsize>,
    }

    impl VertexSelector for AlwaysVertexOne {
        fn select(&mut self, _vertex_count: usize, _rng: &mut dyn RandomSource) -> usize {
            1
        }

        fn reset(&mut self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn custom_selector_survives_same_rule_reset() {
        let resets = Arc::new(AtomicUsize::new(0));
        let mut engine = ChaosEngine::seeded(config(4, 2.0, 10), 3).with_selector(Box::new(
            AlwaysVertexOne {
                resets: Arc::clone(&resets),
            },
        ));
        for _ in 0..5 {
            assert_eq!(engine.step().unwrap().vertex, 1);
        }

        engine.reset(config(5, 3.0, 10));
        assert_eq!(resets.load(Ordering::SeqCst), 1);
        assert!(engine.updates().all(|update| update.vertex == 1));

        engine.reset(config(5, 3.0, 10).with_selection(SelectionRule::NoRepeat));
        assert_eq!(resets.load(Ordering::SeqCst), 1);
        let picks: Vec<usize> = engine.updates().map(|update| update.vertex).collect();
        assert_eq!(picks.len(), 10);
        assert!(picks.windows(2).all(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn snapshot_matches_points() {
        let mut engine = ChaosEngine::seeded(config(4, 2.0, 16), 12);
        for _ in 0..5 {
            engine.step();
        }
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.vertices.len(), 4);
        assert_eq!(snapshot.tick, 5);
        assert!(!snapshot.exhausted);
        assert_eq!(snapshot.instances[0].age, 4);
        assert_eq!(snapshot.instances[4].age, 0);
        assert_eq!(
            snapshot.instance_bytes().len(),
            5 * std::mem::size_of::<PointInstance>()
        );
        let last = engine.points().last().unwrap();
        assert_relative_eq!(snapshot.instances[4].position[0], last.position.x as f32);
    }
}
