//! The simulation driver.
//!
//! Owns the node array, the force set and the energy (`alpha`) schedule, and
//! moves through `Uninitialized → Running ⇄ Settled → Stopped`. The driver
//! never schedules its own ticks: the host calls [`Simulation::tick`] from
//! its frame callback, and the driver throttles, steps and emits.
//!
//! Nothing here returns an error for numeric trouble. Degenerate viewports
//! are ignored, malformed nodes are skipped by every force, and non-finite
//! positions are re-seeded from their stored angle.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use super::frame::{FrameSink, FrameThrottle, NodeFrame};
use super::reheat::{ReheatPoll, ReheatScheduler};
use crate::config::PhysicsConstants;
use crate::error::Result;
use crate::forces::{ForceContext, ForceSet, PolishReport};
use crate::graph::{CloudDataset, NodeStore};
use crate::layout::seed::{direction, root_radius, scaled_radius, seed_distance};
use crate::layout::{
    PhysicsParams, Sector, SectorMap, SeedRequest, ViewportStats, adapt_params, allocate_sectors,
    compute_stats, seed_position,
};

/// Lifecycle of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// Waiting for a usable viewport.
    Uninitialized,
    Running,
    Settled,
    /// Torn down; terminal.
    Stopped,
}

impl SimulationState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Running => "running",
            Self::Settled => "settled",
            Self::Stopped => "stopped",
        }
    }
}

/// What a call to [`Simulation::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do in the current state.
    Idle,
    /// Too soon after the previous accepted tick.
    Throttled,
    /// Stepped and emitted an intermediate frame.
    Frame,
    /// Emitted the final frame of a settle.
    Settled,
}

/// Viewport-derived geometry shared by every force.
#[derive(Debug, Clone, Copy, Default)]
struct Geometry {
    width: f32,
    height: f32,
    root_radius: f32,
    avg_radius: f32,
}

fn force_context<'a>(
    params: &'a PhysicsParams,
    constants: &'a PhysicsConstants,
    geometry: Geometry,
    alpha: f32,
) -> ForceContext<'a> {
    ForceContext {
        params,
        constants,
        width: geometry.width,
        height: geometry.height,
        root_radius: geometry.root_radius,
        avg_radius: geometry.avg_radius,
        alpha,
    }
}

pub struct Simulation {
    constants: PhysicsConstants,
    nodes: NodeStore,
    forces: ForceSet,
    sectors: SectorMap,
    /// (position within its domain, domain size) per slot.
    ranks: Vec<(usize, usize)>,

    geometry: Geometry,
    stats: ViewportStats,
    params: PhysicsParams,

    alpha: f32,
    alpha_target: f32,
    state: SimulationState,
    reduced_motion: bool,

    reheat: ReheatScheduler,
    throttle: FrameThrottle,
    /// A settled frame not yet handed to the host.
    pending_frame: bool,
    ticks: u64,
}

impl Simulation {
    /// Build a simulation for `dataset` in a `width × height` container.
    ///
    /// A degenerate container leaves the simulation `Uninitialized` until
    /// [`update_dimensions`](Self::update_dimensions) gets a usable size.
    pub fn new(
        width: f32,
        height: f32,
        dataset: &CloudDataset,
        reduced_motion: bool,
        constants: PhysicsConstants,
    ) -> Result<Self> {
        let nodes = NodeStore::from_dataset(dataset)?;
        let sectors = allocate_sectors(&dataset.effective_domain_weights());
        let ranks = domain_ranks(&nodes);

        for i in 1..nodes.len() {
            let r = nodes.base_radius[i];
            if !r.is_finite() || r <= 0.0 {
                warn!(id = %nodes.keys()[i], radius = r, "stack node has an unusable radius; forces will skip it");
            }
        }

        let mut sim = Self {
            throttle: FrameThrottle::new(constants.frame_interval_ms),
            constants,
            nodes,
            forces: ForceSet::new(),
            sectors,
            ranks,
            geometry: Geometry::default(),
            stats: ViewportStats::default(),
            params: PhysicsParams::inert(),
            alpha: 1.0,
            alpha_target: 0.0,
            state: SimulationState::Uninitialized,
            reduced_motion,
            reheat: ReheatScheduler::new(),
            pending_frame: false,
            ticks: 0,
        };

        debug!(
            nodes = sim.nodes.len(),
            sectors = sim.sectors.len(),
            reduced_motion,
            "simulation created"
        );
        sim.update_dimensions(width, height);
        Ok(sim)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_settled(&self) -> bool {
        self.state == SimulationState::Settled
    }

    /// Whether the host should keep calling `tick`.
    pub fn wants_frames(&self) -> bool {
        self.state == SimulationState::Running || self.pending_frame
    }

    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    pub fn sectors(&self) -> &SectorMap {
        &self.sectors
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    pub fn stats(&self) -> &ViewportStats {
        &self.stats
    }

    pub fn constants(&self) -> &PhysicsConstants {
        &self.constants
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn width(&self) -> f32 {
        self.geometry.width
    }

    pub fn height(&self) -> f32 {
        self.geometry.height
    }

    /// Root radius for the current viewport.
    pub fn root_radius(&self) -> f32 {
        self.geometry.root_radius
    }

    /// Radius of the root's no-go zone.
    pub fn exclusion_radius(&self) -> f32 {
        self.geometry.root_radius * self.constants.exclusion_factor
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn reheat_pending(&self) -> bool {
        self.reheat.is_pending()
    }

    /// Steps taken since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // =========================================================================
    // Host operations
    // =========================================================================

    /// Advance one frame at host time `now_ms`, painting through `sink`.
    pub fn tick<S: FrameSink + ?Sized>(&mut self, now_ms: f64, sink: &mut S) -> TickOutcome {
        match self.state {
            SimulationState::Uninitialized | SimulationState::Stopped => return TickOutcome::Idle,
            SimulationState::Settled => {
                if !self.pending_frame {
                    return TickOutcome::Idle;
                }
                self.pending_frame = false;
                self.emit(sink);
                return TickOutcome::Settled;
            }
            SimulationState::Running => {}
        }

        if !self.throttle.accept(now_ms) {
            return TickOutcome::Throttled;
        }

        if let ReheatPoll::Released(token) = self.reheat.poll(now_ms) {
            self.alpha_target = 0.0;
            debug!(generation = token.generation(), alpha = self.alpha, "reheat released");
        }

        self.step();
        trace!(tick = self.ticks, alpha = self.alpha, "tick");

        if self.alpha < self.constants.alpha_min && self.alpha_target == 0.0 {
            self.settle();
            self.emit(sink);
            return TickOutcome::Settled;
        }

        self.emit(sink);
        TickOutcome::Frame
    }

    /// Adopt a new container size.
    ///
    /// Returns false when the size is degenerate, unchanged, or the
    /// simulation is stopped. Otherwise every node is inside the new bounds
    /// by the time this returns.
    pub fn update_dimensions(&mut self, width: f32, height: f32) -> bool {
        if self.state == SimulationState::Stopped {
            debug!("update_dimensions after stop ignored");
            return false;
        }
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            debug!(width, height, "ignoring degenerate viewport");
            return false;
        }
        if self.state != SimulationState::Uninitialized
            && width == self.geometry.width
            && height == self.geometry.height
        {
            return false;
        }

        let (old_width, old_height) = (self.geometry.width, self.geometry.height);
        self.geometry.width = width;
        self.geometry.height = height;
        self.derive_viewport();
        self.forces.invalidate_collision();

        if self.state == SimulationState::Uninitialized {
            debug!(width, height, "first viewport; seeding");
            self.seed_all();
            self.start(1.0);
        } else {
            debug!(width, height, old_width, old_height, "viewport resized");
            self.remap(old_width, old_height);
            self.contain();
            let duration = self.resize_reheat_ms();
            self.reheat_to(self.constants.resize_alpha_target, duration);
        }
        true
    }

    /// Apply emphasis scale factors by node id.
    ///
    /// Unknown ids, the root and unusable factors are ignored. Returns how
    /// many nodes changed; a change gently reheats the layout.
    pub fn update_scale_factors<'a, I>(&mut self, scales: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        if self.state == SimulationState::Stopped {
            debug!("update_scale_factors after stop ignored");
            return 0;
        }

        let mut changed = 0;
        for (key, scale) in scales {
            match self.nodes.id_of(key) {
                Some(id) if self.nodes.is_root(id.index()) => debug!(id = key, "root scale is fixed"),
                Some(id) => {
                    if self.nodes.set_scale(id, scale) {
                        changed += 1;
                    }
                }
                None => debug!(id = key, "ignoring scale for unknown node"),
            }
        }

        if changed > 0 {
            self.forces.invalidate_collision();
            if self.state != SimulationState::Uninitialized {
                self.reheat_to(self.constants.emphasis_alpha_target, self.constants.emphasis_reheat_ms);
            }
        }
        changed
    }

    /// Restart at full energy from the current positions.
    pub fn reheat(&mut self) {
        if matches!(self.state, SimulationState::Running | SimulationState::Settled) {
            debug!("full reheat");
            self.start(1.0);
        }
    }

    /// Move every stack node back to its seed position and restart.
    pub fn reseed(&mut self) {
        if !matches!(self.state, SimulationState::Running | SimulationState::Settled) {
            return;
        }
        debug!("reseeding");
        for i in 1..self.nodes.len() {
            self.place_from_hint(i);
        }
        self.forces.invalidate_collision();
        self.start(1.0);
    }

    /// Tear down. No further frames are emitted.
    pub fn stop(&mut self) {
        if self.state == SimulationState::Stopped {
            return;
        }
        if let Some(token) = self.reheat.cancel() {
            debug!(generation = token.generation(), "pending reheat cancelled");
        }
        self.nodes.clear();
        self.ranks.clear();
        self.forces = ForceSet::new();
        self.pending_frame = false;
        self.state = SimulationState::Stopped;
        debug!(ticks = self.ticks, "simulation stopped");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Re-derive radii, statistics, parameters and the root position.
    fn derive_viewport(&mut self) {
        let vmin = self.geometry.width.min(self.geometry.height);
        let root = root_radius(vmin, &self.constants);

        self.nodes.radius[0] = root;
        for i in 1..self.nodes.len() {
            self.nodes.radius[i] = scaled_radius(self.nodes.base_radius[i], vmin, &self.constants);
        }

        let stack_radii = self.nodes.radii().get(1..).unwrap_or(&[]);
        self.stats = compute_stats(self.geometry.width, self.geometry.height, stack_radii);
        self.params = adapt_params(&self.stats, &self.constants);
        self.geometry.root_radius = root;
        self.geometry.avg_radius = self.stats.avg_radius;
        self.pin_root();

        debug!(
            vmin,
            root_radius = root,
            charge = self.params.charge_strength,
            velocity_decay = self.params.velocity_decay,
            alpha_decay = self.params.alpha_decay,
            "physics parameters derived"
        );
    }

    fn pin_root(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.nodes.pos_x[0] = self.geometry.width / 2.0;
        self.nodes.pos_y[0] = self.geometry.height / 2.0;
        self.nodes.vel_x[0] = 0.0;
        self.nodes.vel_y[0] = 0.0;
    }

    fn sector_of(&self, i: usize) -> Option<&Sector> {
        self.nodes.domains[i].as_deref().and_then(|d| self.sectors.get(d))
    }

    fn seed_request<'s>(&self, sector: &'s Sector, i: usize) -> SeedRequest<'s> {
        let (index, count) = self.ranks[i];
        SeedRequest {
            sector,
            index,
            count,
            radius: self.nodes.radius[i],
            exclusion_radius: self.exclusion_radius(),
            boundary_padding: self.constants.boundary_padding,
            width: self.geometry.width,
            height: self.geometry.height,
        }
    }

    fn seed_all(&mut self) {
        for i in 1..self.nodes.len() {
            let point = self
                .sector_of(i)
                .map(|sector| seed_position(&self.seed_request(sector, i), &self.constants));

            match point {
                Some(point) => {
                    self.nodes.angle_hint[i] = point.angle;
                    self.nodes.pos_x[i] = point.x;
                    self.nodes.pos_y[i] = point.y;
                    self.nodes.vel_x[i] = 0.0;
                    self.nodes.vel_y[i] = 0.0;
                }
                None => self.place_from_hint(i),
            }
        }
        self.pin_root();
    }

    /// Seed position along the node's stored angle.
    fn hint_position(&self, i: usize) -> (f32, f32) {
        let hint = self.nodes.angle_hint[i];
        let angle = if hint.is_finite() { hint } else { 0.0 };

        let fallback = Sector {
            domain: String::new(),
            start_angle: angle,
            end_angle: angle,
            mid_angle: angle,
        };
        let sector = self.sector_of(i).unwrap_or(&fallback);
        let distance = seed_distance(&self.seed_request(sector, i), angle, &self.constants);
        let (dx, dy) = direction(angle);

        (
            self.geometry.width / 2.0 + distance * dx,
            self.geometry.height / 2.0 + distance * dy,
        )
    }

    fn place_from_hint(&mut self, i: usize) {
        let (x, y) = self.hint_position(i);
        self.nodes.pos_x[i] = x;
        self.nodes.pos_y[i] = y;
        self.nodes.vel_x[i] = 0.0;
        self.nodes.vel_y[i] = 0.0;
    }

    /// Begin a fresh run at `alpha`, dropping any pending reheat.
    fn start(&mut self, alpha: f32) {
        self.reheat.cancel();
        self.alpha = alpha;
        self.alpha_target = 0.0;

        if self.nodes.stack_count() == 0 {
            self.hold_root();
        } else if self.reduced_motion {
            self.run_synchronously();
        } else {
            self.pending_frame = false;
            self.state = SimulationState::Running;
        }
    }

    /// Raise `alpha_target` for `duration_ms`, superseding any live reheat.
    fn reheat_to(&mut self, target: f32, duration_ms: f64) {
        if self.nodes.stack_count() == 0 {
            self.hold_root();
            return;
        }
        if self.reduced_motion {
            self.reheat.cancel();
            self.alpha = self.alpha.max(target);
            self.alpha_target = 0.0;
            self.run_synchronously();
            return;
        }

        let token = self.reheat.schedule(duration_ms);
        self.alpha_target = target;
        self.pending_frame = false;
        self.state = SimulationState::Running;
        debug!(generation = token.generation(), target, duration_ms, "reheat scheduled");
    }

    /// With no stack nodes there is nothing to simulate; the root is
    /// emitted once on the next tick.
    fn hold_root(&mut self) {
        self.pin_root();
        self.state = SimulationState::Settled;
        self.pending_frame = true;
        debug!("no stack nodes; holding root");
    }

    /// How long a resize keeps `alpha_target` raised: one easing time
    /// constant (`1 / alpha_decay` ticks) at the frame cadence.
    fn resize_reheat_ms(&self) -> f64 {
        let decay = self.params.alpha_decay.max(1e-6) as f64;
        (self.constants.frame_interval_ms / decay)
            .clamp(self.constants.min_reheat_ms, self.constants.max_reheat_ms)
    }

    fn run_synchronously(&mut self) {
        for _ in 0..self.constants.reduced_motion_ticks {
            self.step();
        }
        self.settle();
        self.pending_frame = true;
    }

    fn step(&mut self) {
        self.ticks += 1;
        self.repair();

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        self.integrate();

        let ctx = force_context(&self.params, &self.constants, self.geometry, self.alpha);
        self.forces.apply(&mut self.nodes, &ctx);
        self.pin_root();
    }

    /// Damp velocities, cap the step length and move.
    fn integrate(&mut self) {
        let keep = (1.0 - self.params.velocity_decay).clamp(0.0, 1.0);
        let max_step = self.constants.max_step_fraction * self.stats.vmin;
        let nodes = &mut self.nodes;

        for i in 0..nodes.len() {
            if !nodes.is_active(i) {
                continue;
            }
            let mut vx = nodes.vel_x[i] * keep;
            let mut vy = nodes.vel_y[i] * keep;
            let speed = (vx * vx + vy * vy).sqrt();
            if speed > max_step && speed > 0.0 {
                let k = max_step / speed;
                vx *= k;
                vy *= k;
            }
            nodes.vel_x[i] = vx;
            nodes.vel_y[i] = vy;
            nodes.pos_x[i] += vx;
            nodes.pos_y[i] += vy;
        }
    }

    /// Re-seed nodes whose position went non-finite; zero broken velocities.
    fn repair(&mut self) {
        for i in 1..self.nodes.len() {
            if !(self.nodes.pos_x[i].is_finite() && self.nodes.pos_y[i].is_finite()) {
                warn!(id = %self.nodes.keys()[i], "non-finite position; re-seeding from its angle");
                self.place_from_hint(i);
            } else if !(self.nodes.vel_x[i].is_finite() && self.nodes.vel_y[i].is_finite()) {
                warn!(id = %self.nodes.keys()[i], "non-finite velocity; zeroing");
                self.nodes.vel_x[i] = 0.0;
                self.nodes.vel_y[i] = 0.0;
            }
        }
    }

    /// Scale positions about the center to follow a resize.
    fn remap(&mut self, old_width: f32, old_height: f32) {
        if old_width <= 0.0 || old_height <= 0.0 {
            return;
        }
        let sx = self.geometry.width / old_width;
        let sy = self.geometry.height / old_height;
        let (ocx, ocy) = (old_width / 2.0, old_height / 2.0);
        let (ncx, ncy) = (self.geometry.width / 2.0, self.geometry.height / 2.0);

        for i in 1..self.nodes.len() {
            self.nodes.pos_x[i] = ncx + (self.nodes.pos_x[i] - ocx) * sx;
            self.nodes.pos_y[i] = ncy + (self.nodes.pos_y[i] - ocy) * sy;
        }
    }

    /// Push nodes out of the root zone, then clamp them into bounds.
    fn contain(&mut self) {
        let ctx = force_context(&self.params, &self.constants, self.geometry, self.alpha);
        self.forces.root_exclusion.apply(&mut self.nodes, &ctx, 1.0);
        self.forces.boundary.apply(&mut self.nodes, &ctx);
    }

    fn polish(&mut self) -> PolishReport {
        let ctx = force_context(&self.params, &self.constants, self.geometry, self.alpha);
        self.forces.polish(&mut self.nodes, &ctx)
    }

    fn settle(&mut self) {
        let report = self.polish();
        self.nodes.halt();
        self.pin_root();
        self.alpha = 0.0;
        self.alpha_target = 0.0;
        self.state = SimulationState::Settled;

        if report.residual > self.constants.polish_tolerance {
            warn!(
                residual = report.residual,
                passes = report.passes,
                "layout settled with unresolved constraints"
            );
        }
        debug!(ticks = self.ticks, passes = report.passes, "simulation settled");
    }

    fn emit<S: FrameSink + ?Sized>(&self, sink: &mut S) {
        for i in 0..self.nodes.len() {
            let (x, y) = (self.nodes.pos_x[i], self.nodes.pos_y[i]);
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            sink.node(NodeFrame {
                index: i,
                id: &self.nodes.keys()[i],
                x,
                y,
                scale: self.nodes.scale[i],
            });
        }
        sink.end_frame();
    }
}

/// Position of each stack node within its domain, and the domain's size.
fn domain_ranks(nodes: &NodeStore) -> Vec<(usize, usize)> {
    let mut sizes: HashMap<&str, usize> = HashMap::new();
    for i in 1..nodes.len() {
        if let Some(domain) = nodes.domains[i].as_deref() {
            *sizes.entry(domain).or_default() += 1;
        }
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut ranks = vec![(0, 1); nodes.len()];
    for (i, rank) in ranks.iter_mut().enumerate().skip(1) {
        if let Some(domain) = nodes.domains[i].as_deref() {
            let next = seen.entry(domain).or_default();
            *rank = (*next, sizes.get(domain).copied().unwrap_or(1));
            *next += 1;
        }
    }
    ranks
}
