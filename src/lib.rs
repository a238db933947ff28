//! Stack Cloud - WASM Module
//!
//! Layout engine for the portfolio "technology stack cloud": a pinned root
//! node at the container center with stack nodes orbiting it, grouped into
//! angular sectors by domain. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen; the host owns rendering and the
//! frame loop.
//!
//! # Architecture
//!
//! - `graph`: Dataset records and the SoA node store
//! - `layout`: Viewport statistics, adaptive parameters, sectors and seeding
//! - `spatial`: Barnes-Hut quadtree and R-tree collision broad phase
//! - `forces`: The fixed, ordered force set
//! - `simulation`: Driver state machine, reheat scheduling, frame cadence

use std::collections::HashMap;

use js_sys::{Array, Float32Array, Function};
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod forces;
pub mod graph;
pub mod layout;
pub mod simulation;
pub mod spatial;

use config::PhysicsConstants;
use error::CloudError;
use graph::CloudDataset;
use simulation::{NodeFrame, Simulation, SimulationState};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn warn_stopped(operation: &str) {
    web_sys::console::warn_1(&JsValue::from_str(&format!(
        "stack cloud: {operation} called after stop; ignored"
    )));
}

/// Handle to one stack cloud simulation.
///
/// Wraps the internal [`Simulation`] and provides the public API exposed to
/// JavaScript.
#[wasm_bindgen]
pub struct StackCloudWasm {
    sim: Simulation,
    on_tick: Option<Function>,
}

#[wasm_bindgen]
impl StackCloudWasm {
    /// Create a simulation.
    ///
    /// # Arguments
    ///
    /// * `width`, `height` - Container size in px; a zero size defers seeding
    ///   until `updateDimensions`
    /// * `dataset` - `{ rootId?, domains?: [{domain, weight}], stacks: [{id,
    ///   domain, baseRadius, iconKey?, colorKey?}] }`
    /// * `reduced_motion` - Settle synchronously and emit only final positions
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: f32,
        height: f32,
        dataset: JsValue,
        reduced_motion: bool,
    ) -> Result<StackCloudWasm, JsError> {
        let dataset: CloudDataset =
            serde_wasm_bindgen::from_value(dataset).map_err(|e| CloudError::Decode(e.to_string()))?;
        let sim = Simulation::new(width, height, &dataset, reduced_motion, PhysicsConstants::default())?;
        Ok(Self { sim, on_tick: None })
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Register the paint callback, called as `callback(id, x, y, scale)`
    /// once per node for every emitted frame.
    #[wasm_bindgen(js_name = onTick)]
    pub fn on_tick(&mut self, callback: Function) {
        self.on_tick = Some(callback);
    }

    /// Advance the simulation from the host's frame callback.
    ///
    /// `now_ms` is the frame timestamp; calls closer than ~16 ms apart are
    /// discarded. Returns true while the simulation wants more frames.
    pub fn tick(&mut self, now_ms: f64) -> Result<bool, JsValue> {
        if self.sim.state() == SimulationState::Stopped {
            return Ok(false);
        }

        let callback = self.on_tick.as_ref();
        let mut failure: Option<JsValue> = None;
        self.sim.tick(now_ms, &mut |frame: NodeFrame<'_>| {
            if failure.is_some() {
                return;
            }
            let Some(callback) = callback else {
                return;
            };
            let args = Array::of4(
                &JsValue::from_str(frame.id),
                &JsValue::from_f64(frame.x as f64),
                &JsValue::from_f64(frame.y as f64),
                &JsValue::from_f64(frame.scale as f64),
            );
            if let Err(err) = callback.apply(&JsValue::NULL, &args) {
                failure = Some(err);
            }
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(self.sim.wants_frames()),
        }
    }

    // =========================================================================
    // Host events
    // =========================================================================

    /// Adopt a new container size. Returns false if the size was ignored.
    #[wasm_bindgen(js_name = updateDimensions)]
    pub fn update_dimensions(&mut self, width: f32, height: f32) -> bool {
        if self.sim.state() == SimulationState::Stopped {
            warn_stopped("updateDimensions");
            return false;
        }
        self.sim.update_dimensions(width, height)
    }

    /// Apply emphasis scale factors from a plain object or `Map` of
    /// `id → scale`. Returns how many nodes changed.
    #[wasm_bindgen(js_name = updateScaleFactors)]
    pub fn update_scale_factors(&mut self, scales: JsValue) -> Result<u32, JsError> {
        if self.sim.state() == SimulationState::Stopped {
            warn_stopped("updateScaleFactors");
            return Ok(0);
        }
        let scales: HashMap<String, f32> =
            serde_wasm_bindgen::from_value(scales).map_err(|e| CloudError::Decode(e.to_string()))?;
        let changed = self
            .sim
            .update_scale_factors(scales.iter().map(|(id, &scale)| (id.as_str(), scale)));
        Ok(changed as u32)
    }

    /// Restart at full energy without moving nodes first.
    pub fn reheat(&mut self) {
        if self.sim.state() == SimulationState::Stopped {
            warn_stopped("reheat");
            return;
        }
        self.sim.reheat();
    }

    /// Move every node back to its seed position and restart.
    pub fn reseed(&mut self) {
        if self.sim.state() == SimulationState::Stopped {
            warn_stopped("reseed");
            return;
        }
        self.sim.reseed();
    }

    /// Release all resources. No callbacks fire afterwards.
    pub fn stop(&mut self) {
        self.sim.stop();
        self.on_tick = None;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// `"uninitialized" | "running" | "settled" | "stopped"`.
    pub fn state(&self) -> String {
        self.sim.state().as_str().to_string()
    }

    #[wasm_bindgen(js_name = isSettled)]
    pub fn is_settled(&self) -> bool {
        self.sim.is_settled()
    }

    /// Number of nodes, root included.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.sim.nodes().len() as u32
    }

    /// Node ids in slot order; index 0 is the root.
    #[wasm_bindgen(js_name = getNodeIds)]
    pub fn get_node_ids(&self) -> Vec<String> {
        self.sim.nodes().keys().to_vec()
    }

    /// Domain sectors as `[{domain, startAngle, endAngle, midAngle}]`,
    /// radians clockwise from 12 o'clock.
    #[wasm_bindgen(js_name = getSectors)]
    pub fn get_sectors(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(self.sim.sectors().sectors())
            .map_err(|e| CloudError::Encode(e.to_string()).into())
    }

    #[wasm_bindgen(js_name = getIconKey)]
    pub fn get_icon_key(&self, id: &str) -> Option<String> {
        let nodes = self.sim.nodes();
        nodes.id_of(id).and_then(|n| nodes.icon_key(n)).map(str::to_string)
    }

    #[wasm_bindgen(js_name = getColorKey)]
    pub fn get_color_key(&self, id: &str) -> Option<String> {
        let nodes = self.sim.nodes();
        nodes.id_of(id).and_then(|n| nodes.color_key(n)).map(str::to_string)
    }

    /// Viewport-scaled radius of a node, before emphasis.
    #[wasm_bindgen(js_name = getNodeRadius)]
    pub fn get_node_radius(&self, id: &str) -> Option<f32> {
        let nodes = self.sim.nodes();
        nodes.id_of(id).and_then(|n| nodes.radius(n))
    }

    #[wasm_bindgen(js_name = rootRadius)]
    pub fn root_radius(&self) -> f32 {
        self.sim.root_radius()
    }

    // =========================================================================
    // Zero-Copy Position Access
    // =========================================================================

    /// Get a zero-copy view of X positions, in `getNodeIds` order.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately, do not store.
    #[wasm_bindgen(js_name = getPositionsXView)]
    pub fn get_positions_x_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.sim.nodes().positions_x()) }
    }

    /// Get a zero-copy view of Y positions, in `getNodeIds` order.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately, do not store.
    #[wasm_bindgen(js_name = getPositionsYView)]
    pub fn get_positions_y_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.sim.nodes().positions_y()) }
    }
}
