use crate::error;
use crate::interop::{arr_f32, arr_u32, arr_u8, new_obj, set_kv};
use crate::Tour;
use js_sys::Float32Array;
use panotour::model::{DeviceClass, Resolution, SessionConfig, TransitPhase};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Route the kernel's log facade to the browser console.
#[wasm_bindgen]
pub fn init_log() {
    let _ = console_log::init_with_level(log::Level::Debug);
}

fn resolution_from_code(code: u8) -> Option<Resolution> {
    match code {
        0 => Some(Resolution::Low),
        1 => Some(Resolution::High),
        _ => None,
    }
}

#[wasm_bindgen]
impl Tour {
    /// Build a tour from the node document and an optional group document
    /// (pass null/undefined to disable hierarchical mode).
    #[wasm_bindgen(constructor)]
    pub fn new(
        nodes_doc: JsValue,
        groups_doc: JsValue,
        mobile: bool,
        aspect: f32,
    ) -> Result<Tour, JsValue> {
        let nodes: serde_json::Value = serde_wasm_bindgen::from_value(nodes_doc)
            .map_err(|e| error::invalid_doc("nodes", e.to_string()))?;
        let groups: Option<serde_json::Value> =
            if groups_doc.is_null() || groups_doc.is_undefined() {
                None
            } else {
                Some(
                    serde_wasm_bindgen::from_value(groups_doc)
                        .map_err(|e| error::invalid_doc("groups", e.to_string()))?,
                )
            };
        let config = SessionConfig {
            device: if mobile { DeviceClass::Mobile } else { DeviceClass::Desktop },
            aspect,
            ..SessionConfig::default()
        };
        panotour::Tour::from_json(nodes, groups, config)
            .map(Tour::rs_new)
            .map_err(|e| error::invalid_config(e.to_string()))
    }

    // Clock
    pub fn tick(&mut self, dt_ms: f32) {
        self.inner.tick(dt_ms);
    }

    // Navigation state
    pub fn current_node(&self) -> u32 {
        self.inner.current_node()
    }
    pub fn current_group(&self) -> JsValue {
        match self.inner.current_group() {
            Some(g) => JsValue::from_f64(g as f64),
            None => JsValue::NULL,
        }
    }
    /// 0: Idle, 1: AwaitingResource, 2: Animating.
    pub fn phase(&self) -> u8 {
        match self.inner.phase() {
            TransitPhase::Idle => 0,
            TransitPhase::AwaitingResource => 1,
            TransitPhase::Animating => 2,
        }
    }
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }
    /// Full-resolution imagery installed for the current node (spinner
    /// fade-out rule).
    pub fn is_high_loaded(&self) -> bool {
        self.inner.load_state(self.inner.current_node()) == panotour::model::LoadState::HighLoaded
    }
    pub fn title(&self) -> String {
        self.inner.title().to_string()
    }

    // Node store
    pub fn is_valid_node(&self, id: u32) -> bool {
        self.inner.is_valid_node(id)
    }
    pub fn neighbors(&self, id: u32) -> js_sys::Uint32Array {
        arr_u32(self.inner.neighbors(id))
    }
    pub fn is_valid_move(&self, from: u32, to: u32) -> bool {
        self.inner.is_valid_move(from, to)
    }

    // Move requests
    pub fn jump_to(&mut self, id: u32) -> bool {
        self.inner.jump_to(id)
    }
    pub fn jump_to_res(&mut self, id: u32) -> JsValue {
        if !self.inner.is_valid_node(id) {
            return error::invalid_id("node", id);
        }
        if self.inner.phase() != TransitPhase::Idle {
            return error::busy();
        }
        error::ok(JsValue::from_bool(self.inner.jump_to(id)))
    }
    pub fn walk_to(&mut self, id: u32) -> bool {
        self.inner.walk_to(id)
    }
    pub fn walk_to_res(&mut self, id: u32) -> JsValue {
        if !self.inner.is_valid_node(id) {
            return error::invalid_id("node", id);
        }
        if self.inner.phase() != TransitPhase::Idle {
            return error::busy();
        }
        let from = self.inner.current_node();
        if !self.inner.is_valid_move(from, id) {
            return error::not_adjacent(from, id);
        }
        error::ok(JsValue::from_bool(self.inner.walk_to(id)))
    }
    pub fn walk(&mut self, heading_deg: f32) -> bool {
        self.inner.walk(heading_deg)
    }
    pub fn jump_to_group(&mut self, group: u32) -> bool {
        self.inner.jump_to_group(group)
    }
    pub fn jump_to_group_res(&mut self, group: u32) -> JsValue {
        if self.inner.phase() != TransitPhase::Idle {
            return error::busy();
        }
        let known = self
            .inner
            .group_system()
            .map_or(false, |gs| gs.is_valid_group(group));
        if !known {
            return error::invalid_id("group", group);
        }
        error::ok(JsValue::from_bool(self.inner.jump_to_group(group)))
    }

    // Pointer input
    pub fn select_at(&mut self, ndc_x: f32, ndc_y: f32) -> bool {
        self.inner.select_at(ndc_x, ndc_y)
    }
    pub fn hover_at(&mut self, ndc_x: f32, ndc_y: f32) -> JsValue {
        match self.inner.hover_at(ndc_x, ndc_y) {
            Some(n) => JsValue::from_f64(n as f64),
            None => JsValue::NULL,
        }
    }
    pub fn turn(&mut self, spin_x: f32, spin_y: f32) {
        self.inner.turn(spin_x, spin_y);
    }
    pub fn set_aspect(&mut self, aspect: f32) {
        self.inner.set_aspect(aspect);
    }

    // Render queries
    /// Camera pose as [px, py, pz, tx, ty, tz].
    pub fn camera(&self) -> Float32Array {
        let pose = self.inner.camera();
        arr_f32(&[
            pose.position.x,
            pose.position.y,
            pose.position.z,
            pose.target.x,
            pose.target.y,
            pose.target.z,
        ])
    }

    /// Node display set as { ids: Uint32Array, flags: Uint8Array,
    /// transforms: Float32Array } with nine floats per node:
    /// [cx, cy, cz, rx, ry, rz, radius, scale, opacity]. Flag bit 0 is
    /// visibility.
    pub fn node_displays(&self) -> JsValue {
        let displays = self.inner.displays();
        let mut ids = Vec::with_capacity(displays.len());
        let mut flags = Vec::with_capacity(displays.len());
        let mut transforms = Vec::with_capacity(displays.len() * 9);
        for d in &displays {
            ids.push(d.id);
            flags.push(d.visible as u8);
            transforms.extend_from_slice(&[
                d.position.x,
                d.position.y,
                d.position.z,
                d.rotation.x,
                d.rotation.y,
                d.rotation.z,
                d.radius,
                d.scale,
                d.opacity,
            ]);
        }
        let o = new_obj();
        set_kv(&o, "ids", &arr_u32(&ids).into());
        set_kv(&o, "flags", &arr_u8(&flags).into());
        set_kv(&o, "transforms", &arr_f32(&transforms).into());
        o.into()
    }

    /// Marker set as { nodes: Uint32Array, flags: Uint8Array, positions:
    /// Float32Array }. Flag bit 0 is visibility, bit 1 highlight.
    pub fn markers(&self) -> JsValue {
        let markers = self.inner.markers();
        let mut nodes = Vec::with_capacity(markers.len());
        let mut flags = Vec::with_capacity(markers.len());
        let mut positions = Vec::with_capacity(markers.len() * 3);
        for m in &markers {
            nodes.push(m.node);
            flags.push(m.visible as u8 | (m.highlighted as u8) << 1);
            positions.extend_from_slice(&[m.position.x, m.position.y, m.position.z]);
        }
        let o = new_obj();
        set_kv(&o, "nodes", &arr_u32(&nodes).into());
        set_kv(&o, "flags", &arr_u8(&flags).into());
        set_kv(&o, "positions", &arr_f32(&positions).into());
        o.into()
    }

    // Resource plumbing
    /// Pending imagery fetches as an array of
    /// { node, resolution, url, generation }.
    pub fn take_load_requests(&mut self) -> JsValue {
        let requests = self.inner.take_load_requests();
        serde_wasm_bindgen::to_value(&requests).unwrap_or(JsValue::NULL)
    }
    /// Resolution codes: 0 low, 1 high.
    pub fn complete_load(&mut self, node: u32, resolution: u8, generation: u64) -> bool {
        match resolution_from_code(resolution) {
            Some(res) => self.inner.complete_load(node, res, generation),
            None => false,
        }
    }
    pub fn complete_load_res(&mut self, node: u32, resolution: u8, generation: u64) -> JsValue {
        if !self.inner.is_valid_node(node) {
            return error::invalid_id("node", node);
        }
        let Some(res) = resolution_from_code(resolution) else {
            return error::invalid_resolution(resolution);
        };
        error::ok(JsValue::from_bool(self.inner.complete_load(node, res, generation)))
    }
    pub fn is_node_displayable(&self, id: u32) -> bool {
        self.inner.is_node_displayable(id)
    }

    // Group metadata
    pub fn group_view(&self) -> JsValue {
        match self.inner.group_view() {
            Some(v) => serde_wasm_bindgen::to_value(v).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }
    /// Edge-triggered: true once after each group crossing.
    pub fn take_group_changed(&mut self) -> bool {
        self.inner.take_group_changed()
    }
}
