pub mod model;
pub mod groups;
pub mod residency;
pub mod view;
pub mod transit;
pub mod geometry {
    pub mod limits;
    pub mod math;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod heading;
    pub mod picking;
}
mod json;

use geometry::tolerance::POLL_INTERVAL_MS;
use groups::GroupSystem;
use log::{debug, warn};
use model::{
    CameraPose, GroupView, LoadRequest, LoadState, MarkerDisplay, Node, NodeDisplay, Resolution,
    SessionConfig, TourSource, TransitPhase, Vec3,
};
use residency::Residency;
use thiserror::Error;
use transit::{Transit, TransitStep};
use view::View;

/// Fatal configuration errors surfaced at load time. Runtime request errors
/// are never fatal; invalid requests are silently dropped.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("start-group chain from group {group} does not terminate")]
    StartGroupCycle { group: u32 },
    #[error("group {group} referenced by {referenced_by} is not defined")]
    UnknownGroup { group: u32, referenced_by: &'static str },
    #[error("node {node} referenced by {referenced_by} is not defined")]
    UnknownNode { node: u32, referenced_by: &'static str },
    #[error("node {node} is missing required {what} imagery")]
    MissingImagery { node: u32, what: &'static str },
    #[error("node id {node} is declared more than once")]
    DuplicateNode { node: u32 },
    #[error("group id {group} is declared more than once")]
    DuplicateGroup { group: u32 },
    #[error("document exceeds ingestion caps: {what}")]
    CapsExceeded { what: &'static str },
    #[error("{what} out of bounds on node {node}")]
    OutOfBounds { what: &'static str, node: u32 },
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Callback invoked whenever the owning group of the current node changes.
/// At most one is registered; re-registering replaces it.
pub type GroupChangeFn = Box<dyn FnMut(&GroupView)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MoveKind {
    Jump,
    Walk,
}

#[derive(Clone, Copy, Debug)]
struct PendingMove {
    target: u32,
    kind: MoveKind,
    poll_elapsed: f32,
}

/// The navigation engine for one session: node store, group hierarchy,
/// imagery residency, camera view, and the jump/walk state machine. All
/// mutation funnels through the request methods and `tick`; the host drives
/// the clock and answers load requests.
pub struct Tour {
    // node store: id is index, the id space may be sparse
    nodes: Vec<Option<Node>>,
    connections: Vec<Vec<u32>>,
    // subsystems
    groups: Option<GroupSystem>,
    residency: Residency,
    view: View,
    // navigation state; this struct is the only writer
    phase: TransitPhase,
    current: u32,
    current_group: Option<u32>,
    pending: Option<PendingMove>,
    transit: Option<Transit>,
    marker_nodes: Vec<u32>,
    highlighted: Option<u32>,
    // group metadata publication
    group_change_fn: Option<GroupChangeFn>,
    group_view: Option<GroupView>,
    group_dirty: bool,
    // session
    title: String,
    model_url: Option<String>,
    tripod_height: f32,
    start_node: u32,
    start_orientation: f32,
}

impl core::fmt::Debug for Tour {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tour")
            .field("nodes", &self.nodes)
            .field("connections", &self.connections)
            .field("groups", &self.groups)
            .field("residency", &self.residency)
            .field("view", &self.view)
            .field("phase", &self.phase)
            .field("current", &self.current)
            .field("current_group", &self.current_group)
            .field("pending", &self.pending)
            .field("transit", &self.transit)
            .field("marker_nodes", &self.marker_nodes)
            .field("highlighted", &self.highlighted)
            .field(
                "group_change_fn",
                &self.group_change_fn.as_ref().map(|_| "<fn>"),
            )
            .field("group_view", &self.group_view)
            .field("group_dirty", &self.group_dirty)
            .field("title", &self.title)
            .field("model_url", &self.model_url)
            .field("tripod_height", &self.tripod_height)
            .field("start_node", &self.start_node)
            .field("start_orientation", &self.start_orientation)
            .finish()
    }
}

impl Tour {
    /// Build a tour from the ingestion-boundary record set. Configuration
    /// errors (dangling references, duplicate ids, cyclic start-group
    /// chains) abort construction with a diagnostic naming the offender.
    pub fn new(src: TourSource, config: SessionConfig) -> Result<Tour, ConfigError> {
        let max_id = src.nodes.iter().map(|n| n.node.id).max().unwrap_or(0);
        let capacity = max_id as usize + 1;
        let mut nodes: Vec<Option<Node>> = vec![None; capacity];
        let mut connections: Vec<Vec<u32>> = vec![Vec::new(); capacity];

        for rec in src.nodes {
            let id = rec.node.id;
            if !(rec.node.radius > 0.0) {
                return Err(ConfigError::OutOfBounds { what: "radius", node: id });
            }
            let slot = &mut nodes[id as usize];
            if slot.is_some() {
                return Err(ConfigError::DuplicateNode { node: id });
            }
            *slot = Some(rec.node);
            connections[id as usize] = rec.connections;
        }

        // edges naming undefined nodes are dead; drop them, keep the order
        // of the survivors
        for i in 0..connections.len() {
            connections[i].retain(|&n| {
                let alive = nodes.get(n as usize).map_or(false, |s| s.is_some());
                if !alive {
                    warn!("dropping dead edge {} -> {}", i, n);
                }
                alive
            });
        }

        let group_sys = match src.groups {
            Some(records) => Some(GroupSystem::build(records, capacity, |n| {
                nodes.get(n as usize).map_or(false, |s| s.is_some())
            })?),
            None => None,
        };

        // start position: the resolved start group in hierarchical mode,
        // the node document otherwise
        let (start_node, start_orientation, start_group) = match &group_sys {
            Some(gs) => {
                let gid = gs.resolve_start_group(gs.root())?;
                let g = gs.get(gid).expect("resolved group exists");
                let node = g.start_node.ok_or(ConfigError::UnknownNode {
                    node: gid,
                    referenced_by: "start_node",
                })?;
                (node, g.start_orientation, Some(gid))
            }
            None => (src.start_node, src.start_orientation, None),
        };
        if nodes.get(start_node as usize).map_or(true, |s| s.is_none()) {
            return Err(ConfigError::UnknownNode {
                node: start_node,
                referenced_by: "start_node",
            });
        }

        let mut view = View::new(config.fov, config.aspect);
        view.set_orientation(0.0, start_orientation);

        let mut tour = Tour {
            nodes,
            connections,
            groups: group_sys,
            residency: Residency::new(capacity, config.device),
            view,
            phase: TransitPhase::Idle,
            current: start_node,
            current_group: start_group,
            pending: None,
            transit: None,
            marker_nodes: Vec::new(),
            highlighted: None,
            group_change_fn: None,
            group_view: None,
            group_dirty: false,
            title: src.title,
            model_url: src.model_url,
            tripod_height: src.tripod_height,
            start_node,
            start_orientation,
        };
        tour.enter_start_node();
        Ok(tour)
    }

    /// Build a tour from JSON documents; see the ingestion module for the
    /// accepted shape. An absent or undecodable group document disables
    /// hierarchical mode for the session.
    pub fn from_json(
        nodes_doc: serde_json::Value,
        groups_doc: Option<serde_json::Value>,
        config: SessionConfig,
    ) -> Result<Tour, ConfigError> {
        Tour::new(json::parse_tour(nodes_doc, groups_doc)?, config)
    }

    pub fn from_json_str(
        nodes_doc: &str,
        groups_doc: Option<&str>,
        config: SessionConfig,
    ) -> Result<Tour, ConfigError> {
        let nodes: serde_json::Value = serde_json::from_str(nodes_doc)?;
        let groups = match groups_doc {
            Some(s) => Some(serde_json::from_str(s)?),
            None => None,
        };
        Tour::from_json(nodes, groups, config)
    }

    fn enter_start_node(&mut self) {
        let start = self.start_node;
        if let Some(node) = self.nodes[start as usize].clone() {
            self.residency.request_load(&node);
            self.view.set_position(node.center);
        }
        for n in self.neighbors(start).to_vec() {
            if let Some(node) = self.nodes[n as usize].clone() {
                self.residency.request_load(&node);
            }
        }
        self.residency.set_visible(start, true);
        self.update_markers(start);
        self.refresh_group_view();
    }

    // ---- node store ----

    pub fn is_valid_node(&self, id: u32) -> bool {
        self.nodes.get(id as usize).map_or(false, |s| s.is_some())
    }

    pub fn node(&self, id: u32) -> Option<&Node> {
        self.nodes.get(id as usize).and_then(|s| s.as_ref())
    }

    pub fn node_count(&self) -> u32 {
        self.nodes.iter().filter(|s| s.is_some()).count() as u32
    }

    /// Declared outgoing edges of a node; empty for an invalid id. Symmetry
    /// is not guaranteed, an edge may be one-directional.
    pub fn neighbors(&self, id: u32) -> &[u32] {
        if !self.is_valid_node(id) {
            return &[];
        }
        self.connections
            .get(id as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_valid_move(&self, from: u32, to: u32) -> bool {
        self.is_valid_node(to) && self.neighbors(from).contains(&to)
    }

    // ---- navigation state ----

    pub fn current_node(&self) -> u32 {
        self.current
    }

    pub fn current_group(&self) -> Option<u32> {
        self.current_group
    }

    pub fn phase(&self) -> TransitPhase {
        self.phase
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn model_url(&self) -> Option<&str> {
        self.model_url.as_deref()
    }

    pub fn tripod_height(&self) -> f32 {
        self.tripod_height
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn group_system(&self) -> Option<&GroupSystem> {
        self.groups.as_ref()
    }

    /// Busy while a transition is in flight or the current node's low-res
    /// imagery is not yet ready; drives the host's loading indicator.
    pub fn is_loading(&self) -> bool {
        self.phase != TransitPhase::Idle || !self.residency.is_displayable(self.current)
    }

    // ---- move requests ----

    /// Relocate to an arbitrary valid node without animation. Adjacency is
    /// deliberately not checked; keyboard quick-select and group navigation
    /// depend on jumping across the graph. Rejected unless idle.
    pub fn jump_to(&mut self, target: u32) -> bool {
        if self.phase != TransitPhase::Idle {
            warn!("jump to {} dropped: transition in flight", target);
            return false;
        }
        if !self.is_valid_node(target) {
            return false;
        }
        self.begin_move(target, MoveKind::Jump);
        true
    }

    /// Walk to an adjacent node with the transit animation. Requires a
    /// declared edge from the current node; self-moves are rejected.
    pub fn walk_to(&mut self, target: u32) -> bool {
        if self.phase != TransitPhase::Idle {
            warn!("walk to {} dropped: transition in flight", target);
            return false;
        }
        if target == self.current || !self.is_valid_move(self.current, target) {
            return false;
        }
        // marker set switches to the destination before the animation runs
        self.update_markers(target);
        self.begin_move(target, MoveKind::Walk);
        true
    }

    /// Directional walk: resolve the heading against the neighbors and walk
    /// if one lies within tolerance. Silently does nothing otherwise.
    pub fn walk(&mut self, heading_deg: f32) -> bool {
        if self.phase != TransitPhase::Idle {
            return false;
        }
        match algorithms::heading::resolve_heading(self, heading_deg) {
            Some(n) => self.walk_to(n),
            None => false,
        }
    }

    /// Jump to the start node of a group, entering through its resolved
    /// start group and adopting that group's start orientation.
    pub fn jump_to_group(&mut self, group: u32) -> bool {
        if self.phase != TransitPhase::Idle {
            return false;
        }
        let Some(gs) = &self.groups else { return false };
        let Ok(gid) = gs.resolve_start_group(group) else {
            return false;
        };
        let Some(g) = gs.get(gid) else { return false };
        let Some(node) = g.start_node else { return false };
        let orientation = g.start_orientation;
        self.view.set_orientation(0.0, orientation);
        self.jump_to(node)
    }

    /// Marker selection at a screen point (normalized device coordinates).
    /// A hit walks to the marker's node; a miss is reinterpreted as a
    /// directional walk toward the clicked screen direction.
    pub fn select_at(&mut self, ndc_x: f32, ndc_y: f32) -> bool {
        if self.phase != TransitPhase::Idle {
            return false;
        }
        let origin = self.view.position();
        let dir = self.view.unproject(ndc_x, ndc_y);
        match algorithms::picking::pick_marker(self, origin, dir) {
            Some(hit) => self.walk_to(hit),
            None => {
                let heading = self.view.walk_direction_from_screen(ndc_x);
                self.walk(heading)
            }
        }
    }

    /// Marker hover query; updates the highlighted marker and returns it.
    pub fn hover_at(&mut self, ndc_x: f32, ndc_y: f32) -> Option<u32> {
        if self.phase != TransitPhase::Idle {
            return None;
        }
        let origin = self.view.position();
        let dir = self.view.unproject(ndc_x, ndc_y);
        let hit = algorithms::picking::pick_marker(self, origin, dir);
        self.highlighted = hit;
        hit
    }

    /// Spin the camera by normalized drag deltas; held off mid-transition.
    pub fn turn(&mut self, spin_x: f32, spin_y: f32) {
        if self.phase != TransitPhase::Idle {
            return;
        }
        self.view.turn(spin_x, spin_y);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.view.set_aspect(aspect);
    }

    // ---- clock ----

    /// Advance the engine by one tick. Drives the bounded-interval resource
    /// wait while a move is pending and the transit animation while one is
    /// running.
    pub fn tick(&mut self, dt_ms: f32) {
        match self.phase {
            TransitPhase::Idle => {}
            TransitPhase::AwaitingResource => {
                let Some(p) = self.pending.as_mut() else {
                    self.phase = TransitPhase::Idle;
                    return;
                };
                p.poll_elapsed += dt_ms.max(0.0);
                if p.poll_elapsed >= POLL_INTERVAL_MS {
                    p.poll_elapsed -= POLL_INTERVAL_MS;
                    self.try_advance_pending();
                }
            }
            TransitPhase::Animating => {
                let Some(t) = self.transit.as_mut() else {
                    self.phase = TransitPhase::Idle;
                    return;
                };
                match t.advance(dt_ms) {
                    TransitStep::Running { camera, .. } => {
                        self.view.set_position(camera);
                    }
                    TransitStep::Done => {
                        let target = t.to;
                        self.transit = None;
                        self.finalize_move(target);
                    }
                }
            }
        }
    }

    // ---- internals ----

    fn begin_move(&mut self, target: u32, kind: MoveKind) {
        if let Some(node) = self.nodes[target as usize].clone() {
            self.residency.request_load(&node);
        }
        self.phase = TransitPhase::AwaitingResource;
        self.pending = Some(PendingMove {
            target,
            kind,
            poll_elapsed: 0.0,
        });
        // the wait checks its condition once up front, before any interval
        self.try_advance_pending();
    }

    fn try_advance_pending(&mut self) {
        let Some(p) = &self.pending else { return };
        if !self.residency.is_displayable(p.target) {
            return;
        }
        let p = self.pending.take().expect("pending move");
        match p.kind {
            MoveKind::Jump => self.finalize_move(p.target),
            MoveKind::Walk => self.start_transit(p.target),
        }
    }

    fn start_transit(&mut self, target: u32) {
        let (Some(from), Some(to)) = (self.node(self.current).cloned(), self.node(target).cloned())
        else {
            self.phase = TransitPhase::Idle;
            return;
        };
        debug!("transit {} -> {}", self.current, target);
        self.transit = Some(Transit::new(
            from.id,
            from.center,
            from.radius,
            to.id,
            to.center,
            to.radius,
        ));
        // destination fades in from zero over the source
        self.residency.set_visible(target, true);
        self.phase = TransitPhase::Animating;
    }

    /// Shared bookkeeping for a completed jump or walk: residency keep-set,
    /// current node/group, visibility swap, camera relocation, markers.
    fn finalize_move(&mut self, target: u32) {
        let previous = self.current;

        // keep the destination, its neighborhood, and the node we came from
        // (one extra step, so the just-finished transition cannot flicker)
        let mut keep: Vec<u32> = self.neighbors(target).to_vec();
        keep.push(previous);
        keep.push(target);
        self.residency.retain_exactly(&keep);

        self.current = target;
        for n in self.neighbors(target).to_vec() {
            if let Some(node) = self.nodes[n as usize].clone() {
                self.residency.request_load(&node);
            }
        }

        if let Some(gs) = &self.groups {
            let owner = gs.group_of_node(target);
            if owner != self.current_group {
                debug!("group crossing: {:?} -> {:?}", self.current_group, owner);
                self.current_group = owner;
                self.refresh_group_view();
            }
        }

        self.residency.set_visible(target, true);
        if previous != target {
            self.residency.set_visible(previous, false);
        }
        if let Some(node) = self.node(target) {
            let center = node.center;
            self.view.set_position(center);
        }
        self.update_markers(target);
        self.highlighted = None;
        self.phase = TransitPhase::Idle;
    }

    fn update_markers(&mut self, node: u32) {
        self.marker_nodes = self.neighbors(node).to_vec();
    }

    fn refresh_group_view(&mut self) {
        let view = match (&self.groups, self.current_group) {
            (Some(gs), Some(gid)) => gs.view(gid),
            _ => None,
        };
        if let Some(view) = view {
            if let Some(cb) = self.group_change_fn.as_mut() {
                cb(&view);
            }
            self.group_view = Some(view);
            self.group_dirty = true;
        }
    }

    // ---- group metadata boundary ----

    /// Register the group-change callback; replaces any previous one and
    /// immediately delivers the current view when hierarchical mode is on.
    pub fn on_group_change(&mut self, f: GroupChangeFn) {
        self.group_change_fn = Some(f);
        if let Some(view) = self.group_view.clone() {
            if let Some(cb) = self.group_change_fn.as_mut() {
                cb(&view);
            }
        }
    }

    pub fn group_view(&self) -> Option<&GroupView> {
        self.group_view.as_ref()
    }

    /// Edge-triggered change flag for polling hosts; cleared on read.
    pub fn take_group_changed(&mut self) -> bool {
        std::mem::take(&mut self.group_dirty)
    }

    // ---- resource boundary ----

    /// Drain the pending imagery fetch orders for the host loader.
    pub fn take_load_requests(&mut self) -> Vec<LoadRequest> {
        self.residency.take_requests()
    }

    /// Report a finished fetch back to the engine. Stale completions (the
    /// node was released while the fetch was in flight) are discarded.
    pub fn complete_load(&mut self, id: u32, resolution: Resolution, generation: u64) -> bool {
        let Some(node) = self.nodes.get(id as usize).and_then(|s| s.as_ref()) else {
            return false;
        };
        self.residency.complete_load(node, resolution, generation)
    }

    pub fn is_node_displayable(&self, id: u32) -> bool {
        self.residency.is_displayable(id)
    }

    pub fn is_node_resident(&self, id: u32) -> bool {
        self.residency.is_resident(id)
    }

    pub fn load_state(&self, id: u32) -> LoadState {
        self.residency.load_state(id)
    }

    // ---- render boundary ----

    pub fn camera(&self) -> CameraPose {
        self.view.pose()
    }

    /// Per-node render view for this tick; scale and opacity deviate from
    /// 1.0 only for the endpoints of a running transit.
    pub fn displays(&self) -> Vec<NodeDisplay> {
        let mut out = Vec::new();
        for slot in self.nodes.iter().flatten() {
            let id = slot.id;
            let mut scale = 1.0;
            let mut opacity = 1.0;
            if let Some(t) = &self.transit {
                if id == t.from {
                    scale = t.from_scale();
                }
                if id == t.to {
                    scale = t.to_scale();
                    opacity = t.opacity();
                }
            }
            out.push(NodeDisplay {
                id,
                visible: self.residency.is_visible(id),
                position: slot.center,
                rotation: slot.rotation,
                radius: slot.radius,
                scale,
                opacity,
            });
        }
        out
    }

    /// Marker billboards; visible markers are exactly the currently
    /// navigable destinations.
    pub fn markers(&self) -> Vec<MarkerDisplay> {
        self.nodes
            .iter()
            .flatten()
            .map(|n| MarkerDisplay {
                node: n.id,
                position: self.marker_point(n),
                visible: self.marker_nodes.contains(&n.id),
                highlighted: self.highlighted == Some(n.id),
            })
            .collect()
    }

    /// Node ids whose markers are currently visible.
    pub fn visible_markers(&self) -> &[u32] {
        &self.marker_nodes
    }

    pub fn marker_position(&self, id: u32) -> Option<Vec3> {
        self.node(id).map(|n| self.marker_point(n))
    }

    fn marker_point(&self, node: &Node) -> Vec3 {
        Vec3::new(
            node.center.x,
            node.center.y,
            node.center.z - self.tripod_height,
        )
    }

    pub fn highlighted_marker(&self) -> Option<u32> {
        self.highlighted
    }
}
