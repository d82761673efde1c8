use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3 { x, y, z }
    }

    pub fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }

    pub fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, o: Vec3) -> f32 {
        self.sub(o).length()
    }
}

/// Rotation in radians, applied in XYZ order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    #[default]
    Desktop,
    Mobile,
}

/// Resolution tag carried by load requests and completions. On `Mobile` the
/// high-resolution request substitutes the mid-resolution asset when one is
/// declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Low,
    High,
}

/// Imagery residency of one node. Only ever advances Unloaded -> LowLoaded
/// -> HighLoaded, and resets fully to Unloaded on release.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    #[default]
    Unloaded,
    LowLoaded,
    HighLoaded,
}

/// A single spherical panorama and its viewing position. Identity is
/// immutable after ingestion; residency state lives in the residency
/// manager, group ownership in the group system.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: u32,
    pub location: String,
    pub url_high: String,
    pub url_mid: Option<String>,
    pub url_low: String,
    pub center: Vec3,
    pub rotation: Euler,
    pub radius: f32,
}

/// A hierarchical collection of nodes and sub-groups. `start_node` is `None`
/// for purely organizational groups, which defer to `start_group` instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub id: u32,
    pub parent: u32,
    pub children: Vec<u32>,
    pub members: Vec<u32>,
    pub start_group: u32,
    pub start_node: Option<u32>,
    pub start_orientation: f32,
    pub title: String,
    pub description: String,
    pub tags: Vec<(String, String)>,
}

/// One entry of the navigable group list (tab strip).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: u32,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub title: String,
    pub description: String,
    pub tags: Vec<(String, String)>,
}

impl GroupSummary {
    /// Tags flattened to "key: value" lines in declaration order.
    pub fn tags_concat(&self) -> String {
        let mut out = String::new();
        for (k, v) in &self.tags {
            out.push_str(k);
            out.push_str(": ");
            out.push_str(v);
            out.push('\n');
        }
        out
    }
}

/// Metadata view published whenever the owning group of the current node
/// changes. `primary` summarizes the root group, `secondary` the current one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub primary: GroupSummary,
    pub secondary: GroupSummary,
    pub current_group: u32,
    pub nav_refs: Vec<GroupRef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

/// Per-node render view for one tick. `scale` and `opacity` deviate from
/// 1.0 only for the endpoints of a transit in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplay {
    pub id: u32,
    pub visible: bool,
    pub position: Vec3,
    pub rotation: Euler,
    pub radius: f32,
    pub scale: f32,
    pub opacity: f32,
}

/// Marker billboard for one node, placed below the node center by the
/// tripod height. Visible markers are exactly the navigable destinations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDisplay {
    pub node: u32,
    pub position: Vec3,
    pub visible: bool,
    pub highlighted: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitPhase {
    #[default]
    Idle,
    AwaitingResource,
    Animating,
}

/// Imagery fetch order handed to the host. The host answers with
/// `complete_load`, echoing the generation so completions that lost a race
/// with a release can be discarded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadRequest {
    pub node: u32,
    pub resolution: Resolution,
    pub url: String,
    pub generation: u64,
}

/// Per-session context passed at construction, replacing ambient globals.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub device: DeviceClass,
    pub fov: f32,
    pub aspect: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            device: DeviceClass::Desktop,
            fov: crate::geometry::tolerance::DEFAULT_FOV_DEG,
            aspect: 16.0 / 9.0,
        }
    }
}

/// One node as delivered by the data-ingestion boundary: the node itself
/// plus its declared outgoing connections (order preserved, symmetry not
/// assumed).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeSource {
    pub node: Node,
    pub connections: Vec<u32>,
}

/// The full record set handed over by the ingestion boundary at startup.
/// `groups` is `None` when hierarchical mode is disabled for the session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TourSource {
    pub title: String,
    pub model_url: Option<String>,
    pub start_node: u32,
    pub start_orientation: f32,
    pub tripod_height: f32,
    pub nodes: Vec<NodeSource>,
    pub groups: Option<Vec<Group>>,
}
