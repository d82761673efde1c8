use crate::geometry::limits;
use crate::geometry::math::deg_to_rad;
use crate::geometry::tolerance::{DEFAULT_RADIUS, DEFAULT_TRIPOD_HEIGHT};
use crate::model::{Euler, Group, Node, NodeSource, TourSource, Vec3};
use crate::ConfigError;
use log::warn;
use serde::Deserialize;
use serde_json::Value;

/// Parse the node document (and optionally the group document) into the
/// record set the engine is built from. Structural failure of the group
/// document disables hierarchical mode rather than failing the session;
/// everything else that is wrong is a fatal configuration error.
pub fn parse_tour(nodes_doc: Value, groups_doc: Option<Value>) -> Result<TourSource, ConfigError> {
    let mut src = parse_nodes(nodes_doc)?;
    src.groups = match groups_doc {
        Some(doc) => match parse_groups(doc) {
            Ok(groups) => Some(groups),
            Err(ConfigError::Parse(e)) => {
                warn!("group document rejected ({}); hierarchical mode disabled", e);
                None
            }
            Err(e) => return Err(e),
        },
        None => None,
    };
    Ok(src)
}

fn parse_nodes(doc: Value) -> Result<TourSource, ConfigError> {
    #[derive(Deserialize)]
    struct Vec3De {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default)]
        z: f32,
    }
    #[derive(Deserialize)]
    struct RotationDe {
        // degrees in the document
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default)]
        z: f32,
    }
    #[derive(Deserialize)]
    struct NodeDe {
        id: u32,
        #[serde(default)]
        location: String,
        image: Option<String>,
        image_mid: Option<String>,
        image_low: Option<String>,
        center: Option<Vec3De>,
        radius: Option<f32>,
        rotation: Option<RotationDe>,
        #[serde(default)]
        connections: Vec<u32>,
    }
    #[derive(Deserialize)]
    struct DocDe {
        #[serde(default)]
        title: String,
        model_url: Option<String>,
        start_node: Option<u32>,
        start_orientation: Option<f32>,
        tripod_height: Option<f32>,
        nodes: Vec<NodeDe>,
    }

    let doc: DocDe = serde_json::from_value(doc)?;
    if doc.nodes.len() > limits::MAX_NODES {
        return Err(ConfigError::CapsExceeded { what: "nodes" });
    }

    let mut nodes = Vec::with_capacity(doc.nodes.len());
    for n in doc.nodes {
        if n.connections.len() > limits::MAX_EDGES_PER_NODE {
            return Err(ConfigError::CapsExceeded { what: "connections" });
        }
        let url_high = n
            .image
            .ok_or(ConfigError::MissingImagery { node: n.id, what: "high-res" })?;
        let url_low = n
            .image_low
            .ok_or(ConfigError::MissingImagery { node: n.id, what: "low-res" })?;
        let center = n.center.map_or(Vec3::default(), |c| Vec3::new(c.x, c.y, c.z));
        if !limits::in_coord_bounds(center.x)
            || !limits::in_coord_bounds(center.y)
            || !limits::in_coord_bounds(center.z)
        {
            return Err(ConfigError::OutOfBounds { what: "center", node: n.id });
        }
        let radius = n.radius.unwrap_or(DEFAULT_RADIUS);
        if !limits::in_radius_bounds(radius) {
            return Err(ConfigError::OutOfBounds { what: "radius", node: n.id });
        }
        let rotation = n.rotation.map_or(Euler::default(), |r| Euler {
            x: deg_to_rad(r.x),
            y: deg_to_rad(r.y),
            z: deg_to_rad(r.z),
        });
        nodes.push(NodeSource {
            node: Node {
                id: n.id,
                location: n.location,
                url_high,
                url_mid: n.image_mid,
                url_low,
                center,
                rotation,
                radius,
            },
            connections: n.connections,
        });
    }

    Ok(TourSource {
        title: doc.title,
        model_url: doc.model_url,
        start_node: doc.start_node.unwrap_or(0),
        start_orientation: doc.start_orientation.unwrap_or(0.0),
        tripod_height: doc.tripod_height.unwrap_or(DEFAULT_TRIPOD_HEIGHT),
        nodes,
        groups: None,
    })
}

fn parse_groups(doc: Value) -> Result<Vec<Group>, ConfigError> {
    #[derive(Deserialize)]
    struct GroupDe {
        id: u32,
        #[serde(default)]
        parent: u32,
        #[serde(default)]
        children: Vec<u32>,
        #[serde(default)]
        members: Vec<u32>,
        #[serde(default)]
        start_group: u32,
        // -1 marks a purely organizational group with no direct start node
        start_node: Option<i64>,
        #[serde(default)]
        start_orientation: f32,
        #[serde(default)]
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        tags: Vec<(String, String)>,
    }
    #[derive(Deserialize)]
    struct DocDe {
        groups: Vec<GroupDe>,
    }

    let doc: DocDe = serde_json::from_value(doc)?;
    if doc.groups.len() > limits::MAX_GROUPS {
        return Err(ConfigError::CapsExceeded { what: "groups" });
    }

    let mut groups = Vec::with_capacity(doc.groups.len());
    for g in doc.groups {
        if g.tags.len() > limits::MAX_TAGS_PER_GROUP {
            return Err(ConfigError::CapsExceeded { what: "tags" });
        }
        let start_node = match g.start_node.unwrap_or(0) {
            -1 => None,
            v if v >= 0 && v <= u32::MAX as i64 => Some(v as u32),
            _ => {
                return Err(ConfigError::UnknownNode {
                    node: 0,
                    referenced_by: "start_node",
                })
            }
        };
        groups.push(Group {
            id: g.id,
            parent: g.parent,
            children: g.children,
            members: g.members,
            start_group: g.start_group,
            start_node,
            start_orientation: g.start_orientation,
            title: g.title,
            description: g.description,
            tags: g.tags,
        });
    }
    Ok(groups)
}
