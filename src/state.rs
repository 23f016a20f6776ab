use crate::geometry::{Point, Rect, Size};
use crate::graph::{Node, PortRole};
use crate::ids::{NodeId, PortId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Layout constants for nodes whose rendered size the host has not reported.
///
/// All values are logical (canvas) units except `port_hit_radius`, which is in
/// screen pixels so ports stay easy to grab when zoomed out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeMetrics {
    pub width: f32,
    /// Height of the title strip, which is also the drag handle
    pub header_height: f32,
    pub port_row_height: f32,
    pub body_padding: f32,
    pub port_hit_radius: f32,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            width: 180.0,
            header_height: 32.0,
            port_row_height: 24.0,
            body_padding: 8.0,
            port_hit_radius: 8.0,
        }
    }
}

impl NodeMetrics {
    /// Size of a node with the given port counts
    pub fn estimate_size(&self, inputs: usize, outputs: usize) -> Size {
        let rows = inputs.max(outputs) as f32;
        Size::new(
            self.width,
            self.header_height + rows * self.port_row_height + self.body_padding * 2.0,
        )
    }

    /// Port anchor relative to the node's top-left corner.
    ///
    /// Inputs sit on the left edge, outputs on the right edge, one row each.
    pub fn port_offset(&self, role: PortRole, index: usize, node_width: f32) -> Point {
        let y = self.header_height
            + self.body_padding
            + self.port_row_height * (index as f32 + 0.5);
        match role {
            PortRole::Input => Point::new(0.0, y),
            PortRole::Output => Point::new(node_width, y),
        }
    }
}

/// Spatial state of the scene that is not part of the graph model.
///
/// Holds sizes and port offsets reported by the host after rendering. Anything
/// not reported is derived from [`NodeMetrics`].
#[derive(Debug, Default, Clone)]
pub struct GeometryCache {
    sizes: HashMap<NodeId, Size>,
    port_offsets: HashMap<(NodeId, PortId), Point>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node's rendered logical size (independent of zoom)
    pub fn report_node_size(&mut self, node: NodeId, size: Size) {
        self.sizes.insert(node, size);
    }

    /// Record a port's rendered anchor relative to its node's top-left corner
    pub fn report_port_offset(&mut self, node: NodeId, port: PortId, offset: Point) {
        self.port_offsets.insert((node, port), offset);
    }

    pub fn has_reported_size(&self, node: &NodeId) -> bool {
        self.sizes.contains_key(node)
    }

    /// Drop everything known about a node
    pub fn forget_node(&mut self, node: &NodeId) {
        self.sizes.remove(node);
        self.port_offsets.retain(|(n, _), _| n != node);
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
        self.port_offsets.clear();
    }

    pub fn node_size(&self, node: &Node, metrics: &NodeMetrics) -> Size {
        self.sizes
            .get(&node.id)
            .copied()
            .unwrap_or_else(|| metrics.estimate_size(node.inputs.len(), node.outputs.len()))
    }

    /// Node rectangle in canvas coordinates
    pub fn node_rect(&self, node: &Node, metrics: &NodeMetrics) -> Rect {
        Rect::from_origin_size(node.position, self.node_size(node, metrics))
    }

    /// The draggable title strip of a node
    pub fn header_rect(&self, node: &Node, metrics: &NodeMetrics) -> Rect {
        let rect = self.node_rect(node, metrics);
        Rect::new(rect.x, rect.y, rect.width, metrics.header_height.min(rect.height))
    }

    /// Port anchor in canvas coordinates
    pub fn port_position(&self, node: &Node, port: &PortId, metrics: &NodeMetrics) -> Option<Point> {
        let (role, index) = node.port_slot(port)?;
        let offset = match self.port_offsets.get(&(node.id.clone(), port.clone())) {
            Some(reported) => *reported,
            None => metrics.port_offset(role, index, self.node_size(node, metrics).width),
        };
        Some(node.position + offset)
    }

    /// Every port anchor of a node, inputs first
    pub fn port_anchors<'a>(
        &'a self,
        node: &'a Node,
        metrics: &'a NodeMetrics,
    ) -> impl Iterator<Item = (PortRole, &'a PortId, Point)> + 'a {
        node.all_ports().filter_map(move |(role, port)| {
            self.port_position(node, &port.id, metrics)
                .map(|pos| (role, &port.id, pos))
        })
    }
}
