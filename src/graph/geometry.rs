//! Display geometry. Nothing here reaches the text format.

use serde::Serialize;

pub const NODE_WIDTH: f32 = 160.0;
pub const MIN_NODE_HEIGHT: f32 = 80.0;

/// Offset of the first port below the node's top edge (under the title).
pub const PORT_TOP: f32 = 30.0;
pub const PORT_SPACING: f32 = 20.0;
pub const PORT_BOTTOM: f32 = 20.0;

pub const GRID_LEFT: f32 = 80.0;
pub const GRID_TOP: f32 = 80.0;
pub const GRID_COLUMN: f32 = 240.0;
pub const GRID_ROW: f32 = 160.0;

/// Where nodes created through the mutation API land.
pub const DEFAULT_POSITION: Position = Position { x: 250.0, y: 400.0 };

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn for_ports(inputs: usize, outputs: usize) -> Self {
        Self {
            width: NODE_WIDTH,
            height: node_height(inputs, outputs),
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::for_ports(0, 0)
    }
}

/// Minimum height, or enough room for the taller port column.
pub fn node_height(inputs: usize, outputs: usize) -> f32 {
    let ports = inputs.max(outputs);
    if ports == 0 {
        return MIN_NODE_HEIGHT;
    }
    let needed = PORT_TOP + (ports - 1) as f32 * PORT_SPACING + PORT_BOTTOM;
    needed.max(MIN_NODE_HEIGHT)
}

/// Grid slot for a node: column by kind, row by index.
pub fn grid_position(column: usize, row: usize) -> Position {
    Position {
        x: GRID_LEFT + column as f32 * GRID_COLUMN,
        y: GRID_TOP + row as f32 * GRID_ROW,
    }
}

/// Anchor of the `index`-th port on one side of a node.
pub fn port_anchor(
    node_position: Position,
    node_size: Size,
    is_output: bool,
    index: usize,
) -> Position {
    let x = if is_output {
        node_position.x + node_size.width
    } else {
        node_position.x
    };
    Position {
        x,
        y: node_position.y + PORT_TOP + index as f32 * PORT_SPACING,
    }
}
