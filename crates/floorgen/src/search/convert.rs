//! Conversion of internal layouts into caller-facing room records.

use crate::cspace::{ConfigurationSpaces, SpaceKind};
use crate::geom::{OrthogonalLine, Point, Polygon, Transformation};
use crate::layout::Layout;
use crate::map::MapGraphs;

/// A door between a room and one of its passage neighbours, in world
/// coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Door {
    /// Caller id of the room on the other side.
    pub neighbour: usize,
    pub line: OrthogonalLine,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    /// Caller id.
    pub node: usize,
    /// Instance outline in local coordinates; add `position` for world ones.
    pub shape: Polygon,
    pub position: Point,
    pub is_corridor: bool,
    /// Symmetries of the template that produce `shape`.
    pub transformations: Vec<Transformation>,
    pub doors: Vec<Door>,
}

/// A finished layout, one record per placed room in node order.
#[derive(Clone, Debug, PartialEq)]
pub struct MapLayout {
    pub rooms: Vec<Room>,
}

impl MapLayout {
    pub fn room(&self, node: usize) -> Option<&Room> {
        self.rooms.iter().find(|r| r.node == node)
    }
}

/// Door segment shared by nodes `a` and `b` of `layout`, if they touch
/// through a door pair. Several aligned door positions resolve to the
/// middle one.
fn resolve_door(
    spaces: &ConfigurationSpaces,
    layout: &Layout,
    a: usize,
    b: usize,
) -> Option<OrthogonalLine> {
    let (ca, cb) = (layout.get(a)?, layout.get(b)?);
    let offset = ca.position - cb.position;
    let rd = spaces
        .space(ca.shape, cb.shape, SpaceKind::Direct)
        .reverse_doors
        .iter()
        .find(|rd| rd.line.contains(offset).is_some())?;

    let moving = rd.moving.shift(ca.position);
    let fixed = rd.fixed.shift(cb.position);
    let step = moving.line.direction_vector() * moving.length;
    let matches: Vec<OrthogonalLine> = fixed
        .line
        .points()
        .filter(|&q| moving.line.contains(q - step).is_some())
        .map(|q| fixed.door_at(q))
        .collect();
    matches.get(matches.len() / 2).copied()
}

pub(crate) fn convert(
    layout: &Layout,
    spaces: &ConfigurationSpaces,
    graphs: &MapGraphs,
    node_ids: &[usize],
) -> MapLayout {
    let mut rooms: Vec<Room> = Vec::new();
    let mut slot = vec![None; layout.node_count()];
    for (v, c) in layout.placed() {
        let instance = spaces.instance(c.shape);
        slot[v] = Some(rooms.len());
        rooms.push(Room {
            node: node_ids[v],
            shape: instance.shape.clone(),
            position: c.position,
            is_corridor: graphs.is_corridor[v],
            transformations: instance.transformations.clone(),
            doors: Vec::new(),
        });
    }

    for (a, b) in graphs.full.edges() {
        let (Some(ia), Some(ib)) = (slot[a], slot[b]) else {
            continue;
        };
        if let Some(line) = resolve_door(spaces, layout, a, b) {
            rooms[ia].doors.push(Door {
                neighbour: node_ids[b],
                line,
            });
            rooms[ib].doors.push(Door {
                neighbour: node_ids[a],
                line,
            });
        }
    }
    MapLayout { rooms }
}
