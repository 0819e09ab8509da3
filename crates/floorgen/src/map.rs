//! Map description: rooms, corridor rooms, passages and shape registrations.
//!
//! Rooms are identified by caller-chosen `usize` ids and stored densely in
//! insertion order; every other module works with the dense index.
//!
//! Corridor rooms form the second construction stage. A corridor joins exactly
//! two ordinary rooms; during the first stage those two rooms are kept at a gap
//! given by the corridor offsets instead of touching, and the corridor is
//! placed into that gap once both rooms are laid out.

use std::collections::BTreeMap;

use crate::doors::DoorMode;
use crate::error::{LayoutError, Result};
use crate::geom::{Polygon, Transformation};
use crate::graph::Graph;

/// Room outline, door rule and allowed symmetries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomTemplate {
    pub shape: Polygon,
    pub door_mode: DoorMode,
    pub transformations: Vec<Transformation>,
}

impl RoomTemplate {
    /// Template that is only used as given (identity transformation).
    pub fn new(shape: Polygon, door_mode: DoorMode) -> Self {
        Self {
            shape,
            door_mode,
            transformations: vec![Transformation::Identity],
        }
    }

    pub fn with_transformations(mut self, transformations: Vec<Transformation>) -> Self {
        self.transformations = transformations;
        self
    }

    /// Transformations in effect once the rotation flag of a registration is
    /// applied; duplicates removed, order kept.
    pub(crate) fn effective_transformations(&self, rotate: bool) -> Vec<Transformation> {
        let mut out: Vec<Transformation> = Vec::with_capacity(8);
        let extra: &[Transformation] = if rotate { &Transformation::ROTATIONS } else { &[] };
        for &t in self.transformations.iter().chain(extra) {
            if !out.contains(&t) {
                out.push(t);
            }
        }
        out
    }
}

/// One registration of a template for a room (or as a default).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeEntry {
    pub template: usize,
    pub rotate: bool,
    pub probability: f64,
}

#[derive(Clone, Debug)]
struct RoomSlot {
    id: usize,
    corridor: bool,
    shapes: Vec<ShapeEntry>,
}

#[derive(Clone, Debug, Default)]
pub struct MapDescription {
    rooms: Vec<RoomSlot>,
    index: BTreeMap<usize, usize>,
    passages: Vec<(usize, usize)>,
    templates: Vec<RoomTemplate>,
    default_shapes: Vec<ShapeEntry>,
    corridor_shapes: Vec<ShapeEntry>,
    corridor_offsets: Option<Vec<i32>>,
}

impl MapDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_room(&mut self, id: usize) -> Result<()> {
        self.push_room(id, false)
    }

    /// Adds a stage-two (corridor) room.
    pub fn add_corridor_room(&mut self, id: usize) -> Result<()> {
        self.push_room(id, true)
    }

    fn push_room(&mut self, id: usize, corridor: bool) -> Result<()> {
        if self.index.contains_key(&id) {
            return Err(LayoutError::input(format!("room {id} was already added")));
        }
        self.index.insert(id, self.rooms.len());
        self.rooms.push(RoomSlot {
            id,
            corridor,
            shapes: Vec::new(),
        });
        Ok(())
    }

    pub fn add_passage(&mut self, a: usize, b: usize) -> Result<()> {
        let (ia, ib) = (self.require(a)?, self.require(b)?);
        if ia == ib {
            return Err(LayoutError::input(format!("passage from room {a} to itself")));
        }
        if self
            .passages
            .iter()
            .any(|&(x, y)| (x, y) == (ia, ib) || (x, y) == (ib, ia))
        {
            return Err(LayoutError::input(format!(
                "passage between {a} and {b} was already added"
            )));
        }
        self.passages.push((ia, ib));
        Ok(())
    }

    /// Registers a template for every ordinary room without shapes of its own.
    pub fn add_room_shapes(
        &mut self,
        template: RoomTemplate,
        rotate: bool,
        probability: f64,
    ) -> Result<()> {
        let entry = self.entry(template, rotate, probability)?;
        push_unique(&mut self.default_shapes, entry)
    }

    /// Registers a template for one specific room.
    pub fn add_room_shapes_for(
        &mut self,
        id: usize,
        template: RoomTemplate,
        rotate: bool,
        probability: f64,
    ) -> Result<()> {
        let i = self.require(id)?;
        let entry = self.entry(template, rotate, probability)?;
        push_unique(&mut self.rooms[i].shapes, entry)
    }

    /// Registers a template for every corridor room without shapes of its own.
    pub fn add_corridor_shapes(
        &mut self,
        template: RoomTemplate,
        rotate: bool,
        probability: f64,
    ) -> Result<()> {
        let entry = self.entry(template, rotate, probability)?;
        push_unique(&mut self.corridor_shapes, entry)
    }

    /// Gap widths allowed between two rooms joined by a corridor.
    pub fn set_corridor_offsets(&mut self, offsets: Vec<i32>) -> Result<()> {
        if offsets.is_empty() {
            return Err(LayoutError::input(
                "there must be at least one corridor offset if they are set",
            ));
        }
        if offsets.iter().any(|&o| o <= 0) {
            return Err(LayoutError::input("corridor offsets must be positive"));
        }
        self.corridor_offsets = Some(offsets);
        Ok(())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Caller id of the room at dense `index`.
    pub fn node_id(&self, index: usize) -> usize {
        self.rooms[index].id
    }

    pub fn index_of(&self, id: usize) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn is_corridor(&self, index: usize) -> bool {
        self.rooms[index].corridor
    }

    /// Passages as dense index pairs, in insertion order.
    pub fn passages(&self) -> &[(usize, usize)] {
        &self.passages
    }

    pub fn templates(&self) -> &[RoomTemplate] {
        &self.templates
    }

    pub fn corridor_offsets(&self) -> Option<&[i32]> {
        self.corridor_offsets.as_deref()
    }

    /// Registrations in effect for the room at `index`.
    pub fn shape_entries(&self, index: usize) -> &[ShapeEntry] {
        let slot = &self.rooms[index];
        if !slot.shapes.is_empty() {
            &slot.shapes
        } else if slot.corridor {
            &self.corridor_shapes
        } else {
            &self.default_shapes
        }
    }

    /// Validates the description and derives the graphs used by the search.
    pub fn graphs(&self) -> Result<MapGraphs> {
        let n = self.rooms.len();
        if n == 0 {
            return Err(LayoutError::input("a map needs at least one room"));
        }
        for i in 0..n {
            if self.shape_entries(i).is_empty() {
                return Err(LayoutError::input(format!(
                    "room {} has no shapes",
                    self.rooms[i].id
                )));
            }
        }

        let mut full = Graph::new(n);
        for &(a, b) in &self.passages {
            full.add_edge(a, b)?;
        }
        if !full.is_connected() {
            return Err(LayoutError::input("the room graph must be connected"));
        }
        if !full.is_planar() {
            return Err(LayoutError::input("the room graph must be planar"));
        }

        let is_corridor: Vec<bool> = self.rooms.iter().map(|r| r.corridor).collect();
        let mut stage_one = Graph::new(n);
        for &(a, b) in &self.passages {
            if !is_corridor[a] && !is_corridor[b] {
                stage_one.add_edge(a, b)?;
            }
        }
        let mut corridor_edges = Vec::new();
        for c in (0..n).filter(|&c| is_corridor[c]) {
            let ns = full.neighbours(c);
            let id = self.rooms[c].id;
            if ns.len() != 2 {
                return Err(LayoutError::input(format!(
                    "corridor {id} must connect exactly two rooms, found {}",
                    ns.len()
                )));
            }
            let (a, b) = (ns[0], ns[1]);
            if is_corridor[a] || is_corridor[b] {
                return Err(LayoutError::input(format!(
                    "corridor {id} must connect two ordinary rooms"
                )));
            }
            if full.has_edge(a, b) {
                return Err(LayoutError::input(format!(
                    "rooms {} and {} share both a passage and corridor {id}",
                    self.rooms[a].id, self.rooms[b].id
                )));
            }
            if !stage_one.has_edge(a, b) {
                stage_one.add_edge(a, b)?;
                corridor_edges.push((a, b));
            }
        }
        if !corridor_edges.is_empty() && self.corridor_offsets.is_none() {
            return Err(LayoutError::input("corridor rooms need corridor offsets"));
        }

        let mut constraints = full.clone();
        for &(a, b) in &corridor_edges {
            constraints.add_edge(a, b)?;
        }
        let gapped = (0..n)
            .map(|v| {
                constraints
                    .neighbours(v)
                    .iter()
                    .enumerate()
                    .filter(|&(_, &u)| !full.has_edge(v, u))
                    .fold(0u32, |mask, (i, _)| mask | (1 << i))
            })
            .collect();

        Ok(MapGraphs {
            full,
            stage_one,
            constraints,
            gapped,
            is_corridor,
        })
    }

    fn require(&self, id: usize) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| LayoutError::input(format!("unknown room {id}")))
    }

    fn entry(&mut self, template: RoomTemplate, rotate: bool, probability: f64) -> Result<ShapeEntry> {
        if !(probability > 0.0 && probability.is_finite()) {
            return Err(LayoutError::input(format!(
                "probability must be greater than zero, got {probability}"
            )));
        }
        if template.transformations.is_empty() {
            return Err(LayoutError::input(
                "a room template needs at least one transformation",
            ));
        }
        let index = match self.templates.iter().position(|t| *t == template) {
            Some(i) => i,
            None => {
                self.templates.push(template);
                self.templates.len() - 1
            }
        };
        Ok(ShapeEntry {
            template: index,
            rotate,
            probability,
        })
    }
}

fn push_unique(list: &mut Vec<ShapeEntry>, entry: ShapeEntry) -> Result<()> {
    if list.iter().any(|e| e.template == entry.template) {
        return Err(LayoutError::input(
            "every room template can be registered at most once per room",
        ));
    }
    list.push(entry);
    Ok(())
}

/// Graphs derived from a validated `MapDescription`.
///
/// - `full`: one edge per passage.
/// - `stage_one`: ordinary rooms only; direct passages plus one edge per
///   corridor joining its two rooms.
/// - `constraints`: union of both; energies and validity vectors are indexed
///   by its adjacency lists.
#[derive(Clone, Debug)]
pub struct MapGraphs {
    pub full: Graph,
    pub stage_one: Graph,
    pub constraints: Graph,
    pub is_corridor: Vec<bool>,
    gapped: Vec<u32>,
}

impl MapGraphs {
    /// Whether the `i`-th constraint neighbour of `node` is joined through a
    /// corridor (and must keep a gap) rather than a direct passage.
    #[inline]
    pub fn is_gapped(&self, node: usize, neighbour_index: usize) -> bool {
        self.gapped[node] & (1 << neighbour_index) != 0
    }

    pub fn has_corridors(&self) -> bool {
        self.is_corridor.iter().any(|&c| c)
    }
}
