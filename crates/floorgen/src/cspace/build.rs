//! Construction of template instances and pairwise configuration spaces.

use std::collections::BTreeMap;

use tracing::debug;

use super::types::{ConfigurationSpace, ReverseDoor, RoomTemplateInstance, ShapeId, WeightedShape};
use super::ConfigurationSpaces;
use crate::doors::{door_sets_equal, merge_door_lines, DoorLine};
use crate::error::{LayoutError, Result};
use crate::geom::{overlap_along_line, remove_intersections, OrthogonalLine, Polygon, Transformation};
use crate::map::{MapDescription, RoomTemplate};

/// Distinct instances of `template` under `transformations`.
///
/// Each transformed outline is moved into the first quadrant touching both
/// axes; instances with equal outline and equal door-line set (in any order)
/// are merged and remember every transformation that produced them.
pub fn room_template_instances(
    template: &RoomTemplate,
    template_index: usize,
    transformations: &[Transformation],
) -> Result<Vec<RoomTemplateInstance>> {
    let doors = template.door_mode.door_lines(&template.shape)?;
    let mut out: Vec<RoomTemplateInstance> = Vec::new();

    for &t in transformations {
        let transformed = template.shape.transform(t)?;
        let shift = -transformed.bounding_rectangle().a;
        let shape = transformed.normalized();
        let lines: Vec<DoorLine> = doors.iter().map(|d| d.transform(t).shift(shift)).collect();

        if let Some(same) = out
            .iter_mut()
            .find(|i| i.shape == shape && door_sets_equal(&i.doors, &lines))
        {
            same.transformations.push(t);
            continue;
        }
        out.push(RoomTemplateInstance {
            template: template_index,
            shape,
            doors: lines,
            transformations: vec![t],
        });
    }
    Ok(out)
}

/// Configuration space of `moving` around `fixed` (fixed sits at the origin).
///
/// With `offsets`, every door alignment is pushed away from the fixed room
/// along the door's outward normal by each offset; an empty list is an error.
pub fn configuration_space(
    moving: &Polygon,
    moving_doors: &[DoorLine],
    fixed: &Polygon,
    fixed_doors: &[DoorLine],
    offsets: Option<&[i32]>,
) -> Result<ConfigurationSpace> {
    if offsets.is_some_and(|o| o.is_empty()) {
        return Err(LayoutError::input(
            "there must be at least one offset if they are set",
        ));
    }
    let moving_doors = merge_door_lines(moving_doors);
    let fixed_doors = merge_door_lines(fixed_doors);

    let mut candidates = Vec::new();
    let mut reverse_doors = Vec::new();
    for m in &moving_doors {
        let d1 = m.line.direction_vector();
        let opposite = m.direction().opposite();
        for f in fixed_doors
            .iter()
            .filter(|f| f.direction() == opposite && f.length == m.length)
        {
            // Door of `m` starting at S1 + a*d1 matches the door of `f` starting
            // at S2 - b*d1 iff T = S2 - S1 - (a + b + L) * d1.
            let start = f.line.from - m.line.from - d1 * m.length;
            let steps = m.line.length() + f.line.length();
            let base = OrthogonalLine::new(start, start + f.line.direction_vector() * steps, opposite);

            let shifted: Vec<OrthogonalLine> = match offsets {
                None => vec![base],
                Some(offsets) => {
                    let normal = opposite.outward_normal();
                    offsets.iter().map(|&o| base.shift(normal * o)).collect()
                }
            };
            for line in shifted {
                reverse_doors.push(ReverseDoor {
                    line,
                    moving: *m,
                    fixed: *f,
                });
                candidates.push(line);
            }
        }
    }

    let clipped = remove_overlapping(moving, fixed, &candidates);
    Ok(ConfigurationSpace {
        lines: remove_intersections(&clipped),
        reverse_doors,
    })
}

/// Keeps the parts of each line where `moving` does not overlap `fixed`.
fn remove_overlapping(
    moving: &Polygon,
    fixed: &Polygon,
    lines: &[OrthogonalLine],
) -> Vec<OrthogonalLine> {
    let mut out = Vec::new();
    for line in lines {
        let events = overlap_along_line(moving, fixed, line);
        if events.is_empty() {
            out.push(*line);
            continue;
        }
        let d = line.direction_vector();
        let mut last_overlap = false;
        let mut last_point = line.from;
        for &(point, overlapping) in &events {
            if overlapping && !last_overlap {
                let end = point - d;
                if line.contains(end).is_some() {
                    out.push(OrthogonalLine::new(last_point, end, line.direction));
                }
            }
            last_overlap = overlapping;
            last_point = point;
        }
        if !last_overlap {
            out.push(OrthogonalLine::new(last_point, line.to, line.direction));
        }
    }
    out
}

impl ConfigurationSpaces {
    /// Instances and configuration spaces for every shape registered in `map`.
    ///
    /// The direct table is always built; the gapped table only when the map
    /// has corridor offsets.
    pub fn generate(map: &MapDescription) -> Result<Self> {
        let mut instances: Vec<RoomTemplateInstance> = Vec::new();
        let mut by_registration: BTreeMap<(usize, bool), Vec<ShapeId>> = BTreeMap::new();
        let mut shapes_for_nodes: Vec<Vec<WeightedShape>> = Vec::with_capacity(map.room_count());

        for node in 0..map.room_count() {
            let mut weighted = Vec::new();
            for entry in map.shape_entries(node) {
                let key = (entry.template, entry.rotate);
                if !by_registration.contains_key(&key) {
                    let template = &map.templates()[entry.template];
                    let ts = template.effective_transformations(entry.rotate);
                    let new = room_template_instances(template, entry.template, &ts)?;
                    let ids = (instances.len()..instances.len() + new.len()).map(ShapeId).collect();
                    instances.extend(new);
                    by_registration.insert(key, ids);
                }
                let ids = &by_registration[&key];
                let weight = entry.probability / ids.len() as f64;
                weighted.extend(ids.iter().map(|&shape| WeightedShape { shape, weight }));
            }
            shapes_for_nodes.push(weighted);
        }

        let table = |offsets: Option<&[i32]>| -> Result<Vec<Vec<ConfigurationSpace>>> {
            instances
                .iter()
                .map(|m| {
                    instances
                        .iter()
                        .map(|f| configuration_space(&m.shape, &m.doors, &f.shape, &f.doors, offsets))
                        .collect()
                })
                .collect()
        };
        let direct = table(None)?;
        let gapped = match map.corridor_offsets() {
            Some(offsets) => Some(table(Some(offsets))?),
            None => None,
        };

        let average_size = if instances.is_empty() {
            0.0
        } else {
            instances
                .iter()
                .map(|i| {
                    let b = i.shape.bounding_rectangle();
                    f64::from(b.width() + b.height()) / 2.0
                })
                .sum::<f64>()
                / instances.len() as f64
        };

        debug!(
            instances = instances.len(),
            gapped = gapped.is_some(),
            average_size,
            "configuration spaces generated"
        );
        Ok(Self {
            instances,
            direct,
            gapped,
            shapes_for_nodes,
            average_size,
        })
    }
}
