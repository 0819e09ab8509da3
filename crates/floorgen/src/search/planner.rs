//! Depth-first search over chains with a work stack of partial layouts.

use rand::Rng;
use tracing::debug;

use super::anneal::{evolve, AnnealCfg, EvolveCtx};
use super::observe::GenerationObserver;
use crate::chains::Chain;
use crate::error::{LayoutError, Result};
use crate::layout::{Layout, LayoutOps};

/// Partial layout with chains `0..=chain` placed greedily, `chain` not yet
/// annealed.
struct WorkItem {
    layout: Layout,
    chain: usize,
}

/// Pushes `layouts` in descending energy order (stable), so the
/// lowest-energy one is popped first.
fn push_by_energy(
    stack: &mut Vec<WorkItem>,
    mut layouts: Vec<Layout>,
    chain: usize,
    energy: impl Fn(&Layout) -> f64,
) {
    layouts.sort_by(|a, b| energy(b).total_cmp(&energy(a)));
    stack.extend(layouts.into_iter().map(|layout| WorkItem { layout, chain }));
}

pub(crate) struct PlanOutcome {
    pub layouts: Vec<Layout>,
    pub restarts_used: usize,
}

/// Collects up to `count` complete layouts that differ pairwise by more than
/// twice the minimum difference.
///
/// Candidates for the next chain are pushed in descending energy order, so
/// the lowest-energy one is expanded first. An empty stack ends the search
/// unless restarts remain.
pub(crate) fn plan<R, O>(
    ops: &LayoutOps<'_>,
    anneal: &AnnealCfg,
    chains: &[Chain],
    count: usize,
    restarts: usize,
    ctx: &mut EvolveCtx<'_, R, O>,
) -> Result<PlanOutcome>
where
    R: Rng + ?Sized,
    O: GenerationObserver + ?Sized,
{
    let Some(first) = chains.first() else {
        return Err(LayoutError::input("there are no chains to lay out"));
    };
    let node_count = ops.graphs().constraints.vertex_count();
    let threshold = 2.0 * anneal.minimum_difference;

    let mut full: Vec<Layout> = Vec::new();
    let mut restarts_used = 0;
    let mut stack = vec![WorkItem {
        layout: ops.add_chain(&Layout::new(node_count), first, ctx.rng)?,
        chain: 0,
    }];

    while full.len() < count {
        if ctx.cancel.is_cancelled() {
            break;
        }
        let Some(item) = stack.pop() else {
            if restarts_used >= restarts {
                break;
            }
            restarts_used += 1;
            debug!(restart = restarts_used, "work stack empty, reseeding");
            stack.push(WorkItem {
                layout: ops.add_chain(&Layout::new(node_count), first, ctx.rng)?,
                chain: 0,
            });
            continue;
        };

        let chain = &chains[item.chain];
        let candidates = evolve(ops, anneal, &item.layout, chain, item.chain, ctx)?;
        debug!(
            chain = item.chain,
            candidates = candidates.len(),
            stack = stack.len(),
            "chain evolved"
        );

        if item.chain + 1 == chains.len() {
            for candidate in candidates {
                if full.len() >= count {
                    break;
                }
                if full
                    .iter()
                    .all(|f| ops.difference(f, &candidate, None) > threshold)
                {
                    ctx.observer.on_valid(&candidate);
                    full.push(candidate);
                }
            }
        } else {
            let next = &chains[item.chain + 1];
            let extended = candidates
                .iter()
                .map(|c| ops.add_chain(c, next, ctx.rng))
                .collect::<Result<Vec<Layout>>>()?;
            push_by_energy(&mut stack, extended, item.chain + 1, |l| ops.layout_energy(l));
        }
    }

    Ok(PlanOutcome {
        layouts: full,
        restarts_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cspace::ShapeId;
    use crate::geom::Point;
    use crate::layout::{Configuration, EnergyData};

    /// One-node layout tagged by its x position, with the given energy.
    fn tagged(tag: i32, energy: f64) -> Layout {
        let mut layout = Layout::new(1);
        layout.set(
            0,
            Configuration {
                shape: ShapeId(0),
                position: Point::new(tag, 0),
                energy: EnergyData {
                    energy,
                    ..EnergyData::default()
                },
            },
        );
        layout
    }

    #[test]
    fn lowest_energy_candidate_pops_first() {
        let mut stack = vec![WorkItem {
            layout: tagged(-1, 0.5),
            chain: 0,
        }];
        let candidates = vec![tagged(0, 3.0), tagged(1, 1.0), tagged(2, 2.0), tagged(3, 1.0)];
        push_by_energy(&mut stack, candidates, 1, Layout::energy);

        let mut order = Vec::new();
        while let Some(item) = stack.pop() {
            let tag = item.layout.get(0).unwrap().position.x;
            order.push((tag, item.chain));
        }
        // Ties keep candidate order, so the later equal-energy layout pops first.
        assert_eq!(order, vec![(3, 1), (1, 1), (2, 1), (0, 1), (-1, 0)]);
    }
}
