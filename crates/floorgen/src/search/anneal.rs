//! Bounded simulated annealing for a single chain.

use rand::Rng;
use tracing::debug;

use super::observe::{CancelToken, GenerationObserver};
use crate::error::Result;
use crate::layout::{Layout, LayoutOps};

/// Annealing schedule and acceptance parameters.
#[derive(Clone, Debug)]
pub struct AnnealCfg {
    /// Number of temperature steps.
    pub cycles: usize,
    pub trials_per_cycle: usize,
    /// Target acceptance probability of an average uphill move at the start.
    pub p0: f64,
    /// Same, at the end of the schedule.
    pub p1: f64,
    pub shape_perturb_chance: f64,
    /// Kept layouts differ pairwise by more than twice this.
    pub minimum_difference: f64,
    /// An evolve call returns as soon as it has this many layouts.
    pub max_layouts_per_chain: usize,
}

impl Default for AnnealCfg {
    fn default() -> Self {
        Self {
            cycles: 50,
            trials_per_cycle: 500,
            p0: 0.2,
            p1: 0.01,
            shape_perturb_chance: 0.4,
            minimum_difference: 150.0,
            max_layouts_per_chain: 15,
        }
    }
}

impl AnnealCfg {
    /// Initial temperature and per-cycle cooling ratio.
    pub fn schedule(&self) -> (f64, f64) {
        let t0 = -1.0 / self.p0.ln();
        let t1 = -1.0 / self.p1.ln();
        let ratio = if self.cycles > 1 {
            (t1 / t0).powf(1.0 / (self.cycles - 1) as f64)
        } else {
            1.0
        };
        (t0, ratio)
    }
}

/// Metropolis acceptance with a running average of accepted energy deltas.
///
/// The average is seeded once, at fifteen times the first proposal's delta
/// when that proposal goes uphill. Until an accepted move makes it positive,
/// uphill moves are rejected.
#[derive(Clone, Copy, Debug)]
struct Acceptance {
    avg_delta: f64,
    accepted: usize,
}

impl Acceptance {
    fn new() -> Self {
        Self {
            avg_delta: 0.0,
            accepted: 1,
        }
    }

    /// Probability of accepting `delta` at temperature `t`.
    fn probability(&mut self, delta: f64, t: f64, first_trial: bool) -> f64 {
        if delta <= 0.0 {
            return 1.0;
        }
        if first_trial {
            self.avg_delta = delta * 15.0;
        }
        if self.avg_delta <= 0.0 {
            return 0.0;
        }
        (-delta / (self.avg_delta * t)).exp()
    }

    fn record(&mut self, delta: f64) {
        self.accepted += 1;
        let n = self.accepted as f64;
        self.avg_delta = (self.avg_delta * (n - 1.0) + delta.abs()) / n;
    }
}

/// Shared state of one search run threaded through every evolve call.
pub(crate) struct EvolveCtx<'c, R: ?Sized, O: ?Sized> {
    pub rng: &'c mut R,
    pub cancel: &'c CancelToken,
    pub observer: &'c mut O,
    pub check_incremental: bool,
    pub iterations: u64,
}

/// Chance-based early exit once a chain keeps failing; the first chain is
/// never abandoned.
fn should_abandon<R: Rng + ?Sized>(failures: usize, rng: &mut R) -> bool {
    (failures > 8 && rng.gen_range(0..2) == 0)
        || (failures > 6 && rng.gen_range(0..3) == 0)
        || (failures > 4 && rng.gen_range(0..5) == 0)
        || (failures > 2 && rng.gen_range(0..7) == 0)
}

/// Anneals the nodes of `chain` starting from `layout` and returns the valid,
/// mutually distinct layouts found on the way.
pub(crate) fn evolve<R, O>(
    ops: &LayoutOps<'_>,
    cfg: &AnnealCfg,
    layout: &Layout,
    chain: &[usize],
    chain_index: usize,
    ctx: &mut EvolveCtx<'_, R, O>,
) -> Result<Vec<Layout>>
where
    R: Rng + ?Sized,
    O: GenerationObserver + ?Sized,
{
    let (mut t, ratio) = cfg.schedule();
    let has_corridors = chain.iter().any(|&v| ops.graphs().is_corridor[v]);
    let threshold = 2.0 * cfg.minimum_difference;

    let mut current = layout.clone();
    let mut current_energy = ops.layout_energy(&current);
    let mut acceptance = Acceptance::new();
    let mut failures = 0usize;
    let mut found: Vec<Layout> = Vec::new();

    for i in 0..cfg.cycles {
        if chain_index != 0 && should_abandon(failures, ctx.rng) {
            debug!(chain = chain_index, cycle = i, failures, "abandoning chain");
            break;
        }
        let mut was_accepted = false;

        for j in 0..cfg.trials_per_cycle {
            if ctx.cancel.is_cancelled() {
                return Ok(found);
            }
            ctx.iterations += 1;

            let perturbed = ops.perturb_layout(&current, chain, cfg.shape_perturb_chance, ctx.rng);
            if ctx.check_incremental {
                ops.check_consistency(&perturbed)?;
            }
            ctx.observer.on_perturbed(&perturbed);

            if ops.is_layout_valid(&perturbed) {
                let candidate = if has_corridors {
                    ops.try_complete_chain(&perturbed, chain, ctx.rng)
                } else {
                    Some(perturbed.clone())
                };
                if let Some(candidate) = candidate {
                    if found
                        .iter()
                        .all(|f| ops.difference(f, &candidate, Some(chain)) > threshold)
                    {
                        ctx.observer.on_partial_valid(&candidate);
                        found.push(candidate);
                        was_accepted = true;
                        if found.len() >= cfg.max_layouts_per_chain {
                            return Ok(found);
                        }
                    }
                }
            }

            let perturbed_energy = ops.layout_energy(&perturbed);
            let delta = perturbed_energy - current_energy;
            let p = acceptance.probability(delta, t, i == 0 && j == 0);
            if p >= 1.0 || ctx.rng.gen::<f64>() < p {
                acceptance.record(delta);
                current = perturbed;
                current_energy = perturbed_energy;
            }
        }

        if !was_accepted {
            failures += 1;
        }
        t *= ratio;
    }
    Ok(found)
}
