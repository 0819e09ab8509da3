//! Layout search: annealing per chain, driven by a backtracking planner.
//!
//! Purpose
//! - Turn a `MapDescription` into complete, valid, mutually distinct layouts
//!   with resolved doors.
//!
//! Why this design
//! - Chains are laid out one at a time. Each chain is annealed on top of a
//!   partial layout and every distinct valid result becomes a branch; an
//!   explicit work stack makes the search depth-first and lets it backtrack
//!   into earlier branches when a later chain fails.
//! - Randomness, cancellation and progress reporting are all passed in by the
//!   caller, so a fixed seed reproduces a run exactly.
//!
//! Split
//! - `anneal.rs` (schedule and per-chain evolver), `planner.rs` (work stack),
//!   `observe.rs` (observer trait, cancel token), `convert.rs` (output rooms
//!   and door resolution).

mod anneal;
mod convert;
mod observe;
mod planner;

pub use anneal::AnnealCfg;
pub use convert::{Door, MapLayout, Room};
pub use observe::{CancelToken, GenerationObserver, NoopObserver};

use std::sync::Arc;

use rand::Rng;
use tracing::info;

use crate::chains::{BreadthFirstChains, Chain, TwoStageChains};
use crate::cspace::ConfigurationSpaces;
use crate::error::Result;
use crate::layout::{LayoutConstraint, LayoutOps};
use crate::map::{MapDescription, MapGraphs};

use anneal::EvolveCtx;

/// Generator knobs.
#[derive(Clone, Debug, Default)]
pub struct GeneratorCfg {
    pub anneal: AnnealCfg,
    /// Energy scale; `None` uses the average instance size.
    pub energy_sigma: Option<f64>,
    /// Compare every proposal against a full recompute. Slow; meant for
    /// tests and debugging.
    pub check_incremental: bool,
    /// Fresh starts allowed after the work stack runs dry.
    pub restarts: usize,
    pub chains: BreadthFirstChains,
    /// Layout-wide energy terms; a layout is only valid when all are zero.
    pub layout_constraints: Vec<Arc<dyn LayoutConstraint>>,
}

/// Result of one `LayoutGenerator::generate` call.
#[derive(Clone, Debug)]
pub struct GenerationReport {
    pub layouts: Vec<MapLayout>,
    /// Annealing proposals evaluated.
    pub iterations: u64,
    pub restarts_used: usize,
    pub cancelled: bool,
}

/// Precomputed state for one map; reusable across `generate` calls.
#[derive(Clone, Debug)]
pub struct LayoutGenerator {
    graphs: MapGraphs,
    spaces: ConfigurationSpaces,
    chains: Vec<Chain>,
    node_ids: Vec<usize>,
    cfg: GeneratorCfg,
}

impl LayoutGenerator {
    /// Validates the map and builds graphs, configuration spaces and chains.
    pub fn new(map: &MapDescription, cfg: GeneratorCfg) -> Result<Self> {
        let graphs = map.graphs()?;
        let spaces = ConfigurationSpaces::generate(map)?;
        let chains = TwoStageChains::new(cfg.chains).decompose(&graphs)?;
        let node_ids = (0..map.room_count()).map(|i| map.node_id(i)).collect();
        Ok(Self {
            graphs,
            spaces,
            chains,
            node_ids,
            cfg,
        })
    }

    /// Chains in placement order, as dense node indices.
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn spaces(&self) -> &ConfigurationSpaces {
        &self.spaces
    }

    pub fn graphs(&self) -> &MapGraphs {
        &self.graphs
    }

    pub fn cfg(&self) -> &GeneratorCfg {
        &self.cfg
    }

    /// Searches for up to `count` layouts.
    ///
    /// Fewer come back when the search space is exhausted or `cancel` fires;
    /// neither case is an error.
    pub fn generate<R, O>(
        &self,
        count: usize,
        rng: &mut R,
        cancel: &CancelToken,
        observer: &mut O,
    ) -> Result<GenerationReport>
    where
        R: Rng + ?Sized,
        O: GenerationObserver + ?Sized,
    {
        let ops = LayoutOps::new(&self.spaces, &self.graphs, self.cfg.energy_sigma)
            .with_constraints(&self.cfg.layout_constraints);
        info!(
            nodes = self.node_ids.len(),
            chains = self.chains.len(),
            count,
            sigma = ops.sigma(),
            "generating layouts"
        );

        let mut ctx = EvolveCtx {
            rng,
            cancel,
            observer,
            check_incremental: self.cfg.check_incremental,
            iterations: 0,
        };
        let outcome = planner::plan(
            &ops,
            &self.cfg.anneal,
            &self.chains,
            count,
            self.cfg.restarts,
            &mut ctx,
        )?;
        let iterations = ctx.iterations;

        let layouts: Vec<MapLayout> = outcome
            .layouts
            .iter()
            .map(|l| convert::convert(l, &self.spaces, &self.graphs, &self.node_ids))
            .collect();
        let cancelled = cancel.is_cancelled();
        info!(
            layouts = layouts.len(),
            iterations,
            restarts = outcome.restarts_used,
            cancelled,
            "generation finished"
        );
        Ok(GenerationReport {
            layouts,
            iterations,
            restarts_used: outcome.restarts_used,
            cancelled,
        })
    }

    /// `generate` without cancellation or progress callbacks.
    pub fn generate_layouts<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<MapLayout>> {
        let report = self.generate(count, rng, &CancelToken::new(), &mut NoopObserver)?;
        Ok(report.layouts)
    }
}

#[cfg(test)]
mod tests;
