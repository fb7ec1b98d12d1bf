//! Convergence controller.
//!
//! A [`Placer`] owns all mutable state of one run and advances it one outer
//! pass per [`Placer::step`]:
//!
//! ```text
//! Initializing ──> Solving ──> Converged
//!                    │ ↺
//!                    └──────> IterationBudgetExhausted
//! ```
//!
//! Each pass solves the x and y systems (concurrently when enabled), writes
//! the result back, enforces the core boundary, and measures how far the
//! movable cells moved.
//!
//! A component with no spring to a fixed cell has a singular Laplacian, but
//! its right-hand side sums to zero, so conjugate gradient started from the
//! current coordinates only moves within the mean-zero subspace and lands on
//! the exact optimum with the centroid unchanged. The centroid is restored
//! after each solve to cancel rounding drift. Unconnected cells, and groups
//! that still fail to solve, get a weak proximal spring instead.

use crate::codes;
use crate::geometry::{Axis, CoreRegion, Point};
use crate::netlist::Netlist;
use crate::placement::boundary::BoundaryHandler;
use crate::placement::cost::{quadratic_objective, total_hpwl};
use crate::placement::net_model::{translate, StarNode};
use crate::placement::random::random_placement;
use crate::placement::solver::{ConjugateGradient, SolveError, SolveStats};
use crate::placement::spreading::{RankSpreader, Spreader};
use crate::placement::system::{Spring, SystemBuilder};
use crate::placement::Placement;
use crate::snapshot::{Snapshot, SnapshotSink, SnapshotStage};
use crate::PlaceError;
use mplace_common::InternalError;
use mplace_config::{validate_config, PlacementConfig};
use mplace_diagnostics::{Diagnostic, DiagnosticSink};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lifecycle of a placement run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PlacerState {
    /// Inputs validated; no placement yet.
    Initializing,
    /// Random placement done; outer passes in progress.
    Solving,
    /// Displacement stayed below the threshold for the configured streak.
    Converged,
    /// The pass budget ran out first. Not an error.
    IterationBudgetExhausted,
}

impl PlacerState {
    /// Returns `true` for the two end states.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Converged | Self::IterationBudgetExhausted)
    }
}

/// Metrics of one completed outer pass.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct PassRecord {
    /// Pass index, starting at 1.
    pub iteration: u32,
    /// Largest movable-cell move since the previous pass.
    pub max_displacement: f64,
    /// Quadratic objective of the reported placement.
    pub objective: f64,
    /// Weighted HPWL of the reported placement.
    pub hpwl: f64,
    /// Inner solver steps for the x and y systems.
    pub solver_steps: [u32; 2],
}

/// Everything a finished run hands back.
#[derive(Clone, Debug)]
pub struct PlacementOutcome {
    /// Terminal state reached.
    pub state: PlacerState,
    /// Outer passes completed.
    pub iterations: u32,
    /// Final positions, inside the core, after spreading if enabled.
    pub placement: Placement,
    /// Per-pass metrics.
    pub history: Vec<PassRecord>,
    /// Non-fatal conditions reported during the run.
    pub diagnostics: Vec<Diagnostic>,
}

impl PlacementOutcome {
    /// Returns `true` if the run met the convergence criterion.
    pub fn converged(&self) -> bool {
        self.state == PlacerState::Converged
    }
}

/// Solves one axis from warm start `start`, then moves each group in
/// `recenter` back onto its starting centroid.
fn solve_axis(
    builder: &SystemBuilder,
    solver: &ConjugateGradient,
    axis: Axis,
    springs: &[Spring],
    recenter: &[&[usize]],
    start: &[f64],
) -> Result<(Vec<f64>, SolveStats), SolveError> {
    let system = builder.assemble(axis, springs);
    let mut x = start.to_vec();
    let stats = solver.solve(&system.matrix, &system.rhs, &mut x)?;
    for vars in recenter {
        restore_centroid(&mut x, start, vars);
    }
    Ok((x, stats))
}

fn restore_centroid(x: &mut [f64], start: &[f64], vars: &[usize]) {
    if vars.is_empty() {
        return;
    }
    let n = vars.len() as f64;
    let drift = vars.iter().map(|&v| x[v] - start[v]).sum::<f64>() / n;
    for &v in vars {
        x[v] -= drift;
    }
}

type AxisResult = Result<(Vec<f64>, SolveStats), SolveError>;

/// Drives one placement run.
pub struct Placer<'a> {
    netlist: &'a Netlist,
    core: CoreRegion,
    config: PlacementConfig,
    sink: DiagnosticSink,
    state: PlacerState,
    builder: SystemBuilder,
    stars: Vec<StarNode>,
    boundary: BoundaryHandler,
    solver: ConjugateGradient,
    spreader: Option<Box<dyn Spreader>>,
    placement: Placement,
    coords: [Vec<f64>; 2],
    anchored: Vec<bool>,
    soft_springs: [Vec<Spring>; 2],
    iteration: u32,
    streak: u32,
    history: Vec<PassRecord>,
    step_cap_reported: bool,
}

impl<'a> Placer<'a> {
    /// Validates the inputs and prepares the linear systems.
    ///
    /// Fails fast with [`PlaceError::InvalidConfiguration`] or
    /// [`PlaceError::InvalidNetlist`]; nothing is solved yet.
    pub fn new(
        netlist: &'a Netlist,
        core: CoreRegion,
        config: PlacementConfig,
    ) -> Result<Self, PlaceError> {
        validate_config(&config)?;
        if !core.is_valid() {
            return Err(PlaceError::InvalidConfiguration(format!(
                "core region must have positive finite dimensions, got {} x {}",
                core.width, core.height
            )));
        }
        netlist.validate(&core)?;

        let sink = DiagnosticSink::new();
        let model = translate(netlist, &config.run, &sink);
        let builder = SystemBuilder::new(netlist, &model);
        let n = builder.vars().len();
        let spreader: Option<Box<dyn Spreader>> = if config.spreading.enabled {
            Some(Box::new(RankSpreader::new(config.spreading.strength)))
        } else {
            None
        };

        Ok(Self {
            netlist,
            core,
            boundary: BoundaryHandler::new(&config.boundary, core),
            solver: ConjugateGradient::new(config.solver.tolerance, config.solver.max_steps),
            anchored: vec![false; builder.components().len()],
            stars: model.stars,
            builder,
            config,
            sink,
            state: PlacerState::Initializing,
            spreader,
            placement: Placement::from_netlist(netlist),
            coords: [vec![0.0; n], vec![0.0; n]],
            soft_springs: [Vec::new(), Vec::new()],
            iteration: 0,
            streak: 0,
            history: Vec::new(),
            step_cap_reported: false,
        })
    }

    /// Replaces the post-convergence spreader, enabling spreading.
    pub fn with_spreader(mut self, spreader: Box<dyn Spreader>) -> Self {
        self.spreader = Some(spreader);
        self
    }

    /// Current state.
    pub fn state(&self) -> PlacerState {
        self.state
    }

    /// Outer passes completed so far.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Current positions as they would be reported: clamped into the core.
    pub fn placement(&self) -> Placement {
        self.boundary.clamped(self.netlist, &self.placement)
    }

    /// Per-pass metrics so far.
    pub fn history(&self) -> &[PassRecord] {
        &self.history
    }

    /// Diagnostics reported so far.
    pub fn diagnostics(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// Advances the run by one transition and returns the new state.
    ///
    /// Stepping a terminal run is a no-op.
    pub fn step(&mut self, snapshots: &mut dyn SnapshotSink) -> Result<PlacerState, PlaceError> {
        match self.state {
            PlacerState::Initializing => {
                self.initialize(snapshots);
                self.state = PlacerState::Solving;
            }
            PlacerState::Solving => self.pass(snapshots)?,
            PlacerState::Converged | PlacerState::IterationBudgetExhausted => {}
        }
        Ok(self.state)
    }

    /// Steps until a terminal state and returns the outcome.
    pub fn run(
        &mut self,
        snapshots: &mut dyn SnapshotSink,
    ) -> Result<PlacementOutcome, PlaceError> {
        while !self.state.is_terminal() {
            self.step(snapshots)?;
        }
        Ok(self.outcome())
    }

    /// Snapshot of the run's results so far.
    pub fn outcome(&self) -> PlacementOutcome {
        PlacementOutcome {
            state: self.state,
            iterations: self.iteration,
            placement: self.placement(),
            history: self.history.clone(),
            diagnostics: self.sink.diagnostics(),
        }
    }

    fn initialize(&mut self, snapshots: &mut dyn SnapshotSink) {
        self.placement = random_placement(self.netlist, &self.core, self.config.run.random_seed);
        self.load_coords();

        let vars = self.builder.vars();
        for (s, star) in self.stars.iter().enumerate() {
            let var = vars.star_var(s);
            for (slot, axis) in Axis::ALL.into_iter().enumerate() {
                let sum: f64 = star
                    .members
                    .iter()
                    .map(|(cell, offset)| self.placement.get(*cell).along(axis) + offset.along(axis))
                    .sum();
                self.coords[slot][var] = sum / star.members.len() as f64;
            }
        }

        let mut isolated = Vec::new();
        let floating = self.builder.floating_components().count();
        for (index, component) in self.builder.components().iter().enumerate() {
            if component.anchored {
                continue;
            }
            let names: Vec<&str> = component
                .vars
                .iter()
                .filter_map(|&v| vars.var_cell(v))
                .map(|c| self.netlist.cell(c).name.as_str())
                .collect();
            if component.is_isolated() {
                self.anchored[index] = true;
                isolated.extend(names);
                continue;
            }
            self.sink.emit(
                Diagnostic::new(
                    codes::DEGENERATE_SYSTEM,
                    format!(
                        "connected group of {} cell(s) has no fixed cell; solved about its centroid",
                        names.len()
                    ),
                )
                .with_subject(format!("cell \"{}\"", names.first().copied().unwrap_or("<star>")))
                .with_help("connect the group to a fixed cell to pin down its absolute location"),
            );
        }
        if !isolated.is_empty() {
            self.sink.emit(
                Diagnostic::new(
                    codes::UNCONNECTED_CELLS,
                    format!("{} movable cell(s) have no connections and stay where placed", isolated.len()),
                )
                .with_subject(format!("cell \"{}\"", isolated[0])),
            );
        }

        log::info!(
            "placing {} movable cells in {} x {} core ({} unknowns per axis, {} floating groups)",
            self.netlist.movable_count(),
            self.core.width,
            self.core.height,
            vars.len(),
            floating
        );

        let initial = Snapshot::capture(0, SnapshotStage::Initial, self.core, &self.placement());
        snapshots.record(initial);
    }

    /// Copies movable-cell positions into the solver vectors.
    fn load_coords(&mut self) {
        let vars = self.builder.vars();
        for var in 0..vars.cell_vars() {
            if let Some(cell) = vars.var_cell(var) {
                let at = self.placement.get(cell);
                self.coords[0][var] = at.x;
                self.coords[1][var] = at.y;
            }
        }
    }

    fn springs(&self, slot: usize) -> Vec<Spring> {
        let weight = self.config.solver.anchor_weight;
        let mut springs: Vec<Spring> = self
            .builder
            .components()
            .iter()
            .zip(&self.anchored)
            .filter(|(_, anchored)| **anchored)
            .flat_map(|(component, _)| component.vars.iter())
            .map(|&var| Spring {
                var,
                weight,
                target: self.coords[slot][var],
            })
            .collect();
        springs.extend_from_slice(&self.soft_springs[slot]);
        springs
    }

    /// Groups solved without any spring on axis `slot`: no fixed cell, no
    /// proximal anchor and no soft-boundary pull.
    fn free_groups(&self, slot: usize) -> Vec<&[usize]> {
        let pulled: HashSet<usize> = self.soft_springs[slot].iter().map(|s| s.var).collect();
        self.builder
            .components()
            .iter()
            .zip(&self.anchored)
            .filter(|(c, anchored)| !c.anchored && !**anchored)
            .map(|(c, _)| c.vars.as_slice())
            .filter(|vars| !vars.iter().any(|v| pulled.contains(v)))
            .collect()
    }

    fn solve_both(&self) -> (AxisResult, AxisResult) {
        let builder = &self.builder;
        let solver = &self.solver;
        let (sx, sy) = (self.springs(0), self.springs(1));
        let (fx, fy) = (self.free_groups(0), self.free_groups(1));
        let (cx, cy) = (&self.coords[0], &self.coords[1]);
        if self.config.solver.parallel_axes {
            rayon::join(
                || solve_axis(builder, solver, Axis::X, &sx, &fx, cx),
                || solve_axis(builder, solver, Axis::Y, &sy, &fy, cy),
            )
        } else {
            (
                solve_axis(builder, solver, Axis::X, &sx, &fx, cx),
                solve_axis(builder, solver, Axis::Y, &sy, &fy, cy),
            )
        }
    }

    /// Anchors more of the system after a degenerate solve.
    ///
    /// The first failure anchors the component holding the reported row; any
    /// later failure, or one without a row, anchors everything.
    fn anchor_after_failure(&mut self, err: &SolveError, attempt: u32) {
        let SolveError::DegenerateSystem { row } = *err;
        let target = row
            .filter(|_| attempt == 1)
            .and_then(|r| self.builder.component_of(r))
            .filter(|&c| !self.anchored[c]);
        let (scope, count) = match target {
            Some(c) => {
                self.anchored[c] = true;
                ("one connected group", self.builder.components()[c].vars.len())
            }
            None => {
                self.anchored.iter_mut().for_each(|a| *a = true);
                ("every cell", self.builder.vars().len())
            }
        };
        self.sink.emit(
            Diagnostic::new(
                codes::DEGENERATE_SYSTEM,
                format!("solver reported a degenerate system; anchored {scope} ({count} unknowns) and retried"),
            )
            .with_note(err.to_string()),
        );
    }

    fn pass(&mut self, snapshots: &mut dyn SnapshotSink) -> Result<(), PlaceError> {
        self.iteration += 1;

        let mut attempt = 0;
        let (x, y) = loop {
            match self.solve_both() {
                (Ok(x), Ok(y)) => break (x, y),
                (Err(err), _) | (_, Err(err)) => {
                    attempt += 1;
                    if attempt > 2 {
                        return Err(InternalError::new(format!(
                            "linear system still degenerate after anchoring every cell: {err}"
                        ))
                        .into());
                    }
                    self.anchor_after_failure(&err, attempt);
                }
            }
        };
        let ((x, sx), (y, sy)) = (x, y);
        if (!sx.converged || !sy.converged) && !self.step_cap_reported {
            self.step_cap_reported = true;
            self.sink.emit(
                Diagnostic::new(
                    codes::SOLVER_STEP_CAP,
                    format!(
                        "linear solve hit the {}-step cap before reaching tolerance",
                        self.solver.max_steps
                    ),
                )
                .with_note(format!("first seen at pass {}", self.iteration))
                .with_help("raise solver.max_steps or loosen solver.tolerance"),
            );
        }
        self.coords = [x, y];

        let previous = self.placement.clone();
        let vars = self.builder.vars();
        for var in 0..vars.cell_vars() {
            if let Some(cell) = vars.var_cell(var) {
                self.placement
                    .set(cell, Point::new(self.coords[0][var], self.coords[1][var]));
            }
        }
        self.boundary.enforce(self.netlist, &mut self.placement);
        self.load_coords();
        for (slot, axis) in Axis::ALL.into_iter().enumerate() {
            self.soft_springs[slot] =
                self.boundary.soft_springs(self.netlist, self.builder.vars(), &self.placement, axis);
        }

        let displacement = previous.max_displacement(self.netlist, &self.placement);
        let reported = self.placement();
        let record = PassRecord {
            iteration: self.iteration,
            max_displacement: displacement,
            objective: quadratic_objective(self.netlist, &reported),
            hpwl: total_hpwl(self.netlist, &reported),
            solver_steps: [sx.steps, sy.steps],
        };
        log::debug!(
            "pass {}: displacement {:.3e}, objective {:.6}, hpwl {:.4}, cg steps {}/{}",
            record.iteration,
            record.max_displacement,
            record.objective,
            record.hpwl,
            sx.steps,
            sy.steps
        );
        self.history.push(record);

        let run = &self.config.run;
        if displacement < run.convergence_threshold * self.core.diagonal() {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        if self.streak >= run.convergence_streak {
            self.state = PlacerState::Converged;
        } else if self.iteration >= run.max_iterations {
            self.state = PlacerState::IterationBudgetExhausted;
            self.sink.emit(
                Diagnostic::new(
                    codes::NON_CONVERGENCE,
                    format!(
                        "did not converge within {} passes; returning the last placement",
                        run.max_iterations
                    ),
                )
                .with_note(format!("last max displacement was {displacement:.3e}")),
            );
        }

        let terminal = self.state.is_terminal();
        if terminal || run.snapshot_cadence.records(self.iteration) {
            snapshots.record(Snapshot::capture(
                self.iteration,
                SnapshotStage::Quadratic,
                self.core,
                &reported,
            ));
        }
        if terminal {
            log::info!(
                "placement finished after {} passes: {:?}",
                self.iteration,
                self.state
            );
            self.finish(reported, snapshots);
        }
        Ok(())
    }

    fn finish(&mut self, mut placement: Placement, snapshots: &mut dyn SnapshotSink) {
        let Some(spreader) = &self.spreader else {
            return;
        };
        let before = total_hpwl(self.netlist, &placement);
        spreader.spread(self.netlist, &self.core, &mut placement);
        self.boundary.clamp(self.netlist, &mut placement);
        let after = total_hpwl(self.netlist, &placement);
        self.sink.emit(Diagnostic::new(
            codes::SPREADING_APPLIED,
            format!(
                "applied {} spreading; weighted HPWL {:.4} -> {:.4}",
                spreader.name(),
                before,
                after
            ),
        ));
        snapshots.record(Snapshot::capture(
            self.iteration,
            SnapshotStage::Spread,
            self.core,
            &placement,
        ));
        self.placement = placement;
    }
}
