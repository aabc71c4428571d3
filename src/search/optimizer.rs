//! The greedy placement loop
//!
//! One [`PlacementSearch`] serves every ordering of a run: it borrows the
//! parcel, configuration, solar evaluator and anchor grid, and holds no
//! mutable state of its own. Each [`PlacementSearch::run`] owns its layout
//! and budget, so orderings can run concurrently.

use super::budget::BudgetTracker;
use super::candidates::{self, AnchorGrid, Candidate};
use super::ordering::OrderingStrategy;
use crate::core::config::EngineConfig;
use crate::geometry::bounds::rectangle;
use crate::geometry::ops::polygon_within;
use crate::layout::{InfeasibleStructure, Layout, Placement};
use crate::parcel::Parcel;
use crate::solar::SolarEvaluator;
use crate::structures::StructureSpec;
use crate::validation::{ConstraintValidator, RejectionKind};
use ahash::AHashMap;
use geo::{Area, BooleanOps, MultiPolygon};
use rayon::prelude::*;
use std::cmp::Reverse;
use tracing::{debug, info};

/// A candidate that passed validation, with its score
#[derive(Debug, Clone)]
struct Scored {
    placement: Placement,
    /// Buildable area taken by the footprint plus its clearance halo
    consumed: f64,
}

/// What happened to one structure
enum Outcome {
    Placed {
        scored: Scored,
        rejected: usize,
        /// Candidates of this structure were left unevaluated
        truncated: bool,
    },
    Infeasible {
        reason: RejectionKind,
        rejected: usize,
    },
}

/// Rejection counts for one structure
#[derive(Debug, Default)]
struct RejectionTally {
    counts: AHashMap<RejectionKind, usize>,
    total: usize,
}

impl RejectionTally {
    fn record(&mut self, kind: RejectionKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
        self.total += 1;
    }

    /// Most frequent kind; ties go to the kind checked first
    fn dominant(&self) -> Option<RejectionKind> {
        self.counts
            .iter()
            .max_by_key(|(kind, count)| (**count, Reverse(**kind)))
            .map(|(kind, _)| *kind)
    }
}

/// Greedy search over one parcel
pub struct PlacementSearch<'a> {
    parcel: &'a Parcel,
    config: &'a EngineConfig,
    solar: &'a SolarEvaluator,
    grid: &'a AnchorGrid,
    validator: ConstraintValidator<'a>,
}

impl<'a> PlacementSearch<'a> {
    pub fn new(
        parcel: &'a Parcel,
        config: &'a EngineConfig,
        solar: &'a SolarEvaluator,
        grid: &'a AnchorGrid,
    ) -> Self {
        Self {
            parcel,
            config,
            solar,
            grid,
            validator: ConstraintValidator::new(parcel, config),
        }
    }

    /// Place `specs` in the order chosen by `strategy`
    ///
    /// Never fails: structures that cannot be placed are recorded on the
    /// layout with their dominant rejection reason.
    pub fn run(&self, specs: &[StructureSpec], strategy: &dyn OrderingStrategy, generation: usize) -> Layout {
        let order = strategy.order(specs);
        let mut layout = Layout::new(strategy.name(), generation, specs.len());
        let mut tracker = BudgetTracker::start(self.config.budget);
        let mut committed_consumed = 0.0;
        let tol = self.parcel.tolerance();

        for &index in &order {
            let spec = &specs[index];

            if spec.min_area() > self.parcel.buildable_area() + tol.area_eps() {
                debug!(
                    spec = %spec.id,
                    min_area = spec.min_area(),
                    buildable_area = self.parcel.buildable_area(),
                    "Minimum footprint exceeds buildable area"
                );
                layout.infeasible.push(InfeasibleStructure {
                    spec_id: spec.id.clone(),
                    reason: RejectionKind::FootprintExceedsBuildableArea,
                    rejected_candidates: 0,
                    mandatory: spec.mandatory,
                });
                continue;
            }

            if tracker.is_exhausted() {
                layout.budget_truncated = true;
                layout.infeasible.push(InfeasibleStructure {
                    spec_id: spec.id.clone(),
                    reason: RejectionKind::BudgetExhausted,
                    rejected_candidates: 0,
                    mandatory: spec.mandatory,
                });
                continue;
            }

            match self.place(spec, &layout.placements, committed_consumed, &mut tracker) {
                Outcome::Placed {
                    scored,
                    rejected,
                    truncated,
                } => {
                    debug!(
                        spec = %spec.id,
                        x = scored.placement.anchor[0],
                        y = scored.placement.anchor[1],
                        rotation = scored.placement.rotation_deg,
                        width = scored.placement.width,
                        depth = scored.placement.depth,
                        score = scored.placement.candidate_score,
                        rejected,
                        truncated,
                        "Committed placement"
                    );
                    layout.budget_truncated |= truncated;
                    committed_consumed += scored.consumed;
                    layout.placements.push(scored.placement);
                }
                Outcome::Infeasible { reason, rejected } => {
                    debug!(spec = %spec.id, ?reason, rejected, "Structure infeasible");
                    if reason == RejectionKind::BudgetExhausted {
                        layout.budget_truncated = true;
                    }
                    layout.infeasible.push(InfeasibleStructure {
                        spec_id: spec.id.clone(),
                        reason,
                        rejected_candidates: rejected,
                        mandatory: spec.mandatory,
                    });
                }
            }
        }

        layout.candidates_evaluated = tracker.evaluated();
        layout.summarize(self.parcel);
        self.annotate(&mut layout);

        debug_assert!(
            layout.verify(self.parcel, self.config).is_ok(),
            "search committed an invalid layout"
        );

        info!(
            ordering = %layout.ordering,
            placed = layout.placements.len(),
            requested = layout.requested,
            candidates = layout.candidates_evaluated,
            truncated = layout.budget_truncated,
            elapsed_ms = tracker.elapsed().as_millis() as u64,
            "Ordering complete"
        );

        layout
    }

    /// Try size tiers largest first; the first tier with any valid candidate
    /// is committed
    fn place(
        &self,
        spec: &StructureSpec,
        committed: &[Placement],
        committed_consumed: f64,
        tracker: &mut BudgetTracker,
    ) -> Outcome {
        let mut tally = RejectionTally::default();
        let mut generated = 0;

        for (width, depth) in spec.size_tiers() {
            let candidates =
                candidates::generate(spec, self.parcel, self.grid, width, depth, self.config);
            generated += candidates.len();

            let mut best: Option<Scored> = None;
            let mut truncated = false;

            for chunk in candidates.chunks(self.config.chunk_size.max(1)) {
                // Anything left once the budget is spent was skipped
                if tracker.is_exhausted() {
                    truncated = true;
                    break;
                }
                let allowed = tracker
                    .remaining_candidates()
                    .map_or(chunk.len(), |remaining| chunk.len().min(remaining));
                truncated = allowed < chunk.len();
                let chunk = &chunk[..allowed];

                let evaluate = |candidate: &Candidate| {
                    self.evaluate(spec, candidate, width, depth, committed, committed_consumed)
                };
                // Collecting keeps candidate order, so the reduction below
                // is identical on either path
                let results: Vec<Result<Scored, RejectionKind>> =
                    if chunk.len() >= self.config.parallel_threshold {
                        chunk.par_iter().map(evaluate).collect()
                    } else {
                        chunk.iter().map(evaluate).collect()
                    };
                tracker.charge(chunk.len());

                for result in results {
                    match result {
                        Ok(scored) => {
                            let better = best.as_ref().map_or(true, |b| {
                                scored.placement.candidate_score > b.placement.candidate_score
                            });
                            if better {
                                best = Some(scored);
                            }
                        }
                        Err(kind) => tally.record(kind),
                    }
                }

                if truncated {
                    break;
                }
            }

            if let Some(scored) = best {
                return Outcome::Placed {
                    scored,
                    rejected: tally.total,
                    truncated,
                };
            }
            if truncated {
                return Outcome::Infeasible {
                    reason: RejectionKind::BudgetExhausted,
                    rejected: tally.total,
                };
            }
        }

        let reason = if generated == 0 {
            RejectionKind::NoCandidates
        } else {
            tally.dominant().unwrap_or(RejectionKind::NoCandidates)
        };
        Outcome::Infeasible {
            reason,
            rejected: tally.total,
        }
    }

    /// Validate and score one candidate
    fn evaluate(
        &self,
        spec: &StructureSpec,
        candidate: &Candidate,
        width: f64,
        depth: f64,
        committed: &[Placement],
        committed_consumed: f64,
    ) -> Result<Scored, RejectionKind> {
        let mut placement = Placement::new(
            spec,
            [candidate.anchor.x, candidate.anchor.y],
            candidate.rotation_deg,
            width,
            depth,
        );
        let verdict = self
            .validator
            .check(&placement, committed)
            .map_err(|rejection| rejection.kind())?;

        placement.solar = self.solar.evaluate(candidate.rotation_deg, width, depth);
        placement.adjacency = verdict.adjacency;

        let consumed = self.halo_area(&placement);
        let buildable = self.parcel.buildable_area();
        let efficiency = ((buildable - committed_consumed - consumed) / buildable).clamp(0.0, 1.0);

        placement.candidate_score = self.config.candidate_weights.combine(
            placement.solar.score,
            placement.adjacency.satisfaction(),
            efficiency,
        );

        Ok(Scored {
            placement,
            consumed,
        })
    }

    /// Buildable area covered by the footprint grown by its structure
    /// clearance
    fn halo_area(&self, placement: &Placement) -> f64 {
        let tol = self.parcel.tolerance();
        let clearance = placement.structure_clearance;
        if tol.is_zero(clearance) {
            return placement.footprint.area();
        }

        let halo = rectangle(
            placement.center(),
            placement.width + 2.0 * clearance,
            placement.depth + 2.0 * clearance,
            placement.rotation_deg,
        );
        if polygon_within(&halo, self.parcel.buildable(), tol) {
            return halo.unsigned_area();
        }
        MultiPolygon::new(vec![halo])
            .intersection(self.parcel.buildable())
            .unsigned_area()
    }

    /// Human-readable notes on the outcome
    fn annotate(&self, layout: &mut Layout) {
        let mut notes = vec![format!(
            "{} placed {} of {} structures",
            layout.ordering,
            layout.placements.len(),
            layout.requested
        )];
        for infeasible in &layout.infeasible {
            notes.push(format!(
                "'{}'{} not placed: {} after {} rejected candidates",
                infeasible.spec_id,
                if infeasible.mandatory { " (mandatory)" } else { "" },
                infeasible.reason,
                infeasible.rejected_candidates
            ));
        }
        for placement in &layout.placements {
            if let Some(shortfall) = placement.adjacency.shortfall() {
                notes.push(format!(
                    "'{}' sits {:.1}m beyond its preferred distance",
                    placement.spec_id, shortfall
                ));
            }
        }
        if layout.budget_truncated {
            notes.push(format!(
                "search budget exhausted after {} candidates",
                layout.candidates_evaluated
            ));
        }
        layout.notes = notes;
    }
}
