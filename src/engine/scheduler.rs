//! Round scheduling and execution.
//!
//! One call to [`Scheduler::process_round`] runs a **round**: every tier of a
//! [`SystemRegistry`] exactly once, in ascending priority.
//!
//! ## Tier model
//!
//! Each tier goes through two phases:
//! * **observe**: every system of the tier runs, in insertion order, against
//!   the same shared database. Because systems only see `&EntityComponentDatabase`,
//!   no system of a tier can observe another's effects. The returned action
//!   lists are concatenated in system order.
//! * **apply**: the concatenated actions are applied strictly in order. Each
//!   action sees the effects of those before it.
//!
//! The next tier observes the state left by the previous tier's actions.
//!
//! ## Failure handling
//!
//! What happens when an action fails is governed by [`FailurePolicy`]:
//! * [`FailurePolicy::Abort`] (default) stops the round at the first failing
//!   action and returns [`ExecutionError::ActionFailed`]. Actions applied
//!   before it stay applied; nothing is rolled back.
//! * [`FailurePolicy::Continue`] logs the failure at `warn`, counts it in the
//!   [`RoundReport`] and carries on.
//!
//! ## Parallel observation
//!
//! With the `parallel` feature, [`Scheduler::process_round_parallel`] runs the
//! observe phase of each tier on the rayon pool. Results are collected in
//! system order, so the applied action sequence is identical to the
//! sequential path.

use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::engine::commands::Action;
use crate::engine::component::Component;
use crate::engine::database::EntityComponentDatabase;
use crate::engine::error::{ECSResult, ExecutionError};
use crate::engine::systems::{System, SystemRegistry};
use crate::engine::types::SystemPriority;
use crate::profiling::profiler;


/// What to do when an action fails during a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FailurePolicy {
    /// Stop the round and report the failure.
    #[default]
    Abort,

    /// Log the failure, count it and keep going.
    Continue,
}

/// Scheduler configuration.
///
/// ## Fields
/// * `failure_policy` — Reaction to a failing action.
/// * `reserve_actions` — Initial capacity of each tier's action buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Reaction to a failing action.
    pub failure_policy: FailurePolicy,

    /// Initial capacity of each tier's action buffer.
    pub reserve_actions: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { failure_policy: FailurePolicy::Abort, reserve_actions: 64 }
    }
}

/// Summary of one completed round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// Tiers visited.
    pub tiers: usize,

    /// Systems run across all tiers.
    pub systems_run: usize,

    /// Actions applied successfully.
    pub actions_applied: usize,

    /// Actions that failed under [`FailurePolicy::Continue`].
    pub failed_actions: usize,

    /// Wall-clock time of the round.
    pub elapsed: Duration,
}

/// Drives rounds over a database and a systems registry.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    /// Creates a scheduler with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Runs one round.
    ///
    /// `run_system` produces a system's actions from a shared view of the
    /// database; `apply_action` applies one action. Both are supplied by the
    /// caller, so `S` and `A` can be any application types.
    ///
    /// ## Errors
    /// [`ExecutionError::ActionFailed`] under [`FailurePolicy::Abort`]. The
    /// database keeps every change made before the failing action.
    pub fn process_round<C, S, A, R, P>(
        &self,
        database: &mut EntityComponentDatabase<C>,
        registry: &SystemRegistry<S>,
        mut run_system: R,
        apply_action: P,
    ) -> Result<RoundReport, ExecutionError>
    where
        C: Component,
        R: FnMut(&EntityComponentDatabase<C>, &S) -> Vec<A>,
        P: FnMut(&mut EntityComponentDatabase<C>, A) -> ECSResult<()>,
    {
        let reserve = self.config.reserve_actions;
        self.drive(
            database,
            registry,
            |database, priority, systems| {
                let mut actions = Vec::with_capacity(reserve);
                for (index, system) in systems.iter().enumerate() {
                    let produced = run_system(database, system);
                    log::trace!(
                        "tier {priority} system {index} produced {} actions",
                        produced.len()
                    );
                    actions.extend(produced);
                }
                actions
            },
            apply_action,
        )
    }

    /// Runs one round of [`System`]s whose actions implement [`Action`].
    pub fn run<C, S, A>(
        &self,
        database: &mut EntityComponentDatabase<C>,
        registry: &SystemRegistry<S>,
    ) -> Result<RoundReport, ExecutionError>
    where
        C: Component,
        S: System<C, A>,
        A: Action<C>,
    {
        self.process_round(
            database,
            registry,
            |database, system| {
                log::trace!("running system {}", system.name());
                system.run(database)
            },
            |database, action| action.apply(database),
        )
    }

    /// Runs `rounds` consecutive rounds with [`Scheduler::run`].
    ///
    /// Stops at the first failing round.
    pub fn run_rounds<C, S, A>(
        &self,
        rounds: usize,
        database: &mut EntityComponentDatabase<C>,
        registry: &SystemRegistry<S>,
    ) -> Result<Vec<RoundReport>, ExecutionError>
    where
        C: Component,
        S: System<C, A>,
        A: Action<C>,
    {
        (0..rounds).map(|_| self.run(database, registry)).collect()
    }

    /// Like [`Scheduler::process_round`], but runs each tier's observe phase
    /// on the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn process_round_parallel<C, S, A, R, P>(
        &self,
        database: &mut EntityComponentDatabase<C>,
        registry: &SystemRegistry<S>,
        run_system: R,
        apply_action: P,
    ) -> Result<RoundReport, ExecutionError>
    where
        C: Component + Sync,
        S: Sync,
        A: Send,
        R: Fn(&EntityComponentDatabase<C>, &S) -> Vec<A> + Sync,
        P: FnMut(&mut EntityComponentDatabase<C>, A) -> ECSResult<()>,
    {
        let reserve = self.config.reserve_actions;
        self.drive(
            database,
            registry,
            |database, _priority, systems| {
                let produced: Vec<Vec<A>> = systems
                    .par_iter()
                    .map(|system| run_system(database, system))
                    .collect();

                let mut actions = Vec::with_capacity(reserve);
                actions.extend(produced.into_iter().flatten());
                actions
            },
            apply_action,
        )
    }

    /// Parallel counterpart of [`Scheduler::run`].
    #[cfg(feature = "parallel")]
    pub fn run_parallel<C, S, A>(
        &self,
        database: &mut EntityComponentDatabase<C>,
        registry: &SystemRegistry<S>,
    ) -> Result<RoundReport, ExecutionError>
    where
        C: Component + Sync,
        S: System<C, A> + Sync,
        A: Action<C> + Send,
    {
        self.process_round_parallel(
            database,
            registry,
            |database, system| system.run(database),
            |database, action| action.apply(database),
        )
    }

    fn drive<C, S, A, O, P>(
        &self,
        database: &mut EntityComponentDatabase<C>,
        registry: &SystemRegistry<S>,
        mut observe: O,
        mut apply_action: P,
    ) -> Result<RoundReport, ExecutionError>
    where
        C: Component,
        O: FnMut(&EntityComponentDatabase<C>, SystemPriority, &[S]) -> Vec<A>,
        P: FnMut(&mut EntityComponentDatabase<C>, A) -> ECSResult<()>,
    {
        let _round = profiler::span("Scheduler::round")
            .arg("entities", profiler::Arg::U64(database.size() as u64));
        let start = Instant::now();
        let mut report = RoundReport::default();

        for (priority, systems) in registry.tiers() {
            let _tier = profiler::span("Scheduler::tier")
                .arg("priority", profiler::Arg::I64(i64::from(priority)));

            let actions = observe(&*database, priority, systems);
            report.systems_run += systems.len();
            log::debug!(
                "tier {priority}: {} systems produced {} actions",
                systems.len(),
                actions.len()
            );

            self.apply_tier(database, priority, actions, &mut apply_action, &mut report)?;
            report.tiers += 1;
        }

        report.elapsed = start.elapsed();
        log::debug!(
            "round complete: {} tiers, {} actions applied, {} failed, {} entities",
            report.tiers,
            report.actions_applied,
            report.failed_actions,
            database.size()
        );
        Ok(report)
    }

    fn apply_tier<C, A, P>(
        &self,
        database: &mut EntityComponentDatabase<C>,
        priority: SystemPriority,
        actions: Vec<A>,
        apply_action: &mut P,
        report: &mut RoundReport,
    ) -> Result<(), ExecutionError>
    where
        C: Component,
        P: FnMut(&mut EntityComponentDatabase<C>, A) -> ECSResult<()>,
    {
        for (index, action) in actions.into_iter().enumerate() {
            match apply_action(database, action) {
                Ok(()) => report.actions_applied += 1,
                Err(source) => match self.config.failure_policy {
                    FailurePolicy::Abort => {
                        log::debug!("tier {priority} action {index} failed, aborting round: {source}");
                        return Err(ExecutionError::ActionFailed { priority, index, source });
                    }
                    FailurePolicy::Continue => {
                        log::warn!("tier {priority} action {index} skipped: {source}");
                        report.failed_actions += 1;
                    }
                },
            }
        }
        Ok(())
    }
}
