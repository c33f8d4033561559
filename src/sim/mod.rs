/// Tick sources: manual stepping and wall-clock intervals.
pub mod clock;
pub mod credits;
pub mod engine;
/// Chart history buffers and down-sampling.
pub mod history;
pub mod kpi;
pub mod perturbation;
pub mod regulatory;
pub mod scheduler;
pub mod snapshot;
pub mod step;
/// Synthetic trend data for illustrative long-period charts.
pub mod synthetic;
pub mod types;
