pub mod aggregator;
pub mod cache;
pub mod classifier;
pub mod clock;
pub mod logical_day;
pub mod notifier;
pub mod provisioner;
pub mod reconciler;
#[cfg(test)]
mod reconciler_tests;
pub mod rules;
pub mod sync;
