/// CSV export of history series.
pub mod export;
