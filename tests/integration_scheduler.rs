//! Integration tests for the tokio scheduler.

mod common;

use std::time::Duration;

use plant_sim::config::PlantConfig;
use plant_sim::sim::clock::{IntervalSource, ManualClock};
use plant_sim::sim::regulatory::Jurisdiction;
use plant_sim::sim::scheduler;
use plant_sim::sim::types::Control;

#[tokio::test]
async fn scheduler_matches_direct_run() {
    let config = PlantConfig::kvarken();

    let mut direct = common::noisy_sim(&config);
    let reports = common::run_ticks(&mut direct, 25, 2.0);

    let handle = scheduler::spawn(
        common::noisy_sim(&config),
        ManualClock::new(common::t0(), 2.0, Some(25)),
    );
    let rx = handle.subscribe();
    let summary = handle.join().await.unwrap();

    let published = rx.borrow().clone();
    assert_eq!(summary.ticks, 25);
    assert_eq!(*published, direct.snapshot());
    assert_eq!(
        published.aggregate.total_power_mw,
        reports.last().unwrap().total_power_mw
    );
}

#[tokio::test(start_paused = true)]
async fn every_published_snapshot_is_consistent() {
    let handle = scheduler::spawn(
        common::noisy_sim(&PlantConfig::kvarken()),
        IntervalSource::new(Duration::from_secs(2), Some(40)),
    );
    let mut rx = handle.subscribe();
    let mut seen = 0;
    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        let sum: f64 = snapshot.units.iter().map(|u| u.power_mw).sum();
        let co2: f64 = snapshot.units.iter().map(|u| u.co2_kg_per_s).sum();
        assert!((snapshot.aggregate.total_power_mw - sum).abs() < 1e-9);
        assert!((snapshot.aggregate.total_co2_kg_per_s - co2).abs() < 1e-9);
        assert_eq!(snapshot.history.real_time.len() as u64, snapshot.ticks);
        seen += 1;
    }
    assert!(seen > 0);
    let summary = handle.join().await.unwrap();
    assert_eq!(summary.ticks, 40);
}

#[tokio::test(start_paused = true)]
async fn no_tick_after_shutdown() {
    let handle = scheduler::spawn(
        common::noisy_sim(&PlantConfig::kvarken()),
        IntervalSource::new(Duration::from_secs(2), None),
    );
    let sim = handle.simulation();
    let mut rx = handle.subscribe();
    for _ in 0..3 {
        rx.changed().await.unwrap();
    }

    let summary = handle.shutdown().await.unwrap();
    let ticks_at_shutdown = sim.lock().ticks();
    assert_eq!(summary.ticks, ticks_at_shutdown);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(sim.lock().ticks(), ticks_at_shutdown);
}

#[tokio::test(start_paused = true)]
async fn control_is_applied_by_running_scheduler() {
    let handle = scheduler::spawn(
        common::quiet_sim(&PlantConfig::kvarken()),
        IntervalSource::new(Duration::from_secs(2), None),
    );
    let mut rx = handle.subscribe();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().regulatory.jurisdiction, Jurisdiction::Eu);

    handle.control(Control::SetJurisdiction(Jurisdiction::China));
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().regulatory.jurisdiction, Jurisdiction::China);
    assert!(rx.borrow().regulatory.efficiency.actual > 0.0);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn interval_ticks_accrue_elapsed_time() {
    let handle = scheduler::spawn(
        common::quiet_sim(&PlantConfig::kvarken()),
        IntervalSource::new(Duration::from_secs(2), Some(30)),
    );
    let rx = handle.subscribe();
    let summary = handle.join().await.unwrap();
    // 30 ticks of 2 s = 1 min
    assert!((summary.elapsed_hours - 60.0 / 3600.0).abs() < 1e-6);
    assert!((rx.borrow().aggregate.uptime_hours - (11.6 + 60.0 / 3600.0)).abs() < 1e-6);
}
