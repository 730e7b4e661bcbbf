//! Roll simulation core.
//!
//! Owns every piece of simulation state: the cumulative print distance, the
//! growing roll length, the spawn countdown and the defect list. The advance
//! step is plain synchronous arithmetic so tests can drive it directly; the
//! real 3-second cadence lives in the worker task in `main.rs`.

use chrono::NaiveTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{DefectKind, DefectOrigin, DefectRecord, DefectStatus, Severity};

/// Forward travel per tick, in meters (10 cm)
pub const STEP_METERS: f64 = 0.1;
/// Travel ceiling; crossing it resets the simulation epoch
pub const MAX_SIMULATION_METERS: f64 = 80.0;
/// Roll length at the start of an epoch
pub const INITIAL_ROLL_METERS: f64 = 50.0;
/// The roll always extends at least this far past the print head
pub const ROLL_LOOKAHEAD_METERS: f64 = 50.0;
/// Spawn countdown is re-randomized into this range after each spawn
pub const SPAWN_MIN_METERS: f64 = 6.0;
pub const SPAWN_MAX_METERS: f64 = 8.0;

const LATERAL_MIN_PERCENT: f64 = 10.0;
const LATERAL_MAX_PERCENT: f64 = 90.0;

/// Spawn weights for defect categories
const KIND_WEIGHTS: &[(DefectKind, f64)] = &[
    (DefectKind::Banding, 0.22),
    (DefectKind::Smears, 0.16),
    (DefectKind::Grain, 0.12),
    (DefectKind::InkDrop, 0.10),
    (DefectKind::Scratch, 0.08),
    (DefectKind::Misregistration, 0.07),
    (DefectKind::NozzleDropout, 0.06),
    (DefectKind::HeadStrike, 0.05),
    (DefectKind::MediaCrease, 0.04),
    (DefectKind::GradientStepping, 0.04),
    (DefectKind::SubstrateContamination, 0.03),
    (DefectKind::InkAdhesion, 0.02),
    (DefectKind::Registration, 0.01),
];

/// Spawn weights for severities
const SEVERITY_WEIGHTS: &[(Severity, f64)] = &[
    (Severity::Low, 0.30),
    (Severity::Medium, 0.45),
    (Severity::High, 0.20),
    (Severity::Critical, 0.05),
];

/// What a single advance step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Normal forward travel; carries the id of a newly spawned defect, if any
    Advanced { spawned: Option<u32> },
    /// Travel ceiling was crossed; the epoch was reset to its seed state
    Reset,
}

/// Commands sent from the UI to the clock worker
#[derive(Debug, Clone, Copy)]
pub enum SimCommand {
    /// Arm or disarm the tick timer (printing state changed)
    SetRunning(bool),
    /// Terminate the worker
    Shutdown,
}

/// Messages sent from the clock worker to the UI
#[derive(Debug, Clone, Copy)]
pub enum SimMessage {
    /// One tick period elapsed while the clock was armed
    Tick,
}

/// The explicit simulation context: all roll state in one place
#[derive(Debug, Clone)]
pub struct RollSimulation {
    distance_meters: f64,
    total_roll_meters: f64,
    spawn_countdown_meters: f64,
    /// Countdown value drawn at construction, restored on epoch reset
    initial_countdown_meters: f64,
    defects: Vec<DefectRecord>,
    next_id: u32,
    rng: StdRng,
}

impl RollSimulation {
    /// Create a simulation seeded for reproducible spawn sequences
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let countdown = rng.gen_range(SPAWN_MIN_METERS..SPAWN_MAX_METERS);
        let defects = seed_defects();
        let next_id = defects.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        Self {
            distance_meters: 0.0,
            total_roll_meters: INITIAL_ROLL_METERS,
            spawn_countdown_meters: countdown,
            initial_countdown_meters: countdown,
            defects,
            next_id,
            rng,
        }
    }

    /// Cumulative forward travel of the print head this epoch
    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    /// Current roll length used for layout sizing
    pub fn total_roll_meters(&self) -> f64 {
        self.total_roll_meters
    }

    /// Read-only snapshot of every defect record
    pub fn defects(&self) -> &[DefectRecord] {
        &self.defects
    }

    pub fn defect(&self, id: u32) -> Option<&DefectRecord> {
        self.defects.iter().find(|d| d.id == id)
    }

    /// Defects still awaiting operator action
    pub fn active_defects(&self) -> impl Iterator<Item = &DefectRecord> {
        self.defects.iter().filter(|d| d.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active_defects().count()
    }

    /// Sum of waste cost over active defects, for the top bar
    pub fn total_waste_cost(&self) -> f64 {
        self.active_defects()
            .filter_map(|d| d.waste_cost)
            .sum()
    }

    /// Sum of wasted length over active defects, for the waste report
    pub fn total_waste_meters(&self) -> f64 {
        self.active_defects()
            .filter_map(|d| d.waste_meters)
            .sum()
    }

    /// Advance the simulation by one tick.
    ///
    /// `now` stamps any defect spawned this tick; passing it in keeps the
    /// step free of wall-clock reads so tests can pin the time.
    pub fn advance(&mut self, now: NaiveTime) -> TickOutcome {
        let new_distance = self.distance_meters + STEP_METERS;

        if new_distance > MAX_SIMULATION_METERS {
            self.reset_epoch();
            return TickOutcome::Reset;
        }

        for defect in &mut self.defects {
            defect.position_meters = round2(defect.position_meters + STEP_METERS);
        }
        self.distance_meters = new_distance;
        self.total_roll_meters = self
            .total_roll_meters
            .max(new_distance + ROLL_LOOKAHEAD_METERS);

        self.spawn_countdown_meters -= STEP_METERS;
        let spawned = if self.spawn_countdown_meters <= 0.0 {
            let id = self.spawn_defect(now);
            self.spawn_countdown_meters = self.rng.gen_range(SPAWN_MIN_METERS..SPAWN_MAX_METERS);
            Some(id)
        } else {
            None
        };

        TickOutcome::Advanced { spawned }
    }

    /// Hard epoch boundary: no partial state survives
    fn reset_epoch(&mut self) {
        self.defects = seed_defects();
        self.distance_meters = 0.0;
        self.total_roll_meters = INITIAL_ROLL_METERS;
        self.spawn_countdown_meters = self.initial_countdown_meters;
        self.next_id = self.defects.iter().map(|d| d.id).max().unwrap_or(0) + 1;
    }

    /// Synthesize one defect at the print head
    fn spawn_defect(&mut self, now: NaiveTime) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let kind = weighted_choice(&mut self.rng, KIND_WEIGHTS);
        let severity = weighted_choice(&mut self.rng, SEVERITY_WEIGHTS);
        let lateral = self
            .rng
            .gen_range(LATERAL_MIN_PERCENT..LATERAL_MAX_PERCENT);

        let delta_e = if self.rng.gen_bool(0.5) {
            Some(round1(self.rng.gen_range(1.0..8.0)))
        } else {
            None
        };
        let (waste_cost, waste_meters) = if self.rng.gen_bool(0.7) {
            (
                Some(round2(self.rng.gen_range(4.0..60.0))),
                Some(round1(self.rng.gen_range(0.3..2.5))),
            )
        } else {
            (None, None)
        };
        let origin = if self.rng.gen_bool(0.85) {
            DefectOrigin::Machine
        } else {
            DefectOrigin::File
        };

        self.defects.push(DefectRecord {
            id,
            kind,
            severity,
            detected_at: now.format("%H:%M").to_string(),
            position_meters: 0.0,
            lateral_percent: lateral,
            status: DefectStatus::Active,
            origin,
            delta_e,
            waste_cost,
            waste_meters,
            dismiss_reason: None,
            operator_id: None,
        });
        id
    }

    // ============================================
    // Operator actions
    // ============================================

    /// Mark a defect dismissed. Unknown ids are a no-op; repeating the call
    /// keeps the record dismissed with the latest reason (last write wins).
    pub fn dismiss(&mut self, id: u32, reason: &str, operator_id: &str) {
        if let Some(defect) = self.defects.iter_mut().find(|d| d.id == id) {
            defect.status = DefectStatus::Dismissed;
            defect.dismiss_reason = Some(reason.to_string());
            defect.operator_id = Some(operator_id.to_string());
        }
    }

    /// Return a dismissed defect to the active list
    pub fn restore(&mut self, id: u32) {
        if let Some(defect) = self.defects.iter_mut().find(|d| d.id == id) {
            defect.status = DefectStatus::Active;
            defect.dismiss_reason = None;
            defect.operator_id = None;
        }
    }

    /// Mark a defect reported
    pub fn report(&mut self, id: u32) {
        if let Some(defect) = self.defects.iter_mut().find(|d| d.id == id) {
            defect.status = DefectStatus::Reported;
        }
    }
}

/// Round to 2 decimals to keep positions stable for display
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Draw from a weighted table
fn weighted_choice<T: Copy>(rng: &mut StdRng, table: &[(T, f64)]) -> T {
    let total: f64 = table.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0.0..total);
    for (value, weight) in table {
        if roll < *weight {
            return *value;
        }
        roll -= weight;
    }
    table[table.len() - 1].0
}

/// The defect set every epoch starts from
fn seed_defects() -> Vec<DefectRecord> {
    let seed = |id: u32,
                kind: DefectKind,
                severity: Severity,
                detected_at: &str,
                position_meters: f64,
                lateral_percent: f64,
                delta_e: Option<f64>,
                waste_cost: Option<f64>,
                waste_meters: Option<f64>| DefectRecord {
        id,
        kind,
        severity,
        detected_at: detected_at.to_string(),
        position_meters,
        lateral_percent,
        status: DefectStatus::Active,
        origin: DefectOrigin::Machine,
        delta_e,
        waste_cost,
        waste_meters,
        dismiss_reason: None,
        operator_id: None,
    };

    vec![
        seed(1, DefectKind::Banding, Severity::Medium, "10:32", 38.0, 20.0, Some(2.8), Some(12.0), Some(0.8)),
        seed(2, DefectKind::Smears, Severity::Medium, "10:02", 28.0, 65.0, None, Some(9.5), Some(0.6)),
        seed(3, DefectKind::Banding, Severity::High, "09:53", 22.0, 40.0, Some(4.2), Some(18.5), Some(1.2)),
        seed(4, DefectKind::Grain, Severity::Medium, "09:42", 15.0, 80.0, None, None, None),
        seed(5, DefectKind::Smears, Severity::Medium, "09:12", 5.0, 30.0, None, Some(7.0), Some(0.4)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_advance_moves_distance_and_defects() {
        let mut sim = RollSimulation::new(42);
        let before: Vec<f64> = sim.defects().iter().map(|d| d.position_meters).collect();

        let outcome = sim.advance(noon());
        assert!(matches!(outcome, TickOutcome::Advanced { .. }));
        assert!((sim.distance_meters() - STEP_METERS).abs() < 1e-9);

        for (defect, old) in sim.defects().iter().zip(before) {
            assert!((defect.position_meters - round2(old + STEP_METERS)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distance_increases_step_per_tick() {
        let mut sim = RollSimulation::new(1);
        for i in 1..=50 {
            sim.advance(noon());
            assert!((sim.distance_meters() - round2(i as f64 * STEP_METERS)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_roll_length_keeps_lookahead() {
        let mut sim = RollSimulation::new(1);
        sim.advance(noon());
        assert!(
            (sim.total_roll_meters() - (sim.distance_meters() + ROLL_LOOKAHEAD_METERS)).abs()
                < 1e-9
        );

        // The margin holds through sustained travel, and the roll never shrinks
        let mut previous = sim.total_roll_meters();
        for _ in 0..200 {
            sim.advance(noon());
            assert!(sim.total_roll_meters() >= previous);
            previous = sim.total_roll_meters();
        }
        assert!(sim.total_roll_meters() >= sim.distance_meters() + ROLL_LOOKAHEAD_METERS - 1e-9);
    }

    #[test]
    fn test_reset_restores_seed_state() {
        let mut sim = RollSimulation::new(7);
        let seed_set = seed_defects();

        // Around 800 ticks the accumulated distance crosses the 80m ceiling
        let mut outcome = TickOutcome::Advanced { spawned: None };
        for _ in 0..801 {
            outcome = sim.advance(noon());
            if outcome == TickOutcome::Reset {
                break;
            }
        }
        assert_eq!(outcome, TickOutcome::Reset);
        assert_eq!(sim.distance_meters(), 0.0);
        assert_eq!(sim.total_roll_meters(), INITIAL_ROLL_METERS);
        assert_eq!(sim.defects().len(), seed_set.len());
        for (defect, seed) in sim.defects().iter().zip(&seed_set) {
            assert_eq!(defect.id, seed.id);
            assert_eq!(defect.kind, seed.kind);
            assert_eq!(defect.status, DefectStatus::Active);
            assert!((defect.position_meters - seed.position_meters).abs() < 1e-9);
        }

        // Id counter restarts with the epoch
        let first_spawn = loop {
            if let TickOutcome::Advanced { spawned: Some(id) } = sim.advance(noon()) {
                break id;
            }
        };
        assert_eq!(first_spawn, 6);
    }

    #[test]
    fn test_spawn_countdown_window() {
        let mut sim = RollSimulation::new(99);
        let countdown = sim.spawn_countdown_meters;
        assert!((SPAWN_MIN_METERS..SPAWN_MAX_METERS).contains(&countdown));

        // Mirror the decrement arithmetic to find the tick where the
        // countdown first reaches zero; exactly one spawn may land there.
        let mut remaining = countdown;
        let mut expected_tick = 0;
        while remaining > 0.0 {
            remaining -= STEP_METERS;
            expected_tick += 1;
        }
        let mut spawn_tick = None;
        for tick in 1..=expected_tick {
            if let TickOutcome::Advanced { spawned: Some(_) } = sim.advance(noon()) {
                assert!(spawn_tick.is_none(), "double spawn in one window");
                spawn_tick = Some(tick);
            }
        }
        assert_eq!(spawn_tick, Some(expected_tick));
        assert!((SPAWN_MIN_METERS..SPAWN_MAX_METERS).contains(&sim.spawn_countdown_meters));
    }

    #[test]
    fn test_spawned_defect_shape() {
        let mut sim = RollSimulation::new(5);
        let id = loop {
            if let TickOutcome::Advanced { spawned: Some(id) } = sim.advance(noon()) {
                break id;
            }
        };
        let defect = sim.defect(id).unwrap();
        assert_eq!(defect.position_meters, 0.0);
        assert!((10.0..90.0).contains(&defect.lateral_percent));
        assert_eq!(defect.status, DefectStatus::Active);
        assert_eq!(defect.detected_at, "12:00");
        assert_eq!(id, 6);
    }

    #[test]
    fn test_same_seed_same_spawn_sequence() {
        let mut a = RollSimulation::new(1234);
        let mut b = RollSimulation::new(1234);
        for _ in 0..300 {
            a.advance(noon());
            b.advance(noon());
        }
        assert_eq!(a.defects().len(), b.defects().len());
        for (da, db) in a.defects().iter().zip(b.defects()) {
            assert_eq!(da.id, db.id);
            assert_eq!(da.kind, db.kind);
            assert_eq!(da.severity, db.severity);
            assert!((da.lateral_percent - db.lateral_percent).abs() < 1e-12);
        }
    }

    #[test]
    fn test_dismiss_is_idempotent_last_write_wins() {
        let mut sim = RollSimulation::new(1);
        sim.dismiss(3, "False positive", "OP-001");
        sim.dismiss(3, "Test pattern", "OP-002");

        let defect = sim.defect(3).unwrap();
        assert_eq!(defect.status, DefectStatus::Dismissed);
        assert_eq!(defect.dismiss_reason.as_deref(), Some("Test pattern"));
        assert_eq!(defect.operator_id.as_deref(), Some("OP-002"));
    }

    #[test]
    fn test_unknown_id_transitions_are_noops() {
        let mut sim = RollSimulation::new(1);
        let before = sim.defects().to_vec();
        sim.dismiss(999, "whatever", "OP-001");
        sim.restore(999);
        sim.report(999);
        assert_eq!(sim.defects().len(), before.len());
        for (defect, old) in sim.defects().iter().zip(&before) {
            assert_eq!(defect.status, old.status);
        }
    }

    #[test]
    fn test_restore_clears_dismissal() {
        let mut sim = RollSimulation::new(1);
        sim.dismiss(2, "Smudge on camera", "ADMIN");
        sim.restore(2);

        let defect = sim.defect(2).unwrap();
        assert_eq!(defect.status, DefectStatus::Active);
        assert!(defect.dismiss_reason.is_none());
        assert!(defect.operator_id.is_none());
    }

    #[test]
    fn test_report_and_waste_totals() {
        let mut sim = RollSimulation::new(1);
        let all_cost: f64 = sim.defects().iter().filter_map(|d| d.waste_cost).sum();
        assert!((sim.total_waste_cost() - all_cost).abs() < 1e-9);

        // Reporting removes a defect's cost from the active total
        sim.report(3);
        assert!((sim.total_waste_cost() - (all_cost - 18.5)).abs() < 1e-9);
        assert_eq!(sim.active_count(), 4);
    }
}
