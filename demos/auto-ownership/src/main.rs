//! auto-ownership — household car-count demo for the rust_dcm choice engine.
//!
//! A nested work-tour mode model (walk / transit / carpool / drive, with
//! the two motorized modes sharing a nest) feeds its logsum upward into a
//! five-level household auto-ownership model, the classic lower-to-upper
//! link of a travel model system.  Scale comment: the 400 synthetic
//! households stand in for a regional population of ~1.5 M; swap in a real
//! survey file and skim-based travel times for the production system.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use dcm_core::{CoefficientSet, LocationId, Purpose, TimeWindow, UnitId};
use dcm_estimation::{CsvSink, EstimationRecorder, RecorderObserver, ValidationObserver};
use dcm_logit::{CalculatorFactory, Choice, ChoiceCalculator, ModelSpec};
use dcm_model::{ChoiceModel, DecisionUnit, LogsumEngine, NestedCall, NestedModel};
use dcm_sim::{NoopObserver, PassRunner, RunConfig};

// ── Constants ─────────────────────────────────────────────────────────────────

const HOUSEHOLD_COUNT: usize = 400;
const SEED:            u64   = 42;

const MODE_MODEL:      &str = "work_tour_mode";
const OWNERSHIP_MODEL: &str = "auto_ownership";

// Work-tour mode alternatives.
const WALK:    usize = 0;
const TRANSIT: usize = 1;
const CARPOOL: usize = 2;
const DRIVE:   usize = 3;

const MODE_ALTERNATIVES: usize = 4;
const MOTORIZED_NEST:    usize = 0;

// Mode-model coefficient slots.
const MODE_TIME:             usize = 1;
const MODE_COST:             usize = 2;
const MODE_TRANSIT_CONSTANT: usize = 3;
const MODE_CARPOOL_CONSTANT: usize = 4;
const MODE_DRIVE_CONSTANT:   usize = 5;
const MODE_THETA:            usize = 99; // motorized-nest dissimilarity

// Nested-call context scalars the mode model reads.
const CALL_CARS:    usize = 0;
const CALL_TRANSIT: usize = 1;

// Ownership alternatives are car counts 0..=4.  Slots are laid out ten
// apart per alternative; the zero-car base carries no terms.
const OWNERSHIP_ALTERNATIVES: usize = 5;

const fn own_constant(cars: usize) -> usize {
    10 * cars
}
const fn own_drivers(cars: usize) -> usize {
    10 * cars + 1
}
const fn own_income(cars: usize) -> usize {
    10 * cars + 2
}
const fn own_logsum(cars: usize) -> usize {
    10 * cars + 3
}

// Minutes after the 3:00 AM day origin.
const WORK_ARRIVAL:   TimeWindow = TimeWindow { start_minute: 270, end_minute: 390 };
const WORK_DEPARTURE: TimeWindow = TimeWindow { start_minute: 810, end_minute: 930 };
const MORNING_PEAK:   TimeWindow = TimeWindow { start_minute: 240, end_minute: 360 };

// ── Synthetic population ──────────────────────────────────────────────────────

#[derive(Clone)]
struct Household {
    id:               UnitId,
    drivers:          u32,
    income_thousands: f64,
    residence:        LocationId,
    work_location:    Option<LocationId>,
    transit_access:   bool,
    /// Surveyed car count, where the synthetic survey covered the household.
    observed_cars:    Option<usize>,
    /// Simulated car count, written back by the application pass.
    cars:             Option<usize>,
}

impl DecisionUnit for Household {
    fn id(&self) -> UnitId {
        self.id
    }
}

/// Deterministic arithmetic stand-in for a household survey file.
/// Residences sit in zones 0–39, workplaces in zones 40–79.
fn synthesize_households(count: usize) -> Vec<Household> {
    (0..count)
        .map(|i| {
            let drivers = 1 + (i % 3) as u32;
            let observed_cars = if i % 3 == 2 {
                None
            } else {
                Some((drivers as usize + usize::from(i % 7 == 0)).min(OWNERSHIP_ALTERNATIVES - 1))
            };
            Household {
                id:               UnitId(i as u64 + 1),
                drivers,
                income_thousands: 25.0 + 7.5 * (i % 12) as f64,
                residence:        LocationId((i % 40) as u32),
                work_location:    (i % 5 != 4).then(|| LocationId((40 + (i * 7) % 40) as u32)),
                transit_access:   i % 3 != 1,
                observed_cars,
                cars:             None,
            }
        })
        .collect()
}

// ── Work-tour mode model (lower level) ────────────────────────────────────────

/// Nested mode choice for the household's work tour.  Nothing simulates
/// this model directly here; the ownership model consumes its logsum,
/// varying the cars-available context scalar to price mobility.
struct WorkTourModeModel {
    factory: CalculatorFactory,
}

impl WorkTourModeModel {
    fn new() -> Result<Self> {
        let spec = ModelSpec {
            name:               MODE_MODEL.to_owned(),
            total_alternatives: MODE_ALTERNATIVES,
            total_nests:        1,
            levels:             2,
            max_parameter:      MODE_THETA,
        };
        let coefficients = CoefficientSet::from_entries(
            MODE_THETA,
            [
                (MODE_TIME, "time_minutes", -0.025),
                (MODE_COST, "cost_dollars", -0.12),
                (MODE_TRANSIT_CONSTANT, "transit_constant", -0.40),
                (MODE_CARPOOL_CONSTANT, "carpool_constant", -1.20),
                (MODE_DRIVE_CONSTANT, "drive_constant", 0.30),
                (MODE_THETA, "theta_motorized", 0.72),
            ],
        )?;
        Ok(Self { factory: CalculatorFactory::new(spec, Arc::new(coefficients))? })
    }
}

impl NestedModel for WorkTourModeModel {
    fn name(&self) -> &str {
        MODE_MODEL
    }

    fn factory(&self) -> &CalculatorFactory {
        &self.factory
    }

    fn build_nested(&self, _unit: UnitId, call: &NestedCall, calculator: &mut ChoiceCalculator) {
        // Stand-in for a skim lookup: zone gap scales to kilometers.
        let distance_km = 0.35 * f64::from(call.destination.0.abs_diff(call.origin.0));
        let cars = call.extra(CALL_CARS);
        let transit_ok = call.extra(CALL_TRANSIT) > 0.0;
        let peak = call.arrival.overlaps(MORNING_PEAK);

        calculator
            .alternative(WALK, distance_km <= 3.0, false)
            .add_utility_term(MODE_TIME, 12.0 * distance_km);

        calculator
            .alternative(TRANSIT, transit_ok, false)
            .add_utility_term(MODE_TRANSIT_CONSTANT, 1.0)
            .add_utility_term(MODE_TIME, 4.0 * distance_km + 10.0)
            .add_utility_term(MODE_COST, 2.5);

        calculator
            .alternative(CARPOOL, true, false)
            .add_utility_term(MODE_CARPOOL_CONSTANT, 1.0)
            .add_utility_term(MODE_TIME, 2.2 * distance_km + 6.0)
            .add_utility_term(MODE_COST, 0.12 * distance_km)
            .join_nest(MOTORIZED_NEST, MODE_THETA);

        let minutes_per_km = if peak { 2.6 } else { 2.0 };
        calculator
            .alternative(DRIVE, cars > 0.0, false)
            .add_utility_term(MODE_DRIVE_CONSTANT, 1.0)
            .add_utility_term(MODE_TIME, minutes_per_km * distance_km)
            .add_utility_term(MODE_COST, 0.18 * distance_km + 3.0)
            .join_nest(MOTORIZED_NEST, MODE_THETA);
    }
}

// ── Auto-ownership model (upper level) ────────────────────────────────────────

/// Household car count, 0..=4 cars.  The work-tour mode logsum difference
/// (drivers fully motorized vs carless) measures the accessibility each
/// car would buy, so car-rich alternatives gain where driving pays off.
struct AutoOwnershipModel {
    factory:   CalculatorFactory,
    work_mode: LogsumEngine<WorkTourModeModel>,
}

impl AutoOwnershipModel {
    fn new() -> Result<Self> {
        let spec = ModelSpec {
            name:               OWNERSHIP_MODEL.to_owned(),
            total_alternatives: OWNERSHIP_ALTERNATIVES,
            total_nests:        0,
            levels:             1,
            max_parameter:      own_logsum(OWNERSHIP_ALTERNATIVES - 1),
        };
        let mut entries = Vec::new();
        for (cars, constant, drivers, income, logsum) in [
            (1, 0.20, 0.90, 0.40, 0.60),
            (2, -0.90, 1.60, 0.90, 0.90),
            (3, -2.30, 1.90, 1.20, 1.00),
            (4, -3.90, 2.00, 1.30, 1.05),
        ] {
            entries.push((own_constant(cars), format!("own{cars}_constant"), constant));
            entries.push((own_drivers(cars), format!("own{cars}_drivers"), drivers));
            entries.push((own_income(cars), format!("own{cars}_income"), income));
            entries.push((own_logsum(cars), format!("own{cars}_logsum"), logsum));
        }
        let coefficients =
            CoefficientSet::from_entries(own_logsum(OWNERSHIP_ALTERNATIVES - 1), entries)?;
        Ok(Self {
            factory:   CalculatorFactory::new(spec, Arc::new(coefficients))?,
            work_mode: LogsumEngine::new(WorkTourModeModel::new()?),
        })
    }

    /// Work-tour mode logsum with the household's drivers motorized minus
    /// the carless logsum.  A nested failure feeds NaN into the term,
    /// which poisons the outer calculator and surfaces as a unit fault.
    fn mobility_gain(&self, household: &Household) -> f64 {
        let Some(work) = household.work_location else {
            return 0.0;
        };
        let transit = if household.transit_access { 1.0 } else { 0.0 };
        let logsum = |cars: f64| {
            let call = NestedCall::new(household.residence, work)
                .with_windows(WORK_ARRIVAL, WORK_DEPARTURE)
                .with_extra(cars)
                .with_extra(transit);
            self.work_mode.logsum_or_zero(household.id, &call).unwrap_or(f64::NAN)
        };
        logsum(f64::from(household.drivers)) - logsum(0.0)
    }
}

impl ChoiceModel for AutoOwnershipModel {
    type Unit = Household;

    fn name(&self) -> &str {
        OWNERSHIP_MODEL
    }

    fn purpose(&self) -> Purpose {
        Purpose(4)
    }

    fn factory(&self) -> &CalculatorFactory {
        &self.factory
    }

    fn build(&self, household: &Household, calculator: &mut ChoiceCalculator) {
        let gain = self.mobility_gain(household);
        let income = household.income_thousands / 100.0;
        for cars in 0..OWNERSHIP_ALTERNATIVES {
            let observed = household.observed_cars == Some(cars);
            let mut alternative = calculator.alternative(cars, true, observed);
            if cars > 0 {
                alternative
                    .add_utility_term(own_constant(cars), 1.0)
                    .add_utility_term(own_drivers(cars), f64::from(household.drivers))
                    .add_utility_term(own_income(cars), income)
                    .add_utility_term(own_logsum(cars), gain);
            }
        }
    }

    fn observed(&self, household: &Household) -> Option<usize> {
        household.observed_cars
    }

    fn apply(&self, household: &mut Household, choice: Choice) {
        household.cars = Some(choice.index);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    println!("=== auto-ownership — rust_dcm choice engine ===");
    println!("Households: {HOUSEHOLD_COUNT}  |  Seed: {SEED}");
    println!();

    // 1. Synthetic population.
    let mut households = synthesize_households(HOUSEHOLD_COUNT);
    let surveyed = households.iter().filter(|h| h.observed_cars.is_some()).count();
    println!(
        "Population: {} households, {surveyed} with a surveyed car count",
        households.len()
    );

    // 2. Models: the nested mode model hangs under the ownership model.
    let model = AutoOwnershipModel::new()?;
    println!(
        "Models: {MODE_MODEL} ({MODE_ALTERNATIVES} modes, motorized nest) feeding {OWNERSHIP_MODEL} ({OWNERSHIP_ALTERNATIVES} car counts)"
    );
    println!();

    // 3. Application pass: simulate a car count for every household.
    let runner = PassRunner::new(RunConfig::application(SEED))?;
    let t0 = Instant::now();
    let summary = runner.run(&model, &mut households, &mut NoopObserver)?;
    println!(
        "Application pass: {} choices in {:.3} s",
        summary.chosen,
        t0.elapsed().as_secs_f64()
    );
    println!("{:<6} {:>12} {:>8}", "Cars", "Households", "Share");
    println!("{}", "-".repeat(28));
    for (cars, count) in summary.chosen_counts.iter().enumerate() {
        println!(
            "{:<6} {:>12} {:>7.1}%",
            cars,
            count,
            100.0 * *count as f64 / summary.chosen as f64
        );
    }
    println!();

    // 4. Estimation pass: export the dataset the estimation package fits.
    std::fs::create_dir_all("output/auto-ownership")?;
    let dataset = Path::new("output/auto-ownership/auto_ownership.csv");
    let recorder = EstimationRecorder::from_spec(model.factory().spec(), CsvSink::new(dataset)?);
    let mut recording = RecorderObserver::new(recorder);
    let runner = PassRunner::new(RunConfig::estimation(SEED, OWNERSHIP_MODEL))?;
    runner.run(&model, &mut households, &mut recording)?;
    if let Some(e) = recording.take_error() {
        return Err(e.into());
    }
    let export = recording.into_recorder().finish()?;
    println!(
        "Estimation pass: {} rows × {} columns -> {}",
        export.written,
        export.columns,
        dataset.display()
    );
    println!("  skipped {} households without a survey record", export.skipped);
    println!();

    // 5. Validation pass: re-simulate surveyed households against the survey.
    let mut validating = ValidationObserver::new(OWNERSHIP_ALTERNATIVES);
    let runner = PassRunner::new(RunConfig::validation(SEED, OWNERSHIP_MODEL))?;
    runner.run(&model, &mut households, &mut validating)?;
    print!("{}", validating.stats());
    println!();

    // 6. Sample of simulated households.
    println!("{:<6} {:>8} {:>10} {:>7} {:>6}", "HH", "Drivers", "Income k", "Worker", "Cars");
    println!("{}", "-".repeat(42));
    for household in households.iter().take(10) {
        println!(
            "{:<6} {:>8} {:>10.1} {:>7} {:>6}",
            household.id.0,
            household.drivers,
            household.income_thousands,
            if household.work_location.is_some() { "yes" } else { "no" },
            household.cars.map_or_else(|| "-".to_owned(), |cars| cars.to_string()),
        );
    }

    Ok(())
}
