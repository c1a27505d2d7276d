//! Demo that scores a few sample records against the built-in table and prints
//! the tier guidance plus the CSV report for the last one.

use hypertension_risk::{assess, Feature, ReferenceTable};

fn main() {
    let table = ReferenceTable::builtin();

    let samples = [
        ("all means", table.mean_record()),
        (
            "lean sleeper",
            table
                .mean_record()
                .with(Feature::Bmi, 20.0)
                .with(Feature::SaltIntake, 2.0)
                .with(Feature::SleepDuration, 4.0),
        ),
        (
            "elevated vitals",
            table
                .mean_record()
                .with(Feature::Age, 68.0)
                .with(Feature::SystolicBp, 165.0)
                .with(Feature::DiastolicBp, 102.0)
                .with(Feature::Triglycerides, 260.0),
        ),
    ];

    let mut last = None;
    for (label, record) in samples {
        let a = assess(&table, record);
        println!(
            "{label:<16} score {:>6}/100  {} {}",
            a.score(),
            a.tier.icon(),
            a.tier.message()
        );
        last = Some(a);
    }

    if let Some(a) = last {
        println!();
        print!("{}", a.report(&table).to_csv());
    }
}
