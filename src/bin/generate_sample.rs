//! Writes a synthetic survey table with the columns the dashboard expects.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueHint};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "generate_sample")]
#[command(about = "Write a synthetic NHANES-style survey CSV")]
struct Args {
    /// Output CSV path
    #[arg(default_value = "final_cleaned.csv", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Number of respondents
    #[arg(short = 'n', long, default_value_t = 1500)]
    respondents: u32,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next_u64() % u64::from(hi - lo + 1)) as u32
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn lognormal(&mut self, median: f64, sigma: f64) -> f64 {
        median * self.gauss(0.0, sigma).exp()
    }

    /// `value` with probability `1 - p_missing`, else an empty cell.
    fn maybe<T>(&mut self, p_missing: f64, value: T) -> Option<T> {
        (!self.chance(p_missing)).then_some(value)
    }
}

fn round(v: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (v * f).round() / f
}

#[derive(Serialize)]
struct Respondent {
    #[serde(rename = "SEQN")]
    seqn: u32,
    age_years: u32,
    gender: &'static str,
    ethnicity: &'static str,
    education: Option<&'static str>,
    income_poverty_ratio: Option<f64>,
    testosterone: Option<f64>,
    estradiol: Option<f64>,
    shbg: Option<f64>,
    #[serde(rename = "lead_µg/dL")]
    lead: Option<f64>,
    #[serde(rename = "cadmium_µg/L")]
    cadmium: Option<f64>,
    #[serde(rename = "mercury_µg/L")]
    mercury: Option<f64>,
    #[serde(rename = "selenium_µg/L")]
    selenium: Option<f64>,
    #[serde(rename = "manganese_µg/L")]
    manganese: Option<f64>,
    #[serde(rename = "lead_µmol/L")]
    lead_molar: Option<f64>,
    #[serde(rename = "cadmium_nmol/L")]
    cadmium_molar: Option<f64>,
    #[serde(rename = "mercury_nmol/L")]
    mercury_molar: Option<f64>,
    #[serde(rename = "selenium_µmol/L")]
    selenium_molar: Option<f64>,
    #[serde(rename = "manganese_nmol/L")]
    manganese_molar: Option<f64>,
    #[serde(rename = "Blood metal weights")]
    metal_weight: Option<f64>,
    /// 1 = yes, 2 = no, 9 = don't know
    infertility_1yr: Option<u8>,
    regular_periods: Option<&'static str>,
    first_period_age: Option<u32>,
    /// 999 = still menstruating
    last_period_age: Option<u32>,
}

/// Mass → molar unit factors, in column order.
const MOLAR_FACTORS: [f64; 5] = [0.0483, 8.897, 4.985, 0.01266, 18.2];

fn respondent(seqn: u32, rng: &mut SimpleRng) -> Respondent {
    // A few respondents fall outside the reproductive-age window on purpose.
    let age = if rng.chance(0.05) { rng.range(12, 17) } else { rng.range(18, 59) };
    let female = rng.chance(0.85);
    let exposed = rng.lognormal(1.0, 0.5);

    let metals = [
        rng.lognormal(0.8, 0.6) * exposed,
        rng.lognormal(0.3, 0.7) * exposed,
        rng.lognormal(0.9, 0.8),
        rng.lognormal(190.0, 0.15),
        rng.lognormal(9.5, 0.3),
    ];
    let measured = !rng.chance(0.1);
    let metal = |i: usize| measured.then(|| round(metals[i], 3));
    let molar = |i: usize| measured.then(|| round(metals[i] * MOLAR_FACTORS[i], 4));

    // Estradiol falls slightly with lead burden.
    let estradiol = (rng.gauss(90.0, 35.0) - 6.0 * metals[0] + 0.4 * f64::from(age)).max(3.0);
    let testosterone = if female {
        rng.lognormal(25.0, 0.4)
    } else {
        rng.lognormal(420.0, 0.3)
    };

    let infertility_risk = 0.08 + 0.03 * metals[1] + 0.003 * f64::from(age.saturating_sub(18));
    let infertility = if rng.chance(0.04) {
        Some(9)
    } else if rng.chance(0.15) {
        None
    } else if rng.chance(infertility_risk) {
        Some(1)
    } else {
        Some(2)
    };

    let regular = if rng.chance(0.2) {
        None
    } else if rng.chance(0.15 + 0.04 * metals[1]) {
        Some("No")
    } else {
        Some("Yes")
    };

    let first_period = if rng.chance(0.02) { rng.range(3, 7) } else { rng.range(9, 16) };
    let last_period = if age < 40 || rng.chance(0.5) {
        999
    } else {
        rng.range(40, age.min(55))
    };

    let education =
        rng.pick(&["Less than 9th grade", "High school", "Some college", "College graduate"]);
    let income = rng.next_f64() * 5.0;
    let shbg = rng.lognormal(60.0, 0.4);
    let metal_weight = rng.lognormal(40_000.0, 0.8);

    Respondent {
        seqn,
        age_years: age,
        gender: if female { "Female" } else { "Male" },
        ethnicity: rng.pick(&[
            "Mexican American",
            "Other Hispanic",
            "Non-Hispanic White",
            "Non-Hispanic Black",
            "Non-Hispanic Asian",
            "Other Race",
        ]),
        education: rng.maybe(0.05, education),
        income_poverty_ratio: rng.maybe(0.08, round(income, 2)),
        testosterone: rng.maybe(0.1, round(testosterone, 2)),
        estradiol: rng.maybe(0.1, round(estradiol, 2)),
        shbg: rng.maybe(0.1, round(shbg, 2)),
        lead: metal(0),
        cadmium: metal(1),
        mercury: metal(2),
        selenium: metal(3),
        manganese: metal(4),
        lead_molar: molar(0),
        cadmium_molar: molar(1),
        mercury_molar: molar(2),
        selenium_molar: molar(3),
        manganese_molar: molar(4),
        metal_weight: measured.then(|| round(metal_weight, 1)),
        infertility_1yr: female.then_some(infertility).flatten(),
        regular_periods: female.then_some(regular).flatten(),
        first_period_age: female.then_some(first_period),
        last_period_age: female.then_some(last_period),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut rng = SimpleRng::new(args.seed);
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Cannot create {}", args.output.display()))?;
    for seqn in 0..args.respondents {
        writer.serialize(respondent(93_703 + seqn, &mut rng))?;
    }
    writer.flush()?;

    println!(
        "Wrote {} respondents to {}",
        args.respondents,
        args.output.display()
    );
    Ok(())
}
