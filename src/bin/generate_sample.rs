use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (name, iso code, GDP per capita in 1950, yearly growth, tonnes CO2 per 1000 USD, population in 1950)
const ENTITIES: [(&str, &str, f64, f64, f64, f64); 10] = [
    ("Arcadia", "ARC", 9_000.0, 0.021, 0.55, 150e6),
    ("Borealis", "BOR", 7_500.0, 0.024, 0.80, 20e6),
    ("Cascadia", "CAS", 4_000.0, 0.030, 0.45, 60e6),
    ("Deltora", "DLT", 1_800.0, 0.045, 0.70, 500e6),
    ("Estoria", "EST", 1_200.0, 0.038, 0.40, 80e6),
    ("Fjordland", "FJL", 6_000.0, 0.020, 0.25, 5e6),
    ("Galdor", "GLD", 800.0, 0.025, 0.30, 35e6),
    ("Hesperia", "HSP", 600.0, 0.032, 0.20, 120e6),
    ("Ithaca", "ITH", 3_000.0, 0.015, 1.10, 3e6),
    ("Jovia", "JOV", 400.0, 0.028, 0.15, 15e6),
];

const FIRST_YEAR: i32 = 1950;
const LAST_YEAR: i32 = 2022;

#[derive(Default)]
struct Columns {
    country: Vec<String>,
    iso_code: Vec<Option<String>>,
    year: Vec<i32>,
    co2: Vec<Option<f64>>,
    co2_per_capita: Vec<Option<f64>>,
    gdp: Vec<Option<f64>>,
    population: Vec<Option<f64>>,
}

impl Columns {
    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        country: &str,
        iso_code: Option<&str>,
        year: i32,
        co2: Option<f64>,
        co2_per_capita: Option<f64>,
        gdp: Option<f64>,
        population: Option<f64>,
    ) {
        self.country.push(country.to_string());
        self.iso_code.push(iso_code.map(str::to_string));
        self.year.push(year);
        self.co2.push(co2);
        self.co2_per_capita.push(co2_per_capita);
        self.gdp.push(gdp);
        self.population.push(population);
    }

    fn len(&self) -> usize {
        self.year.len()
    }
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();

    for year in FIRST_YEAR..=LAST_YEAR {
        let t = (year - FIRST_YEAR) as f64;
        let mut world_co2 = 0.0;
        let mut world_pop = 0.0;

        for &(name, code, gdp0, growth, intensity, pop0) in &ENTITIES {
            let population = pop0 * (1.0 + 0.012 * t);
            let gdp_pc = gdp0 * (1.0 + growth).powf(t) * (1.0 + rng.gauss(0.0, 0.02));
            // Intensity falls slowly as economies mature.
            let co2_pc = (gdp_pc / 1_000.0 * intensity * (1.0 - 0.004 * t)).max(0.01);
            let co2_mt = co2_pc * population / 1e6;

            world_co2 += co2_mt;
            world_pop += population;

            // Early GDP series are patchy in the real data.
            let gdp = if year < 1960 && rng.next_f64() < 0.3 {
                None
            } else {
                Some(gdp_pc * population)
            };
            cols.push(
                name,
                Some(code),
                year,
                Some(co2_mt),
                Some(co2_pc),
                gdp,
                Some(population),
            );
        }

        // Aggregate row: no ISO code, no GDP.
        cols.push(
            "World",
            None,
            year,
            Some(world_co2),
            Some(world_co2 * 1e6 / world_pop),
            None,
            Some(world_pop),
        );
    }

    cols
}

fn write_parquet(cols: &Columns, path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("iso_code", DataType::Utf8, true),
        Field::new("year", DataType::Int32, false),
        Field::new("co2", DataType::Float64, true),
        Field::new("co2_per_capita", DataType::Float64, true),
        Field::new("gdp", DataType::Float64, true),
        Field::new("population", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(cols.country.clone())),
            Arc::new(StringArray::from(cols.iso_code.clone())),
            Arc::new(Int32Array::from(cols.year.clone())),
            Arc::new(Float64Array::from(cols.co2.clone())),
            Arc::new(Float64Array::from(cols.co2_per_capita.clone())),
            Arc::new(Float64Array::from(cols.gdp.clone())),
            Arc::new(Float64Array::from(cols.population.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(cols: &Columns, path: &str) -> Result<()> {
    fn cell(v: Option<f64>) -> String {
        v.map(|x| x.to_string()).unwrap_or_default()
    }

    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "country",
        "year",
        "iso_code",
        "population",
        "gdp",
        "co2",
        "co2_per_capita",
    ])?;
    for i in 0..cols.len() {
        writer.write_record([
            cols.country[i].clone(),
            cols.year[i].to_string(),
            cols.iso_code[i].clone().unwrap_or_default(),
            cell(cols.population[i]),
            cell(cols.gdp[i]),
            cell(cols.co2[i]),
            cell(cols.co2_per_capita[i]),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let cols = generate(&mut rng);

    write_parquet(&cols, "sample_co2.parquet")?;
    write_csv(&cols, "sample_co2.csv")?;

    println!(
        "Wrote {} rows ({} entities + World, {FIRST_YEAR}-{LAST_YEAR}) to sample_co2.parquet and sample_co2.csv",
        cols.len(),
        ENTITIES.len()
    );
    Ok(())
}
