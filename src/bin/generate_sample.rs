//! Writes a synthetic CORD-19 style metadata file in CSV and Parquet form.
//!
//! The rows deliberately include the mess real metadata has: missing
//! journals, unparseable dates, empty abstracts and inconsistent journal
//! casing.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{BooleanArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 2_000;

const JOURNALS: &[&str] = &[
    "The Lancet",
    "the lancet",
    "BMJ",
    "Nature",
    "Science",
    "PLoS One",
    "Journal of Virology",
    "Emerging Infectious Diseases",
    "Vaccine",
    "Virus Research",
    "Cell",
    "JAMA",
];

const SOURCES: &[&str] = &["PMC", "Medline", "WHO", "Elsevier", "MedRxiv", "BioRxiv", "ArXiv"];

const TITLE_WORDS: &[&str] = &[
    "clinical", "characteristics", "patients", "transmission", "vaccine", "respiratory",
    "infection", "outbreak", "novel", "analysis", "model", "immune", "response", "mortality",
    "hospital", "children", "antibody", "spike", "protein", "genome", "epidemic", "mask",
    "lockdown", "mental", "health", "treatment",
];

const FILLER_WORDS: &[&str] = &[
    "we", "report", "study", "results", "cases", "data", "covid", "coronavirus", "sars",
    "cov", "pandemic", "were", "observed", "among", "significant", "increase", "risk",
];

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct SampleRow {
    title: Option<String>,
    abstract_text: Option<String>,
    journal: Option<String>,
    publish_time: Option<String>,
    source: String,
    has_full_text: bool,
}

fn sentence(rng: &mut SimpleRng, words: usize) -> String {
    (0..words)
        .map(|_| {
            if rng.chance(0.6) {
                rng.pick(TITLE_WORDS)
            } else {
                rng.pick(FILLER_WORDS)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn publish_time(rng: &mut SimpleRng) -> Option<String> {
    // Publication years skew heavily towards 2020.
    let year = match rng.below(10) {
        0 => 2018,
        1 => 2019,
        2..=6 => 2020,
        7 | 8 => 2021,
        _ => 2022,
    };
    let month = 1 + rng.below(12);
    let day = 1 + rng.below(28);
    match rng.below(20) {
        0 => None,
        1 => Some("not a date".to_string()),
        2 => Some(year.to_string()),
        3 => Some(format!("{year} Mar")),
        _ => Some(format!("{year}-{month:02}-{day:02}")),
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<SampleRow> {
    (0..ROWS)
        .map(|_| {
            let title_len = 4 + rng.below(8);
            let abstract_len = rng.gauss(180.0, 60.0).max(10.0) as usize;
            SampleRow {
                title: (!rng.chance(0.01)).then(|| sentence(rng, title_len)),
                abstract_text: (!rng.chance(0.15)).then(|| sentence(rng, abstract_len)),
                journal: (!rng.chance(0.08)).then(|| rng.pick(JOURNALS).to_string()),
                publish_time: publish_time(rng),
                source: rng.pick(SOURCES).to_string(),
                has_full_text: rng.chance(0.4),
            }
        })
        .collect()
}

fn write_csv(rows: &[SampleRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["title", "abstract", "journal", "publish_time", "source_x", "has_full_text"])?;
    for row in rows {
        writer.write_record([
            row.title.as_deref().unwrap_or(""),
            row.abstract_text.as_deref().unwrap_or(""),
            row.journal.as_deref().unwrap_or(""),
            row.publish_time.as_deref().unwrap_or(""),
            row.source.as_str(),
            if row.has_full_text { "True" } else { "False" },
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[SampleRow], path: &Path) -> Result<()> {
    let text_column = |f: fn(&SampleRow) -> Option<&str>| -> StringArray {
        StringArray::from(rows.iter().map(f).collect::<Vec<_>>())
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("title", DataType::Utf8, true),
        Field::new("abstract", DataType::Utf8, true),
        Field::new("journal", DataType::Utf8, true),
        Field::new("publish_time", DataType::Utf8, true),
        Field::new("source_x", DataType::Utf8, false),
        Field::new("has_full_text", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text_column(|r| r.title.as_deref())),
            Arc::new(text_column(|r| r.abstract_text.as_deref())),
            Arc::new(text_column(|r| r.journal.as_deref())),
            Arc::new(text_column(|r| r.publish_time.as_deref())),
            Arc::new(text_column(|r| Some(r.source.as_str()))),
            Arc::new(BooleanArray::from(
                rows.iter().map(|r| r.has_full_text).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let csv_path = Path::new("sample_metadata.csv");
    let parquet_path = Path::new("sample_metadata.parquet");
    write_csv(&rows, csv_path)?;
    write_parquet(&rows, parquet_path)?;

    println!(
        "Wrote {} papers to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
