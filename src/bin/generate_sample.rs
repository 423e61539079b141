use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CONCENTRATIONS: [&str; 6] = ["100 ppm", "50 ppm", "25 ppm", "12.5 ppm", "6.25 ppm", "3.125 ppm"];

/// A generated sheet: header plus string rows, ready for csv.
struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(headers: &[&str]) -> Self {
        Sheet {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer =
            csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sheets
// ---------------------------------------------------------------------------

/// Herbicidal activity per crop (radar, box plot, polar bar).
fn herbicidal(rng: &mut StdRng) -> Sheet {
    let crops = ["稗草", "马唐", "狗尾草", "反枝苋", "苘麻", "小麦", "玉米"];
    let mut sheet = Sheet::new(&[&["生测编号"][..], &crops[..]].concat());
    for i in 0..8 {
        let values: Vec<u32> = match i {
            0 => vec![95, 98, 92, 100, 96, 10, 15],
            1 => vec![10, 15, 12, 98, 95, 0, 0],
            _ => (0..crops.len()).map(|_| rng.gen_range(0..=100)).collect(),
        };
        let mut row = vec![format!("化合物-{:02}", i + 1)];
        row.extend(values.iter().map(u32::to_string));
        sheet.rows.push(row);
    }
    sheet
}

/// Gray mold and head blight inhibition (fungicide bars).
fn fungicidal(rng: &mut StdRng) -> Sheet {
    let mut sheet = Sheet::new(&["生测编号", "灰霉", "赤霉", "白粉", "锈病"]);
    for i in 0..10 {
        let mut row = vec![format!("B-{:03}", i + 1)];
        row.extend((0..4).map(|_| rng.gen_range(0..=100u32).to_string()));
        sheet.rows.push(row);
    }
    sheet
}

/// Dose-response mortality with control rows (heatmap).
fn dose_response(rng: &mut StdRng) -> Sheet {
    let mut sheet = Sheet::new(&[&["生测编号"][..], &CONCENTRATIONS[..]].concat());
    for i in 1..=10 {
        let base: i32 = rng.gen_range(80..100);
        let mut row = vec![format!("Ⅲ 2-{i:02}")];
        row.extend((0..CONCENTRATIONS.len() as i32).map(|j| {
            let step: i32 = rng.gen_range(10..20);
            (base - j * step).max(0).to_string()
        }));
        sheet.rows.push(row);
    }
    sheet.rows.push(
        std::iter::once("CK".to_string())
            .chain(std::iter::repeat("0".to_string()).take(CONCENTRATIONS.len()))
            .collect(),
    );
    sheet.rows.push(
        ["阿维菌素", "100", "100", "100", "95", "80", "60"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    sheet
}

/// Catalyst × solvent screening (bubble chart).
fn optimization(rng: &mut StdRng) -> Sheet {
    let mut sheet = Sheet::new(&["Catalyst", "Solvent", "Yield", "ee"]);
    for cat in ["Cat. A", "Cat. B", "Cat. C", "Cat. D", "Cat. E"] {
        for solvent in ["THF", "DCM", "Toluene", "MeCN", "DMF"] {
            let mut y: i32 = rng.gen_range(10..60);
            let mut ee: i32 = rng.gen_range(0..50);
            if cat == "Cat. C" {
                y += 30;
                ee += 40;
            }
            if solvent == "Toluene" {
                y += 15;
                ee += 10;
            }
            let y = (y + rng.gen_range(-5..5)).clamp(0, 99);
            let ee = (ee + rng.gen_range(-5..5)).clamp(0, 99);
            sheet.rows.push(vec![cat.into(), solvent.into(), y.to_string(), ee.to_string()]);
        }
    }
    sheet
}

/// Catalysed and uncatalysed reaction paths (energy profile).
fn energy_profile() -> Sheet {
    let mut sheet = Sheet::new(&["Step", "Uncatalyzed_Energy", "Catalyzed_Energy"]);
    let steps = ["Reactant", "TS1", "Intermediate", "TS2", "Product"];
    let uncatalyzed = [0.0, 28.5, 15.2, 22.1, -8.5];
    let catalyzed = [0.0, 14.8, 6.5, 9.2, -8.5];
    for ((step, u), c) in steps.iter().zip(uncatalyzed).zip(catalyzed) {
        sheet.rows.push(vec![step.to_string(), u.to_string(), c.to_string()]);
    }
    sheet
}

/// Yield over time for three catalysts, with a few missed samples (kinetics).
fn kinetics(rng: &mut StdRng) -> Sheet {
    let mut sheet = Sheet::new(&["Time (h)", "Cat. A", "Cat. B", "Cat. C"]);
    let rates = [0.25, 0.6, 1.2];
    for step in 0..=12 {
        let t = step as f64 * 0.5;
        let mut row = vec![t.to_string()];
        for rate in rates {
            if step > 0 && rng.gen_bool(0.1) {
                row.push(String::new());
                continue;
            }
            let y: f64 = 98.0 * (1.0 - (-rate * t).exp()) + rng.gen_range(-1.5..1.5);
            row.push(format!("{:.1}", y.clamp(0.0, 100.0)));
        }
        sheet.rows.push(row);
    }
    sheet
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// The dose-response sheet again, as typed parquet columns.
fn write_parquet(sheet: &Sheet, path: &Path) -> Result<()> {
    let mut fields = vec![Field::new(&sheet.headers[0], DataType::Utf8, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(
        sheet.rows.iter().map(|r| r[0].as_str()).collect::<Vec<_>>(),
    ))];
    for (c, name) in sheet.headers.iter().enumerate().skip(1) {
        fields.push(Field::new(name, DataType::Float64, true));
        let values: Vec<Option<f64>> = sheet.rows.iter().map(|r| r[c].parse().ok()).collect();
        columns.push(Arc::new(Float64Array::from(values)));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = StdRng::seed_from_u64(42);
    let heatmap = dose_response(&mut rng);
    let sheets = [
        ("除草活性", herbicidal(&mut rng)),
        ("除菌活性", fungicidal(&mut rng)),
        ("热图", heatmap),
        ("反应条件筛选", optimization(&mut rng)),
        ("反应能级", energy_profile()),
        ("反应动力学", kinetics(&mut rng)),
    ];

    for (name, sheet) in &sheets {
        let path = out_dir.join(format!("{name}.csv"));
        sheet.write_csv(&path)?;
        println!("Wrote {} rows to {}", sheet.rows.len(), path.display());
    }
    let parquet_path = out_dir.join("热图.parquet");
    write_parquet(&sheets[2].1, &parquet_path)?;
    println!("Wrote {}", parquet_path.display());
    Ok(())
}
