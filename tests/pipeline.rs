use std::fs;
use std::path::Path;

use assay_charts::config::{ImageFormat, Role};
use assay_charts::data::loader::{load_file, load_sheet, sheet_name};
use assay_charts::style::StyleHandle;
use assay_charts::{ChartKind, ChartOptions, ChartSession};
use resvg::usvg::fontdb::Database;
use rust_xlsxwriter::Workbook;

const DOSE_CSV: &str = "\
生测编号,100 ppm,50 ppm,25 ppm
CK,0,0,0
Ⅱ1-2,0.9,0.7,0.4
阿维菌素,1,1,0.95
Ⅰ3-1,0.8,0.5,0.2
Ⅰ1-5,0.95,0.85,0.6
";

const SCREEN_CSV: &str = "\
Catalyst,Solvent,Yield,ee
Cat. A,THF,45,30
Cat. A,DCM,52,41
Cat. B,THF,70,88
Cat. B,DCM,64,75
";

fn session(options: ChartOptions) -> ChartSession {
    ChartSession::new(StyleHandle::from_database(Database::new(), None), options).unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn split_heatmap_writes_numbered_svgs() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "dose.csv", DOSE_CSV);
    let raw = load_file(&input).unwrap();

    let s = session(ChartOptions {
        split_index: Some("Ⅰ3-1".into()),
        format: ImageFormat::Svg,
        ..Default::default()
    });
    let out = dir.path().join("out");
    let written = s
        .export(ChartKind::Heatmap, &raw, &sheet_name(&input), &out)
        .unwrap();

    assert_eq!(
        written,
        vec![out.join("heatmap_dose_1.svg"), out.join("heatmap_dose_2.svg")]
    );
    let first = fs::read_to_string(&written[0]).unwrap();
    assert!(first.starts_with("<svg"));
    assert!(first.contains("Ⅰ1-5"));
    assert!(!first.contains(">CK<"));
    // fractions were rescaled to percent before labelling
    assert!(first.contains(">95<"));
}

#[test]
fn single_figure_charts_write_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "screen.csv", SCREEN_CSV);
    let raw = load_file(&input).unwrap();

    let mut options = ChartOptions::default();
    options.column_roles.insert(Role::Size, "Yield".into());
    options.column_roles.insert(Role::Color, "ee".into());
    let written = session(options)
        .export(ChartKind::Bubble, &raw, "筛选", dir.path())
        .unwrap();

    assert_eq!(written, vec![dir.path().join("bubble_筛选.png")]);
    let bytes = fs::read(&written[0]).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn json_and_csv_sheets_plan_the_same_radar() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "herb.csv", "生测编号,稗草,马唐,苘麻\nA-1,90,80,70\nA-2,10,20,30\n");
    let json = write(
        dir.path(),
        "herb.json",
        r#"[{"生测编号": "A-1", "稗草": 90, "马唐": 80, "苘麻": 70},
            {"生测编号": "A-2", "稗草": 10, "马唐": 20, "苘麻": 30}]"#,
    );

    let s = session(ChartOptions::default());
    let from_csv = s.generate(ChartKind::Radar, &load_file(&csv).unwrap()).unwrap();
    let from_json = s.generate(ChartKind::Radar, &load_file(&json).unwrap()).unwrap();
    assert_eq!(from_csv, from_json);
}

#[test]
fn unsupported_inputs_fail_before_drawing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "sheet.txt", "plain text");
    assert!(load_file(&input).is_err());
    let broken = write(dir.path(), "sheet.xlsx", "not really a workbook");
    assert!(load_file(&broken).is_err());

    let energy = write(dir.path(), "energy.csv", "Step\nReactant\nProduct\n");
    let raw = load_file(&energy).unwrap();
    let out = dir.path().join("never");
    assert!(session(ChartOptions::default())
        .export(ChartKind::EnergyProfile, &raw, "energy", &out)
        .is_err());
    assert!(!out.exists());
}

fn write_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let notes = workbook.add_worksheet();
    notes.set_name("说明").unwrap();
    notes.write_string(0, 0, "剂量单位 ppm").unwrap();

    let dose = workbook.add_worksheet();
    dose.set_name("热图").unwrap();
    for (c, header) in ["生测编号", "100 ppm", "50 ppm"].iter().enumerate() {
        dose.write_string(0, c as u16, *header).unwrap();
    }
    let rows = [("CK", 0.0, 0.0), ("Ⅰ2-1", 0.9, 0.6), ("Ⅰ1-4", 1.0, 0.8)];
    for (r, (id, high, low)) in rows.iter().enumerate() {
        let r = r as u32 + 1;
        dose.write_string(r, 0, *id).unwrap();
        dose.write_number(r, 1, *high).unwrap();
        dose.write_number(r, 2, *low).unwrap();
    }
    workbook.save(path).unwrap();
}

#[test]
fn workbook_sheets_are_selected_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("活性.xlsx");
    write_workbook(&input);

    let first = load_sheet(&input, None).unwrap();
    assert_eq!(first.name, "说明");

    let sheet = load_sheet(&input, Some("热图")).unwrap();
    assert_eq!(sheet.name, "热图");
    assert_eq!(sheet.table.headers, vec!["生测编号", "100 ppm", "50 ppm"]);
    assert_eq!(sheet.table.n_rows(), 3);

    let written = session(ChartOptions {
        format: ImageFormat::Svg,
        ..Default::default()
    })
    .export(ChartKind::Heatmap, &sheet.table, &sheet.name, dir.path())
    .unwrap();
    assert_eq!(written, vec![dir.path().join("heatmap_热图_1.svg")]);
    let svg = fs::read_to_string(&written[0]).unwrap();
    assert!(svg.find(">Ⅰ1-4<").unwrap() < svg.find(">Ⅰ2-1<").unwrap());

    assert!(load_sheet(&input, Some("Sheet9")).is_err());
}
