// Entry point and high-level console flow.
//
// The binary is the console rendition of the original report:
// - Option [1] loads and cleans the collision export, printing diagnostics.
// - Option [2] asks for a factor and a time granularity (the original's
//   sidebar choices), then generates the report tables and a JSON summary.
// - After generating reports, the user can go back to the menu or exit.

use bike_collision_report::error::ReportError;
use bike_collision_report::loader;
use bike_collision_report::output;
use bike_collision_report::reports;
use bike_collision_report::types::{CollisionRecord, Factor, StreetColumn, TimeUnit};
use bike_collision_report::util::format_int;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::SystemTime;

const DATA_FILE: &str = "BicycleCollisions-Regina-2010-2019.csv";

/// Streets must have at least this many reported collisions to appear in
/// the per-street tables.
const STREET_MIN_COUNT: u64 = 5;

// In-memory app state so we load/clean the export once but can generate
// reports any number of times in a single run. The dataset is reloaded
// only if the source file's modification time changes.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Dataset>,
}

struct Dataset {
    records: Vec<CollisionRecord>,
    source_mtime: Option<SystemTime>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn source_mtime(path: &str) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Handle option [1]: load and clean the collision export.
///
/// Skips the reload when the cached dataset is still current; otherwise
/// stores the cleaned records in `APP_STATE` and prints a short summary of
/// what the cleaning pass did.
fn handle_load() {
    let mtime = source_mtime(DATA_FILE);
    {
        let state = APP_STATE.lock().unwrap();
        if let Some(ds) = &state.data {
            if mtime.is_some() && ds.source_mtime == mtime {
                println!("Dataset already loaded and source unchanged; skipping reload.\n");
                return;
            }
        }
    }
    match loader::load_and_clean(DATA_FILE) {
        Ok((records, load_report)) => {
            println!(
                "Processing dataset... ({} collision records loaded)",
                format_int(load_report.total_rows as i64)
            );
            println!(
                "Note: {} blank cells carried forward from earlier rows.",
                format_int(load_report.filled_cells as i64)
            );
            if load_report.zeroed_hours > 0 {
                println!(
                    "Info: {} records had no usable time of day (hour set to 0).",
                    format_int(load_report.zeroed_hours as i64)
                );
            }
            println!("");
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(Dataset {
                records,
                source_mtime: mtime,
            });
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Prompt for one of the seven contextual factors.
fn select_factor() -> Factor {
    loop {
        println!("Severity levels by:");
        for (i, factor) in Factor::ALL.iter().enumerate() {
            println!("[{}] {}", i + 1, factor.label());
        }
        if let Ok(n) = read_choice().parse::<usize>() {
            if (1..=Factor::ALL.len()).contains(&n) {
                return Factor::ALL[n - 1];
            }
        }
        println!("Invalid choice. Please enter 1-{}.\n", Factor::ALL.len());
    }
}

/// Prompt for the time granularity.
fn select_time_unit() -> TimeUnit {
    loop {
        println!("Time granularity:");
        for (i, unit) in TimeUnit::ALL.iter().enumerate() {
            println!("[{}] {}", i + 1, unit.label());
        }
        if let Ok(n) = read_choice().parse::<usize>() {
            if (1..=TimeUnit::ALL.len()).contains(&n) {
                return TimeUnit::ALL[n - 1];
            }
        }
        println!("Invalid choice. Please enter 1-{}.\n", TimeUnit::ALL.len());
    }
}

/// Handle option [2]: generate all report tables and the JSON summary.
///
/// This function is intentionally side-effectful:
/// - writes five CSV files,
/// - writes a JSON summary,
/// - and prints markdown previews of each table to the console.
fn handle_generate_reports() {
    let records = {
        let state = APP_STATE.lock().unwrap();
        state.data.as_ref().map(|ds| ds.records.clone())
    };
    let Some(records) = records else {
        println!("Error: No data loaded. Please load the collision file first (option 1).\n");
        return;
    };

    let factor = select_factor();
    let time_unit = select_time_unit();

    println!("\nGenerating reports...");
    println!("Outputs saved to individual files...\n");

    let totals = match reports::totals_by_year(&records) {
        Ok(rows) => rows,
        Err(ReportError::EmptyDataset) => {
            println!("No data to display.\n");
            return;
        }
        Err(e) => {
            eprintln!("Report error: {}\n", e);
            return;
        }
    };

    let r1 = reports::render_year_totals(&totals);
    let file1 = "report1_injuries_fatalities.csv";
    if let Err(e) = output::write_csv(file1, &r1) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Injuries and Fatalities by Year\n");
    output::preview_table_rows(&r1, r1.len());
    println!("(Full table exported to {})\n", file1);

    // The remaining reports cannot hit the empty case once totals succeeded.
    let severity = reports::severity_by_time(&records, time_unit).unwrap_or_default();
    let r2 = reports::render_severity_counts(&severity);
    let file2 = "report2_severity_by_time.csv";
    if let Err(e) = output::write_csv(file2, &r2) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Report 2: Collisions by Severity Level per {}\n",
        time_unit.label()
    );
    output::preview_table_rows(&r2, 10);
    println!("(Full table exported to {})\n", file2);

    let by_factor =
        reports::severity_by_factor_and_time(&records, factor, time_unit).unwrap_or_default();
    let r3 = reports::render_factor_counts(&by_factor);
    let file3 = "report3_severity_by_factor.csv";
    if let Err(e) = output::write_csv(file3, &r3) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Report 3: Collisions by {} per {}\n",
        factor.label(),
        time_unit.label()
    );
    output::preview_table_rows(&r3, 10);
    println!("(Full table exported to {})\n", file3);

    let primary =
        reports::street_frequency(&records, StreetColumn::Primary, STREET_MIN_COUNT)
            .unwrap_or_default();
    let r4 = reports::render_street_counts(&primary);
    let file4 = "report4_primary_streets.csv";
    if let Err(e) = output::write_csv(file4, &r4) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 4: Accident Cases per Primary Street");
    println!("(Streets with at least {} reported collisions)\n", STREET_MIN_COUNT);
    output::preview_table_rows(&r4, 10);
    println!("(Full table exported to {})\n", file4);

    let secondary =
        reports::street_frequency(&records, StreetColumn::Secondary, STREET_MIN_COUNT)
            .unwrap_or_default();
    let r5 = reports::render_street_counts(&secondary);
    let file5 = "report5_secondary_streets.csv";
    if let Err(e) = output::write_csv(file5, &r5) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 5: Accident Cases per Secondary Street");
    println!("(Streets with at least {} reported collisions)\n", STREET_MIN_COUNT);
    output::preview_table_rows(&r5, 10);
    println!("(Full table exported to {})\n", file5);

    let summary = reports::summarize(&records);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"total_collisions\": {}, \"total_injuries\": {}, \"total_fatalities\": {}}}\n",
        summary.total_collisions, summary.total_injuries, summary.total_fatalities
    );
}

fn main() {
    loop {
        println!("Analysis on Severity of Bike Accidents in the City of Regina 2010-2019");
        println!("[1] Load the collision file");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!("");
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
