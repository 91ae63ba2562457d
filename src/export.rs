//! Report export for the CLI frontend.
//!
//! Writes a [`SimulationReport`] as one JSON document, or as two CSV tables:
//!
//! ```text
//! time_domain.csv
//! time_s,series_current_a,series_voltage_v,parallel_current_a,parallel_voltage_v
//!
//! frequency_domain.csv
//! frequency_hz,series_magnitude_db,series_phase_deg,parallel_magnitude_db,parallel_phase_deg
//! ```
//!
//! Each row of the time table is also a point of both phase portraits
//! (current against voltage).

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, RlcError};
use crate::simulation::SimulationReport;

pub const TIME_DOMAIN_FILE: &str = "time_domain.csv";
pub const FREQUENCY_DOMAIN_FILE: &str = "frequency_domain.csv";
pub const REPORT_FILE: &str = "report.json";

const TIME_HEADER: &str =
    "time_s,series_current_a,series_voltage_v,parallel_current_a,parallel_voltage_v";
const FREQUENCY_HEADER: &str =
    "frequency_hz,series_magnitude_db,series_phase_deg,parallel_magnitude_db,parallel_phase_deg";

/// Serialize the whole report as pretty-printed JSON.
pub fn write_json<W: Write>(report: &SimulationReport, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Write the time-domain table.
pub fn write_time_csv<W: Write>(report: &SimulationReport, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "{}", TIME_HEADER)?;
    let columns = [
        report.series_current(),
        report.series_voltage(),
        report.parallel_current(),
        report.parallel_voltage(),
    ];
    for (k, t) in report.time().iter().enumerate() {
        write!(writer, "{:e}", t)?;
        for column in &columns {
            write!(writer, ",{:e}", column[k])?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

/// Write the frequency-domain table.
pub fn write_frequency_csv<W: Write>(
    report: &SimulationReport,
    mut writer: W,
) -> std::io::Result<()> {
    writeln!(writer, "{}", FREQUENCY_HEADER)?;
    let series = report.series_bode();
    let parallel = report.parallel_bode();
    for (k, f) in series.frequency_hz().iter().enumerate() {
        writeln!(
            writer,
            "{:e},{:e},{:e},{:e},{:e}",
            f,
            series.magnitude_db[k],
            series.phase_deg[k],
            parallel.magnitude_db[k],
            parallel.phase_deg[k]
        )?;
    }
    writer.flush()
}

/// Write both CSV tables into `dir`, creating it if needed. Returns the
/// paths written.
pub fn export_csv(report: &SimulationReport, dir: &Path) -> Result<Vec<PathBuf>> {
    create_dir(dir)?;
    let time_path = dir.join(TIME_DOMAIN_FILE);
    let frequency_path = dir.join(FREQUENCY_DOMAIN_FILE);

    write_time_csv(report, BufWriter::new(create_file(&time_path)?))
        .map_err(|e| file_error(&time_path, e))?;
    write_frequency_csv(report, BufWriter::new(create_file(&frequency_path)?))
        .map_err(|e| file_error(&frequency_path, e))?;

    Ok(vec![time_path, frequency_path])
}

/// Write `report.json` into `dir`, creating it if needed.
pub fn export_json(report: &SimulationReport, dir: &Path) -> Result<PathBuf> {
    create_dir(dir)?;
    let path = dir.join(REPORT_FILE);
    let mut writer = BufWriter::new(create_file(&path)?);
    write_json(report, &mut writer)?;
    writer.flush().map_err(|e| file_error(&path, e))?;
    Ok(path)
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| file_error(dir, e))
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| file_error(path, e))
}

fn file_error(path: &Path, source: std::io::Error) -> RlcError {
    RlcError::FileWriteError {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::CircuitParameters;
    use crate::grid::{FrequencyGrid, TimeGrid};
    use crate::simulation::{simulate, SimulationConfig, SimulationGrids};

    fn report() -> SimulationReport {
        let grids = SimulationGrids::new(
            TimeGrid::linspace(0.0, 1e-4, 11).unwrap(),
            FrequencyGrid::logspace(10.0, 1e5, 5).unwrap(),
        );
        simulate(
            &CircuitParameters::reference(),
            &grids,
            &SimulationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_time_csv_layout() {
        let mut buf = Vec::new();
        write_time_csv(&report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], TIME_HEADER);
        let first: Vec<f64> = lines[1].split(',').map(|x| x.parse().unwrap()).collect();
        assert_eq!(first, vec![0.0, 0.0, 900.0, 0.0, 900.0]);
    }

    #[test]
    fn test_frequency_csv_layout() {
        let mut buf = Vec::new();
        write_frequency_csv(&report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], FREQUENCY_HEADER);
        let first: Vec<f64> = lines[1].split(',').map(|x| x.parse().unwrap()).collect();
        assert_eq!(first.len(), 5);
        assert!((first[0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_fields() {
        let mut buf = Vec::new();
        write_json(&report(), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["series"]["topology"], "series");
        assert_eq!(value["parallel"]["trajectory"]["time"].as_array().unwrap().len(), 11);
        assert_eq!(
            value["series"]["frequency_response"]["magnitude_db"]
                .as_array()
                .unwrap()
                .len(),
            5
        );
    }

    #[test]
    fn test_export_to_directory() {
        let dir = std::env::temp_dir().join(format!("rlcsim-export-{}", std::process::id()));
        let paths = export_csv(&report(), &dir).unwrap();
        assert!(paths.iter().all(|p| p.exists()));
        let json = export_json(&report(), &dir).unwrap();
        assert!(json.exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
