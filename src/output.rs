// src/output.rs
use crate::error::{SdeError, SdeResult};
use crate::forecast::ForecastPath;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One column per named path, one row per forecast step. Shorter paths leave
/// their trailing cells empty.
pub fn write_forecasts_to_csv(
    filename: impl AsRef<Path>,
    columns: &[(&str, &ForecastPath)],
) -> SdeResult<()> {
    if columns.is_empty() {
        return Err(SdeError::configuration("columns", "nothing to write"));
    }

    let mut file = BufWriter::new(File::create(filename)?);
    let header: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    writeln!(file, "step,{}", header.join(","))?;

    let rows = columns.iter().map(|(_, path)| path.len()).max().unwrap_or(0);
    for step in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|(_, path)| {
                path.values()
                    .get(step)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            })
            .collect();
        writeln!(file, "{},{}", step, cells.join(","))?;
    }
    file.flush()?;
    Ok(())
}

pub fn write_summary_to_csv<K, V>(filename: impl AsRef<Path>, summary_data: &[(K, V)]) -> SdeResult<()>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut file = File::create(filename)?;
    for (key, value) in summary_data {
        writeln!(file, "{},{}", key.as_ref(), value.as_ref())?;
    }
    Ok(())
}
