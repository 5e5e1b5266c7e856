use std::io::Write;

use miette::IntoDiagnostic;
use peptidoform::ResultRow;
use polars::prelude::*;

// Constants ===========================================================================================================

struct OutputColumns;
impl OutputColumns {
    const SEQUENCE: &str = "sequence";
    const PEPTIDOFORM: &str = "peptidoform";
    const Z: &str = "z";
    const MZ: &str = "m/z";
}

// Public API ==========================================================================================================

/// Writes `rows` as a CSV table with a `sequence,peptidoform,z,m/z` header
///
/// # Errors
///
/// Fails if the table can't be built or if `writer` can't be written to
pub fn write_csv(rows: &[ResultRow], mut writer: impl Write) -> miette::Result<()> {
    let mut df = rows_to_df(rows).into_diagnostic()?;
    CsvWriter::new(&mut writer).finish(&mut df).into_diagnostic()
}

// ---------------------------------------------------------------------------------------------------------------------

fn rows_to_df(rows: &[ResultRow]) -> PolarsResult<DataFrame> {
    let sequences: Vec<_> = rows.iter().map(|r| r.sequence.as_str()).collect();
    let peptidoforms: Vec<_> = rows.iter().map(|r| r.peptidoform.as_str()).collect();
    let charges: Vec<_> = rows.iter().map(|r| r.z).collect();
    // NOTE: Written as text so that no precision is lost to `f64`
    let mzs: Vec<_> = rows.iter().map(|r| r.mz.normalize().to_string()).collect();

    df!(
        OutputColumns::SEQUENCE => sequences,
        OutputColumns::PEPTIDOFORM => peptidoforms,
        OutputColumns::Z => charges,
        OutputColumns::MZ => mzs,
    )
}
