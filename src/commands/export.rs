use crate::args::{ExportArgs, ExportFormat};
use crate::commands::Out;
use crate::{Config, Result};

/// Writes every transaction to `args.path` in the chosen format, overwriting the file.
///
/// # Errors
///
/// - Returns an `ErrorType::Io` error if the file cannot be written.
pub fn export(config: &Config, args: ExportArgs) -> Result<Out<usize>> {
    let store = config.transaction_store();
    match args.format {
        ExportFormat::Csv => store.export_csv(&args.path)?,
        ExportFormat::Json => store.export_json(&args.path)?,
    }
    Ok(Out::new(
        format!(
            "Exported {} transactions to {}",
            store.len(),
            args.path.display()
        ),
        store.len(),
    ))
}
