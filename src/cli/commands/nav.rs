use crate::app::App;
use crate::cli::utils::output_resolved;
use crate::cli::OutputFormat;

pub fn handle(location: &str, app: &App, output_format: OutputFormat) -> anyhow::Result<()> {
    let resolved = app.open_location(location);
    output_resolved(&output_format, &resolved)
}
