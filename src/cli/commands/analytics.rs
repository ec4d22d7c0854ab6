use chrono::Utc;

use crate::app::App;
use crate::cli::OutputFormat;

pub fn handle(app: &App, output_format: OutputFormat) -> anyhow::Result<()> {
    let summary = app.visits.summary(Utc::now().date_naive());
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => {
            println!("Total visits: {}", summary.total);
            println!("Visits today: {}", summary.today);
        }
    }
    Ok(())
}
