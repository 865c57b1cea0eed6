//! Potability check command

use anyhow::Result;
use monitor_lib::{Assessment, PotabilityMonitor, ScoringConfig, WaterReadings};
use tabled::Tabled;

use crate::output::{print_success, print_warning, OutputFormat};

/// Row for the readings table shown with a non-potable verdict
#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Measurement")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Score one set of readings and print the verdict.
pub async fn run_check(readings: &WaterReadings, format: OutputFormat) -> Result<()> {
    let config = ScoringConfig::load()?;
    let monitor = PotabilityMonitor::new(&config)?;
    let record = readings.to_record();

    let (prediction, assessment) = monitor.check(&record).await?;

    match format {
        OutputFormat::Json => {
            let mut document = serde_json::json!({
                "verdict": if assessment.is_potable() { "potable" } else { "non_potable" },
                "label": prediction.label,
                "generated_at": prediction.generated_at,
                "response": prediction.response,
            });
            if let Assessment::NonPotable { readings } = &assessment {
                let map: serde_json::Map<String, serde_json::Value> = readings
                    .iter()
                    .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
                    .collect();
                document["readings"] = serde_json::Value::Object(map);
            }
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Table => {
            println!("Prediction result: Potability = {}", prediction.label);
            match &assessment {
                Assessment::Potable => print_success(assessment.headline()),
                Assessment::NonPotable { readings } => {
                    print_warning(assessment.headline());
                    print_warning("Water quality may be compromised. Further investigation recommended.");
                    println!("\nInvestigate the following readings:");

                    let rows: Vec<ReadingRow> = readings
                        .iter()
                        .map(|(name, value)| ReadingRow {
                            name: name.to_string(),
                            value: value.to_string(),
                        })
                        .collect();
                    let table = tabled::Table::new(rows)
                        .with(tabled::settings::Style::rounded())
                        .to_string();
                    println!("{table}");
                }
            }
        }
    }

    Ok(())
}
