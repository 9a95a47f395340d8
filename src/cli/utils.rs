use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;

/// Print structured data as JSON or YAML; text callers format their own tables
pub fn output_data<T: Serialize>(output_format: &OutputFormat, data: &T) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(data)?),
        _ => println!("{}", serde_json::to_string_pretty(data)?),
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        _ => output_data(output_format, &json!({ "success": false, "error": message }))?,
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Text => println!("{}", message),
        _ => output_data(output_format, &json!({ collection_name: [] }))?,
    }
    Ok(())
}
