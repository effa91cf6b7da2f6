use serde_json::{json, Value};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(data)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(data);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output key/value details; JSON gets them as an object
pub fn output_details(
    output_format: &OutputFormat,
    title: &str,
    details: &[(&str, Value)],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let object: serde_json::Map<String, Value> = details
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&Value::Object(object))?);
        }
        OutputFormat::Text => {
            println!("{}", title);
            for (key, value) in details {
                match value {
                    Value::String(s) => println!("  {}: {}", key, s),
                    Value::Null => println!("  {}: -", key),
                    other => println!("  {}: {}", key, other),
                }
            }
        }
    }
    Ok(())
}
