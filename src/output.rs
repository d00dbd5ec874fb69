use crate::Result;
use crate::extract::Output;

/// Render the selected projection the way it is printed to stdout
pub fn render(output: &Output) -> Result<String> {
    let rendered = match output {
        Output::Duration(minutes) => minutes.to_string(),
        Output::Transcript(text) => text.clone(),
        Output::Comments(comments) => serde_json::to_string_pretty(comments)?,
        Output::Full(record) => serde_json::to_string_pretty(record)?,
    };
    Ok(rendered)
}
