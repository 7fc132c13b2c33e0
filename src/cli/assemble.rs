use anyhow::Result;
use serde_json::json;

use super::{InputArgs, Session};
use crate::prompt::{self, AssembleMode, Assembled};

pub fn run(
    session: &Session,
    inputs: &InputArgs,
    segments: bool,
    labeled: bool,
    json: bool,
) -> Result<()> {
    let resolved = inputs.resolve_with_session(session)?;
    let mode = if segments || labeled {
        AssembleMode::Segments
    } else {
        AssembleMode::Text
    };

    let rendered = render(prompt::assemble(&resolved, mode), segments, labeled, json)?;
    println!("{}", rendered);
    Ok(())
}

fn render(assembled: Assembled, segments: bool, labeled: bool, json: bool) -> Result<String> {
    Ok(match assembled {
        Assembled::Text(text) if json => serde_json::to_string_pretty(&json!({ "prompt": text }))?,
        Assembled::Text(text) => text,
        Assembled::Segments(segs) if json => {
            serde_json::to_string_pretty(&json!({ "segments": segs }))?
        }
        Assembled::Segments(segs) if segments => segs
            .iter()
            .map(|s| format!("[{}] {}", s.label, s.text))
            .collect::<Vec<_>>()
            .join("\n"),
        Assembled::Segments(segs) => prompt::flatten(&segs, labeled),
    })
}
