use anyhow::Result;

use super::{InputArgs, Session};
use crate::prompt;

pub fn run_save(session: &Session, name: &str, inputs: &InputArgs) -> Result<()> {
    let mut store = session.open_store()?;
    let resolved = inputs.resolve(session, Some(&store))?;
    let preset = store.save_preset(session.user(), name, resolved)?;
    println!("Saved preset '{}'", preset.name);
    Ok(())
}

pub fn run_show(session: &Session, name: &str) -> Result<()> {
    let store = session.open_store()?;
    let preset = store.load_preset(session.user(), name)?;
    let fields = toml::to_string(&preset.inputs)?;
    if !fields.trim().is_empty() {
        println!("{}", fields.trim_end());
        println!();
    }
    println!("{}", prompt::assemble_text(&preset.inputs));
    Ok(())
}

pub fn run_list(session: &Session) -> Result<()> {
    let store = session.open_store()?;
    let presets = store.list_presets(session.user());
    if presets.is_empty() {
        println!("No presets for {}", session.user());
        return Ok(());
    }
    for p in presets {
        println!("{}  (updated {})", p.name, p.updated_at.format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}

pub fn run_delete(session: &Session, name: &str) -> Result<()> {
    let mut store = session.open_store()?;
    store.delete_preset(session.user(), name)?;
    println!("Deleted preset '{}'", name.trim());
    Ok(())
}
