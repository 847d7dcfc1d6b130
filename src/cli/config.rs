use std::path::Path;

use crate::error::Result;
use crate::settings::load_settings;

pub fn run(settings_path: &Path) -> Result<()> {
    let settings = load_settings(settings_path);
    println!("# {}", settings_path.display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
