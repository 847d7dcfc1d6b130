use std::path::Path;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(settings_path: &Path) -> Result<()> {
    let settings = load_settings(settings_path);
    save_settings(settings_path, &settings)?;

    for file in [&settings.input_path, &settings.enriched_path, &settings.report_path] {
        let expanded = shellexpand_path(file);
        if let Some(parent) = Path::new(&expanded).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    println!("Settings written to {}", settings_path.display());
    println!("Input file:     {}", settings.input_path);
    println!("Enriched file:  {}", settings.enriched_path);
    println!("Report file:    {}", settings.report_path);
    Ok(())
}
