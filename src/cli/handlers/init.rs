use std::path::Path;

use crate::io::config_io;

/// Create the data directory and a starter config.toml
pub fn cmd_init(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_io::init_data_dir(data_dir)?;
    tracing::info!(path = %path.display(), "initialized data directory");
    println!("created {}", path.display());
    println!("edit [[users]] to set up your roster, then run `plank` to open the board");
    Ok(())
}
