//! On-disk configuration fixtures.

use plexus_core::config::{AppConfig, ExtensionConfig};
use plexus_core::error::Result;
use std::fs;
use std::path::Path;

/// Materialize an `application.json` + `extensions/*.json` tree under
/// `root`, ready for [`plexus_core::config::ConfigStore`].
pub fn write_config_tree(
    root: &Path,
    app: &AppConfig,
    extensions: &[(&str, &ExtensionConfig)],
) -> Result<()> {
    let extensions_dir = root.join("extensions");
    fs::create_dir_all(&extensions_dir)?;

    fs::write(
        root.join("application.json"),
        serde_json::to_vec_pretty(app)?,
    )?;

    for (identifier, config) in extensions {
        fs::write(
            extensions_dir.join(format!("{identifier}.json")),
            serde_json::to_vec_pretty(config)?,
        )?;
    }

    Ok(())
}
