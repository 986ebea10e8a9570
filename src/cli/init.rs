use std::fs;
use std::path::Path;

use super::InitArgs;
use gridplan::config::Config;
use gridplan::error::GridplanError;

pub fn execute(args: InitArgs, config_path: &Path) -> anyhow::Result<()> {
    let path = args.path.as_deref().unwrap_or(config_path);

    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    write_default_config(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn write_default_config(path: &Path) -> Result<(), GridplanError> {
    let yaml = Config::default().to_yaml()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, yaml)?;
    Ok(())
}
