//! Config command - show the effective configuration or write it to disk.

use seek_core::Config;
use std::path::PathBuf;

/// Run the config command.
///
/// `path` is the `--config` override; without it the platform default
/// location is used.
pub fn run(config: Config, path: Option<PathBuf>, init: bool, force: bool) -> anyhow::Result<()> {
    let target = match &path {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };

    if !init {
        println!("Config file: {}", target.display());
        println!("  Present:     {}", if target.exists() { "yes" } else { "no" });
        println!("  Max results: {}", config.general.max_results);
        println!("  Crawl root:  {}", config.files.root.display());
        println!("  Excluded:    {}", config.files.exclude.join(", "));
        println!(
            "  Terminal:    {} {}",
            config.terminal.program,
            config.terminal.args.join(" ")
        );
        return Ok(());
    }

    if target.exists() && !force {
        anyhow::bail!(
            "{} already exists (pass --force to overwrite it)",
            target.display()
        );
    }

    match path {
        Some(path) => config.save_to(&path)?,
        None => config.save()?,
    }
    println!("Wrote {}", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_effective_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seek").join("seek.toml");

        let mut config = Config::default();
        config.general.max_results = 7;
        config.terminal.program = "foot".to_string();

        run(config.clone(), Some(path.clone()), true, false).unwrap();

        let written = Config::load_from(&path).unwrap();
        assert_eq!(written.general.max_results, 7);
        assert_eq!(written.terminal.program, "foot");
    }

    #[test]
    fn test_init_keeps_existing_file_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seek.toml");
        std::fs::write(&path, "[general]\nmax_results = 3\n").unwrap();

        let mut config = Config::default();
        config.general.max_results = 9;

        assert!(run(config.clone(), Some(path.clone()), true, false).is_err());
        assert_eq!(Config::load_from(&path).unwrap().general.max_results, 3);

        run(config, Some(path.clone()), true, true).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().general.max_results, 9);
    }

    #[test]
    fn test_show_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seek.toml");

        run(Config::default(), Some(path.clone()), false, false).unwrap();
        assert!(!path.exists());
    }
}
