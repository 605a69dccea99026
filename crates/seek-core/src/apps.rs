//! Installed application discovery.
//!
//! The Application provider asks an [`AppCatalog`] for every installed
//! application on each query. The default catalog reads freedesktop
//! `.desktop` entries from the XDG application directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// One launchable application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    /// Display name
    pub name: String,

    /// Program to execute
    pub executable: PathBuf,

    /// Arguments passed to the program
    pub args: Vec<String>,
}

impl AppEntry {
    pub fn new(name: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        AppEntry {
            name: name.into(),
            executable: executable.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

/// Source of installed applications.
pub trait AppCatalog: Send + Sync {
    fn applications(&self) -> Vec<Arc<AppEntry>>;
}

impl AppCatalog for Vec<Arc<AppEntry>> {
    fn applications(&self) -> Vec<Arc<AppEntry>> {
        self.clone()
    }
}

/// Catalog backed by `.desktop` files.
#[derive(Debug, Clone)]
pub struct DesktopEntryCatalog {
    dirs: Vec<PathBuf>,
}

impl DesktopEntryCatalog {
    /// Read entries from the given directories, in order.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        DesktopEntryCatalog { dirs }
    }

    /// Use the XDG application directories.
    pub fn xdg() -> Self {
        let mut dirs = Vec::new();
        if let Some(base) = directories::BaseDirs::new() {
            dirs.push(base.data_dir().join("applications"));
        }
        let data_dirs = std::env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
        dirs.extend(
            data_dirs
                .split(':')
                .filter(|d| !d.is_empty())
                .map(|d| Path::new(d).join("applications")),
        );
        Self::new(dirs)
    }

    /// Directories scanned by this catalog.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl AppCatalog for DesktopEntryCatalog {
    fn applications(&self) -> Vec<Arc<AppEntry>> {
        let mut apps = Vec::new();
        for dir in &self.dirs {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) => {
                    debug!(dir = %dir.display(), error = %err, "Skipping application directory");
                    continue;
                }
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map_or(true, |ext| ext != "desktop") {
                    continue;
                }
                match fs::read_to_string(&path) {
                    Ok(contents) => {
                        if let Some(app) = parse_desktop_entry(&contents) {
                            apps.push(Arc::new(app));
                        }
                    }
                    Err(err) => {
                        debug!(
                            path = %path.display(),
                            error = %err,
                            "Failed to read desktop entry"
                        );
                    }
                }
            }
        }
        apps
    }
}

/// Parse the `[Desktop Entry]` group of a `.desktop` file.
///
/// Returns `None` for hidden entries, non-applications and entries without a
/// name or command.
pub fn parse_desktop_entry(contents: &str) -> Option<AppEntry> {
    let mut in_entry = false;
    let mut name = None;
    let mut exec = None;
    let mut is_application = false;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            in_entry = line == "[Desktop Entry]";
            continue;
        }
        if !in_entry {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match (key.trim(), value.trim()) {
            ("Name", v) => name = Some(v.to_string()),
            ("Exec", v) => exec = Some(v.to_string()),
            ("Type", v) => is_application = v == "Application",
            ("NoDisplay" | "Hidden", "true") => return None,
            _ => {}
        }
    }

    if !is_application {
        return None;
    }

    let mut argv = split_exec(&exec?);
    if argv.is_empty() {
        return None;
    }
    let program = argv.remove(0);

    Some(AppEntry::new(name?, program).with_args(argv))
}

/// Split an `Exec=` value into arguments, honoring double quotes and
/// dropping `%f`-style field codes.
fn split_exec(exec: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    let mut chars = exec.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }

    args.into_iter()
        .filter_map(|arg| {
            if arg.len() == 2 && arg.starts_with('%') {
                return None;
            }
            Some(arg.replace("%%", "%"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIREFOX: &str = "\
[Desktop Entry]
Version=1.0
Name=Firefox Web Browser
Exec=firefox %u
Icon=firefox
Type=Application

[Desktop Action new-window]
Name=Open a New Window
Exec=firefox --new-window %u
";

    #[test]
    fn test_parse_entry() {
        let app = parse_desktop_entry(FIREFOX).unwrap();
        assert_eq!(app.name, "Firefox Web Browser");
        assert_eq!(app.executable, PathBuf::from("firefox"));
        assert!(app.args.is_empty());
    }

    #[test]
    fn test_parse_hidden_entry() {
        let contents =
            "[Desktop Entry]\nName=Helper\nExec=helper\nType=Application\nNoDisplay=true\n";
        assert!(parse_desktop_entry(contents).is_none());
    }

    #[test]
    fn test_parse_non_application() {
        let contents = "[Desktop Entry]\nName=Docs\nURL=https://example.com\nType=Link\n";
        assert!(parse_desktop_entry(contents).is_none());
    }

    #[test]
    fn test_split_exec() {
        assert_eq!(
            split_exec(r#""/opt/My App/run" --flag %F 100%%"#),
            vec!["/opt/My App/run", "--flag", "100%"]
        );
        assert_eq!(split_exec(r#"sh -c "echo \"hi\"""#), vec!["sh", "-c", "echo \"hi\""]);
        assert!(split_exec("   ").is_empty());
    }

    #[test]
    fn test_catalog_reads_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("firefox.desktop"), FIREFOX).unwrap();
        fs::write(
            dir.path().join("editor.desktop"),
            "[Desktop Entry]\nName=Text Editor\n\
             Exec=/usr/bin/gedit --new-window\nType=Application\n",
        )
        .unwrap();
        fs::write(dir.path().join("README"), "not an entry").unwrap();

        let catalog = DesktopEntryCatalog::new(vec![
            dir.path().to_path_buf(),
            dir.path().join("missing"),
        ]);
        let mut apps = catalog.applications();
        apps.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].name, "Firefox Web Browser");
        assert_eq!(apps[1].executable, PathBuf::from("/usr/bin/gedit"));
        assert_eq!(apps[1].args, vec!["--new-window".to_string()]);
    }
}
