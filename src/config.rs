/// External configuration loader.
///
/// Looks for `config.toml` next to the executable, in the working
/// directory, under `$XDG_CONFIG_HOME/skulldozer`, then under
/// `/usr/share/skulldozer`. A missing or broken file never stops the
/// game; every key falls back to its default.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub levels_dir: PathBuf,
    pub display: DisplayConfig,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub color: bool,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    display: TomlDisplay,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_color")]
    color: bool,
}

// ── Defaults ──

fn default_levels_dir() -> String { "levels".into() }
fn default_color() -> bool { true }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            color: default_color(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load `config.toml` from the first candidate directory holding
    /// one. Missing file or missing keys fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // A relative levels_dir is looked up in the same places as
        // the config file itself.
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                // Nothing found anywhere: leave it relative to CWD.
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            levels_dir,
            display: DisplayConfig {
                color: toml_cfg.display.color,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so /usr/bin/skulldozer → /usr/games/skulldozer
        // still finds data relative to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG config home (~/.config/skulldozer)
    let xdg = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .map(|base| base.join("skulldozer"));
    if let Ok(xdg) = xdg {
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/skulldozer)
    let sys = PathBuf::from("/usr/share/skulldozer");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First `config.toml` found among the candidates wins. A file that
/// exists but does not parse means the defaults, not a further search.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Warning: could not read {}: {e}", path.display());
                continue;
            }
        };
        match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => return cfg,
            Err(e) => {
                eprintln!("Warning: {} is not valid TOML: {e}", path.display());
                eprintln!("Using default settings.");
                return TomlConfig::default();
            }
        }
    }
    TomlConfig::default()
}
