// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Argument parsing and command execution.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use customizer_bridge::cfg_file::update_all_config_files;
use customizer_bridge::decor::{DecorToggle, load_decor_toggles, save_decor_toggles};
use customizer_bridge::font::{FontSettings, load_font_settings, resolve_font_path};
use customizer_bridge::fs_resolver::DirectoryResolver;
use customizer_bridge::localization::{LocalizedText, load_localization};
use customizer_bridge::{PickerBridge, ProviderBridge};
use customizer_core::config::BridgeConfig;
use customizer_core::types::{ActivityResult, AssetPath, NATIVE_LIBRARIES, PICK_IMAGE_REQUEST};

pub const USAGE: &str = "\
usage: customizer [--game-dir <dir>] <command> [args]

commands:
  create <path>              create an empty file
  exists <path>              exit 0 if the file is listed
  read <path>                print a text file
  write <path> [line]...     replace a text file
  copy <source> <name>       copy a local file into decor/<name>
  rename <file> <new-name>   rename decor/<base name of file>
  delete <file>              delete decor/<base name of file>
  import <file>              stage a local image as if it had been picked
  decor [name=true|false]... list or change built-in decor toggles
  font                       show font settings and the resolved font file
  localization               show caption texts
  save-config                rewrite decor.cfg, font.cfg and localization.cfg
  libraries                  list the native libraries the app loads";

/// Malformed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage(pub String);

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(String),
    Exists(String),
    Read(String),
    Write { path: String, lines: Vec<String> },
    Copy { source: PathBuf, name: String },
    Rename { file: String, new_name: String },
    Delete(String),
    Import(PathBuf),
    Decor(Vec<(String, bool)>),
    Font,
    Localization,
    SaveConfig,
    Libraries,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub game_dir: Option<PathBuf>,
    pub command: Command,
}

pub fn parse<I>(args: I) -> Result<Invocation, Usage>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let mut game_dir = None;

    if args.peek().map(String::as_str) == Some("--game-dir") {
        args.next();
        let dir = args
            .next()
            .ok_or_else(|| Usage("--game-dir needs a value".into()))?;
        game_dir = Some(PathBuf::from(dir));
    }

    let name = args.next().ok_or_else(|| Usage("missing command".into()))?;
    let rest: Vec<String> = args.collect();

    let command = match (name.as_str(), rest.as_slice()) {
        ("create", [path]) => Command::Create(path.clone()),
        ("exists", [path]) => Command::Exists(path.clone()),
        ("read", [path]) => Command::Read(path.clone()),
        ("write", [path, lines @ ..]) => Command::Write {
            path: path.clone(),
            lines: lines.to_vec(),
        },
        ("copy", [source, name]) => Command::Copy {
            source: PathBuf::from(source),
            name: name.clone(),
        },
        ("rename", [file, new_name]) => Command::Rename {
            file: file.clone(),
            new_name: new_name.clone(),
        },
        ("delete", [file]) => Command::Delete(file.clone()),
        ("import", [file]) => Command::Import(PathBuf::from(file)),
        ("decor", toggles) => Command::Decor(
            toggles
                .iter()
                .map(String::as_str)
                .map(parse_toggle)
                .collect::<Result<_, _>>()?,
        ),
        ("font", []) => Command::Font,
        ("localization", []) => Command::Localization,
        ("save-config", []) => Command::SaveConfig,
        ("libraries", []) => Command::Libraries,
        (
            "create" | "exists" | "read" | "write" | "copy" | "rename" | "delete" | "import"
            | "font" | "localization" | "save-config" | "libraries",
            _,
        ) => return Err(Usage(format!("wrong number of arguments for {name}"))),
        _ => return Err(Usage(format!("unknown command: {name}"))),
    };

    Ok(Invocation { game_dir, command })
}

fn parse_toggle(arg: &str) -> Result<(String, bool), Usage> {
    match arg.split_once('=') {
        Some((name, "true")) if !name.is_empty() => Ok((name.to_owned(), true)),
        Some((name, "false")) if !name.is_empty() => Ok((name.to_owned(), false)),
        _ => Err(Usage(format!("expected name=true|false, got {arg}"))),
    }
}

/// Bridges rooted at one game directory.
pub struct Context {
    game_dir: PathBuf,
    provider: ProviderBridge<DirectoryResolver>,
    picker: PickerBridge<DirectoryResolver>,
}

impl Context {
    pub fn new(game_dir: &Path, config: BridgeConfig) -> Self {
        let resolver = DirectoryResolver::new(game_dir, config.provider_authority.clone());
        Self {
            game_dir: game_dir.to_path_buf(),
            provider: ProviderBridge::new(resolver.clone(), config.clone()),
            picker: PickerBridge::new(resolver, config, game_dir),
        }
    }

    /// Run `command`, writing its output to `out`. `Ok(false)` means the
    /// operation failed (the reason has been logged).
    pub fn run(&self, command: &Command, out: &mut impl Write) -> io::Result<bool> {
        let ok = match command {
            Command::Create(path) => self.provider.create_file(path),
            Command::Exists(path) => {
                let exists = self.provider.exists(path);
                writeln!(out, "{exists}")?;
                exists
            }
            Command::Read(path) => match self.provider.try_read_full_text(&AssetPath::new(path.as_str())) {
                Ok(text) => {
                    out.write_all(text.as_bytes())?;
                    true
                }
                Err(e) => {
                    tracing::error!(path = %path, error = %e, "read failed");
                    false
                }
            },
            Command::Write { path, lines } => self.provider.write_text_file(path, lines.as_slice()),
            Command::Copy { source, name } => self.provider.copy_file(source, name),
            Command::Rename { file, new_name } => self.provider.rename_decor_file(file, new_name),
            Command::Delete(file) => self.provider.delete_decor_file(file),
            Command::Import(file) => return self.import(file, out),
            Command::Decor(changes) => return self.decor(changes, out),
            Command::Font => return self.font(out),
            Command::Localization => {
                for entry in load_localization(&self.provider, &LocalizedText::standard()) {
                    writeln!(out, "{}={}", entry.key, entry.text.replace('\n', "\\n"))?;
                }
                true
            }
            Command::SaveConfig => update_all_config_files(
                &self.provider,
                &load_localization(&self.provider, &LocalizedText::standard()),
                &load_font_settings(&self.provider, &FontSettings::default()),
                &load_decor_toggles(&self.provider, &DecorToggle::standard()),
            ),
            Command::Libraries => {
                for library in NATIVE_LIBRARIES {
                    writeln!(out, "{library}")?;
                }
                true
            }
        };
        Ok(ok)
    }

    fn import(&self, file: &Path, out: &mut impl Write) -> io::Result<bool> {
        let absolute = std::path::absolute(file)?;
        let result = ActivityResult::ok(PICK_IMAGE_REQUEST, format!("file://{}", absolute.display()));

        let sink = |path: &Path, bytes: &[u8]| {
            tracing::info!(path = %path.display(), bytes = bytes.len(), "image received");
        };
        let picked = self.picker.on_pick_result(&result, &sink);
        if picked {
            writeln!(out, "staged in {}", self.picker.cache_dir().display())?;
        }
        Ok(picked)
    }

    fn decor(&self, changes: &[(String, bool)], out: &mut impl Write) -> io::Result<bool> {
        let mut toggles = load_decor_toggles(&self.provider, &DecorToggle::standard());

        if !changes.is_empty() {
            for (name, enabled) in changes {
                match toggles.iter_mut().find(|t| &t.name == name) {
                    Some(toggle) => toggle.enabled = *enabled,
                    None => toggles.push(DecorToggle::new(name.clone(), *enabled)),
                }
            }
            if !save_decor_toggles(&self.provider, &toggles) {
                return Ok(false);
            }
        }

        for toggle in &toggles {
            writeln!(out, "{}={}", toggle.name, toggle.enabled)?;
        }
        Ok(true)
    }

    fn font(&self, out: &mut impl Write) -> io::Result<bool> {
        let settings = load_font_settings(&self.provider, &FontSettings::default());
        writeln!(out, "font={}", settings.font)?;
        writeln!(out, "font_size={}", settings.font_size)?;
        writeln!(out, "other_text_font_size={}", settings.other_text_font_size)?;
        if let Some(path) = resolve_font_path(&settings.font, &self.game_dir) {
            writeln!(out, "resolved={}", path.display())?;
        }
        Ok(true)
    }

    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_owned).collect()
    }

    fn run(ctx: &Context, line: &str) -> (bool, String) {
        let invocation = parse(args(line)).expect("usage");
        let mut out = Vec::new();
        let ok = ctx.run(&invocation.command, &mut out).expect("io");
        (ok, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn parses_game_dir_and_write() {
        let invocation = parse(args("--game-dir /g write notes.txt a b")).expect("parse");
        assert_eq!(invocation.game_dir, Some(PathBuf::from("/g")));
        assert_eq!(
            invocation.command,
            Command::Write {
                path: "notes.txt".into(),
                lines: vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn usage_errors() {
        assert!(parse(args("")).is_err());
        assert!(parse(args("frobnicate")).is_err());
        assert!(parse(args("copy only-one")).is_err());
        assert!(parse(args("decor grass=maybe")).is_err());
        assert!(parse(args("--game-dir")).is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = Context::new(dir.path(), BridgeConfig::default());

        assert_eq!(run(&ctx, "exists notes.txt"), (false, "false\n".into()));
        assert!(run(&ctx, "create notes.txt").0);
        assert_eq!(run(&ctx, "exists notes.txt"), (true, "true\n".into()));
        assert!(run(&ctx, "write notes.txt one two").0);
        assert_eq!(run(&ctx, "read notes.txt"), (true, "one\ntwo\n".into()));
        assert!(!run(&ctx, "read missing.txt").0);
    }

    #[test]
    fn decor_file_lifecycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("lamp-upload.png");
        fs::write(&source, b"png").expect("seed");
        let ctx = Context::new(dir.path(), BridgeConfig::default());

        assert!(run(&ctx, &format!("copy {} lamp.png", source.display())).0);
        assert!(dir.path().join("decor/lamp.png").is_file());

        assert!(run(&ctx, "rename /anywhere/lamp.png light.png").0);
        assert!(dir.path().join("decor/light.png").is_file());

        assert!(run(&ctx, "delete light.png").0);
        assert!(!run(&ctx, "delete light.png").0);
    }

    #[test]
    fn import_stages_picked_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let photo = dir.path().join("photo.png");
        fs::write(&photo, b"\x89PNG\r\n\x1a\n").expect("seed");
        let game = dir.path().join("game");
        let ctx = Context::new(&game, BridgeConfig::default());

        let (ok, out) = run(&ctx, &format!("import {}", photo.display()));
        assert!(ok);
        assert!(out.starts_with("staged in"));
        assert!(game.join("decor/photo.png").is_file());
    }

    #[test]
    fn decor_toggles_persist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = Context::new(dir.path(), BridgeConfig::default());

        let (ok, out) = run(&ctx, "decor grass=false");
        assert!(ok);
        assert!(out.starts_with("grass=false\n"));

        let text = fs::read_to_string(dir.path().join("decor.cfg")).expect("decor.cfg");
        assert!(text.contains("grass=false"));
        assert!(text.contains("flower1=true"));
    }

    #[test]
    fn font_reports_resolved_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("font.cfg"), "FONT=\"serif.ttf\"\nFONT_SIZE=30\n").expect("seed");
        fs::write(dir.path().join("serif.ttf"), b"ttf").expect("seed");
        let ctx = Context::new(dir.path(), BridgeConfig::default());

        let (ok, out) = run(&ctx, "font");
        assert!(ok);
        assert!(out.starts_with("font=serif.ttf\nfont_size=30\nother_text_font_size=48\n"));
        assert!(out.contains("resolved="));
    }

    #[test]
    fn save_config_writes_every_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("localization.cfg"), "ENDLESS_MODE=\"FOREVER\"\n").expect("seed");
        let ctx = Context::new(dir.path(), BridgeConfig::default());

        assert!(run(&ctx, "save-config").0);
        let localization =
            fs::read_to_string(dir.path().join("localization.cfg")).expect("localization.cfg");
        assert!(localization.starts_with("ENDLESS_MODE=\"FOREVER\"\n"));
        assert!(localization.contains("LOADING_TEXT=\"Loading...\""));
        assert!(dir.path().join("font.cfg").is_file());
        assert!(dir.path().join("decor.cfg").is_file());

        let (ok, out) = run(&ctx, "localization");
        assert!(ok);
        assert!(out.contains("ENDLESS_MODE=FOREVER\n"));
        assert!(out.contains("IDLE=Instructions:\\n"));
    }

    #[test]
    fn libraries_are_listed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = Context::new(dir.path(), BridgeConfig::default());
        let (ok, out) = run(&ctx, "libraries");
        assert!(ok);
        assert_eq!(out.lines().count(), NATIVE_LIBRARIES.len());
    }
}
