use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// A throwaway game instance with an empty `mods/` directory.
pub struct Instance {
    pub dir: TempDir,
}

impl Instance {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join("mods")).expect("mods dir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.dir.path().join("mods")
    }

    /// Start describing a jar placed under `mods/`.
    pub fn jar(&self, file_name: &str) -> JarBuilder {
        JarBuilder {
            path: self.mods_dir().join(file_name),
            entries: Vec::new(),
        }
    }
}

pub struct JarBuilder {
    path: PathBuf,
    entries: Vec<(String, Vec<u8>)>,
}

impl JarBuilder {
    /// Declare one `[[mods]]` table per `(mod_id, version)` pair.
    pub fn mods_toml(mut self, mods: &[(&str, &str)]) -> Self {
        let mut toml = String::from("modLoader=\"javafml\"\nloaderVersion=\"[36,)\"\n");
        for (mod_id, version) in mods {
            toml.push_str(&format!(
                "\n[[mods]]\nmodId=\"{mod_id}\"\nversion=\"{version}\"\n"
            ));
        }
        self.entries
            .push(("META-INF/mods.toml".to_string(), toml.into_bytes()));
        self
    }

    pub fn manifest_version(mut self, version: &str) -> Self {
        let manifest =
            format!("Manifest-Version: 1.0\r\nImplementation-Version: {version}\r\n\r\n");
        self.entries
            .push(("META-INF/MANIFEST.MF".to_string(), manifest.into_bytes()));
        self
    }

    pub fn entry(mut self, name: &str, contents: &str) -> Self {
        self.entries
            .push((name.to_string(), contents.as_bytes().to_vec()));
        self
    }

    pub fn write(self) -> PathBuf {
        write_jar(&self.path, &self.entries).expect("write jar");
        self.path
    }
}

fn write_jar(path: &Path, entries: &[(String, Vec<u8>)]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ZipWriter::new(file);
    for (name, contents) in entries {
        writer.start_file(name.as_str(), SimpleFileOptions::default())?;
        writer.write_all(contents)?;
    }
    writer.finish()?;
    Ok(())
}

/// Run the compiled `hellas` binary against `instance` with a clean environment.
pub fn run_hellas(instance: &Instance, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hellas"));
    cmd.arg("--game-dir")
        .arg(instance.root())
        .args(args)
        .env_remove("HELLAS_GAME_DIR")
        .env_remove("HELLAS_MODS_DIR")
        .env_remove("HELLAS_CATALOG")
        .env_remove("HELLAS_COMMAND_ROOT")
        .env_remove("RUST_LOG");
    cmd.output()
        .unwrap_or_else(|err| panic!("failed to run {:?}: {err}", cmd))
}

pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
