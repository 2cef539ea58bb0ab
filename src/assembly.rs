//! Writes synthesized stacks to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DeclarationError;
use crate::stack::Stack;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub template_file: String,
    pub environment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub stacks: Vec<ManifestEntry>,
}

impl Manifest {
    /// Read `manifest.json` from `dir`, or start empty if there is none.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, DeclarationError> {
        let path = dir.as_ref().join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(Manifest::default());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Replace the entry with the same stack name, or append a new one.
    pub fn upsert(&mut self, entry: ManifestEntry) {
        match self.stacks.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.stacks.push(entry),
        }
    }

    pub fn entry(&self, name: &str) -> Option<&ManifestEntry> {
        self.stacks.iter().find(|e| e.name == name)
    }
}

pub fn template_file_name(stack: &Stack) -> String {
    format!("{}.template.json", stack.name())
}

/// Write one `<stack-name>.template.json` per stack and record each in
/// `manifest.json`. Creates `dir` if needed and overwrites existing
/// templates. Entries for stacks written by earlier runs are kept, so
/// `synth target` followed by `synth tools` lists both.
pub fn write_assembly(dir: impl AsRef<Path>, stacks: &[Stack]) -> Result<Manifest, DeclarationError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut manifest = Manifest::load(dir)?;
    for stack in stacks {
        let file_name = template_file_name(stack);
        let rendered = serde_json::to_string_pretty(&stack.to_template()?)?;
        let path: PathBuf = dir.join(&file_name);
        fs::write(&path, rendered)?;

        info!(
            event = "Synth",
            phase = "Write",
            stack = stack.name(),
            path = path.display().to_string()
        );
        manifest.upsert(ManifestEntry {
            name: stack.name().to_string(),
            template_file: file_name,
            environment: stack.environment().to_string(),
        });
    }

    fs::write(
        dir.join(MANIFEST_FILE),
        serde_json::to_string_pretty(&manifest)?,
    )?;
    Ok(manifest)
}
