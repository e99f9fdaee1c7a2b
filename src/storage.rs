use crate::model::{CalendarMonth, CalendarResult, StagedRoster};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait CalendarStore {
    /// Sauvegarde de manière atomique ; remplace le calendrier de même clé.
    fn save(&self, result: &CalendarResult) -> anyhow::Result<()>;
    /// Calendrier d'une usine pour un mois, s'il existe.
    fn load(&self, plant: &str, month: CalendarMonth) -> anyhow::Result<Option<CalendarResult>>;
    /// Clés `(usine, "<Month> <Year>")` disponibles.
    fn list(&self) -> anyhow::Result<Vec<(String, String)>>;
}

/// Un fichier JSON par (usine, mois) dans un répertoire.
pub struct JsonCalendarStore {
    dir: PathBuf,
}

impl JsonCalendarStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, plant: &str, month_label: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", file_stem(plant), file_stem(month_label)))
    }
}

impl CalendarStore for JsonCalendarStore {
    fn save(&self, result: &CalendarResult) -> anyhow::Result<()> {
        let path = self.path_for(&result.plant, &result.month);
        write_json_atomic(&path, result)?;
        tracing::debug!(path = %path.display(), "calendar saved");
        Ok(())
    }

    fn load(&self, plant: &str, month: CalendarMonth) -> anyhow::Result<Option<CalendarResult>> {
        let path = self.path_for(plant, &month.label());
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match read_json::<CalendarResult>(&path) {
                Ok(result) => keys.push((result.plant, result.month)),
                Err(err) => tracing::warn!(path = %path.display(), "skipping unreadable calendar: {err:#}"),
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Rosters téléversés en attente, un emplacement par usine.
pub struct RosterStage {
    dir: PathBuf,
}

impl RosterStage {
    pub fn open<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, plant: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(plant)))
    }

    /// Remplace le roster en attente pour la même usine.
    pub fn stage(&self, staged: &StagedRoster) -> anyhow::Result<()> {
        write_json_atomic(&self.path_for(&staged.plant), staged)
    }

    pub fn load(&self, plant: &str) -> anyhow::Result<Option<StagedRoster>> {
        let path = self.path_for(plant);
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    pub fn clear(&self, plant: &str) -> anyhow::Result<bool> {
        let path = self.path_for(plant);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
        Ok(true)
    }
}

/// Nom de fichier sûr, insensible à la casse : espaces → `_`, caractères hors
/// `[a-z0-9_-]` retirés.
pub(crate) fn file_stem(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))
        .with_context(|| "creating temp file")?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).with_context(|| "atomic rename")?;
    Ok(())
}
