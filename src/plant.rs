use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration d'une usine : value streams → lignes, dans l'ordre déclaré.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantConfig {
    pub plant: String,
    #[serde(default)]
    pub value_streams: IndexMap<String, Vec<String>>,
}

impl PlantConfig {
    pub fn new<S: Into<String>>(plant: S) -> Self {
        Self {
            plant: plant.into(),
            value_streams: IndexMap::new(),
        }
    }

    /// Ajoute (ou remplace) un value stream avec ses lignes.
    pub fn with_stream<S, I, L>(mut self, name: S, lines: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.value_streams
            .insert(name.into(), lines.into_iter().map(Into::into).collect());
        self
    }

    /// Construit la configuration à partir des comptes de lignes, en préférant
    /// les noms explicites quand ils existent (`"<VS> Line <i>"` sinon).
    pub fn resolve(
        plant: &str,
        counts: &IndexMap<String, u32>,
        names: Option<&IndexMap<String, Vec<String>>>,
    ) -> Self {
        let mut config = Self::new(plant);
        for (vs, count) in counts {
            let explicit = names
                .and_then(|n| n.get(vs))
                .filter(|lines| !lines.is_empty());
            let lines = match explicit {
                Some(lines) => lines.clone(),
                None => (1..=*count).map(|i| format!("{vs} Line {i}")).collect(),
            };
            config.value_streams.insert(vs.clone(), lines);
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.plant.trim().is_empty() {
            bail!("plant name cannot be empty");
        }
        if self.value_streams.is_empty() {
            bail!("plant {} must declare at least one value stream", self.plant);
        }
        let mut seen = HashSet::new();
        for (vs, lines) in &self.value_streams {
            if vs.trim().is_empty() {
                bail!("value stream name cannot be empty");
            }
            if lines.is_empty() {
                bail!("value stream {vs} must contain at least one line");
            }
            for line in lines {
                if !seen.insert(line.as_str()) {
                    bail!("line {line} is declared in more than one value stream");
                }
            }
        }
        Ok(())
    }

    pub fn stream_names(&self) -> Vec<&str> {
        self.value_streams.keys().map(String::as_str).collect()
    }

    /// Toutes les lignes, value streams concaténés dans l'ordre déclaré.
    pub fn all_lines(&self) -> Vec<&str> {
        self.value_streams
            .values()
            .flat_map(|lines| lines.iter().map(String::as_str))
            .collect()
    }

    pub fn lines_of(&self, stream: &str) -> &[String] {
        self.value_streams
            .get(stream)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn line_counts(&self) -> IndexMap<String, usize> {
        self.value_streams
            .iter()
            .map(|(vs, lines)| (vs.clone(), lines.len()))
            .collect()
    }

    /// Premier value stream dont la liste contient `line`.
    pub fn stream_of(&self, line: &str) -> Option<&str> {
        self.value_streams
            .iter()
            .find(|(_, lines)| lines.iter().any(|l| l == line))
            .map(|(vs, _)| vs.as_str())
    }
}

/// Table intégrée des usines connues.
pub fn builtin_plants() -> Vec<PlantConfig> {
    vec![
        PlantConfig::new("Pune")
            .with_stream("Oil", ["Spin-On Line", "Oil Assembly Line"])
            .with_stream("EP", ["CHC TATA 1.2 NA Line"])
            .with_stream(
                "Air",
                [
                    "Hydraulic Element Line",
                    "Continuous Paper Line",
                    "Out Source Line",
                    "5 ft × 3 ft – Both Side",
                    "PU-2 Line",
                    "PU-1 Line",
                    "Line-15",
                    "Rotary Paper Line",
                    "PU-3 Line",
                    "Wire Clamp Assembly Line-1",
                    "Wire Clamp Assembly Line-2",
                    "Flat Clamp Assembly Line",
                    "TATA Air Cleaner Assembly Line",
                    "W601 Air Cleaner Assembly Line",
                    "W601 Intake System Assembly Line",
                    "P125 Air Cleaner Assembly Line",
                    "UPP Air Cleaner Assembly Line",
                    "TATA Pre Cleaner Assembly Line",
                    "PU Line-2 Square Mould",
                    "PU Line-2 Round Mould",
                    "PU Assembly Child Parts",
                    "PU Assembly Elements",
                    "PU Line-1 Packing Elements",
                ],
            ),
        PlantConfig::new("Delhi")
            .with_stream("Air", ["Line A1", "Line A2"])
            .with_stream("Oil", ["Line O1"]),
        PlantConfig::new("Parwanu")
            .with_stream("Air", ["Line P1"])
            .with_stream("CC & Others", ["CC-Line-1", "CC-Line-2"]),
        PlantConfig::new("Chennai")
            .with_stream("Air", ["Air-Line-1"])
            .with_stream("Fuel", ["Fuel-Line-1"]),
    ]
}

pub fn builtin_plant(plant: &str) -> Option<PlantConfig> {
    builtin_plants()
        .into_iter()
        .find(|p| p.plant.eq_ignore_ascii_case(plant.trim()))
}

#[derive(Debug, Clone)]
pub struct PlantInfo {
    pub config: PlantConfig,
    pub path: Option<PathBuf>,
    pub modified: Option<DateTime<Utc>>,
}

/// Configurations d'usines persistées sur disque (un JSON par usine).
#[derive(Debug, Clone)]
pub struct PlantStore {
    base_dir: PathBuf,
}

impl PlantStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            base_dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, plant: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.json", crate::storage::file_stem(plant)))
    }

    pub fn save(&self, config: &PlantConfig) -> Result<PathBuf> {
        config.validate()?;
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("creating plant directory {}", self.base_dir.display()))?;
        let path = self.path_for(&config.plant);
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&path, json).with_context(|| format!("writing plant {}", path.display()))?;
        Ok(path)
    }

    pub fn load(&self, plant: &str) -> Result<PlantConfig> {
        let path = self.path_for(plant);
        load_plant_from_file(&path)
    }

    /// Configuration sur disque si présente, sinon table intégrée.
    pub fn lookup(&self, plant: &str) -> Result<PlantConfig> {
        if self.path_for(plant).exists() {
            return self.load(plant);
        }
        builtin_plant(plant).with_context(|| format!("unknown plant: {plant}"))
    }

    /// Usines sur disque puis usines intégrées non redéfinies.
    pub fn list(&self) -> Result<Vec<PlantInfo>> {
        let mut infos = Vec::new();
        if self.base_dir.exists() {
            for entry in fs::read_dir(&self.base_dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().and_then(|s| s.to_str()) != Some("json") {
                    continue;
                }
                let config = match load_plant_from_file(&path) {
                    Ok(c) => c,
                    Err(err) => {
                        tracing::warn!(path = %path.display(), "could not parse plant config: {err:#}");
                        continue;
                    }
                };
                let modified = entry
                    .metadata()
                    .and_then(|meta| meta.modified())
                    .ok()
                    .map(DateTime::<Utc>::from);
                infos.push(PlantInfo {
                    config,
                    path: Some(path),
                    modified,
                });
            }
        }
        for config in builtin_plants() {
            if infos
                .iter()
                .any(|i| i.config.plant.eq_ignore_ascii_case(&config.plant))
            {
                continue;
            }
            infos.push(PlantInfo {
                config,
                path: None,
                modified: None,
            });
        }
        infos.sort_by(|a, b| a.config.plant.cmp(&b.config.plant));
        Ok(infos)
    }
}

pub fn load_plant_from_file<P: AsRef<Path>>(path: P) -> Result<PlantConfig> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading plant {}", path.display()))?;
    let config: PlantConfig = serde_json::from_slice(&data)
        .with_context(|| format!("parsing plant {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
