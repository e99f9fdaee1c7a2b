use crate::model::{CalendarResult, Roster, RosterEntry, StagedRoster};
use anyhow::{bail, Context};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use std::fs;
use std::io::Read;
use std::path::Path;

const VSL_HEADING: &str = "VALUE STREAM LEADERS";
const CFT_HEADING: &str = "CROSS FUNCTIONAL TEAM";
const CQE_HEADING: &str = "CUSTOMER QUALITY ENGINEERS";
const PH_HEADING: &str = "PLANT HEADS";
const VS_HEADING: &str = "VALUE STREAM CONFIGURATION";
const PLANT_PLACEHOLDER: &str = "Enter Plant Name";

/// Écrit le template vierge de roster (CSV à sections).
pub fn write_template_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut w = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quote_style(QuoteStyle::Always)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut rows: Vec<Vec<String>> = vec![
        vec!["LPA CALENDAR TEMPLATE".to_string()],
        vec![String::new()],
        vec!["PLANT INFORMATION".to_string()],
        vec!["Plant Name".to_string(), format!("{PLANT_PLACEHOLDER} (e.g., Delhi)")],
        vec![String::new()],
    ];
    rows.extend(template_section(
        "VALUE STREAM LEADERS (VSL)",
        "VSL ID",
        "Full Name",
        &["VSL1", "VSL2", "VSL3", "VSL4", "VSL5"],
    ));
    rows.extend(template_section(
        "CROSS FUNCTIONAL TEAM (CFT) — LINKED TO EACH VSL",
        "VSL ID (Linked)",
        "CFT Member Full Name",
        &["VSL1", "VSL1", "VSL2", "VSL2", "VSL3", "VSL3", "VSL4", "VSL5"],
    ));
    rows.extend(template_section(
        "CUSTOMER QUALITY ENGINEERS (CQE)",
        "CQE ID",
        "Full Name",
        &["CQE1", "CQE2", "CQE3"],
    ));
    rows.extend(template_section(
        "PLANT HEADS (PH)",
        "PH ID",
        "Full Name",
        &["PH1", "PH2", "PH3"],
    ));
    rows.push(vec![
        "NOTE".to_string(),
        "Value streams are configured per plant; do NOT add value streams here."
            .to_string(),
    ]);

    for row in rows {
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

fn template_section(heading: &str, id_header: &str, name_header: &str, ids: &[&str]) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec![heading.to_string()],
        vec![
            id_header.to_string(),
            name_header.to_string(),
            "Initials".to_string(),
            "Email".to_string(),
        ],
    ];
    rows.extend(
        ids.iter()
            .map(|id| vec![id.to_string(), String::new(), String::new(), String::new()]),
    );
    rows.push(vec![String::new()]);
    rows
}

/// Import du template rempli ; `plant` remplace le nom d'usine du fichier.
pub fn import_roster_csv<P: AsRef<Path>>(path: P, plant: Option<&str>) -> anyhow::Result<StagedRoster> {
    let path = path.as_ref();
    let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_roster_csv(file, plant).with_context(|| format!("parsing roster template {}", path.display()))
}

pub fn parse_roster_csv<R: Read>(reader: R, plant: Option<&str>) -> anyhow::Result<StagedRoster> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows: Vec<Vec<String>> = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        rows.push(rec.iter().map(|c| c.trim().to_string()).collect());
    }

    let plant = match plant.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => p.to_string(),
        None => plant_name(&rows).context("missing plant name (row \"Plant Name\")")?,
    };

    let roster = Roster {
        value_stream_leaders: read_section(&rows, VSL_HEADING)
            .into_iter()
            .map(|(id, entry)| RosterEntry { id, ..entry })
            .collect(),
        cross_functional_teams: read_section(&rows, CFT_HEADING)
            .into_iter()
            .enumerate()
            .map(|(i, (group, entry))| RosterEntry {
                id: format!("CFT{}", i + 1),
                group_id: Some(group),
                ..entry
            })
            .collect(),
        customer_quality_engineers: read_section(&rows, CQE_HEADING)
            .into_iter()
            .map(|(id, entry)| RosterEntry { id, ..entry })
            .collect(),
        plant_heads: read_section(&rows, PH_HEADING)
            .into_iter()
            .map(|(id, entry)| RosterEntry { id, ..entry })
            .collect(),
    };

    let mut value_stream_counts = indexmap::IndexMap::new();
    for row in section_rows(&rows, VS_HEADING) {
        let count = row
            .get(1)
            .and_then(|c| c.parse::<u32>().ok())
            .filter(|c| *c > 0)
            .unwrap_or(1);
        value_stream_counts.insert(row[0].clone(), count);
    }

    tracing::debug!(
        plant = %plant,
        vsl = roster.value_stream_leaders.len(),
        cft = roster.cross_functional_teams.len(),
        cqe = roster.customer_quality_engineers.len(),
        ph = roster.plant_heads.len(),
        "roster template parsed"
    );

    Ok(StagedRoster {
        plant,
        roster,
        value_stream_counts,
    })
}

fn plant_name(rows: &[Vec<String>]) -> Option<String> {
    rows.iter()
        .find(|r| r.first().map(|c| c.eq_ignore_ascii_case("Plant Name")).unwrap_or(false))
        .and_then(|r| r.get(1))
        .filter(|p| !p.is_empty() && !p.starts_with(PLANT_PLACEHOLDER))
        .cloned()
}

fn is_heading(cell: &str) -> bool {
    [VSL_HEADING, CFT_HEADING, CQE_HEADING, PH_HEADING, VS_HEADING, "NOTE", "PLANT INFORMATION"]
        .iter()
        .any(|h| cell.starts_with(h))
}

/// Lignes de données d'une section : après le titre et la ligne d'en-têtes,
/// jusqu'à une ligne vide ou le titre suivant.
fn section_rows<'a>(rows: &'a [Vec<String>], heading: &str) -> Vec<&'a Vec<String>> {
    let Some(start) = rows
        .iter()
        .position(|r| r.first().map(|c| c.starts_with(heading)).unwrap_or(false))
    else {
        return Vec::new();
    };
    rows.iter()
        .skip(start + 2)
        .take_while(|r| {
            let first = r.first().map(String::as_str).unwrap_or("");
            !first.is_empty() && !is_heading(first)
        })
        .collect()
}

/// `(première colonne, entrée)` ; les lignes sans nom ni initiales sont ignorées.
fn read_section(rows: &[Vec<String>], heading: &str) -> Vec<(String, RosterEntry)> {
    section_rows(rows, heading)
        .into_iter()
        .filter_map(|row| {
            let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
            let (key, name, initials, email) = (cell(0), cell(1), cell(2), cell(3));
            if name.is_empty() && initials.is_empty() {
                return None;
            }
            let initials = if initials.is_empty() || initials == "Initials" {
                derive_initials(&name)
            } else {
                initials
            };
            Some((
                key,
                RosterEntry {
                    id: String::new(),
                    name,
                    initials,
                    email,
                    group_id: None,
                },
            ))
        })
        .collect()
}

/// Initiales : première lettre de chaque mot, en majuscules.
pub fn derive_initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Export JSON du calendrier (jolie mise en forme)
pub fn export_calendar_json<P: AsRef<Path>>(path: P, result: &CalendarResult) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(result)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV plat : header `date,line,manager,type`
pub fn export_assignments_csv<P: AsRef<Path>>(path: P, result: &CalendarResult) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "line", "manager", "type"])?;
    for a in &result.assignments {
        let date = a.date.format("%Y-%m-%d").to_string();
        w.write_record([date.as_str(), a.line.as_str(), a.manager.as_str(), a.role.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

/// Vérifie qu'un roster est exploitable pour une génération complète.
pub fn check_roster(staged: &StagedRoster) -> anyhow::Result<()> {
    if staged.roster.is_empty() {
        bail!("roster for plant {} is empty", staged.plant);
    }
    Ok(())
}
