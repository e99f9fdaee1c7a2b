use chrono::{DateTime, Datelike, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::scheduler::SchedError;

/// Entrée du roster (une par personne, quel que soit le rôle).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub initials: String,
    #[serde(default)]
    pub email: String,
    /// Pour un membre CFT : id du VSL qu'il soutient.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "group")]
    pub group_id: Option<String>,
}

impl RosterEntry {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_initials<S: Into<String>>(mut self, initials: S) -> Self {
        self.initials = initials.into();
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_group<S: Into<String>>(mut self, group: S) -> Self {
        self.group_id = Some(group.into());
        self
    }

    /// Libellé affiché dans le calendrier : initiales, sinon nom, sinon `fallback`.
    pub fn label_or(&self, fallback: &str) -> String {
        let initials = self.initials.trim();
        if !initials.is_empty() {
            return initials.to_string();
        }
        let name = self.name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        fallback.to_string()
    }

    /// Vrai si ce membre CFT est rattaché au VSL `leader_id` (trim + casse ignorée).
    pub fn supports(&self, leader_id: &str) -> bool {
        self.group_id
            .as_deref()
            .map(|g| g.trim().eq_ignore_ascii_case(leader_id.trim()))
            .unwrap_or(false)
    }
}

/// Roster complet d'une usine, tel que téléversé.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    #[serde(default)]
    pub value_stream_leaders: Vec<RosterEntry>,
    #[serde(default)]
    pub cross_functional_teams: Vec<RosterEntry>,
    #[serde(default)]
    pub customer_quality_engineers: Vec<RosterEntry>,
    #[serde(default, rename = "plantHODs")]
    pub plant_heads: Vec<RosterEntry>,
}

impl Roster {
    pub fn is_empty(&self) -> bool {
        self.value_stream_leaders.is_empty()
            && self.cross_functional_teams.is_empty()
            && self.customer_quality_engineers.is_empty()
            && self.plant_heads.is_empty()
    }

    pub fn find_leader(&self, id: &str) -> Option<&RosterEntry> {
        self.value_stream_leaders.iter().find(|l| l.id == id)
    }

    /// Membres CFT rattachés au VSL `leader_id`, dans l'ordre du roster.
    pub fn members_of<'a>(&'a self, leader_id: &'a str) -> impl Iterator<Item = &'a RosterEntry> {
        self.cross_functional_teams
            .iter()
            .filter(move |c| c.supports(leader_id))
    }
}

/// Rôle d'un auditeur dans une affectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditorRole {
    #[serde(rename = "Value Stream Leader")]
    ValueStreamLeader,
    #[serde(rename = "CFT Member")]
    CftMember,
    #[serde(rename = "Customer Quality Engineer")]
    CustomerQualityEngineer,
    #[serde(rename = "Plant Head")]
    PlantHead,
}

impl AuditorRole {
    pub const ALL: [AuditorRole; 4] = [
        AuditorRole::ValueStreamLeader,
        AuditorRole::CftMember,
        AuditorRole::CustomerQualityEngineer,
        AuditorRole::PlantHead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditorRole::ValueStreamLeader => "Value Stream Leader",
            AuditorRole::CftMember => "CFT Member",
            AuditorRole::CustomerQualityEngineer => "Customer Quality Engineer",
            AuditorRole::PlantHead => "Plant Head",
        }
    }
}

impl std::fmt::Display for AuditorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Une visite d'audit : (date, ligne, auditeur, rôle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub plant: String,
    pub date: NaiveDate,
    pub line: String,
    pub manager: String,
    #[serde(rename = "type")]
    pub role: AuditorRole,
}

/// Mois calendaire validé (année, mois 1..=12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, SchedError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(SchedError::InvalidMonth { year, month });
        }
        Ok(Self { year, month })
    }

    /// Mois courant (heure locale), pour la CLI.
    pub fn current() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(&self) -> u32 {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(28)
    }

    /// Date du jour `day` (1-based), `None` hors du mois.
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        if day == 0 || day > self.days_in_month() {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (1..=self.days_in_month()).filter_map(move |d| self.day(d))
    }

    /// Nom du mois en anglais ("October").
    pub fn month_name(&self) -> String {
        self.first_day().format("%B").to_string()
    }

    /// Libellé "<MonthName> <Year>".
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    /// Inverse de `label`.
    pub fn parse_label(label: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(&format!("01 {}", label.trim()), "%d %B %Y").ok()?;
        Some(Self {
            year: date.year(),
            month: date.month(),
        })
    }
}

/// Résultat d'une génération : immuable, remplacé par la génération suivante.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResult {
    pub plant: String,
    pub month: String,
    pub assignments: Vec<Assignment>,
    pub value_streams: IndexMap<String, usize>,
    pub generated_at: DateTime<Utc>,
}

impl CalendarResult {
    /// Toutes les affectations pour (date, ligne), éventuellement vide.
    pub fn assignments_at<'a, 'l>(
        &'a self,
        date: NaiveDate,
        line: &'l str,
    ) -> impl Iterator<Item = &'a Assignment> + 'l
    where
        'a: 'l,
    {
        self.assignments
            .iter()
            .filter(move |a| a.date == date && a.line == line)
    }

    pub fn count_by_role(&self, role: AuditorRole) -> usize {
        self.assignments.iter().filter(|a| a.role == role).count()
    }

    pub fn calendar_month(&self) -> Option<CalendarMonth> {
        CalendarMonth::parse_label(&self.month)
    }
}

/// Roster téléversé en attente de génération, pour une usine donnée.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedRoster {
    pub plant: String,
    #[serde(flatten)]
    pub roster: Roster,
    /// Comptes de lignes issus du template (section optionnelle).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub value_stream_counts: IndexMap<String, u32>,
}
