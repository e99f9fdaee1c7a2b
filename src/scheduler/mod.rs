mod rotation;
mod spot_checks;
mod teams;
mod types;
mod util;

pub use types::{CadenceOptions, LeaderPlan, MemberKind, SchedError, StreamLeaders, TeamMember};
pub use util::{HolidayCalendar, LinePicker, RandomPicker, Sundays, SundaysAnd};

use crate::model::{CalendarMonth, CalendarResult, Roster};
use crate::plant::PlantConfig;
use chrono::{DateTime, NaiveDate, Utc};
use rotation::Rotation;
use spot_checks::SpotChecks;

/// Générateur de calendrier LPA : calcul pur, sans I/O ni état global.
///
/// Les jours fériés et le tirage des lignes CQE / Plant Head sont injectés,
/// ce qui permet des calendriers reproductibles (`CalendarGenerator::seeded`).
#[derive(Debug)]
pub struct CalendarGenerator {
    holidays: Box<dyn HolidayCalendar>,
    picker: Box<dyn LinePicker>,
    opts: CadenceOptions,
}

impl Default for CalendarGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarGenerator {
    pub fn new() -> Self {
        Self {
            holidays: Box::new(Sundays),
            picker: Box::new(RandomPicker::from_entropy()),
            opts: CadenceOptions::default(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new().with_picker(RandomPicker::seeded(seed))
    }

    pub fn with_holidays<H: HolidayCalendar + 'static>(mut self, holidays: H) -> Self {
        self.holidays = Box::new(holidays);
        self
    }

    pub fn with_picker<P: LinePicker + 'static>(mut self, picker: P) -> Self {
        self.picker = Box::new(picker);
        self
    }

    pub fn with_options(mut self, opts: CadenceOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn holidays(&self) -> &dyn HolidayCalendar {
        self.holidays.as_ref()
    }

    /// Répartition des VSL sur les value streams de `config`.
    pub fn plan_leaders(&self, roster: &Roster, config: &PlantConfig) -> LeaderPlan {
        let streams: Vec<(&str, usize)> = config
            .value_streams
            .iter()
            .map(|(vs, lines)| (vs.as_str(), lines.len()))
            .collect();
        teams::resolve_leaders(&roster.value_stream_leaders, &streams)
    }

    /// Équipes d'audit par value stream (mode par stream uniquement).
    pub fn teams(&self, roster: &Roster, config: &PlantConfig) -> Vec<(String, Vec<TeamMember>)> {
        match self.plan_leaders(roster, config) {
            LeaderPlan::PerStream(streams) => streams
                .into_iter()
                .map(|s| {
                    let team = teams::assemble_team(roster, &s.leader_ids);
                    (s.stream, team)
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Génère les affectations du mois `month` pour l'usine `config`.
    pub fn generate(
        &mut self,
        roster: &Roster,
        config: &PlantConfig,
        month: CalendarMonth,
        generated_at: DateTime<Utc>,
    ) -> CalendarResult {
        let plant = config.plant.as_str();
        let all_lines = config.all_lines();
        let working_days: Vec<NaiveDate> = month
            .dates()
            .filter(|d| !self.holidays.is_holiday(*d))
            .collect();
        let mut assignments = Vec::new();

        match self.plan_leaders(roster, config) {
            LeaderPlan::Unassigned => {
                tracing::debug!(plant, "no value stream leader or no value stream, VSL/CFT rotation skipped");
            }
            LeaderPlan::Global { leader_id } => {
                if let Some(leader) = roster.find_leader(&leader_id) {
                    let team = teams::global_team(roster, leader);
                    let leader_label = team[0].label.clone();
                    if let Some(rot) = Rotation::new(all_lines.clone(), team) {
                        rotation::schedule_global(
                            plant,
                            &working_days,
                            rot,
                            &leader_label,
                            &mut assignments,
                        );
                    }
                }
            }
            LeaderPlan::PerStream(streams) => {
                let mut rotations = Vec::with_capacity(streams.len());
                for s in &streams {
                    let lines: Vec<&str> =
                        config.lines_of(&s.stream).iter().map(String::as_str).collect();
                    let team = teams::assemble_team(roster, &s.leader_ids);
                    match Rotation::new(lines, team) {
                        Some(rot) => rotations.push(rot),
                        None => tracing::warn!(stream = %s.stream, "value stream has no line or no auditor, skipped"),
                    }
                }
                rotation::schedule_streams(plant, &working_days, &mut rotations, &mut assignments);
            }
        }

        let checks = SpotChecks {
            plant,
            month,
            all_lines: &all_lines,
            opts: self.opts,
            holidays: self.holidays.as_ref(),
        };
        checks.schedule_cqe(
            &roster.customer_quality_engineers,
            self.picker.as_mut(),
            &mut assignments,
        );
        checks.schedule_plant_heads(&roster.plant_heads, self.picker.as_mut(), &mut assignments);

        tracing::info!(
            plant,
            month = %month.label(),
            assignments = assignments.len(),
            "LPA calendar generated"
        );

        CalendarResult {
            plant: plant.to_string(),
            month: month.label(),
            assignments,
            value_streams: config.line_counts(),
            generated_at,
        }
    }
}
