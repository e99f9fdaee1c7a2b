use super::types::TeamMember;
use crate::model::{Assignment, AuditorRole};
use chrono::NaiveDate;

/// État de rotation : un index de ligne, un index d'auditeur.
#[derive(Debug, Clone)]
pub(super) struct Rotation<'a> {
    pub(super) lines: Vec<&'a str>,
    pub(super) team: Vec<TeamMember>,
    line_index: usize,
    auditor_index: usize,
}

impl<'a> Rotation<'a> {
    /// `None` si la rotation n'a ni ligne ni auditeur.
    pub(super) fn new(lines: Vec<&'a str>, team: Vec<TeamMember>) -> Option<Self> {
        if lines.is_empty() || team.is_empty() {
            return None;
        }
        Some(Self {
            lines,
            team,
            line_index: 0,
            auditor_index: 0,
        })
    }

    /// Prochaine paire (ligne, auditeur), puis avance les deux index.
    pub(super) fn advance(&mut self) -> (&'a str, &TeamMember) {
        let line = self.lines[self.line_index % self.lines.len()];
        let member = self.auditor_index % self.team.len();
        self.line_index += 1;
        self.auditor_index += 1;
        (line, &self.team[member])
    }
}

/// Mode VSL unique : une seule rotation pour toute l'usine.
pub(super) fn schedule_global(
    plant: &str,
    working_days: &[NaiveDate],
    mut rotation: Rotation<'_>,
    leader_label: &str,
    out: &mut Vec<Assignment>,
) {
    for &date in working_days {
        let (line, member) = rotation.advance();
        let role = if member.label == leader_label {
            AuditorRole::ValueStreamLeader
        } else {
            AuditorRole::CftMember
        };
        out.push(Assignment {
            plant: plant.to_string(),
            date,
            line: line.to_string(),
            manager: member.label.clone(),
            role,
        });
    }
}

/// Mode par value stream : chaque jour ouvré, chaque stream audite une ligne.
pub(super) fn schedule_streams(
    plant: &str,
    working_days: &[NaiveDate],
    rotations: &mut [Rotation<'_>],
    out: &mut Vec<Assignment>,
) {
    for &date in working_days {
        for rotation in rotations.iter_mut() {
            let (line, member) = rotation.advance();
            out.push(Assignment {
                plant: plant.to_string(),
                date,
                line: line.to_string(),
                manager: member.label.clone(),
                role: member.role(),
            });
        }
    }
}
