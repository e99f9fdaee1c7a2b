use crate::model::AuditorRole;
use thiserror::Error;

/// Cadences des contrôles ponctuels (CQE, Plant Head).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceOptions {
    /// Taille d'un bloc CQE en jours.
    pub cqe_block_days: u32,
    /// Jours planifiés dans chaque bloc (1-based depuis le début du bloc).
    pub cqe_block_offsets: [u32; 2],
    /// Premier passage Plant Head (jour du mois).
    pub plant_head_first_day: u32,
    /// Second passage Plant Head : `days_in_month - plant_head_days_before_end`.
    pub plant_head_days_before_end: u32,
}

impl Default for CadenceOptions {
    fn default() -> Self {
        Self {
            cqe_block_days: 6,
            cqe_block_offsets: [1, 4],
            plant_head_first_day: 5,
            plant_head_days_before_end: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Vsl,
    Cft,
}

/// Auditeur d'une équipe de value stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    pub label: String,
    pub kind: MemberKind,
}

impl TeamMember {
    pub fn vsl<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            kind: MemberKind::Vsl,
        }
    }

    pub fn cft<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            kind: MemberKind::Cft,
        }
    }

    pub fn role(&self) -> AuditorRole {
        match self.kind {
            MemberKind::Vsl => AuditorRole::ValueStreamLeader,
            MemberKind::Cft => AuditorRole::CftMember,
        }
    }
}

/// VSL responsables d'un value stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLeaders {
    pub stream: String,
    pub leader_ids: Vec<String>,
}

/// Répartition des VSL sur les value streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderPlan {
    /// Aucun VSL ou aucun value stream : pas d'affectation VSL/CFT.
    Unassigned,
    /// Un seul VSL pour toute l'usine : rotation globale.
    Global { leader_id: String },
    /// Un ou plusieurs VSL par value stream, dans l'ordre déclaré.
    PerStream(Vec<StreamLeaders>),
}

impl LeaderPlan {
    pub fn leaders_of(&self, stream: &str) -> &[String] {
        match self {
            LeaderPlan::PerStream(streams) => streams
                .iter()
                .find(|s| s.stream == stream)
                .map(|s| s.leader_ids.as_slice())
                .unwrap_or(&[]),
            _ => &[],
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchedError {
    #[error("invalid calendar month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}
