use crate::export::export_file_name;
use crate::model::{AuditorRole, CalendarMonth, CalendarResult, Roster};
use anyhow::{bail, Result};

/// Message prêt à l'envoi pour un calendrier généré.
#[derive(Debug, Clone)]
pub struct CalendarMail {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    /// Nom du fichier XLSX joint.
    pub attachment: String,
}

/// Permet de customiser le rendu du message (texte, HTML, etc.).
pub trait MailRenderer {
    fn render(&self, result: &CalendarResult, month: CalendarMonth) -> String;
}

/// Gabarit texte simple, avec la légende des couleurs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextMail;

impl MailRenderer for TextMail {
    fn render(&self, result: &CalendarResult, month: CalendarMonth) -> String {
        let legend: String = AuditorRole::ALL
            .iter()
            .map(|role| format!("  - {role}: {} visit(s)\n", result.count_by_role(*role)))
            .collect();
        format!(
            "Dear Team,\n\nYour LPA Calendar for {plant} ({month}) has been generated.\nThe calendar is attached in Excel format:\n  - month header with plant name\n  - date numbers and weekday labels\n  - Sundays marked as Holiday\n  - colour-coded auditor assignments, grouped by value stream\n\nPlanned audits:\n{legend}\nBest regards,\nLPA Calendar System\n",
            plant = result.plant,
            month = month.label(),
            legend = legend,
        )
    }
}

/// Adresses distinctes et non vides des quatre listes (VSL, CQE, PH, CFT).
pub fn collect_recipients(roster: &Roster) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let everyone = roster
        .value_stream_leaders
        .iter()
        .chain(&roster.customer_quality_engineers)
        .chain(&roster.plant_heads)
        .chain(&roster.cross_functional_teams);
    for entry in everyone {
        let email = entry.email.trim();
        if email.is_empty() || out.iter().any(|e| e == email) {
            continue;
        }
        out.push(email.to_string());
    }
    out
}

/// Prépare le message d'envoi d'un calendrier à toute l'équipe d'audit.
pub fn prepare_calendar_mail(
    roster: &Roster,
    result: &CalendarResult,
    month: CalendarMonth,
    renderer: &dyn MailRenderer,
) -> Result<CalendarMail> {
    let recipients = collect_recipients(roster);
    if recipients.is_empty() {
        bail!("no email address found in roster for plant {}", result.plant);
    }

    Ok(CalendarMail {
        recipients,
        subject: format!("LPA Calendar – {} ({})", result.plant, month.label()),
        body: renderer.render(result, month),
        attachment: export_file_name(&result.plant, month),
    })
}
