//! Grille d'affichage : lignes groupées par value stream × jours du mois.
//!
//! La grille est toujours re-dérivée des affectations et de la configuration
//! de l'usine ; rien de cette structure n'est stocké dans les affectations.

use crate::model::{Assignment, AuditorRole, CalendarMonth, CalendarResult};
use crate::plant::PlantConfig;
use crate::scheduler::HolidayCalendar;
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Groupe des lignes inconnues de la configuration.
pub const OTHER_STREAM: &str = "Other";
pub const HOLIDAY_LABEL: &str = "Holiday";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDay {
    pub date: NaiveDate,
    /// Abréviation anglaise ("Mon").
    pub weekday: String,
    pub holiday: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Holiday,
    Empty,
    Audits(Vec<&'a Assignment>),
}

impl Cell<'_> {
    /// Texte de la cellule : auditeurs séparés par ", ".
    pub fn text(&self) -> String {
        match self {
            Cell::Holiday => HOLIDAY_LABEL.to_string(),
            Cell::Empty => String::new(),
            Cell::Audits(found) => found
                .iter()
                .map(|a| a.manager.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Rôle qui colore la cellule (celui de la première affectation).
    pub fn role(&self) -> Option<AuditorRole> {
        match self {
            Cell::Audits(found) => found.first().map(|a| a.role),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow<'a> {
    pub line: String,
    pub cells: Vec<Cell<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridGroup<'a> {
    pub stream: String,
    pub rows: Vec<GridRow<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarGrid<'a> {
    pub plant: String,
    pub month: CalendarMonth,
    pub days: Vec<GridDay>,
    pub groups: Vec<GridGroup<'a>>,
}

impl<'a> CalendarGrid<'a> {
    pub fn build(
        result: &'a CalendarResult,
        config: &PlantConfig,
        month: CalendarMonth,
        holidays: &dyn HolidayCalendar,
    ) -> Self {
        let days: Vec<GridDay> = month
            .dates()
            .map(|date| GridDay {
                date,
                weekday: date.format("%a").to_string(),
                holiday: holidays.is_holiday(date),
            })
            .collect();

        let lines: BTreeSet<&str> = result.assignments.iter().map(|a| a.line.as_str()).collect();
        let mut grouped: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for line in lines {
            let stream = config.stream_of(line).unwrap_or(OTHER_STREAM);
            grouped.entry(stream).or_default().push(line);
        }

        let groups = grouped
            .into_iter()
            .map(|(stream, lines)| GridGroup {
                stream: stream.to_string(),
                rows: lines
                    .into_iter()
                    .map(|line| GridRow {
                        line: line.to_string(),
                        cells: days.iter().map(|day| cell_for(result, day, line)).collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            plant: result.plant.clone(),
            month,
            days,
            groups,
        }
    }

    pub fn title(&self) -> String {
        format!(
            "{} {} - {}",
            self.month.month_name().to_uppercase(),
            self.month.year(),
            self.plant
        )
    }

    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }
}

fn cell_for<'a>(result: &'a CalendarResult, day: &GridDay, line: &str) -> Cell<'a> {
    if day.holiday {
        return Cell::Holiday;
    }
    let found: Vec<&Assignment> = result.assignments_at(day.date, line).collect();
    if found.is_empty() {
        Cell::Empty
    } else {
        Cell::Audits(found)
    }
}

/// Rendu texte aligné (terminal).
pub fn render_text(grid: &CalendarGrid<'_>) -> String {
    let line_width = grid
        .groups
        .iter()
        .flat_map(|g| {
            std::iter::once(g.stream.chars().count())
                .chain(g.rows.iter().map(|r| r.line.chars().count()))
        })
        .chain(std::iter::once(4))
        .max()
        .unwrap_or(4);
    let col_widths: Vec<usize> = grid
        .days
        .iter()
        .enumerate()
        .map(|(i, _)| {
            grid.groups
                .iter()
                .flat_map(|g| g.rows.iter())
                .map(|r| r.cells[i].text().chars().count())
                .max()
                .unwrap_or(0)
                .max(3)
        })
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "{}", grid.title());

    let _ = write!(out, "{:<line_width$}", "Line");
    for (day, w) in grid.days.iter().zip(&col_widths) {
        let _ = write!(out, " | {:>w$}", chrono::Datelike::day(&day.date), w = *w);
    }
    out.push('\n');
    let _ = write!(out, "{:<line_width$}", "");
    for (day, w) in grid.days.iter().zip(&col_widths) {
        let _ = write!(out, " | {:>w$}", day.weekday, w = *w);
    }
    out.push('\n');

    for group in &grid.groups {
        let _ = writeln!(out, "[{}]", group.stream);
        for row in &group.rows {
            let pad = line_width.saturating_sub(row.line.chars().count());
            let _ = write!(out, "{}{}", row.line, " ".repeat(pad));
            for (cell, w) in row.cells.iter().zip(&col_widths) {
                let text = match cell {
                    Cell::Empty => "-".to_string(),
                    other => other.text(),
                };
                let pad = w.saturating_sub(text.chars().count());
                let _ = write!(out, " | {}{}", " ".repeat(pad), text);
            }
            out.push('\n');
        }
    }
    out
}
