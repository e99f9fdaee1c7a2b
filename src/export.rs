//! Exports tableur de la grille : XLSX (feature `xlsx`) et CSV.

use crate::model::{AuditorRole, CalendarMonth};
use crate::render::{CalendarGrid, Cell};
use chrono::Datelike;
use csv::WriterBuilder;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "xlsx")]
    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// `LPA_Calendar_<plant>_<Month>_<Year>.xlsx`, espaces de l'usine remplacés par `_`.
pub fn export_file_name(plant: &str, month: CalendarMonth) -> String {
    let plant = plant.split_whitespace().collect::<Vec<_>>().join("_");
    let plant = if plant.is_empty() { "Plant".to_string() } else { plant };
    format!(
        "LPA_Calendar_{}_{}_{}.xlsx",
        plant,
        month.month_name(),
        month.year()
    )
}

/// Couleur RGB de cellule par rôle.
pub fn role_color(role: AuditorRole) -> u32 {
    match role {
        AuditorRole::ValueStreamLeader => 0xB7E4C7,
        AuditorRole::CftMember => 0xE2C2FF,
        AuditorRole::CustomerQualityEngineer => 0xB3D9FF,
        AuditorRole::PlantHead => 0xFFCC99,
    }
}

pub const HOLIDAY_COLOR: u32 = 0xFFCCCC;

/// Grille au format CSV : titre, jours, jours de semaine, puis groupes.
pub fn export_grid_csv<P: AsRef<Path>>(path: P, grid: &CalendarGrid<'_>) -> Result<(), ExportError> {
    let mut w = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    w.write_record([grid.title()])?;
    let mut dates = vec!["Line".to_string()];
    dates.extend(grid.days.iter().map(|d| d.date.day().to_string()));
    w.write_record(&dates)?;
    let mut weekdays = vec![String::new()];
    weekdays.extend(grid.days.iter().map(|d| d.weekday.clone()));
    w.write_record(&weekdays)?;

    for group in &grid.groups {
        w.write_record([group.stream.as_str()])?;
        for row in &group.rows {
            let mut record = vec![row.line.clone()];
            record.extend(row.cells.iter().map(Cell::text));
            w.write_record(&record)?;
        }
    }
    w.flush()?;
    Ok(())
}

#[cfg(feature = "xlsx")]
pub use xlsx::export_xlsx;

#[cfg(feature = "xlsx")]
mod xlsx {
    use super::{role_color, ExportError, HOLIDAY_COLOR};
    use crate::model::AuditorRole;
    use crate::render::{CalendarGrid, Cell, HOLIDAY_LABEL};
    use chrono::Datelike;
    use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
    use std::path::Path;

    /// Classeur d'une feuille "<Month> <Year>", volets figés sur la colonne
    /// des lignes et les trois rangées d'en-tête, légende sous la grille.
    pub fn export_xlsx<P: AsRef<Path>>(path: P, grid: &CalendarGrid<'_>) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(grid.month.label())?;

        let last_col = grid.days.len() as u16;

        let title = Format::new()
            .set_bold()
            .set_font_size(18)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x0077B6))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        let header = Format::new()
            .set_bold()
            .set_font_size(11)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x00B4D8))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(0xBBBBBB));
        let header_holiday = header.clone().set_background_color(Color::RGB(0xFF4D4D));
        let stream_name = Format::new()
            .set_bold()
            .set_font_size(12)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x4A4A4A))
            .set_align(FormatAlign::Left)
            .set_border_top(FormatBorder::Medium)
            .set_border_bottom(FormatBorder::Medium);
        let stream_fill = Format::new()
            .set_background_color(Color::RGB(0xE0E0E0))
            .set_border_top(FormatBorder::Medium)
            .set_border_bottom(FormatBorder::Medium);
        let line_name = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_align(FormatAlign::Left)
            .set_indent(1)
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(0xDDDDDD));
        let cell_base = Format::new()
            .set_font_size(9)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(0xDDDDDD));
        let holiday = cell_base
            .clone()
            .set_bold()
            .set_italic()
            .set_font_color(Color::RGB(0xB00020))
            .set_background_color(Color::RGB(HOLIDAY_COLOR));
        let audit = |role: AuditorRole| {
            cell_base
                .clone()
                .set_bold()
                .set_background_color(Color::RGB(role_color(role)))
        };

        sheet.merge_range(0, 0, 0, last_col, &grid.title(), &title)?;
        sheet.set_row_height(0, 35)?;

        sheet.write_string_with_format(1, 0, "Line", &header)?;
        sheet.write_string_with_format(2, 0, "", &header)?;
        for (i, day) in grid.days.iter().enumerate() {
            let col = i as u16 + 1;
            let fmt = if day.holiday { &header_holiday } else { &header };
            sheet.write_number_with_format(1, col, day.date.day(), fmt)?;
            sheet.write_string_with_format(2, col, &day.weekday, fmt)?;
        }
        sheet.set_row_height(1, 22)?;
        sheet.set_row_height(2, 22)?;

        let mut row: u32 = 3;
        for group in &grid.groups {
            sheet.write_string_with_format(row, 0, &group.stream, &stream_name)?;
            for col in 1..=last_col {
                sheet.write_blank(row, col, &stream_fill)?;
            }
            sheet.set_row_height(row, 25)?;
            row += 1;

            for line in &group.rows {
                sheet.write_string_with_format(row, 0, &line.line, &line_name)?;
                for (i, cell) in line.cells.iter().enumerate() {
                    let col = i as u16 + 1;
                    match cell {
                        Cell::Holiday => {
                            sheet.write_string_with_format(row, col, HOLIDAY_LABEL, &holiday)?;
                        }
                        Cell::Empty => {
                            sheet.write_blank(row, col, &cell_base)?;
                        }
                        Cell::Audits(_) => {
                            let fmt = cell.role().map(audit).unwrap_or_else(|| cell_base.clone());
                            sheet.write_string_with_format(row, col, cell.text(), &fmt)?;
                        }
                    }
                }
                sheet.set_row_height(row, 22)?;
                row += 1;
            }
        }

        sheet.set_freeze_panes(3, 1)?;
        sheet.set_column_width(0, 32)?;
        for col in 1..=last_col {
            sheet.set_column_width(col, 11)?;
        }

        let legend_start = row + 2;
        sheet.write_string_with_format(legend_start, 0, "LEGEND:", &Format::new().set_bold().set_font_size(12))?;
        let legend = AuditorRole::ALL
            .iter()
            .map(|r| (r.as_str(), role_color(*r)))
            .chain(std::iter::once(("Sunday - Holiday", HOLIDAY_COLOR)));
        for (i, (text, color)) in legend.enumerate() {
            let fmt = Format::new()
                .set_font_size(10)
                .set_background_color(Color::RGB(color))
                .set_border(FormatBorder::Thin);
            sheet.write_string_with_format(legend_start + 1 + i as u32, 0, text, &fmt)?;
        }

        workbook.save(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), rows = grid.row_count(), "xlsx calendar written");
        Ok(())
    }
}
