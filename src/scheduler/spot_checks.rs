use super::types::CadenceOptions;
use super::util::{self, HolidayCalendar, LinePicker};
use crate::model::{Assignment, AuditorRole, CalendarMonth, RosterEntry};
use chrono::NaiveDate;

/// Contexte commun aux contrôles ponctuels (CQE, Plant Head).
pub(super) struct SpotChecks<'a> {
    pub(super) plant: &'a str,
    pub(super) month: CalendarMonth,
    pub(super) all_lines: &'a [&'a str],
    pub(super) opts: CadenceOptions,
    pub(super) holidays: &'a dyn HolidayCalendar,
}

impl SpotChecks<'_> {
    fn push(&self, out: &mut Vec<Assignment>, date: NaiveDate, line: &str, manager: &str, role: AuditorRole) {
        out.push(Assignment {
            plant: self.plant.to_string(),
            date,
            line: line.to_string(),
            manager: manager.to_string(),
            role,
        });
    }

    /// CQE : deux passages par bloc de jours, ligne tirée au hasard.
    pub(super) fn schedule_cqe(
        &self,
        cqes: &[RosterEntry],
        picker: &mut dyn LinePicker,
        out: &mut Vec<Assignment>,
    ) {
        if self.all_lines.is_empty() {
            return;
        }
        let days = self.month.days_in_month();
        let block = self.opts.cqe_block_days.max(1);

        for (i, cqe) in cqes.iter().enumerate() {
            let manager = cqe.label_or(&format!("CQE{}", i + 1));
            let candidates = util::rotated(self.all_lines, i);

            let mut block_start = 0;
            while block_start < days {
                for offset in self.opts.cqe_block_offsets {
                    // hors du mois : ignoré, pas de report sur le mois suivant
                    let Some(date) = self.month.day(block_start + offset) else {
                        continue;
                    };
                    if self.holidays.is_holiday(date) {
                        continue;
                    }
                    let line = candidates[picker.pick(candidates.len())];
                    self.push(out, date, line, &manager, AuditorRole::CustomerQualityEngineer);
                }
                block_start += block;
            }
        }
    }

    /// Plant Head : deux passages fixes par mois, sans rattrapage si férié.
    pub(super) fn schedule_plant_heads(
        &self,
        heads: &[RosterEntry],
        picker: &mut dyn LinePicker,
        out: &mut Vec<Assignment>,
    ) {
        if self.all_lines.is_empty() {
            return;
        }
        let anchors = [
            self.month.day(self.opts.plant_head_first_day),
            self.month
                .days_in_month()
                .checked_sub(self.opts.plant_head_days_before_end)
                .and_then(|d| self.month.day(d)),
        ];

        for (i, head) in heads.iter().enumerate() {
            let manager = head.label_or(&format!("PH{}", i + 1));
            for anchor in anchors {
                // un tirage par ancrage, y compris un ancrage chômé
                let line = self.all_lines[picker.pick(self.all_lines.len())];
                let Some(date) = anchor else {
                    continue;
                };
                if self.holidays.is_holiday(date) {
                    tracing::debug!(manager = %manager, %date, "plant head visit falls on a holiday, skipped");
                    continue;
                }
                self.push(out, date, line, &manager, AuditorRole::PlantHead);
            }
        }
    }
}
