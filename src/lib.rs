#![forbid(unsafe_code)]
//! LPA Calendar : génération des calendriers d'audits LPA (layered process audit).
//!
//! - Rotation VSL/CFT par value stream (ou globale avec un seul VSL).
//! - Contrôles ponctuels CQE (deux fois par semaine) et Plant Head (deux fois par mois).
//! - Dimanches chômés, règle de jours fériés injectable.
//! - Stockage fichiers (JSON), template roster CSV, exports CSV/XLSX.

pub mod export;
pub mod io;
pub mod model;
pub mod notification;
pub mod plant;
pub mod render;
pub mod scheduler;
pub mod storage;

pub use export::{export_file_name, export_grid_csv, ExportError};
#[cfg(feature = "xlsx")]
pub use export::export_xlsx;
pub use model::{
    Assignment, AuditorRole, CalendarMonth, CalendarResult, Roster, RosterEntry, StagedRoster,
};
pub use notification::{collect_recipients, prepare_calendar_mail, CalendarMail, MailRenderer, TextMail};
pub use plant::{builtin_plant, builtin_plants, PlantConfig, PlantStore};
pub use render::{render_text, CalendarGrid, Cell};
pub use scheduler::{
    CadenceOptions, CalendarGenerator, HolidayCalendar, LeaderPlan, LinePicker, RandomPicker,
    SchedError, Sundays, SundaysAnd, TeamMember,
};
pub use storage::{CalendarStore, JsonCalendarStore, RosterStage};
