#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use lpa_calendar::{
    export, io,
    model::{AuditorRole, CalendarMonth, CalendarResult, StagedRoster},
    notification::{prepare_calendar_mail, TextMail},
    plant::{load_plant_from_file, PlantConfig, PlantStore},
    render::{render_text, CalendarGrid},
    scheduler::{CalendarGenerator, Sundays},
    storage::{CalendarStore, JsonCalendarStore, RosterStage},
};
use std::path::{Path, PathBuf};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI des calendriers LPA (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Répertoire de données (rosters en attente, calendriers, usines)
    #[arg(long, global = true, default_value = ".lpa")]
    data_dir: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

/// Mois ciblé ; mois courant par défaut.
#[derive(Args, Debug, Clone, Copy)]
struct MonthArgs {
    #[arg(long)]
    year: Option<i32>,
    /// 1..=12
    #[arg(long)]
    month: Option<u32>,
}

impl MonthArgs {
    fn resolve(self) -> Result<CalendarMonth> {
        let current = CalendarMonth::current();
        Ok(CalendarMonth::new(
            self.year.unwrap_or(current.year()),
            self.month.unwrap_or(current.month()),
        )?)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Écrire le template vierge de roster (CSV)
    Template {
        #[arg(long)]
        out: PathBuf,
    },

    /// Importer un template rempli et le mettre en attente pour son usine
    Upload {
        #[arg(long)]
        csv: PathBuf,
        /// Remplace le nom d'usine du fichier
        #[arg(long)]
        plant: Option<String>,
    },

    /// Lister les usines configurées et leurs value streams
    Plants,

    /// Générer le calendrier du mois pour une usine
    Generate {
        #[arg(long)]
        plant: String,
        #[command(flatten)]
        month: MonthArgs,
        /// Graine du tirage des lignes CQE / Plant Head
        #[arg(long)]
        seed: Option<u64>,
        /// Configuration d'usine JSON (sinon table intégrée ou répertoire plants/)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Afficher la grille d'un calendrier enregistré
    Show {
        #[arg(long)]
        plant: String,
        #[command(flatten)]
        month: MonthArgs,
    },

    /// Lister les calendriers enregistrés
    List,

    /// Exporter un calendrier enregistré
    Export {
        #[arg(long)]
        plant: String,
        #[command(flatten)]
        month: MonthArgs,
        #[arg(long)]
        xlsx: Option<PathBuf>,
        /// Grille CSV (lignes × jours)
        #[arg(long)]
        csv: Option<PathBuf>,
        /// CSV plat `date,line,manager,type`
        #[arg(long)]
        flat_csv: Option<PathBuf>,
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Préparer le mail d'envoi du calendrier (texte brut)
    Mail {
        #[arg(long)]
        plant: String,
        #[command(flatten)]
        month: MonthArgs,
        /// Fichier de sortie
        #[arg(long)]
        out: PathBuf,
        /// Conserver le roster en attente après préparation du mail
        #[arg(long)]
        keep_roster: bool,
    },
}

struct Workspace {
    stage: RosterStage,
    calendars: JsonCalendarStore,
    plants: PlantStore,
}

impl Workspace {
    fn open(dir: &Path) -> Result<Self> {
        Ok(Self {
            stage: RosterStage::open(dir.join("staged"))?,
            calendars: JsonCalendarStore::open(dir.join("calendars"))?,
            plants: PlantStore::new(dir.join("plants")),
        })
    }

    fn staged(&self, plant: &str) -> Result<StagedRoster> {
        self.stage
            .load(plant)?
            .with_context(|| format!("no roster staged for plant {plant} (run `upload` first)"))
    }

    fn calendar(&self, plant: &str, month: CalendarMonth) -> Result<CalendarResult> {
        self.calendars
            .load(plant, month)?
            .with_context(|| format!("no calendar found for {plant} ({})", month.label()))
    }

    /// Noms de lignes explicites si connus, sinon comptes du template.
    fn plant_config(&self, plant: &str, staged: Option<&StagedRoster>) -> Result<PlantConfig> {
        let named = self.plants.lookup(plant).ok();
        match staged.filter(|s| !s.value_stream_counts.is_empty()) {
            Some(s) => Ok(PlantConfig::resolve(
                plant,
                &s.value_stream_counts,
                named.as_ref().map(|c| &c.value_streams),
            )),
            None => named.with_context(|| format!("no value stream configuration for plant {plant}")),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let ws = Workspace::open(&cli.data_dir)?;

    let code = match cli.cmd {
        Commands::Template { out } => {
            io::write_template_csv(&out)?;
            println!("Template written to {}", out.display());
            0
        }
        Commands::Upload { csv, plant } => {
            let staged = io::import_roster_csv(&csv, plant.as_deref())?;
            io::check_roster(&staged)?;
            ws.stage.stage(&staged)?;
            println!(
                "Roster staged for {}: {} VSL, {} CFT, {} CQE, {} PH",
                staged.plant,
                staged.roster.value_stream_leaders.len(),
                staged.roster.cross_functional_teams.len(),
                staged.roster.customer_quality_engineers.len(),
                staged.roster.plant_heads.len()
            );
            0
        }
        Commands::Plants => {
            for info in ws.plants.list()? {
                let origin = info
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "built-in".to_string());
                println!("{} ({origin})", info.config.plant);
                for (vs, lines) in &info.config.value_streams {
                    println!("  {vs}: {} line(s)", lines.len());
                }
            }
            0
        }
        Commands::Generate {
            plant,
            month,
            seed,
            config,
        } => {
            let month = month.resolve()?;
            let staged = ws.staged(&plant)?;
            // plants/ ne reçoit que des configurations explicites (`--config`)
            let config = match config {
                Some(path) => {
                    let config = load_plant_from_file(path)?;
                    if !config.plant.eq_ignore_ascii_case(plant.trim()) {
                        anyhow::bail!("configuration is for plant {}, not {plant}", config.plant);
                    }
                    ws.plants.save(&config)?;
                    config
                }
                None => ws.plant_config(&plant, Some(&staged))?,
            };
            let mut generator = seed
                .map(CalendarGenerator::seeded)
                .unwrap_or_default();
            let result = generator.generate(&staged.roster, &config, month, Utc::now());
            ws.calendars.save(&result)?;

            println!("LPA calendar for {} ({})", result.plant, result.month);
            for role in AuditorRole::ALL {
                println!("  {role}: {}", result.count_by_role(role));
            }
            if result.assignments.is_empty() {
                eprintln!("Warning: no assignment generated");
                // Code 2 = WARNING/INCOMPLETE
                2
            } else {
                0
            }
        }
        Commands::Show { plant, month } => {
            let month = month.resolve()?;
            let result = ws.calendar(&plant, month)?;
            let config = ws.plant_config(&plant, ws.stage.load(&plant)?.as_ref())?;
            let grid = CalendarGrid::build(&result, &config, month, &Sundays);
            print!("{}", render_text(&grid));
            0
        }
        Commands::List => {
            for (plant, month) in ws.calendars.list()? {
                println!("{plant} | {month}");
            }
            0
        }
        Commands::Export {
            plant,
            month,
            xlsx,
            csv,
            flat_csv,
            json,
        } => {
            let month = month.resolve()?;
            let result = ws.calendar(&plant, month)?;
            let config = ws.plant_config(&plant, ws.stage.load(&plant)?.as_ref())?;
            let grid = CalendarGrid::build(&result, &config, month, &Sundays);

            if let Some(path) = xlsx {
                write_xlsx(&path, &grid)?;
                println!("XLSX written to {}", path.display());
            }
            if let Some(path) = csv {
                export::export_grid_csv(&path, &grid)?;
                println!("Grid CSV written to {}", path.display());
            }
            if let Some(path) = flat_csv {
                io::export_assignments_csv(&path, &result)?;
                println!("Assignments CSV written to {}", path.display());
            }
            if let Some(path) = json {
                io::export_calendar_json(&path, &result)?;
                println!("JSON written to {}", path.display());
            }
            0
        }
        Commands::Mail {
            plant,
            month,
            out,
            keep_roster,
        } => {
            let month = month.resolve()?;
            let result = ws.calendar(&plant, month)?;
            let staged = ws.staged(&plant)?;
            let mail = prepare_calendar_mail(&staged.roster, &result, month, &TextMail)?;
            let config = ws.plant_config(&plant, Some(&staged))?;
            let grid = CalendarGrid::build(&result, &config, month, &Sundays);
            let attachment = out
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(&mail.attachment);
            let mut content = format!("To: {}\nSubject: {}\n", mail.recipients.join(", "), mail.subject);
            if attach_xlsx(&attachment, &grid)? {
                content.push_str(&format!("Attachment: {}\n", mail.attachment));
            }
            content.push('\n');
            content.push_str(&mail.body);
            std::fs::write(&out, content)?;
            if !keep_roster {
                ws.stage.clear(&plant)?;
            }
            println!("Mail prepared for: {}", mail.recipients.join(", "));
            0
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

#[cfg(feature = "xlsx")]
fn write_xlsx(path: &Path, grid: &CalendarGrid<'_>) -> Result<()> {
    export::export_xlsx(path, grid)?;
    Ok(())
}

#[cfg(not(feature = "xlsx"))]
fn write_xlsx(_path: &Path, _grid: &CalendarGrid<'_>) -> Result<()> {
    anyhow::bail!("xlsx export requires the `xlsx` feature")
}

/// Pièce jointe du mail ; `false` sans la feature `xlsx`.
#[cfg(feature = "xlsx")]
fn attach_xlsx(path: &Path, grid: &CalendarGrid<'_>) -> Result<bool> {
    write_xlsx(path, grid)?;
    Ok(true)
}

#[cfg(not(feature = "xlsx"))]
fn attach_xlsx(path: &Path, _grid: &CalendarGrid<'_>) -> Result<bool> {
    tracing::warn!(path = %path.display(), "built without `xlsx`, mail prepared without attachment");
    Ok(false)
}
