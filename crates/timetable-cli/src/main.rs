use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use dialoguer::{Confirm, Select};
use dotenvy::dotenv;
use timetable::config::database::{DatabaseConfig, init_db_pool};
use timetable::config::schedule::ScheduleConfig;
use timetable::logging::init_logging;
use timetable::modules::schedules::model::{
    AssignmentFilter, AssignmentId, CandidatePreview, ConsolidatedRange, CreateScheduleDto,
    DayOfWeek, ScheduleFilterParams, TeacherId, UpdateRangeDto,
};
use timetable::modules::schedules::{ScheduleService, flat::parse_period_field, require_capability};
use timetable_cli::{output, spreadsheet};
use timetable_core::permissions::{self, StaticCapabilities};
use timetable_core::serde::parse_flexible_date;
use timetable_core::{AppError, PaginationParams};
use tracing::info;

#[derive(Parser)]
#[command(name = "timetable-cli")]
#[command(about = "Timetable CLI - Teacher schedule administration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Match teacher or subject name
    #[arg(short = 's', long)]
    search: Option<String>,

    /// Day name, e.g. Senin or Monday
    #[arg(short = 'd', long)]
    day: Option<DayOfWeek>,

    #[arg(short = 'c', long)]
    class: Option<String>,

    /// Only assignments in force on or before this date
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,
}

impl FilterArgs {
    fn into_params(self, pagination: PaginationParams) -> ScheduleFilterParams {
        ScheduleFilterParams {
            search: self.search,
            day_of_week: self.day,
            class_name: self.class,
            as_of: self.as_of,
            pagination,
        }
    }
}

#[derive(Args)]
struct RangeArgs {
    #[arg(short = 'c', long)]
    class: String,

    #[arg(short = 'd', long)]
    day: DayOfWeek,

    /// First period of the range
    #[arg(long)]
    start: i32,

    /// Only consider assignments in force on or before this date
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// List consolidated schedule ranges
    List {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long)]
        page: Option<i64>,

        #[arg(long)]
        limit: Option<i64>,
    },
    /// Show the selectable periods of a class on a day
    Periods {
        #[arg(short = 'c', long)]
        class: String,

        #[arg(short = 'd', long)]
        day: DayOfWeek,
    },
    /// Assign a teacher to one or more periods
    Create {
        #[arg(short = 't', long)]
        teacher_id: TeacherId,

        #[arg(long)]
        subject: String,

        #[arg(short = 'd', long)]
        day: DayOfWeek,

        #[arg(short = 'c', long)]
        class: String,

        /// Period list: "3", "1,3,5" or "2-4"
        #[arg(short = 'p', long)]
        periods: String,

        #[arg(long, value_parser = parse_date)]
        effective_from: Option<NaiveDate>,
    },
    /// Replace the periods, teacher or subject of a range
    UpdateRange {
        #[command(flatten)]
        range: RangeArgs,

        /// New period list: "3", "1,3,5" or "2-4"
        #[arg(short = 'p', long)]
        periods: String,

        #[arg(short = 't', long)]
        teacher_id: Option<TeacherId>,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long, value_parser = parse_date)]
        effective_from: Option<NaiveDate>,
    },
    /// Delete a single assignment by id
    Delete { id: AssignmentId },
    /// Delete every assignment of a range
    DeleteRange {
        #[command(flatten)]
        range: RangeArgs,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Generate assignments from a day/period x class grid sheet
    GenerateGrid {
        file: PathBuf,

        #[arg(long, value_parser = parse_date)]
        effective_from: Option<NaiveDate>,

        /// Commit valid candidates even when the sheet has issues
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Import a flat row-per-assignment sheet
    ImportFlat {
        file: PathBuf,

        /// Used for rows with a blank effective date
        #[arg(long, value_parser = parse_date)]
        effective_from: Option<NaiveDate>,

        /// Commit valid candidates even when the sheet has issues
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Export consolidated ranges to a CSV file the flat importer accepts
    Export {
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_flexible_date(raw).ok_or_else(|| format!("invalid date '{}'", raw))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Permissions from `TIMETABLE_PERMISSIONS` (comma separated), or full
/// schedule access when unset.
fn capabilities() -> StaticCapabilities {
    match std::env::var("TIMETABLE_PERMISSIONS") {
        Ok(list) if !list.trim().is_empty() => StaticCapabilities::from_permissions(
            list.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from),
        ),
        _ => StaticCapabilities::schedule_admin(),
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("\n❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), AppError> {
    let database_config = DatabaseConfig::from_env()?;
    let pool = init_db_pool(&database_config).await?;
    let caps = capabilities();

    if let Commands::Migrate = command {
        timetable_db::run_migrations(&pool)
            .await
            .map_err(AppError::persistence)?;
        println!("\n✅ Migrations applied");
        return Ok(());
    }

    let service = ScheduleService::from_pool(pool, ScheduleConfig::from_env());
    info!(academic_year = %service.config().academic_year, "Timetable CLI ready");

    match command {
        Commands::Migrate => Ok(()),
        Commands::List {
            filters,
            page,
            limit,
        } => {
            require_capability(&caps, permissions::READ)?;
            handle_list(&service, filters, page, limit).await
        }
        Commands::Periods { class, day } => {
            require_capability(&caps, permissions::READ)?;
            handle_periods(&service, &class, day).await
        }
        Commands::Create {
            teacher_id,
            subject,
            day,
            class,
            periods,
            effective_from,
        } => {
            require_capability(&caps, permissions::CREATE)?;
            let dto = CreateScheduleDto {
                teacher_id,
                subject_name: subject,
                day_of_week: day,
                class_name: class,
                periods: parse_periods_arg(&periods)?,
                effective_from: effective_from.unwrap_or_else(today),
            };
            handle_create(&service, dto).await
        }
        Commands::UpdateRange {
            range,
            periods,
            teacher_id,
            subject,
            effective_from,
        } => {
            require_capability(&caps, permissions::UPDATE)?;
            let dto = UpdateRangeDto {
                teacher_id,
                subject_name: subject,
                periods: parse_periods_arg(&periods)?,
                effective_from,
            };
            handle_update_range(&service, range, dto).await
        }
        Commands::Delete { id } => {
            require_capability(&caps, permissions::DELETE)?;
            service.delete(id).await?;
            println!("\n✅ Assignment {} deleted", id);
            Ok(())
        }
        Commands::DeleteRange { range, yes } => {
            require_capability(&caps, permissions::DELETE)?;
            handle_delete_range(&service, range, yes).await
        }
        Commands::GenerateGrid {
            file,
            effective_from,
            yes,
        } => {
            require_capability(&caps, permissions::IMPORT)?;
            let sheet = spreadsheet::read_rows(&file)?;
            let outcome = service
                .generate_from_grid(&sheet, effective_from.unwrap_or_else(today), |preview| {
                    confirm_preview(preview, yes)
                })
                .await?;
            output::print_outcome(&outcome);
            Ok(())
        }
        Commands::ImportFlat {
            file,
            effective_from,
            yes,
        } => {
            require_capability(&caps, permissions::IMPORT)?;
            let records = spreadsheet::rows_to_records(&spreadsheet::read_rows(&file)?);
            let outcome = service
                .import_flat(&records, effective_from.unwrap_or_else(today), |preview| {
                    confirm_preview(preview, yes)
                })
                .await?;
            output::print_outcome(&outcome);
            Ok(())
        }
        Commands::Export { file, filters } => {
            require_capability(&caps, permissions::EXPORT)?;
            let params = filters.into_params(PaginationParams::default());
            let rows = service.export(&params).await?;
            spreadsheet::write_export(&file, &rows)?;
            println!("\n✅ Exported {} range(s) to {}", rows.len(), file.display());
            Ok(())
        }
    }
}

fn parse_periods_arg(raw: &str) -> Result<Vec<i32>, AppError> {
    parse_period_field(raw)
        .ok_or_else(|| AppError::input(anyhow::anyhow!("invalid period list '{}'", raw)))
}

/// Shows the pre-flight issues and asks whether to commit anyway.
fn confirm_preview(preview: &CandidatePreview, yes: bool) -> bool {
    output::print_preview(preview);
    if yes {
        return true;
    }

    Confirm::new()
        .with_prompt(format!(
            "Write the {} valid candidate(s) anyway?",
            preview.candidates.len()
        ))
        .default(false)
        .interact()
        .unwrap_or(false)
}

async fn handle_list(
    service: &ScheduleService,
    filters: FilterArgs,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<(), AppError> {
    let params = filters.into_params(PaginationParams {
        limit,
        offset: None,
        page,
    });
    let response = service.list(&params).await?;

    if response.data.is_empty() {
        println!("\nNo schedules found");
        return Ok(());
    }

    println!();
    for range in &response.data {
        println!("{}", output::range_line(range));
    }
    println!(
        "\nShowing {} of {} range(s){}",
        response.data.len(),
        response.meta.total,
        if response.meta.has_more { ", more available" } else { "" }
    );
    Ok(())
}

async fn handle_periods(
    service: &ScheduleService,
    class: &str,
    day: DayOfWeek,
) -> Result<(), AppError> {
    let slots = service.available_periods(class, day).await?;
    if slots.is_empty() {
        println!("\nNo periods configured for {} on {}", class, day);
        return Ok(());
    }

    println!("\nPeriods for {} on {}:", class, day);
    for slot in &slots {
        println!("  {}", output::slot_line(slot));
    }
    Ok(())
}

async fn handle_create(service: &ScheduleService, dto: CreateScheduleDto) -> Result<(), AppError> {
    let created = service.create(dto).await?;
    println!("\n✅ Created {} assignment(s)", created.len());
    for assignment in &created {
        println!("   {} period {}", assignment.id, assignment.period_number);
    }
    Ok(())
}

/// Finds the range starting at `args.start`, prompting when several
/// teachers or effective dates share that start.
async fn select_range(
    service: &ScheduleService,
    args: &RangeArgs,
) -> Result<ConsolidatedRange, AppError> {
    let filter = AssignmentFilter {
        day_of_week: Some(args.day),
        class_name: Some(args.class.trim().to_string()),
        as_of: args.as_of,
        ..Default::default()
    };
    let mut matches: Vec<ConsolidatedRange> = service
        .ranges(&filter)
        .await?
        .into_iter()
        .filter(|range| range.start_period == args.start)
        .collect();

    match matches.len() {
        0 => Err(AppError::not_found(anyhow::anyhow!(
            "No range starts at period {} for {} on {}",
            args.start,
            args.class,
            args.day
        ))),
        1 => Ok(matches.remove(0)),
        _ => {
            let items: Vec<String> = matches.iter().map(output::range_line).collect();
            let choice = Select::new()
                .with_prompt("Several ranges match, pick one")
                .items(&items)
                .default(0)
                .interact()
                .map_err(AppError::input)?;
            Ok(matches.swap_remove(choice))
        }
    }
}

async fn handle_update_range(
    service: &ScheduleService,
    args: RangeArgs,
    dto: UpdateRangeDto,
) -> Result<(), AppError> {
    let range = select_range(service, &args).await?;
    let created = service.update_range(&range, dto).await?;
    println!(
        "\n✅ Range {} replaced by {} assignment(s)",
        range.label,
        created.len()
    );
    Ok(())
}

async fn handle_delete_range(
    service: &ScheduleService,
    args: RangeArgs,
    yes: bool,
) -> Result<(), AppError> {
    let range = select_range(service, &args).await?;
    println!("\n{}", output::range_line(&range));

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete these {} assignment(s)?",
                range.assignment_ids.len()
            ))
            .default(false)
            .interact()
            .map_err(AppError::input)?;
        if !confirmed {
            println!("\n⏹️  Nothing deleted");
            return Ok(());
        }
    }

    let outcome = service.delete_range(&range).await?;
    output::print_outcome(&outcome);
    Ok(())
}
