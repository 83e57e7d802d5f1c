//! `rollcall` command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto core services, one store transaction per action.
//! - Guard dashboard commands behind a live session and count every guarded
//!   command as user activity.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rollcall_core::db::open_db;
use rollcall_core::{
    year_options, AccountService, AttendanceService, Clock, DashboardService, MonthKey,
    NewStudent, PersistentStore, RosterService, SessionService, SqliteKvStore, StudentId,
    StudentPatch, SystemClock, ALL_CLASSES,
};
use std::path::PathBuf;

use crate::config::AppConfig;

type Store<'conn> = PersistentStore<SqliteKvStore<'conn>>;

/// rollcall: local attendance register
#[derive(Parser)]
#[command(name = "rollcall")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding the database and logs
    #[arg(long, env = "ROLLCALL_DATA_DIR", default_value = ".rollcall")]
    data_dir: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, env = "ROLLCALL_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Sign in and start a 20 minute session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        remember: bool,
    },
    /// End the current session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Manage the roster
    #[command(subcommand)]
    Students(StudentCommands),
    /// Read or mark the attendance grid
    #[command(subcommand)]
    Attendance(AttendanceCommands),
    /// Show KPIs and the attendance series
    Dashboard {
        /// Window length in days (30, 7 or 1 in the classic view)
        #[arg(short, long, default_value = "30")]
        days: u32,
        /// Class to include, or "all"
        #[arg(short, long, default_value = ALL_CLASSES)]
        class: String,
    },
    /// Account settings
    #[command(subcommand)]
    Account(AccountCommands),
}

#[derive(Subcommand)]
enum StudentCommands {
    /// List students, optionally filtered by a search string
    List {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Add a student
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        roll: u32,
        #[arg(long)]
        class: String,
        #[arg(long)]
        section: String,
        #[arg(long)]
        mobile: String,
    },
    /// Edit a student; omitted fields keep their value
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        roll: Option<u32>,
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        section: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
    },
    /// Remove a student and their attendance
    Remove { id: String },
    /// List distinct classes
    Classes,
}

#[derive(Subcommand)]
enum AttendanceCommands {
    /// Print the month grid
    Grid {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
        #[arg(short, long, default_value = ALL_CLASSES)]
        class: String,
    },
    /// Flip one day for one student
    Toggle {
        id: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        day: u32,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Change password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Change email
    Email {
        #[arg(long)]
        new: String,
    },
    /// Delete the signed-in account
    Delete,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli.data_dir, cli.log_level.clone())?;
    rollcall_core::init_logging(&config.log_level, &config.log_dir())
        .context("failed to initialize logging")?;
    info!(
        "event=cli_start module=cli status=ok data_dir={}",
        config.data_dir.display()
    );

    let conn = open_db(config.db_path())
        .with_context(|| format!("failed to open {}", config.db_path().display()))?;
    let store = PersistentStore::new(SqliteKvStore::try_new(&conn)?);
    let clock = SystemClock;

    run(cli.command, &store, &clock)
}

fn run(command: Commands, store: &Store<'_>, clock: &dyn Clock) -> Result<()> {
    let sessions = SessionService::new(store, clock);
    let accounts = AccountService::new(store, clock);

    match command {
        Commands::Register {
            email,
            password,
            confirm,
        } => {
            let user = accounts.register(&email, &password, &confirm)?;
            println!("Account created for {}. You can login now.", user.email);
        }
        Commands::Login {
            email,
            password,
            remember,
        } => {
            let user = accounts.sign_in(&sessions, &email, &password, remember)?;
            println!("Signed in as {}.", user.email);
        }
        Commands::Logout => {
            sessions.logout()?;
            println!("Logged out.");
        }
        Commands::Whoami => match sessions.current_user()? {
            Some(email) => println!("{email}"),
            None => println!("Not signed in."),
        },
        Commands::Students(command) => {
            guard(&sessions, store, clock)?;
            students(command, store, clock)?;
        }
        Commands::Attendance(command) => {
            guard(&sessions, store, clock)?;
            attendance(command, store, clock)?;
        }
        Commands::Dashboard { days, class } => {
            guard(&sessions, store, clock)?;
            dashboard(days, &class, store, clock)?;
        }
        Commands::Account(command) => {
            let email = guard(&sessions, store, clock)?;
            account(command, &email, &accounts, &sessions)?;
        }
    }
    Ok(())
}

/// Requires a live session, extends it and seeds the demo roster.
fn guard(
    sessions: &SessionService<'_, SqliteKvStore<'_>>,
    store: &Store<'_>,
    clock: &dyn Clock,
) -> Result<String> {
    let email = sessions
        .require_user()
        .context("please login first (sessions expire after 20 idle minutes)")?;
    RosterService::new(store, clock).seed_demo_if_empty()?;
    Ok(email)
}

fn students(command: StudentCommands, store: &Store<'_>, clock: &dyn Clock) -> Result<()> {
    let roster = RosterService::new(store, clock);
    match command {
        StudentCommands::List { search } => {
            let found = roster.search(&search)?;
            if found.is_empty() {
                println!("No matching students.");
            }
            for student in found {
                println!(
                    "{:<24} {:>4}  {:<20} {:<8} {:<4} {}",
                    student.id,
                    student.roll,
                    student.name,
                    student.student_class,
                    student.section,
                    student.mobile
                );
            }
        }
        StudentCommands::Add {
            name,
            roll,
            class,
            section,
            mobile,
        } => {
            let id = roster.add(NewStudent {
                name,
                roll,
                student_class: class,
                section,
                mobile,
            })?;
            println!("Student added: {id}");
        }
        StudentCommands::Edit {
            id,
            name,
            roll,
            class,
            section,
            mobile,
        } => {
            let patch = StudentPatch {
                name,
                roll,
                student_class: class,
                section,
                mobile,
            };
            if !roster.update(&StudentId::new(id.as_str()), &patch)? {
                bail!("student not found: {id}");
            }
            println!("Student updated.");
        }
        StudentCommands::Remove { id } => {
            if !roster.delete(&StudentId::new(id.as_str()))? {
                bail!("student not found: {id}");
            }
            println!("Student deleted.");
        }
        StudentCommands::Classes => {
            for class in roster.distinct_classes()? {
                println!("{class}");
            }
        }
    }
    Ok(())
}

fn attendance(command: AttendanceCommands, store: &Store<'_>, clock: &dyn Clock) -> Result<()> {
    let service = AttendanceService::new(store);
    match command {
        AttendanceCommands::Grid { year, month, class } => {
            let current = MonthKey::from_date(clock.today());
            let year = checked_year(year.unwrap_or(current.year()), current.year())?;
            let month = month.unwrap_or(current.month());

            let grid = service.month_grid(year, month, &class)?;
            let header: Vec<String> = (1..=grid.days).map(|day| format!("{day:>2}")).collect();
            println!("{} | {}", grid.month, header.join(" "));
            if grid.rows.is_empty() {
                println!("No students in this class.");
            }
            for row in grid.rows {
                let cells: Vec<&str> = row
                    .days
                    .iter()
                    .map(|present| if *present { " P" } else { " ." })
                    .collect();
                println!("{} | roll {} | {}", row.student_id, row.roll, row.name);
                println!("        | {}", cells.join(" "));
            }
        }
        AttendanceCommands::Toggle {
            id,
            year,
            month,
            day,
        } => {
            let current_year = MonthKey::from_date(clock.today()).year();
            let year = checked_year(year, current_year)?;
            let student_id = StudentId::new(id.as_str());
            if RosterService::new(store, clock).get(&student_id)?.is_none() {
                bail!("student not found: {id}");
            }
            let present = service.toggle(&student_id, year, month, day)?;
            println!(
                "{id} {year}-{month:02}-{day:02}: {}",
                if present { "present" } else { "absent" }
            );
        }
    }
    Ok(())
}

/// Keeps `year` inside the month picker's range.
fn checked_year(year: i32, current_year: i32) -> Result<i32> {
    let options = year_options(current_year);
    if !options.contains(&year) {
        bail!(
            "year must be between {} and {}",
            options.start(),
            options.end()
        );
    }
    Ok(year)
}

fn dashboard(days: u32, class: &str, store: &Store<'_>, clock: &dyn Clock) -> Result<()> {
    let snapshot = DashboardService::new(store, clock).snapshot(days, class)?;
    println!("Class: {}  Window: {} days", snapshot.class_filter, snapshot.period_days);
    println!("Total students: {}", snapshot.total_students);
    println!(
        "Present: {}%  Absent: {}%",
        snapshot.kpi.present_pct, snapshot.kpi.absent_pct
    );
    for point in &snapshot.series {
        println!("{:>7} {:>4} {}", point.label, point.present, "#".repeat(point.present));
    }
    println!(
        "{}: present {} / absent {}",
        snapshot.monthly.month, snapshot.monthly.present, snapshot.monthly.absent
    );
    Ok(())
}

fn account(
    command: AccountCommands,
    email: &str,
    accounts: &AccountService<'_, SqliteKvStore<'_>>,
    sessions: &SessionService<'_, SqliteKvStore<'_>>,
) -> Result<()> {
    match command {
        AccountCommands::Password {
            current,
            new,
            confirm,
        } => {
            accounts.change_password(email, &current, &new, &confirm)?;
            println!("Password updated.");
        }
        AccountCommands::Email { new } => {
            let email = accounts.change_email(sessions, email, &new)?;
            println!("Email updated to {email}.");
        }
        AccountCommands::Delete => {
            accounts.delete_account(sessions, email)?;
            println!("Account deleted.");
        }
    }
    Ok(())
}
