//! Habit management commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use menagerie_core::{
    format_cadence, Event, Habit, HabitDraft, HabitUpdate, HealthEngine, HealthStatus, Vitality,
};
use serde::Serialize;

use super::Session;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Habit name
        name: String,
        /// Display color (#RRGGBB, default from config)
        #[arg(long)]
        color: Option<String>,
        /// Seconds between completions (default from config)
        #[arg(long)]
        cadence: Option<u64>,
        /// Creature token (default from config)
        #[arg(long)]
        animal: Option<String>,
    },
    /// List habits
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one habit
    Show {
        /// Habit ID or unique prefix
        id: String,
    },
    /// Edit name, color, cadence or animal
    Update {
        /// Habit ID or unique prefix
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        cadence: Option<u64>,
        #[arg(long)]
        animal: Option<String>,
    },
    /// Delete a habit
    Delete {
        /// Habit ID or unique prefix
        id: String,
    },
    /// Record a completion
    Complete {
        /// Habit ID or unique prefix
        id: String,
    },
    /// Revive a dead habit without recording a completion
    Revive {
        /// Habit ID or unique prefix
        id: String,
    },
    /// Run one health check and print what changed
    Tick,
}

/// A habit plus the derived fields a display needs.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HabitView<'a> {
    #[serde(flatten)]
    habit: &'a Habit,
    status: HealthStatus,
    vitality: Vitality,
    cadence_label: String,
    overdue: bool,
    next_due: DateTime<Utc>,
}

impl<'a> HabitView<'a> {
    fn new(habit: &'a Habit, engine: &HealthEngine, now: DateTime<Utc>) -> Self {
        Self {
            habit,
            status: HealthStatus::of(habit),
            vitality: engine.vitality(habit, now),
            cadence_label: format_cadence(habit.cadence),
            overdue: habit.is_overdue(now),
            next_due: habit.next_expected_completion(),
        }
    }
}

fn print_table(session: &Session, now: DateTime<Utc>) {
    if session.manager.is_empty() {
        println!("No habits yet.");
        return;
    }
    for habit in session.manager.habits() {
        let view = HabitView::new(habit, session.manager.engine(), now);
        let id = habit.id.to_string();
        println!(
            "{}  {:<24} {:<16} every {:<4} {:>3}/100  {:<12} {} entries{}",
            &id[..8],
            habit.name,
            habit.animal_or_default(),
            view.cadence_label,
            habit.health.round(),
            view.status.label(),
            habit.entries.len(),
            if view.overdue { "  (overdue)" } else { "" },
        );
    }
}

fn print_events(events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(events)?);
    Ok(())
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open()?;
    let now = Utc::now();

    // Catch up on decay since the last invocation before acting.
    session.manager.tick(now);
    let catch_up = session.manager.drain_events();

    match action {
        HabitAction::Create {
            name,
            color,
            cadence,
            animal,
        } => {
            let defaults = &session.config.defaults;
            let draft = HabitDraft {
                name,
                color: color.unwrap_or_else(|| defaults.color.clone()),
                cadence: cadence.unwrap_or(defaults.cadence_secs),
                animal: Some(animal.unwrap_or_else(|| defaults.animal.clone())),
            };
            let habit = session.manager.create_habit(draft, now)?;
            let view = HabitView::new(&habit, session.manager.engine(), now);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        HabitAction::List { json } => {
            if json {
                let views: Vec<_> = session
                    .manager
                    .habits()
                    .iter()
                    .map(|h| HabitView::new(h, session.manager.engine(), now))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                print_table(&session, now);
            }
        }
        HabitAction::Show { id } => {
            let id = session.require_id(&id)?;
            let habit = session.manager.get(id).ok_or("habit vanished")?;
            let view = HabitView::new(habit, session.manager.engine(), now);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        HabitAction::Update {
            id,
            name,
            color,
            cadence,
            animal,
        } => {
            let update = HabitUpdate {
                name,
                color,
                cadence,
                animal,
            };
            if update.is_empty() {
                return Err("nothing to update: pass --name, --color, --cadence or --animal".into());
            }
            let updated = match session.find_id(&id)? {
                Some(id) => session.manager.update_habit(id, &update, now)?,
                None => false,
            };
            println!("{}", serde_json::json!({ "updated": updated }));
        }
        HabitAction::Delete { id } => {
            let deleted = match session.find_id(&id)? {
                Some(id) => session.manager.delete_habit(id, now),
                None => false,
            };
            println!("{}", serde_json::json!({ "deleted": deleted }));
        }
        HabitAction::Complete { id } => {
            let id = session.require_id(&id)?;
            let habit = session
                .manager
                .add_habit_entry(id, now)
                .ok_or("habit vanished")?
                .clone();
            let view = HabitView::new(&habit, session.manager.engine(), now);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        HabitAction::Revive { id } => {
            let id = session.require_id(&id)?;
            let habit = session
                .manager
                .revive_habit(id, now)
                .ok_or("habit vanished")?
                .clone();
            let view = HabitView::new(&habit, session.manager.engine(), now);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        HabitAction::Tick => {
            print_events(&catch_up)?;
        }
    }

    for event in catch_up.iter().chain(&session.manager.drain_events()) {
        tracing::info!(?event, "habit event");
    }
    session.persist();
    Ok(())
}
