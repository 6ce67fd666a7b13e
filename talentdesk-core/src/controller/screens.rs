//! src/controller/screens.rs
//! ============================================================================
//! # Dataset screens: columns, search fields and filters per record type

use ratatui::layout::Constraint;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    config::TableConfig,
    controller::{
        actions::Action,
        screen::{FilterCycle, Screen, TableScreen, sort_emitter},
    },
    model::{
        field::FieldValue,
        list_query::QueryEngine,
        records::{
            ActivityEntry, Application, ApplicationStatus, Job, JobStatus, Role, User, Workspace,
        },
    },
    view::components::data_table::{Column, DataTable},
};

pub const APPLICATIONS_TAB: usize = 0;
pub const JOBS_TAB: usize = 1;
pub const USERS_TAB: usize = 2;
pub const ACTIVITY_TAB: usize = 3;

/// `hiring_manager` → `Hiring manager`
#[must_use]
pub fn humanize(raw: &str) -> String {
    let spaced = raw.replace('_', " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn humanized_cell<T>(value: Option<&FieldValue>, _: &T) -> String {
    value.map(|v| humanize(&v.to_string())).unwrap_or_default()
}

fn text_eq(field: &str, value: &Value) -> bool {
    value.as_str().is_some_and(|v| v.eq_ignore_ascii_case(field))
}

/// One screen per dataset, in tab order.
pub fn build_screens(
    workspace: &Workspace,
    config: &TableConfig,
    action_tx: &UnboundedSender<Action>,
) -> Vec<Box<dyn TableScreen>> {
    let mut screens: Vec<Box<dyn TableScreen>> = vec![
        Box::new(applications_screen(config, action_tx.clone())),
        Box::new(jobs_screen(config, action_tx.clone())),
        Box::new(users_screen(config, action_tx.clone())),
        Box::new(activity_screen(config, action_tx.clone())),
    ];
    for screen in &mut screens {
        screen.load(workspace);
    }
    screens
}

pub fn applications_engine() -> QueryEngine<Application> {
    QueryEngine::new(
        Vec::new(),
        ["candidate_name", "email", "job_title", "department"],
    )
    .with_predicate("status", |a: &Application, v: &Value| {
        text_eq(a.status.as_str(), v)
    })
    .with_predicate("department", |a: &Application, v: &Value| {
        text_eq(&a.department, v)
    })
    .with_predicate("min_score", |a: &Application, v: &Value| {
        match (a.score, v.as_f64()) {
            (Some(score), Some(min)) => score >= min,
            _ => false,
        }
    })
}

fn applications_screen(config: &TableConfig, tx: UnboundedSender<Action>) -> Screen<Application> {
    let table = DataTable::new(vec![
        Column::new("id", "#").sortable().width(Constraint::Length(6)),
        Column::new("candidate_name", "Candidate").sortable(),
        Column::new("job_title", "Position").sortable(),
        Column::new("department", "Department")
            .sortable()
            .width(Constraint::Length(16)),
        Column::new("status", "Status")
            .sortable()
            .width(Constraint::Length(10))
            .render(humanized_cell),
        Column::new("score", "Score")
            .sortable()
            .width(Constraint::Length(6))
            .render(|value, _| match value {
                Some(FieldValue::Float(score)) => format!("{score:.1}"),
                _ => "-".to_string(),
            }),
        Column::new("applied_at", "Applied")
            .sortable()
            .width(Constraint::Length(10)),
    ])
    .with_title("Applications")
    .with_empty_message("No applications match the current search")
    .on_sort(sort_emitter(APPLICATIONS_TAB, tx));

    Screen::new(
        "Applications",
        applications_engine(),
        table,
        |ws| ws.applications.clone(),
        config,
    )
    .with_filter(FilterCycle::new(
        "status",
        "Status",
        ApplicationStatus::ALL.iter().map(|s| json!(s.as_str())),
    ))
}

pub fn jobs_engine() -> QueryEngine<Job> {
    QueryEngine::new(Vec::new(), ["title", "department", "location"])
        .with_predicate("status", |j: &Job, v: &Value| text_eq(j.status.as_str(), v))
        .with_predicate("employment_type", |j: &Job, v: &Value| {
            text_eq(j.employment_type.as_str(), v)
        })
        .with_predicate("department", |j: &Job, v: &Value| text_eq(&j.department, v))
}

fn jobs_screen(config: &TableConfig, tx: UnboundedSender<Action>) -> Screen<Job> {
    let table = DataTable::new(vec![
        Column::new("title", "Title").sortable(),
        Column::new("department", "Department")
            .sortable()
            .width(Constraint::Length(16)),
        Column::new("location", "Location").sortable(),
        Column::new("employment_type", "Type")
            .sortable()
            .width(Constraint::Length(11))
            .render(humanized_cell),
        Column::new("status", "Status")
            .sortable()
            .width(Constraint::Length(8))
            .render(humanized_cell),
        Column::new("openings", "Open")
            .sortable()
            .width(Constraint::Length(5)),
        Column::new("posted_at", "Posted")
            .sortable()
            .width(Constraint::Length(10)),
    ])
    .with_title("Jobs")
    .with_empty_message("No jobs match the current search")
    .on_sort(sort_emitter(JOBS_TAB, tx));

    Screen::new("Jobs", jobs_engine(), table, |ws| ws.jobs.clone(), config).with_filter(
        FilterCycle::new(
            "status",
            "Status",
            JobStatus::ALL.iter().map(|s| json!(s.as_str())),
        ),
    )
}

pub fn users_engine() -> QueryEngine<User> {
    QueryEngine::new(Vec::new(), ["name", "email", "department"])
        .with_predicate("role", |u: &User, v: &Value| text_eq(u.role.as_str(), v))
        .with_predicate("active", |u: &User, v: &Value| v.as_bool() == Some(u.active))
        .with_predicate("department", |u: &User, v: &Value| {
            u.department.as_deref().is_some_and(|d| text_eq(d, v))
        })
}

fn users_screen(config: &TableConfig, tx: UnboundedSender<Action>) -> Screen<User> {
    let table = DataTable::new(vec![
        Column::new("name", "Name").sortable(),
        Column::new("email", "Email").sortable(),
        Column::new("role", "Role")
            .sortable()
            .width(Constraint::Length(15))
            .render(humanized_cell),
        Column::new("department", "Department")
            .sortable()
            .width(Constraint::Length(16)),
        Column::new("active", "Active")
            .width(Constraint::Length(6))
            .render(|_, user: &User| if user.active { "yes" } else { "no" }.to_string()),
        Column::new("last_login", "Last login")
            .sortable()
            .width(Constraint::Length(10))
            .render(|value, _| value.map_or_else(|| "never".to_string(), ToString::to_string)),
    ])
    .with_title("Users")
    .with_empty_message("No users match the current search")
    .on_sort(sort_emitter(USERS_TAB, tx));

    Screen::new("Users", users_engine(), table, |ws| ws.users.clone(), config).with_filter(
        FilterCycle::new("role", "Role", Role::ALL.iter().map(|r| json!(r.as_str()))),
    )
}

pub fn activity_engine() -> QueryEngine<ActivityEntry> {
    QueryEngine::new(Vec::new(), ["actor", "action", "target"])
}

fn activity_screen(config: &TableConfig, tx: UnboundedSender<Action>) -> Screen<ActivityEntry> {
    let table = DataTable::new(vec![
        Column::new("at", "When").sortable().width(Constraint::Length(10)),
        Column::new("actor", "Actor").sortable(),
        Column::new("action", "Action").sortable(),
        Column::new("target", "Target"),
    ])
    .with_title("Activity")
    .with_empty_message("No activity recorded")
    .on_sort(sort_emitter(ACTIVITY_TAB, tx));

    Screen::new(
        "Activity",
        activity_engine(),
        table,
        |ws| ws.activity.clone(),
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;
    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("hiring_manager"), "Hiring manager");
        assert_eq!(humanize("open"), "Open");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_application_predicates() {
        let mut engine = applications_engine();
        engine.set_items(Workspace::sample().applications);
        let all = engine.recompute();

        engine.update_filter("status", json!("HIRED"));
        let hired = engine.recompute();
        assert!(hired > 0 && hired < all);
        assert!(
            engine
                .filtered_and_sorted_items()
                .all(|a| a.status == ApplicationStatus::Hired)
        );

        engine.clear_filters();
        engine.update_filter("min_score", json!(4.0));
        engine.recompute();
        assert!(
            engine
                .filtered_and_sorted_items()
                .all(|a| a.score.is_some_and(|s| s >= 4.0))
        );
    }

    #[test]
    fn test_user_predicates() {
        let mut engine = users_engine();
        engine.set_items(Workspace::sample().users);

        engine.update_filter("active", json!(false));
        engine.recompute();
        assert!(engine.filtered_and_sorted_items().all(|u| !u.active));

        engine.update_filter("active", Value::Null);
        engine.update_filter("role", json!("recruiter"));
        engine.recompute();
        assert!(engine.filtered_and_sorted_items().all(|u| u.role == Role::Recruiter));
    }

    #[test]
    fn test_build_screens_loads_every_dataset() {
        let (tx, _rx) = unbounded_channel();
        let ws = Workspace::sample();
        let screens = build_screens(&ws, &TableConfig::default(), &tx);

        assert_eq!(screens.len(), 4);
        assert_eq!(screens[APPLICATIONS_TAB].summary().total_items, ws.applications.len());
        assert_eq!(screens[JOBS_TAB].summary().total_items, ws.jobs.len());
        assert_eq!(screens[USERS_TAB].summary().total_items, ws.users.len());
        assert_eq!(screens[ACTIVITY_TAB].summary().total_items, ws.activity.len());
        assert_eq!(screens[JOBS_TAB].title(), "Jobs");
    }

    #[test]
    fn test_cycle_filter_describes_state() {
        let (tx, _rx) = unbounded_channel();
        let mut screens = build_screens(&Workspace::sample(), &TableConfig::default(), &tx);
        let users = &mut screens[USERS_TAB];

        assert_eq!(users.cycle_filter().as_deref(), Some("Role: admin"));
        assert_eq!(users.active_filters(), vec![(CompactString::from("Role"), "admin".to_string())]);
        assert!(users.summary().total_results < users.summary().total_items);

        users.clear_filters();
        assert!(users.active_filters().is_empty());
        assert_eq!(users.cycle_filter().as_deref(), Some("Role: admin"));

        assert_eq!(screens[ACTIVITY_TAB].cycle_filter(), None);
    }

    #[test]
    fn test_no_match_message_is_shown_in_full() {
        let (tx, _rx) = unbounded_channel();
        let mut screens = build_screens(&Workspace::sample(), &TableConfig::default(), &tx);
        let apps = &mut screens[APPLICATIONS_TAB];
        assert!(apps.set_search_term("zzzz-no-match"));
        assert_eq!(apps.summary().total_results, 0);

        let mut terminal = Terminal::new(TestBackend::new(120, 10)).unwrap();
        terminal.draw(|f| apps.render(f, f.area())).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("No applications match the current search"));
    }
}
