//! Unit tests for the deterministic field extractor.

use chrono::{Datelike, NaiveDate, Utc, Weekday};

use site_taskbot::models::job_type::default_job_types;
use site_taskbot::models::member::{default_roster, TeamMember};
use site_taskbot::models::project::Project;
use site_taskbot::models::task::Priority;
use site_taskbot::parser::dates::{next_weekday, resolve_due_date};
use site_taskbot::parser::extractor::{self, ExtractContext};

/// Friday.
fn friday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("date")
}

fn project(key: &str, list_id: &str, name: &str) -> Project {
    let now = Utc::now();
    Project {
        simple_key: key.into(),
        remote_list_id: list_id.into(),
        display_name: name.into(),
        parent_space: "Jobs".into(),
        created_at: now,
        synced_at: now,
    }
}

struct Fixture {
    roster: Vec<TeamMember>,
    projects: Vec<Project>,
    job_types: Vec<site_taskbot::models::job_type::JobType>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            roster: default_roster(),
            projects: vec![
                project("oak", "L-OAK", "Oak Street"),
                project("maple", "L-MAPLE", "Maple Ave"),
            ],
            job_types: default_job_types(),
        }
    }

    fn ctx(&self, default_assignee: Option<&'static str>) -> ExtractContext<'_> {
        ExtractContext {
            roster: &self.roster,
            projects: &self.projects,
            job_types: &self.job_types,
            default_assignee,
            today: friday(),
        }
    }
}

#[test]
fn end_to_end_sarah_outlets() {
    let fx = Fixture::new();
    let record = extractor::extract("Sarah needs to install outlets tomorrow, urgent", &fx.ctx(None));

    assert_eq!(record.assignee.as_deref(), Some("Sarah"));
    assert_eq!(record.priority, Priority::Urgent);
    assert_eq!(record.due_date, NaiveDate::from_ymd_opt(2026, 10, 17));
    assert_eq!(record.title, "install outlets");
    assert_eq!(record.display_title, "[Sarah] install outlets");
    assert!(record.tags.contains("Electrical"));
}

#[test]
fn assignee_phrase_is_not_duplicated() {
    let fx = Fixture::new();
    let record = extractor::extract("Mike needs to fix the leak", &fx.ctx(None));
    assert_eq!(record.title, "fix the leak");
    assert_eq!(record.display_title.matches("Mike").count(), 1);
}

#[test]
fn name_inside_title_gets_no_prefix() {
    let fx = Fixture::new();
    let record = extractor::extract("call Mike about the leak", &fx.ctx(Some("mike")));
    assert_eq!(record.assignee.as_deref(), Some("Mike"));
    assert_eq!(record.display_title, "call Mike about the leak");
}

#[test]
fn default_assignee_prefixes_title() {
    let fx = Fixture::new();
    let record = extractor::extract("fix the leak", &fx.ctx(Some("Mike")));
    assert_eq!(record.assignee.as_deref(), Some("Mike"));
    assert_eq!(record.display_title, "[Mike] fix the leak");
}

#[test]
fn no_assignee_leaves_title_alone() {
    let fx = Fixture::new();
    let record = extractor::extract("fix the leak", &fx.ctx(None));
    assert_eq!(record.assignee, None);
    assert_eq!(record.display_title, "fix the leak");
}

#[test]
fn longer_words_do_not_match_member_keys() {
    let fx = Fixture::new();
    for message in [
        "tomas should grade the east lot",
        "pick up gloves for tomas",
        "hand the keys to tomas",
        "tomas: dig the footing",
    ] {
        let ex = extractor::run(message, &fx.ctx(None));
        assert_eq!(ex.assignee, None, "{message}");
    }
}

#[test]
fn earlier_roster_member_wins_when_both_match() {
    let fx = Fixture::new();
    let record = extractor::extract("Tom should hand the keys to Mike", &fx.ctx(None));
    assert_eq!(record.assignee.as_deref(), Some("Mike"));

    let mut reversed = Fixture::new();
    reversed.roster.reverse();
    let record = extractor::extract("Tom should hand the keys to Mike", &reversed.ctx(None));
    assert_eq!(record.assignee.as_deref(), Some("Tom"));
}

#[test]
fn default_assignee_uses_roster_spelling() {
    let fx = Fixture::new();
    let record = extractor::extract("sweep the trailer", &fx.ctx(Some(" SARAH ")));
    assert_eq!(record.assignee.as_deref(), Some("Sarah"));
}

#[test]
fn safety_overrides_low_priority() {
    let fx = Fixture::new();
    let record = extractor::extract("low priority safety issue at Oak", &fx.ctx(None));
    assert_eq!(record.priority, Priority::Urgent);
    assert!(record.tags.contains("Safety"));
}

#[test]
fn priority_tiers() {
    let fx = Fixture::new();
    let cases = [
        ("gas leak emergency", Priority::Urgent),
        ("high priority order rebar", Priority::High),
        ("sweep the trailer whenever", Priority::Low),
        ("sweep the trailer", Priority::Normal),
    ];
    for (message, expected) in cases {
        assert_eq!(extractor::extract(message, &fx.ctx(None)).priority, expected, "{message}");
    }
}

#[test]
fn inflected_urgent_words_are_urgent() {
    let fx = Fixture::new();
    for message in [
        "dangerously loose scaffold plank",
        "two emergencies at the yard",
        "endangered workers near the pit",
        "critically important beam",
        "hazardous fumes in the basement",
        "fix the safetyline anchor on level 3",
    ] {
        let record = extractor::extract(message, &fx.ctx(None));
        assert_eq!(record.priority, Priority::Urgent, "{message}");
    }
}

#[test]
fn high_and_low_need_word_boundaries() {
    let fx = Fixture::new();
    for message in ["check the highway barrier and allow access", "clear the overflow drain"] {
        let record = extractor::extract(message, &fx.ctx(None));
        assert_eq!(record.priority, Priority::Normal, "{message}");
    }
}

#[test]
fn friday_on_friday_rolls_to_next_week() {
    let fx = Fixture::new();
    let record = extractor::extract("pour slab by friday", &fx.ctx(None));
    assert_eq!(record.due_date, NaiveDate::from_ymd_opt(2026, 10, 23));
    assert_eq!(record.title, "pour slab");
}

#[test]
fn next_weekday_is_strictly_after_today() {
    let today = friday();
    for target in [Weekday::Mon, Weekday::Thu, Weekday::Fri, Weekday::Sat] {
        let date = next_weekday(today, target);
        assert!(date > today);
        assert!((date - today).num_days() <= 7);
        assert_eq!(date.weekday(), target);
    }
}

#[test]
fn tomorrow_takes_precedence_over_weekday() {
    let found = resolve_due_date("monday or tomorrow", friday()).expect("resolves");
    assert_eq!(found.date, NaiveDate::from_ymd_opt(2026, 10, 17).expect("date"));
}

#[test]
fn project_prefix_is_resolved_and_removed() {
    let fx = Fixture::new();
    let ex = extractor::run("oak: fix the leak", &fx.ctx(None));
    assert_eq!(ex.project_key.as_deref(), Some("oak"));
    assert_eq!(ex.project_ref.as_deref(), Some("L-OAK"));
    assert_eq!(ex.title, "fix the leak");
}

#[test]
fn dash_prefix_is_a_project_prefix() {
    let fx = Fixture::new();
    let ex = extractor::run("Maple - frame the north wall", &fx.ctx(None));
    assert_eq!(ex.project_key.as_deref(), Some("maple"));
    assert_eq!(ex.title, "frame the north wall");
}

#[test]
fn bare_project_mention_resolves_but_stays_in_title() {
    let fx = Fixture::new();
    let ex = extractor::run("deliver gravel to the oak site", &fx.ctx(None));
    assert_eq!(ex.project_key.as_deref(), Some("oak"));
    assert_eq!(ex.title, "deliver gravel to the oak site");
}

#[test]
fn project_key_inside_longer_word_is_ignored() {
    let fx = Fixture::new();
    let ex = extractor::run("deliver gravel to oakwood", &fx.ctx(None));
    assert_eq!(ex.project_ref, None);
    assert_eq!(ex.project_key, None);
}

#[test]
fn unknown_project_leaves_reference_empty() {
    let fx = Fixture::new();
    let ex = extractor::run("pine: fix the leak", &fx.ctx(None));
    assert_eq!(ex.project_ref, None);
}

#[test]
fn job_types_are_tagged() {
    let fx = Fixture::new();
    let record = extractor::extract("pour the slab and check the breaker panel", &fx.ctx(None));
    assert!(record.tags.contains("Concrete"));
    assert!(record.tags.contains("Electrical"));
    assert!(record.tags.contains("Inspection"));
    assert!(!record.tags.contains("Plumbing"));
}

#[test]
fn title_is_never_empty() {
    let fx = Fixture::new();
    for message in ["urgent", "tomorrow", "asap!"] {
        let record = extractor::extract(message, &fx.ctx(None));
        assert!(!record.title.trim().is_empty(), "{message}");
    }
}

#[test]
fn description_keeps_original_message() {
    let fx = Fixture::new();
    let record = extractor::extract("  Tom should grade the east lot  ", &fx.ctx(None));
    assert_eq!(record.assignee.as_deref(), Some("Tom"));
    assert_eq!(record.raw_message, "Tom should grade the east lot");
    assert_eq!(record.description, "Original message: Tom should grade the east lot");
    assert!(record.tags.contains("Grading"));
}
