use chrono::{DateTime, Datelike, Duration as Span, NaiveDate, TimeZone, Utc};
use habitquest_core::{
    AppState, Difficulty, Duration, Habit, Importance, RecurrenceRule, ScoringWeights, Task, User,
    XpSource, apply_completion, init_logging, is_habit_due_on, score_task,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 14, 8, 0, 0).unwrap()
}

fn fresh_state() -> AppState {
    let _ = init_logging(Some("debug"));
    AppState::new(User::new("robin", now()))
}

/// High (2) + Medium (1) + Short (0.5), nothing else set.
#[test]
fn test_plain_task_scores_three_and_a_half() {
    let task = Task::new("t", "file taxes", now())
        .with_importance(Importance::High)
        .with_difficulty(Difficulty::Medium)
        .with_duration(Duration::Short);
    let weights = ScoringWeights::default();
    assert_eq!(score_task(&task, &weights, &[task.clone()], now()), 3.5);
}

#[test]
fn test_vacation_mode_zeroes_any_task() {
    let weights = ScoringWeights {
        vacation_mode: true,
        ..Default::default()
    };
    let mut blocker = Task::new("b", "blocked", now()).with_dependencies(["t"]);
    blocker.score = 50.0;
    let task = Task::new("t", "everything", now())
        .with_importance(Importance::DefconOne)
        .with_difficulty(Difficulty::Herculean)
        .with_duration(Duration::Odysseyan)
        .with_due_date(now() - Span::days(40))
        .with_start_date(now() - Span::days(41))
        .with_next(true)
        .with_in_progress(true);
    assert_eq!(score_task(&task, &weights, &[task.clone(), blocker], now()), 0.0);
}

#[test]
fn test_every_other_day_habit() {
    let created = Utc.with_ymd_and_hms(2026, 9, 1, 6, 0, 0).unwrap();
    let habit = Habit::new("h", "water plants", RecurrenceRule::every_n_days(2), created);
    let day0 = created.date_naive();
    let due: Vec<bool> = (0..5)
        .map(|i| is_habit_due_on(&habit, day0 + Span::days(i)))
        .collect();
    assert_eq!(due, vec![true, false, true, false, true]);
}

/// Created late in the Chicago evening, when UTC is already on the next day.
#[test]
fn test_every_other_day_habit_in_local_zone() {
    let mut state = fresh_state();
    state.user.preferences.timezone = "America/Chicago".into();
    let created = Utc.with_ymd_and_hms(2026, 1, 6, 2, 0, 0).unwrap();
    let h = state.create_habit("water plants", RecurrenceRule::every_n_days(2), created);

    let due: Vec<usize> = (0..5)
        .map(|i| state.habits_due_today(created + Span::days(i)).len())
        .collect();
    assert_eq!(due, vec![1, 0, 1, 0, 1]);

    state.refresh_habit_occurrences(created + Span::days(4));
    assert_eq!(state.habit(&h).unwrap().streak.total_occurrences, 3);
}

#[test]
fn test_last_day_of_month_habit_across_years() {
    let habit = Habit::new("h", "budget review", RecurrenceRule::monthly_last_day(), now());
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

    let fired: Vec<NaiveDate> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_habit_due_on(&habit, *d))
        .collect();

    assert_eq!(fired.len(), 24);
    for d in &fired {
        assert_ne!(d.succ_opt().unwrap().month(), d.month());
    }
    let feb: Vec<u32> = fired.iter().filter(|d| d.month() == 2).map(|d| d.day()).collect();
    assert_eq!(feb, vec![28, 29]);
}

#[test]
fn test_repeated_toggles_keep_one_record_per_day() {
    let mut habit = Habit::new("h", "journal", RecurrenceRule::daily(), now());
    let day = now().date_naive();
    for i in 0..10 {
        habit = apply_completion(&habit, day, i % 3 != 0);
    }
    assert_eq!(habit.completions.iter().filter(|c| c.date == day).count(), 1);
}

/// The split rounds each share, so the sum can drift from the score.
#[test]
fn test_subtask_xp_split_rounding_drift() {
    let mut state = fresh_state();
    let task = Task::new("launch", "launch site", now())
        .with_importance(Importance::DefconOne)
        .with_difficulty(Difficulty::High)
        .with_duration(Duration::Long)
        .with_in_progress(true);
    state.add_task(task, now()).unwrap();
    // 4 + 2 + 2 + 1.5
    let score = state.task("launch").unwrap().score;
    assert_eq!(score, 9.5);

    let subtasks: Vec<String> = ["copy", "design", "deploy"]
        .iter()
        .map(|t| state.add_subtask("launch", *t, now()).unwrap())
        .collect();
    let n = subtasks.len() as f64;

    let mut total = 0;
    for id in &subtasks {
        total += state.complete_subtask("launch", id, now()).unwrap();
    }
    total += state.complete_task("launch", now()).unwrap();

    let share = (score / (n + 1.0)).round() as i64;
    assert_eq!(share, 2);
    assert_eq!(total, (n as i64 + 1) * share);
    assert_eq!(total, 8);
    assert_ne!(total, score.round() as i64);
    assert_eq!(state.user.xp, total);
}

#[test]
fn test_day_in_the_life() {
    let mut state = fresh_state();
    let t0 = now();

    let work = state.create_project("work");
    let urgent = state.create_tag("urgent");
    let mut weights = ScoringWeights::default();
    weights.project_multipliers.insert(work.clone(), 1.5);
    weights.tag_multipliers.insert(urgent.clone(), 2.0);
    state.set_weights(weights, t0);

    let design = state
        .add_task(
            Task::new("design", "write design doc", t0)
                .with_project(work.clone())
                .with_due_date(t0 + Span::hours(30)),
            t0,
        )
        .unwrap();
    let build = state
        .add_task(
            Task::new("build", "build it", t0)
                .with_dependencies([design.clone()])
                .with_tags([urgent.clone()]),
            t0,
        )
        .unwrap();
    let later = state
        .add_task(
            Task::new("retro", "retro", t0).with_start_date(t0 + Span::days(5)),
            t0,
        )
        .unwrap();
    let gym = state.create_habit("gym", RecurrenceRule::daily(), t0);

    let active: Vec<&str> = state.active_tasks(t0).into_iter().map(|t| t.id.as_str()).collect();
    assert_eq!(active, vec![design.as_str()]);
    assert_eq!(state.future_tasks(t0)[0].id, later);
    assert_eq!(state.habits_due_today(t0).len(), 1);

    // The dependency boost only lands after a full pass.
    let before = state.task(&design).unwrap().score;
    state.recalculate_all_scores(t0);
    let after = state.task(&design).unwrap().score;
    assert!(after > before);

    state.complete_task(&design, t0).unwrap();
    let active: Vec<&str> = state.active_tasks(t0).into_iter().map(|t| t.id.as_str()).collect();
    assert_eq!(active, vec![build.as_str()]);

    state
        .set_habit_completion(&gym, t0.date_naive(), true, t0)
        .unwrap();
    assert!(state.habits_due_today(t0).is_empty());
    assert_eq!(state.completed_habits_today(t0).len(), 1);

    let balance = state.user.xp;
    state.withdraw_xp(1, "coffee", t0).unwrap();
    assert_eq!(state.user.xp, balance - 1);
    assert!(state
        .user
        .transactions
        .iter()
        .any(|t| t.source == XpSource::Habit));

    // Tomorrow the habit is due again and the streak carries on.
    let t1 = t0 + Span::days(1);
    assert_eq!(state.habits_due_today(t1).len(), 1);
    state
        .set_habit_completion(&gym, t1.date_naive(), true, t1)
        .unwrap();
    assert_eq!(state.habit(&gym).unwrap().streak.current, 2);

    state.delete_project(&work, t1).unwrap();
    assert!(state.task(&design).unwrap().project_id.is_none());
}
