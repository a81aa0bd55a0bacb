use chrono::Duration;
use momentum_core::Clock;
use momentum_core::model::{ActivityDraft, Goals, SessionKind};
use momentum_core::time::fixed_now;
use services::{AppServices, SessionServiceError};
use storage::repository::Storage;

// 2023-11-14 12:00 wall clock, inside the 07:00-21:00 active window.
fn midday() -> chrono::DateTime<chrono::Utc> {
    fixed_now()
        .date_naive()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}

fn app_at(now: chrono::DateTime<chrono::Utc>) -> (AppServices, Storage) {
    let storage = Storage::in_memory();
    (
        AppServices::with_storage(&storage, Clock::Fixed(now)),
        storage,
    )
}

#[tokio::test]
async fn focus_session_feeds_activity_and_challenge() {
    let (app, storage) = app_at(midday());

    let focus = app
        .activities()
        .create(ActivityDraft {
            name: "Focus Hour".to_owned(),
            goals: Goals {
                daily: 120,
                ..Goals::default()
            },
            time_based: true,
        })
        .await
        .unwrap();
    app.challenges().create(64.0).await.unwrap();

    let session = app
        .sessions()
        .start(focus.id(), SessionKind::Timer)
        .await
        .unwrap();

    // End 45 minutes later on a second stack sharing the same storage.
    let later = AppServices::with_storage(
        &storage,
        Clock::Fixed(midday() + Duration::minutes(45)),
    );
    let ended = later
        .sessions()
        .end(focus.id(), session.id())
        .await
        .unwrap();
    assert_eq!(ended.duration_minutes, 45);

    let activity = later.activities().get(focus.id()).await.unwrap();
    assert_eq!(activity.reps(), 45);

    let stats = later.challenges().stats().await.unwrap();
    assert_eq!(stats.total_focus_minutes, 45);
    assert_eq!(stats.days_active, 1);

    let progress = later.activities().progress(focus.id()).await.unwrap();
    assert!((progress.daily.percentage - 37.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn short_focus_session_credits_nothing() {
    let (app, storage) = app_at(midday());
    let focus = app
        .activities()
        .create(ActivityDraft {
            name: "Focus Hour".to_owned(),
            time_based: true,
            ..ActivityDraft::default()
        })
        .await
        .unwrap();
    app.challenges().create(64.0).await.unwrap();

    let session = app
        .sessions()
        .start(focus.id(), SessionKind::Timer)
        .await
        .unwrap();

    // 30 seconds floors to zero minutes: no reps, no challenge minutes.
    let later = AppServices::with_storage(
        &storage,
        Clock::Fixed(midday() + Duration::seconds(30)),
    );
    let ended = later
        .sessions()
        .end(focus.id(), session.id())
        .await
        .unwrap();
    assert_eq!(ended.duration_minutes, 0);

    let activity = later.activities().get(focus.id()).await.unwrap();
    assert_eq!(activity.reps(), 0);
    let stats = later.challenges().stats().await.unwrap();
    assert_eq!(stats.total_focus_minutes, 0);
}

#[tokio::test]
async fn one_active_session_per_activity() {
    let (app, _storage) = app_at(midday());
    let activity = app
        .activities()
        .create(ActivityDraft {
            name: "Reading".to_owned(),
            ..ActivityDraft::default()
        })
        .await
        .unwrap();

    app.sessions()
        .start(activity.id(), SessionKind::Manual)
        .await
        .unwrap();
    let err = app
        .sessions()
        .start(activity.id(), SessionKind::Timer)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionServiceError::ActiveSessionExists));

    let status = app
        .activities()
        .timer_status(activity.id())
        .await
        .unwrap()
        .expect("running timer");
    assert_eq!(status.elapsed.milliseconds, 0);
}

#[tokio::test]
async fn activity_dashboard_counts_running_sessions() {
    let (app, _storage) = app_at(midday());
    let a = app
        .activities()
        .create(ActivityDraft {
            name: "Reading".to_owned(),
            ..ActivityDraft::default()
        })
        .await
        .unwrap();
    let b = app
        .activities()
        .create(ActivityDraft {
            name: "Writing".to_owned(),
            ..ActivityDraft::default()
        })
        .await
        .unwrap();

    app.sessions().start(a.id(), SessionKind::Manual).await.unwrap();
    app.sessions().start(b.id(), SessionKind::Timer).await.unwrap();

    let view = app.dashboard().activity_dashboard().await.unwrap();
    assert_eq!(view.active_sessions, 2);
}

#[tokio::test]
async fn countdown_sync_and_quote_share_todays_row() {
    let (app, _storage) = app_at(midday());
    app.challenges().create(64.0).await.unwrap();

    let quote = app.challenges().daily_quote().await.unwrap();
    let synced = app.challenges().sync_countdown().await.unwrap();

    // The sync preserved the cached quote on today's row.
    assert_eq!(synced.quote(), Some(quote.quote.as_str()));
    let again = app.challenges().daily_quote().await.unwrap();
    assert_eq!(again.quote, quote.quote);
}
