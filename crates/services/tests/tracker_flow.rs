use momentum_core::Clock;
use momentum_core::model::{
    GlobalGoalDraft, SubtopicDraft, SubtopicPatch, TopicDraft, TopicPatch,
};
use momentum_core::time::fixed_now;
use services::AppServices;

fn app() -> AppServices {
    AppServices::in_memory(Clock::Fixed(fixed_now()))
}

#[tokio::test]
async fn full_topic_flow_keeps_derived_values_fresh() {
    let app = app();

    let topic = app
        .topics()
        .create_topic(TopicDraft {
            title: "Pushups".to_owned(),
            category: "Fitness".to_owned(),
            money_per_5_reps: 10.0,
            urls: vec!["https://example.com/pushup-form".to_owned()],
            ..TopicDraft::default()
        })
        .await
        .unwrap()
        .topic;

    let first = app
        .topics()
        .create_subtopic(
            topic.id(),
            SubtopicDraft {
                title: "Morning set".to_owned(),
                goal_amount: 2000.0,
                ..SubtopicDraft::default()
            },
        )
        .await
        .unwrap();
    let second = app
        .topics()
        .create_subtopic(
            topic.id(),
            SubtopicDraft {
                title: "Evening set".to_owned(),
                goal_amount: 1000.0,
                ..SubtopicDraft::default()
            },
        )
        .await
        .unwrap();

    // 7 + 6 reps: 13 total, 2 payout groups, 13/36 of the goal.
    app.topics()
        .adjust_reps(first.subtopic.id(), 7)
        .await
        .unwrap();
    let adjusted = app
        .topics()
        .adjust_reps(second.subtopic.id(), 6)
        .await
        .unwrap();

    assert!((adjusted.topic.earnings() - 20.0).abs() < f64::EPSILON);
    assert!((adjusted.topic.completion_percentage() - (13.0 / 36.0) * 100.0).abs() < 1e-9);

    // Renaming leaves counters alone but refreshes the derived fields.
    let renamed = app
        .topics()
        .update_topic(
            topic.id(),
            TopicPatch {
                title: Some("Pushups v2".to_owned()),
                ..TopicPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.topic.title(), "Pushups v2");
    assert!((renamed.topic.earnings() - 20.0).abs() < f64::EPSILON);

    // Subtopic metadata updates do not recalculate the parent.
    app.topics()
        .update_subtopic(
            first.subtopic.id(),
            SubtopicPatch {
                notes: Some("slow tempo".to_owned()),
                ..SubtopicPatch::default()
            },
        )
        .await
        .unwrap();

    // The next read recomputes from scratch.
    let read = app.topics().get_topic(topic.id()).await.unwrap();
    assert_eq!(read.subtopics.len(), 2);
    assert!((read.topic.earnings() - 20.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn subtopic_validation_blocks_bad_goal_amounts() {
    let app = app();
    let topic = app
        .topics()
        .create_topic(TopicDraft {
            title: "Squats".to_owned(),
            category: "Fitness".to_owned(),
            ..TopicDraft::default()
        })
        .await
        .unwrap()
        .topic;

    let err = app
        .topics()
        .create_subtopic(
            topic.id(),
            SubtopicDraft {
                title: "Sets".to_owned(),
                goal_amount: 1500.0,
                ..SubtopicDraft::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, services::TopicServiceError::Subtopic(_)));

    app.topics()
        .create_subtopic(
            topic.id(),
            SubtopicDraft {
                title: "Sets".to_owned(),
                goal_amount: 2000.0,
                ..SubtopicDraft::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn dashboard_tracks_goal_and_earnings() {
    let app = app();

    let topic = app
        .topics()
        .create_topic(TopicDraft {
            title: "Pushups".to_owned(),
            category: "Fitness".to_owned(),
            money_per_5_reps: 100.0,
            ..TopicDraft::default()
        })
        .await
        .unwrap()
        .topic;
    let sub = app
        .topics()
        .create_subtopic(
            topic.id(),
            SubtopicDraft {
                title: "Sets".to_owned(),
                goal_amount: 1000.0,
                ..SubtopicDraft::default()
            },
        )
        .await
        .unwrap();
    app.topics().adjust_reps(sub.subtopic.id(), 25).await.unwrap();

    let before = app.dashboard().topic_dashboard().await.unwrap();
    // 25 reps -> 5 groups at 100 against the default 5000 goal.
    assert!((before.total_earnings - 500.0).abs() < f64::EPSILON);
    assert!((before.progress_percentage - 10.0).abs() < 1e-9);

    app.dashboard()
        .update_global_goal(GlobalGoalDraft {
            global_goal: 1000.0,
        })
        .await
        .unwrap();

    let after = app.dashboard().topic_dashboard().await.unwrap();
    assert!((after.progress_percentage - 50.0).abs() < 1e-9);
}
