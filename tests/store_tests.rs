// tests/store_tests.rs

use quiz_backend::{
    models::{
        result::{NewTestResult, SubmitTestRequest, SubmittedAnswer},
        test::{NewOption, NewQuestion, NewTest, TestUpdate},
    },
    services::submission::{SubmissionError, submit_answers},
    store::{
        DeleteOutcome, ResultStore, SqliteStore, StoreError, TestCatalog, TestStructureProvider,
        UpdateOutcome,
    },
};
use rust_decimal::Decimal;

async fn store(name: &str) -> SqliteStore {
    let url = format!(
        "sqlite:file:{}_{}?mode=memory&cache=shared",
        name,
        uuid::Uuid::new_v4().simple()
    );
    let store = SqliteStore::connect(&url, 1).await.expect("connect");
    store.migrate().await.expect("migrate");

    sqlx::query("INSERT INTO users (id, login, role) VALUES (1, 'amy', 'student')")
        .execute(store.pool())
        .await
        .unwrap();
    sqlx::query("INSERT INTO topics (id, name) VALUES (1, 'Chemistry')")
        .execute(store.pool())
        .await
        .unwrap();
    store
}

fn new_test(questions: &[&[(&str, bool)]]) -> NewTest {
    NewTest {
        topic_id: 1,
        title: "Elements".to_string(),
        description: Some("Periodic table basics".to_string()),
        questions: questions
            .iter()
            .enumerate()
            .map(|(i, options)| NewQuestion {
                text: format!("Question {}", i + 1),
                options: options
                    .iter()
                    .map(|&(text, is_correct)| NewOption {
                        text: text.to_string(),
                        is_correct,
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[tokio::test]
async fn sqlite_roundtrips_test_structure() {
    let store = store("roundtrip").await;

    let created = store
        .create_test(new_test(&[
            &[("H", true), ("He", false)],
            &[("Na", false), ("K", false), ("Li", true)],
        ]))
        .await
        .unwrap();

    let loaded = store
        .get_test_structure(created.id)
        .await
        .unwrap()
        .expect("test exists");

    assert_eq!(loaded, created);
    assert_eq!(loaded.questions.len(), 2);
    assert_eq!(loaded.questions[1].options.len(), 3);
    assert_eq!(
        loaded.questions[1].correct_option().map(|o| o.text.as_str()),
        Some("Li")
    );

    assert!(store.get_test_structure(created.id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_appends_results_without_overwriting() {
    let store = store("append").await;
    let test = store
        .create_test(new_test(&[&[("H", true)]]))
        .await
        .unwrap();

    let first = store
        .append_result(NewTestResult {
            user_id: 1,
            test_id: test.id,
            score: Decimal::new(3333, 2),
        })
        .await
        .unwrap();
    let second = store
        .append_result(NewTestResult {
            user_id: 1,
            test_id: test.id,
            score: Decimal::new(10000, 2),
        })
        .await
        .unwrap();

    let history = store.list_results(1, test.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, first.id);
    assert_eq!(history[0].score.to_string(), "33.33");
    assert_eq!(history[1].id, second.id);
    assert_eq!(history[1].score.to_string(), "100.00");
}

#[tokio::test]
async fn sqlite_rejects_dangling_result() {
    let store = store("dangling").await;
    let test = store
        .create_test(new_test(&[&[("H", true)]]))
        .await
        .unwrap();

    let err = store
        .append_result(NewTestResult {
            user_id: 404,
            test_id: test.id,
            score: Decimal::ZERO,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::ForeignKey(_)), "got {err:?}");
    assert!(store.list_results(404, test.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_update_outcomes() {
    let store = store("update").await;
    let test = store
        .create_test(new_test(&[&[("H", true)]]))
        .await
        .unwrap();

    let update = |expected_version: i64, title: &str| TestUpdate {
        expected_version,
        title: Some(title.to_string()),
        description: None,
        topic_id: None,
    };

    match store.update_test(test.id, update(1, "Renamed")).await.unwrap() {
        UpdateOutcome::Updated(t) => {
            assert_eq!(t.title, "Renamed");
            assert_eq!(t.version, 2);
            assert_eq!(t.description.as_deref(), Some("Periodic table basics"));
        }
        other => panic!("expected update, got {other:?}"),
    }

    assert_eq!(
        store.update_test(test.id, update(1, "Lost")).await.unwrap(),
        UpdateOutcome::Conflict { current_version: 2 }
    );
    assert_eq!(
        store.update_test(test.id + 1, update(1, "Ghost")).await.unwrap(),
        UpdateOutcome::NotFound
    );
}

#[tokio::test]
async fn sqlite_update_can_clear_description() {
    let store = store("clear").await;
    let test = store
        .create_test(new_test(&[&[("H", true)]]))
        .await
        .unwrap();

    let outcome = store
        .update_test(
            test.id,
            TestUpdate {
                expected_version: 1,
                title: None,
                description: Some(None),
                topic_id: None,
            },
        )
        .await
        .unwrap();

    match outcome {
        UpdateOutcome::Updated(t) => {
            assert_eq!(t.description, None);
            assert_eq!(t.title, "Elements");
            assert_eq!(t.version, 2);
        }
        other => panic!("expected update, got {other:?}"),
    }
}

#[tokio::test]
async fn sqlite_concurrent_updates_resolve_to_outcomes() {
    const WRITERS: usize = 4;
    const ROUNDS: i64 = 20;

    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("race.db").display());
    let store = SqliteStore::connect(&url, 5).await.expect("connect");
    store.migrate().await.expect("migrate");
    sqlx::query("INSERT INTO topics (id, name) VALUES (1, 'Chemistry')")
        .execute(store.pool())
        .await
        .unwrap();

    let test_id = store
        .create_test(new_test(&[&[("H", true)]]))
        .await
        .unwrap()
        .id;

    for version in 1..=ROUNDS {
        let mut writers = tokio::task::JoinSet::new();
        for writer in 0..WRITERS {
            let store = store.clone();
            writers.spawn(async move {
                store
                    .update_test(
                        test_id,
                        TestUpdate {
                            expected_version: version,
                            title: Some(format!("Round {version} writer {writer}")),
                            description: None,
                            topic_id: None,
                        },
                    )
                    .await
            });
        }

        let mut updated = 0;
        while let Some(joined) = writers.join_next().await {
            match joined.unwrap() {
                Ok(UpdateOutcome::Updated(t)) => {
                    assert!(t.version > version);
                    updated += 1;
                }
                Ok(UpdateOutcome::Conflict { current_version }) => {
                    assert!(current_version > version);
                }
                other => panic!("round {version}: unexpected {other:?}"),
            }
        }
        assert_eq!(updated, 1, "round {version}");
    }

    let current = store.get_test_structure(test_id).await.unwrap().unwrap();
    assert_eq!(current.version, ROUNDS + 1);
}

#[tokio::test]
async fn sqlite_delete_and_listing() {
    let store = store("delete").await;
    let kept = store
        .create_test(new_test(&[&[("H", true)], &[("O", true)]]))
        .await
        .unwrap();
    let dropped = store.create_test(new_test(&[])).await.unwrap();

    let listing = store.list_tests().await.unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].id, kept.id);
    assert_eq!(listing[0].question_count, 2);
    assert_eq!(listing[1].question_count, 0);

    assert_eq!(store.delete_test(dropped.id).await.unwrap(), DeleteOutcome::Deleted);
    assert_eq!(store.delete_test(dropped.id).await.unwrap(), DeleteOutcome::NotFound);
    assert_eq!(store.list_tests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_submission_end_to_end() {
    let store = store("submit").await;
    let test = store
        .create_test(new_test(&[
            &[("A", true), ("C", false)],
            &[("B", true), ("C", false)],
        ]))
        .await
        .unwrap();
    let pick = |q: usize, text: &str| SubmittedAnswer {
        question_id: test.questions[q].id,
        selected_option_id: test.questions[q]
            .options
            .iter()
            .find(|o| o.text == text)
            .unwrap()
            .id,
    };

    let outcome = submit_answers(
        &store,
        1,
        &SubmitTestRequest {
            test_id: test.id,
            answers: vec![pick(0, "A"), pick(1, "C")],
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome.correct_count, 1);
    assert_eq!(outcome.total_questions, 2);
    assert_eq!(outcome.score.to_string(), "50.00");

    let empty = store.create_test(new_test(&[])).await.unwrap();
    let err = submit_answers(
        &store,
        1,
        &SubmitTestRequest {
            test_id: empty.id,
            answers: Vec::new(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SubmissionError::Domain(_)));

    assert_eq!(store.list_results(1, test.id).await.unwrap().len(), 1);
    assert!(store.list_results(1, empty.id).await.unwrap().is_empty());
}
