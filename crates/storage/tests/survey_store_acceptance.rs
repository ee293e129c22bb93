use shared::{domain::QuestionNumber, protocol::AnswerSet};
use storage::Storage;

#[tokio::test]
async fn persisted_responses_survive_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("survey.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let submitted = AnswerSet {
        answers: [
            (QuestionNumber(1), "satisfied".to_string()),
            (QuestionNumber(2), "7".to_string()),
        ]
        .into_iter()
        .collect(),
        score: 18,
    };

    {
        let storage = Storage::new(&database_url).await.expect("open");
        storage.insert_response(&submitted).await.expect("insert");
        storage.pool().close().await;
    }

    let reopened = Storage::new(&database_url).await.expect("reopen");
    let listed = reopened.list_responses().await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].answer_set(), submitted);
}
