mod config;
mod registry;

use crate::registry::{Corpus, Evaluation, ModelRun, TrainingRun};

pub fn make_model(comet: Option<f64>) -> ModelRun {
    ModelRun {
        date: Some("2024-05-02T10:11:12.000Z".to_string()),
        config: Some(serde_json::json!({ "experiment": { "src": "en", "trg": "fr" } })),
        task_group_id: Some("Fxw0rWzpQ4ub9FGmyrNfhw".to_string()),
        task_id: None,
        flores: Some(Evaluation {
            chrf: Some(60.1),
            bleu: Some(40.2),
            comet,
        }),
        artifact_folder: Some("https://storage.example/models/en-fr/spring-2024/student".to_string()),
        artifact_urls: vec![
            "https://storage.example/models/en-fr/spring-2024/student/model.npz".to_string(),
            "https://storage.example/models/en-fr/spring-2024/student/vocab.spm".to_string(),
        ],
    }
}

pub fn make_run(name: &str, langpair: &str) -> TrainingRun {
    let (source_lang, target_lang) = langpair.split_once('-').unwrap();
    TrainingRun {
        name: name.to_string(),
        langpair: langpair.to_string(),
        source_lang: source_lang.to_string(),
        target_lang: target_lang.to_string(),
        task_group_ids: vec!["Fxw0rWzpQ4ub9FGmyrNfhw".to_string()],
        date_started: Some("2024-05-01T08:00:00+00:00".to_string()),
        ..Default::default()
    }
}

/// en-fr run with a student at 86.0 comet against Google's 0.85.
pub fn make_full_run(name: &str, langpair: &str) -> TrainingRun {
    let mut run = make_run(name, langpair);
    run.comet_flores_comparison.insert("google".to_string(), 0.85);
    run.student = Some(make_model(Some(86.0)));
    run.teacher_1 = Some(make_model(Some(80.0)));
    run.backwards = Some(make_model(None));
    run.parallel_corpus = Some(Corpus {
        source_url: "https://storage.example/corpus.en.zst".to_string(),
        source_bytes: 1536,
        target_url: "https://storage.example/corpus.fr.zst".to_string(),
        target_bytes: 3 * 1024 * 1024,
    });
    run
}
