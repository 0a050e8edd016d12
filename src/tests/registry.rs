use crate::errors::RegistryError;
use crate::registry::{
    find_model, google_flores_comet_score, group_by_langpair, load_training_runs, ModelName, TrainingRun,
    LISTING_FILE,
};
use crate::storage::BackendLocal;

use super::{make_full_run, make_model, make_run};

const RUN_JSON: &str = r#"{
  "name": "spring-2024",
  "langpair": "en-fr",
  "source_lang": "en",
  "target_lang": "fr",
  "task_group_ids": ["abc"],
  "date_started": "2024-05-01T08:00:00",
  "comet_flores_comparison": { "google": 0.8708, "nllb": 0.8566 },
  "bleu_flores_comparison": {},
  "parallel_corpus_aligned": null,
  "teacher_ensemble_flores": null,
  "student": {
    "date": "2024-06-01T00:00:00",
    "config": { "experiment": { "name": "spring-2024" } },
    "task_group_id": "abc",
    "flores": { "chrf": 61.2, "bleu": 41.0, "comet": 87.5 },
    "artifact_folder": "gs://bucket/models/en-fr/student",
    "artifact_urls": ["gs://bucket/models/en-fr/student/model.npz"]
  },
  "teacher_1": null
}"#;

#[test]
fn test_deserialize_training_run() {
    let run: TrainingRun = serde_json::from_str(RUN_JSON).unwrap();
    assert_eq!(run.name, "spring-2024");
    assert_eq!(run.comet_flores_comparison.get("google"), Some(&0.8708));
    assert!(run.teacher_1.is_none());
    assert!(run.backwards.is_none());

    let student = run.model(ModelName::Student).unwrap();
    assert_eq!(student.flores.as_ref().unwrap().comet, Some(87.5));
    assert_eq!(student.artifact_urls.len(), 1);
}

#[test]
fn test_model_name_roundtrip() {
    for model in ModelName::ALL {
        assert_eq!(model.as_str().parse::<ModelName>().unwrap(), model);
    }
    assert!("teacher".parse::<ModelName>().is_err());
    assert_eq!(ModelName::Teacher2.label(), "Teacher 2");
    assert_eq!(ModelName::StudentFinetuned.label(), "Student Finetuned");
}

#[test]
fn test_language_tag_is_non_english_side() {
    assert_eq!(make_run("a", "en-fr").language_tag(), "fr");
    assert_eq!(make_run("a", "de-en").language_tag(), "de");
}

#[test]
fn test_google_comparison() {
    let run = make_full_run("spring-2024", "en-fr");

    // 100 * (1 - 0.85 / 0.86)
    let comparison = google_flores_comet_score(&run, run.student.as_ref()).unwrap();
    assert!((comparison.percentage - 1.1627906).abs() < 1e-6);
    assert_eq!(comparison.difference, "+1.16");
    assert_eq!(comparison.score, "85.00");
    assert!(comparison.meets_release_criteria());

    // 100 * (1 - 0.85 / 0.80)
    let comparison = google_flores_comet_score(&run, run.teacher_1.as_ref()).unwrap();
    assert_eq!(comparison.difference, "-6.25");
    assert!(!comparison.meets_release_criteria());
}

#[test]
fn test_google_comparison_needs_both_scores() {
    let mut run = make_full_run("spring-2024", "en-fr");
    assert!(google_flores_comet_score(&run, run.backwards.as_ref()).is_none());
    assert!(google_flores_comet_score(&run, None).is_none());

    run.comet_flores_comparison.clear();
    assert!(google_flores_comet_score(&run, run.student.as_ref()).is_none());

    let mut model = make_model(Some(0.0));
    model.flores = None;
    assert!(google_flores_comet_score(&make_full_run("a", "en-fr"), Some(&model)).is_none());
}

#[test]
fn test_find_model() {
    let runs = vec![make_full_run("spring-2024", "en-fr"), make_run("spring-2024", "en-de")];

    let (run, _) = find_model(&runs, "spring-2024", "en-fr", ModelName::Student).unwrap();
    assert_eq!(run.langpair, "en-fr");

    let err = find_model(&runs, "autumn", "en-fr", ModelName::Student).unwrap_err();
    assert!(matches!(err, RegistryError::RunNotFound { .. }));
    assert_eq!(err.to_string(), r#"Could not find the model "autumn" (en-fr)"#);

    let err = find_model(&runs, "spring-2024", "en-de", ModelName::Student).unwrap_err();
    assert!(matches!(err, RegistryError::ModelNotFound { .. }));
}

fn write_registry(dir: &std::path::Path, runs: &[(&str, &str)], listing: &[&str]) {
    let store = BackendLocal::new(dir);
    for (file, content) in runs {
        store.write(&format!("training-runs/{file}"), content.as_bytes()).unwrap();
    }
    store
        .write(LISTING_FILE, serde_json::to_string(listing).unwrap().as_bytes())
        .unwrap();
}

#[test]
fn test_load_training_runs_skips_broken_files() {
    let dir = tempfile::tempdir().unwrap();
    let good = serde_json::to_string(&make_run("spring-2024", "en-de")).unwrap();
    write_registry(
        dir.path(),
        &[("a.json", RUN_JSON), ("b.json", "{ not json"), ("c.json", &good)],
        &["a.json", "b.json", "missing.json", "c.json"],
    );

    let store = BackendLocal::new(dir.path());
    let runs = load_training_runs(&store, 2).unwrap();

    // Listing order is kept, failures dropped.
    let pairs: Vec<&str> = runs.iter().map(|r| r.langpair.as_str()).collect();
    assert_eq!(pairs, vec!["en-fr", "en-de"]);
}

#[test]
fn test_load_training_runs_needs_listing() {
    let dir = tempfile::tempdir().unwrap();
    let store = BackendLocal::new(dir.path());
    assert!(load_training_runs(&store, 1).is_err());
}

#[test]
fn test_local_backend_refuses_parent_paths() {
    use crate::storage::DataSource;

    let dir = tempfile::tempdir().unwrap();
    let store = BackendLocal::new(dir.path().join("registry"));
    assert!(store.read("../secret.json").is_err());
    assert!(store.write("../secret.json", b"{}").is_err());
}

#[test]
fn test_group_by_langpair() {
    let runs = vec![
        make_run("spring-2024", "en-fr"),
        make_run("spring-2024", "en-de"),
        make_run("autumn-2024", "en-fr"),
    ];
    let groups = group_by_langpair(&runs);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0, "en-fr");
    let names: Vec<&str> = groups[0].1.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["spring-2024", "autumn-2024"]);
}
