//! Integration tests for the judge and athlete registries over the storage
//! engines returned by `storage::open`.

use kata_judge::registry::{AthleteData, JudgeData, RegistryError};
use kata_judge::storage::{self, StorageBackend, StorageConfig};
use kata_judge::{AthleteRegistry, JudgeRegistry};

fn fs_config(dir: &std::path::Path) -> StorageConfig {
    StorageConfig {
        backend: StorageBackend::Filesystem {
            base_dir: dir.to_path_buf(),
        },
        namespace_suffix: Some("dev".to_string()),
    }
}

#[tokio::test]
async fn test_judges_persist_in_suffixed_namespace() {
    let dir = tempfile::tempdir().unwrap();
    let stores = storage::open(&fs_config(dir.path())).await.unwrap();
    let registry = JudgeRegistry::new(stores.judges.clone());

    let judge = registry
        .create(JudgeData {
            name: "Kobayashi".to_string(),
            region: "Kyushu".to_string(),
            rank: "International".to_string(),
            notes: Some("prefers mat 2".to_string()),
            ..JudgeData::default()
        })
        .await
        .unwrap();

    let file = dir.path().join("judge-dev").join(format!("{}.json", judge.id));
    assert!(file.exists());

    // Reopening the same directory sees the record
    let reopened = storage::open(&fs_config(dir.path())).await.unwrap();
    let loaded = JudgeRegistry::new(reopened.judges)
        .get(&judge.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.data.notes.as_deref(), Some("prefers mat 2"));
}

#[tokio::test]
async fn test_registries_are_isolated() {
    let stores = storage::open(&StorageConfig::memory()).await.unwrap();
    let judges = JudgeRegistry::new(stores.judges.clone());
    let athletes = AthleteRegistry::new(stores.athletes.clone());

    judges
        .create(JudgeData {
            name: "Ito".to_string(),
            ..JudgeData::default()
        })
        .await
        .unwrap();
    athletes
        .create(AthleteData {
            name: "Mori".to_string(),
            rank: "1 dan".to_string(),
            region: "Tohoku".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(judges.list().await.unwrap().len(), 1);
    assert_eq!(athletes.list().await.unwrap().len(), 1);
    assert!(stores.tournaments.get_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_unknown_judge_creates_it() {
    let stores = storage::open(&StorageConfig::memory()).await.unwrap();
    let judges = JudgeRegistry::new(stores.judges);

    let judge = judges
        .update(
            "ab12",
            JudgeData {
                name: "Hayashi".to_string(),
                ..JudgeData::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(judge.id, "ab12");
    assert_eq!(judges.list().await.unwrap()[0].name, "Hayashi");
}

#[tokio::test]
async fn test_invalid_key_surfaces_as_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let stores = storage::open(&fs_config(dir.path())).await.unwrap();
    let judges = JudgeRegistry::new(stores.judges);

    let err = judges
        .update("../escape", JudgeData::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Storage(_)));
}
