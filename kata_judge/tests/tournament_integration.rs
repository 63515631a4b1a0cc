//! Integration tests for tournament functionality
//!
//! These tests drive the aggregate through the manager the way the HTTP
//! layer does: load, change, save, reload.

use kata_judge::kata;
use kata_judge::storage::{FsStorage, MemoryStorage, Storage};
use kata_judge::tournament::{
    GroupFields, MatchFields, MatchUpdate, NewTournament, TournamentError, TournamentFields,
    TournamentManager,
};
use std::sync::Arc;

fn memory_manager() -> TournamentManager {
    TournamentManager::new(Arc::new(MemoryStorage::new()))
}

fn nage_group(name: &str) -> GroupFields {
    GroupFields {
        name: name.to_string(),
        kata: "Nage-no-kata".to_string(),
        number_of_judges: 5,
        start_time: Some("10:00".to_string()),
        ..GroupFields::default()
    }
}

#[tokio::test]
async fn test_spring_open_scenario() {
    let manager = memory_manager();
    let created = manager
        .create_tournament(NewTournament {
            name: "Spring Open".to_string(),
            org: None,
            show_judge_totals: true,
        })
        .await
        .unwrap();
    let id = created.id().to_string();

    let mut t = manager.load(&id).await.unwrap();
    let mat = t.create_mat(manager.id_generator());
    assert_eq!(mat, 0);
    assert!(t.mat(0).unwrap().groups.is_empty());
    manager.save(&mut t).await.unwrap();

    let mut t = manager.load(&id).await.unwrap();
    let group = t.create_group(0, nage_group("G1")).unwrap();
    assert_eq!(group, 0);
    let index = t
        .create_match(
            0,
            0,
            MatchFields {
                kata: Some("Nage-no-kata".to_string()),
                tori: "A".to_string(),
                uke: "B".to_string(),
                number_of_judges: Some(5),
                scores: Vec::new(),
            },
        )
        .unwrap();
    assert_eq!(index, 0);
    manager.save(&mut t).await.unwrap();

    let t = manager.load(&id).await.unwrap();
    let m = &t.mat(0).unwrap().groups[0].matches[0];
    assert!(!m.completed);
    let pending = t.next_match(0).unwrap().unwrap();
    assert_eq!((pending.index, pending.group_index), (0, 0));
    assert_eq!(pending.match_view.tori, "A");
    assert_eq!(pending.match_view.uke, "B");

    let (t, _) = manager
        .update_tournament(&id, |t| {
            t.update_match(
                0,
                0,
                0,
                MatchUpdate {
                    completed: Some(true),
                    ..MatchUpdate::default()
                },
            )
            .cloned()
        })
        .await
        .unwrap();
    assert!(t.mat(0).unwrap().groups[0].matches[0].completed);
    assert_eq!(t.next_match(0).unwrap(), None);

    let err = manager
        .update_tournament(&id, |t| {
            t.update_match(
                0,
                0,
                0,
                MatchUpdate {
                    tori: Some("Z".to_string()),
                    ..MatchUpdate::default()
                },
            )
            .cloned()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::AlreadyCompleted { .. }));

    let t = manager.load(&id).await.unwrap();
    assert_eq!(t.mat(0).unwrap().groups[0].matches[0].tori, "A");
    assert_eq!(t.next_match(0).unwrap(), None);
}

#[tokio::test]
async fn test_reloaded_data_matches_saved_data() {
    let manager = memory_manager();
    let mut t = manager
        .create_tournament(NewTournament::default())
        .await
        .unwrap();

    for _ in 0..2 {
        let mat = t.create_mat(manager.id_generator());
        let group = t.create_group(mat, nage_group("Seniors")).unwrap();
        for pair in ["A/B", "C/D", "E/F"] {
            let (tori, uke) = pair.split_once('/').unwrap();
            t.create_match(
                mat,
                group,
                MatchFields {
                    tori: tori.to_string(),
                    uke: uke.to_string(),
                    ..MatchFields::default()
                },
            )
            .unwrap();
        }
    }
    t.assign_judge(1, 0, "Sato".to_string()).unwrap();
    manager.save(&mut t).await.unwrap();

    let loaded = manager.load(t.id()).await.unwrap();
    assert_eq!(loaded.data(), t.data());
}

#[tokio::test]
async fn test_concurrent_judges_reload_and_retry() {
    let manager = memory_manager();
    let mut t = manager
        .create_tournament(NewTournament::default())
        .await
        .unwrap();
    let mat = t.create_mat(manager.id_generator());
    t.create_group(mat, nage_group("G1")).unwrap();
    t.create_match(
        mat,
        0,
        MatchFields {
            tori: "A".to_string(),
            uke: "B".to_string(),
            ..MatchFields::default()
        },
    )
    .unwrap();
    manager.save(&mut t).await.unwrap();
    let codes = t.mat(mat).unwrap().judge_codes.clone();

    let mut first_sheet = kata::score_sheet("Nage-no-kata");
    first_sheet[0].value = 9.5;
    let mut second_sheet = kata::score_sheet("Nage-no-kata");
    second_sheet[14].value = 8.0;

    // Both judges load the same snapshot
    let mut first = manager.load(t.id()).await.unwrap();
    let mut second = manager.load(t.id()).await.unwrap();

    first
        .submit_judge_scores(mat, &codes[0], first_sheet.clone())
        .unwrap();
    manager.save(&mut first).await.unwrap();

    second
        .submit_judge_scores(mat, &codes[1], second_sheet.clone())
        .unwrap();
    let err = manager.save(&mut second).await.unwrap_err();
    assert!(matches!(err, TournamentError::Conflict { .. }));
    assert!(!err.is_final());

    let (reloaded, _) = manager
        .update_tournament(t.id(), |t| {
            t.submit_judge_scores(mat, &codes[1], second_sheet.clone())
                .map(|_| ())
        })
        .await
        .unwrap();

    let scores = &reloaded.mat(mat).unwrap().groups[0].matches[0].scores;
    assert_eq!(scores[0], first_sheet);
    assert_eq!(scores[1], second_sheet);
    assert_eq!(scores[2], kata::score_sheet("Nage-no-kata"));
}

#[tokio::test]
async fn test_filesystem_storage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(dir.path().join("tournament")));
    let manager = TournamentManager::new(storage.clone());

    let mut t = manager
        .create_tournament(NewTournament::default())
        .await
        .unwrap();
    t.create_mat(manager.id_generator());
    t.replace(TournamentFields {
        name: "Regional Kata Cup".to_string(),
        show_judge_totals: false,
    });
    manager.save(&mut t).await.unwrap();

    // A second manager over the same directory sees the document
    let other = TournamentManager::new(Arc::new(FsStorage::new(dir.path().join("tournament"))));
    let loaded = other.load(t.id()).await.unwrap();
    assert_eq!(loaded.name(), "Regional Kata Cup");
    assert_eq!(loaded.mats().len(), 1);
    assert_eq!(loaded.version(), 2);

    let list = other.list_tournaments().await.unwrap();
    assert_eq!(list.len(), 1);
    assert!(!list[0].show_judge_totals);
}

#[tokio::test]
async fn test_mat_view_after_reload() {
    let manager = memory_manager();
    let mut t = manager
        .create_tournament(NewTournament::default())
        .await
        .unwrap();
    let mat = t.create_mat(manager.id_generator());
    t.create_group(mat, nage_group("G1")).unwrap();
    t.create_group(
        mat,
        GroupFields {
            kata: "Ju-no-kata".to_string(),
            ..nage_group("G2")
        },
    )
    .unwrap();
    for group in 0..2 {
        t.create_match(
            mat,
            group,
            MatchFields {
                tori: format!("T{group}"),
                uke: format!("U{group}"),
                ..MatchFields::default()
            },
        )
        .unwrap();
    }
    t.update_match(
        mat,
        0,
        0,
        MatchUpdate {
            completed: Some(true),
            ..MatchUpdate::default()
        },
    )
    .unwrap();
    manager.save(&mut t).await.unwrap();

    let view = manager.load(t.id()).await.unwrap().mat_view(mat).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].number, 2);
    assert_eq!(view[0].kata, "Ju-no-kata");
    assert_eq!(view[0].judge_totals.as_deref(), Some(&[150.0; 5][..]));
}
