//! The tournament aggregate.
//!
//! Mats, groups and matches are addressed by their position. Removing an
//! entry shifts every later entry down by one, so an index held by a client
//! is only valid until the next structural change.

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    Group, GroupFields, JUDGES_PER_MAT, JudgeMatchView, Mat, MatMatchView, Match, MatchFields,
    MatchUpdate, MatchView, NewTournament, PendingMatch, TournamentData, TournamentDocument,
    TournamentFields, TournamentId, TournamentSummary,
};
use crate::ids::{IdGenerator, JUDGE_CODE_LEN};
use crate::kata::{self, ScoreSheet};
use chrono::{DateTime, Utc};

/// One tournament and everything scheduled in it
///
/// All state is private; every change goes through a method so the
/// completed-match latch cannot be bypassed. Changes stay in memory until
/// [`TournamentManager::save`](super::TournamentManager::save) is called.
#[derive(Debug, Clone, PartialEq)]
pub struct Tournament {
    id: TournamentId,
    document: TournamentDocument,
}

impl Tournament {
    pub(crate) fn new(id: TournamentId, fields: NewTournament, now: DateTime<Utc>) -> Self {
        Self {
            id,
            document: TournamentDocument {
                name: fields.name,
                org: fields.org,
                show_judge_totals: fields.show_judge_totals,
                mats: Vec::new(),
                version: 0,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub(crate) fn from_document(id: TournamentId, document: TournamentDocument) -> Self {
        Self { id, document }
    }

    pub(crate) fn document(&self) -> &TournamentDocument {
        &self.document
    }

    pub(crate) fn mark_saved(&mut self, version: u64, at: DateTime<Utc>) {
        self.document.version = version;
        self.document.updated_at = at;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.document.name
    }

    pub fn show_judge_totals(&self) -> bool {
        self.document.show_judge_totals
    }

    /// Version the aggregate was loaded (or last saved) with
    pub fn version(&self) -> u64 {
        self.document.version
    }

    pub fn mats(&self) -> &[Mat] {
        &self.document.mats
    }

    /// Full projection: the document plus id
    pub fn data(&self) -> TournamentData {
        TournamentData {
            id: self.id.clone(),
            document: self.document.clone(),
        }
    }

    /// The document without judge access codes, for readers without the
    /// admin token
    pub fn public_data(&self) -> TournamentData {
        let mut data = self.data();
        for mat in &mut data.document.mats {
            mat.judge_codes.clear();
        }
        data
    }

    pub fn summary(&self) -> TournamentSummary {
        TournamentSummary {
            id: self.id.clone(),
            name: self.document.name.clone(),
            show_judge_totals: self.document.show_judge_totals,
        }
    }

    /// Overwrite name and judge-total visibility; mats are untouched
    pub fn replace(&mut self, fields: TournamentFields) {
        self.document.name = fields.name;
        self.document.show_judge_totals = fields.show_judge_totals;
    }

    // ------------------------------------------------------------------
    // Mats
    // ------------------------------------------------------------------

    pub fn mat(&self, mat: usize) -> Option<&Mat> {
        self.document.mats.get(mat)
    }

    /// Append a mat with a fresh judge roster, returning its index
    ///
    /// The access codes are generated here once and never regenerated, so
    /// the links handed to judges survive any change to the schedule.
    pub fn create_mat(&mut self, ids: &dyn IdGenerator) -> usize {
        self.document.mats.push(Mat {
            number_of_judges: JUDGES_PER_MAT,
            judges: vec![String::new(); JUDGES_PER_MAT],
            judge_codes: (0..JUDGES_PER_MAT)
                .map(|_| ids.generate(JUDGE_CODE_LEN))
                .collect(),
            groups: Vec::new(),
        });
        self.document.mats.len() - 1
    }

    /// Remove a mat; out of range is a no-op
    pub fn delete_mat(&mut self, mat: usize) -> Option<Mat> {
        if mat < self.document.mats.len() {
            Some(self.document.mats.remove(mat))
        } else {
            None
        }
    }

    /// Seat a judge (by display name) in a slot of the mat roster
    pub fn assign_judge(&mut self, mat: usize, slot: usize, name: String) -> TournamentResult<()> {
        let mat_ref = self.mat_mut(mat)?;
        if slot >= mat_ref.number_of_judges {
            return Err(TournamentError::JudgeSlotOutOfRange {
                slot,
                number_of_judges: mat_ref.number_of_judges,
            });
        }
        if mat_ref.judges.len() < mat_ref.number_of_judges {
            mat_ref.judges.resize(mat_ref.number_of_judges, String::new());
        }
        mat_ref.judges[slot] = name;
        Ok(())
    }

    /// Resolve a judge access code to its slot on the mat
    pub fn judge_slot(&self, mat: usize, code: &str) -> TournamentResult<usize> {
        self.mat_ref(mat)?
            .judge_codes
            .iter()
            .position(|c| c == code)
            .ok_or(TournamentError::UnknownJudgeCode { mat })
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    /// Append a group with no matches, returning its index
    pub fn create_group(&mut self, mat: usize, fields: GroupFields) -> TournamentResult<usize> {
        let mat_ref = self.mat_mut(mat)?;
        check_judge_count(fields.number_of_judges, mat_ref.number_of_judges)?;
        mat_ref.groups.push(Group::from_fields(fields));
        Ok(mat_ref.groups.len() - 1)
    }

    /// Replace every group field; fields left at their default are written
    /// as such
    pub fn update_group(
        &mut self,
        mat: usize,
        group: usize,
        fields: GroupFields,
    ) -> TournamentResult<&Group> {
        let roster = self.mat_ref(mat)?.number_of_judges;
        let group_ref = self.group_mut(mat, group)?;
        check_judge_count(fields.number_of_judges, roster)?;
        group_ref.apply(fields);
        Ok(group_ref)
    }

    /// Remove a group; an out-of-range group index is a no-op
    pub fn delete_group(&mut self, mat: usize, group: usize) -> TournamentResult<Option<Group>> {
        let groups = &mut self.mat_mut(mat)?.groups;
        if group < groups.len() {
            Ok(Some(groups.remove(group)))
        } else {
            Ok(None)
        }
    }

    // ------------------------------------------------------------------
    // Matches
    // ------------------------------------------------------------------

    /// First match on the mat that is not completed, by group then match
    /// order
    ///
    /// Nothing is cached: every judge client polling the same mat recomputes
    /// the same answer from the document.
    pub fn next_match(&self, mat: usize) -> TournamentResult<Option<PendingMatch>> {
        let mat_ref = self.mat_ref(mat)?;
        for (group_index, group) in mat_ref.groups.iter().enumerate() {
            for (index, m) in group.matches.iter().enumerate() {
                if !m.completed {
                    return Ok(Some(PendingMatch {
                        match_view: MatchView {
                            kata: m.effective_kata(group).to_string(),
                            number_of_judges: m.effective_judges(group),
                            tori: m.tori.clone(),
                            uke: m.uke.clone(),
                            scores: m.scores.clone(),
                        },
                        index,
                        group_index,
                    }));
                }
            }
        }
        Ok(None)
    }

    /// Append a match, returning its index
    ///
    /// Without explicit scores, every judge slot gets a default sheet for the
    /// match's kata.
    pub fn create_match(
        &mut self,
        mat: usize,
        group: usize,
        fields: MatchFields,
    ) -> TournamentResult<usize> {
        let roster = self.mat_ref(mat)?.number_of_judges;
        let group_ref = self.group_mut(mat, group)?;
        if let Some(number_of_judges) = fields.number_of_judges {
            check_judge_count(number_of_judges, roster)?;
        }

        let mut new_match = Match {
            kata: fields.kata,
            tori: fields.tori,
            uke: fields.uke,
            number_of_judges: fields.number_of_judges,
            scores: fields.scores,
            completed: false,
            results: None,
        };
        if new_match.scores.is_empty() {
            let sheet = kata::score_sheet(new_match.effective_kata(group_ref));
            new_match.scores = vec![sheet; new_match.effective_judges(group_ref)];
        }

        group_ref.matches.push(new_match);
        Ok(group_ref.matches.len() - 1)
    }

    /// Merge the provided fields into a match
    ///
    /// Completion is a one-way latch: once a match is completed every
    /// further update is rejected with [`TournamentError::AlreadyCompleted`]
    /// and nothing is written.
    pub fn update_match(
        &mut self,
        mat: usize,
        group: usize,
        index: usize,
        update: MatchUpdate,
    ) -> TournamentResult<&Match> {
        let m = self.open_match_mut(mat, group, index)?;

        if let Some(tori) = update.tori {
            m.tori = tori;
        }
        if let Some(uke) = update.uke {
            m.uke = uke;
        }
        if let Some(scores) = update.scores {
            m.scores = scores;
        }
        if let Some(results) = update.results {
            m.results = Some(results);
        }
        if let Some(completed) = update.completed {
            if completed {
                log::info!("Match {index} in group {group} on mat {mat} completed");
            }
            m.completed = completed;
        }
        Ok(m)
    }

    /// Replace one judge's sheet, keeping every other judge's sheet
    pub fn submit_scores(
        &mut self,
        mat: usize,
        group: usize,
        index: usize,
        slot: usize,
        sheet: ScoreSheet,
    ) -> TournamentResult<&Match> {
        let roster = self.mat_ref(mat)?.number_of_judges;
        let group_ref = self.group_mut(mat, group)?;
        let m = group_ref
            .matches
            .get(index)
            .ok_or(TournamentError::MatchNotFound { mat, group, index })?;
        if m.completed {
            return Err(TournamentError::AlreadyCompleted { mat, group, index });
        }

        let kata_name = m.effective_kata(group_ref).to_string();
        let number_of_judges = m.effective_judges(group_ref);
        if slot >= number_of_judges {
            return Err(TournamentError::JudgeSlotOutOfRange {
                slot,
                number_of_judges,
            });
        }
        // Documents written before counts were checked may still hold any value
        check_judge_count(number_of_judges, roster)?;
        validate_sheet(&kata_name, &sheet)?;

        let m = &mut group_ref.matches[index];
        if m.scores.len() < number_of_judges {
            m.scores
                .resize(number_of_judges, kata::score_sheet(&kata_name));
        }
        m.scores[slot] = sheet;
        log::debug!("Judge {slot} submitted scores for match {index} in group {group} on mat {mat}");
        Ok(m)
    }

    /// Submit a judge's sheet for the mat's next pending match, resolving
    /// the judge by access code
    pub fn submit_judge_scores(
        &mut self,
        mat: usize,
        code: &str,
        sheet: ScoreSheet,
    ) -> TournamentResult<&Match> {
        let slot = self.judge_slot(mat, code)?;
        let pending = self
            .next_match(mat)?
            .ok_or(TournamentError::NoPendingMatch { mat })?;
        self.submit_scores(mat, pending.group_index, pending.index, slot, sheet)
    }

    /// Remove a match; an out-of-range match index is a no-op
    pub fn delete_match(
        &mut self,
        mat: usize,
        group: usize,
        index: usize,
    ) -> TournamentResult<Option<Match>> {
        let matches = &mut self.group_mut(mat, group)?.matches;
        if index < matches.len() {
            Ok(Some(matches.remove(index)))
        } else {
            Ok(None)
        }
    }

    // ------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------

    /// Pending matches of a mat for the public display
    pub fn mat_view(&self, mat: usize) -> TournamentResult<Vec<MatMatchView>> {
        let mat_ref = self.mat_ref(mat)?;
        let show_totals = self.document.show_judge_totals;

        let view = mat_ref
            .groups
            .iter()
            .flat_map(|group| group.matches.iter().map(move |m| (group, m)))
            .enumerate()
            .filter(|(_, (_, m))| !m.completed)
            .map(|(position, (group, m))| MatMatchView {
                number: position + 1,
                kata: m.effective_kata(group).to_string(),
                tori: m.tori.clone(),
                uke: m.uke.clone(),
                judge_totals: show_totals.then(|| m.judge_totals()),
            })
            .collect();
        Ok(view)
    }

    /// The next pending match as seen by the judge holding `code`
    pub fn judge_view(&self, mat: usize, code: &str) -> TournamentResult<Option<JudgeMatchView>> {
        let slot = self.judge_slot(mat, code)?;
        let Some(pending) = self.next_match(mat)? else {
            return Ok(None);
        };

        let view = pending.match_view;
        if slot >= view.number_of_judges {
            return Err(TournamentError::JudgeSlotOutOfRange {
                slot,
                number_of_judges: view.number_of_judges,
            });
        }
        let scores = view
            .scores
            .get(slot)
            .cloned()
            .unwrap_or_else(|| kata::score_sheet(&view.kata));
        Ok(Some(JudgeMatchView {
            kata: view.kata,
            number_of_judges: view.number_of_judges,
            tori: view.tori,
            uke: view.uke,
            scores,
        }))
    }

    // ------------------------------------------------------------------
    // Path resolution
    // ------------------------------------------------------------------

    fn mat_ref(&self, mat: usize) -> TournamentResult<&Mat> {
        self.document
            .mats
            .get(mat)
            .ok_or(TournamentError::MatNotFound { mat })
    }

    fn mat_mut(&mut self, mat: usize) -> TournamentResult<&mut Mat> {
        self.document
            .mats
            .get_mut(mat)
            .ok_or(TournamentError::MatNotFound { mat })
    }

    fn group_mut(&mut self, mat: usize, group: usize) -> TournamentResult<&mut Group> {
        self.mat_mut(mat)?
            .groups
            .get_mut(group)
            .ok_or(TournamentError::GroupNotFound { mat, group })
    }

    fn open_match_mut(
        &mut self,
        mat: usize,
        group: usize,
        index: usize,
    ) -> TournamentResult<&mut Match> {
        let m = self
            .group_mut(mat, group)?
            .matches
            .get_mut(index)
            .ok_or(TournamentError::MatchNotFound { mat, group, index })?;
        if m.completed {
            return Err(TournamentError::AlreadyCompleted { mat, group, index });
        }
        Ok(m)
    }
}

/// A group or match seats between one judge and the mat's full roster
fn check_judge_count(number_of_judges: usize, roster: usize) -> TournamentResult<()> {
    if number_of_judges == 0 || number_of_judges > roster {
        return Err(TournamentError::InvalidJudgeCount {
            number_of_judges,
            max: roster,
        });
    }
    Ok(())
}

fn validate_sheet(kata_name: &str, sheet: &[kata::Score]) -> TournamentResult<()> {
    let expected = kata::number_of_techniques(kata_name);
    if sheet.len() != expected {
        return Err(TournamentError::InvalidScoreSheet(format!(
            "{kata_name} has {expected} techniques, got {} scores",
            sheet.len()
        )));
    }
    if let Some(position) = sheet.iter().position(|score| !score.has_valid_deductions()) {
        return Err(TournamentError::InvalidScoreSheet(format!(
            "technique {} has a malformed deduction record",
            position + 1
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kata::Score;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Predictable ids: "c0", "c1", ...
    struct SequenceIds(AtomicUsize);

    impl IdGenerator for SequenceIds {
        fn generate(&self, _len: usize) -> String {
            format!("c{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn tournament() -> Tournament {
        Tournament::new("abc123".to_string(), NewTournament::default(), Utc::now())
    }

    fn group_fields(name: &str) -> GroupFields {
        GroupFields {
            name: name.to_string(),
            kata: "Nage-no-kata".to_string(),
            number_of_judges: 5,
            start_time: Some("10:00".to_string()),
            ..GroupFields::default()
        }
    }

    fn match_fields(tori: &str, uke: &str) -> MatchFields {
        MatchFields {
            tori: tori.to_string(),
            uke: uke.to_string(),
            ..MatchFields::default()
        }
    }

    /// One mat, one group, `n` matches
    fn with_matches(n: usize) -> Tournament {
        let mut t = tournament();
        t.create_mat(&SequenceIds(AtomicUsize::new(0)));
        t.create_group(0, group_fields("G1")).unwrap();
        for i in 0..n {
            t.create_match(0, 0, match_fields(&format!("T{i}"), &format!("U{i}")))
                .unwrap();
        }
        t
    }

    fn complete(t: &mut Tournament, mat: usize, group: usize, index: usize) {
        t.update_match(
            mat,
            group,
            index,
            MatchUpdate {
                completed: Some(true),
                ..MatchUpdate::default()
            },
        )
        .unwrap();
    }

    #[test]
    fn test_get_mat_bounds() {
        let mut t = tournament();
        let ids = SequenceIds(AtomicUsize::new(0));
        t.create_mat(&ids);
        t.create_mat(&ids);

        assert!(t.mat(0).is_some());
        assert!(t.mat(1).is_some());
        assert!(t.mat(2).is_none());
    }

    #[test]
    fn test_create_mat_roster() {
        let mut t = tournament();
        let index = t.create_mat(&SequenceIds(AtomicUsize::new(0)));

        let mat = t.mat(index).unwrap();
        assert_eq!(index, 0);
        assert!(mat.groups.is_empty());
        assert_eq!(mat.judges, vec![""; 5]);
        assert_eq!(mat.judge_codes, vec!["c0", "c1", "c2", "c3", "c4"]);
    }

    #[test]
    fn test_delete_mat_shifts_indices() {
        let mut t = tournament();
        let ids = SequenceIds(AtomicUsize::new(0));
        for _ in 0..3 {
            t.create_mat(&ids);
        }
        let former_b = t.mat(1).unwrap().clone();

        let removed = t.delete_mat(0);
        assert!(removed.is_some());
        assert_eq!(t.mats().len(), 2);
        assert_eq!(t.mat(0), Some(&former_b));
    }

    #[test]
    fn test_delete_mat_out_of_range_is_noop() {
        let mut t = with_matches(1);
        let before = t.clone();
        assert!(t.delete_mat(7).is_none());
        assert_eq!(t, before);
    }

    #[test]
    fn test_create_group_on_missing_mat() {
        let mut t = tournament();
        let err = t.create_group(0, group_fields("G1")).unwrap_err();
        assert!(matches!(err, TournamentError::MatNotFound { mat: 0 }));
    }

    #[test]
    fn test_update_group_replaces_all_fields() {
        let mut t = with_matches(2);
        let updated = t
            .update_group(
                0,
                0,
                GroupFields {
                    name: "Finals".to_string(),
                    kata: "Ju-no-kata".to_string(),
                    number_of_judges: 3,
                    disable_major: true,
                    ..GroupFields::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Finals");
        assert_eq!(updated.kata, "Ju-no-kata");
        // Omitted start time is overwritten, not merged
        assert_eq!(updated.start_time, None);
        assert!(updated.disable_major);
        assert_eq!(updated.matches.len(), 2);
    }

    #[test]
    fn test_create_group_judge_count_bounds() {
        let mut t = with_matches(0);
        for number_of_judges in [0, 6, usize::MAX] {
            let err = t
                .create_group(
                    0,
                    GroupFields {
                        number_of_judges,
                        ..group_fields("Bad")
                    },
                )
                .unwrap_err();
            assert!(matches!(
                err,
                TournamentError::InvalidJudgeCount { max: 5, .. }
            ));
        }
        assert_eq!(t.mat(0).unwrap().groups.len(), 1);

        let single = GroupFields {
            number_of_judges: 1,
            ..group_fields("Single")
        };
        assert_eq!(t.create_group(0, single).unwrap(), 1);
    }

    #[test]
    fn test_update_group_judge_count_bounds() {
        let mut t = with_matches(1);
        let err = t
            .update_group(
                0,
                0,
                GroupFields {
                    number_of_judges: 1_000_000_000,
                    ..group_fields("Huge")
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            TournamentError::InvalidJudgeCount {
                number_of_judges: 1_000_000_000,
                max: 5
            }
        ));
        let err = t.update_group(0, 0, GroupFields::default()).unwrap_err();
        assert!(matches!(
            err,
            TournamentError::InvalidJudgeCount {
                number_of_judges: 0,
                ..
            }
        ));
        // Nothing written on rejection
        assert_eq!(t.mat(0).unwrap().groups[0].name, "G1");
        assert_eq!(t.mat(0).unwrap().groups[0].number_of_judges, 5);
    }

    #[test]
    fn test_update_group_not_found() {
        let mut t = with_matches(0);
        let err = t.update_group(0, 4, GroupFields::default()).unwrap_err();
        assert!(matches!(err, TournamentError::GroupNotFound { mat: 0, group: 4 }));
        let err = t.update_group(2, 0, GroupFields::default()).unwrap_err();
        assert!(matches!(err, TournamentError::MatNotFound { mat: 2 }));
    }

    #[test]
    fn test_delete_group() {
        let mut t = with_matches(0);
        t.create_group(0, group_fields("G2")).unwrap();

        assert!(t.delete_group(0, 5).unwrap().is_none());
        let removed = t.delete_group(0, 0).unwrap().unwrap();
        assert_eq!(removed.name, "G1");
        assert_eq!(t.mat(0).unwrap().groups[0].name, "G2");
        assert!(t.delete_group(3, 0).is_err());
    }

    #[test]
    fn test_create_match_seeds_default_sheets() {
        let t = with_matches(1);
        let m = &t.mat(0).unwrap().groups[0].matches[0];

        assert!(!m.completed);
        assert_eq!(m.scores.len(), 5);
        assert!(m.scores.iter().all(|sheet| sheet.len() == 15));
    }

    #[test]
    fn test_create_match_keeps_explicit_scores() {
        let mut t = with_matches(0);
        let sheet = vec![Score::default(); 2];
        t.create_match(
            0,
            0,
            MatchFields {
                scores: vec![sheet.clone()],
                ..match_fields("A", "B")
            },
        )
        .unwrap();
        assert_eq!(t.mat(0).unwrap().groups[0].matches[0].scores, vec![sheet]);
    }

    #[test]
    fn test_create_match_judge_count_bounds() {
        let mut t = with_matches(0);
        for number_of_judges in [0, 6, usize::MAX] {
            let err = t
                .create_match(
                    0,
                    0,
                    MatchFields {
                        kata: Some("Randori".to_string()),
                        number_of_judges: Some(number_of_judges),
                        ..match_fields("A", "B")
                    },
                )
                .unwrap_err();
            assert!(matches!(err, TournamentError::InvalidJudgeCount { .. }));
        }
        assert!(t.mat(0).unwrap().groups[0].matches.is_empty());

        t.create_match(
            0,
            0,
            MatchFields {
                number_of_judges: Some(3),
                ..match_fields("A", "B")
            },
        )
        .unwrap();
        assert_eq!(t.mat(0).unwrap().groups[0].matches[0].scores.len(), 3);
    }

    #[test]
    fn test_submit_scores_rejects_oversized_stored_count() {
        let mut t = with_matches(1);
        t.document.mats[0].groups[0].matches[0].number_of_judges = Some(usize::MAX);

        let err = t
            .submit_scores(0, 0, 0, 0, kata::score_sheet("Nage-no-kata"))
            .unwrap_err();
        assert!(matches!(err, TournamentError::InvalidJudgeCount { .. }));
        assert_eq!(t.mat(0).unwrap().groups[0].matches[0].scores.len(), 5);
    }

    #[test]
    fn test_create_match_missing_group() {
        let mut t = with_matches(0);
        let err = t.create_match(0, 1, match_fields("A", "B")).unwrap_err();
        assert!(matches!(err, TournamentError::GroupNotFound { .. }));
    }

    #[test]
    fn test_next_match_skips_completed() {
        let mut t = with_matches(3);
        complete(&mut t, 0, 0, 0);

        let pending = t.next_match(0).unwrap().unwrap();
        assert_eq!(pending.group_index, 0);
        assert_eq!(pending.index, 1);
        assert_eq!(pending.match_view.tori, "T1");
        assert_eq!(pending.match_view.kata, "Nage-no-kata");
        assert_eq!(pending.match_view.number_of_judges, 5);
    }

    #[test]
    fn test_next_match_moves_to_next_group() {
        let mut t = with_matches(1);
        t.create_group(0, group_fields("G2")).unwrap();
        t.create_match(0, 1, match_fields("X", "Y")).unwrap();
        complete(&mut t, 0, 0, 0);

        let pending = t.next_match(0).unwrap().unwrap();
        assert_eq!((pending.group_index, pending.index), (1, 0));
        assert_eq!(pending.match_view.tori, "X");
    }

    #[test]
    fn test_next_match_empty_results() {
        let mut t = with_matches(0);
        assert_eq!(t.next_match(0).unwrap(), None);

        let mut done = with_matches(2);
        complete(&mut done, 0, 0, 0);
        complete(&mut done, 0, 0, 1);
        assert_eq!(done.next_match(0).unwrap(), None);

        assert!(matches!(
            t.next_match(9),
            Err(TournamentError::MatNotFound { mat: 9 })
        ));
        t.delete_mat(0);
        assert!(t.next_match(0).is_err());
    }

    #[test]
    fn test_update_match_partial_merge() {
        let mut t = with_matches(1);
        let m = t
            .update_match(
                0,
                0,
                0,
                MatchUpdate {
                    uke: Some("New Uke".to_string()),
                    ..MatchUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(m.tori, "T0");
        assert_eq!(m.uke, "New Uke");
        assert!(!m.completed);
        assert_eq!(m.scores.len(), 5);
    }

    #[test]
    fn test_completed_match_is_immutable() {
        let mut t = with_matches(1);
        complete(&mut t, 0, 0, 0);
        let before = t.clone();

        for _ in 0..3 {
            let err = t
                .update_match(
                    0,
                    0,
                    0,
                    MatchUpdate {
                        tori: Some("Z".to_string()),
                        completed: Some(false),
                        results: Some(serde_json::json!({"total": 1})),
                        ..MatchUpdate::default()
                    },
                )
                .unwrap_err();
            assert!(matches!(err, TournamentError::AlreadyCompleted { .. }));
        }
        assert_eq!(t, before);
    }

    #[test]
    fn test_update_match_not_found() {
        let mut t = with_matches(1);
        let err = t
            .update_match(0, 0, 3, MatchUpdate::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TournamentError::MatchNotFound {
                mat: 0,
                group: 0,
                index: 3
            }
        ));
    }

    #[test]
    fn test_submit_scores_keeps_other_judges() {
        let mut t = with_matches(1);
        let mut sheet = kata::score_sheet("Nage-no-kata");
        sheet[0] = Score {
            value: 9.0,
            deductions: "1:::::".to_string(),
        };

        let m = t.submit_scores(0, 0, 0, 2, sheet.clone()).unwrap();
        assert_eq!(m.scores[2], sheet);
        assert_eq!(m.scores[0], kata::score_sheet("Nage-no-kata"));
        assert_eq!(m.scores[1], kata::score_sheet("Nage-no-kata"));
        assert_eq!(m.judge_totals()[2], 149.0);
    }

    #[test]
    fn test_submit_scores_validation() {
        let mut t = with_matches(1);

        let err = t
            .submit_scores(0, 0, 0, 5, kata::score_sheet("Nage-no-kata"))
            .unwrap_err();
        assert!(matches!(
            err,
            TournamentError::JudgeSlotOutOfRange {
                slot: 5,
                number_of_judges: 5
            }
        ));

        let err = t
            .submit_scores(0, 0, 0, 0, kata::score_sheet("Ju-no-kata")[..3].to_vec())
            .unwrap_err();
        assert!(matches!(err, TournamentError::InvalidScoreSheet(_)));

        let mut bad = kata::score_sheet("Nage-no-kata");
        bad[4].deductions = "1".to_string();
        let err = t.submit_scores(0, 0, 0, 0, bad).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidScoreSheet(_)));
    }

    #[test]
    fn test_submit_scores_rejected_after_completion() {
        let mut t = with_matches(1);
        complete(&mut t, 0, 0, 0);
        let err = t
            .submit_scores(0, 0, 0, 0, kata::score_sheet("Nage-no-kata"))
            .unwrap_err();
        assert!(err.is_final());
    }

    #[test]
    fn test_submit_scores_fills_missing_sheets() {
        let mut t = with_matches(0);
        t.create_match(
            0,
            0,
            MatchFields {
                scores: vec![kata::score_sheet("Nage-no-kata")],
                ..match_fields("A", "B")
            },
        )
        .unwrap();

        let m = t
            .submit_scores(0, 0, 0, 3, kata::score_sheet("Nage-no-kata"))
            .unwrap();
        assert_eq!(m.scores.len(), 5);
    }

    #[test]
    fn test_submit_judge_scores_by_code() {
        let mut t = with_matches(2);
        complete(&mut t, 0, 0, 0);
        let mut sheet = kata::score_sheet("Nage-no-kata");
        sheet[1].value = 7.0;

        t.submit_judge_scores(0, "c1", sheet.clone()).unwrap();
        assert_eq!(t.mat(0).unwrap().groups[0].matches[1].scores[1], sheet);

        let err = t.submit_judge_scores(0, "zzzz", sheet.clone()).unwrap_err();
        assert!(matches!(err, TournamentError::UnknownJudgeCode { mat: 0 }));

        complete(&mut t, 0, 0, 1);
        let err = t.submit_judge_scores(0, "c1", sheet).unwrap_err();
        assert!(matches!(err, TournamentError::NoPendingMatch { mat: 0 }));
    }

    #[test]
    fn test_delete_match() {
        let mut t = with_matches(3);
        let removed = t.delete_match(0, 0, 1).unwrap().unwrap();
        assert_eq!(removed.tori, "T1");
        assert_eq!(t.mat(0).unwrap().groups[0].matches[1].tori, "T2");
        assert!(t.delete_match(0, 0, 10).unwrap().is_none());
        assert!(t.delete_match(0, 3, 0).is_err());
    }

    #[test]
    fn test_judge_codes_stable_across_match_changes() {
        let mut t = with_matches(2);
        let codes = t.mat(0).unwrap().judge_codes.clone();

        complete(&mut t, 0, 0, 0);
        t.delete_match(0, 0, 1).unwrap();
        t.create_match(0, 0, match_fields("N", "M")).unwrap();

        assert_eq!(t.mat(0).unwrap().judge_codes, codes);
    }

    #[test]
    fn test_assign_judge() {
        let mut t = with_matches(0);
        t.assign_judge(0, 2, "Sato".to_string()).unwrap();
        assert_eq!(t.mat(0).unwrap().judges[2], "Sato");
        assert!(t.assign_judge(0, 5, "X".to_string()).is_err());
        assert!(t.assign_judge(1, 0, "X".to_string()).is_err());
    }

    #[test]
    fn test_mat_view_numbers_and_totals() {
        let mut t = with_matches(3);
        complete(&mut t, 0, 0, 1);

        let view = t.mat_view(0).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].number, 1);
        assert_eq!(view[1].number, 3);
        assert_eq!(view[1].tori, "T2");
        assert_eq!(view[0].judge_totals, Some(vec![150.0; 5]));

        t.replace(TournamentFields {
            name: "Renamed".to_string(),
            show_judge_totals: false,
        });
        assert_eq!(t.mat_view(0).unwrap()[0].judge_totals, None);
        assert_eq!(t.name(), "Renamed");
    }

    #[test]
    fn test_judge_view() {
        let mut t = with_matches(1);
        let mut sheet = kata::score_sheet("Nage-no-kata");
        sheet[0].value = 8.5;
        t.submit_scores(0, 0, 0, 3, sheet.clone()).unwrap();

        let view = t.judge_view(0, "c3").unwrap().unwrap();
        assert_eq!(view.tori, "T0");
        assert_eq!(view.number_of_judges, 5);
        assert_eq!(view.scores, sheet);

        complete(&mut t, 0, 0, 0);
        assert_eq!(t.judge_view(0, "c3").unwrap(), None);
        assert!(t.judge_view(0, "nope").is_err());
    }

    #[test]
    fn test_judge_view_outside_match_panel() {
        let mut t = with_matches(0);
        t.create_match(
            0,
            0,
            MatchFields {
                number_of_judges: Some(3),
                ..match_fields("A", "B")
            },
        )
        .unwrap();

        let err = t.judge_view(0, "c4").unwrap_err();
        assert!(matches!(
            err,
            TournamentError::JudgeSlotOutOfRange {
                slot: 4,
                number_of_judges: 3
            }
        ));
        let err = t
            .submit_judge_scores(0, "c4", kata::score_sheet("Nage-no-kata"))
            .unwrap_err();
        assert!(matches!(err, TournamentError::JudgeSlotOutOfRange { .. }));

        let view = t.judge_view(0, "c2").unwrap().unwrap();
        assert_eq!(view.number_of_judges, 3);
        assert_eq!(view.scores.len(), 15);
    }

    #[test]
    fn test_public_data_drops_judge_codes() {
        let t = with_matches(1);
        let public = serde_json::to_value(t.public_data()).unwrap();
        assert!(public["mats"][0].get("judgeCodes").is_none());
        assert_eq!(public["mats"][0]["groups"][0]["matches"][0]["tori"], "T0");

        let full = serde_json::to_value(t.data()).unwrap();
        assert_eq!(full["mats"][0]["judgeCodes"][4], "c4");
        assert_eq!(t.judge_slot(0, "c4").unwrap(), 4);
    }

    #[test]
    fn test_replace_keeps_mats() {
        let mut t = with_matches(2);
        t.replace(TournamentFields {
            name: "Autumn".to_string(),
            show_judge_totals: false,
        });
        assert_eq!(t.summary().name, "Autumn");
        assert!(!t.show_judge_totals());
        assert_eq!(t.mat(0).unwrap().groups[0].matches.len(), 2);
    }
}
