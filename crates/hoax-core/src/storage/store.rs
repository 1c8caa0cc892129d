//! Store: SQLite-backed story repository, round ledger and response log.
//!
//! Provides:
//! - Story and folder administration with referential-integrity checks
//! - Round tokens holding the true slot server-side
//! - Atomic answer recording (event insert + round settle in one transaction)

use super::store_internal::{folders, responses, rounds, schema, stories, txn};
use crate::errors::GameError;
use crate::model::{
    Folder, FolderFilter, FolderWithCount, NewResponse, NewStory, ResponseEvent, RoundTicket,
    SessionId, Story, Tally,
};
use crate::repo::{ResponseLog, RoundLedger, StoryRepository};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Result of a story deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedStory {
    pub story_id: String,
    pub responses_removed: u64,
    pub rounds_removed: u64,
}

/// SQLite-backed game store.
#[derive(Clone)]
pub struct Store {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open a file-backed store.
    pub fn open(path: &Path) -> Result<Self, GameError> {
        schema::open_impl(path)
    }

    /// Create an in-memory store (for testing).
    pub fn memory() -> Result<Self, GameError> {
        schema::memory_impl()
    }

    /// Create store from existing connection (for multi-connection tests).
    pub fn from_connection(conn: Connection) -> Result<Self, GameError> {
        schema::from_connection_impl(conn)
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, GameError> {
        self.conn
            .lock()
            .map_err(|_| GameError::Storage("store connection mutex poisoned".into()))
    }

    // === Stories ===

    pub fn list_stories(&self, filter: FolderFilter) -> Result<Vec<Story>, GameError> {
        let conn = self.lock()?;
        stories::list_stories_impl(&conn, filter)
    }

    pub fn get_story(&self, story_id: &str) -> Result<Option<Story>, GameError> {
        let conn = self.lock()?;
        stories::get_story_impl(&conn, story_id)
    }

    pub fn story_count(&self) -> Result<u64, GameError> {
        let conn = self.lock()?;
        stories::story_count_impl(&conn)
    }

    /// Insert a story under the next free `S<n>` id.
    pub fn create_story(&self, story: NewStory) -> Result<Story, GameError> {
        let story = story.validate()?;
        let conn = self.lock()?;
        txn::in_txn_impl(&conn, |conn| stories::create_story_impl(conn, None, &story))
    }

    /// Insert a story under a caller-chosen `S<n>` id (seeding).
    pub fn create_story_with_id(&self, story_id: &str, story: NewStory) -> Result<Story, GameError> {
        let story = story.validate()?;
        let conn = self.lock()?;
        txn::in_txn_impl(&conn, |conn| {
            stories::create_story_impl(conn, Some(story_id), &story)
        })
    }

    /// Replace a story's fields. The id never changes; an absent folder keeps the current one.
    pub fn update_story(&self, story_id: &str, story: NewStory) -> Result<Story, GameError> {
        let story = story.validate()?;
        let conn = self.lock()?;
        txn::in_txn_impl(&conn, |conn| stories::update_story_impl(conn, story_id, &story))
    }

    /// Delete a story. Referenced stories need `cascade`, which also drops their events.
    pub fn delete_story(&self, story_id: &str, cascade: bool) -> Result<DeletedStory, GameError> {
        let conn = self.lock()?;
        txn::in_txn_impl(&conn, |conn| stories::delete_story_impl(conn, story_id, cascade))
    }

    // === Folders ===

    pub fn list_folders(&self) -> Result<Vec<FolderWithCount>, GameError> {
        let conn = self.lock()?;
        folders::list_folders_impl(&conn, None)
    }

    /// Case-insensitive substring match on folder names. Blank query lists all.
    pub fn search_folders(&self, query: &str) -> Result<Vec<FolderWithCount>, GameError> {
        let conn = self.lock()?;
        let query = query.trim();
        folders::list_folders_impl(&conn, (!query.is_empty()).then_some(query))
    }

    pub fn get_folder(&self, folder_id: i64) -> Result<Option<Folder>, GameError> {
        let conn = self.lock()?;
        folders::get_folder_impl(&conn, folder_id)
    }

    pub fn create_folder(&self, name: &str) -> Result<Folder, GameError> {
        let conn = self.lock()?;
        folders::create_folder_impl(&conn, name)
    }

    pub fn rename_folder(&self, folder_id: i64, name: &str) -> Result<Folder, GameError> {
        let conn = self.lock()?;
        folders::rename_folder_impl(&conn, folder_id, name)
    }

    /// Delete a folder, moving its stories to General. Returns how many moved.
    pub fn delete_folder(&self, folder_id: i64) -> Result<u64, GameError> {
        let conn = self.lock()?;
        txn::in_txn_impl(&conn, |conn| folders::delete_folder_impl(conn, folder_id))
    }

    // === Responses ===

    pub fn session_history(&self, session: &SessionId) -> Result<Vec<ResponseEvent>, GameError> {
        let conn = self.lock()?;
        responses::session_history_impl(&conn, session)
    }

    pub fn count_responses_for_story(&self, story_id: &str) -> Result<u64, GameError> {
        let conn = self.lock()?;
        responses::count_for_story_impl(&conn, story_id)
    }
}

impl StoryRepository for Store {
    fn stories(&self, filter: FolderFilter) -> Result<Vec<Story>, GameError> {
        self.list_stories(filter)
    }

    fn story(&self, story_id: &str) -> Result<Option<Story>, GameError> {
        self.get_story(story_id)
    }
}

impl RoundLedger for Store {
    fn open_round(&self, ticket: &RoundTicket) -> Result<(), GameError> {
        let conn = self.lock()?;
        rounds::open_round_impl(&conn, ticket)
    }

    fn round(&self, round_token: &str) -> Result<Option<RoundTicket>, GameError> {
        let conn = self.lock()?;
        rounds::get_round_impl(&conn, round_token)
    }

    fn expire_rounds(&self, issued_before: &str) -> Result<u64, GameError> {
        let conn = self.lock()?;
        rounds::expire_rounds_impl(&conn, issued_before)
    }
}

impl ResponseLog for Store {
    fn record_response(&self, response: &NewResponse<'_>) -> Result<ResponseEvent, GameError> {
        let conn = self.lock()?;
        txn::in_txn_impl(&conn, |conn| responses::record_response_impl(conn, response))
    }

    fn session_tally(
        &self,
        session: &SessionId,
        filter: FolderFilter,
    ) -> Result<Tally, GameError> {
        let conn = self.lock()?;
        responses::session_tally_impl(&conn, session, filter)
    }

    fn story_tally(&self, story_id: &str) -> Result<Tally, GameError> {
        let conn = self.lock()?;
        responses::story_tally_impl(&conn, story_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SlotLabel, GENERAL_FOLDER_ID};
    use crate::errors::ErrorKind;

    fn sample(event: &str) -> NewStory {
        NewStory {
            folder_id: None,
            event: event.to_string(),
            introduction: None,
            true_version: format!("{event} happened"),
            fake_version: format!("{event} was staged"),
            explanation: format!("{event} is documented"),
            hint: None,
        }
    }

    fn ticket(token: &str, story_id: &str, true_slot: SlotLabel) -> RoundTicket {
        RoundTicket {
            round_token: token.to_string(),
            story_id: story_id.to_string(),
            true_slot,
            issued_at: "2026-01-01T00:00:00+00:00".to_string(),
            answered: false,
        }
    }

    fn answer(store: &Store, token: &str, story_id: &str, session: &str, correct: bool) {
        let session = SessionId::new(session).unwrap();
        store.open_round(&ticket(token, story_id, SlotLabel::T)).unwrap();
        store
            .record_response(&NewResponse {
                session_id: &session,
                story_id,
                choice: if correct { SlotLabel::T } else { SlotLabel::H },
                is_correct: correct,
                round_token: token,
            })
            .unwrap();
    }

    // === A) Bootstrap ===

    #[test]
    fn test_store_bootstraps_schema_and_general_folder() {
        let store = Store::memory().unwrap();
        let folders = store.list_folders().unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].id, GENERAL_FOLDER_ID);
        assert_eq!(folders[0].name, "General");
        assert_eq!(store.story_count().unwrap(), 0);
    }

    #[test]
    fn test_store_sets_foreign_keys() {
        let store = Store::memory().unwrap();
        let conn = store.conn.lock().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |r| r.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    // === B) Stories ===

    #[test]
    fn test_create_story_assigns_sequential_ids() {
        let store = Store::memory().unwrap();
        let s1 = store.create_story(sample("Moon")).unwrap();
        let s2 = store.create_story(sample("Cleopatra")).unwrap();
        assert_eq!(s1.id, "S1");
        assert_eq!(s2.id, "S2");
        assert_eq!(s1.folder_id, GENERAL_FOLDER_ID);
    }

    #[test]
    fn test_create_story_continues_after_highest_suffix() {
        let store = Store::memory().unwrap();
        store.create_story_with_id("S9", sample("Nine")).unwrap();
        let next = store.create_story(sample("Ten")).unwrap();
        assert_eq!(next.id, "S10");
    }

    #[test]
    fn test_list_orders_numerically() {
        let store = Store::memory().unwrap();
        store.create_story_with_id("S10", sample("Ten")).unwrap();
        store.create_story_with_id("S2", sample("Two")).unwrap();
        let ids: Vec<_> = store
            .list_stories(FolderFilter::All)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["S2", "S10"]);
    }

    #[test]
    fn test_create_story_with_duplicate_id_conflicts() {
        let store = Store::memory().unwrap();
        store.create_story_with_id("S1", sample("One")).unwrap();
        let err = store.create_story_with_id("S1", sample("Again")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        let err = store.create_story_with_id("Moon", sample("Bad id")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_create_story_rejects_unknown_folder() {
        let store = Store::memory().unwrap();
        let mut s = sample("Moon");
        s.folder_id = Some(99);
        let err = store.create_story(s).unwrap_err();
        assert_eq!(err, GameError::FolderNotFound { folder_id: 99 });
        assert_eq!(store.story_count().unwrap(), 0);
    }

    #[test]
    fn test_update_story_keeps_id_and_folder() {
        let store = Store::memory().unwrap();
        let folder = store.create_folder("Spain").unwrap();
        let mut s = sample("Franco");
        s.folder_id = Some(folder.id);
        let created = store.create_story(s).unwrap();

        let mut edit = sample("Franco's Successor");
        edit.hint = Some("Think 1969".into());
        let updated = store.update_story(&created.id, edit).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.folder_id, folder.id);
        assert_eq!(updated.event, "Franco's Successor");
        assert_eq!(updated.hint.as_deref(), Some("Think 1969"));
    }

    #[test]
    fn test_update_missing_story_is_not_found() {
        let store = Store::memory().unwrap();
        let err = store.update_story("S404", sample("x")).unwrap_err();
        assert!(matches!(err, GameError::StoryNotFound { .. }));
    }

    #[test]
    fn test_delete_unreferenced_story() {
        let store = Store::memory().unwrap();
        let s = store.create_story(sample("Moon")).unwrap();
        store.open_round(&ticket("r1", &s.id, SlotLabel::H)).unwrap();
        let deleted = store.delete_story(&s.id, false).unwrap();
        assert_eq!(deleted.responses_removed, 0);
        assert_eq!(deleted.rounds_removed, 1);
        assert!(store.get_story(&s.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_referenced_story_requires_cascade() {
        let store = Store::memory().unwrap();
        let s = store.create_story(sample("Moon")).unwrap();
        answer(&store, "r1", &s.id, "sess", true);

        let err = store.delete_story(&s.id, false).unwrap_err();
        assert_eq!(
            err,
            GameError::StoryReferenced {
                story_id: s.id.clone(),
                responses: 1
            }
        );
        assert!(store.get_story(&s.id).unwrap().is_some());

        let deleted = store.delete_story(&s.id, true).unwrap();
        assert_eq!(deleted.responses_removed, 1);
        assert!(store.get_story(&s.id).unwrap().is_none());
        assert_eq!(store.count_responses_for_story(&s.id).unwrap(), 0);
    }

    #[test]
    fn test_delete_missing_story_is_not_found() {
        let store = Store::memory().unwrap();
        let err = store.delete_story("S1", true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    // === C) Folders ===

    #[test]
    fn test_folder_names_are_unique_case_insensitive() {
        let store = Store::memory().unwrap();
        store.create_folder("Spain").unwrap();
        let err = store.create_folder("spain").unwrap_err();
        assert!(matches!(err, GameError::DuplicateFolder { .. }));
        let err = store.create_folder("general").unwrap_err();
        assert!(matches!(err, GameError::DuplicateFolder { .. }));
    }

    #[test]
    fn test_folder_name_must_not_be_blank() {
        let store = Store::memory().unwrap();
        let err = store.create_folder("   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_rename_folder() {
        let store = Store::memory().unwrap();
        let f = store.create_folder("Spian").unwrap();
        let renamed = store.rename_folder(f.id, "Spain").unwrap();
        assert_eq!(renamed.name, "Spain");
        assert!(matches!(
            store.rename_folder(f.id, "General"),
            Err(GameError::DuplicateFolder { .. })
        ));
        assert!(matches!(
            store.rename_folder(77, "Egypt"),
            Err(GameError::FolderNotFound { folder_id: 77 })
        ));
    }

    #[test]
    fn test_general_folder_is_protected() {
        let store = Store::memory().unwrap();
        let err = store.delete_folder(GENERAL_FOLDER_ID).unwrap_err();
        assert_eq!(
            err,
            GameError::ProtectedFolder {
                folder_id: GENERAL_FOLDER_ID
            }
        );
    }

    #[test]
    fn test_delete_folder_reassigns_stories_to_general() {
        let store = Store::memory().unwrap();
        let spain = store.create_folder("Spain").unwrap();
        let mut s = sample("Franco");
        s.folder_id = Some(spain.id);
        let story = store.create_story(s).unwrap();

        let moved = store.delete_folder(spain.id).unwrap();
        assert_eq!(moved, 1);
        assert!(store.get_folder(spain.id).unwrap().is_none());
        assert_eq!(
            store.get_story(&story.id).unwrap().unwrap().folder_id,
            GENERAL_FOLDER_ID
        );
        assert!(matches!(
            store.delete_folder(spain.id),
            Err(GameError::FolderNotFound { .. })
        ));
    }

    #[test]
    fn test_folder_listing_counts_and_search() {
        let store = Store::memory().unwrap();
        let spain = store.create_folder("Spain").unwrap();
        store.create_folder("Ancient Egypt").unwrap();
        let mut s = sample("Franco");
        s.folder_id = Some(spain.id);
        store.create_story(s).unwrap();
        store.create_story(sample("Moon")).unwrap();

        let all = store.list_folders().unwrap();
        let counts: Vec<_> = all.iter().map(|f| (f.name.as_str(), f.story_count)).collect();
        assert_eq!(
            counts,
            vec![("General", 1), ("Spain", 1), ("Ancient Egypt", 0)]
        );

        let hits = store.search_folders("EGY").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ancient Egypt");
        assert_eq!(store.search_folders(" ").unwrap().len(), 3);
    }

    #[test]
    fn test_filter_on_unknown_folder_is_not_found() {
        let store = Store::memory().unwrap();
        let err = store.list_stories(FolderFilter::Folder(5)).unwrap_err();
        assert_eq!(err, GameError::FolderNotFound { folder_id: 5 });
    }

    // === D) Rounds & responses ===

    #[test]
    fn test_round_roundtrip() {
        let store = Store::memory().unwrap();
        let s = store.create_story(sample("Moon")).unwrap();
        store.open_round(&ticket("tok", &s.id, SlotLabel::H)).unwrap();
        let r = store.round("tok").unwrap().unwrap();
        assert_eq!(r.true_slot, SlotLabel::H);
        assert!(!r.answered);
        assert!(store.round("nope").unwrap().is_none());
    }

    #[test]
    fn test_expire_rounds_keeps_answered_and_fresh() {
        let store = Store::memory().unwrap();
        let s = store.create_story(sample("Moon")).unwrap();
        store.open_round(&ticket("stale", &s.id, SlotLabel::T)).unwrap();
        answer(&store, "answered", &s.id, "sess", true);
        let mut fresh = ticket("fresh", &s.id, SlotLabel::H);
        fresh.issued_at = "2026-03-01T00:00:00.250+00:00".to_string();
        store.open_round(&fresh).unwrap();

        let removed = store.expire_rounds("2026-02-01T00:00:00+00:00").unwrap();
        assert_eq!(removed, 1);
        assert!(store.round("stale").unwrap().is_none());
        assert!(store.round("answered").unwrap().unwrap().answered);
        assert!(store.round("fresh").unwrap().is_some());
        assert_eq!(store.expire_rounds("2026-02-01T00:00:00+00:00").unwrap(), 0);
    }

    #[test]
    fn test_record_response_settles_round_once() {
        let store = Store::memory().unwrap();
        let s = store.create_story(sample("Moon")).unwrap();
        answer(&store, "tok", &s.id, "sess", true);
        assert!(store.round("tok").unwrap().unwrap().answered);

        let session = SessionId::new("sess").unwrap();
        let err = store
            .record_response(&NewResponse {
                session_id: &session,
                story_id: &s.id,
                choice: SlotLabel::T,
                is_correct: true,
                round_token: "tok",
            })
            .unwrap_err();
        assert_eq!(
            err,
            GameError::RoundAlreadyAnswered {
                round_token: "tok".into()
            }
        );
        assert_eq!(store.count_responses_for_story(&s.id).unwrap(), 1);
    }

    #[test]
    fn test_input_ids_increase() {
        let store = Store::memory().unwrap();
        let s = store.create_story(sample("Moon")).unwrap();
        answer(&store, "a", &s.id, "sess", true);
        answer(&store, "b", &s.id, "sess", false);
        let history = store
            .session_history(&SessionId::new("sess").unwrap())
            .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].input_id < history[1].input_id);
        assert_eq!(history[1].choice, SlotLabel::H);
        assert!(!history[1].is_correct);
    }

    #[test]
    fn test_session_tally_filters_by_folder() {
        let store = Store::memory().unwrap();
        let spain = store.create_folder("Spain").unwrap();
        let moon = store.create_story(sample("Moon")).unwrap();
        let mut f = sample("Franco");
        f.folder_id = Some(spain.id);
        let franco = store.create_story(f).unwrap();

        answer(&store, "r1", &moon.id, "sess", true);
        answer(&store, "r2", &franco.id, "sess", false);
        answer(&store, "r3", &franco.id, "other", true);

        let sess = SessionId::new("sess").unwrap();
        assert_eq!(
            store.session_tally(&sess, FolderFilter::All).unwrap(),
            Tally { total: 2, correct: 1 }
        );
        assert_eq!(
            store
                .session_tally(&sess, FolderFilter::Folder(spain.id))
                .unwrap(),
            Tally { total: 1, correct: 0 }
        );
        assert_eq!(
            store.story_tally(&franco.id).unwrap(),
            Tally { total: 2, correct: 1 }
        );
    }
}
