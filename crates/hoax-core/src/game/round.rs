use crate::errors::GameError;
use crate::model::{FolderFilter, RoundTicket, RoundView, SlotLabel, Version};
use crate::repo::{RoundLedger, StoryRepository};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;
use uuid::Uuid;

/// Picks a story and shuffles its two versions into the `T`/`H` slots.
///
/// With a round TTL set, unanswered rounds older than the TTL are dropped
/// before each new round is recorded. Their tokens then answer as not found.
pub struct RoundGenerator<'a, S> {
    store: &'a S,
    round_ttl: Option<Duration>,
}

/// Drop unanswered rounds issued more than `ttl` before `now`.
pub fn expire_stale_rounds<L: RoundLedger + ?Sized>(
    ledger: &L,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<u64, GameError> {
    let Some(cutoff) = chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_sub_signed(ttl))
    else {
        return Ok(0);
    };
    let removed = ledger.expire_rounds(&cutoff.to_rfc3339())?;
    if removed > 0 {
        tracing::debug!(removed, ttl_secs = ttl.as_secs(), "expired stale rounds");
    }
    Ok(removed)
}

impl<'a, S> RoundGenerator<'a, S>
where
    S: StoryRepository + RoundLedger,
{
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            round_ttl: None,
        }
    }

    /// Expire unanswered rounds older than `ttl`. `None` keeps them forever.
    pub fn with_round_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.round_ttl = ttl;
        self
    }

    pub fn generate(&self, filter: FolderFilter) -> Result<RoundView, GameError> {
        self.generate_with(filter, &mut rand::thread_rng())
    }

    /// Same as [`Self::generate`] with a caller-supplied random source.
    pub fn generate_with<R: Rng>(
        &self,
        filter: FolderFilter,
        rng: &mut R,
    ) -> Result<RoundView, GameError> {
        let stories = self.store.stories(filter)?;
        let story = stories.choose(rng).ok_or(GameError::NoStories)?;

        let true_slot = if rng.gen_bool(0.5) {
            SlotLabel::T
        } else {
            SlotLabel::H
        };
        let version_in = |slot: SlotLabel| {
            if slot == true_slot {
                Version::True
            } else {
                Version::Fake
            }
        };

        let now = Utc::now();
        if let Some(ttl) = self.round_ttl {
            expire_stale_rounds(self.store, ttl, now)?;
        }
        let ticket = RoundTicket {
            round_token: Uuid::new_v4().to_string(),
            story_id: story.id.clone(),
            true_slot,
            issued_at: now.to_rfc3339(),
            answered: false,
        };
        self.store.open_round(&ticket)?;
        tracing::debug!(
            story_id = %story.id,
            round_token = %ticket.round_token,
            ?filter,
            "round issued"
        );

        Ok(RoundView {
            round_token: ticket.round_token,
            story_id: story.id.clone(),
            event: story.event.clone(),
            introduction: story.introduction.clone(),
            hint: story.hint.clone(),
            slot_t: story.text(version_in(SlotLabel::T)).to_string(),
            slot_h: story.text(version_in(SlotLabel::H)).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::{story, store_with};
    use crate::storage::Store;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_repository_is_not_found() {
        let store = Store::memory().unwrap();
        let err = RoundGenerator::new(&store)
            .generate(FolderFilter::All)
            .unwrap_err();
        assert_eq!(err, GameError::NoStories);
    }

    #[test]
    fn exactly_one_slot_carries_the_true_version() {
        let store = store_with(&["Moon"]);
        let gen = RoundGenerator::new(&store);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let view = gen.generate_with(FolderFilter::All, &mut rng).unwrap();
            let s = store.get_story(&view.story_id).unwrap().unwrap();
            let ticket = store.round(&view.round_token).unwrap().unwrap();
            let (true_text, fake_text) = match ticket.true_slot {
                SlotLabel::T => (&view.slot_t, &view.slot_h),
                SlotLabel::H => (&view.slot_h, &view.slot_t),
            };
            assert_eq!(true_text, &s.true_version);
            assert_eq!(fake_text, &s.fake_version);
        }
    }

    #[test]
    fn slot_assignment_is_roughly_fair() {
        let store = store_with(&["Moon"]);
        let gen = RoundGenerator::new(&store);
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 1000;
        let mut true_in_t = 0;
        for _ in 0..trials {
            let view = gen.generate_with(FolderFilter::All, &mut rng).unwrap();
            if store.round(&view.round_token).unwrap().unwrap().true_slot == SlotLabel::T {
                true_in_t += 1;
            }
        }
        assert!(
            (400..=600).contains(&true_in_t),
            "T held the true version {true_in_t}/{trials} times"
        );
    }

    #[test]
    fn filter_restricts_the_draw() {
        let store = store_with(&["Moon", "Cleopatra"]);
        let spain = store.create_folder("Spain").unwrap();
        let franco = store.create_story(story("Franco", Some(spain.id))).unwrap();

        let gen = RoundGenerator::new(&store);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            let view = gen
                .generate_with(FolderFilter::Folder(spain.id), &mut rng)
                .unwrap();
            assert_eq!(view.story_id, franco.id);
        }
    }

    #[test]
    fn empty_or_unknown_folder_is_not_found() {
        let store = store_with(&["Moon"]);
        let empty = store.create_folder("Egypt").unwrap();
        let gen = RoundGenerator::new(&store);
        assert_eq!(
            gen.generate(FolderFilter::Folder(empty.id)).unwrap_err(),
            GameError::NoStories
        );
        assert_eq!(
            gen.generate(FolderFilter::Folder(42)).unwrap_err(),
            GameError::FolderNotFound { folder_id: 42 }
        );
    }

    #[test]
    fn stale_unanswered_rounds_expire_on_next_draw() {
        let store = store_with(&["Moon"]);
        let s = store.list_stories(FolderFilter::All).unwrap().remove(0);
        let stale_at = Utc::now() - chrono::Duration::hours(2);
        store
            .open_round(&RoundTicket {
                round_token: "stale".into(),
                story_id: s.id.clone(),
                true_slot: SlotLabel::T,
                issued_at: stale_at.to_rfc3339(),
                answered: false,
            })
            .unwrap();

        let view = RoundGenerator::new(&store)
            .with_round_ttl(Some(Duration::from_secs(3600)))
            .generate(FolderFilter::All)
            .unwrap();
        assert!(store.round("stale").unwrap().is_none());
        assert!(store.round(&view.round_token).unwrap().is_some());
    }

    #[test]
    fn rounds_are_kept_without_ttl() {
        let store = store_with(&["Moon"]);
        let gen = RoundGenerator::new(&store);
        let first = gen.generate(FolderFilter::All).unwrap();
        gen.generate(FolderFilter::All).unwrap();
        assert!(store.round(&first.round_token).unwrap().is_some());
        assert_eq!(
            expire_stale_rounds(&store, Duration::from_secs(60), Utc::now()).unwrap(),
            0
        );
    }

    #[test]
    fn round_view_carries_optional_context() {
        let store = Store::memory().unwrap();
        let mut s = story("Moon", None);
        s.introduction = Some("1969 was a busy year.".into());
        s.hint = Some("Think telemetry.".into());
        store.create_story(s).unwrap();

        let view = RoundGenerator::new(&store)
            .generate(FolderFilter::All)
            .unwrap();
        assert_eq!(view.introduction.as_deref(), Some("1969 was a busy year."));
        assert_eq!(view.hint.as_deref(), Some("Think telemetry."));
        assert_ne!(view.slot_t, view.slot_h);
    }
}
