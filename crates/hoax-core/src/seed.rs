//! Bundled starter content.

use crate::errors::GameError;
use crate::model::{NewStory, GENERAL_FOLDER_ID, GENERAL_FOLDER_NAME};
use crate::storage::Store;
use anyhow::Context;
use serde::Deserialize;

const SEED_YAML: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/seed.yaml"));

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedSet {
    #[serde(default)]
    pub folders: Vec<String>,
    pub stories: Vec<SeedStory>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedStory {
    pub id: String,
    #[serde(default = "general")]
    pub folder: String,
    pub event: String,
    #[serde(default)]
    pub introduction: Option<String>,
    pub true_version: String,
    pub fake_version: String,
    pub explanation: String,
    #[serde(default)]
    pub hint: Option<String>,
}

fn general() -> String {
    GENERAL_FOLDER_NAME.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub folders_created: usize,
    pub stories_created: usize,
}

pub fn bundled() -> Result<SeedSet, GameError> {
    let set: SeedSet = serde_yaml::from_str(SEED_YAML).context("parse bundled seed set")?;
    Ok(set)
}

/// Load the bundled set, but only into a store without stories.
pub fn seed_if_empty(store: &Store) -> Result<SeedReport, GameError> {
    let existing = store.story_count()?;
    if existing > 0 {
        tracing::debug!(existing, "store has stories; skipping seed");
        return Ok(SeedReport::default());
    }
    seed_store(store, &bundled()?)
}

pub fn seed_store(store: &Store, set: &SeedSet) -> Result<SeedReport, GameError> {
    let mut report = SeedReport::default();

    for name in &set.folders {
        if find_folder(store, name)?.is_none() {
            store.create_folder(name)?;
            report.folders_created += 1;
        }
    }

    for s in &set.stories {
        if store.get_story(&s.id)?.is_some() {
            continue;
        }
        let folder_id = match find_folder(store, &s.folder)? {
            Some(id) => id,
            None => {
                report.folders_created += 1;
                store.create_folder(&s.folder)?.id
            }
        };
        store.create_story_with_id(
            &s.id,
            NewStory {
                folder_id: Some(folder_id),
                event: s.event.clone(),
                introduction: s.introduction.clone(),
                true_version: s.true_version.clone(),
                fake_version: s.fake_version.clone(),
                explanation: s.explanation.clone(),
                hint: s.hint.clone(),
            },
        )?;
        report.stories_created += 1;
    }

    tracing::info!(
        folders = report.folders_created,
        stories = report.stories_created,
        "seeded store"
    );
    Ok(report)
}

/// `General` always means the default folder, whatever it is currently called.
fn find_folder(store: &Store, name: &str) -> Result<Option<i64>, GameError> {
    if name.trim().eq_ignore_ascii_case(GENERAL_FOLDER_NAME) {
        return Ok(Some(GENERAL_FOLDER_ID));
    }
    Ok(store
        .search_folders(name)?
        .into_iter()
        .find(|f| f.name.eq_ignore_ascii_case(name.trim()))
        .map(|f| f.id))
}
