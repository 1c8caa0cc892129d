use super::{open_store, print_json};
use crate::cli::args::{GlobalArgs, OutputFormat, StoryArgs, StoryFields, StorySub};
use crate::exit_codes;
use hoax_core::{FolderFilter, GameError, NewStory, Story};

pub fn run(global: &GlobalArgs, args: StoryArgs) -> anyhow::Result<i32> {
    let (_, store) = open_store(global)?;

    match args.cmd {
        StorySub::List { folder, format } => {
            let stories = store.list_stories(FolderFilter::parse(folder.as_deref())?)?;
            match format {
                OutputFormat::Json => print_json(&stories)?,
                OutputFormat::Text => {
                    for s in &stories {
                        println!("{:<6} [{}] {}", s.id, s.folder_id, s.event);
                    }
                }
            }
        }
        StorySub::Show { id } => {
            let story = store
                .get_story(&id)?
                .ok_or(GameError::StoryNotFound { story_id: id })?;
            print_json(&story)?;
        }
        StorySub::Add { fields } => {
            let story = store.create_story(fields.into_new_story(None))?;
            println!("Created story {}", story.id);
        }
        StorySub::Edit { id, fields } => {
            let current = store
                .get_story(&id)?
                .ok_or_else(|| GameError::StoryNotFound {
                    story_id: id.clone(),
                })?;
            let story = store.update_story(&id, fields.into_new_story(Some(current)))?;
            println!("Updated story {}", story.id);
        }
        StorySub::Delete { id, cascade } => {
            let deleted = store.delete_story(&id, cascade)?;
            println!(
                "Deleted story {} ({} answers, {} rounds removed)",
                deleted.story_id, deleted.responses_removed, deleted.rounds_removed
            );
        }
    }
    Ok(exit_codes::SUCCESS)
}

impl StoryFields {
    /// Overlay the given flags on `base`; absent flags keep the base value.
    fn into_new_story(self, base: Option<Story>) -> NewStory {
        let base = base.map(|s| NewStory {
            folder_id: Some(s.folder_id),
            event: s.event,
            introduction: s.introduction,
            true_version: s.true_version,
            fake_version: s.fake_version,
            explanation: s.explanation,
            hint: s.hint,
        });
        let base = base.unwrap_or_default();
        NewStory {
            folder_id: self.folder.or(base.folder_id),
            event: self.event.unwrap_or(base.event),
            introduction: self.introduction.or(base.introduction),
            true_version: self.true_version.unwrap_or(base.true_version),
            fake_version: self.fake_version.unwrap_or(base.fake_version),
            explanation: self.explanation.unwrap_or(base.explanation),
            hint: self.hint.or(base.hint),
        }
    }
}
