use super::open_store;
use crate::cli::args::{GlobalArgs, PlayArgs};
use crate::exit_codes;
use dialoguer::{theme::ColorfulTheme, Select};
use hoax_core::{
    AnswerEvaluator, FolderFilter, RoundGenerator, RoundView, SessionId, SlotLabel,
    StatsAggregator, Submission,
};

pub fn run(global: &GlobalArgs, args: PlayArgs) -> anyhow::Result<i32> {
    let (cfg, store) = open_store(global)?;
    let filter = FolderFilter::parse(args.folder.as_deref())?;
    let session = match args.session {
        Some(raw) => SessionId::new(raw)?,
        None => SessionId::mint(),
    };
    let fixed_choice = args.choice.as_deref().map(SlotLabel::parse).transpose()?;

    let rounds = RoundGenerator::new(&store).with_round_ttl(cfg.round_ttl());
    let evaluator = AnswerEvaluator::new(&store);
    let theme = ColorfulTheme::default();

    for _ in 0..args.rounds {
        let view = rounds.generate(filter)?;
        show_round(&view);

        let choice = match fixed_choice {
            Some(c) => c,
            None => prompt(&theme)?,
        };
        let outcome = evaluator.evaluate(&Submission {
            session_id: Some(session.to_string()),
            story_id: Some(view.story_id.clone()),
            choice: Some(choice.to_string()),
            round_token: Some(view.round_token.clone()),
        })?;
        println!("\n{}\n", outcome.feedback);
    }

    let stats = StatsAggregator::new(&store).session_stats(&session, filter)?;
    println!(
        "Session {}: {}/{} correct ({:.2}%)",
        session, stats.correct, stats.total, stats.accuracy
    );
    Ok(exit_codes::SUCCESS)
}

fn show_round(view: &RoundView) {
    println!("== {} ({}) ==", view.event, view.story_id);
    if let Some(intro) = &view.introduction {
        println!("{intro}\n");
    }
    println!("[T] {}\n", view.slot_t);
    println!("[H] {}\n", view.slot_h);
    if let Some(hint) = &view.hint {
        println!("Hint: {hint}");
    }
}

fn prompt(theme: &ColorfulTheme) -> anyhow::Result<SlotLabel> {
    let idx = Select::with_theme(theme)
        .with_prompt("Which version is true?")
        .items(&["T", "H"])
        .default(0)
        .interact()?;
    Ok(if idx == 0 { SlotLabel::T } else { SlotLabel::H })
}
