use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lectio_lib::commands::{self, passage_html, study_html};
use lectio_lib::render::{
    render_comparison, render_cross_references, render_notice, render_occurrences,
    render_search_results,
};
use lectio_lib::{
    HttpCollaborator, LookupOutcome, NavigationOutcome, StudyConfig, StudyContext, StudyError,
    TestamentFilter, TranslationId, UsageScope, WordPos,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lectio", about = "Study scripture from the command line", version)]
struct Cli {
    /// Path to a JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a passage as interactive word spans.
    Read {
        /// Reference such as "Genesis", "Genesis 1" or "John 3:16".
        reference: String,
    },
    /// Show the word study and usages of a word from a passage.
    Word {
        reference: String,
        word: String,
        #[arg(long, value_enum, default_value_t = ScopeArg::All)]
        scope: ScopeArg,
    },
    /// Compare translations of a single verse.
    Compare {
        reference: String,
        /// Translation to include (repeatable); defaults to the configured set.
        #[arg(long = "source")]
        sources: Vec<String>,
    },
    /// List cross-references for a single verse.
    Xrefs { reference: String },
    /// Search the whole Bible for a phrase.
    Search {
        phrase: String,
        #[arg(long, value_enum, default_value_t = TestamentArg::All)]
        testament: TestamentArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ScopeArg {
    All,
    Book,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TestamentArg {
    All,
    Ot,
    Nt,
}

fn navigation_notice(
    outcome: &NavigationOutcome,
    reference: &str,
) -> Result<Option<String>, StudyError> {
    let notice = match outcome {
        NavigationOutcome::Displayed { .. } => return Ok(None),
        NavigationOutcome::NotFound => render_notice(&format!(
            "No results found for \"{}\". Check the book name and chapter number.",
            reference
        ))?,
        NavigationOutcome::Superseded => render_notice("Navigation was superseded.")?,
    };
    Ok(Some(notice))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StudyConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let collaborator = HttpCollaborator::new(&config.api_base, config.request_timeout())?;
    let ctx = StudyContext::new(collaborator, config);

    match cli.command {
        Command::Read { reference } => {
            let outcome = commands::go_search(&ctx, &reference).await?;
            match navigation_notice(&outcome, &reference)? {
                Some(notice) => println!("{}", notice),
                None => println!("{}", passage_html(&ctx)?),
            }
        }
        Command::Word {
            reference,
            word,
            scope,
        } => {
            let outcome = commands::go_search(&ctx, &reference).await?;
            if let Some(notice) = navigation_notice(&outcome, &reference)? {
                println!("{}", notice);
                return Ok(());
            }

            let pos = {
                let session = ctx
                    .session
                    .lock()
                    .map_err(|_| anyhow!("Failed to acquire session lock"))?;
                let found = session.passage().iter().enumerate().find_map(|(vi, verse)| {
                    verse
                        .tokens
                        .iter()
                        .position(|t| t.is_interactive() && t.lookup_word().eq_ignore_ascii_case(&word))
                        .map(|ti| WordPos::new(vi, ti))
                });
                found
            };
            let pos = pos.ok_or_else(|| {
                StudyError::NotFound(format!("\"{}\" does not occur in {}", word, reference))
            })?;

            if let ScopeArg::Book = scope {
                commands::set_usage_scope(&ctx, UsageScope::CurrentBook)?;
            }
            let outcome = commands::click_word(&ctx, pos).await?;
            if let Some(study) = study_html(&ctx)? {
                println!("{}", study);
            }
            match outcome {
                LookupOutcome::Listed(listing) => println!("{}", render_occurrences(&listing)?),
                LookupOutcome::Unavailable(e) => {
                    println!("{}", render_notice(&format!("Usages unavailable: {}", e))?)
                }
                LookupOutcome::Ignored | LookupOutcome::Superseded => {}
            }
        }
        Command::Compare { reference, sources } => {
            let sources = sources
                .iter()
                .map(|s| {
                    TranslationId::from_tag(s).ok_or_else(|| anyhow!("Unknown translation: {}", s))
                })
                .collect::<Result<Vec<_>>>()?;
            let view = commands::run_compare(&ctx, &reference, Some(&sources)).await?;
            println!("{}", render_comparison(&view)?);
        }
        Command::Xrefs { reference } => {
            let (verse, refs) = commands::run_cross_references(&ctx, &reference).await?;
            println!("{}", render_cross_references(&verse, &refs)?);
        }
        Command::Search { phrase, testament } => {
            let filter = match testament {
                TestamentArg::All => TestamentFilter::All,
                TestamentArg::Ot => TestamentFilter::Old,
                TestamentArg::Nt => TestamentFilter::New,
            };
            let listing = commands::run_bible_search(&ctx, &phrase, filter).await?;
            println!("{}", render_search_results(&listing)?);
        }
    }

    Ok(())
}
