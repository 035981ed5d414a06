//! wepress CLI - WeChat article curation with AI review
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use wepress::export::{self, ExportOptions, Manuscript};
use wepress::store::{ArticleFilter, ArticleStore, StatusFilter};
use wepress::{agent, seed, ui, Config};

#[derive(Parser)]
#[command(name = "wepress")]
#[command(author, version, about = "CLI for curating WeChat articles with AI review and manuscript export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List articles in the demo workspace
    List {
        /// Case-insensitive search over title and author
        #[arg(long)]
        search: Option<String>,
        /// Only articles assigned to this category id
        #[arg(long)]
        category: Option<String>,
        /// Status facet: all, edited, raw or spell-checked
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show one article with its stored review
    Show {
        /// Article id
        id: String,
    },
    /// Run the AI review on one article
    Analyze {
        /// Article id
        id: String,
        /// Print the raw model reply instead of the structured review
        #[arg(long)]
        raw: bool,
    },
    /// Auto-assign categories from title keywords
    Categorize,
    /// Export the manuscript or the article index
    Export {
        /// Output format: doc, html or csv
        #[arg(long, default_value = "doc")]
        format: String,
        /// Output file path
        #[arg(long)]
        out: Option<PathBuf>,
        /// Leave out the table of contents
        #[arg(long)]
        no_toc: bool,
        /// Append uncategorized articles as a trailing section
        #[arg(long)]
        include_uncategorized: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate for
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List {
            search,
            category,
            status,
        }) => {
            let store = seed::demo_store();
            let filter = ArticleFilter {
                search,
                category,
                status,
            };
            let articles = store.find_articles(&filter);

            if articles.is_empty() {
                println!("No articles match.");
            } else {
                println!("{} of {} articles:\n", articles.len(), store.articles().len());
                for article in articles {
                    let category = article
                        .category_id
                        .as_deref()
                        .and_then(|id| store.category(id))
                        .map(|c| c.name.as_str())
                        .unwrap_or("未分类");
                    println!(
                        "{}  {} · {} ({}, {})",
                        article.id, article.title, article.author, category, article.publish_date
                    );
                }
            }
        }
        Some(Commands::Show { id }) => {
            let store = seed::demo_store();
            match store.article(&id) {
                Some(article) => {
                    let category = article
                        .category_id
                        .as_deref()
                        .and_then(|id| store.category(id))
                        .map(|c| c.name.as_str())
                        .unwrap_or("未分类");

                    println!("{}\n", article.title);
                    println!("  id         {}", article.id);
                    println!("  author     {}", article.author);
                    println!("  published  {}", article.publish_date);
                    println!("  url        {}", article.url);
                    println!("  category   {category}");
                    println!(
                        "  status     edited: {}, spell-checked: {}",
                        if article.is_edited { "yes" } else { "no" },
                        if article.spell_checked { "yes" } else { "no" }
                    );

                    match &article.analysis {
                        Some(analysis) => ui::render_analysis(analysis),
                        None => println!("\n  No AI review stored. Run `wepress analyze {id}`."),
                    }
                }
                None => println!("No article with id {id}."),
            }
        }
        Some(Commands::Analyze { id, raw }) => {
            let config = Config::load()?;
            let mut store = seed::demo_store();
            let analysis = agent::analyze_article(&mut store, &id, &config).await?;

            if raw {
                match &analysis.raw_response {
                    Some(text) => println!("{text}"),
                    None => println!("(no reply recorded)"),
                }
            } else {
                ui::render_analysis(&analysis);
            }
        }
        Some(Commands::Categorize) => {
            let mut store = seed::demo_store();
            let changed = store.categorize_articles()?;
            println!(
                "Auto-categorized {changed} of {} articles:\n",
                store.articles().len()
            );
            for article in store.articles() {
                let category = article
                    .category_id
                    .as_deref()
                    .and_then(|id| store.category(id))
                    .map(|c| c.name.as_str())
                    .unwrap_or("未分类");
                println!("{}  {} → {}", article.id, article.title, category);
            }
        }
        Some(Commands::Export {
            format,
            out,
            no_toc,
            include_uncategorized,
        }) => {
            let store = seed::demo_store();
            let options = ExportOptions {
                include_toc: !no_toc,
                include_uncategorized,
            };

            let path = out.unwrap_or_else(|| {
                PathBuf::from(format!("wechat-publisher-export.{format}"))
            });

            match format.as_str() {
                "doc" => Manuscript::build(&store, options).write_doc(&path)?,
                "html" => Manuscript::build(&store, options).write_html(&path)?,
                "csv" => export::write_csv(&store, &path)?,
                other => anyhow::bail!("unknown export format: {other} (expected doc, html or csv)"),
            }
            println!("Wrote {}", path.display());
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "wepress", &mut std::io::stdout());
        }
        None => {
            if atty::is(atty::Stream::Stdin) {
                let config = Config::load()?;
                ui::run(config).await?;
            } else {
                Cli::command().print_help()?;
            }
        }
    }

    Ok(())
}
