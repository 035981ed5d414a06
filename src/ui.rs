//! Interactive terminal session.
//!
//! Navigation is an explicit state machine: every page renders, asks, and
//! hands the next [`Page`] back to the loop, with page parameters carried in
//! the variant. Nothing here talks to the terminal except through dialoguer
//! prompts and colored prints, so the flow stays linear and easy to follow.

use crate::agent;
use crate::analysis::{Analysis, Sentiment};
use crate::article::{Article, Category};
use crate::config::Config;
use crate::export::{self, ExportOptions, Manuscript};
use crate::seed;
use crate::session::Session;
use crate::spellcheck;
use crate::store::{ArticleFilter, ArticleStore, StatusFilter, StoreError};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Editor, Input, Password, Select};

/// Where the session goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Connect,
    Dashboard,
    Articles,
    Categories,
    Editor { article_id: String },
    Export,
    Settings,
    Quit,
}

/// Run the interactive session until the user quits.
pub async fn run(mut config: Config) -> anyhow::Result<()> {
    let mut session: Option<Session> = None;
    let mut page = Page::Connect;

    loop {
        page = match page {
            Page::Quit => break,
            Page::Connect => {
                // entering the connect page drops any previous session
                session = None;
                match connect_page()? {
                    Some(opened) => {
                        session = Some(opened);
                        Page::Dashboard
                    }
                    None => Page::Quit,
                }
            }
            Page::Settings => settings_page(&mut config)?,
            current => match session.as_mut() {
                None => Page::Connect,
                Some(active) => match current {
                    Page::Dashboard => dashboard_page(active)?,
                    Page::Articles => articles_page(active)?,
                    Page::Categories => categories_page(active)?,
                    Page::Editor { article_id } => {
                        editor_page(active, &article_id, &config).await?
                    }
                    Page::Export => export_page(active)?,
                    // Connect, Settings and Quit are routed above
                    _ => Page::Connect,
                },
            },
        };
    }

    println!("Goodbye!");
    Ok(())
}

fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

/// Credential form. `None` means the user gave up instead of connecting.
fn connect_page() -> anyhow::Result<Option<Session>> {
    println!();
    println!("{}", "WeChat Publisher".bold());
    println!("{}", "Connect your official account to begin.".dimmed());
    println!(
        "{}",
        "For demonstration purposes, any non-empty values are accepted.".dimmed()
    );

    loop {
        let app_id: String = Input::with_theme(&theme())
            .with_prompt("AppID")
            .allow_empty(true)
            .interact_text()?;
        let app_secret = Password::with_theme(&theme())
            .with_prompt("App Secret")
            .allow_empty_password(true)
            .interact()?;

        match Session::connect(&app_id, &app_secret) {
            Ok(session) => {
                println!(
                    "{} fetched {} articles from the platform",
                    "Connected:".green().bold(),
                    session.store.articles().len()
                );
                return Ok(Some(session));
            }
            Err(e) => {
                eprintln!("{} {e}", "Error:".red().bold());
                let retry = Confirm::with_theme(&theme())
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()?;
                if !retry {
                    return Ok(None);
                }
            }
        }
    }
}

fn dashboard_page(session: &mut Session) -> anyhow::Result<Page> {
    let counts = session.store.counts();

    println!();
    println!("{} · {}", "Dashboard".bold(), session.app_id.dimmed());
    println!("  Articles       {}", counts.articles);
    println!("  Categories     {}", session.store.categories().len());
    println!("  Categorized    {}/{}", counts.categorized, counts.articles);
    println!("  Spell-checked  {}/{}", counts.spell_checked, counts.articles);

    let mut recent: Vec<&Article> = session.store.articles().iter().collect();
    recent.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
    if !recent.is_empty() {
        println!("\n  {}", "Recent articles".bold());
        for article in recent.iter().take(5) {
            println!(
                "  {} {}  {}",
                status_markers(article),
                article.publish_date,
                article.title
            );
        }
    }

    let actions = [
        "Articles",
        "Categories",
        "Export",
        "Settings",
        "Fetch articles",
        "Auto-categorize",
        "Disconnect",
        "Quit",
    ];
    let choice = Select::with_theme(&theme())
        .with_prompt("Where to?")
        .items(&actions)
        .default(0)
        .interact()?;

    Ok(match choice {
        0 => Page::Articles,
        1 => Page::Categories,
        2 => Page::Export,
        3 => Page::Settings,
        4 => {
            let added = seed::fetch_batch(&mut session.store)?;
            println!("Fetched {added} articles from the platform.");
            Page::Dashboard
        }
        5 => {
            let changed = session.store.categorize_articles()?;
            println!("Auto-categorized {changed} articles.");
            Page::Dashboard
        }
        6 => Page::Connect,
        _ => Page::Quit,
    })
}

fn articles_page(session: &mut Session) -> anyhow::Result<Page> {
    let mut filter = ArticleFilter::default();

    loop {
        let listed: Vec<(String, String)> = session
            .store
            .find_articles(&filter)
            .iter()
            .map(|article| {
                (
                    article.id.clone(),
                    format!(
                        "{} {}  {} · {}",
                        status_markers(article),
                        article.id,
                        article.title,
                        article.author
                    ),
                )
            })
            .collect();

        println!();
        println!(
            "{} ({} of {} shown)",
            "Articles".bold(),
            listed.len(),
            session.store.articles().len()
        );

        let mut items: Vec<String> = listed.iter().map(|(_, line)| line.clone()).collect();
        items.push("Search…".to_string());
        items.push("Filter by status…".to_string());
        items.push("Filter by category…".to_string());
        items.push("Clear filters".to_string());
        items.push("Back".to_string());

        let choice = Select::with_theme(&theme())
            .with_prompt("Open an article or adjust the list")
            .items(&items)
            .default(0)
            .interact()?;

        if choice < listed.len() {
            return Ok(Page::Editor {
                article_id: listed[choice].0.clone(),
            });
        }

        match choice - listed.len() {
            0 => {
                let term: String = Input::with_theme(&theme())
                    .with_prompt("Search title or author")
                    .allow_empty(true)
                    .interact_text()?;
                filter.search = if term.is_empty() { None } else { Some(term) };
            }
            1 => {
                let options = ["All", "Edited", "Raw", "Spell-checked"];
                let picked = Select::with_theme(&theme())
                    .with_prompt("Status")
                    .items(&options)
                    .default(0)
                    .interact()?;
                filter.status = match picked {
                    1 => StatusFilter::Edited,
                    2 => StatusFilter::Raw,
                    3 => StatusFilter::SpellChecked,
                    _ => StatusFilter::All,
                };
            }
            2 => {
                let mut names = vec!["All categories".to_string()];
                names.extend(session.store.categories().iter().map(|c| c.name.clone()));
                let picked = Select::with_theme(&theme())
                    .with_prompt("Category")
                    .items(&names)
                    .default(0)
                    .interact()?;
                filter.category = if picked == 0 {
                    None
                } else {
                    session
                        .store
                        .categories()
                        .get(picked - 1)
                        .map(|c| c.id.clone())
                };
            }
            3 => filter = ArticleFilter::default(),
            _ => return Ok(Page::Dashboard),
        }
    }
}

fn categories_page(session: &mut Session) -> anyhow::Result<Page> {
    loop {
        println!();
        println!("{}", "Categories".bold());

        let listed: Vec<(String, String)> = session
            .store
            .categories()
            .iter()
            .map(|category| {
                let count = session.store.category_article_count(&category.id);
                (
                    category.id.clone(),
                    format!(
                        "{} {}  {} articles",
                        swatch(category.color.as_deref()),
                        category.name,
                        count
                    ),
                )
            })
            .collect();

        let mut items: Vec<String> = listed.iter().map(|(_, line)| line.clone()).collect();
        items.push("Add category".to_string());
        items.push("Back".to_string());

        let choice = Select::with_theme(&theme())
            .with_prompt("Pick a category to manage")
            .items(&items)
            .default(0)
            .interact()?;

        if choice < listed.len() {
            manage_category(session, &listed[choice].0)?;
            continue;
        }

        if choice == listed.len() {
            let name: String = Input::with_theme(&theme())
                .with_prompt("Name")
                .allow_empty(true)
                .interact_text()?;
            if name.is_empty() {
                println!("{}", "A category needs a name.".yellow());
                continue;
            }
            let description: String = Input::with_theme(&theme())
                .with_prompt("Description")
                .allow_empty(true)
                .interact_text()?;
            let color = prompt_hex_color(DEFAULT_CATEGORY_COLOR.to_string())?;

            let category = Category {
                id: chrono::Local::now().timestamp_millis().to_string(),
                name,
                description: if description.is_empty() {
                    None
                } else {
                    Some(description)
                },
                order: session.store.categories().len() as u32 + 1,
                color: Some(color),
            };
            session.store.add_category(category)?;
            continue;
        }

        return Ok(Page::Dashboard);
    }
}

fn manage_category(session: &mut Session, category_id: &str) -> anyhow::Result<()> {
    let actions = ["Rename", "Edit description", "Set color", "Delete", "Back"];
    let choice = Select::with_theme(&theme())
        .with_prompt("Category")
        .items(&actions)
        .default(0)
        .interact()?;

    match choice {
        0 => {
            let name: String = Input::with_theme(&theme())
                .with_prompt("New name")
                .allow_empty(true)
                .interact_text()?;
            if !name.is_empty() {
                session.store.update_category(category_id, &mut |category| {
                    category.name = name.clone();
                })?;
            }
        }
        1 => {
            let current = session
                .store
                .category(category_id)
                .and_then(|c| c.description.clone())
                .unwrap_or_default();
            let description: String = Input::with_theme(&theme())
                .with_prompt("Description")
                .with_initial_text(current)
                .allow_empty(true)
                .interact_text()?;
            session.store.update_category(category_id, &mut |category| {
                category.description = if description.is_empty() {
                    None
                } else {
                    Some(description.clone())
                };
            })?;
        }
        2 => {
            let current = session
                .store
                .category(category_id)
                .and_then(|c| c.color.clone())
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string());
            let color = prompt_hex_color(current)?;
            session.store.update_category(category_id, &mut |category| {
                category.color = Some(color.clone());
            })?;
        }
        3 => {
            let confirmed = Confirm::with_theme(&theme())
                .with_prompt("Delete this category? Its articles keep their content and lose the assignment.")
                .default(false)
                .interact()?;
            if confirmed {
                session.store.delete_category(category_id)?;
            }
        }
        _ => {}
    }
    Ok(())
}

async fn editor_page(
    session: &mut Session,
    article_id: &str,
    config: &Config,
) -> anyhow::Result<Page> {
    loop {
        let article = match session.store.article(article_id) {
            Some(article) => article.clone(),
            None => {
                println!("{}", "Article is gone. Returning to the list.".yellow());
                return Ok(Page::Articles);
            }
        };

        let category_name = article
            .category_id
            .as_deref()
            .and_then(|id| session.store.category(id))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "未分类".to_string());

        println!();
        println!("{} {}", status_markers(&article), article.title.bold());
        println!(
            "  {} · {} · {}",
            article.author,
            article.publish_date,
            category_name
        );
        println!("  {}", article.url.dimmed());
        if let Some(analysis) = &article.analysis {
            render_analysis(analysis);
        }

        let actions = [
            "Run AI review",
            "Spell check",
            "Edit title",
            "Edit content",
            "Assign category",
            "Delete article",
            "Back to articles",
        ];
        let choice = Select::with_theme(&theme())
            .with_prompt("Editor")
            .items(&actions)
            .default(0)
            .interact()?;

        match choice {
            0 => {
                println!("Reviewing…");
                let analysis = agent::analyze_article(&mut session.store, article_id, config).await?;
                render_analysis(&analysis);
            }
            1 => {
                let issues = spellcheck::check(&article.content);
                if issues.is_empty() {
                    println!("No issues found.");
                } else {
                    for issue in &issues {
                        println!(
                            "  {}  {} (chars {}..{})",
                            issue.word.red(),
                            issue.suggestions.join(" / "),
                            issue.start,
                            issue.end
                        );
                    }
                }
                let (prompt, default_choice) = if article.spell_checked {
                    ("Clear the spell-checked flag?", false)
                } else {
                    ("Mark the article as spell-checked?", true)
                };
                let flip = Confirm::with_theme(&theme())
                    .with_prompt(prompt)
                    .default(default_choice)
                    .interact()?;
                if flip {
                    spellcheck::toggle(&mut session.store, article_id)?;
                }
            }
            2 => {
                let title: String = Input::with_theme(&theme())
                    .with_prompt("Title")
                    .with_initial_text(article.title.clone())
                    .allow_empty(true)
                    .interact_text()?;
                if !title.is_empty() && title != article.title {
                    let today = chrono::Local::now().date_naive();
                    session.store.update_article(article_id, &mut |a| {
                        a.title = title.clone();
                        a.is_edited = true;
                        a.last_edited = Some(today);
                    })?;
                }
            }
            3 => {
                let edited = Editor::new().extension(".html").edit(&article.content)?;
                match edited {
                    Some(content) => {
                        if save_content_edit(&mut session.store, article_id, content)? {
                            println!("Content updated.");
                        }
                    }
                    None => println!("Content left unchanged."),
                }
            }
            4 => {
                let mut names = vec!["None".to_string()];
                names.extend(session.store.categories().iter().map(|c| c.name.clone()));
                let picked = Select::with_theme(&theme())
                    .with_prompt("Category")
                    .items(&names)
                    .default(0)
                    .interact()?;
                let assigned = if picked == 0 {
                    None
                } else {
                    session
                        .store
                        .categories()
                        .get(picked - 1)
                        .map(|c| c.id.clone())
                };
                session.store.update_article(article_id, &mut |a| {
                    a.category_id = assigned.clone();
                })?;
            }
            5 => {
                let confirmed = Confirm::with_theme(&theme())
                    .with_prompt("Delete this article?")
                    .default(false)
                    .interact()?;
                if confirmed {
                    session.store.delete_article(article_id)?;
                    return Ok(Page::Articles);
                }
            }
            _ => return Ok(Page::Articles),
        }
    }
}

/// Persist an edited body onto the article, marking the edit. A body
/// identical to the stored one writes nothing. Returns whether it wrote.
fn save_content_edit(
    store: &mut dyn ArticleStore,
    id: &str,
    content: String,
) -> Result<bool, StoreError> {
    if store.article(id).is_some_and(|a| a.content == content) {
        return Ok(false);
    }
    let today = chrono::Local::now().date_naive();
    store.update_article(id, &mut |a| {
        a.content = content.clone();
        a.is_edited = true;
        a.last_edited = Some(today);
    })?;
    Ok(true)
}

fn export_page(session: &mut Session) -> anyhow::Result<Page> {
    let include_toc = Confirm::with_theme(&theme())
        .with_prompt("Include table of contents?")
        .default(true)
        .interact()?;
    let include_uncategorized = Confirm::with_theme(&theme())
        .with_prompt("Include uncategorized articles?")
        .default(false)
        .interact()?;
    let options = ExportOptions {
        include_toc,
        include_uncategorized,
    };

    let manuscript = Manuscript::build(&session.store, options);
    let stats = manuscript.stats;
    println!();
    println!("{}", "Manuscript".bold());
    println!("  Chapters       {}", stats.chapters);
    println!("  Articles       {}", stats.articles);
    println!("  Edited         {}", stats.edited);
    println!("  Spell-checked  {}", stats.spell_checked);
    println!("  Uncategorized  {}", stats.uncategorized);

    let formats = ["Word (.doc)", "HTML", "CSV index", "Cancel"];
    let format = Select::with_theme(&theme())
        .with_prompt("Export format")
        .items(&formats)
        .default(0)
        .interact()?;
    if format == 3 {
        return Ok(Page::Dashboard);
    }

    let default_name = match format {
        0 => "wechat-publisher-export.doc",
        1 => "wechat-publisher-export.html",
        _ => "wechat-publisher-export.csv",
    };
    let path: String = Input::with_theme(&theme())
        .with_prompt("Output file")
        .with_initial_text(default_name)
        .interact_text()?;
    let path = std::path::PathBuf::from(path);

    match format {
        0 => manuscript.write_doc(&path)?,
        1 => manuscript.write_html(&path)?,
        _ => export::write_csv(&session.store, &path)?,
    }
    println!(
        "{} wrote {}",
        "Export complete:".green().bold(),
        path.display()
    );
    Ok(Page::Dashboard)
}

fn settings_page(config: &mut Config) -> anyhow::Result<Page> {
    loop {
        println!();
        println!("{}", "Settings".bold());
        println!(
            "  Review provider: {} · model: {}",
            config.agent.provider.bold(),
            config.agent.model
        );
        println!(
            "{}",
            "  Changes apply to this session; edit wepress.toml to persist them.".dimmed()
        );

        let provider_lines: Vec<String> = config
            .providers
            .iter()
            .map(|p| {
                let state = if p.enabled {
                    "enabled".green()
                } else {
                    "disabled".dimmed()
                };
                let key = if p.api_key.is_empty() {
                    "no key".yellow()
                } else {
                    "key set".green()
                };
                format!("{}  {state} · {key}", p.name)
            })
            .collect();

        let mut items = provider_lines;
        items.push("Choose review provider".to_string());
        items.push("Set model".to_string());
        items.push("Back".to_string());

        let choice = Select::with_theme(&theme())
            .with_prompt("Settings")
            .items(&items)
            .default(0)
            .interact()?;

        if choice < config.providers.len() {
            let name = config.providers[choice].name.clone();
            let enabled = Confirm::with_theme(&theme())
                .with_prompt(format!("Enable {name}?"))
                .default(config.providers[choice].enabled)
                .interact()?;
            let key = Password::with_theme(&theme())
                .with_prompt("API key (leave empty to keep the current one)")
                .allow_empty_password(true)
                .interact()?;

            let entry = config.provider_mut(&name)?;
            entry.enabled = enabled;
            if !key.is_empty() {
                entry.api_key = key;
            }
            continue;
        }

        match choice - config.providers.len() {
            0 => {
                let mut names = vec!["mock".to_string()];
                names.extend(config.providers.iter().map(|p| p.name.clone()));
                let picked = Select::with_theme(&theme())
                    .with_prompt("Review with")
                    .items(&names)
                    .default(0)
                    .interact()?;
                config.agent.provider = names[picked].clone();
            }
            1 => {
                let model: String = Input::with_theme(&theme())
                    .with_prompt("Model")
                    .with_initial_text(config.agent.model.clone())
                    .allow_empty(true)
                    .interact_text()?;
                if !model.is_empty() {
                    config.agent.model = model;
                }
            }
            _ => return Ok(Page::Dashboard),
        }
    }
}

fn status_markers(article: &Article) -> String {
    let edited = if article.is_edited {
        "E".yellow()
    } else {
        "·".dimmed()
    };
    let checked = if article.spell_checked {
        "S".green()
    } else {
        "·".dimmed()
    };
    format!("[{edited}{checked}]")
}

/// Render the analysis block the way the editor shows it.
pub fn render_analysis(analysis: &Analysis) {
    println!("  {}", "AI review".bold());
    println!("    Suggested title  {}", analysis.suggested_title);
    println!(
        "    Readability      {} {}",
        readability_bar(analysis.readability_score),
        analysis.readability_score
    );
    println!(
        "    Sentiment        {}",
        sentiment_label(analysis.sentiment)
    );
    if !analysis.content_suggestions.is_empty() {
        println!("    Suggestions");
        for suggestion in &analysis.content_suggestions {
            println!("      - {suggestion}");
        }
    }
}

fn readability_bar(score: u8) -> String {
    let filled = usize::from(score / 10).min(10);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled));
    match score {
        0 => bar.dimmed().to_string(),
        1..=49 => bar.red().to_string(),
        50..=79 => bar.yellow().to_string(),
        _ => bar.green().to_string(),
    }
}

fn sentiment_label(sentiment: Sentiment) -> colored::ColoredString {
    match sentiment {
        Sentiment::Positive => "positive".green(),
        Sentiment::Neutral => "neutral".normal(),
        Sentiment::Negative => "negative".red(),
    }
}

/// Starting swatch for a category that has not picked a color yet
const DEFAULT_CATEGORY_COLOR: &str = "#718096";

/// Ask for a hex color, starting from `initial`. Input must parse as one.
fn prompt_hex_color(initial: String) -> anyhow::Result<String> {
    let color: String = Input::with_theme(&theme())
        .with_prompt("Hex color")
        .with_initial_text(initial)
        .validate_with(|input: &String| -> Result<(), &str> {
            if parse_hex_color(input).is_some() {
                Ok(())
            } else {
                Err("expected a color like #4299E1")
            }
        })
        .interact_text()?;
    Ok(color)
}

fn swatch(color: Option<&str>) -> String {
    match color.and_then(parse_hex_color) {
        Some((r, g, b)) => "■".truecolor(r, g, b).to_string(),
        None => "■".dimmed().to_string(),
    }
}

fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::demo_store;

    #[test]
    fn hex_swatch_colors_parse() {
        assert_eq!(parse_hex_color("#4299E1"), Some((0x42, 0x99, 0xE1)));
        assert_eq!(parse_hex_color("#A0AEC0"), Some((0xA0, 0xAE, 0xC0)));
        assert_eq!(parse_hex_color("4299E1"), None);
        assert_eq!(parse_hex_color("#42"), None);
        assert_eq!(parse_hex_color("#哈哈"), None);
    }

    #[test]
    fn content_edit_persists_and_marks_the_article_edited() {
        let mut store = demo_store();
        assert!(!store.article("1").unwrap().is_edited);

        let wrote = save_content_edit(&mut store, "1", "<p>新正文</p>".to_string()).unwrap();
        assert!(wrote);

        let article = store.article("1").unwrap();
        assert_eq!(article.content, "<p>新正文</p>");
        assert!(article.is_edited);
        assert!(article.last_edited.is_some());
    }

    #[test]
    fn unchanged_content_does_not_count_as_an_edit() {
        let mut store = demo_store();
        let original = store.article("1").unwrap().content.clone();

        let wrote = save_content_edit(&mut store, "1", original).unwrap();
        assert!(!wrote);
        assert!(!store.article("1").unwrap().is_edited);
    }
}
