//! Vault browsing and editing commands
//!
//! Everything here works on local data only; no pipeline calls.

use super::{format_created_at, truncate};
use crate::error::{IdeaflowError, Result};
use crate::storage::{Category, Idea, RecordStore};
use crate::vault::Vault;
use crate::view::{query, IdeaFilter, Scope, SortOrder, VaultStats};
use colored::Colorize;
use prettytable::{format, row, Table};

/// Build a filter from `list` flags
pub fn build_filter(
    search: Option<String>,
    category: Option<&str>,
    favorites: bool,
) -> Result<IdeaFilter> {
    let scope = match category {
        Some(name) => Scope::Category(name.parse::<Category>()?),
        None if favorites => Scope::Favorites,
        None => Scope::All,
    };

    Ok(IdeaFilter { search, scope })
}

/// Print matching ideas as a table or JSON
pub fn list_ideas<S: RecordStore>(
    vault: &Vault<S>,
    filter: &IdeaFilter,
    order: SortOrder,
    json: bool,
) -> Result<()> {
    let ideas = vault.get_ideas();
    let selected = query(&ideas, filter, order);
    tracing::debug!(total = ideas.len(), shown = selected.len(), "Listing ideas");

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    if selected.is_empty() {
        if ideas.is_empty() {
            println!("{}", "Your vault is empty.".yellow());
            println!(
                "Use {} to capture your first idea.",
                "ideaflow capture --text \"...\"".cyan()
            );
        } else {
            println!("{}", "No ideas match your filters.".yellow());
        }
        return Ok(());
    }

    println!("\nIdea Vault:");
    ideas_table(&selected).printstd();
    println!();
    println!("Use {} to read one in full.", "ideaflow show <ID>".cyan());
    println!();

    Ok(())
}

fn ideas_table(ideas: &[&Idea]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(row![
        "ID".bold(),
        "".bold(),
        "Title".bold(),
        "Category".bold(),
        "Tags".bold(),
        "Created".bold()
    ]);

    for idea in ideas {
        let favorite = if idea.is_favorite { "★" } else { "" };
        let tags = truncate(&idea.tags.join(", "), 30);

        table.add_row(row![
            idea.short_id().cyan(),
            favorite.yellow(),
            truncate(&idea.title, 40),
            idea.category,
            tags,
            format_created_at(idea)
        ]);
    }

    table
}

/// Print one idea in full
pub fn show_idea<S: RecordStore>(vault: &Vault<S>, id: &str, json: bool) -> Result<()> {
    let idea = vault.find_idea(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&idea)?);
        return Ok(());
    }

    print!("{}", render_idea(&idea));
    Ok(())
}

fn render_idea(idea: &Idea) -> String {
    let mut out = String::new();
    let star = if idea.is_favorite { " ★" } else { "" };

    out.push_str(&format!("\n{}{}\n", idea.title.bold(), star.yellow()));
    out.push_str(&format!(
        "{} {}  {} {}  {} {}\n",
        "id:".dimmed(),
        idea.id,
        "category:".dimmed(),
        idea.category,
        "created:".dimmed(),
        format_created_at(idea)
    ));

    if !idea.tags.is_empty() {
        let tags: Vec<String> = idea.tags.iter().map(|t| format!("#{}", t)).collect();
        out.push_str(&format!("{}\n", tags.join(" ").cyan()));
    }

    out.push_str(&format!("\n{}\n{}\n", "Summary".bold(), idea.summary));

    if !idea.action_items.is_empty() {
        out.push_str(&format!("\n{}\n", "Action Items".bold()));
        for item in &idea.action_items {
            out.push_str(&format!("  - {}\n", item));
        }
    }

    out.push_str(&format!("\n{}\n{}\n", "Transcript".bold(), idea.transcript));

    if let Some(expansion) = &idea.expansion {
        out.push_str(&format!("\n{}\n{}\n", "Deep Dive".bold(), expansion));
    }

    if let Some(image) = &idea.image_url {
        out.push_str(&format!(
            "\n{} embedded ({} bytes)\n",
            "Illustration:".dimmed(),
            image.len()
        ));
    }

    out
}

/// Change title and/or transcript
pub fn edit_idea<S: RecordStore>(
    vault: &Vault<S>,
    id: &str,
    title: Option<String>,
    transcript: Option<String>,
) -> Result<()> {
    if title.is_none() && transcript.is_none() {
        return Err(IdeaflowError::Config(
            "Nothing to edit: pass --title and/or --transcript".to_string(),
        )
        .into());
    }

    let idea = vault.find_idea(id)?;
    match vault.edit_idea(&idea.id, title, transcript)? {
        Some(updated) => println!("{}", format!("Updated \"{}\"", updated.title).green()),
        None => println!("{}", format!("Idea {} no longer exists", idea.short_id()).yellow()),
    }

    Ok(())
}

/// Flip the favorite flag
pub fn toggle_favorite<S: RecordStore>(vault: &Vault<S>, id: &str) -> Result<()> {
    let idea = vault.find_idea(id)?;
    match vault.toggle_favorite(&idea.id)? {
        Some(true) => println!("{}", format!("★ Favorited \"{}\"", idea.title).yellow()),
        Some(false) => println!("Removed \"{}\" from favorites", idea.title),
        None => println!("{}", format!("Idea {} no longer exists", idea.short_id()).yellow()),
    }

    Ok(())
}

/// Remove an idea
pub fn delete_idea<S: RecordStore>(vault: &Vault<S>, id: &str) -> Result<()> {
    let idea = vault.find_idea(id)?;
    vault.delete_idea(&idea.id)?;
    println!("{}", format!("Deleted idea {}", idea.short_id()).green());
    Ok(())
}

/// Print dashboard numbers
pub fn show_stats<S: RecordStore>(vault: &Vault<S>, json: bool) -> Result<()> {
    let stats = VaultStats::from_ideas(&vault.get_ideas());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    stats_table(&stats).printstd();
    Ok(())
}

fn stats_table(stats: &VaultStats) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(row!["Total ideas".bold(), stats.total]);
    table.add_row(row!["Favorites".bold(), stats.favorites]);
    table.add_row(row!["Action items".bold(), stats.action_items]);
    table.add_row(row!["With illustration".bold(), stats.with_image]);
    table.add_row(row!["With deep dive".bold(), stats.with_expansion]);
    for (category, count) in &stats.by_category {
        table.add_row(row![category.to_string().cyan(), count]);
    }

    table
}
