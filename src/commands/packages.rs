//! Packages command
//!
//! Browses the catalog categories. `--select` plans catalog items as
//! installs under the source the catalog gives them.

use super::Context;
use super::apply::{self, ApplyCommandOptions};
use crate::config::{Catalog, PackageItem, Source};
use crate::error::{PickerError, Result};
use crate::ui as output;
use colored::Colorize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct PackagesOptions {
    pub category: Option<String>,
    pub featured: bool,
    pub select: Vec<String>,
    pub dry_run: bool,
    pub yes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow<'a> {
    pub category: &'a str,
    pub item: &'a PackageItem,
    pub installed: bool,
}

/// Catalog items in catalog order. Category names match case-insensitively.
pub fn catalog_rows<'a>(
    catalog: &'a Catalog,
    category: Option<&str>,
    featured_only: bool,
    installed: &BTreeSet<String>,
) -> Result<Vec<CatalogRow<'a>>> {
    if let Some(wanted) = category
        && !catalog
            .categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(wanted))
    {
        return Err(PickerError::ConfigError(format!(
            "Unknown category '{}'",
            wanted
        )));
    }

    Ok(catalog
        .categories
        .iter()
        .filter(|c| category.is_none_or(|wanted| c.name.eq_ignore_ascii_case(wanted)))
        .flat_map(|c| {
            c.items.iter().map(|item| CatalogRow {
                category: &c.name,
                item,
                installed: installed.contains(&item.name),
            })
        })
        .filter(|row| !featured_only || row.item.featured)
        .collect())
}

/// Split selected names into repo and AUR installs by their catalog source.
/// The first catalog entry of a name wins.
pub fn split_selection(catalog: &Catalog, names: &[String]) -> Result<(Vec<String>, Vec<String>)> {
    let mut repo = Vec::new();
    let mut aur = Vec::new();

    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let item = catalog
            .categories
            .iter()
            .flat_map(|c| c.items.iter())
            .find(|item| item.name == name)
            .ok_or_else(|| {
                PickerError::ConfigError(format!("'{}' is not in the catalog", name))
            })?;
        match item.source {
            Source::Repo => repo.push(item.name.clone()),
            Source::Aur => aur.push(item.name.clone()),
        }
    }
    Ok((repo, aur))
}

pub fn run(ctx: &Context, options: PackagesOptions) -> Result<()> {
    let catalog = ctx.catalog()?;

    if !options.select.is_empty() {
        let (repo, aur) = split_selection(&catalog, &options.select)?;
        return apply::run(
            ctx,
            ApplyCommandOptions {
                repo,
                aur,
                dry_run: options.dry_run,
                yes: options.yes,
                ..ApplyCommandOptions::default()
            },
        );
    }

    if catalog.categories.is_empty() {
        output::info("The catalog has no package categories");
        return Ok(());
    }

    let installed = ctx.host().installed_names();
    let rows = catalog_rows(
        &catalog,
        options.category.as_deref(),
        options.featured,
        &installed,
    )?;
    if rows.is_empty() {
        output::info("No matching catalog packages");
        return Ok(());
    }

    let mut current = None;
    for row in &rows {
        if current != Some(row.category) {
            output::header(row.category);
            current = Some(row.category);
        }
        let mut line = format!("{} {}", format!("{:<28}", row.item.name).bold(), row.item.source);
        if row.item.featured {
            line.push_str(&format!(" {}", "*".yellow()));
        }
        if row.installed {
            line.push_str(&format!(" {}", "[installed]".green()));
        }
        println!("{}", line);
        if !row.item.desc.is_empty() {
            output::indent(&row.item.desc, 2);
        }
        if !row.item.reason.is_empty() {
            output::indent(&format!("why: {}", row.item.reason).dimmed().to_string(), 2);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Category;

    fn catalog() -> Catalog {
        let mut yay = PackageItem::repo("yay-bin");
        yay.source = Source::Aur;
        yay.featured = true;
        yay.reason = "AUR helper".into();
        Catalog {
            categories: vec![
                Category {
                    name: "Tools".into(),
                    items: vec![PackageItem::repo("git"), yay],
                },
                Category {
                    name: "Editors".into(),
                    items: vec![PackageItem::repo("neovim"), PackageItem::repo("git")],
                },
            ],
            ..Catalog::default()
        }
    }

    #[test]
    fn rows_follow_catalog_order_and_mark_installed() {
        let catalog = catalog();
        let installed: BTreeSet<String> = ["git".to_string()].into();
        let rows = catalog_rows(&catalog, None, false, &installed).unwrap();

        let names: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.category, r.item.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Tools", "git"),
                ("Tools", "yay-bin"),
                ("Editors", "neovim"),
                ("Editors", "git")
            ]
        );
        assert!(rows[0].installed);
        assert!(!rows[1].installed);
    }

    #[test]
    fn category_and_featured_filters() {
        let catalog = catalog();
        let none = BTreeSet::new();

        let editors = catalog_rows(&catalog, Some("editors"), false, &none).unwrap();
        assert_eq!(editors.len(), 2);

        let featured = catalog_rows(&catalog, None, true, &none).unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].item.reason, "AUR helper");

        assert!(matches!(
            catalog_rows(&catalog, Some("Games"), false, &none),
            Err(PickerError::ConfigError(_))
        ));
    }

    #[test]
    fn selection_splits_by_source() {
        let (repo, aur) = split_selection(
            &catalog(),
            &["yay-bin".into(), " neovim ".into(), "git".into()],
        )
        .unwrap();
        assert_eq!(repo, vec!["neovim", "git"]);
        assert_eq!(aur, vec!["yay-bin"]);

        assert!(split_selection(&catalog(), &["firefox".into()]).is_err());
    }
}
