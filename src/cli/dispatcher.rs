//! Command dispatcher
//!
//! Routes CLI commands to their handlers.

use crate::cli::args::{ApplyArgs, Cli, Command, HygieneCommand, ProfileCommand, SettingsCommand};
use crate::commands::{self, Context};
use crate::config::Source;
use crate::error::Result;
use crate::plan::Preset;
use crate::project_identity;
use crate::ui as output;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Dispatch the parsed CLI command to its handler.
pub fn dispatch(args: &Cli, interrupt: Arc<AtomicBool>) -> Result<()> {
    let yes = args.global.yes;

    match &args.command {
        Some(Command::Search { namespace, query }) => {
            let ctx = Context::load(interrupt)?;
            commands::search::run(
                &ctx,
                commands::search::SearchOptions {
                    namespace: namespace.parse()?,
                    query: query.join(" "),
                },
            )
        }

        Some(Command::Info { package }) => commands::info::run(&Context::load(interrupt)?, package),

        Some(Command::Packages {
            category,
            featured,
            select,
            dry_run,
        }) => commands::packages::run(
            &Context::load(interrupt)?,
            commands::packages::PackagesOptions {
                category: category.clone(),
                featured: *featured,
                select: select.clone(),
                dry_run: *dry_run,
                yes,
            },
        ),

        Some(Command::Installed {
            source,
            info,
            remove,
            dry_run,
        }) => {
            let source = source.as_deref().map(str::parse::<Source>).transpose()?;
            commands::installed::run(
                &Context::load(interrupt)?,
                commands::installed::InstalledOptions {
                    source,
                    info: *info,
                    remove: remove.clone(),
                    dry_run: *dry_run,
                    yes,
                },
            )
        }

        Some(Command::Apply(apply_args)) => {
            let ctx = Context::load(interrupt)?;
            commands::apply::run(&ctx, apply_options(apply_args, yes)?)
        }

        Some(Command::History { limit }) => {
            commands::history::run(&Context::load(interrupt)?, *limit)
        }

        Some(Command::Profile { command }) => {
            let ctx = Context::load(interrupt)?;
            match command {
                ProfileCommand::List => commands::profile::list(&ctx),
                ProfileCommand::Show { name } => commands::profile::show(&ctx, name),
            }
        }

        Some(Command::Presets) => {
            commands::profile::presets();
            Ok(())
        }

        Some(Command::Services { target }) => {
            commands::services::run(&Context::load(interrupt)?, target.as_deref())
        }

        Some(Command::Drivers { install, dry_run }) => commands::drivers::run(
            &Context::load(interrupt)?,
            commands::drivers::DriverOptions {
                install: *install,
                dry_run: *dry_run,
                yes,
            },
        ),

        Some(Command::Hygiene { command }) => {
            let ctx = Context::load(interrupt)?;
            match command {
                HygieneCommand::Orphans { remove, dry_run } => {
                    commands::hygiene::orphans(&ctx, *remove, *dry_run, yes)
                }
                HygieneCommand::Paccache => commands::hygiene::paccache(&ctx, yes),
                HygieneCommand::ClearCache => commands::hygiene::clear_cache(&ctx),
            }
        }

        Some(Command::Selfcheck) => commands::selfcheck::run(&Context::load(interrupt)?),

        Some(Command::Settings { command }) => match command {
            None | Some(SettingsCommand::Show) => commands::settings::show(),
            Some(SettingsCommand::Get { key }) => commands::settings::get(key),
            Some(SettingsCommand::Set { key, value }) => commands::settings::set(key, value),
        },

        None => {
            output::info(&format!(
                "No command provided. Use '{}'.",
                project_identity::cli_with("--help")
            ));
            Ok(())
        }
    }
}

fn apply_options(args: &ApplyArgs, yes: bool) -> Result<commands::apply::ApplyCommandOptions> {
    Ok(commands::apply::ApplyCommandOptions {
        profile: args.profile.clone(),
        repo: args.repo.clone(),
        aur: args.aur.clone(),
        remove: args.remove.clone(),
        enable: args.enable.clone(),
        disable: args.disable.clone(),
        preset: args.preset.as_deref().map(str::parse::<Preset>).transpose()?,
        targets: args.targets.clone(),
        generate_configs: args.generate_configs,
        dry_run: args.dry_run,
        save: args.save.clone(),
        yes,
    })
}
