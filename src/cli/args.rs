use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pkgpicker",
    about = "Plan and apply Arch package and service changes",
    long_about = "Plan and apply Arch package and service changes.\n\n\
                  Pick repo and AUR packages, plan removals and service changes, \
                  then apply them as one confirmed, logged operation.",
    version,
    next_line_help = false,
    term_width = 80
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct GlobalFlags {
    /// Verbose output (debug diagnostics on stderr)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the repositories or the AUR (cached)
    Search {
        /// Where to search: repo or aur
        namespace: String,

        /// Search terms
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Show version, repository and description of an installed package
    Info {
        package: String,
    },

    /// Browse catalog categories, or plan catalog items for install
    Packages {
        /// Only this category
        #[arg(short = 'c', long, value_name = "NAME")]
        category: Option<String>,

        /// Only featured items
        #[arg(long)]
        featured: bool,

        /// Plan these catalog items under their catalog source
        #[arg(long = "select", value_name = "PKG", num_args = 1..)]
        select: Vec<String>,

        /// Show the batches without running them
        #[arg(long)]
        dry_run: bool,
    },

    /// List explicitly installed packages, or plan their removal
    Installed {
        /// Only packages from this source: repo or aur
        #[arg(long, value_name = "SOURCE")]
        source: Option<String>,

        /// Also show version and description
        #[arg(long)]
        info: bool,

        /// Plan removal of these explicit packages
        #[arg(long = "remove", value_name = "PKG", num_args = 1..)]
        remove: Vec<String>,

        /// Show the batch without running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate, confirm and run a plan
    Apply(ApplyArgs),

    /// Show recorded actions, newest first
    History {
        /// Maximum number of entries
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Saved plans
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// List the built-in desktop presets
    Presets,

    /// Show enabled/active state of catalog services
    Services {
        /// Only the services of this catalog target
        #[arg(long, value_name = "ID")]
        target: Option<String>,
    },

    /// Suggest GPU driver packages for this machine
    Drivers {
        /// Plan and apply the missing packages
        #[arg(long)]
        install: bool,

        /// Show the batches without running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Orphans and package cache cleanup
    Hygiene {
        #[command(subcommand)]
        command: HygieneCommand,
    },

    /// Check for optional tools
    Selfcheck,

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommand>,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct ApplyArgs {
    /// Start from a saved profile
    #[arg(short = 'p', long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Repo packages to install
    #[arg(long = "repo", value_name = "PKG", help_heading = "Plan")]
    pub repo: Vec<String>,

    /// AUR packages to install
    #[arg(long = "aur", value_name = "PKG", help_heading = "Plan")]
    pub aur: Vec<String>,

    /// Packages to remove
    #[arg(long = "remove", value_name = "PKG", help_heading = "Plan")]
    pub remove: Vec<String>,

    /// Units to enable
    #[arg(long = "enable", value_name = "UNIT", help_heading = "Plan")]
    pub enable: Vec<String>,

    /// Units to disable
    #[arg(long = "disable", value_name = "UNIT", help_heading = "Plan")]
    pub disable: Vec<String>,

    /// Built-in preset (see `pkgpicker presets`)
    #[arg(long, value_name = "ID", help_heading = "Plan")]
    pub preset: Option<String>,

    /// Catalog target whose packages to add
    #[arg(long = "target", value_name = "ID", help_heading = "Plan")]
    pub targets: Vec<String>,

    /// Write the preset's config files
    #[arg(long, help_heading = "Plan")]
    pub generate_configs: bool,

    /// Show the batches without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Save the resulting plan as a profile before applying
    #[arg(long, value_name = "NAME")]
    pub save: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// List saved profiles
    List,
    /// Print a saved profile
    Show { name: String },
}

#[derive(Subcommand, Debug)]
pub enum HygieneCommand {
    /// List unneeded dependencies
    Orphans {
        /// Plan and apply their removal
        #[arg(long)]
        remove: bool,

        /// Show the batch without running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove old package versions from the pacman cache
    Paccache,
    /// Drop the search and package info caches
    ClearCache,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print all settings
    Show,
    /// Print one setting
    Get { key: String },
    /// Change one setting
    Set { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project_identity;
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn apply_collects_repeated_flags() {
        let parsed = Cli::try_parse_from([
            project_identity::BINARY_NAME,
            "apply",
            "--repo",
            "git",
            "--repo",
            "vim",
            "--enable",
            "sshd",
            "--dry-run",
        ])
        .expect("apply should parse");
        let Some(Command::Apply(args)) = parsed.command else {
            panic!("expected apply");
        };
        assert_eq!(args.repo, vec!["git", "vim"]);
        assert_eq!(args.enable, vec!["sshd"]);
        assert!(args.dry_run);
    }

    #[test]
    fn global_yes_after_subcommand() {
        let parsed = Cli::try_parse_from([project_identity::BINARY_NAME, "hygiene", "paccache", "-y"])
            .expect("global flag should parse anywhere");
        assert!(parsed.global.yes);
    }

    #[test]
    fn installed_remove_takes_several_names() {
        let parsed = Cli::try_parse_from([
            project_identity::BINARY_NAME,
            "installed",
            "--remove",
            "nano",
            "vim",
            "--dry-run",
        ])
        .expect("installed should parse");
        let Some(Command::Installed { remove, dry_run, .. }) = parsed.command else {
            panic!("expected installed");
        };
        assert_eq!(remove, vec!["nano", "vim"]);
        assert!(dry_run);
    }

    #[test]
    fn search_requires_query() {
        let parsed = Cli::try_parse_from([project_identity::BINARY_NAME, "search", "repo"]);
        assert!(parsed.is_err());
    }
}
