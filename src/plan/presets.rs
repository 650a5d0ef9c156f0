//! Built-in desktop presets: greetd + tuigreet plus a Wayland session.

use crate::error::{PickerError, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const BASE_SERVICE_UNIT: &str = "greetd.service";

const COMMON_PACKAGES: &[&str] = &["greetd", "tuigreet"];

const HYPRLAND_PACKAGES: &[&str] = &[
    "hyprland",
    "xorg-xwayland",
    "kitty",
    "waybar",
    "wofi",
    "mako",
    "hyprpaper",
    "wl-clipboard",
    "cliphist",
    "grim",
    "slurp",
    "pipewire",
    "wireplumber",
    "pipewire-pulse",
    "xdg-desktop-portal",
    "xdg-desktop-portal-wlr",
    "qt6-wayland",
    "qt5-wayland",
];

const PLASMA_PACKAGES: &[&str] = &[
    "plasma-meta",
    "konsole",
    "xdg-desktop-portal",
    "xdg-desktop-portal-kde",
    "qt6-wayland",
    "qt5-wayland",
    "pipewire",
    "wireplumber",
    "pipewire-pulse",
];

const GREETD_CONFIG: &str = "/etc/greetd/config.toml";

const HYPRLAND_USER_CONFIG: &str = "~/.config/hypr/hyprland.conf";

const HYPRLAND_CONF: &str = "\
# Generated by pkgpicker
monitor = ,preferred,auto,1

exec-once = waybar
exec-once = mako
exec-once = hyprpaper
exec-once = wl-paste --watch cliphist store

$terminal = kitty
$menu = wofi --show drun

bind = SUPER, Return, exec, $terminal
bind = SUPER, D, exec, $menu
bind = SUPER, Q, killactive,
bind = SUPER SHIFT, E, exit,
bind = SUPER SHIFT, S, exec, grim -g \"$(slurp)\"
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    HyprlandTuigreet,
    PlasmaTuigreet,
}

/// Where a generated file is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteScope {
    /// System path, written through the elevated writer.
    Privileged,
    /// Below `~`, written as the current user.
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub content: String,
}

impl ConfigFile {
    fn new(path: &str, content: String) -> Self {
        Self {
            path: PathBuf::from(path),
            content,
        }
    }

    pub fn scope(&self) -> WriteScope {
        if self.path.starts_with("~") {
            WriteScope::User
        } else {
            WriteScope::Privileged
        }
    }
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::HyprlandTuigreet, Preset::PlasmaTuigreet];

    pub fn id(self) -> &'static str {
        match self {
            Self::HyprlandTuigreet => "hyprland-tuigreet",
            Self::PlasmaTuigreet => "plasma-tuigreet",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::HyprlandTuigreet => "Hyprland Wayland stack with greetd + tuigreet",
            Self::PlasmaTuigreet => "Plasma Wayland session with greetd + tuigreet",
        }
    }

    /// Greeter packages followed by the desktop stack.
    pub fn packages(self) -> Vec<String> {
        let stack = match self {
            Self::HyprlandTuigreet => HYPRLAND_PACKAGES,
            Self::PlasmaTuigreet => PLASMA_PACKAGES,
        };
        COMMON_PACKAGES
            .iter()
            .chain(stack.iter())
            .map(|s| s.to_string())
            .collect()
    }

    fn session_command(self) -> &'static str {
        match self {
            Self::HyprlandTuigreet => "Hyprland",
            Self::PlasmaTuigreet => "startplasma-wayland",
        }
    }

    /// Files written when config generation is on.
    pub fn config_files(self) -> Vec<ConfigFile> {
        let greetd = format!(
            "# Generated by pkgpicker\n\
             [terminal]\n\
             vt = 1\n\
             \n\
             [default_session]\n\
             command = \"tuigreet --time --remember --cmd {}\"\n\
             user = \"greeter\"\n",
            self.session_command()
        );

        let mut files = vec![ConfigFile::new(GREETD_CONFIG, greetd)];
        if self == Self::HyprlandTuigreet {
            files.push(ConfigFile::new(
                HYPRLAND_USER_CONFIG,
                HYPRLAND_CONF.to_string(),
            ));
        }
        files
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Preset {
    type Err = PickerError;

    /// Accepts the preset id or the short desktop name used by targets.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hyprland-tuigreet" | "hyprland" => Ok(Self::HyprlandTuigreet),
            "plasma-tuigreet" | "plasma" => Ok(Self::PlasmaTuigreet),
            other => Err(PickerError::ConfigError(format!(
                "Unknown preset '{}'. Valid: hyprland-tuigreet, plasma-tuigreet",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packages_start_with_greeter() {
        for preset in Preset::ALL {
            let pkgs = preset.packages();
            assert_eq!(&pkgs[..2], &["greetd".to_string(), "tuigreet".to_string()]);
        }
        assert!(Preset::HyprlandTuigreet.packages().contains(&"hyprland".to_string()));
        assert!(Preset::PlasmaTuigreet.packages().contains(&"plasma-meta".to_string()));
    }

    #[test]
    fn ids_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(preset.id().parse::<Preset>().unwrap(), preset);
        }
        assert_eq!("plasma".parse::<Preset>().unwrap(), Preset::PlasmaTuigreet);
        assert!("gnome".parse::<Preset>().is_err());
    }

    #[test]
    fn config_files_split_by_scope() {
        let files = Preset::HyprlandTuigreet.config_files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].scope(), WriteScope::Privileged);
        assert!(files[0].content.contains("--cmd Hyprland"));
        assert_eq!(files[1].scope(), WriteScope::User);

        let plasma = Preset::PlasmaTuigreet.config_files();
        assert_eq!(plasma.len(), 1);
        assert!(plasma[0].content.contains("--cmd startplasma-wayland"));
    }
}
