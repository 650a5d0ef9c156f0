use crate::error::{PickerError, Result};
use crate::utils::paths::expand_home;
use crate::utils::platform::{Elevation, shell_argv};
use crate::utils::sanitize::sh_quote;
use std::fs;
use std::path::{Path, PathBuf};

/// Backup suffix timestamp. Microseconds keep back-to-back writes distinct.
pub fn backup_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d-%H%M%S%.6f").to_string()
}

fn backup_name(path: &Path, stamp: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".bak-{}", stamp));
    PathBuf::from(name)
}

/// Script that backs up, ensures the parent dir, then writes `content`.
///
/// Every interpolated value is quoted with [`sh_quote`]; the content goes
/// through `printf '%s'` so it is written byte for byte.
pub(super) fn privileged_write_script(path: &Path, content: &str, stamp: &str) -> String {
    let target = sh_quote(&path.to_string_lossy());
    let backup = sh_quote(&backup_name(path, stamp).to_string_lossy());
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string());

    format!(
        "set -e\n\
         target={target}\n\
         if [ -f \"$target\" ]; then\n\
         \x20 backup={backup}\n\
         \x20 n=0\n\
         \x20 while [ -e \"$backup\" ]; do n=$((n+1)); backup={backup}.\"$n\"; done\n\
         \x20 cp -p \"$target\" \"$backup\"\n\
         fi\n\
         install -d -m 0755 {parent}\n\
         printf '%s' {content} > \"$target\"\n",
        target = target,
        backup = backup,
        parent = sh_quote(&parent),
        content = sh_quote(content),
    )
}

pub(super) fn privileged_write_argv(path: &Path, content: &str, elevation: Elevation) -> Vec<String> {
    let script = privileged_write_script(path, content, &backup_timestamp());
    shell_argv(&script, elevation)
}

pub(super) fn user_write(path: &Path, content: &str) -> Result<PathBuf> {
    let path = expand_home(path)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| PickerError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    if path.is_file() {
        let backup = unique_backup_path(&path);
        fs::copy(&path, &backup).map_err(|e| PickerError::IoError {
            path: backup.clone(),
            source: e,
        })?;
        tracing::info!(backup = %backup.display(), "kept previous version");
    }

    fs::write(&path, content).map_err(|e| PickerError::IoError {
        path: path.clone(),
        source: e,
    })?;

    Ok(path)
}

fn unique_backup_path(path: &Path) -> PathBuf {
    let base = backup_name(path, &backup_timestamp());
    if !base.exists() {
        return base;
    }
    let mut n = 1u32;
    loop {
        let mut candidate = base.as_os_str().to_owned();
        candidate.push(format!(".{}", n));
        let candidate = PathBuf::from(candidate);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{CommandGateway, SystemGateway};
    use tempfile::tempdir;

    fn backups_of(dir: &Path, file_name: &str) -> Vec<PathBuf> {
        let prefix = format!("{}.bak-", file_name);
        let mut found: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        found.sort();
        found
    }

    #[test]
    fn script_quotes_hostile_values() {
        let script = privileged_write_script(
            Path::new("/etc/it's here/conf"),
            "$(reboot)\n'quoted'",
            "20260101-000000.000001",
        );
        assert!(script.contains("target='/etc/it'\"'\"'s here/conf'"));
        assert!(script.contains("printf '%s' '$(reboot)"));
        assert!(script.contains("install -d -m 0755 '/etc/it'\"'\"'s here'"));
    }

    #[test]
    fn privileged_write_keeps_previous_version() {
        let dir = tempdir().expect("tempdir");
        let target = dir.path().join("nested").join("config.toml");
        let gw = SystemGateway::new(Elevation::None);

        let first = gw.privileged_write(&target, "A");
        assert!(first.success(), "{}", first.output);
        assert!(backups_of(&target.parent().unwrap(), "config.toml").is_empty());

        let second = gw.privileged_write(&target, "B");
        assert!(second.success(), "{}", second.output);
        assert_eq!(fs::read_to_string(&target).unwrap(), "B");

        let backups = backups_of(target.parent().unwrap(), "config.toml");
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "A");

        let third = gw.privileged_write(&target, "C");
        assert!(third.success(), "{}", third.output);
        let backups = backups_of(target.parent().unwrap(), "config.toml");
        assert_eq!(backups.len(), 2);
        assert_ne!(backups[0], backups[1]);
        assert_eq!(fs::read_to_string(&target).unwrap(), "C");
    }

    #[test]
    fn privileged_write_preserves_content_exactly() {
        let dir = tempdir().expect("tempdir");
        let target = dir.path().join("motd");
        let gw = SystemGateway::new(Elevation::None);
        let content = "line one\nit's $HOME `id`\n";

        assert!(gw.privileged_write(&target, content).success());
        assert_eq!(fs::read_to_string(&target).unwrap(), content);
    }

    #[test]
    fn user_write_backs_up_and_returns_path() {
        let dir = tempdir().expect("tempdir");
        let target = dir.path().join("hypr").join("hyprland.conf");

        let written = user_write(&target, "first").unwrap();
        assert_eq!(written, target);
        let written = user_write(&target, "second").unwrap();
        assert_eq!(fs::read_to_string(&written).unwrap(), "second");

        let backups = backups_of(target.parent().unwrap(), "hyprland.conf");
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "first");
    }
}
