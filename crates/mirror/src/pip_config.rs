//! Persisting the chosen mirror to pip's configuration file.

use std::{
    ffi::OsString,
    fs::{copy, create_dir_all, write},
    io,
    path::{Path, PathBuf},
};

use log::info;

use crate::{Error, Result, command::trusted_host};

/// pip's network timeout written to the config, in seconds.
pub const PIP_TIMEOUT: u32 = 6000;

/// Location of the per-user pip configuration file.
///
/// `%APPDATA%\pip\pip.ini` on Windows, `~/.pip/pip.conf` elsewhere.
pub fn config_path() -> Result<PathBuf> {
    if cfg!(windows) {
        dirs::config_dir().map(|dir| dir.join("pip").join("pip.ini")).ok_or(Error::NoConfigDir)
    } else {
        dirs::home_dir().map(|dir| dir.join(".pip").join("pip.conf")).ok_or(Error::NoConfigDir)
    }
}

/// Render the config file body for `mirror_url`.
pub fn render_config(mirror_url: &str) -> Result<String> {
    let host = trusted_host(mirror_url)?;
    Ok(format!(
        "[global]\n\
         index-url = {mirror_url}\n\
         trusted-host = {host}\n\
         timeout = {PIP_TIMEOUT}\n\
         \n\
         [install]\n\
         trusted-host = {host}\n"
    ))
}

/// `<path>.backup`, keeping the original extension.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".backup");
    PathBuf::from(name)
}

/// Write the config for `mirror_url` to `path`.
///
/// An existing file is copied to [`backup_path`] first. Returns the backup
/// location when one was made.
pub fn write_config(path: &Path, mirror_url: &str) -> Result<Option<PathBuf>> {
    let content = render_config(mirror_url)?;
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| Error::Write { path, source }
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).map_err(io_err(parent))?;
    }

    let backup = if path.exists() {
        let backup = backup_path(path);
        copy(path, &backup).map_err(io_err(&backup))?;
        info!("backed up {} to {}", path.display(), backup.display());
        Some(backup)
    } else {
        None
    };

    write(path, content).map_err(io_err(path))?;
    Ok(backup)
}
