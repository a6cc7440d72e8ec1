use std::{fs::File, io::Read, path::PathBuf};

use tracing::debug;

use super::error::{ConfigError, ConfigResult};

/// Explicit config path, checked before any other location.
pub const CONFIG_PATH_ENV: &str = "SPEECHDRILL_CONFIG";

pub fn find_config_file(use_local: bool) -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }

    if use_local {
        return PathBuf::from("./config.toml");
    }

    #[cfg(unix)]
    let path = std::env::var_os("HOME");
    #[cfg(windows)]
    let path = std::env::var_os("APPDATA");

    #[cfg(any(unix, windows))]
    if let Some(app_path) = path {
        let mut path = PathBuf::from(app_path);

        if cfg!(unix) {
            path = path.join(".config");
        }

        path = path.join(crate::APPLICATION_NAME).join("config.toml");

        if path.exists() {
            return path;
        }
    }

    PathBuf::from("./config.toml")
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    let filename = find_config_file(use_local);

    tracing::trace!("looking for config at: {}", filename.display());
    if !filename.exists() {
        return Err(ConfigError::ConfigNotFound { path: filename });
    }

    let filename = filename.canonicalize()?;
    debug!("using {} as configuration file", filename.display());

    let mut fd = File::open(filename)?;
    let mut buf = Vec::new();
    fd.read_to_end(&mut buf)?;

    Ok(buf)
}

#[cfg(test)]
mod test {
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    // All cases share the process environment, so they run in one test.
    #[test]
    fn test_config_lookup_order() {
        let temp_dir = tempfile::tempdir().unwrap();

        unsafe {
            env::remove_var(CONFIG_PATH_ENV);
        }
        assert_eq!(find_config_file(true), PathBuf::from("./config.toml"));

        let fake_config = temp_dir
            .path()
            .join(".config")
            .join(crate::APPLICATION_NAME);
        fs::create_dir_all(&fake_config).unwrap();
        let home_file = fake_config.join("config.toml");
        fs::write(&home_file, "[database]\nuri = \"postgres://home\"\n").unwrap();

        #[cfg(unix)]
        unsafe {
            env::set_var("HOME", temp_dir.path());
        }
        #[cfg(windows)]
        unsafe {
            env::set_var("APPDATA", temp_dir.path());
        }
        #[cfg(unix)]
        assert_eq!(find_config_file(false), home_file);

        let explicit = temp_dir.path().join("explicit.toml");
        fs::write(&explicit, b"[database]\nuri = 'postgres://explicit'\n").unwrap();
        unsafe {
            env::set_var(CONFIG_PATH_ENV, &explicit);
        }
        assert_eq!(find_config_file(true), explicit);

        let bytes = read_config(true).unwrap();
        assert_eq!(bytes, b"[database]\nuri = 'postgres://explicit'\n");

        unsafe {
            env::set_var(CONFIG_PATH_ENV, temp_dir.path().join("missing.toml"));
        }
        assert!(matches!(read_config(true), Err(ConfigError::ConfigNotFound { .. })));

        unsafe {
            env::remove_var(CONFIG_PATH_ENV);
        }
    }
}
