use std::env;
use std::path::PathBuf;

use postbox::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()));
    let candidates = [
        exe_dir,
        env::current_dir().ok(),
        dirs::config_dir(),
    ];

    candidates.into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let mut config = match cfg_path.or_else(get_config_path) {
        Some(config_path) => {
            println!("Reading config from {}", config_path.display());
            read_config(&config_path).map_err(|e| e.to_string())?
        }
        None => {
            println!("No {} found. Using default settings", CFG_FILE_NAME);
            Config::default()
        }
    };

    if let Some(mut log) = config.log {
        if log.location.is_none() {
            log.location = dirs::cache_dir().map(|dir| dir.join("Postbox").join("log").join("ingest.log"));
        }
        match log.location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("Log enabled. Using stdout"),
        }
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}
