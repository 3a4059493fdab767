use std::env;

use crate::data_types::Canteen;

/// Info for everything, Debug for `module` when RUST_LOG=debug.
pub fn logger_init(module: &str) {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module(
            module,
            if env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default()
                == "debug"
            {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        )
        .init();
}

/// Parses a `--canteen` value, either its key ("ul_uni_sued") or a source label.
pub fn parse_canteen_arg(arg: &str) -> Result<Canteen, String> {
    Canteen::from_key(arg)
        .or_else(|| Canteen::from_label(arg))
        .ok_or_else(|| {
            let keys: Vec<&str> = Canteen::ALL.iter().map(Canteen::key).collect();
            format!("unknown canteen '{}', expected one of {}", arg, keys.join(", "))
        })
}

/// Canteens that can be fetched when none are given explicitly.
pub fn default_canteens() -> Vec<Canteen> {
    Canteen::ALL
        .into_iter()
        .filter(|c| c.maxmanager_id().is_some())
        .collect()
}
