//! `env_logger` wiring for hosts embedding the engine.
//!
//! Logging stays off unless `PETRI_LOG` is set; its value is an
//! `env_logger` filter such as `petri_flow=debug`. `PETRI_LOG_STYLE`
//! controls colouring.

pub const LOG_ENV: &str = "PETRI_LOG";
pub const LOG_STYLE_ENV: &str = "PETRI_LOG_STYLE";

/// Installs the global logger when `PETRI_LOG` is set. Returns whether a
/// logger was installed by this call.
pub fn init_logger() -> bool {
    if std::env::var(LOG_ENV).is_err() {
        return false;
    }
    let env = env_logger::Env::new()
        .filter(LOG_ENV)
        .write_style(LOG_STYLE_ENV);
    env_logger::Builder::from_env(env).try_init().is_ok()
}
