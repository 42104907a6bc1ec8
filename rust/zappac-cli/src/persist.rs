//! Session bootstrap: seed from `[state] last_state`, write it back on `save`.

use std::path::PathBuf;

use tracing::{debug, warn};
use zappac_lang::ZappacSession;

use crate::config::ZappacConfig;

/// Open a session seeded from `config`.
///
/// When `target` is given, every persisted `save(name)` writes the
/// environment snapshot to that file's `[state] last_state`.
pub fn open_session(config: &ZappacConfig, target: Option<PathBuf>) -> ZappacSession {
    let mut session = zappac_lang::session(&config.state.last_state);
    if let Some(path) = target {
        session.on_save(move |snapshot| {
            match ZappacConfig::save_last_state(&path, snapshot) {
                Ok(()) => debug!(path = %path.display(), "stored last state"),
                Err(err) => warn!(error = %err, "failed to store last state"),
            }
        });
    }
    session
}
