//! Command Dispatcher
//!
//! Maps a parsed command envelope onto [`KvStore`] operations and shapes the
//! result into the command contract. Runs synchronously; callers on an async
//! runtime should move it onto the blocking pool.

use crate::cache::KvStore;
use crate::error::Result;
use crate::models::{
    Command, CommandResponse, DeleteAllResponse, DeleteResponse, GetResponse, SetResponse,
};

/// Executes one command against the store.
pub fn execute(store: &KvStore, command: Command) -> Result<CommandResponse> {
    match command {
        Command::Set(req) => {
            let (key, value, ttl_seconds) = req.into_parts()?;
            let written = store.set_json(&key, value, ttl_seconds)?;
            Ok(CommandResponse::Set(SetResponse::new(key, written.value)))
        }
        Command::Get(req) => {
            let key = req.into_key("get")?;
            let entry = store.get(&key)?;
            Ok(CommandResponse::Get(GetResponse::new(key, entry)))
        }
        Command::Delete(req) => {
            let key = req.into_key("delete")?;
            let deleted = store.delete(&key)?;
            Ok(CommandResponse::Delete(DeleteResponse::new(key, deleted)))
        }
        Command::DeleteAll => {
            let count = store.delete_all()?;
            Ok(CommandResponse::DeleteAll(DeleteAllResponse::new(count)))
        }
    }
}
