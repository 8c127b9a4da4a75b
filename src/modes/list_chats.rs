use crate::store;
use anyhow::Result;
use tracing::info;

use super::shared::load_db_path;

pub(super) fn run() -> Result<()> {
    let db_path = load_db_path();
    let chats = {
        let conn = store::open_db(&db_path)?;
        store::list_chats(&conn)?
    };

    info!("{} chat(s) in {}", chats.len(), db_path.display());
    for chat in &chats {
        println!("{}\t{}", chat.chat, chat.messages);
    }
    Ok(())
}
