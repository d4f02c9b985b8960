use std::{fs, path::Path};

use anyhow::Context;
use encoding_rs::Encoding;
use rpg_engine::api::{builtin_world, parse_world};
use rpg_engine::WorldFile;

/// Read a text file, honouring a UTF-8/UTF-16 byte order mark if present.
pub fn read_text_auto(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

/// The world file at `path`, or the built-in world `id` when no path is given.
pub fn load_world_file(id: &str, path: Option<&Path>) -> anyhow::Result<WorldFile> {
    match path {
        Some(path) => parse_world(&read_text_auto(path)?, path),
        None => builtin_world(id),
    }
}
