//! Pack loading from ZIP files and directories.
//!
//! Only blockstate JSON is indexed; models and textures belong to the
//! renderer and are never read here. Files that fail to parse as JSON are
//! skipped with a warning so one broken file can't sink a whole pack.

use super::{PackAssets, PackEntry};
use crate::error::{PreviewError, Result};
use log::warn;
use std::io::Read;
use std::path::Path;

/// Load a pack from a file path (ZIP file or directory).
pub fn load_from_path<P: AsRef<Path>>(
    id: impl Into<String>,
    display_name: impl Into<String>,
    path: P,
) -> Result<PackEntry> {
    let path = path.as_ref();

    let assets = if path.is_dir() {
        assets_from_directory(path)?
    } else {
        let data = std::fs::read(path)?;
        assets_from_bytes(&data)?
    };

    Ok(PackEntry::new(id, display_name, assets))
}

/// Load a pack from ZIP bytes (for in-memory / browser-supplied archives).
pub fn load_from_bytes(
    id: impl Into<String>,
    display_name: impl Into<String>,
    data: &[u8],
) -> Result<PackEntry> {
    Ok(PackEntry::new(id, display_name, assets_from_bytes(data)?))
}

fn assets_from_bytes(data: &[u8]) -> Result<PackAssets> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    let mut assets = PackAssets::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let file_path = file.name().to_string();

        if file.is_dir() {
            continue;
        }

        let Some((namespace, asset_type, asset_path)) = parse_asset_path(&file_path) else {
            continue;
        };

        if asset_type != "blockstates" || !asset_path.ends_with(".json") {
            continue;
        }

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let block_id = asset_path.trim_end_matches(".json");
        match String::from_utf8(bytes) {
            Ok(contents) => add_if_valid_json(&mut assets, namespace, block_id, contents),
            Err(_) => warn!("Skipping non-UTF-8 blockstate {}/{}", namespace, block_id),
        }
    }

    Ok(assets)
}

fn assets_from_directory(path: &Path) -> Result<PackAssets> {
    let assets_path = path.join("assets");
    if !assets_path.exists() {
        return Err(PreviewError::InvalidResourcePack(
            "No assets directory found".to_string(),
        ));
    }

    let mut assets = PackAssets::new();

    for namespace_entry in std::fs::read_dir(&assets_path)? {
        let namespace_entry = namespace_entry?;
        if !namespace_entry.file_type()?.is_dir() {
            continue;
        }

        let namespace = namespace_entry.file_name().to_string_lossy().to_string();
        let blockstates_path = namespace_entry.path().join("blockstates");
        if !blockstates_path.exists() {
            continue;
        }

        for entry in std::fs::read_dir(&blockstates_path)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let block_id = path
                    .file_stem()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();
                match String::from_utf8(std::fs::read(&path)?) {
                    Ok(contents) => add_if_valid_json(&mut assets, &namespace, &block_id, contents),
                    Err(_) => warn!("Skipping non-UTF-8 blockstate {}/{}", namespace, block_id),
                }
            }
        }
    }

    Ok(assets)
}

/// Store a blockstate only if it parses as a JSON document; broken files are
/// skipped, not fatal.
fn add_if_valid_json(assets: &mut PackAssets, namespace: &str, block_id: &str, contents: String) {
    match serde_json::from_str::<serde_json::Value>(&contents) {
        Ok(_) => assets.add_blockstate(namespace, block_id, contents),
        Err(e) => {
            warn!(
                "Skipping malformed blockstate {}/{}: {}",
                namespace, block_id, e
            );
        }
    }
}

/// Parse an asset path from a ZIP file.
/// Returns (namespace, asset_type, asset_path) if valid.
fn parse_asset_path(file_path: &str) -> Option<(&str, &str, &str)> {
    // Expected format: assets/{namespace}/{type}/{path}
    let parts: Vec<&str> = file_path.splitn(4, '/').collect();

    if parts.len() >= 4 && parts[0] == "assets" {
        Some((parts[1], parts[2], parts[3]))
    } else {
        None
    }
}
