use anyhow::{anyhow, Context};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DB_FILE_NAME: &str = "quickadd.sqlite3";
const MANIFEST_ENTRY: &str = "manifest.json";
const DB_ENTRY: &str = "db/quickadd.sqlite3";
pub const BUNDLE_FORMAT_V1: &str = "quickadd-workspace-v1";

/// `manifest.json` inside a bundle. The checksum covers the db entry bytes.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    format: String,
    #[serde(default)]
    app_version: String,
    #[serde(default)]
    exported_at_ms: i64,
    db_sha256: String,
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub entry_count: usize,
    pub db_sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub db_sha256: String,
    pub bytes: usize,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Zips the workspace store together with a manifest naming its checksum.
pub fn export_workspace_bundle(workspace: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    let db_path = workspace.join(DB_FILE_NAME);
    let db_bytes = std::fs::read(&db_path)
        .with_context(|| format!("failed to read store {}", db_path.display()))?;
    let manifest = Manifest {
        format: BUNDLE_FORMAT_V1.to_string(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at_ms: Utc::now().timestamp_millis(),
        db_sha256: sha256_hex(&db_bytes),
    };

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let out = File::create(out_path)
        .with_context(|| format!("failed to create bundle {}", out_path.display()))?;
    let mut zip = ZipWriter::new(out);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_ENTRY, opts)?;
    zip.write_all(&serde_json::to_vec_pretty(&manifest)?)?;
    zip.start_file(DB_ENTRY, opts)?;
    zip.write_all(&db_bytes)?;
    zip.finish().context("failed to finalize bundle")?;

    Ok(ExportSummary {
        entry_count: 2,
        db_sha256: manifest.db_sha256,
    })
}

/// Replaces the workspace store with the one inside a bundle. The bundle is
/// fully read and its checksum checked before the existing store is touched.
pub fn import_workspace_bundle(in_path: &Path, workspace: &Path) -> anyhow::Result<ImportSummary> {
    let file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.display()))?;
    let mut archive = ZipArchive::new(file).context("not a workspace bundle")?;

    let manifest: Manifest = {
        let entry = archive
            .by_name(MANIFEST_ENTRY)
            .context("bundle has no manifest.json")?;
        serde_json::from_reader(entry).context("manifest.json is invalid")?
    };
    if manifest.format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", manifest.format));
    }

    let mut db_bytes = Vec::new();
    archive
        .by_name(DB_ENTRY)
        .context("bundle has no store entry")?
        .read_to_end(&mut db_bytes)?;
    let actual = sha256_hex(&db_bytes);
    if actual != manifest.db_sha256.to_ascii_lowercase() {
        return Err(anyhow!(
            "store checksum mismatch: manifest {}, bundle {}",
            manifest.db_sha256,
            actual
        ));
    }

    std::fs::create_dir_all(workspace)?;
    let staged = workspace.join(format!("{DB_FILE_NAME}.importing"));
    std::fs::write(&staged, &db_bytes)
        .with_context(|| format!("failed to stage {}", staged.display()))?;
    std::fs::rename(&staged, workspace.join(DB_FILE_NAME)).context("failed to swap in store")?;

    Ok(ImportSummary {
        db_sha256: actual,
        bytes: db_bytes.len(),
    })
}
