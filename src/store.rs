use anyhow::{bail, Context, Result};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::AliasError;
use crate::models::{normalize_alias, AliasRecord};

const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    aliases: Vec<AliasRecord>,
}

/// Ordered, file-backed table of aliases.
///
/// Nothing is cached between calls: every operation reads the file, and every
/// mutation writes it back before returning.
#[derive(Debug, Clone)]
pub struct AliasStore {
    path: PathBuf,
}

impl AliasStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create store directory")?;
        }
        tracing::info!("Alias store at {:?}", path);
        Ok(Self { path })
    }

    /// Like [`AliasStore::open`], seeding a missing store from the previous
    /// tool's table file when one is present.
    pub fn open_with_legacy<P: AsRef<Path>>(path: P, legacy: Option<&Path>) -> Result<Self> {
        let store = Self::open(path)?;
        if store.path.exists() {
            return Ok(store);
        }

        if let Some(legacy) = legacy.filter(|p| p.exists()) {
            let content = fs::read_to_string(legacy)
                .with_context(|| format!("Failed to read legacy store {:?}", legacy))?;
            let records = parse_document(&content)
                .with_context(|| format!("Failed to parse legacy store {:?}", legacy))?;
            tracing::info!("Importing {} aliases from {:?}", records.len(), legacy);
            store.save(&records)?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> Result<Vec<AliasRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).context("Failed to read alias store")?;
        parse_document(&content).context("Failed to parse alias store")
    }

    pub fn exists(&self, alias: &str) -> Result<bool> {
        let key = normalize_alias(alias);
        Ok(self.list()?.iter().any(|r| r.alias == key))
    }

    pub fn get(&self, alias: &str) -> Result<AliasRecord, AliasError> {
        let key = normalize_alias(alias);
        let records = self.list()?;
        match records.iter().find(|r| r.alias == key) {
            Some(record) => Ok(record.clone()),
            None => Err(not_found(&key, &records)),
        }
    }

    pub fn insert(&self, mut record: AliasRecord) -> Result<(), AliasError> {
        record.alias = normalize_alias(&record.alias);
        let mut records = self.list()?;
        if records.iter().any(|r| r.alias == record.alias) {
            return Err(AliasError::DuplicateAlias(record.alias.to_uppercase()));
        }

        tracing::info!("Adding alias {}", record.alias);
        records.push(record);
        self.save(&records)?;
        Ok(())
    }

    /// Replaces `old_alias` in place. A different `record.alias` renames it.
    pub fn update(&self, old_alias: &str, mut record: AliasRecord) -> Result<(), AliasError> {
        let old_key = normalize_alias(old_alias);
        record.alias = normalize_alias(&record.alias);
        let mut records = self.list()?;

        let index = match records.iter().position(|r| r.alias == old_key) {
            Some(index) => index,
            None => return Err(not_found(&old_key, &records)),
        };

        if record.alias != old_key && records.iter().any(|r| r.alias == record.alias) {
            return Err(AliasError::DuplicateAlias(record.alias.to_uppercase()));
        }

        tracing::info!("Updating alias {} (now {})", old_key, record.alias);
        records[index] = record;
        self.save(&records)?;
        Ok(())
    }

    pub fn delete(&self, alias: &str) -> Result<(), AliasError> {
        let key = normalize_alias(alias);
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|r| r.alias != key);
        if records.len() == before {
            return Err(not_found(&key, &records));
        }

        tracing::info!("Deleting alias {}", key);
        self.save(&records)?;
        Ok(())
    }

    fn save(&self, records: &[AliasRecord]) -> Result<()> {
        let document = StoreFile {
            version: STORE_VERSION,
            aliases: records.to_vec(),
        };
        let data = serde_json::to_vec_pretty(&document).context("Failed to serialize aliases")?;

        // Write a sibling file and rename it over the store so readers only
        // ever see a complete document.
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp_path)
                .with_context(|| format!("Failed to create {:?}", tmp_path))?;
            file.write_all(&data)?;
            file.sync_all().context("Failed to flush alias store")?;
        }
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {:?}", self.path))?;

        // The rename itself only lasts once the directory entry is on disk
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            File::open(parent)
                .and_then(|dir| dir.sync_all())
                .with_context(|| format!("Failed to flush directory {:?}", parent))?;
        }

        tracing::debug!("Saved {} aliases to {:?}", records.len(), self.path);
        Ok(())
    }
}

fn not_found(alias: &str, records: &[AliasRecord]) -> AliasError {
    AliasError::NotFound {
        alias: alias.to_uppercase(),
        suggestion: closest_alias(alias, records),
    }
}

// Either name may be an abbreviation of the other: "wb" -> "web1",
// "web1-old" -> "web1".
fn closest_alias(alias: &str, records: &[AliasRecord]) -> Option<String> {
    let matcher = SkimMatcherV2::default();
    records
        .iter()
        .filter_map(|r| {
            let forward = matcher.fuzzy_match(&r.alias, alias);
            let backward = matcher.fuzzy_match(alias, &r.alias);
            forward.max(backward).map(|score| (score, &r.alias))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, alias)| alias.clone())
}

fn parse_document(content: &str) -> Result<Vec<AliasRecord>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(content)?;
    if value.get("aliases").is_some() {
        let document: StoreFile = serde_json::from_value(value)?;
        if document.version > STORE_VERSION {
            bail!(
                "Alias store version {} is newer than this program supports ({})",
                document.version,
                STORE_VERSION
            );
        }
        return Ok(document.aliases);
    }

    if let Some(table) = value.get("_default") {
        return parse_legacy_table(table.clone());
    }

    // Anything else belongs to someone else; refuse rather than overwrite it
    match value.as_object() {
        Some(object) if object.is_empty() => Ok(Vec::new()),
        _ => bail!("Unrecognized alias store format"),
    }
}

// The previous tool kept rows in a map keyed by a numeric document id.
fn parse_legacy_table(table: Value) -> Result<Vec<AliasRecord>> {
    let rows: BTreeMap<String, AliasRecord> = serde_json::from_value(table)?;
    let mut rows: Vec<(u64, AliasRecord)> = rows
        .into_iter()
        .map(|(id, record)| (id.parse().unwrap_or(u64::MAX), record))
        .collect();
    rows.sort_by_key(|(id, _)| *id);

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for (_, mut record) in rows {
        record.alias = normalize_alias(&record.alias);
        if seen.insert(record.alias.clone()) {
            records.push(record);
        } else {
            tracing::warn!("Skipping duplicated legacy alias '{}'", record.alias);
        }
    }
    Ok(records)
}
