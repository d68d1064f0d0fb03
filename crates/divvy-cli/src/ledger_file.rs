//! Loading and saving the JSON ledger file.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use divvy_netting::{DebtNettingEngine, InMemoryLedger, LedgerSnapshot, NettingConfig, NettingManager};

/// Read a ledger file. A missing file is an empty ledger.
pub fn load(path: &Path) -> anyhow::Result<LedgerSnapshot> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no ledger file, starting empty");
        return Ok(LedgerSnapshot::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ledger {}", path.display()))?;
    let snapshot: LedgerSnapshot = serde_json::from_str(&contents)
        .with_context(|| format!("ledger {} is not valid", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        debts = snapshot.debts.len(),
        settlements = snapshot.settlements.len(),
        "loaded ledger"
    );
    Ok(snapshot)
}

/// Write a ledger file. The new contents go to a sibling temp file first and
/// replace the old file in one rename.
pub fn save(path: &Path, snapshot: &LedgerSnapshot) -> anyhow::Result<()> {
    let contents = serde_json::to_string_pretty(snapshot)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace ledger {}", path.display()))?;
    tracing::debug!(path = %path.display(), "saved ledger");
    Ok(())
}

/// Open a ledger file behind a netting manager.
pub fn open(
    path: &Path,
    netting: NettingConfig,
) -> anyhow::Result<(Arc<InMemoryLedger>, NettingManager)> {
    let ledger = Arc::new(InMemoryLedger::from_snapshot(load(path)?));
    let engine = DebtNettingEngine::new(netting, ledger.clone());
    Ok((ledger, NettingManager::new(engine)))
}
