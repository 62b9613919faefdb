use anyhow::{Context, Result};
use passbook_core::{CredentialStore, DraftField, FileStore};
use std::path::PathBuf;

const SAMPLES: [(&str, &str, &str); 3] = [
    ("example.com", "alice", "correct-horse"),
    ("mail.example.org", "alice@example.org", "battery-staple"),
    ("git.example.net", "bob", "hunter2"),
];

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("test_store"));

    let mut store = CredentialStore::open(FileStore::new(&dir))
        .with_context(|| format!("Failed to open store in {}", dir.display()))?;

    for (site, username, password) in SAMPLES {
        store.update_draft(DraftField::Site, site);
        store.update_draft(DraftField::Username, username);
        store.update_draft(DraftField::Password, password);
        store.submit_create().context("Failed to add sample credential")?;
    }

    println!(
        "Seeded {} with {} credentials",
        dir.display(),
        store.len()
    );
    Ok(())
}
