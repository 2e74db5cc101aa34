use bincode::{deserialize_from, serialize_into};
use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::expense::{Expense, ExpenseId};

/// An expense as kept by the in-process store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredExpense {
    pub id: ExpenseId,
    pub name: String,
    pub cost: u64,
    pub created_at: DateTime<Utc>,
}

impl StoredExpense {
    pub fn to_expense(&self) -> Expense {
        Expense {
            id: self.id.clone(),
            name: self.name.clone(),
            cost: self.cost,
        }
    }
}

/// Contents of a snapshot file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub collection: String,
    pub expenses: Vec<StoredExpense>,
}

/// Writes a snapshot as gzip-compressed bincode
pub fn save_snapshot(snapshot: &StoreSnapshot, path: impl AsRef<Path>) -> std::io::Result<()> {
    let file = File::create(path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = BufWriter::new(encoder);

    serialize_into(&mut writer, snapshot)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.finish()?;
    Ok(())
}

/// Reads a snapshot written by [`save_snapshot`]
pub fn load_snapshot(path: impl AsRef<Path>) -> std::io::Result<StoreSnapshot> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = BufReader::new(decoder);

    let snapshot: StoreSnapshot = deserialize_from(&mut reader)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    Ok(snapshot)
}
