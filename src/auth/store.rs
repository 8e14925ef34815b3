use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::AuthError;
use super::token::TokenRecord;

/// Default token file name, resolved against the working directory.
pub const DEFAULT_TOKEN_FILE: &str = "mal_tokens.json";

/// Result of looking a user up in a token store.
///
/// A missing file, a missing user, and an unreadable document are all
/// ordinary states for a first run; none of them is an error.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenLookup {
    Found(TokenRecord),
    NotFound,
    Corrupt,
}

impl TokenLookup {
    pub fn into_record(self) -> Option<TokenRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::NotFound | Self::Corrupt => None,
        }
    }
}

/// Storage abstraction for persisted per-user tokens.
pub trait TokenStore: Send + Sync {
    fn load(&self, username: &str) -> Result<TokenLookup, AuthError>;
    /// Replaces the whole record for `username`, leaving other users intact.
    fn save(&self, username: &str, record: &TokenRecord) -> Result<(), AuthError>;
}

/// Token store backed by a single JSON object keyed by username.
///
/// Saves are read-merge-write and go through a sibling temporary file that
/// is renamed over the target, so an interrupted write never truncates the
/// records of other users. The file is assumed to have a single writer.
///
/// # Example
/// ```no_run
/// use malcli::auth::{FileTokenStore, TokenRecord, TokenStore};
///
/// let store = FileTokenStore::new("mal_tokens.json");
/// store.save("alice", &TokenRecord::new("access").with_refresh_token("refresh"))?;
/// # Ok::<(), malcli::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document, AuthError> {
        let raw = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Document::Missing),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        // Undecodable bytes count as a corrupt document, like malformed JSON.
        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(users)) => Ok(Document::Users(users)),
            Ok(_) | Err(_) => Ok(Document::Corrupt),
        }
    }

    fn write_document(&self, users: &Map<String, Value>) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        users.serialize(&mut ser)?;

        let tmp = self.temp_path();
        let mut file = open_private(&tmp)?;
        file.write_all(&buf)?;
        file.sync_all()?;
        drop(file);
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_TOKEN_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, username: &str) -> Result<TokenLookup, AuthError> {
        let users = match self.read_document()? {
            Document::Users(users) => users,
            Document::Missing => return Ok(TokenLookup::NotFound),
            Document::Corrupt => {
                tracing::debug!(path = %self.path.display(), "token file is not a JSON object");
                return Ok(TokenLookup::Corrupt);
            }
        };
        let Some(entry) = users.get(username) else {
            return Ok(TokenLookup::NotFound);
        };
        match serde_json::from_value::<TokenRecord>(entry.clone()) {
            Ok(record) => Ok(TokenLookup::Found(record)),
            Err(err) => {
                tracing::debug!(username, error = %err, "stored token entry is malformed");
                Ok(TokenLookup::Corrupt)
            }
        }
    }

    fn save(&self, username: &str, record: &TokenRecord) -> Result<(), AuthError> {
        let mut users = match self.read_document()? {
            Document::Users(users) => users,
            Document::Missing => Map::new(),
            Document::Corrupt => {
                tracing::warn!(path = %self.path.display(), "replacing unreadable token file");
                Map::new()
            }
        };
        users.insert(username.to_string(), serde_json::to_value(record)?);
        self.write_document(&users)?;
        tracing::debug!(username, path = %self.path.display(), "tokens saved");
        Ok(())
    }
}

/// Open the temp file owner-only before any token bytes reach it.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; a stale temp file keeps its old bits.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

enum Document {
    Users(Map<String, Value>),
    Missing,
    Corrupt,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileTokenStore) {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join(DEFAULT_TOKEN_FILE));
        (dir, store)
    }

    fn record(access: &str) -> TokenRecord {
        TokenRecord::new(access)
            .with_refresh_token(format!("{access}-refresh"))
            .with_expires_in(3600)
            .with_token_type("Bearer")
    }

    #[test]
    fn token_round_trip_works() {
        let (_dir, store) = temp_store();
        store.save("alice", &record("AT1")).unwrap();
        let loaded = store.load("alice").unwrap();
        assert_eq!(loaded, TokenLookup::Found(record("AT1")));
    }

    #[test]
    fn missing_file_is_not_found() {
        let (_dir, store) = temp_store();
        assert_eq!(store.load("alice").unwrap(), TokenLookup::NotFound);
    }

    #[test]
    fn unknown_user_is_not_found() {
        let (_dir, store) = temp_store();
        store.save("alice", &record("AT1")).unwrap();
        assert_eq!(store.load("bob").unwrap(), TokenLookup::NotFound);
    }

    #[test]
    fn empty_or_invalid_file_is_corrupt() {
        let (_dir, store) = temp_store();
        let cases: [&[u8]; 6] = [
            b"",
            b"{not-json",
            b"[1, 2, 3]",
            b"\"alice\"",
            &[0xff, 0xfe, 0x7b, 0x00],
            b"{\"alice\": \"\xff\"}",
        ];
        for contents in cases {
            fs::write(store.path(), contents).unwrap();
            assert_eq!(store.load("alice").unwrap(), TokenLookup::Corrupt, "{contents:?}");
        }
    }

    #[test]
    fn malformed_user_entry_is_corrupt() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), r#"{"alice": {"refresh_token": "RT"}}"#).unwrap();
        assert_eq!(store.load("alice").unwrap(), TokenLookup::Corrupt);
    }

    #[test]
    fn save_keeps_other_users() {
        let (_dir, store) = temp_store();
        store.save("alice", &record("AT1")).unwrap();
        store.save("bob", &record("AT2")).unwrap();
        assert_eq!(store.load("alice").unwrap(), TokenLookup::Found(record("AT1")));
        assert_eq!(store.load("bob").unwrap(), TokenLookup::Found(record("AT2")));
    }

    #[test]
    fn save_replaces_the_whole_record() {
        let (_dir, store) = temp_store();
        store.save("alice", &record("AT1")).unwrap();
        store.save("alice", &TokenRecord::new("AT9")).unwrap();
        let loaded = store.load("alice").unwrap().into_record().unwrap();
        assert_eq!(loaded, TokenRecord::new("AT9"));
    }

    #[test]
    fn save_over_corrupt_file_starts_fresh() {
        let (_dir, store) = temp_store();
        let cases: [&[u8]; 2] = [b"garbage", &[0xff, 0xfe, 0x7b, 0x00]];
        for contents in cases {
            fs::write(store.path(), contents).unwrap();
            store.save("alice", &record("AT1")).unwrap();
            assert_eq!(store.load("alice").unwrap(), TokenLookup::Found(record("AT1")));
        }
    }

    #[test]
    fn file_is_pretty_printed_with_four_spaces() {
        let (_dir, store) = temp_store();
        store.save("alice", &TokenRecord::new("AT1")).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "{\n    \"alice\": {\n        \"access_token\": \"AT1\"\n    }\n}");
    }

    #[test]
    fn no_temp_file_is_left_behind() {
        let (dir, store) = temp_store();
        store.save("alice", &record("AT1")).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![DEFAULT_TOKEN_FILE.to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = temp_store();
        store.save("alice", &record("AT1")).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn stale_temp_file_does_not_widen_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let (dir, store) = temp_store();
        let stale = dir.path().join(format!("{DEFAULT_TOKEN_FILE}.tmp"));
        fs::write(&stale, "old").unwrap();
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o644)).unwrap();

        store.save("alice", &record("AT1")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!stale.exists());
    }
}
