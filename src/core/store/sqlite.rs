//! SQLite store backend.

use super::{
    folder_of, DuplicateGroupMap, FileRecord, FolderHashIndex, FolderKindStats, FolderStats,
    GlobalStats, KindTotals, MediaDetails, MediaStore, NewFileRecord, ScanState,
};
use crate::core::classifier::MediaKind;
use crate::core::metadata::{PhotoMetadata, VideoMetadata, DATE_FORMAT};
use crate::error::StoreError;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// File name of the database inside the chosen directory
pub const DB_FILE_NAME: &str = "photo_dedup.db";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS photos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        path TEXT UNIQUE NOT NULL,
        folder TEXT NOT NULL,
        size INTEGER NOT NULL,
        hash TEXT,
        date_taken TEXT,
        camera_model TEXT,
        gps_lat REAL,
        gps_lon REAL,
        orientation INTEGER,
        width INTEGER,
        height INTEGER,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );
    CREATE TABLE IF NOT EXISTS videos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        path TEXT UNIQUE NOT NULL,
        folder TEXT NOT NULL,
        size INTEGER NOT NULL,
        hash TEXT,
        duration REAL,
        width INTEGER,
        height INTEGER,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );
    CREATE TABLE IF NOT EXISTS scan_state (
        directory TEXT PRIMARY KEY,
        last_scan_time INTEGER NOT NULL,
        file_count INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_photos_hash ON photos(hash) WHERE hash IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_photos_folder ON photos(folder);
    CREATE INDEX IF NOT EXISTS idx_photos_size ON photos(size);
    CREATE INDEX IF NOT EXISTS idx_videos_hash ON videos(hash) WHERE hash IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_videos_folder ON videos(folder);
    CREATE INDEX IF NOT EXISTS idx_videos_size ON videos(size);
";

const PHOTO_COLUMNS: &str = "m.id, m.path, m.folder, m.size, m.hash, m.date_taken, \
     m.camera_model, m.gps_lat, m.gps_lon, m.orientation, m.width, m.height, \
     m.created_at, m.updated_at";

const VIDEO_COLUMNS: &str = "m.id, m.path, m.folder, m.size, m.hash, m.duration, \
     m.width, m.height, m.created_at, m.updated_at";

/// SQLite-backed media index
///
/// Uses WAL mode so report commands can read while another process scans.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create a database file at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let open_failed = |reason: String| StoreError::OpenFailed {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| open_failed(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| open_failed(e.to_string()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| open_failed(e.to_string()))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| open_failed(format!("schema initialisation failed: {e}")))?;

        debug!("Opened database at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    /// Open or create `photo_dedup.db` inside `dir`
    pub fn open_in_dir(dir: &Path) -> Result<Self, StoreError> {
        Self::open(&dir.join(DB_FILE_NAME))
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|e| StoreError::OpenFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        conn.execute_batch(SCHEMA).map_err(|e| StoreError::OpenFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Size of the database file in bytes (0 for in-memory databases)
    pub fn database_size(&self) -> u64 {
        std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// Rebuild the database file to reclaim unused space
    pub fn vacuum(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch("VACUUM;")?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Corrupted {
            path: self.db_path.clone(),
        })
    }

    fn to_timestamp(time: SystemTime) -> i64 {
        time.duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs() as i64
    }

    fn from_timestamp(timestamp: i64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(timestamp.max(0) as u64)
    }

    fn select_records(
        conn: &Connection,
        kind: MediaKind,
        tail: &str,
        bind: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<FileRecord>, StoreError> {
        let (table, columns) = table_and_columns(kind)?;
        let sql = format!("SELECT {columns} FROM {table} m {tail}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(bind, |row| match kind {
            MediaKind::Video => video_from_row(row),
            _ => photo_from_row(row),
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn kind_totals(conn: &Connection, table: &str) -> Result<KindTotals, StoreError> {
        let (files, total_size): (i64, i64) = conn.query_row(
            &format!("SELECT COUNT(*), COALESCE(SUM(size), 0) FROM {table}"),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (duplicate_groups, wasted_bytes): (i64, i64) = conn.query_row(
            &format!(
                "SELECT COUNT(*), COALESCE(SUM(total_size - min_size), 0)
                 FROM (
                     SELECT hash, SUM(size) AS total_size, MIN(size) AS min_size
                     FROM {table}
                     WHERE hash IS NOT NULL
                     GROUP BY hash
                     HAVING COUNT(*) > 1
                 )"
            ),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(KindTotals {
            files: files as u64,
            total_size: total_size as u64,
            duplicate_groups: duplicate_groups as u64,
            wasted_bytes: wasted_bytes as u64,
        })
    }

    fn folder_kind_stats(
        conn: &Connection,
        table: &str,
    ) -> Result<Vec<(String, FolderKindStats)>, StoreError> {
        let mut stmt = conn.prepare(&format!(
            "WITH duplicate_hashes AS (
                 SELECT hash FROM {table}
                 WHERE hash IS NOT NULL
                 GROUP BY hash
                 HAVING COUNT(*) > 1
             )
             SELECT folder,
                    COUNT(*),
                    SUM(CASE WHEN hash IN (SELECT hash FROM duplicate_hashes) THEN 1 ELSE 0 END),
                    SUM(CASE WHEN hash IN (SELECT hash FROM duplicate_hashes) THEN size ELSE 0 END)
             FROM {table}
             GROUP BY folder"
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                FolderKindStats {
                    count: row.get::<_, i64>(1)? as u64,
                    duplicate_count: row.get::<_, Option<i64>>(2)?.unwrap_or(0) as u64,
                    duplicate_bytes: row.get::<_, Option<i64>>(3)?.unwrap_or(0) as u64,
                },
            ))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn table_and_columns(kind: MediaKind) -> Result<(&'static str, &'static str), StoreError> {
    match kind {
        MediaKind::Photo => Ok(("photos", PHOTO_COLUMNS)),
        MediaKind::Video => Ok(("videos", VIDEO_COLUMNS)),
        MediaKind::Other => Err(StoreError::QueryFailed(
            "files of kind 'other' are not indexed".to_string(),
        )),
    }
}

fn photo_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let date_taken: Option<String> = row.get(5)?;
    Ok(FileRecord {
        id: row.get(0)?,
        kind: MediaKind::Photo,
        path: row.get(1)?,
        folder: row.get(2)?,
        size: row.get::<_, i64>(3)? as u64,
        hash: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        details: MediaDetails::Photo(PhotoMetadata {
            date_taken: date_taken
                .and_then(|s| NaiveDateTime::parse_from_str(&s, DATE_FORMAT).ok()),
            camera_model: row.get(6)?,
            gps_lat: row.get(7)?,
            gps_lon: row.get(8)?,
            orientation: row.get(9)?,
            width: row.get(10)?,
            height: row.get(11)?,
            error: None,
        }),
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn video_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        kind: MediaKind::Video,
        path: row.get(1)?,
        folder: row.get(2)?,
        size: row.get::<_, i64>(3)? as u64,
        hash: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        details: MediaDetails::Video(VideoMetadata {
            duration: row.get(5)?,
            width: row.get(6)?,
            height: row.get(7)?,
        }),
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl MediaStore for SqliteStore {
    fn insert_batch(
        &self,
        kind: MediaKind,
        records: &[NewFileRecord],
    ) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        table_and_columns(kind)?;

        let mut conn = self.lock()?;
        // Dropping the transaction without commit rolls the whole batch back
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            match kind {
                MediaKind::Photo => {
                    let mut stmt = tx.prepare_cached(
                        "INSERT OR IGNORE INTO photos(
                             path, folder, size, hash, date_taken, camera_model,
                             gps_lat, gps_lon, orientation, width, height
                         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    )?;
                    let empty = PhotoMetadata::default();
                    for record in records {
                        let meta = record.details.photo().unwrap_or(&empty);
                        inserted += stmt.execute(params![
                            record.path.to_string_lossy(),
                            folder_of(&record.path),
                            record.size as i64,
                            record.hash.to_hex(),
                            meta.date_taken.map(|d| d.format(DATE_FORMAT).to_string()),
                            meta.camera_model,
                            meta.gps_lat,
                            meta.gps_lon,
                            meta.orientation,
                            meta.width,
                            meta.height,
                        ])?;
                    }
                }
                _ => {
                    let mut stmt = tx.prepare_cached(
                        "INSERT OR IGNORE INTO videos(
                             path, folder, size, hash, duration, width, height
                         ) VALUES (?, ?, ?, ?, ?, ?, ?)",
                    )?;
                    let empty = VideoMetadata::default();
                    for record in records {
                        let meta = record.details.video().unwrap_or(&empty);
                        inserted += stmt.execute(params![
                            record.path.to_string_lossy(),
                            folder_of(&record.path),
                            record.size as i64,
                            record.hash.to_hex(),
                            meta.duration,
                            meta.width,
                            meta.height,
                        ])?;
                    }
                }
            }
        }
        tx.commit()?;

        Ok(inserted)
    }

    fn list_all(&self, kind: MediaKind) -> Result<Vec<FileRecord>, StoreError> {
        let conn = self.lock()?;
        Self::select_records(&conn, kind, "ORDER BY m.id", &[])
    }

    fn list(
        &self,
        kind: Option<MediaKind>,
        limit: Option<usize>,
    ) -> Result<Vec<FileRecord>, StoreError> {
        let kinds = match kind {
            Some(kind) => vec![kind],
            None => MediaKind::INDEXED.to_vec(),
        };
        // SQLite treats a negative LIMIT as "no limit"
        let mut remaining = limit.map(|l| l as i64).unwrap_or(-1);

        let conn = self.lock()?;
        let mut records = Vec::new();
        for kind in kinds {
            if remaining == 0 {
                break;
            }
            let batch =
                Self::select_records(&conn, kind, "ORDER BY m.id LIMIT ?", &[&remaining])?;
            if remaining > 0 {
                remaining -= batch.len() as i64;
            }
            records.extend(batch);
        }
        Ok(records)
    }

    fn indexed_paths(&self) -> Result<HashSet<String>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT path FROM photos UNION ALL SELECT path FROM videos")?;
        let paths = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(paths.collect::<Result<HashSet<_>, _>>()?)
    }

    fn duplicate_groups(&self, kind: MediaKind) -> Result<DuplicateGroupMap, StoreError> {
        let (table, _) = table_and_columns(kind)?;
        let conn = self.lock()?;
        let tail = format!(
            "INNER JOIN (
                 SELECT hash FROM {table}
                 WHERE hash IS NOT NULL
                 GROUP BY hash
                 HAVING COUNT(*) > 1
             ) d ON m.hash = d.hash
             ORDER BY m.hash, m.path"
        );

        let mut groups = DuplicateGroupMap::new();
        for record in Self::select_records(&conn, kind, &tail, &[])? {
            groups.entry(record.hash.clone()).or_default().push(record);
        }
        Ok(groups)
    }

    fn global_stats(&self) -> Result<GlobalStats, StoreError> {
        let conn = self.lock()?;
        Ok(GlobalStats {
            photos: Self::kind_totals(&conn, "photos")?,
            videos: Self::kind_totals(&conn, "videos")?,
        })
    }

    fn folder_stats(&self) -> Result<BTreeMap<String, FolderStats>, StoreError> {
        let conn = self.lock()?;
        let mut folders: BTreeMap<String, FolderStats> = BTreeMap::new();

        for (folder, stats) in Self::folder_kind_stats(&conn, "photos")? {
            folders.entry(folder).or_default().photos = stats;
        }
        for (folder, stats) in Self::folder_kind_stats(&conn, "videos")? {
            folders.entry(folder).or_default().videos = stats;
        }

        Ok(folders)
    }

    fn folder_hash_index(&self) -> Result<FolderHashIndex, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT folder, hash FROM photos WHERE hash IS NOT NULL
             UNION ALL
             SELECT folder, hash FROM videos WHERE hash IS NOT NULL",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut index = FolderHashIndex::new();
        for row in rows {
            let (folder, hash) = row?;
            index.entry(folder).or_default().insert(hash);
        }
        Ok(index)
    }

    fn scan_state(&self, directory: &Path) -> Result<Option<ScanState>, StoreError> {
        let conn = self.lock()?;
        let dir_str = directory.to_string_lossy();

        let state = conn
            .query_row(
                "SELECT last_scan_time, file_count FROM scan_state WHERE directory = ?",
                [&dir_str],
                |row| {
                    Ok(ScanState {
                        directory: directory.to_path_buf(),
                        last_scan_time: Self::from_timestamp(row.get(0)?),
                        file_count: row.get::<_, i64>(1)? as usize,
                    })
                },
            )
            .optional()?;
        Ok(state)
    }

    fn record_scan_state(&self, state: &ScanState) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO scan_state (directory, last_scan_time, file_count)
             VALUES (?, ?, ?)",
            params![
                state.directory.to_string_lossy(),
                Self::to_timestamp(state.last_scan_time),
                state.file_count as i64,
            ],
        )?;
        Ok(())
    }

    fn scan_states(&self) -> Result<Vec<ScanState>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT directory, last_scan_time, file_count FROM scan_state
             ORDER BY last_scan_time DESC, directory",
        )?;
        let states = stmt.query_map([], |row| {
            Ok(ScanState {
                directory: PathBuf::from(row.get::<_, String>(0)?),
                last_scan_time: Self::from_timestamp(row.get(1)?),
                file_count: row.get::<_, i64>(2)? as usize,
            })
        })?;
        Ok(states.collect::<Result<Vec<_>, _>>()?)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM photos;
             DELETE FROM videos;
             DELETE FROM scan_state;
             DELETE FROM sqlite_sequence WHERE name IN ('photos', 'videos');",
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::hash_bytes;
    use tempfile::TempDir;

    fn photo(path: &str, content: &[u8]) -> NewFileRecord {
        NewFileRecord {
            path: PathBuf::from(path),
            size: content.len() as u64,
            hash: hash_bytes(content),
            details: MediaDetails::Photo(PhotoMetadata::default()),
        }
    }

    fn video(path: &str, content: &[u8]) -> NewFileRecord {
        NewFileRecord {
            path: PathBuf::from(path),
            size: content.len() as u64,
            hash: hash_bytes(content),
            details: MediaDetails::Video(VideoMetadata::default()),
        }
    }

    #[test]
    fn sqlite_store_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open_in_dir(temp_dir.path()).unwrap();

        assert!(temp_dir.path().join(DB_FILE_NAME).exists());
        assert!(store.database_size() > 0);
        assert_eq!(store.global_stats().unwrap(), GlobalStats::default());
    }

    #[test]
    fn insert_batch_counts_only_new_rows() {
        let store = SqliteStore::open_in_memory().unwrap();

        let first = store
            .insert_batch(
                MediaKind::Photo,
                &[photo("/p/a.jpg", b"a"), photo("/p/b.jpg", b"b")],
            )
            .unwrap();
        let second = store
            .insert_batch(
                MediaKind::Photo,
                &[photo("/p/b.jpg", b"b"), photo("/p/c.jpg", b"c")],
            )
            .unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 1);
        assert_eq!(store.list_all(MediaKind::Photo).unwrap().len(), 3);
    }

    #[test]
    fn duplicate_path_within_one_batch_is_ignored() {
        let store = SqliteStore::open_in_memory().unwrap();

        let inserted = store
            .insert_batch(
                MediaKind::Photo,
                &[photo("/p/a.jpg", b"a"), photo("/p/a.jpg", b"a")],
            )
            .unwrap();

        assert_eq!(inserted, 1);
    }

    #[test]
    fn reinsert_never_updates_hash() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_batch(MediaKind::Photo, &[photo("/p/a.jpg", b"original")])
            .unwrap();
        store
            .insert_batch(MediaKind::Photo, &[photo("/p/a.jpg", b"changed")])
            .unwrap();

        let records = store.list_all(MediaKind::Photo).unwrap();
        assert_eq!(records[0].hash, hash_bytes(b"original").to_hex());
    }

    #[test]
    fn list_all_is_in_insertion_order_with_derived_folder() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_batch(
                MediaKind::Video,
                &[video("/v/z.mp4", b"z"), video("/v/sub/a.mp4", b"a")],
            )
            .unwrap();

        let records = store.list_all(MediaKind::Video).unwrap();
        assert_eq!(records[0].path, "/v/z.mp4");
        assert_eq!(records[1].folder, "/v/sub");
        assert!(records[0].id < records[1].id);
        assert_eq!(records[0].kind, MediaKind::Video);
    }

    #[test]
    fn photo_metadata_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        let taken = NaiveDateTime::parse_from_str("2023-07-14 09:30:00", DATE_FORMAT).unwrap();
        let mut record = photo("/p/exif.jpg", b"exif");
        record.details = MediaDetails::Photo(PhotoMetadata {
            date_taken: Some(taken),
            camera_model: Some("X100V".to_string()),
            gps_lat: Some(48.85),
            gps_lon: Some(-2.35),
            orientation: Some(6),
            width: Some(6000),
            height: Some(4000),
            error: None,
        });
        store.insert_batch(MediaKind::Photo, &[record]).unwrap();

        let stored = &store.list_all(MediaKind::Photo).unwrap()[0];
        let meta = stored.details.photo().unwrap();
        assert_eq!(meta.date_taken, Some(taken));
        assert_eq!(meta.camera_model.as_deref(), Some("X100V"));
        assert_eq!(meta.orientation, Some(6));
        assert_eq!(meta.gps_lon, Some(-2.35));
        assert!(stored.created_at.is_some());
    }

    #[test]
    fn other_kind_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.insert_batch(MediaKind::Other, &[photo("/p/a.txt", b"a")]);
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_groups_only_include_shared_hashes() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_batch(
                MediaKind::Photo,
                &[
                    photo("/p/b.jpg", b"same"),
                    photo("/p/a.jpg", b"same"),
                    photo("/p/unique.jpg", b"unique"),
                ],
            )
            .unwrap();

        let groups = store.duplicate_groups(MediaKind::Photo).unwrap();
        assert_eq!(groups.len(), 1);

        let members = &groups[&hash_bytes(b"same").to_hex()];
        let paths: Vec<_> = members.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/p/a.jpg", "/p/b.jpg"]);
    }

    #[test]
    fn photos_and_videos_never_group_together() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_batch(MediaKind::Photo, &[photo("/m/a.jpg", b"x")])
            .unwrap();
        store
            .insert_batch(MediaKind::Video, &[video("/m/a.mp4", b"x")])
            .unwrap();

        assert!(store.duplicate_groups(MediaKind::Photo).unwrap().is_empty());
        assert!(store.duplicate_groups(MediaKind::Video).unwrap().is_empty());
    }

    #[test]
    fn global_stats_compute_wasted_space() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_batch(
                MediaKind::Photo,
                &[
                    photo("/p/a.jpg", b"1234"),
                    photo("/p/b.jpg", b"1234"),
                    photo("/p/c.jpg", b"1234"),
                    photo("/p/d.jpg", b"xy"),
                ],
            )
            .unwrap();

        let stats = store.global_stats().unwrap();
        assert_eq!(stats.photos.files, 4);
        assert_eq!(stats.photos.total_size, 14);
        assert_eq!(stats.photos.duplicate_groups, 1);
        assert_eq!(stats.photos.wasted_bytes, 8);
        assert_eq!(stats.videos, KindTotals::default());
    }

    #[test]
    fn folder_stats_count_every_group_member() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_batch(
                MediaKind::Photo,
                &[
                    photo("/one/a.jpg", b"dup"),
                    photo("/two/a.jpg", b"dup"),
                    photo("/two/b.jpg", b"solo"),
                ],
            )
            .unwrap();
        store
            .insert_batch(MediaKind::Video, &[video("/three/c.mp4", b"clip")])
            .unwrap();

        let folders = store.folder_stats().unwrap();
        assert_eq!(folders["/one"].photos.duplicate_count, 1);
        assert_eq!(folders["/one"].photos.duplicate_bytes, 3);
        assert_eq!(folders["/two"].photos.count, 2);
        assert_eq!(folders["/two"].photos.duplicate_count, 1);
        assert_eq!(folders["/three"].videos.count, 1);
        assert_eq!(folders["/three"].photos, FolderKindStats::default());
    }

    #[test]
    fn folder_hash_index_is_non_recursive_and_spans_kinds() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_batch(
                MediaKind::Photo,
                &[photo("/root/a.jpg", b"a"), photo("/root/sub/b.jpg", b"b")],
            )
            .unwrap();
        store
            .insert_batch(MediaKind::Video, &[video("/root/c.mp4", b"c")])
            .unwrap();

        let index = store.folder_hash_index().unwrap();
        assert_eq!(index["/root"].len(), 2);
        assert_eq!(index["/root/sub"].len(), 1);
    }

    #[test]
    fn list_respects_kind_and_limit() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_batch(
                MediaKind::Photo,
                &[photo("/p/a.jpg", b"a"), photo("/p/b.jpg", b"b")],
            )
            .unwrap();
        store
            .insert_batch(MediaKind::Video, &[video("/v/a.mp4", b"v")])
            .unwrap();

        assert_eq!(store.list(None, None).unwrap().len(), 3);
        assert_eq!(store.list(None, Some(2)).unwrap().len(), 2);
        assert_eq!(store.list(None, Some(0)).unwrap().len(), 0);
        assert_eq!(store.list(Some(MediaKind::Video), None).unwrap().len(), 1);
        assert_eq!(store.indexed_paths().unwrap().len(), 3);
    }

    #[test]
    fn scan_state_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        let dir = Path::new("/photos");
        assert!(store.scan_state(dir).unwrap().is_none());

        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        store
            .record_scan_state(&ScanState {
                directory: dir.to_path_buf(),
                last_scan_time: now,
                file_count: 12,
            })
            .unwrap();

        let state = store.scan_state(dir).unwrap().unwrap();
        assert_eq!(state.file_count, 12);
        assert_eq!(state.last_scan_time, now);

        let all = store.scan_states().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].directory, dir);
    }

    #[test]
    fn clear_removes_everything_and_restarts_ids() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_batch(MediaKind::Photo, &[photo("/p/a.jpg", b"a")])
            .unwrap();

        store.clear().unwrap();
        assert!(store.indexed_paths().unwrap().is_empty());

        store
            .insert_batch(MediaKind::Photo, &[photo("/p/b.jpg", b"b")])
            .unwrap();
        assert_eq!(store.list_all(MediaKind::Photo).unwrap()[0].id, 1);
    }
}
