use crate::adapter::gateway::error::RepositoryError;
use fs2::FileExt;
use linked_hash_map::LinkedHashMap;
use std::fs::{self, File, OpenOptions};
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;
use yaml_rust::{Yaml, YamlEmitter, YamlLoader};

const LOCK_FILE_NAME: &str = ".lock";

// <dir>/<id>/<file_name> を全て読み込み、root_key 以下の値を返す
pub fn read_documents(
    dir: &Path,
    file_name: &str,
    root_key: &str,
) -> Result<Vec<(PathBuf, Yaml)>, RepositoryError> {
    let mut documents = vec![];

    if !dir.exists() {
        debug!(dir = %dir.display(), "storage directory does not exist yet");
        return Ok(documents);
    }

    for entry in WalkDir::new(dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_name() != file_name {
            continue;
        }

        let path = entry.path().to_path_buf();
        let lock = open_lock(&path)?;
        lock.lock_shared().map_err(|e| RepositoryError::io(&path, e))?;

        let mut text = String::new();
        let read = File::open(&path).and_then(|mut file| file.read_to_string(&mut text));
        release(&lock, &path);
        read.map_err(|e| RepositoryError::io(&path, e))?;

        let mut docs = YamlLoader::load_from_str(&text).map_err(|source| RepositoryError::Yaml {
            path: path.clone(),
            source,
        })?;
        if docs.is_empty() {
            return Err(RepositoryError::malformed(&path, "empty document"));
        }

        let doc = docs.remove(0);
        let body = doc[root_key].clone();
        if body.is_badvalue() {
            return Err(RepositoryError::malformed(
                &path,
                format!("missing '{}' key", root_key),
            ));
        }
        documents.push((path, body));
    }

    Ok(documents)
}

// 書き込み中の文書を他から読まれないよう、一時ファイルに書いてから置き換える
pub fn write_document(
    dir: &Path,
    file_name: &str,
    root_key: &str,
    body: Yaml,
) -> Result<PathBuf, RepositoryError> {
    fs::create_dir_all(dir).map_err(|e| RepositoryError::io(dir, e))?;

    let path = dir.join(file_name);
    let tmp_path = dir.join(format!("{}.tmp", file_name));

    let mut root_hash = LinkedHashMap::new();
    root_hash.insert(Yaml::String(String::from(root_key)), body);
    let doc = Yaml::Hash(root_hash);

    let mut out_str = String::new();
    let mut emitter = YamlEmitter::new(&mut out_str);
    emitter
        .dump(&doc)
        .map_err(|e| RepositoryError::Emit(format!("{:?}", e)))?;
    out_str += "\n";

    let lock = open_lock(&path)?;
    lock.lock_exclusive()
        .map_err(|e| RepositoryError::io(&path, e))?;

    let written = File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(out_str.as_bytes())?;
            file.sync_all()
        })
        .and_then(|_| fs::rename(&tmp_path, &path));
    release(&lock, &path);
    written.map_err(|e| RepositoryError::io(&path, e))?;

    debug!(path = %path.display(), "document written");
    Ok(path)
}

pub fn remove_document_dir(dir: &Path) -> Result<(), RepositoryError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(RepositoryError::io(dir, err)),
    }
}

// 解放に失敗してもファイルを閉じた時点でロックは外れる
fn release(lock: &File, document_path: &Path) {
    if let Err(err) = lock.unlock() {
        warn!(path = %document_path.display(), %err, "failed to release the lock");
    }
}

fn open_lock(document_path: &Path) -> Result<File, RepositoryError> {
    let lock_path = document_path
        .parent()
        .map(|dir| dir.join(LOCK_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(LOCK_FILE_NAME));

    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| RepositoryError::io(lock_path, e))
}

#[cfg(test)]
pub(crate) fn temp_storage_dir() -> PathBuf {
    std::env::temp_dir().join(format!("abalookup-test-{}", uuid::Uuid::new_v4()))
}

#[test]
fn test_write_document_書き込んだ文書を読み込めること() {
    let dir = temp_storage_dir();
    let mut hash = LinkedHashMap::new();
    hash.insert(Yaml::String("name".to_string()), Yaml::String("Somewhere".to_string()));

    write_document(&dir.join("a"), "doc.yaml", "root", Yaml::Hash(hash)).unwrap();
    let documents = read_documents(&dir, "doc.yaml", "root").unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].1["name"].as_str(), Some("Somewhere"));
    assert!(!dir.join("a").join("doc.yaml.tmp").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_write_document_読み込んだ後に上書きできること() {
    let dir = temp_storage_dir();
    let doc_dir = dir.join("a");

    write_document(&doc_dir, "doc.yaml", "root", Yaml::Integer(1)).unwrap();
    assert_eq!(read_documents(&dir, "doc.yaml", "root").unwrap()[0].1, Yaml::Integer(1));

    // 読み込み時の共有ロックが残っていれば排他ロックが取れない
    let lock = open_lock(&doc_dir.join("doc.yaml")).unwrap();
    lock.try_lock_exclusive().unwrap();
    release(&lock, &doc_dir.join("doc.yaml"));

    write_document(&doc_dir, "doc.yaml", "root", Yaml::Integer(2)).unwrap();
    assert_eq!(read_documents(&dir, "doc.yaml", "root").unwrap()[0].1, Yaml::Integer(2));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_read_documents_ディレクトリが無い場合は空() {
    let dir = temp_storage_dir();

    assert!(read_documents(&dir, "doc.yaml", "root").unwrap().is_empty());
}

#[test]
fn test_read_documents_ルートのキーが無い場合() {
    let dir = temp_storage_dir();
    let doc_dir = dir.join("a");
    fs::create_dir_all(&doc_dir).unwrap();
    fs::write(doc_dir.join("doc.yaml"), "other: 1\n").unwrap();

    let actual = read_documents(&dir, "doc.yaml", "root");
    assert!(matches!(actual, Err(RepositoryError::Malformed { .. })));

    fs::remove_dir_all(&dir).unwrap();
}
