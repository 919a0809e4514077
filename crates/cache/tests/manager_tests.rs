//! Restore-or-install behavior of the cache manager against recording fakes.

use async_trait::async_trait;
use rigup_cache::{
    CacheLookup, CacheManager, CacheState, DirectoryCache, LocalDirectoryCache, SaveOutcome,
};
use rigup_core::{CommandOutput, CommandRunner, CommandSpec, Error, Result, Toolchain};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Copy)]
enum RestoreBehavior {
    Hit,
    Miss,
    Fail,
}

struct FakeCache {
    journal: Journal,
    restore: RestoreBehavior,
    save_fails: bool,
    saved: Mutex<Vec<(Vec<PathBuf>, String)>>,
}

impl FakeCache {
    fn new(journal: &Journal, restore: RestoreBehavior) -> Self {
        Self {
            journal: journal.clone(),
            restore,
            save_fails: false,
            saved: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DirectoryCache for FakeCache {
    async fn restore(&self, dirs: &[PathBuf], key: &str) -> Result<CacheLookup> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("restore {key} {}", dirs.len()));
        match self.restore {
            RestoreBehavior::Hit => Ok(CacheLookup::Hit { key: key.into() }),
            RestoreBehavior::Miss => Ok(CacheLookup::Miss),
            RestoreBehavior::Fail => Err(Error::cache(key, "backend offline")),
        }
    }

    async fn save(&self, dirs: &[PathBuf], key: &str) -> Result<SaveOutcome> {
        self.journal.lock().unwrap().push(format!("save {key}"));
        self.saved
            .lock()
            .unwrap()
            .push((dirs.to_vec(), key.to_string()));
        if self.save_fails {
            Err(Error::cache(key, "quota exceeded"))
        } else {
            Ok(SaveOutcome::Written)
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

struct FakeRunner {
    journal: Journal,
    exit_code: Option<i32>,
    spawn_fails: bool,
}

impl FakeRunner {
    fn exiting(journal: &Journal, exit_code: Option<i32>) -> Self {
        Self {
            journal: journal.clone(),
            exit_code,
            spawn_fails: false,
        }
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("run {}", spec.args.join(" ")));
        if self.spawn_fails {
            return Err(Error::process(
                spec.program_name(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            ));
        }
        Ok(CommandOutput::new(self.exit_code, ""))
    }
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

#[tokio::test]
async fn hit_skips_install_and_save() {
    let journal = Journal::default();
    let cache = FakeCache::new(&journal, RestoreBehavior::Hit);
    let runner = FakeRunner::exiting(&journal, Some(0));
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("cache-renpy");

    let outcome = CacheManager::new(&cache, &runner)
        .ensure_runtime(&Toolchain::new("/opt/renkit"), "7.5.3", &dir)
        .await
        .unwrap();

    assert_eq!(outcome.state, CacheState::Hit);
    assert_eq!(outcome.key.as_str(), "depcache-7.5.3");
    assert!(!outcome.saved);
    assert_eq!(entries(&journal), vec!["restore depcache-7.5.3 1"]);
}

#[tokio::test]
async fn miss_installs_then_saves_same_dir_and_key() {
    let journal = Journal::default();
    let cache = FakeCache::new(&journal, RestoreBehavior::Miss);
    let runner = FakeRunner::exiting(&journal, Some(0));
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("cache-renpy");

    let outcome = CacheManager::new(&cache, &runner)
        .ensure_runtime(&Toolchain::new("/opt/renkit"), "7.5.3", &dir)
        .await
        .unwrap();

    assert_eq!(outcome.state, CacheState::Miss);
    assert!(outcome.saved);
    assert!(dir.is_dir());

    let expected_install = format!("run install -r={} -v=7.5.3", dir.display());
    assert_eq!(
        entries(&journal),
        vec![
            "restore depcache-7.5.3 1".to_string(),
            expected_install,
            "save depcache-7.5.3".to_string(),
        ]
    );

    let saved = cache.saved.lock().unwrap();
    assert_eq!(saved.as_slice(), &[(vec![dir], "depcache-7.5.3".to_string())]);
}

#[tokio::test]
async fn failed_install_is_fatal_and_never_saves() {
    let journal = Journal::default();
    let cache = FakeCache::new(&journal, RestoreBehavior::Miss);
    let runner = FakeRunner::exiting(&journal, Some(3));
    let tmp = TempDir::new().unwrap();

    let err = CacheManager::new(&cache, &runner)
        .ensure_runtime(
            &Toolchain::new("/opt/renkit"),
            "8.2.0",
            &tmp.path().join("cache"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InstallFailed { ref version, .. } if version == "8.2.0"));
    assert!(err.to_string().contains("8.2.0"));
    assert!(cache.saved.lock().unwrap().is_empty());
    assert!(!entries(&journal).iter().any(|e| e.starts_with("save")));
}

#[tokio::test]
async fn spawn_failure_is_install_failure() {
    let journal = Journal::default();
    let cache = FakeCache::new(&journal, RestoreBehavior::Miss);
    let runner = FakeRunner {
        journal: journal.clone(),
        exit_code: None,
        spawn_fails: true,
    };
    let tmp = TempDir::new().unwrap();

    let err = CacheManager::new(&cache, &runner)
        .ensure_runtime(&Toolchain::new("/opt/renkit"), "7.5.3", tmp.path())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InstallFailed { .. }));
    assert!(cache.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn restore_error_degrades_to_miss() {
    let journal = Journal::default();
    let cache = FakeCache::new(&journal, RestoreBehavior::Fail);
    let runner = FakeRunner::exiting(&journal, Some(0));
    let tmp = TempDir::new().unwrap();

    let outcome = CacheManager::new(&cache, &runner)
        .ensure_runtime(&Toolchain::new("/opt/renkit"), "7.5.3", tmp.path())
        .await
        .unwrap();

    assert_eq!(outcome.state, CacheState::Miss);
    assert_eq!(entries(&journal).len(), 3);
}

#[tokio::test]
async fn save_error_is_not_fatal() {
    let journal = Journal::default();
    let mut cache = FakeCache::new(&journal, RestoreBehavior::Miss);
    cache.save_fails = true;
    let runner = FakeRunner::exiting(&journal, Some(0));
    let tmp = TempDir::new().unwrap();

    let outcome = CacheManager::new(&cache, &runner)
        .ensure_runtime(&Toolchain::new("/opt/renkit"), "7.5.3", tmp.path())
        .await
        .unwrap();

    assert_eq!(outcome.state, CacheState::Miss);
    assert!(!outcome.saved);
}

#[tokio::test]
async fn second_run_hits_local_store() {
    let journal = Journal::default();
    let store = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let cache = LocalDirectoryCache::new(store.path());
    let dir = work.path().join("cache-renpy");

    // The fake installer leaves nothing behind, so seed the directory.
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("runtime.txt"), b"7.5.3").unwrap();

    let toolchain = Toolchain::new("/opt/renkit");
    let runner = FakeRunner::exiting(&journal, Some(0));
    let manager = CacheManager::new(&cache, &runner);

    let first = manager.ensure_runtime(&toolchain, "7.5.3", &dir).await.unwrap();
    assert_eq!(first.state, CacheState::Miss);
    assert!(first.saved);

    std::fs::remove_dir_all(&dir).unwrap();
    let second = manager.ensure_runtime(&toolchain, "7.5.3", &dir).await.unwrap();
    assert!(second.is_hit());
    assert_eq!(std::fs::read(dir.join("runtime.txt")).unwrap(), b"7.5.3");
    assert_eq!(entries(&journal).len(), 1);
}

#[tokio::test]
async fn corrupt_entry_reinstalls_without_claiming_a_save() {
    let journal = Journal::default();
    let store = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let entry = store.path().join("depcache-7.5.3");
    std::fs::create_dir_all(&entry).unwrap();
    std::fs::write(entry.join("0.tar.zst"), b"not an archive").unwrap();

    let cache = LocalDirectoryCache::new(store.path());
    let runner = FakeRunner::exiting(&journal, Some(0));
    let dir = work.path().join("cache-renpy");

    let outcome = CacheManager::new(&cache, &runner)
        .ensure_runtime(&Toolchain::new("/opt/renkit"), "7.5.3", &dir)
        .await
        .unwrap();

    assert_eq!(outcome.state, CacheState::Miss);
    assert!(!outcome.saved);
    assert_eq!(entries(&journal).len(), 1);
    assert_eq!(
        std::fs::read(entry.join("0.tar.zst")).unwrap(),
        b"not an archive"
    );
}
