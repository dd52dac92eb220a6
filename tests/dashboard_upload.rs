//! Dashboard Upload Tests
//!
//! Integration tests driving a dashboard session over the local backend
//! and over a backend that always fails.

use std::cell::Cell;

use tempfile::TempDir;
use uptree::tree::{FileEntry, FolderEntry, Node, Payload, RawEntry};
use uptree::upload::{LocalBackend, ObjectStore, ResourceBackend, UploadKind};
use uptree::{Dashboard, Result, UptreeError};

/// Backend whose every call fails.
struct FailingBackend {
    calls: Cell<usize>,
}

impl FailingBackend {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        self.calls.set(self.calls.get() + 1);
        Err(UptreeError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "backend unavailable",
        )))
    }
}

impl ResourceBackend for FailingBackend {
    async fn fetch_resources(&self) -> Result<Vec<Node>> {
        self.fail()
    }

    async fn upload_files(&self, _: &[FileEntry], _: &[Payload]) -> Result<Vec<FileEntry>> {
        self.fail()
    }

    async fn upload_folder(
        &self,
        _: &FolderEntry,
        _: &[Payload],
        _: &[String],
    ) -> Result<FolderEntry> {
        self.fail()
    }
}

fn create_dashboard(max_upload_size: u64) -> (TempDir, Dashboard<LocalBackend>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ObjectStore::new(temp_dir.path()).expect("Failed to create store");
    let backend = LocalBackend::new(store, "tester");
    (temp_dir, Dashboard::new(backend, "Home", max_upload_size))
}

fn raw(path: &str, content: &[u8]) -> RawEntry {
    RawEntry::new(path, content.len() as u64, Payload::from_bytes(content.to_vec()))
}

fn sample_folder() -> Vec<RawEntry> {
    vec![
        raw("a/b/c/doc.pdf", &[1; 10]),
        raw("a/b/e.txt", &[2; 5]),
        raw("a/f.txt", &[3; 3]),
    ]
}

fn names(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(Node::name).collect()
}

#[tokio::test]
async fn test_folder_upload_then_browse() {
    let (_temp_dir, mut dashboard) = create_dashboard(1024);
    assert_eq!(dashboard.load().await.unwrap(), 0);

    let summary = dashboard.select_folder(&sample_folder()).unwrap();
    assert_eq!(summary.kind, UploadKind::Folder);
    assert_eq!(summary.total_size, 18);

    let uploaded = dashboard.submit().await.unwrap();
    assert_eq!(uploaded.len(), 1);
    assert!(uploaded[0].id().is_some());
    assert!(dashboard.staged().is_none());
    assert_eq!(names(dashboard.displayed()), vec!["a"]);

    assert!(dashboard.open_by_name("a").unwrap());
    assert_eq!(dashboard.navigation().breadcrumbs(), ["Home", "a"]);
    assert_eq!(names(dashboard.displayed()), vec!["b", "f.txt"]);

    assert!(dashboard.open_by_name("b").unwrap());
    assert_eq!(dashboard.displayed().len(), 2);
    let c = dashboard
        .displayed()
        .iter()
        .find(|n| n.name() == "c")
        .unwrap();
    assert_eq!(c.size(), 10);
    assert_eq!(c.relative_path(), "a/b/c");

    dashboard.ascend(0).unwrap();
    assert_eq!(names(dashboard.displayed()), vec!["a"]);
    assert!(dashboard.navigation().listing("b").is_none());
}

#[tokio::test]
async fn test_uploads_survive_reload() {
    let (temp_dir, mut dashboard) = create_dashboard(1024);
    dashboard.load().await.unwrap();
    dashboard.select_folder(&sample_folder()).unwrap();
    dashboard.submit().await.unwrap();
    dashboard
        .select_files(&[RawEntry::loose(
            "report.csv",
            42,
            Payload::from_bytes(vec![0; 42]),
        )])
        .unwrap();
    dashboard.submit().await.unwrap();
    dashboard.teardown();
    assert!(dashboard.displayed().is_empty());

    let store = ObjectStore::new(temp_dir.path()).unwrap();
    let mut reloaded = Dashboard::new(LocalBackend::new(store, "tester"), "Home", 1024);
    assert_eq!(reloaded.load().await.unwrap(), 2);
    assert_eq!(names(reloaded.displayed()), vec!["a", "report.csv"]);

    let Node::Folder(folder) = &reloaded.displayed()[0] else {
        panic!("expected a folder first");
    };
    assert_eq!(folder.verify_totals().unwrap(), 18);
    assert!(reloaded
        .backend()
        .store()
        .exists("uploads/tester/a/b/c/doc.pdf")
        .await);
    assert!(reloaded.backend().store().exists("uploads/tester/report.csv").await);
}

#[tokio::test]
async fn test_upload_while_deep_updates_root_only() {
    let (_temp_dir, mut dashboard) = create_dashboard(1024);
    dashboard.load().await.unwrap();
    dashboard.select_folder(&sample_folder()).unwrap();
    dashboard.submit().await.unwrap();
    dashboard.open(0).unwrap();
    let before: Vec<Node> = dashboard.displayed().to_vec();

    dashboard
        .select_files(&[RawEntry::loose("late.txt", 1, Payload::from_bytes(b"l".to_vec()))])
        .unwrap();
    dashboard.submit().await.unwrap();

    assert_eq!(dashboard.displayed(), before.as_slice());
    assert_eq!(
        names(dashboard.navigation().listing("Home").unwrap()),
        vec!["a", "late.txt"]
    );

    dashboard.back().unwrap();
    assert_eq!(names(dashboard.displayed()), vec!["a", "late.txt"]);
}

#[tokio::test]
async fn test_size_limit_blocks_submit() {
    let (_temp_dir, mut dashboard) = create_dashboard(10);
    dashboard.load().await.unwrap();

    let summary = dashboard.select_folder(&sample_folder()).unwrap();
    assert!(summary.over_limit);

    let result = dashboard.submit().await;

    assert!(matches!(
        result,
        Err(UptreeError::SizeLimitExceeded {
            total: 18,
            limit: 10
        })
    ));
    assert!(dashboard.staged().is_some());
    assert!(dashboard.displayed().is_empty());
    assert!(dashboard.cancel());
    assert!(dashboard.staged().is_none());
}

#[tokio::test]
async fn test_submit_without_selection() {
    let (_temp_dir, mut dashboard) = create_dashboard(10);
    assert!(matches!(
        dashboard.submit().await,
        Err(UptreeError::EmptySelection)
    ));
    assert!(matches!(
        dashboard.select_files(&[]),
        Err(UptreeError::EmptySelection)
    ));
}

#[tokio::test]
async fn test_failed_calls_leave_state_untouched() {
    let mut dashboard = Dashboard::new(FailingBackend::new(), "Home", 1024);

    assert!(dashboard.load().await.is_err());
    assert!(dashboard.displayed().is_empty());
    assert!(dashboard.navigation().listing("Home").is_none());

    dashboard.select_folder(&sample_folder()).unwrap();
    assert!(dashboard.submit().await.is_err());

    assert_eq!(dashboard.backend().calls.get(), 2);
    assert!(dashboard.staged().is_some());
    assert!(dashboard.navigation().listing("Home").is_none());
    assert!(dashboard.displayed().is_empty());
    assert_eq!(dashboard.navigation().breadcrumbs(), ["Home"]);
}

#[tokio::test]
async fn test_cancel_keeps_cache() {
    let (_temp_dir, mut dashboard) = create_dashboard(1024);
    dashboard.load().await.unwrap();
    dashboard.select_folder(&sample_folder()).unwrap();
    dashboard.submit().await.unwrap();

    dashboard.select_folder(&[raw("z/1.txt", b"1")]).unwrap();
    assert!(dashboard.cancel());

    assert_eq!(names(dashboard.displayed()), vec!["a"]);
    assert!(!dashboard.cancel());
}

#[tokio::test]
async fn test_open_file_and_bad_index() {
    let (_temp_dir, mut dashboard) = create_dashboard(1024);
    dashboard.load().await.unwrap();
    dashboard
        .select_files(&[RawEntry::loose("a.txt", 1, Payload::from_bytes(b"a".to_vec()))])
        .unwrap();
    dashboard.submit().await.unwrap();

    assert!(!dashboard.open(0).unwrap());
    assert!(matches!(
        dashboard.open(5),
        Err(UptreeError::NavigationPrecondition(_))
    ));
    assert!(matches!(
        dashboard.ascend(3),
        Err(UptreeError::NavigationPrecondition(_))
    ));
    assert!(matches!(
        dashboard.open_by_name("missing"),
        Err(UptreeError::NotFound(_))
    ));
}
