//! Per-user similarity pass
//!
//! Each user is processed on its own: corpus, scan and persistence. A
//! failure is recorded in that user's [`UserReport`] and the pass moves on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Serialize, Serializer};

use crate::config::{Scope, SimilarityConfig};
use crate::error::{FeedsimError, Result};
use crate::similarity::{
    find_similar_pairs_parallel, Corpus, Document, ScanOptions, SimilarPair, Vectorizer,
};
use crate::store::{EntryStore, InsertOutcome, User};
use crate::trace_time;

/// Corpora smaller than this have nothing to compare
pub const MIN_CORPUS_SIZE: usize = 2;

/// Shared cancellation signal, checked between users and between corpora
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<FeedsimError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.collect_str(e),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Default, Serialize)]
pub struct UserReport {
    pub user_id: i64,
    pub username: String,
    /// Corpora actually scanned (one per user, or one per feed)
    pub corpora: usize,
    pub entries: usize,
    /// Qualifying pairs found by the scan
    pub candidates: usize,
    /// New edges written
    pub created: usize,
    /// Candidates already stored in either direction
    pub skipped_existing: usize,
    pub invalid_documents: usize,
    #[serde(
        serialize_with = "serialize_error",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<FeedsimError>,
}

impl UserReport {
    fn new(user: &User) -> Self {
        UserReport {
            user_id: user.id,
            username: user.username.clone(),
            ..UserReport::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default, Serialize)]
pub struct PassReport {
    pub users: Vec<UserReport>,
    /// Users not started because the pass was cancelled
    pub skipped_users: usize,
    pub interrupted: bool,
}

impl PassReport {
    pub fn total_created(&self) -> usize {
        self.users.iter().map(|u| u.created).sum()
    }

    pub fn failed_users(&self) -> usize {
        self.users.iter().filter(|u| !u.is_ok()).count()
    }

    /// First per-user failure, in user order
    pub fn first_error(&self) -> Option<&FeedsimError> {
        self.users.iter().find_map(|u| u.error.as_ref())
    }

    /// Take the error the pass should exit with: the first user failure,
    /// otherwise [`FeedsimError::Interrupted`] when cancelled
    pub fn into_first_error(self) -> Option<FeedsimError> {
        let interrupted = self.interrupted;
        self.users
            .into_iter()
            .find_map(|u| u.error)
            .or_else(|| interrupted.then_some(FeedsimError::Interrupted))
    }
}

/// Run near-duplicate detection for every user in the store.
///
/// Only failures that prevent the pass from starting (invalid config,
/// listing users) are returned as `Err`; everything else lands in the
/// report.
pub fn run_similarity_pass(
    store: &dyn EntryStore,
    config: &SimilarityConfig,
    cancel: &CancelFlag,
) -> Result<PassReport> {
    config.validate()?;
    let vectorizer = config.vectorizer();
    let users = store.list_users()?;
    tracing::info!(users = users.len(), threshold = config.threshold, "similarity pass started");

    let mut report = PassReport::default();
    for (index, user) in users.iter().enumerate() {
        if cancel.is_cancelled() {
            report.interrupted = true;
            report.skipped_users = users.len() - index;
            tracing::warn!(skipped = report.skipped_users, "similarity pass interrupted");
            break;
        }

        let user_report = run_user(store, config, &vectorizer, cancel, user);
        if let Some(err) = &user_report.error {
            tracing::error!(user_id = user.id, error = %err, "user run failed");
        }
        report.users.push(user_report);
    }

    if cancel.is_cancelled() {
        report.interrupted = true;
    }

    tracing::info!(
        created = report.total_created(),
        failed_users = report.failed_users(),
        "similarity pass finished"
    );
    Ok(report)
}

#[tracing::instrument(skip_all, fields(user_id = user.id))]
fn run_user(
    store: &dyn EntryStore,
    config: &SimilarityConfig,
    vectorizer: &Vectorizer,
    cancel: &CancelFlag,
    user: &User,
) -> UserReport {
    let mut report = UserReport::new(user);
    if let Err(err) = process_user(store, config, vectorizer, cancel, user, &mut report) {
        report.error = Some(match err {
            FeedsimError::Interrupted => FeedsimError::Interrupted,
            other => FeedsimError::UserRunFailed {
                user_id: user.id,
                reason: other.to_string(),
            },
        });
    }
    report
}

fn process_user(
    store: &dyn EntryStore,
    config: &SimilarityConfig,
    vectorizer: &Vectorizer,
    cancel: &CancelFlag,
    user: &User,
    report: &mut UserReport,
) -> Result<()> {
    let scopes: Vec<Option<i64>> = match config.scope {
        Scope::User => vec![None],
        Scope::Feed => store
            .list_feeds(user.id)?
            .into_iter()
            .map(|f| Some(f.id))
            .collect(),
    };

    let options = ScanOptions {
        threshold: config.threshold,
        workers: config.workers,
        queue_capacity: config.queue_capacity,
        task_timeout: config.task_timeout(),
    };

    for feed_id in scopes {
        if cancel.is_cancelled() {
            return Err(FeedsimError::Interrupted);
        }

        let entries = store.list_entries(user.id, feed_id)?;
        report.entries += entries.len();
        if entries.len() < MIN_CORPUS_SIZE {
            tracing::debug!(?feed_id, entries = entries.len(), "corpus too small, skipping");
            continue;
        }

        let start = Instant::now();
        let documents: Vec<Document> = entries.iter().map(Document::from_entry).collect();
        let corpus = Arc::new(Corpus::build(documents, vectorizer));
        trace_time!(start, "build_corpus", documents = corpus.len());
        report.corpora += 1;
        report.invalid_documents += corpus.invalid_documents();

        let start = Instant::now();
        let pairs = find_similar_pairs_parallel(&corpus, &options)?;
        trace_time!(start, "scan_corpus", pairs = pairs.len());
        report.candidates += pairs.len();

        persist(store, &pairs, report)?;
    }

    tracing::debug!(
        created = report.created,
        skipped_existing = report.skipped_existing,
        "user run complete"
    );
    Ok(())
}

/// Write candidate edges, skipping pairs already stored in either direction
fn persist(store: &dyn EntryStore, pairs: &[SimilarPair], report: &mut UserReport) -> Result<()> {
    for pair in pairs {
        let existing = store.list_similar_edges(pair.source)?;
        if existing.iter().any(|e| e.connects(pair.source, pair.target)) {
            report.skipped_existing += 1;
            continue;
        }

        match store.insert_similar_edge(&pair.to_edge())? {
            InsertOutcome::Inserted => {
                report.created += 1;
                tracing::debug!(
                    source = pair.source,
                    target = pair.target,
                    score = pair.score,
                    "similar edge created"
                );
            }
            InsertOutcome::AlreadyExists => report.skipped_existing += 1,
        }
    }
    Ok(())
}
