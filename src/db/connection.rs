use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;

type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum Request {
    Run(Job),
    Stop,
}

/// Joins the worker when the last [`Database`] clone goes away.
struct Worker {
    requests: mpsc::Sender<Request>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        let handle = match self.thread.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(handle) = handle else {
            return;
        };

        if let Err(err) = self.requests.send(Request::Stop) {
            error!("Failed to stop highlight DB thread: {err}");
        }
        if let Err(err) = handle.join() {
            error!("Highlight DB thread panicked: {err:?}");
        }
    }
}

/// SQLite connection owned by one worker thread.
///
/// Async callers hand the worker a closure and await its reply, so one
/// connection serves every context that shares the store.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
}

fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database at {}", path.display()))?;
    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        error!("Failed to enable WAL mode: {err}");
    }
    Ok(conn)
}

fn serve(mut conn: Connection, requests: mpsc::Receiver<Request>) {
    for request in requests {
        match request {
            Request::Run(job) => job(&mut conn),
            Request::Stop => break,
        }
    }
    info!("Highlight DB thread stopped");
}

impl Database {
    /// Open (creating parent directories) and migrate the database at `path`.
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let (requests_tx, requests_rx) = mpsc::channel::<Request>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();
        let thread_path = path.clone();

        let thread = thread::Builder::new()
            .name("highlight-db".into())
            .spawn(move || {
                let opened = open(&thread_path).and_then(|mut conn| {
                    run_migrations(&mut conn).context("failed to run database migrations")?;
                    Ok(conn)
                });
                match opened {
                    Ok(conn) => {
                        if ready_tx.send(Ok(())).is_ok() {
                            serve(conn, requests_rx);
                        }
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                    }
                }
            })
            .context("failed to spawn highlight DB thread")?;

        ready_rx
            .recv()
            .context("highlight DB thread exited during startup")??;
        info!("Highlight database ready at {}", path.display());

        Ok(Self {
            worker: Arc::new(Worker {
                requests: requests_tx,
                thread: Mutex::new(Some(thread)),
            }),
        })
    }

    /// Run `task` on the worker thread and await its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |conn| {
            if reply_tx.send(task(conn)).is_err() {
                error!("DB caller went away before its reply");
            }
        });

        self.worker
            .requests
            .send(Request::Run(job))
            .map_err(|_| anyhow!("highlight DB thread is not running"))?;
        reply_rx
            .await
            .map_err(|_| anyhow!("highlight DB thread dropped the request"))?
    }
}
