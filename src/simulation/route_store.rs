//! Route persistence
//!
//! [`RouteStore`] is the collaborator that owns saved routes. The frame loop
//! never calls it directly: requests go through [`RouteRequests`], which runs
//! the store on a worker thread and hands results back via a channel that is
//! polled once per frame.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};

use super::route::{Route, RouteSummary};

/// Storage for named routes
pub trait RouteStore {
    /// Summaries of every route, most recently updated first
    fn list_summaries(&self) -> Result<Vec<RouteSummary>>;

    fn fetch(&self, id: &str) -> Result<Option<Route>>;

    /// Insert a new route or replace the one with the same id
    fn upsert(&mut self, route: Route) -> Result<()>;

    /// Delete a route. Only its author may do this.
    fn delete(&mut self, id: &str, caller: &str) -> Result<()>;

    fn by_author(&self, author: &str) -> Result<Vec<RouteSummary>> {
        Ok(self
            .list_summaries()?
            .into_iter()
            .filter(|s| s.author == author)
            .collect())
    }

    fn by_difficulty(&self, difficulty: &str) -> Result<Vec<RouteSummary>> {
        Ok(self
            .list_summaries()?
            .into_iter()
            .filter(|s| s.difficulty.as_deref() == Some(difficulty))
            .collect())
    }
}

fn sorted_summaries<'a>(routes: impl Iterator<Item = &'a Route>) -> Vec<RouteSummary> {
    let mut summaries: Vec<RouteSummary> = routes.map(Route::summary).collect();
    summaries.sort_by(|a, b| b.updated.cmp(&a.updated).then_with(|| a.id.cmp(&b.id)));
    summaries
}

fn check_delete(routes: &HashMap<String, Route>, id: &str, caller: &str) -> Result<()> {
    let route = routes
        .get(id)
        .with_context(|| format!("Route {} not found", id))?;
    if route.author != caller {
        bail!("Only the author can delete this route");
    }
    Ok(())
}

/// Routes kept in memory for the life of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryRouteStore {
    routes: HashMap<String, Route>,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteStore for MemoryRouteStore {
    fn list_summaries(&self) -> Result<Vec<RouteSummary>> {
        Ok(sorted_summaries(self.routes.values()))
    }

    fn fetch(&self, id: &str) -> Result<Option<Route>> {
        Ok(self.routes.get(id).cloned())
    }

    fn upsert(&mut self, route: Route) -> Result<()> {
        self.routes.insert(route.id.clone(), route);
        Ok(())
    }

    fn delete(&mut self, id: &str, caller: &str) -> Result<()> {
        check_delete(&self.routes, id, caller)?;
        self.routes.remove(id);
        Ok(())
    }
}

/// Routes stored as a JSON array in a single file.
///
/// The file is read once on open and rewritten after every change.
#[derive(Debug, Clone)]
pub struct JsonRouteStore {
    path: PathBuf,
    routes: HashMap<String, Route>,
}

impl JsonRouteStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let routes = if path.exists() {
            read_routes(&path)?
                .into_iter()
                .map(|r| (r.id.clone(), r))
                .collect()
        } else {
            HashMap::new()
        };
        info!("Opened route store {} ({} routes)", path.display(), routes.len());
        Ok(Self { path, routes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let mut routes: Vec<&Route> = self.routes.values().collect();
        routes.sort_by(|a, b| a.id.cmp(&b.id));
        let json = serde_json::to_string_pretty(&routes).context("Failed to encode routes")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!("Wrote {} routes to {}", routes.len(), self.path.display());
        Ok(())
    }
}

impl RouteStore for JsonRouteStore {
    fn list_summaries(&self) -> Result<Vec<RouteSummary>> {
        Ok(sorted_summaries(self.routes.values()))
    }

    fn fetch(&self, id: &str) -> Result<Option<Route>> {
        Ok(self.routes.get(id).cloned())
    }

    fn upsert(&mut self, route: Route) -> Result<()> {
        let previous = self.routes.insert(route.id.clone(), route.clone());
        if let Err(err) = self.persist() {
            // Keep memory in step with the file
            match previous {
                Some(prev) => self.routes.insert(prev.id.clone(), prev),
                None => self.routes.remove(&route.id),
            };
            return Err(err);
        }
        Ok(())
    }

    fn delete(&mut self, id: &str, caller: &str) -> Result<()> {
        check_delete(&self.routes, id, caller)?;
        let removed = self.routes.remove(id);
        if let Err(err) = self.persist() {
            if let Some(route) = removed {
                self.routes.insert(route.id.clone(), route);
            }
            return Err(err);
        }
        Ok(())
    }
}

/// Read a JSON array of routes from disk
pub fn read_routes(path: &Path) -> Result<Vec<Route>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid route file {}", path.display()))
}

/// Read a single route record from disk
pub fn read_route(path: &Path) -> Result<Route> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid route file {}", path.display()))
}

/// Work for the store worker
#[derive(Debug, Clone, PartialEq)]
pub enum RouteRequest {
    List,
    Fetch { id: String },
    Save { route: Route },
    Delete { id: String, caller: String },
    ByAuthor { author: String },
    ByDifficulty { difficulty: String },
}

/// Completed store work. Errors arrive as `Failed` with a message fit for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteResponse {
    Listed(Vec<RouteSummary>),
    Fetched(Option<Route>),
    Saved { id: String },
    Deleted { id: String },
    Failed { message: String },
}

fn handle_request<S: RouteStore>(store: &mut S, request: RouteRequest) -> Result<RouteResponse> {
    Ok(match request {
        RouteRequest::List => RouteResponse::Listed(store.list_summaries()?),
        RouteRequest::Fetch { id } => RouteResponse::Fetched(store.fetch(&id)?),
        RouteRequest::Save { route } => {
            let id = route.id.clone();
            store.upsert(route)?;
            RouteResponse::Saved { id }
        }
        RouteRequest::Delete { id, caller } => {
            store.delete(&id, &caller)?;
            RouteResponse::Deleted { id }
        }
        RouteRequest::ByAuthor { author } => RouteResponse::Listed(store.by_author(&author)?),
        RouteRequest::ByDifficulty { difficulty } => {
            RouteResponse::Listed(store.by_difficulty(&difficulty)?)
        }
    })
}

/// Runs a store on a worker thread. Submit requests, then `poll` each frame.
pub struct RouteRequests {
    sender: Option<Sender<RouteRequest>>,
    /// Behind a mutex only so the handle is `Sync`; `poll` takes `&mut self`
    receiver: Mutex<Receiver<RouteResponse>>,
    worker: Option<JoinHandle<()>>,
    in_flight: usize,
}

impl RouteRequests {
    pub fn spawn<S>(mut store: S) -> Self
    where
        S: RouteStore + Send + 'static,
    {
        let (request_tx, request_rx) = channel::<RouteRequest>();
        let (response_tx, response_rx) = channel::<RouteResponse>();

        let worker = thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                let response = handle_request(&mut store, request).unwrap_or_else(|err| {
                    warn!("Route request failed: {:#}", err);
                    RouteResponse::Failed {
                        message: err.to_string(),
                    }
                });
                if response_tx.send(response).is_err() {
                    break;
                }
            }
        });

        Self {
            sender: Some(request_tx),
            receiver: Mutex::new(response_rx),
            worker: Some(worker),
            in_flight: 0,
        }
    }

    pub fn submit(&mut self, request: RouteRequest) -> Result<()> {
        let sender = self.sender.as_ref().context("Route worker has shut down")?;
        sender
            .send(request)
            .ok()
            .context("Route worker has shut down")?;
        self.in_flight += 1;
        Ok(())
    }

    /// Collect every response that is ready, without blocking
    pub fn poll(&mut self) -> Vec<RouteResponse> {
        let receiver = self.receiver.get_mut().unwrap_or_else(PoisonError::into_inner);
        let mut ready = Vec::new();
        loop {
            match receiver.try_recv() {
                Ok(response) => ready.push(response),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.in_flight > ready.len() {
                        ready.push(RouteResponse::Failed {
                            message: "Route worker stopped".to_string(),
                        });
                        self.in_flight = ready.len();
                    }
                    break;
                }
            }
        }
        self.in_flight = self.in_flight.saturating_sub(ready.len());
        ready
    }

    /// Requests submitted whose responses haven't been polled yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Drop for RouteRequests {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Route worker panicked");
            }
        }
    }
}
