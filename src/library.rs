//! Library state and the mutations applied to it
//!
//! `Library` owns the ordered game collection and the current selection.
//! Every mutation builds the complete next collection, persists it, and only
//! then replaces the in-memory state, so a failed save leaves both memory and
//! disk at the previous version.
//!
//! Games are identified by position. Callers derive indices from the
//! collection they are displaying; out-of-range indices are rejected with
//! `LibraryError::IndexOutOfRange`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::artwork::{catalog_cover_path, is_managed, process_custom_image};
use crate::catalog::Catalog;
use crate::error::{LibraryError, StoreError};
use crate::game::{Game, GameFields};
use crate::launch::{LaunchSpec, DEFAULT_RUNNER};
use crate::logging::{log_action, log_info, log_warning};
use crate::store::GameStore;

// ============================================================================
// Selection
// ============================================================================

/// Where a selection points after the game at `deleted` was removed.
///
/// The deleted game itself becomes "nothing selected"; later games shift
/// down by one; earlier games are unaffected.
pub fn renumber_selection(selected: Option<usize>, deleted: usize) -> Option<usize> {
    match selected {
        Some(sel) if sel == deleted => None,
        Some(sel) if sel > deleted => Some(sel - 1),
        other => other,
    }
}

// ============================================================================
// Enrichment
// ============================================================================

/// Build a new game from user input, filling in the catalog id and cover art.
///
/// 1. A user-supplied image is resized into `images_dir`.
/// 2. The catalog is searched by name; the first hit provides the id.
/// 3. Without a usable custom image, the hit's cover is downloaded.
///
/// Failures at any step are logged and leave the affected field empty.
pub fn enrich(fields: GameFields, catalog: Option<&dyn Catalog>, images_dir: &Path) -> Game {
    let mut image_url = String::new();
    if !fields.image.is_empty() {
        match process_custom_image(Path::new(&fields.image), images_dir) {
            Ok(path) => image_url = path.to_string_lossy().to_string(),
            Err(e) => log_warning(&format!("Error processing custom image {}: {}", fields.image, e)),
        }
    }

    let mut id = String::new();
    if let Some(catalog) = catalog {
        match catalog.search(&fields.name) {
            Ok(items) => match items.first() {
                Some(item) => {
                    log_info(&format!("Matched '{}' to catalog entry {} ({})", fields.name, item.name, item.id));
                    id = item.id.to_string();

                    if image_url.is_empty() {
                        let dest = catalog_cover_path(images_dir, item.id);
                        match catalog.download_thumbnail(item.id, &dest) {
                            Ok(()) => image_url = dest.to_string_lossy().to_string(),
                            Err(e) => log_warning(&format!("Cover download for {} failed: {}", item.id, e)),
                        }
                    }
                }
                None => log_info(&format!("No catalog match for '{}'", fields.name)),
            },
            Err(e) => log_warning(&format!("Catalog search for '{}' failed: {}", fields.name, e)),
        }
    }

    Game {
        id,
        image_url,
        ..Game::from_fields(fields)
    }
}

/// Whether an edited image path must go through `process_custom_image`.
fn needs_processing(new_image: &str, current_image: &str, images_dir: &Path) -> bool {
    !new_image.is_empty() && new_image != current_image && !is_managed(Path::new(new_image), images_dir)
}

// ============================================================================
// Background Enrichment
// ============================================================================

/// Handle for a queued enrichment. Cancelling drops the result on arrival.
#[derive(Clone, Debug, Default)]
pub struct EnrichTicket {
    cancelled: Arc<AtomicBool>,
}

impl EnrichTicket {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

struct EnrichRequest {
    fields: GameFields,
    ticket: EnrichTicket,
}

struct Finished {
    game: Game,
    ticket: EnrichTicket,
}

/// Runs catalog lookups and image processing off the caller's thread.
///
/// Results come back only through `Library::apply_finished` /
/// `Library::apply_next`, so mutations stay serialized on the owner.
/// Dropping the worker closes its queue without waiting; a lookup still in
/// flight finishes on its own and its result is thrown away.
pub struct EnrichmentWorker {
    requests: Sender<EnrichRequest>,
    finished: Receiver<Finished>,
}

impl EnrichmentWorker {
    pub fn spawn(catalog: Option<Arc<dyn Catalog>>, images_dir: PathBuf) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<EnrichRequest>();
        let (finished_tx, finished_rx) = mpsc::channel::<Finished>();

        // Detached: the handle is dropped, never joined
        thread::spawn(move || {
            for request in request_rx {
                if request.ticket.is_cancelled() {
                    continue;
                }
                let game = enrich(request.fields, catalog.as_deref(), &images_dir);
                if finished_tx
                    .send(Finished { game, ticket: request.ticket })
                    .is_err()
                {
                    break;
                }
            }
        });

        Self {
            requests: request_tx,
            finished: finished_rx,
        }
    }

    /// Queue a new game for enrichment.
    pub fn submit(&self, fields: GameFields) -> EnrichTicket {
        let ticket = EnrichTicket::default();
        let request = EnrichRequest { fields, ticket: ticket.clone() };
        if self.requests.send(request).is_err() {
            log_warning("Enrichment worker is gone; request dropped");
            ticket.cancel();
        }
        ticket
    }
}

// ============================================================================
// Library
// ============================================================================

pub struct Library {
    store: GameStore,
    games: Vec<Game>,
    selected: Option<usize>,
    home: PathBuf,
    runner: String,
}

impl Library {
    /// Load the library from `store`. A corrupt document is an error so it
    /// never gets replaced by an empty collection.
    pub fn open(store: GameStore) -> Result<Self, StoreError> {
        let games = store.load()?;
        Ok(Self {
            store,
            games,
            selected: None,
            home: crate::paths::home_dir(),
            runner: DEFAULT_RUNNER.to_string(),
        })
    }

    /// Home directory used to resolve Proton versions.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    pub fn with_runner(mut self, runner: impl Into<String>) -> Self {
        self.runner = runner.into();
        self
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn get(&self, index: usize) -> Option<&Game> {
        self.games.get(index)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn images_dir(&self) -> PathBuf {
        self.store.images_dir()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_game(&self) -> Option<&Game> {
        self.selected.and_then(|i| self.games.get(i))
    }

    pub fn select(&mut self, index: Option<usize>) -> Result<(), LibraryError> {
        if let Some(i) = index {
            self.check_index(i)?;
        }
        self.selected = index;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<&Game, LibraryError> {
        self.games.get(index).ok_or(LibraryError::IndexOutOfRange {
            index,
            len: self.games.len(),
        })
    }

    /// Persist `next` and make it the current collection.
    fn commit(&mut self, next: Vec<Game>) -> Result<(), LibraryError> {
        self.store.save(&next)?;
        self.games = next;
        Ok(())
    }

    /// Append a fully built game. Returns its index.
    pub fn add(&mut self, game: Game) -> Result<usize, LibraryError> {
        log_action(&format!("Adding game '{}'", game.name));
        let mut next = self.games.clone();
        next.push(game);
        self.commit(next)?;
        Ok(self.games.len() - 1)
    }

    /// Enrich `fields` on the calling thread, then append the result.
    pub fn add_enriched(
        &mut self,
        fields: GameFields,
        catalog: Option<&dyn Catalog>,
    ) -> Result<usize, LibraryError> {
        let game = enrich(fields, catalog, &self.images_dir());
        self.add(game)
    }

    /// Append every finished background enrichment that was not cancelled.
    /// Returns how many games were added.
    pub fn apply_finished(&mut self, worker: &EnrichmentWorker) -> Result<usize, LibraryError> {
        let mut added = 0;
        while let Ok(finished) = worker.finished.try_recv() {
            if self.apply_one(finished)?.is_some() {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Wait up to `timeout` for the next background result and apply it.
    /// Returns the index of the added game, or `None` on timeout or cancellation.
    pub fn apply_next(
        &mut self,
        worker: &EnrichmentWorker,
        timeout: Duration,
    ) -> Result<Option<usize>, LibraryError> {
        match worker.finished.recv_timeout(timeout) {
            Ok(finished) => self.apply_one(finished),
            Err(_) => Ok(None),
        }
    }

    /// Queue `fields` on `worker` and add the enriched game, waiting at most
    /// `timeout`. A lookup that does not finish in time is cancelled and the
    /// game is added without catalog id or cover art.
    ///
    /// Expects no other requests to be pending on `worker`.
    pub fn add_with_lookup(
        &mut self,
        worker: &EnrichmentWorker,
        fields: GameFields,
        timeout: Duration,
    ) -> Result<usize, LibraryError> {
        let ticket = worker.submit(fields.clone());
        if let Some(index) = self.apply_next(worker, timeout)? {
            return Ok(index);
        }

        ticket.cancel();
        log_warning(&format!(
            "Store lookup for '{}' did not finish; adding without store data",
            fields.name
        ));
        self.add(Game::from_fields(fields))
    }

    fn apply_one(&mut self, finished: Finished) -> Result<Option<usize>, LibraryError> {
        if finished.ticket.is_cancelled() {
            log_info(&format!("Discarding cancelled add of '{}'", finished.game.name));
            return Ok(None);
        }
        self.add(finished.game).map(Some)
    }

    /// Overwrite the editable fields of the game at `index`.
    ///
    /// A new image outside the images directory is resized into it first; if
    /// that fails the previous image is kept.
    pub fn edit(&mut self, index: usize, fields: GameFields) -> Result<(), LibraryError> {
        let current = self.check_index(index)?;
        let images_dir = self.images_dir();

        let mut image_url = fields.image.clone();
        if needs_processing(&fields.image, &current.image_url, &images_dir) {
            match process_custom_image(Path::new(&fields.image), &images_dir) {
                Ok(path) => image_url = path.to_string_lossy().to_string(),
                Err(e) => {
                    log_warning(&format!("Error processing image {}: {}", fields.image, e));
                    image_url = current.image_url.clone();
                }
            }
        }

        log_action(&format!("Editing game {} ('{}')", index, fields.name));
        let mut next = self.games.clone();
        let game = &mut next[index];
        game.name = fields.name;
        game.exec_path = fields.exec_path;
        game.prefix = fields.prefix;
        game.proton_ver = fields.proton_ver;
        game.image_url = image_url;
        game.dll_overrides = fields.dll_overrides;
        self.commit(next)
    }

    /// Remove the game at `index` and renumber the selection.
    ///
    /// Cover art files are left in place.
    pub fn delete(&mut self, index: usize) -> Result<Game, LibraryError> {
        self.check_index(index)?;

        let mut next = self.games.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        self.selected = renumber_selection(self.selected, index);

        log_action(&format!("Deleted game {} ('{}')", index, removed.name));
        Ok(removed)
    }

    /// Runner invocation for the game at `index`.
    pub fn launch_spec(&self, index: usize) -> Result<LaunchSpec, LibraryError> {
        let game = self.check_index(index)?;
        Ok(LaunchSpec::with_runner(game, &self.home, &self.runner))
    }

    /// Start the game at `index` without waiting. Returns the runner PID.
    pub fn launch(&self, index: usize) -> Result<u32, LibraryError> {
        Ok(self.launch_spec(index)?.spawn()?)
    }
}
