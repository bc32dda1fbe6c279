use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::ItemId,
    error::{ApiError, ServiceError},
    protocol::{ItemDraft, ItemPatch, MenuItem},
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};
use url::Url;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Remote collection service contract: list/create/update/delete over the
/// menu items resource. The HTTP implementation lives in this crate; tests
/// substitute an in-memory fake.
#[async_trait]
pub trait MenuService: Send + Sync {
    async fn list_items(&self) -> Result<Vec<MenuItem>>;
    async fn create_item(&self, draft: &ItemDraft) -> Result<MenuItem>;
    async fn update_item(&self, id: ItemId, item: &MenuItem) -> Result<MenuItem>;
    async fn delete_item(&self, id: ItemId) -> Result<()>;
}

#[derive(Debug)]
pub struct HttpMenuService {
    http: Client,
    server_url: String,
}

impl HttpMenuService {
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        let server_url = server_url.into();
        let parsed = Url::parse(&server_url)
            .with_context(|| format!("invalid server url: {server_url}"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(anyhow!(
                "server url must start with http:// or https://, got {server_url}"
            ));
        }
        Ok(Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    fn foods_url(&self) -> String {
        format!("{}/foods", self.server_url)
    }

    fn food_url(&self, id: ItemId) -> String {
        format!("{}/foods/{id}", self.server_url)
    }
}

/// Turns a non-success response into a [`ServiceError`], preferring the
/// server's structured error payload when the body parses as one.
async fn decode_error_response(response: reqwest::Response) -> ServiceError {
    let status = response.status();
    match response.text().await {
        Ok(body) => match serde_json::from_str::<ApiError>(&body) {
            Ok(api_error) => api_error.into(),
            Err(_) => ServiceError::Transport(format!("http status {status}: {body}")),
        },
        Err(err) => ServiceError::Transport(format!("http status {status}: {err}")),
    }
}

#[async_trait]
impl MenuService for HttpMenuService {
    async fn list_items(&self) -> Result<Vec<MenuItem>> {
        let response = self.http.get(self.foods_url()).send().await?;
        if !response.status().is_success() {
            return Err(decode_error_response(response).await.into());
        }
        Ok(response.json().await?)
    }

    async fn create_item(&self, draft: &ItemDraft) -> Result<MenuItem> {
        let response = self
            .http
            .post(self.foods_url())
            .json(draft)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(decode_error_response(response).await.into());
        }
        Ok(response.json().await?)
    }

    async fn update_item(&self, id: ItemId, item: &MenuItem) -> Result<MenuItem> {
        let response = self
            .http
            .put(self.food_url(id))
            .json(item)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(decode_error_response(response).await.into());
        }
        Ok(response.json().await?)
    }

    async fn delete_item(&self, id: ItemId) -> Result<()> {
        let response = self.http.delete(self.food_url(id)).send().await?;
        if !response.status().is_success() {
            return Err(decode_error_response(response).await.into());
        }
        Ok(())
    }
}

/// Which modal the dashboard is showing. A single tagged state makes
/// "both modals open" unrepresentable and carries the edit target with the
/// edit modal, so stale edit selections cannot outlive the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModalState {
    #[default]
    Closed,
    Creating,
    Editing(MenuItem),
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::Closed)
    }
}

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    ItemsLoaded { count: usize },
    ItemAdded(MenuItem),
    ItemUpdated(MenuItem),
    ItemRemoved(ItemId),
    ModalChanged(ModalState),
    Error(String),
}

#[derive(Debug, Error)]
pub enum MenuClientError {
    #[error("no item selected for editing")]
    NoEditTarget,
    #[error("remote menu operation failed: {0}")]
    Service(anyhow::Error),
}

#[derive(Default)]
struct DashboardState {
    items: Vec<MenuItem>,
    modal: ModalState,
}

/// Owns the dashboard's state bundle and reconciles every remote mutation
/// into it. Remote calls happen outside the state lock; the lock is held
/// only to snapshot or apply a result, so interleaved operations are
/// last-write-wins, never deadlocked.
pub struct DashboardController {
    service: Arc<dyn MenuService>,
    inner: Mutex<DashboardState>,
    events: broadcast::Sender<DashboardEvent>,
}

impl DashboardController {
    pub fn new(service: Arc<dyn MenuService>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            service,
            inner: Mutex::new(DashboardState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// Fetches the full collection, replacing the local item list and
    /// closing any open modal.
    pub async fn load_all(&self) -> Result<(), MenuClientError> {
        let items = self
            .service
            .list_items()
            .await
            .map_err(|err| self.report_failure("load menu", err))?;
        let count = items.len();
        {
            let mut state = self.inner.lock().await;
            state.items = items;
            state.modal = ModalState::Closed;
        }
        info!(count, "menu: collection loaded");
        let _ = self.events.send(DashboardEvent::ItemsLoaded { count });
        let _ = self
            .events
            .send(DashboardEvent::ModalChanged(ModalState::Closed));
        Ok(())
    }

    /// Creates a new item. `available` is forced true on creation regardless
    /// of the draft value; the server-assigned record is appended to the
    /// local list and the create modal closes. On failure nothing was
    /// applied locally, so state is untouched.
    pub async fn add_item(&self, draft: &ItemDraft) -> Result<MenuItem, MenuClientError> {
        let created = self
            .service
            .create_item(&draft.for_create())
            .await
            .map_err(|err| self.report_failure("create item", err))?;
        {
            let mut state = self.inner.lock().await;
            state.items.push(created.clone());
            state.modal = ModalState::Closed;
        }
        info!(item_id = created.id.0, name = %created.name, "menu: item created");
        let _ = self.events.send(DashboardEvent::ItemAdded(created.clone()));
        let _ = self
            .events
            .send(DashboardEvent::ModalChanged(ModalState::Closed));
        Ok(created)
    }

    /// Merges `patch` over the item currently selected for editing and sends
    /// the full merged object keyed by its id. On success the matching local
    /// entry is replaced in place (order preserved) and the modal closes; on
    /// remote failure the list is untouched and the modal stays open so the
    /// user can retry or cancel.
    pub async fn update_item(&self, patch: &ItemPatch) -> Result<MenuItem, MenuClientError> {
        let target = {
            let state = self.inner.lock().await;
            match &state.modal {
                ModalState::Editing(item) => item.clone(),
                _ => return Err(MenuClientError::NoEditTarget),
            }
        };
        let merged = target.merged_with(patch);
        let updated = self
            .service
            .update_item(target.id, &merged)
            .await
            .map_err(|err| self.report_failure("update item", err))?;
        {
            let mut state = self.inner.lock().await;
            if let Some(slot) = state.items.iter_mut().find(|item| item.id == updated.id) {
                *slot = updated.clone();
            }
            state.modal = ModalState::Closed;
        }
        info!(item_id = updated.id.0, "menu: item updated");
        let _ = self
            .events
            .send(DashboardEvent::ItemUpdated(updated.clone()));
        let _ = self
            .events
            .send(DashboardEvent::ModalChanged(ModalState::Closed));
        Ok(updated)
    }

    /// Deletes the remote record, then drops the first local entry with the
    /// matching id. An id that is already absent locally after a successful
    /// remote delete is not an error.
    pub async fn delete_item(&self, id: ItemId) -> Result<(), MenuClientError> {
        self.service
            .delete_item(id)
            .await
            .map_err(|err| self.report_failure("delete item", err))?;
        let removed = {
            let mut state = self.inner.lock().await;
            match state.items.iter().position(|item| item.id == id) {
                Some(index) => {
                    state.items.remove(index);
                    true
                }
                None => false,
            }
        };
        if removed {
            info!(item_id = id.0, "menu: item deleted");
            let _ = self.events.send(DashboardEvent::ItemRemoved(id));
        } else {
            warn!(item_id = id.0, "menu: deleted item was not present locally");
        }
        Ok(())
    }

    /// Opens the create modal, or closes it if it is already showing.
    /// Switching away from an in-progress edit discards the edit target.
    pub async fn toggle_create_modal(&self) {
        let modal = {
            let mut state = self.inner.lock().await;
            state.modal = match state.modal {
                ModalState::Creating => ModalState::Closed,
                _ => ModalState::Creating,
            };
            state.modal.clone()
        };
        let _ = self.events.send(DashboardEvent::ModalChanged(modal));
    }

    /// Loads `item` into the edit form, replacing any previous edit target.
    pub async fn select_for_edit(&self, item: MenuItem) {
        let modal = {
            let mut state = self.inner.lock().await;
            state.modal = ModalState::Editing(item);
            state.modal.clone()
        };
        let _ = self.events.send(DashboardEvent::ModalChanged(modal));
    }

    /// Dismisses whichever modal is open.
    pub async fn close_modal(&self) {
        {
            let mut state = self.inner.lock().await;
            state.modal = ModalState::Closed;
        }
        let _ = self
            .events
            .send(DashboardEvent::ModalChanged(ModalState::Closed));
    }

    pub async fn items(&self) -> Vec<MenuItem> {
        self.inner.lock().await.items.clone()
    }

    pub async fn modal(&self) -> ModalState {
        self.inner.lock().await.modal.clone()
    }

    pub async fn editing_item(&self) -> Option<MenuItem> {
        match &self.inner.lock().await.modal {
            ModalState::Editing(item) => Some(item.clone()),
            _ => None,
        }
    }

    fn report_failure(&self, action: &str, err: anyhow::Error) -> MenuClientError {
        warn!("menu: {action} failed: {err:#}");
        let _ = self
            .events
            .send(DashboardEvent::Error(format!("{action} failed: {err:#}")));
        MenuClientError::Service(err)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
