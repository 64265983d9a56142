//! Admin context shared by every admin command.

use std::path::PathBuf;

use rakhshan_core::{Order, OrderId};
use secrecy::SecretString;
use tracing::instrument;

use crate::client::AdminClient;
use crate::config::AdminConfig;
use crate::error::{AdminError, Result};
use crate::orders::{OrderTotal, PriceIndex};
use crate::session::{AdminSession, SessionStore};
use crate::uploads;

/// Configuration, API client and session slot for the admin console.
#[derive(Debug)]
pub struct AdminContext {
    config: AdminConfig,
    client: AdminClient,
    sessions: SessionStore,
    username: Option<String>,
}

impl AdminContext {
    /// Create the context, resuming a saved session if there is one.
    ///
    /// An unreadable session file is logged and ignored.
    pub async fn new(config: AdminConfig) -> Self {
        let client = AdminClient::new(config.api_base_url.clone());
        let sessions = SessionStore::new(config.session_path.clone());

        let username = match sessions.load() {
            Ok(Some(session)) => {
                client.set_token(session.access_token).await;
                tracing::debug!(username = %session.username, "Resumed admin session");
                Some(session.username)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable admin session");
                None
            }
        };

        Self {
            config,
            client,
            sessions,
            username,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AdminConfig {
        &self.config
    }

    #[must_use]
    pub const fn client(&self) -> &AdminClient {
        &self.client
    }

    /// Name of the logged-in admin, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Log in and save the session.
    ///
    /// A session that cannot be saved still leaves this context logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the login is rejected.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<AdminSession> {
        let token = self.client.login(username, password).await?;
        let session = AdminSession::new(token.access_token, username);
        if let Err(e) = self.sessions.save(&session) {
            tracing::warn!(error = %e, "Failed to save admin session");
        }
        self.username = Some(username.to_string());
        Ok(session)
    }

    /// Forget the token and delete the saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be removed.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<()> {
        self.client.clear_token().await;
        self.username = None;
        self.sessions.clear()?;
        tracing::info!("Admin logged out");
        Ok(())
    }

    /// All orders with their catalog estimates.
    ///
    /// # Errors
    ///
    /// Returns an error if the orders or products cannot be fetched.
    pub async fn orders_with_totals(&self) -> Result<Vec<(Order, OrderTotal)>> {
        let orders = self.client.list_orders().await?;
        let index = PriceIndex::new(&self.client.list_products().await?);
        Ok(orders
            .into_iter()
            .map(|order| {
                let total = index.order_total(&order);
                (order, total)
            })
            .collect())
    }

    /// Find one order by id.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if no order has that id.
    pub async fn find_order(&self, id: &OrderId) -> Result<(Order, OrderTotal)> {
        self.orders_with_totals()
            .await?
            .into_iter()
            .find(|(order, _)| order.id == *id)
            .ok_or_else(|| AdminError::NotFound(format!("order {id}")))
    }

    /// Validate, read and upload image files.
    ///
    /// `existing` is the number of images the product already has.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Upload` if validation fails (nothing is sent), or
    /// an API error if the upload fails.
    pub async fn upload_images(&self, paths: &[PathBuf], existing: usize) -> Result<Vec<String>> {
        let files = uploads::read_images(paths, existing, self.config.uploads).await?;
        Ok(self.client.upload_images(files).await?)
    }
}
