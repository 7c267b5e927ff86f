//! Creating and destroying component handles.

use crate::catalog::Catalog;
use crate::component::{AppData, ComponentCallbacks, ComponentHandle};
use crate::error::{OmxError, Result};
use crate::session::SessionManager;
use std::sync::Arc;

/// Create the component `name` in the live session of `sessions`.
///
/// The matching factory's result is returned as is; a failed factory is
/// responsible for its own cleanup.
pub fn create_handle(
    catalog: &Catalog,
    sessions: &SessionManager,
    name: &str,
    app_data: AppData,
    callbacks: Arc<dyn ComponentCallbacks>,
) -> Result<ComponentHandle> {
    tracing::debug!(component = name, "create component");

    if name.is_empty() {
        return Err(OmxError::InvalidComponentName);
    }
    let session = sessions.session().ok_or(OmxError::InvalidState)?;
    let entry = catalog
        .lookup(name)
        .ok_or(OmxError::InvalidComponentName)?;

    (entry.factory)(&session, app_data, callbacks)
}

/// Destroy a component through its own `deinit`.
pub fn destroy_handle(handle: Option<ComponentHandle>) -> Result<()> {
    let handle = handle.ok_or(OmxError::BadParameter)?;
    tracing::debug!(component = handle.name(), "destroy component");
    handle.deinit()
}
