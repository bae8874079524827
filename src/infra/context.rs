//! Process-wide client context.
//!
//! Replaces configure-once global state with an explicit handle: the
//! context is constructed exactly once at process start and passed to every
//! component that needs transport access. A second construction attempt
//! fails closed instead of mutating shared state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::app::table_service::TableService;
use crate::domain::schema::TableBinding;
use crate::error::{GridError, GridResult};
use crate::infra::config::Config;
use crate::transport::{HttpTransport, Transport};

static CONTEXT_CLAIMED: AtomicBool = AtomicBool::new(false);

fn claim() -> GridResult<()> {
    if CONTEXT_CLAIMED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(GridError::AlreadyInitialized);
    }
    Ok(())
}

/// The one shared entry point to the remote service. Holds the transport
/// and builds per-table services; immutable after construction.
pub struct ClientContext {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext").finish_non_exhaustive()
    }
}

impl ClientContext {
    /// Constructs the process-wide context. Can succeed at most once per
    /// process; later attempts return `AlreadyInitialized`.
    pub fn initialize(config: Config) -> GridResult<Self> {
        claim()?;
        Ok(Self {
            transport: Arc::new(HttpTransport::new(config.base_url, config.token)),
        })
    }

    /// Same construct-once semantics with a caller-supplied transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> GridResult<Self> {
        claim()?;
        Ok(Self { transport })
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Builds the row-operation service for one bound table.
    pub fn table(&self, binding: TableBinding) -> TableService {
        TableService::new(self.transport(), binding)
    }
}
