//! Runtime and mock service plumbing for relay scenarios.
//!
//! Scenario steps are synchronous, so each scenario owns one Tokio runtime
//! and one Wiremock server. The server stands in for every remote the relay
//! talks to: the pipeline token endpoint, the key set, the review service,
//! and the GitHub API.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use rstest_bdd::Slot;
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request};

/// Tokio runtime shared by the steps of one scenario.
#[derive(Clone)]
pub struct SharedRuntime(Rc<RefCell<Runtime>>);

impl SharedRuntime {
    fn start() -> io::Result<Self> {
        Ok(Self(Rc::new(RefCell::new(Runtime::new()?))))
    }

    /// Drives `future` to completion, e.g. a whole relay run.
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.0.borrow().block_on(future)
    }
}

/// Starts the scenario runtime and mock services on first use and returns
/// the runtime.
///
/// # Errors
///
/// Returns an error if the Tokio runtime cannot be created.
pub fn mock_services(
    runtime: &Slot<SharedRuntime>,
    server: &Slot<MockServer>,
) -> io::Result<SharedRuntime> {
    if runtime.with_ref(|_| ()).is_none() {
        runtime.set(SharedRuntime::start()?);
    }
    let shared_runtime = runtime
        .get()
        .ok_or_else(|| io::Error::other("scenario runtime missing after start"))?;

    if server.with_ref(|_| ()).is_none() {
        server.set(shared_runtime.block_on(MockServer::start()));
    }

    Ok(shared_runtime)
}

/// Registers `mock` on the scenario's mock server.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn mount(
    runtime: &Slot<SharedRuntime>,
    server: &Slot<MockServer>,
    mock: Mock,
) -> io::Result<()> {
    let shared_runtime = mock_services(runtime, server)?;
    server
        .with_ref(|mock_server| shared_runtime.block_on(mock.mount(mock_server)))
        .ok_or_else(|| io::Error::other("mock server not started"))
}

/// Requests the relay sent with `method` to `path`, in arrival order.
///
/// # Errors
///
/// Returns an error if no mock server is running or request recording is
/// disabled.
pub fn requests_to(
    runtime: &Slot<SharedRuntime>,
    server: &Slot<MockServer>,
    method: &str,
    path: &str,
) -> io::Result<Vec<Request>> {
    let shared_runtime = mock_services(runtime, server)?;
    let recorded = server
        .with_ref(|mock_server| shared_runtime.block_on(mock_server.received_requests()))
        .flatten()
        .ok_or_else(|| io::Error::other("request recording unavailable"))?;
    Ok(recorded
        .into_iter()
        .filter(|request| request.method.as_str() == method && request.url.path() == path)
        .collect())
}
