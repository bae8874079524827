//! Construct-once semantics of the process-wide client context.
//!
//! This lives in its own integration test binary because the claim is
//! process-wide state; one test exercises both construction paths.

mod common;

use common::MockTransport;
use rowgrid::{ClientContext, Config, GridError};

#[test]
fn the_context_can_be_claimed_exactly_once() {
    let context = ClientContext::with_transport(MockTransport::new()).unwrap();

    // Any later construction attempt fails closed, whichever path it uses.
    let err = ClientContext::with_transport(MockTransport::new()).unwrap_err();
    assert!(matches!(err, GridError::AlreadyInitialized));

    let config = Config::new("https://grid.example.com", "secret-token");
    let err = ClientContext::initialize(config).unwrap_err();
    assert!(matches!(err, GridError::AlreadyInitialized));

    // The first context keeps working.
    let transport = context.transport();
    drop(transport);
}
