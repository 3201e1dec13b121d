//! ## Utilities
//!

// Sub-Module Uses
#[cfg(test)]
#[cfg_attr(test, allow(unused_imports))]
pub(crate) use self::test_utils::{
    service, CountingTrackFactory, Doubles, InMemoryShipments, RecordingLoader, StubCarriers,
    StubRenderer, TestService,
};
