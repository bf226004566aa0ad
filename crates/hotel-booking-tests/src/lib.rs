use std::sync::Arc;

use eyre::Result;
use hotel_booking_registry::BookingStore;

mod api;
pub use api::{Api, ApiError, ApiResponse, GuestSession, RawResponse};

pub struct TestCtxBuilder {
    /// Number of rooms
    pub rooms: u32,
    /// Count of handler threads
    pub handler_threads: u16,
    /// Whether errors are answered with 400/409/500 instead of always 500
    pub rest_status: bool,
}

impl Default for TestCtxBuilder {
    fn default() -> Self {
        TestCtxBuilder {
            rooms: 10,
            handler_threads: 2,
            rest_status: false,
        }
    }
}

impl TestCtxBuilder {
    /// Create a new test context builder with the server's defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of rooms
    pub fn with_rooms(mut self, rooms: u32) -> Self {
        self.rooms = rooms;
        self
    }

    /// Set the number of handler threads to use
    pub fn with_handler_threads(mut self, threads: u16) -> Self {
        assert_ne!(threads, 0);
        self.handler_threads = threads;
        self
    }

    /// Answer errors with 400/409/500 depending on their kind
    pub fn with_rest_status(mut self) -> Self {
        self.rest_status = true;
        self
    }

    /// Get the [`hotel_booking_core::Config`] for launching the registry
    fn config(&self) -> hotel_booking_core::Config {
        hotel_booking_core::Config {
            rooms: self.rooms,
            rest_status: self.rest_status,
        }
    }

    /// Build the test context
    pub async fn build(self) -> Result<TestCtx> {
        let (registry, api) = api::mock::start(self.handler_threads, self.config()).await?;

        Ok(TestCtx {
            api,
            registry,
            drop_bomb: DropBomb,
        })
    }
}

/// Test context
pub struct TestCtx {
    /// API allowing to interact with the booking registry
    pub api: Api,
    registry: api::mock::MockRegistry,

    drop_bomb: DropBomb,
}

impl TestCtx {
    /// The store behind the registry
    pub fn store(&self) -> &Arc<BookingStore> {
        self.registry.store()
    }

    /// Shut the booking registry down and finish the test
    ///
    /// All clones of [`Self::api`] must have been dropped before.
    pub async fn finish(self) {
        std::mem::forget(self.drop_bomb);
        drop(self.api);
        self.registry.shutdown().await;
    }
}

struct DropBomb;

impl Drop for DropBomb {
    fn drop(&mut self) {
        eprintln!("@TestAuthor: You should call `ctx.finish().await` to shut the booking registry down");
    }
}
