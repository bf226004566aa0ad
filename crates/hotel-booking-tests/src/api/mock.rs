//! Mock API implementation directly using the `hotel-booking-registry` crate

use std::sync::Arc;

use hotel_booking_core::{RawRequest, Request, RequestHandler, RequestKind, RequestMethod};
use hotel_booking_registry::{BookingStore, Registry};
use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};
use tracing::debug;
use uuid::Uuid;

use super::{Api, RawResponse, RequestMsg};

pub struct MockRegistry {
    registry: Arc<Registry>,
    join_handles: Vec<JoinHandle<()>>,
}

struct MockRawRequest {
    kind: RequestKind,
    method: RequestMethod,
    query: String,
    body: Option<String>,
    response_channel: oneshot::Sender<RawResponse>,
}

pub async fn start(
    threads: u16,
    config: hotel_booking_core::Config,
) -> eyre::Result<(MockRegistry, Api)> {
    let registry = Arc::new(
        task::spawn_blocking(move || hotel_booking_registry::launch(&config)).await??,
    );

    let it = (0..threads).map(|i| {
        let (sender, receiver) = flume::bounded::<RequestMsg>(65536);
        let registry = registry.clone();
        let handle = task::spawn_blocking(move || {
            let registry = &*registry;
            for msg in receiver.into_iter() {
                let raw = Box::new(MockRawRequest {
                    kind: msg.kind,
                    method: msg.method,
                    query: msg.query,
                    body: Some(msg.body),
                    response_channel: msg.response_channel,
                });
                registry.handle(Request::from_raw(msg.kind, msg.request_id, raw))
            }
            debug!("handler thread {i} done");
        });
        (sender, handle)
    });
    let (senders, join_handles) = it.unzip();

    let mock_registry = MockRegistry {
        registry,
        join_handles,
    };
    Ok((mock_registry, Api::new(senders)))
}

impl MockRegistry {
    /// The store behind the registry, for inspecting its state directly
    pub fn store(&self) -> &Arc<BookingStore> {
        self.registry.store()
    }

    pub async fn shutdown(self) {
        for handle in self.join_handles {
            handle.await.unwrap()
        }
        task::spawn_blocking(move || Arc::into_inner(self.registry).unwrap().shutdown())
            .await
            .unwrap();
    }
}

impl RawRequest for MockRawRequest {
    fn path(&self) -> &str {
        self.kind.path()
    }

    fn query(&self) -> &str {
        &self.query
    }

    fn method(&self) -> RequestMethod {
        self.method
    }

    fn read_string(&mut self) -> std::io::Result<String> {
        Ok(self.body.take().unwrap_or_default())
    }

    fn respond(self: Box<Self>, status: u16, body: String, request_id: Uuid) {
        let response = RawResponse {
            status,
            body,
            request_id,
        };
        // the test may have given up waiting
        let _ = self.response_channel.send(response);
    }
}
