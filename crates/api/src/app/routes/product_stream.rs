//! Live product listing over Server-Sent Events.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{
    extract::{Extension, Query},
    response::{
        IntoResponse, Response,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
};
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;

use aesthetica_infra::ProductSubscription;
use aesthetica_products::{Product, ProductFilters};

use crate::app::errors;
use crate::app::services::AppServices;

type SseItem = Result<SseEvent, Infallible>;

/// Event stream that owns its live query; dropping the stream (client gone)
/// stops the query.
struct LiveListing {
    events: UnboundedReceiverStream<SseItem>,
    _subscription: ProductSubscription,
}

impl Stream for LiveListing {
    type Item = SseItem;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().events).poll_next(cx)
    }
}

/// GET /products/stream
///
/// Emits a `products` event carrying the full matching listing when the
/// stream opens and again after every change to the collection. Accepts the
/// same filters as the gateway (`category`, `isActive`, `featured`,
/// `bestSeller`, `newArrival`).
pub async fn stream_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(filters): Query<ProductFilters>,
) -> Response {
    let (tx, rx) = unbounded_channel::<SseItem>();

    let subscription = services
        .products
        .subscribe_to_products(&filters, move |products: Vec<Product>| {
            match SseEvent::default().event("products").json_data(&products) {
                Ok(event) => {
                    let _ = tx.send(Ok(event));
                }
                Err(e) => tracing::warn!(error = %e, "failed to encode product listing"),
            }
        });
    let subscription = match subscription {
        Ok(s) => s,
        Err(e) => return errors::gateway_error_to_response(e),
    };

    tracing::debug!(?filters, "product stream opened");
    let stream = LiveListing {
        events: UnboundedReceiverStream::new(rx),
        _subscription: subscription,
    };
    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
        .into_response()
}
