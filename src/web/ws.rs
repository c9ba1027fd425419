//! `/ws` live-update channel module
//!
//! Forwards the broadcast stream published by `AppState` (schedule
//! progress, job-scheduled, reschedule-completed, etc., per spec §6) to
//! each connected client as JSON text frames. Unlike the REST surface
//! this endpoint is not behind the JWT middleware — dashboards open it
//! straight from the browser alongside their authenticated API calls.

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::{debug, warn};

use crate::web::repository::AppState;

pub async fn ws_handler(req: HttpRequest, stream: web::Payload, state: web::Data<Arc<AppState>>) -> actix_web::Result<HttpResponse> {
    let (response, mut session, mut msg_stream) = actix_ws::handle(&req, stream)?;
    let mut updates = state.subscribe();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                update = updates.recv() => {
                    let message = match update {
                        Ok(message) => message,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("ws client lagged, dropped {skipped} messages");
                            continue;
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    };
                    let payload = match serde_json::to_string(&message) {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!("failed to serialize ws message: {e:#}");
                            continue;
                        }
                    };
                    if session.text(payload).await.is_err() {
                        break;
                    }
                }
                frame = msg_stream.recv() => {
                    match frame {
                        Some(Ok(actix_ws::Message::Ping(bytes))) => {
                            if session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(actix_ws::Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            debug!("ws protocol error: {e:#}");
                            break;
                        }
                    }
                }
            }
        }
        let _ = session.close(None).await;
    });

    Ok(response)
}
