// Background completion requester

use futures::StreamExt;
use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::api::{ChatClient, ChatMessage, ChatRequest};
use crate::events::AppEvent;

/// Runs for the lifetime of the program: wait for a submitted prompt, stream
/// the completion back as events, then re-arm for the next prompt. Request
/// and stream failures are reported as events and do not end the loop; the
/// task exits only when either channel closes.
pub async fn run(
    client: ChatClient,
    model: String,
    mut prompt_rx: mpsc::Receiver<String>,
    event_tx: mpsc::Sender<AppEvent>,
) {
    while let Some(prompt) = prompt_rx.recv().await {
        info!("starting completion request ({} chars)", prompt.len());
        if stream_completion(&client, &model, prompt, &event_tx)
            .await
            .is_err()
        {
            warn!("event channel closed, requester exiting");
            return;
        }
    }
    debug!("prompt channel closed, requester exiting");
}

/// One request cycle. Returns Err only when the event channel is closed.
async fn stream_completion(
    client: &ChatClient,
    model: &str,
    prompt: String,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<(), mpsc::error::SendError<AppEvent>> {
    let request = ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::user(prompt)],
        stream: true,
    };

    let mut stream = match client.chat_stream(request).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("completion request failed: {e}");
            return event_tx.send(AppEvent::ResponseFailed(e.to_string())).await;
        }
    };

    let mut fragments = 0usize;
    while let Some(result) = stream.next().await {
        match result {
            Ok(chunk) => {
                if let Some(text) = chunk.delta_text() {
                    if !text.is_empty() {
                        fragments += 1;
                        event_tx
                            .send(AppEvent::ResponseFragment(text.to_string()))
                            .await?;
                    }
                }
            }
            Err(e) => {
                warn!("stream read failed after {fragments} fragments: {e}");
                return event_tx.send(AppEvent::ResponseFailed(e.to_string())).await;
            }
        }
    }

    debug!("stream complete, {fragments} fragments forwarded");
    event_tx.send(AppEvent::ResponseComplete).await
}
