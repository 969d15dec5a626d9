// AI analyst view: page sessions, their transcripts, and the submission flow.
// All generation goes through genai_client; nothing here talks HTTP upstream.

pub mod handlers;
pub mod session;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::genai_client::{GenAiClient, GenerationOutcome, OutcomeKind, UNAVAILABLE_MESSAGE};
use crate::models::chat::ChatMessage;

pub use session::{SessionError, SessionStore, SessionView, View};

#[derive(Debug, Serialize)]
pub struct Submission {
    pub reply: ChatMessage,
    pub outcome: OutcomeKind,
    pub session: SessionView,
}

/// Runs one submission: `Idle → Sending → Idle`.
///
/// The generation call runs on its own task, so a caller that goes away does
/// not cancel it; the retry loop always finishes and the reply always lands in
/// the transcript.
pub async fn submit_prompt(
    sessions: &SessionStore,
    genai: &GenAiClient,
    session_id: Uuid,
    prompt: String,
) -> Result<Submission, AppError> {
    sessions.begin_submission(session_id, &prompt)?;
    info!("Session {session_id}: analysing prompt ({} chars)", prompt.chars().count());

    let task_sessions = sessions.clone();
    let task_genai = genai.clone();
    let task = tokio::spawn(async move {
        let outcome = task_genai.generate(&prompt).await;
        let session = task_sessions.finish_submission(session_id, outcome.message());
        (outcome, session)
    });

    let (outcome, session) = match task.await {
        Ok(result) => result,
        Err(e) => {
            error!("Submission task for session {session_id} failed: {e}");
            // Do not leave the session stuck in Sending.
            if let Err(recover) = sessions.finish_submission(session_id, UNAVAILABLE_MESSAGE) {
                warn!("Could not record fallback reply for session {session_id}: {recover}");
            }
            return Err(AppError::Internal(anyhow::anyhow!(
                "submission task failed: {e}"
            )));
        }
    };

    match &outcome {
        GenerationOutcome::Unavailable { attempts } => {
            warn!("Session {session_id}: analyst unavailable after {attempts} attempts")
        }
        other => info!("Session {session_id}: reply ready ({:?})", other.kind()),
    }

    let session = session?;
    let reply = session
        .messages
        .last()
        .cloned()
        .unwrap_or_else(|| ChatMessage::assistant(outcome.message()));

    Ok(Submission {
        reply,
        outcome: outcome.kind(),
        session,
    })
}
