//! `POST /chatbot/step`: one turn of the intake dialogue.
//!
//! The server holds no conversation state. The client sends back the `state`
//! and `draft` it received on the previous turn.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::chatbot::{prompt, step, ChatDraft, ChatState, Effect};
use crate::database::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handler::complaint::submit;
use crate::model::ApiResponse;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatStepRequest {
    pub state: ChatState,
    pub draft: ChatDraft,
    pub input: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStepResponse {
    pub state: ChatState,
    pub draft: ChatDraft,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complaint_id: Option<String>,
}

pub async fn chatbot_step(
    State(state): State<AppState>,
    AppJson(request): AppJson<ChatStepRequest>,
) -> AppResult<Json<ApiResponse<ChatStepResponse>>> {
    let transition = step(request.state, request.draft, &request.input);

    let response = match transition.effect {
        Effect::Reply(reply) => ChatStepResponse {
            state: transition.state,
            draft: transition.draft,
            reply,
            complaint_id: None,
        },
        Effect::Submit(draft) => match submit(&state, draft.clone().into_request()) {
            Ok(complaint) => ChatStepResponse {
                state: transition.state,
                draft: transition.draft,
                reply: format!(
                    "Your complaint {} has been registered. {}",
                    complaint.complaint_id,
                    prompt(ChatState::Completed)
                ),
                complaint_id: Some(complaint.complaint_id),
            },
            // Rejected drafts go back to confirmation so the passenger can start over.
            Err(AppError::Domain(err)) => {
                tracing::debug!(error = %err, "Chatbot draft rejected");
                ChatStepResponse {
                    state: ChatState::Confirm,
                    draft,
                    reply: format!(
                        "Sorry, the complaint could not be submitted: {err}. Reply 'no' to start over."
                    ),
                    complaint_id: None,
                }
            }
            Err(err) => return Err(err),
        },
    };

    Ok(Json(ApiResponse::ok(response)))
}
