//! Q&A board API client methods

use super::{ApiRequest, ClientResult, QroomClient};
use crate::types::{CreateQaPostRequest, QaRoomData};
use serde_json::Value;

impl QroomClient {
    /// Quiz review together with its Q&A board
    pub async fn qa_room(&self, quiz_id: i64) -> ClientResult<QaRoomData> {
        self.execute_data(ApiRequest::get(format!("/quiz/{quiz_id}/qa-room")))
            .await
    }

    /// Post a question to a board, returning whatever the server echoes back
    pub async fn create_qa_post(&self, request: &CreateQaPostRequest) -> ClientResult<Value> {
        let req = ApiRequest::post("/qa/post").json(request)?;
        let data: Option<Value> = self.execute_data(req).await?;
        Ok(data.unwrap_or(Value::Null))
    }
}
