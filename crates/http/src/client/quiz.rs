//! Quiz API client methods

use super::{ApiRequest, ClientResult, QroomClient};
use crate::types::{
    CreateQuizData, CreateQuizRequest, CreateUserQuizRequest, QuizDetailData, QuizResultData,
    StartQuizData, StartQuizRequest, SubmitQuizData, SubmitQuizRequest,
};

impl QroomClient {
    /// Generate a quiz from an uploaded PDF
    pub async fn create_quiz(&self, request: &CreateQuizRequest) -> ClientResult<CreateQuizData> {
        let req = ApiRequest::post("/quiz/create").json(request)?;
        self.execute_data(req).await
    }

    /// Create a quiz from user-written questions
    pub async fn create_user_quiz(
        &self,
        request: &CreateUserQuizRequest,
    ) -> ClientResult<CreateQuizData> {
        let req = ApiRequest::post("/quiz/user/create").json(request)?;
        self.execute_data(req).await
    }

    /// Open an attempt; the returned result id is sent back on submit
    pub async fn start_quiz(&self, quiz_id: i64) -> ClientResult<StartQuizData> {
        let req = ApiRequest::post("/quiz/start").json(&StartQuizRequest { quiz_id })?;
        self.execute_data(req).await
    }

    pub async fn quiz_detail(&self, quiz_id: i64) -> ClientResult<QuizDetailData> {
        self.execute_data(ApiRequest::get(format!("/quiz/{quiz_id}")))
            .await
    }

    pub async fn submit_quiz(&self, request: &SubmitQuizRequest) -> ClientResult<SubmitQuizData> {
        let req = ApiRequest::post("/quiz/submit").json(request)?;
        self.execute_data(req).await
    }

    /// Graded attempt with per-question review
    pub async fn quiz_result(&self, quiz_result_id: i64) -> ClientResult<QuizResultData> {
        self.execute_data(ApiRequest::get(format!("/quiz/result/{quiz_result_id}")))
            .await
    }
}
