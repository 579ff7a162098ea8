//! Request and response types of the Qroom API
//!
//! Field names follow the wire format, which mixes camelCase and snake_case
//! depending on the endpoint.

use crate::client::ClientError;
use qroom_core::{Session, UserIdentity};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard response envelope wrapping domain payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub is_success: bool,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub message: String,
    pub data: T,
    #[serde(default, alias = "timeStamp")]
    pub timestamp: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, turning `isSuccess: false` into an error
    pub fn into_data(self) -> Result<T, ClientError> {
        if self.is_success {
            Ok(self.data)
        } else {
            Err(ClientError::Rejected {
                code: self.code,
                message: self.message,
            })
        }
    }
}

impl<T: DeserializeOwned> ApiEnvelope<T> {
    /// Unwrap the payload of a raw envelope
    ///
    /// The outcome is read before `data`, so a rejection carrying `null` or a
    /// partial payload still surfaces as [`ClientError::Rejected`].
    pub fn data_from_value(value: Value) -> Result<T, ClientError> {
        let outcome = EnvelopeOutcome::deserialize(&value)?;
        if !outcome.is_success {
            return Err(ClientError::Rejected {
                code: outcome.code,
                message: outcome.message,
            });
        }
        serde_json::from_value::<Self>(value)?.into_data()
    }
}

/// Envelope fields that do not depend on the payload type
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeOutcome {
    is_success: bool,
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

// Authentication

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub nickname: String,
    pub password: String,
    pub password_check: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: String,
    pub user: UserIdentity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub nickname: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserIdentity,
}

impl LoginResponse {
    /// Session to persist from this login
    pub fn session(&self) -> Session {
        Session {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            user: Some(self.user.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

// Home

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeGroup {
    pub id: i64,
    pub name: String,
    pub exam_date: String,
    pub member_count: i64,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeQaBoard {
    pub id: i64,
    pub title: String,
    pub progress: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeExamSchedule {
    pub course_name: String,
    pub exam_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeData {
    #[serde(default)]
    pub groups: Vec<HomeGroup>,
    #[serde(default)]
    pub qa_board: Vec<HomeQaBoard>,
    #[serde(default)]
    pub exam_schedule: Vec<HomeExamSchedule>,
}

// Groups

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    pub exam_date: String,
    pub image_num: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupData {
    pub id: i64,
    pub group_name: String,
    pub exam_date: String,
    pub group_code: String,
    pub image_num: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupRequest {
    pub group_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupData {
    pub group_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: i64,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetail {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub exam_date: String,
    pub group_code: String,
    pub member_count: i64,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPdf {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupQuiz {
    pub id: i64,
    pub title: String,
    pub difficulty: Option<String>,
    pub participants_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupQaBoard {
    pub board_id: i64,
    pub quiz_id: i64,
    pub title: String,
    pub progress: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRankingItem {
    pub position: i64,
    pub nickname: String,
    pub total_correct: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRanking {
    pub my_rank: i64,
    #[serde(default)]
    pub all_ranks: Vec<GroupRankingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetailData {
    pub group: GroupDetail,
    #[serde(default)]
    pub pdfs: Vec<GroupPdf>,
    #[serde(default)]
    pub quizzes: Vec<GroupQuiz>,
    #[serde(default)]
    pub qa_boards: Vec<GroupQaBoard>,
    pub ranking: GroupRanking,
}

// PDFs

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPdfUploader {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPdfData {
    pub id: i64,
    pub group_id: i64,
    pub file_name: String,
    pub s3_url: String,
    pub uploader: UploadPdfUploader,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfListItemUploader {
    pub id: i64,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfListItem {
    pub id: i64,
    pub title: String,
    pub file_url: String,
    pub uploader: PdfListItemUploader,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfListData {
    pub group_id: i64,
    pub group_name: String,
    #[serde(default)]
    pub pdf_list: Vec<PdfListItem>,
}

// Quizzes

/// Question kinds as the backend names them
pub mod question_type {
    pub const OX: &str = "OX";
    pub const MULTIPLE_CHOICE: &str = "객관식";
    pub const SHORT_ANSWER: &str = "단답형";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQaBoardRef {
    pub board_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuizRequest {
    pub pdf_id: i64,
    pub difficulty: String,
    pub question_types: Vec<String>,
    pub total_questions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuizData {
    pub id: i64,
    pub pdf_id: Option<i64>,
    pub round: i64,
    pub difficulty: Option<String>,
    #[serde(default)]
    pub question_types: Vec<String>,
    pub total_questions: u32,
    #[serde(default)]
    pub status: Option<String>,
    pub qa_board: QuizQaBoardRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuizOption {
    pub option_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuizQuestion {
    #[serde(rename = "type")]
    pub question_type: String,
    pub question_number: u32,
    pub question_text: String,
    pub correct_answer: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<UserQuizOption>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserQuizRequest {
    pub group_id: i64,
    pub title: String,
    pub questions: Vec<UserQuizQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartQuizRequest {
    pub quiz_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartQuizData {
    pub quiz_result_id: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: i64,
    pub option_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: String,
    pub question_number: u32,
    pub question_text: String,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub total_questions: u32,
    #[serde(default)]
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDetailData {
    pub quiz: QuizSummary,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    #[serde(rename = "type")]
    pub question_type: String,
    pub user_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizRequest {
    pub quiz_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_result_id: Option<i64>,
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResult {
    pub quiz_result_id: i64,
    /// Percentage of correct answers
    pub score: f64,
    pub correct_count: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizData {
    pub result: SubmitResult,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResultDetail {
    pub quiz_id: i64,
    #[serde(default)]
    pub quiz_title: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    pub score: f64,
    pub correct_count: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResultAnswer {
    pub quiz_result_id: i64,
    pub question_id: i64,
    pub question_number: u32,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResultData {
    pub quiz_result: QuizResultDetail,
    #[serde(default)]
    pub answers: Vec<QuizResultAnswer>,
}

// Q&A

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaUser {
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaComment {
    pub id: i64,
    pub content: String,
    pub user: QaUser,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaPost {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub content: String,
    pub user: QaUser,
    pub created_at: String,
    #[serde(default)]
    pub comments: Vec<QaComment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaRoomQuestion {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: String,
    pub question_text: String,
    pub correct_answer: String,
    pub explanation: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub user_answer: Option<String>,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaRoomQuiz {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub round: i64,
    pub total_questions: u32,
    pub group_name: String,
    #[serde(default)]
    pub questions: Vec<QaRoomQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaBoard {
    pub board_id: i64,
    pub board_title: String,
    pub board_type: String,
    #[serde(default)]
    pub posts: Vec<QaPost>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaRoomData {
    pub quiz: QaRoomQuiz,
    pub qa_board: QaBoard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQaPostRequest {
    pub board_id: i64,
    pub content: String,
    pub is_anonymous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_into_data() {
        let envelope: ApiEnvelope<JoinGroupData> = serde_json::from_value(json!({
            "isSuccess": true,
            "code": "G200",
            "httpStatus": 200,
            "message": "joined",
            "data": {"groupId": 12},
            "timestamp": "2025-01-01T00:00:00"
        }))
        .unwrap();
        assert_eq!(envelope.into_data().unwrap().group_id, 12);
    }

    #[test]
    fn test_unsuccessful_envelope_is_rejected() {
        let envelope: ApiEnvelope<Option<JoinGroupData>> = serde_json::from_value(json!({
            "isSuccess": false,
            "code": "G409",
            "message": "already a member",
            "data": null
        }))
        .unwrap();

        match envelope.into_data() {
            Err(ClientError::Rejected { code, message }) => {
                assert_eq!(code, "G409");
                assert_eq!(message, "already a member");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_rejection_with_null_data_keeps_server_message() {
        let result = ApiEnvelope::<GroupDetailData>::data_from_value(json!({
            "isSuccess": false,
            "code": "GROUP404",
            "httpStatus": 404,
            "message": "group not found",
            "data": null
        }));

        match result {
            Err(ClientError::Rejected { code, message }) => {
                assert_eq!(code, "GROUP404");
                assert_eq!(message, "group not found");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_successful_envelope_still_requires_data() {
        let result = ApiEnvelope::<JoinGroupData>::data_from_value(json!({
            "isSuccess": true,
            "code": "G200",
            "message": "ok",
            "data": null
        }));
        assert!(matches!(result, Err(ClientError::Serialization(_))));
    }

    #[test]
    fn test_login_response_wire_names() {
        let login: LoginResponse = serde_json::from_value(json!({
            "message": "ok",
            "accessToken": "A1",
            "refreshToken": "R1",
            "user": {"id": 1, "nickname": "alice"}
        }))
        .unwrap();

        let session = login.session();
        assert_eq!(session.access_token, "A1");
        assert_eq!(session.refresh_token, "R1");
        assert_eq!(session.user.unwrap().nickname, "alice");
    }

    #[test]
    fn test_signup_request_uses_camel_case() {
        let value = serde_json::to_value(SignupRequest {
            nickname: "alice".into(),
            password: "pw1234".into(),
            password_check: "pw1234".into(),
        })
        .unwrap();
        assert_eq!(value["passwordCheck"], "pw1234");
    }
}
