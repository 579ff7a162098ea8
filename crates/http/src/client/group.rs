//! Home screen and study group API client methods

use super::{ApiRequest, ClientResult, QroomClient};
use crate::types::{
    CreateGroupData, CreateGroupRequest, GroupDetailData, HomeData, JoinGroupData,
    JoinGroupRequest,
};

impl QroomClient {
    /// Groups, open Q&A boards and exam schedule of the current user
    pub async fn home(&self) -> ClientResult<HomeData> {
        self.execute_data(ApiRequest::get("/home")).await
    }

    /// Create a group; the response carries the code others join with
    pub async fn create_group(&self, request: &CreateGroupRequest) -> ClientResult<CreateGroupData> {
        let req = ApiRequest::post("/group/new").json(request)?;
        self.execute_data(req).await
    }

    /// Join a group by its code
    pub async fn join_group(&self, group_code: impl Into<String>) -> ClientResult<JoinGroupData> {
        let req = ApiRequest::post("/group/join").json(&JoinGroupRequest {
            group_code: group_code.into(),
        })?;
        self.execute_data(req).await
    }

    pub async fn leave_group(&self, group_id: i64) -> ClientResult<()> {
        self.execute_ack(ApiRequest::delete(format!("/group/{group_id}/leave")))
            .await
    }

    /// Group main page: members, PDFs, quizzes, Q&A boards and ranking
    pub async fn group_detail(&self, group_id: i64) -> ClientResult<GroupDetailData> {
        self.execute_data(ApiRequest::get(format!("/group/{group_id}/main")))
            .await
    }

    pub async fn delete_group(&self, group_id: i64) -> ClientResult<()> {
        self.execute_ack(ApiRequest::delete(format!("/group/{group_id}")))
            .await
    }
}
