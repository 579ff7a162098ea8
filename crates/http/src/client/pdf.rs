//! Study material API client methods

use super::{ApiRequest, ClientResult, MultipartField, QroomClient};
use crate::types::{PdfListData, UploadPdfData};
use bytes::Bytes;

const PDF_MIME: &str = "application/pdf";

impl QroomClient {
    /// Upload a PDF into a group
    ///
    /// The body is multipart, so no JSON content type is set and the transport
    /// supplies the boundary. The file bytes are kept so the upload can be
    /// replayed after a token refresh.
    pub async fn upload_pdf(
        &self,
        group_id: i64,
        file_name: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> ClientResult<UploadPdfData> {
        let req = ApiRequest::post("/pdf").multipart(vec![
            MultipartField::text("group_id", group_id.to_string()),
            MultipartField::file("file", file_name, Some(PDF_MIME.to_string()), data),
        ]);
        self.execute_data(req).await
    }

    pub async fn pdf_list(&self, group_id: i64) -> ClientResult<PdfListData> {
        self.execute_data(ApiRequest::get(format!("/pdf?group_id={group_id}")))
            .await
    }
}
