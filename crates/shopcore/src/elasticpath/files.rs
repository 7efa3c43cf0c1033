use reqwest::multipart::{Form, Part};

use super::client::ElasticpathClient;
use super::error::CommerceError;
use super::models::File;

impl ElasticpathClient {
    /// Get single file (its public link is what Telegram needs).
    pub async fn get_file(&self, file_id: &str) -> Result<File, CommerceError> {
        self.get_data(self.endpoint(&["v2", "files", file_id])?, &[]).await
    }

    /// Upload a file.
    pub async fn create_file(&self, file_name: &str, content: Vec<u8>, public: bool) -> Result<File, CommerceError> {
        let form = Form::new()
            .text("public", public.to_string())
            .part("file", Part::bytes(content).file_name(file_name.to_string()));

        let request = self.http().post(self.endpoint(&["v2", "files"])?).multipart(form);
        let body = self.send(request).await?;
        Self::decode(&body)
    }
}
