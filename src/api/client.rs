use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, AppResult};

use super::MailboxGateway;
use super::methods;
use super::models::{
    DeleteResponse, EmailPreview, GetEmailResponse, ListResponse, MailboxName, MoveResponse,
    OutgoingEmail, SendEmailResponse,
};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON RPC client for the mailbox service. Each RPC is one POST to
/// `{endpoint}/{service}/{Method}`.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(endpoint: &str, timeout: Duration) -> AppResult<Self> {
        let base_url = Url::parse(endpoint)?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "endpoint `{endpoint}` cannot be used as a base url"
            )));
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn call<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &'static str,
        body: &B,
    ) -> AppResult<T> {
        let url = self.method_url(method);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| map_transport_error(method, err))?;

        self.parse_json_response(method, response).await
    }

    fn method_url(&self, method: &str) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{}", methods::method_path(method)));
        url
    }

    async fn parse_json_response<T: DeserializeOwned>(
        &self,
        method: &str,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_api_error(method, status, &body))
    }
}

impl MailboxGateway for HttpGateway {
    async fn list(&self, mailbox: MailboxName) -> AppResult<Vec<EmailPreview>> {
        let response: ListResponse = self
            .call(methods::list_method(mailbox), &EmptyRequest {})
            .await?;
        Ok(response.emails)
    }

    async fn get_email(&self, id: &str) -> AppResult<GetEmailResponse> {
        self.call(methods::GET_EMAIL, &IdRequest { id }).await
    }

    async fn send_email(&self, email: &OutgoingEmail) -> AppResult<SendEmailResponse> {
        let request = SendEmailRequest::from(email);
        self.call(methods::SEND_EMAIL, &request).await
    }

    async fn move_to_trash(&self, id: &str) -> AppResult<MoveResponse> {
        self.call(methods::MOVE_TO_TRASH, &IdRequest { id }).await
    }

    async fn restore_email(&self, id: &str) -> AppResult<MoveResponse> {
        self.call(methods::RESTORE_EMAIL, &IdRequest { id }).await
    }

    async fn permanently_delete(&self, id: &str) -> AppResult<DeleteResponse> {
        self.call(methods::PERMANENTLY_DELETE, &IdRequest { id })
            .await
    }
}

#[derive(Debug, Serialize)]
struct EmptyRequest {}

#[derive(Debug, Serialize)]
struct IdRequest<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest {
    to: String,
    subject: String,
    body: String,
    cc: Vec<String>,
    bcc: Vec<String>,
    attachments: Vec<String>,
}

impl From<&OutgoingEmail> for SendEmailRequest {
    fn from(email: &OutgoingEmail) -> Self {
        Self {
            to: email.to.clone(),
            subject: email.subject.clone(),
            body: email.body.clone(),
            cc: email.cc.clone(),
            bcc: email.bcc.clone(),
            attachments: email
                .attachments
                .iter()
                .map(|attachment| attachment.to_data_url())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcErrorEnvelope {
    code: Option<i32>,
    message: Option<String>,
    #[serde(alias = "status")]
    details: Option<String>,
}

fn map_transport_error(method: &'static str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        return AppError::Timeout { action: method };
    }
    AppError::Http(err)
}

fn map_api_error(method: &str, status: StatusCode, body: &str) -> AppError {
    let message = parse_api_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            "no error details in response body".to_string()
        } else {
            body.to_string()
        }
    });

    if status == StatusCode::NOT_FOUND && method == methods::GET_EMAIL {
        return AppError::NotFound(message);
    }

    AppError::Api(format!("{method} failed ({status}): {message}"))
}

fn parse_api_error_message(body: &str) -> Option<String> {
    let envelope = serde_json::from_str::<RpcErrorEnvelope>(body).ok()?;
    let mut parts = Vec::new();

    if let Some(message) = envelope.message {
        parts.push(message);
    }

    if let Some(details) = envelope.details {
        parts.push(format!("details={details}"));
    }

    if let Some(code) = envelope.code {
        parts.push(format!("code={code}"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.join(", "))
}
