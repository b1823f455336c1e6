//! Account-settings calls built on the request helper.
//!
//! # Design
//! `AccountClient` holds a `Requests` helper and a `base_url`. Each call has
//! a `build_*` method returning the unsent `RequestHandle`, so the exact
//! request can be inspected, and a method that sends it and applies the
//! outcome to form state from inside the completion callback.

use crate::builder::{PendingRequest, RequestHandle, Requests};
use crate::error::ApiError;
use crate::form::{DisplayNameField, Shared, SummaryEmailCheckbox};
use crate::http::ResponseBody;
use crate::types::{Account, ChangeAccount};

#[derive(Debug, Clone)]
pub struct AccountClient {
    requests: Requests,
    base_url: String,
}

impl AccountClient {
    pub fn new(requests: Requests, base_url: &str) -> Self {
        Self {
            requests,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn requests(&self) -> &Requests {
        &self.requests
    }

    fn account_url(&self) -> String {
        format!("{}/api/account", self.base_url)
    }

    pub fn build_get_account(&self) -> RequestHandle {
        self.requests.get(self.account_url())
    }

    pub fn build_change_display_name(&self, name: &str) -> Result<RequestHandle, ApiError> {
        self.requests
            .patch(self.account_url())
            .with_body(&ChangeAccount::display_name(name))
    }

    pub fn build_change_summary_email(&self, receive: bool) -> Result<RequestHandle, ApiError> {
        self.requests
            .patch(self.account_url())
            .with_body(&ChangeAccount::receive_summary_email(receive))
    }

    /// Fetch the current settings.
    pub fn fetch_account(&self) -> PendingRequest<Result<Account, ApiError>> {
        self.build_get_account().send(parse_account)
    }

    /// Submit the field's current value and mark the field with the outcome.
    pub fn change_display_name(
        &self,
        field: &Shared<DisplayNameField>,
    ) -> Result<PendingRequest<Result<(), ApiError>>, ApiError> {
        let name = field.lock().value.clone();
        let handle = self.build_change_display_name(&name)?;
        let field = field.clone();
        Ok(handle.send(move |status, body| {
            let result = check_status(status, body).map(drop);
            let mut field = field.lock();
            match &result {
                Ok(()) => field.mark_success(),
                Err(e) => {
                    tracing::warn!("display name update rejected: {e}");
                    field.mark_error();
                }
            }
            result
        }))
    }

    /// Flip the checkbox optimistically and submit the new value. A rejected
    /// update flips it back.
    pub fn change_summary_email(
        &self,
        checkbox: &Shared<SummaryEmailCheckbox>,
    ) -> Result<PendingRequest<Result<(), ApiError>>, ApiError> {
        let mut state = checkbox.lock();
        let handle = self.build_change_summary_email(!state.checked)?;
        state.toggle();
        drop(state);

        let checkbox = checkbox.clone();
        Ok(handle.send(move |status, body| {
            let result = check_status(status, body).map(drop);
            if let Err(e) = &result {
                tracing::warn!("summary email update rejected: {e}");
                checkbox.lock().revert();
            }
            result
        }))
    }
}

/// Any 2xx is success; everything else, including status 0, is
/// `RequestFailed`.
pub fn check_status(status: u16, body: ResponseBody) -> Result<ResponseBody, ApiError> {
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(ApiError::RequestFailed { status, body })
    }
}

pub fn parse_account(status: u16, body: ResponseBody) -> Result<Account, ApiError> {
    match check_status(status, body)? {
        ResponseBody::Json(value) => serde_json::from_value(value).map_err(ApiError::Decoding),
        ResponseBody::Text(text) => serde_json::from_str(&text).map_err(ApiError::Decoding),
    }
}
