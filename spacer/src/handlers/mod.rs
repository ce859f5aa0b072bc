//! HTTP handlers for Spacer pages.
//!
//! Each handler builds a short-lived `Store` for its page flow, waits for
//! the flow to settle (bounded by the configured flow timeout) and
//! renders the resulting state.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod listing;
pub mod pages;
pub mod profile;
pub mod review;

use crate::environment::SpacerEnvironment;
use axum::extract::Multipart;
use spacer_api::models::Upload;
use spacer_core::reducer::Reducer;
use spacer_runtime::Store;
use spacer_web::WebResult;
use std::collections::HashMap;

/// Run one action through a fresh store and hand back the store.
///
/// # Errors
///
/// Returns a timeout error if the flow does not settle in time.
pub(crate) async fn run_flow<R>(
    env: &SpacerEnvironment,
    reducer: R,
    state: R::State,
    action: R::Action,
) -> WebResult<Store<R::State, R::Action, SpacerEnvironment, R>>
where
    R: Reducer<Environment = SpacerEnvironment> + Clone + Send + Sync + 'static,
    R::State: Send + Sync + 'static,
    R::Action: Send + std::fmt::Debug + 'static,
{
    let store = Store::new(state, reducer, env.clone());
    store
        .send_and_wait(action, env.settings.flow_timeout)
        .await?;
    Ok(store)
}

/// Text fields and files of a multipart form.
#[derive(Debug, Default)]
pub(crate) struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<(String, Upload)>,
}

impl MultipartForm {
    /// Drain a multipart body.
    ///
    /// File inputs left empty by the browser (no name, no bytes) are skipped.
    pub(crate) async fn read(mut multipart: Multipart) -> WebResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?;
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.push((
                        name,
                        Upload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    ));
                },
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                },
            }
        }
        Ok(form)
    }

    /// Text field value, empty when absent
    pub(crate) fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Every file posted under `name`
    pub(crate) fn take_files(&mut self, name: &str) -> Vec<Upload> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = rest;
        matching.into_iter().map(|(_, upload)| upload).collect()
    }
}
