//! Caller-owned state for one operator working through a description.
//!
//! Holds the selection, bound values, body text and the last request/result
//! pair. Selecting another operation wipes everything tied to the previous one.

use tracing::debug;

use crate::binder::ParameterBinder;
use crate::error::SessionError;
use crate::executor::{InvocationResult, RequestExecutor};
use crate::index::Operation;
use crate::synth::{RequestDescriptor, RequestSynthesizer, SynthesisOptions};

#[derive(Debug, Clone)]
pub struct Session {
    synthesizer: RequestSynthesizer,
    selected_category: Option<String>,
    selected_operation: Option<Operation>,
    params: ParameterBinder,
    body: String,
    last_request: Option<RequestDescriptor>,
    last_result: Option<InvocationResult>,
}

impl Session {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            synthesizer: RequestSynthesizer::new(base_url),
            selected_category: None,
            selected_operation: None,
            params: ParameterBinder::new(),
            body: String::new(),
            last_request: None,
            last_result: None,
        }
    }

    pub fn with_options(mut self, options: SynthesisOptions) -> Self {
        self.synthesizer = self.synthesizer.with_options(options);
        self
    }

    pub fn base_url(&self) -> &str {
        self.synthesizer.base_url()
    }

    /// Changing category keeps the current operation selected.
    pub fn select_category(&mut self, category: impl Into<String>) {
        self.selected_category = Some(category.into());
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// Select `op`, clearing params, body and the last result.
    pub fn select_operation(&mut self, op: Operation) {
        debug!(method = %op.method, path = %op.path, "selected operation");
        self.selected_operation = Some(op);
        self.params.reset();
        self.body.clear();
        self.last_request = None;
        self.last_result = None;
    }

    pub fn selected_operation(&self) -> Option<&Operation> {
        self.selected_operation.as_ref()
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.set(name, value);
    }

    pub fn params(&self) -> &ParameterBinder {
        &self.params
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn last_request(&self) -> Option<&RequestDescriptor> {
        self.last_request.as_ref()
    }

    pub fn last_result(&self) -> Option<&InvocationResult> {
        self.last_result.as_ref()
    }

    /// Build the request for the selected operation without sending it.
    pub fn synthesize(&self) -> Result<RequestDescriptor, SessionError> {
        let op = self
            .selected_operation
            .as_ref()
            .ok_or(SessionError::NoOperationSelected)?;
        Ok(self.synthesizer.synthesize(op, &self.params, &self.body)?)
    }

    /// Synthesize, send, and record the request/result pair.
    ///
    /// The new result replaces any previous one.
    pub async fn invoke(
        &mut self,
        executor: &RequestExecutor,
    ) -> Result<(&RequestDescriptor, &InvocationResult), SessionError> {
        let request = self.synthesize()?;
        let result = executor.execute(&request).await;
        let request = self.last_request.insert(request);
        let result = self.last_result.insert(result);
        Ok((&*request, &*result))
    }
}
