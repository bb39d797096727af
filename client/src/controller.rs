//! View-model for the correction UI.
//!
//! All UI state lives in one [`ViewModel`] owned by the [`Controller`].
//! Transitions are `Idle -> Loading -> ResultShown | Error`. An error notice
//! falls back to the previous phase after a delay.
//!
//! Overlapping requests are cancel-superseded. Every correct or tone request
//! takes a new generation number, and a reply that arrives after a newer
//! request was issued is dropped. Notice timers are owned by the model and
//! aborted when superseded or cleared.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use shared_types::{CorrectResponse, Tone};
use tokio::task::AbortHandle;
use tracing::{debug, error};

use crate::api::TextApi;
use crate::error::ClientError;
use crate::highlight::{highlight, unique_phrases};

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text to correct.";
pub const NO_RESULT_MESSAGE: &str = "Correct the text before changing its tone.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Correct,
    ChangeTone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading(Operation),
    ResultShown,
    Error(String),
}

/// What the result panel shows after a successful correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionView {
    /// Input as submitted
    pub original: String,
    /// `original` with the wrong words marked
    pub highlighted_html: String,
    /// Corrected text, replaced by tone rewrites
    pub output_text: String,
    /// Distinct wrong words
    pub wrong_words: Vec<String>,
    /// Tone of the last rewrite applied to `output_text`
    pub tone: Option<Tone>,
}

impl CorrectionView {
    pub fn new(original: &str, response: CorrectResponse) -> Self {
        let wrong_words = unique_phrases(&response.wrong_words)
            .into_iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        Self {
            original: original.to_string(),
            highlighted_html: highlight(original, &wrong_words),
            output_text: response.corrected_text,
            wrong_words,
            tone: None,
        }
    }
}

/// Render-ready copy of the UI state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub input_text: String,
    pub phase: Phase,
    pub result: Option<CorrectionView>,
    /// "Copied!" notice visible
    pub copied: bool,
}

impl Default for View {
    fn default() -> Self {
        Self {
            input_text: String::new(),
            phase: Phase::Idle,
            result: None,
            copied: false,
        }
    }
}

/// How a request ended from the UI's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// A newer request was issued while this one was in flight
    Superseded,
}

#[derive(Debug, Clone, Copy)]
pub struct NoticeTimings {
    pub error: Duration,
    pub copied: Duration,
}

impl Default for NoticeTimings {
    fn default() -> Self {
        Self {
            error: Duration::from_secs(5),
            copied: Duration::from_secs(2),
        }
    }
}

#[derive(Default)]
struct ViewModel {
    view: View,
    generation: u64,
    error_seq: u64,
    copied_seq: u64,
    error_timer: Option<AbortHandle>,
    copied_timer: Option<AbortHandle>,
}

impl ViewModel {
    fn settled_phase(&self) -> Phase {
        if self.view.result.is_some() {
            Phase::ResultShown
        } else {
            Phase::Idle
        }
    }

    fn cancel_timers(&mut self) {
        if let Some(timer) = self.error_timer.take() {
            timer.abort();
        }
        if let Some(timer) = self.copied_timer.take() {
            timer.abort();
        }
    }
}

#[derive(Clone)]
pub struct Controller {
    api: Arc<dyn TextApi>,
    model: Arc<Mutex<ViewModel>>,
    timings: NoticeTimings,
}

impl Controller {
    pub fn new(api: Arc<dyn TextApi>) -> Self {
        Self::with_timings(api, NoticeTimings::default())
    }

    pub fn with_timings(api: Arc<dyn TextApi>, timings: NoticeTimings) -> Self {
        Self {
            api,
            model: Arc::new(Mutex::new(ViewModel::default())),
            timings,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewModel> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> View {
        self.lock().view.clone()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.lock().view.input_text = text.into();
    }

    /// Send the current input for correction.
    ///
    /// Blank input is rejected locally without a network call.
    pub async fn correct(&self) -> Result<Outcome, ClientError> {
        let (generation, input) = {
            let mut vm = self.lock();
            let input = vm.view.input_text.clone();
            if input.trim().is_empty() {
                self.show_error(&mut vm, EMPTY_INPUT_MESSAGE.to_string());
                return Err(ClientError::Validation(EMPTY_INPUT_MESSAGE.to_string()));
            }
            vm.generation += 1;
            vm.view.phase = Phase::Loading(Operation::Correct);
            (vm.generation, input)
        };

        let outcome = self.api.correct(&input).await;

        let mut vm = self.lock();
        if vm.generation != generation {
            debug!(generation, latest = vm.generation, "dropping superseded correction");
            return Ok(Outcome::Superseded);
        }
        match outcome {
            Ok(response) => {
                vm.view.result = Some(CorrectionView::new(&input, response));
                vm.view.phase = Phase::ResultShown;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                error!(error = %e, "error during correction");
                self.show_error(&mut vm, format!("Failed to get correction: {e}"));
                Err(e)
            }
        }
    }

    /// Rewrite the displayed output in `tone`.
    pub async fn change_tone(&self, tone: Tone) -> Result<Outcome, ClientError> {
        let (generation, text) = {
            let mut vm = self.lock();
            let Some(text) = vm.view.result.as_ref().map(|r| r.output_text.clone()) else {
                self.show_error(&mut vm, NO_RESULT_MESSAGE.to_string());
                return Err(ClientError::Validation(NO_RESULT_MESSAGE.to_string()));
            };
            vm.generation += 1;
            vm.view.phase = Phase::Loading(Operation::ChangeTone);
            (vm.generation, text)
        };

        let outcome = self.api.change_tone(&text, &tone).await;

        let mut vm = self.lock();
        if vm.generation != generation {
            debug!(generation, latest = vm.generation, "dropping superseded tone rewrite");
            return Ok(Outcome::Superseded);
        }
        match outcome {
            Ok(response) => {
                if let Some(result) = vm.view.result.as_mut() {
                    result.output_text = response.new_text;
                    result.tone = Some(tone);
                }
                vm.view.phase = Phase::ResultShown;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                error!(error = %e, tone = %tone, "error during tone change");
                self.show_error(&mut vm, format!("Failed to change tone: {e}"));
                Err(e)
            }
        }
    }

    /// Reset to an empty input. In-flight replies are superseded.
    pub fn clear(&self) {
        let mut vm = self.lock();
        vm.cancel_timers();
        vm.generation += 1;
        vm.view = View::default();
    }

    /// Output text to put on the clipboard, showing the "copied" notice.
    pub fn copy(&self) -> Option<String> {
        let mut vm = self.lock();
        let text = vm.view.result.as_ref()?.output_text.clone();

        if let Some(timer) = vm.copied_timer.take() {
            timer.abort();
        }
        vm.view.copied = true;
        vm.copied_seq += 1;
        let seq = vm.copied_seq;
        let model = Arc::clone(&self.model);
        let delay = self.timings.copied;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut vm = model.lock().unwrap_or_else(PoisonError::into_inner);
            if vm.copied_seq == seq {
                vm.view.copied = false;
                vm.copied_timer = None;
            }
        });
        vm.copied_timer = Some(handle.abort_handle());
        Some(text)
    }

    fn show_error(&self, vm: &mut ViewModel, message: String) {
        if let Some(timer) = vm.error_timer.take() {
            timer.abort();
        }
        vm.view.phase = Phase::Error(message);
        vm.error_seq += 1;
        let seq = vm.error_seq;
        let model = Arc::clone(&self.model);
        let delay = self.timings.error;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut vm = model.lock().unwrap_or_else(PoisonError::into_inner);
            if vm.error_seq == seq && matches!(vm.view.phase, Phase::Error(_)) {
                vm.view.phase = vm.settled_phase();
                vm.error_timer = None;
            }
        });
        vm.error_timer = Some(handle.abort_handle());
    }
}
