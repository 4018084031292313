use std::sync::{Arc, Mutex};

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::cv::application::ports::outgoing::CVRepository;
use crate::cv::domain::entities::{CVInfo, CoverLetter, Resume};
use crate::shared::dates;

/// What this editing session is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditingType {
    /// Renaming an existing CV, addressed by its child key.
    Edit { uuid: String },
    /// Creating a new CV from the entered title.
    New,
}

/// Title editing session states. `Committed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSessionState {
    Idle,
    Editing,
    Committing,
    Committed,
}

pub struct CVEditInput {
    pub title: BoxStream<'static, String>,
    pub done: BoxStream<'static, ()>,
}

pub struct CVEditOutput {
    pub title: watch::Receiver<String>,
    pub state: watch::Receiver<EditSessionState>,
    pub done: mpsc::UnboundedReceiver<()>,
    pub editing_type: EditingType,
}

/// CV title editing. The done intent commits the staged title: a new CV is
/// saved whole, an existing one gets an atomic title+lastModified update.
/// A failed commit logs, returns to `Idle` and emits no done signal.
pub struct CVEditViewModel {
    repository: Arc<dyn CVRepository>,
    initial_title: String,
    editing_type: EditingType,
    title: watch::Sender<String>,
    state: watch::Sender<EditSessionState>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl CVEditViewModel {
    pub fn new(
        repository: Arc<dyn CVRepository>,
        initial_title: impl Into<String>,
        editing_type: EditingType,
    ) -> Self {
        let initial_title = initial_title.into();
        let (title, _) = watch::channel(initial_title.clone());
        let (state, _) = watch::channel(EditSessionState::Idle);

        Self {
            repository,
            initial_title,
            editing_type,
            title,
            state,
            driver: Mutex::new(None),
        }
    }

    pub fn initial_title(&self) -> &str {
        &self.initial_title
    }

    pub fn editing_type(&self) -> &EditingType {
        &self.editing_type
    }

    pub fn current_title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn transform(&self, input: CVEditInput) -> CVEditOutput {
        enum Msg {
            Title(String),
            Done,
        }

        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let output = CVEditOutput {
            title: self.title.subscribe(),
            state: self.state.subscribe(),
            done: done_rx,
            editing_type: self.editing_type.clone(),
        };

        let repository = Arc::clone(&self.repository);
        let initial_title = self.initial_title.clone();
        let editing_type = self.editing_type.clone();
        let title = self.title.clone();
        let state = self.state.clone();

        let mut events = stream::select(
            input.title.map(Msg::Title),
            input.done.map(|_| Msg::Done),
        );

        let driver = tokio::spawn(async move {
            let mut current = initial_title.clone();

            while let Some(msg) = events.next().await {
                match msg {
                    Msg::Title(new_title) => {
                        current = new_title;
                        state.send_replace(if current == initial_title {
                            EditSessionState::Idle
                        } else {
                            EditSessionState::Editing
                        });
                        title.send_replace(current.clone());
                    }
                    Msg::Done => {
                        state.send_replace(EditSessionState::Committing);

                        let last_modified = dates::standard_now_string();
                        let result = match &editing_type {
                            EditingType::New => {
                                let cv = CVInfo::new(
                                    current.clone(),
                                    Resume::empty(),
                                    CoverLetter::empty(),
                                    last_modified,
                                );
                                repository.save_for_current_user(&cv).await
                            }
                            EditingType::Edit { uuid } => {
                                repository
                                    .save_title_for_current_user(&current, &last_modified, uuid)
                                    .await
                            }
                        };

                        match result {
                            Ok(()) => {
                                state.send_replace(EditSessionState::Committed);
                                let _ = done_tx.send(());
                                // Terminal: the session is over.
                                break;
                            }
                            Err(error) => {
                                tracing::warn!(%error, "cv title commit failed");
                                state.send_replace(EditSessionState::Idle);
                            }
                        }
                    }
                }
            }
        });

        self.install_driver(driver);
        output
    }

    fn install_driver(&self, driver: JoinHandle<()>) {
        let mut guard = match self.driver.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = guard.replace(driver) {
            previous.abort();
        }
    }
}

impl Drop for CVEditViewModel {
    fn drop(&mut self) {
        let mut guard = match self.driver.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(driver) = guard.take() {
            driver.abort();
        }
    }
}
