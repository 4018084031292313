use std::sync::{Arc, Mutex};

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::shared::dates;
use crate::shared::edit_events::ItemEditEvent;
use crate::cv::domain::entities::ResumeItem;

/// Whether the editor appends a new item or replaces the one at `index`
/// in the parent's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryEditingType {
    New,
    Edit { index: usize },
}

/// End bound of the item's period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeriodEnd {
    At(i32, u32),
    InProgress,
}

pub struct CategoryEditingInput {
    pub title: BoxStream<'static, String>,
    pub second_title: BoxStream<'static, String>,
    pub description: BoxStream<'static, String>,
    pub entrance_date: BoxStream<'static, (i32, u32)>,
    pub end_date: BoxStream<'static, (i32, u32)>,
    pub enrollment_selection: BoxStream<'static, ()>,
    pub end_selection: BoxStream<'static, ()>,
    pub done: BoxStream<'static, ()>,
}

pub struct CategoryEditingOutput {
    pub resume_item: watch::Receiver<ResumeItem>,
    pub done: mpsc::UnboundedReceiver<()>,
}

/// Editor for one resume entry. Field inputs reassemble the staged item
/// live; the done intent hands the result to the parent list as an
/// append or an in-place replacement, then signals completion.
pub struct CategoryEditingViewModel {
    initial_item: ResumeItem,
    editing_type: CategoryEditingType,
    delegate: mpsc::UnboundedSender<ItemEditEvent<ResumeItem>>,
    resume_item: watch::Sender<ResumeItem>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl CategoryEditingViewModel {
    pub fn new(
        initial_item: ResumeItem,
        editing_type: CategoryEditingType,
        delegate: mpsc::UnboundedSender<ItemEditEvent<ResumeItem>>,
    ) -> Self {
        let (resume_item, _) = watch::channel(initial_item.clone());

        Self {
            initial_item,
            editing_type,
            delegate,
            resume_item,
            driver: Mutex::new(None),
        }
    }

    pub fn editing_type(&self) -> CategoryEditingType {
        self.editing_type
    }

    pub fn current_item(&self) -> ResumeItem {
        self.resume_item.borrow().clone()
    }

    pub fn transform(&self, input: CategoryEditingInput) -> CategoryEditingOutput {
        enum Msg {
            Title(String),
            SecondTitle(String),
            Description(String),
            Entrance(i32, u32),
            End(i32, u32),
            Enrollment,
            EndSelected,
            Done,
        }

        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let output = CategoryEditingOutput {
            resume_item: self.resume_item.subscribe(),
            done: done_rx,
        };

        let mut events = stream::select_all([
            input.title.map(Msg::Title).boxed(),
            input.second_title.map(Msg::SecondTitle).boxed(),
            input.description.map(Msg::Description).boxed(),
            input
                .entrance_date
                .map(|(year, month)| Msg::Entrance(year, month))
                .boxed(),
            input
                .end_date
                .map(|(year, month)| Msg::End(year, month))
                .boxed(),
            input.enrollment_selection.map(|_| Msg::Enrollment).boxed(),
            input.end_selection.map(|_| Msg::EndSelected).boxed(),
            input.done.map(|_| Msg::Done).boxed(),
        ]);

        let editing_type = self.editing_type;
        let delegate = self.delegate.clone();
        let resume_item = self.resume_item.clone();

        let initial = self.initial_item.clone();
        let (now_year, now_month) = dates::current_year_month();

        let driver = tokio::spawn(async move {
            let mut item = initial.clone();
            let mut entrance = match (initial.entrance_year(), initial.entrance_month()) {
                (Some(year), Some(month)) => (year, month),
                _ => (now_year, now_month),
            };
            let mut end = match (initial.end_year(), initial.end_month()) {
                (Some(year), Some(month)) => PeriodEnd::At(year, month),
                _ => PeriodEnd::InProgress,
            };

            while let Some(msg) = events.next().await {
                match msg {
                    Msg::Title(title) => item.title = title,
                    Msg::SecondTitle(second_title) => item.second_title = second_title,
                    Msg::Description(description) => item.description = description,
                    Msg::Entrance(year, month) => entrance = (year, month),
                    Msg::End(year, month) => end = PeriodEnd::At(year, month),
                    Msg::Enrollment => end = PeriodEnd::InProgress,
                    Msg::EndSelected => end = PeriodEnd::At(now_year, now_month),
                    Msg::Done => {
                        let event = match editing_type {
                            CategoryEditingType::New => ItemEditEvent::Appended(item.clone()),
                            CategoryEditingType::Edit { index } => ItemEditEvent::Replaced {
                                index,
                                item: item.clone(),
                            },
                        };
                        if delegate.send(event).is_err() {
                            tracing::warn!("resume item editor has no parent listening");
                        }
                        let _ = done_tx.send(());
                        break;
                    }
                }

                item.period = render_period(entrance, end);
                resume_item.send_replace(item.clone());
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

fn render_period(entrance: (i32, u32), end: PeriodEnd) -> String {
    let start = format!("{}.{:02}", entrance.0, entrance.1);
    match end {
        PeriodEnd::At(year, month) => format!("{} - {}.{:02}", start, year, month),
        PeriodEnd::InProgress => format!("{} - In progress", start),
    }
}

impl Drop for CategoryEditingViewModel {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::time::timeout;

    use crate::shared::streams::event_channel;

    struct Inputs {
        title: mpsc::UnboundedSender<String>,
        second_title: mpsc::UnboundedSender<String>,
        entrance_date: mpsc::UnboundedSender<(i32, u32)>,
        end_date: mpsc::UnboundedSender<(i32, u32)>,
        enrollment_selection: mpsc::UnboundedSender<()>,
        done: mpsc::UnboundedSender<()>,
    }

    fn wire(view_model: &CategoryEditingViewModel) -> (Inputs, CategoryEditingOutput) {
        let (title_tx, title) = event_channel();
        let (second_title_tx, second_title) = event_channel();
        let (_description_tx, description) = event_channel();
        let (entrance_tx, entrance_date) = event_channel();
        let (end_tx, end_date) = event_channel();
        let (enrollment_tx, enrollment_selection) = event_channel();
        let (_end_selection_tx, end_selection) = event_channel();
        let (done_tx, done) = event_channel();

        let output = view_model.transform(CategoryEditingInput {
            title,
            second_title,
            description,
            entrance_date,
            end_date,
            enrollment_selection,
            end_selection,
            done,
        });

        (
            Inputs {
                title: title_tx,
                second_title: second_title_tx,
                entrance_date: entrance_tx,
                end_date: end_tx,
                enrollment_selection: enrollment_tx,
                done: done_tx,
            },
            output,
        )
    }

    async fn wait_for_item<F>(receiver: &mut watch::Receiver<ResumeItem>, predicate: F) -> ResumeItem
    where
        F: FnMut(&ResumeItem) -> bool,
    {
        timeout(Duration::from_secs(1), receiver.wait_for(predicate))
            .await
            .expect("item update timed out")
            .expect("item sender dropped")
            .clone()
    }

    #[tokio::test]
    async fn field_edits_reassemble_the_staged_item() {
        let (delegate, _events) = mpsc::unbounded_channel();
        let view_model = CategoryEditingViewModel::new(
            ResumeItem::default(),
            CategoryEditingType::New,
            delegate,
        );
        let (inputs, mut output) = wire(&view_model);

        inputs.title.send("Acme".to_string()).unwrap();
        inputs.second_title.send("Backend team".to_string()).unwrap();
        inputs.entrance_date.send((2019, 3)).unwrap();
        inputs.end_date.send((2023, 2)).unwrap();

        let item = wait_for_item(&mut output.resume_item, |item| {
            item.period == "2019.03 - 2023.02" && item.title == "Acme"
        })
        .await;
        assert_eq!(item.second_title, "Backend team");
    }

    #[tokio::test]
    async fn enrollment_selection_marks_the_period_open() {
        let (delegate, _events) = mpsc::unbounded_channel();
        let view_model = CategoryEditingViewModel::new(
            ResumeItem::new("2019.03 - 2023.02", "Acme", "", ""),
            CategoryEditingType::Edit { index: 0 },
            delegate,
        );
        let (inputs, mut output) = wire(&view_model);

        inputs.enrollment_selection.send(()).unwrap();

        let item = wait_for_item(&mut output.resume_item, |item| {
            item.period.ends_with("In progress")
        })
        .await;
        assert_eq!(item.period, "2019.03 - In progress");
    }

    #[tokio::test]
    async fn done_appends_a_new_item_to_the_parent() {
        let (delegate, mut events) = mpsc::unbounded_channel();
        let view_model = CategoryEditingViewModel::new(
            ResumeItem::default(),
            CategoryEditingType::New,
            delegate,
        );
        let (inputs, mut output) = wire(&view_model);

        inputs.title.send("Intern".to_string()).unwrap();
        wait_for_item(&mut output.resume_item, |item| item.title == "Intern").await;
        inputs.done.send(()).unwrap();

        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("delegate event timed out")
            .expect("delegate closed");
        match event {
            ItemEditEvent::Appended(item) => assert_eq!(item.title, "Intern"),
            other => panic!("expected an append, got {:?}", other),
        }

        timeout(Duration::from_secs(1), output.done.recv())
            .await
            .expect("done signal timed out")
            .expect("done channel closed");
    }

    #[tokio::test]
    async fn done_replaces_the_edited_index_in_the_parent() {
        let (delegate, mut events) = mpsc::unbounded_channel();
        let view_model = CategoryEditingViewModel::new(
            ResumeItem::new("2019.03 - 2023.02", "Old", "", ""),
            CategoryEditingType::Edit { index: 2 },
            delegate,
        );
        let (inputs, mut output) = wire(&view_model);

        inputs.title.send("New".to_string()).unwrap();
        wait_for_item(&mut output.resume_item, |item| item.title == "New").await;
        inputs.done.send(()).unwrap();

        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("delegate event timed out")
            .expect("delegate closed");
        match event {
            ItemEditEvent::Replaced { index, item } => {
                assert_eq!(index, 2);
                assert_eq!(item.title, "New");
                assert_eq!(item.period, "2019.03 - 2023.02");
            }
            other => panic!("expected a replacement, got {:?}", other),
        }
    }
}
