use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::profile::application::ports::outgoing::{
    user_profile_image_path, ImageStorage, UserRepository,
};
use crate::profile::domain::entities::{EducationItem, UserInfo, UserInfoItem};
use crate::shared::dates;
use crate::shared::edit_events::{self, ItemEditEvent};
use crate::shared::identity::IdentityProvider;
use crate::shared::streams::receiver_stream;

pub struct ProfileEditingInput {
    pub editing_complete: BoxStream<'static, ()>,
    pub user_name: BoxStream<'static, String>,
    pub view_did_load: BoxStream<'static, ()>,
    pub new_profile_image: BoxStream<'static, Vec<u8>>,
}

pub struct ProfileEditingOutput {
    pub profile_image: watch::Receiver<Vec<u8>>,
    pub user_info: watch::Receiver<UserInfo>,
    pub save_complete: mpsc::UnboundedReceiver<()>,
}

/// Profile editing scene. All field edits stage into the snapshot only;
/// nothing reaches the store until the editing-complete intent, which
/// uploads the latest image, stamps its path into the aggregate and saves
/// the whole profile. A failed save is logged and produces neither a
/// completion signal nor a snapshot change.
pub struct ProfileEditingViewModel {
    user_repository: Arc<dyn UserRepository>,
    image_storage: Arc<dyn ImageStorage>,
    identity: Arc<dyn IdentityProvider>,
    user_info: watch::Sender<UserInfo>,
    profile_image: watch::Sender<Vec<u8>>,
    education_events: mpsc::UnboundedSender<ItemEditEvent<EducationItem>>,
    education_events_rx: Mutex<Option<mpsc::UnboundedReceiver<ItemEditEvent<EducationItem>>>>,
    other_item_events: mpsc::UnboundedSender<ItemEditEvent<UserInfoItem>>,
    other_item_events_rx: Mutex<Option<mpsc::UnboundedReceiver<ItemEditEvent<UserInfoItem>>>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl ProfileEditingViewModel {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        image_storage: Arc<dyn ImageStorage>,
        identity: Arc<dyn IdentityProvider>,
        initial_profile_image: Vec<u8>,
        initial_user_info: UserInfo,
    ) -> Self {
        let (user_info, _) = watch::channel(initial_user_info);
        let (profile_image, _) = watch::channel(initial_profile_image);
        let (education_events, education_events_rx) = mpsc::unbounded_channel();
        let (other_item_events, other_item_events_rx) = mpsc::unbounded_channel();

        Self {
            user_repository,
            image_storage,
            identity,
            user_info,
            profile_image,
            education_events,
            education_events_rx: Mutex::new(Some(education_events_rx)),
            other_item_events,
            other_item_events_rx: Mutex::new(Some(other_item_events_rx)),
            driver: Mutex::new(None),
        }
    }

    // ========================================================================
    // Child editor channels
    // ========================================================================

    /// Sender handed to an education-item editor at construction.
    pub fn education_edit_sender(&self) -> mpsc::UnboundedSender<ItemEditEvent<EducationItem>> {
        self.education_events.clone()
    }

    /// Sender handed to an "other item" editor at construction.
    pub fn other_item_edit_sender(&self) -> mpsc::UnboundedSender<ItemEditEvent<UserInfoItem>> {
        self.other_item_events.clone()
    }

    // ========================================================================
    // Snapshot queries
    // ========================================================================

    pub fn current_user_info(&self) -> UserInfo {
        self.user_info.borrow().clone()
    }

    pub fn current_email(&self) -> String {
        self.user_info.borrow().email.contents.clone()
    }

    pub fn current_phone_number(&self) -> String {
        self.user_info.borrow().phone_number.contents.clone()
    }

    pub fn current_address(&self) -> String {
        self.user_info.borrow().address.contents.clone()
    }

    /// The staged birthday, falling back to today when the stored string
    /// does not parse.
    pub fn current_birthday(&self) -> NaiveDate {
        dates::parse_birthday(&self.user_info.borrow().birthday.contents)
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn current_other_items(&self) -> Vec<UserInfoItem> {
        self.user_info.borrow().other_items.clone()
    }

    pub fn current_all_items(&self) -> Vec<UserInfoItem> {
        self.user_info.borrow().all_items()
    }

    pub fn current_education_items(&self) -> Vec<EducationItem> {
        self.user_info.borrow().education_items.clone()
    }

    // ========================================================================
    // Staged edits. Snapshot only, never the store.
    // ========================================================================

    pub fn update_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.user_info.send_modify(|info| info.name = name);
    }

    pub fn update_email(&self, email: impl Into<String>) {
        let email = email.into();
        self.user_info
            .send_modify(|info| info.email.contents = email);
    }

    pub fn update_phone_number(&self, phone_number: impl Into<String>) {
        let phone_number = phone_number.into();
        self.user_info
            .send_modify(|info| info.phone_number.contents = phone_number);
    }

    pub fn update_address(&self, address: impl Into<String>) {
        let address = address.into();
        self.user_info
            .send_modify(|info| info.address.contents = address);
    }

    pub fn update_birthday(&self, birthday: NaiveDate) {
        let rendered = dates::birthday_string(birthday);
        self.user_info
            .send_modify(|info| info.birthday.contents = rendered);
    }

    /// Removes the education item at `index`; out-of-range is a no-op.
    pub fn delete_education_item(&self, index: usize) {
        self.user_info.send_modify(|info| {
            edit_events::apply_to(
                &mut info.education_items,
                ItemEditEvent::Deleted { index },
            );
        });
    }

    // ========================================================================
    // Transform
    // ========================================================================

    pub fn transform(&self, input: ProfileEditingInput) -> ProfileEditingOutput {
        enum Msg {
            Complete,
            Name(String),
            DidLoad,
            NewImage(Vec<u8>),
            Education(ItemEditEvent<EducationItem>),
            OtherItem(ItemEditEvent<UserInfoItem>),
        }

        let (save_complete_tx, save_complete_rx) = mpsc::unbounded_channel();
        let output = ProfileEditingOutput {
            profile_image: self.profile_image.subscribe(),
            user_info: self.user_info.subscribe(),
            save_complete: save_complete_rx,
        };

        let education_events = self
            .take_receiver(&self.education_events_rx)
            .map(Msg::Education)
            .boxed();
        let other_item_events = self
            .take_receiver(&self.other_item_events_rx)
            .map(Msg::OtherItem)
            .boxed();

        let mut events = stream::select_all([
            input.editing_complete.map(|_| Msg::Complete).boxed(),
            input.user_name.map(Msg::Name).boxed(),
            input.view_did_load.map(|_| Msg::DidLoad).boxed(),
            input.new_profile_image.map(Msg::NewImage).boxed(),
            education_events,
            other_item_events,
        ]);

        let user_repository = Arc::clone(&self.user_repository);
        let image_storage = Arc::clone(&self.image_storage);
        let identity = Arc::clone(&self.identity);
        let user_info = self.user_info.clone();
        let profile_image = self.profile_image.clone();

        let driver = tokio::spawn(async move {
            while let Some(msg) = events.next().await {
                match msg {
                    Msg::Name(name) => {
                        user_info.send_modify(|info| info.name = name);
                    }
                    Msg::NewImage(image) => {
                        profile_image.send_replace(image);
                    }
                    Msg::Education(event) => {
                        user_info.send_modify(|info| {
                            edit_events::apply_to(&mut info.education_items, event);
                        });
                    }
                    Msg::OtherItem(event) => {
                        user_info.send_modify(|info| {
                            edit_events::apply_to(&mut info.other_items, event);
                        });
                    }
                    Msg::DidLoad => {
                        // Only the first load of a fresh snapshot refetches;
                        // later appearances keep the staged edits.
                        if *user_info.borrow() != UserInfo::empty() {
                            continue;
                        }

                        let fetched = match user_repository.fetch_current().await {
                            Ok(Some(info)) => info,
                            Ok(None) => continue,
                            Err(error) => {
                                tracing::warn!(%error, "profile fetch failed");
                                continue;
                            }
                        };

                        if !fetched.profile_image_url.is_empty() {
                            match image_storage.download(&fetched.profile_image_url).await {
                                Ok(bytes) => {
                                    profile_image.send_replace(bytes);
                                }
                                Err(error) => {
                                    tracing::warn!(%error, "profile image download failed")
                                }
                            }
                        }

                        user_info.send_replace(fetched);
                    }
                    Msg::Complete => {
                        let Some(uid) = identity.current_uid() else {
                            continue;
                        };

                        let image = profile_image.borrow().clone();
                        let path = match image_storage
                            .upload(&user_profile_image_path(&uid), image)
                            .await
                        {
                            Ok(path) => path,
                            Err(error) => {
                                tracing::warn!(%error, "profile image upload failed");
                                continue;
                            }
                        };

                        let mut staged = user_info.borrow().clone();
                        staged.profile_image_url = path;

                        match user_repository.save_for_current_user(&staged).await {
                            Ok(()) => {
                                user_info.send_replace(staged);
                                let _ = save_complete_tx.send(());
                            }
                            Err(error) => {
                                tracing::warn!(%error, "profile save failed");
                            }
                        }
                    }
                }
            }
        });

        self.install_driver(driver);
        output
    }

    /// Delegate receivers can be consumed by one transform only; later
    /// transforms get an already-ended stream.
    fn take_receiver<T: Send + 'static>(
        &self,
        slot: &Mutex<Option<mpsc::UnboundedReceiver<T>>>,
    ) -> BoxStream<'static, T> {
        let receiver = match slot.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        receiver_stream(receiver.unwrap_or_else(|| mpsc::unbounded_channel().1))
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

impl Drop for ProfileEditingViewModel {
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
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::timeout;

    use crate::profile::application::ports::outgoing::{
        ImageStorageError, UserRepositoryError,
    };
    use crate::shared::identity::AuthSession;
    use crate::shared::store::StoreError;
    use crate::shared::streams::event_channel;

    struct MockUserRepository {
        fetch_result: StdMutex<Result<Option<UserInfo>, UserRepositoryError>>,
        save_result: StdMutex<Result<(), UserRepositoryError>>,
        saved: StdMutex<Vec<UserInfo>>,
    }

    impl MockUserRepository {
        fn succeeding() -> Arc<Self> {
            Arc::new(Self {
                fetch_result: StdMutex::new(Ok(None)),
                save_result: StdMutex::new(Ok(())),
                saved: StdMutex::new(Vec::new()),
            })
        }

        fn set_fetch_result(&self, result: Result<Option<UserInfo>, UserRepositoryError>) {
            *self.fetch_result.lock().unwrap() = result;
        }

        fn set_save_result(&self, result: Result<(), UserRepositoryError>) {
            *self.save_result.lock().unwrap() = result;
        }

        fn saved(&self) -> Vec<UserInfo> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn fetch(&self, _uid: &str) -> Result<Option<UserInfo>, UserRepositoryError> {
            self.fetch_result.lock().unwrap().clone()
        }

        async fn fetch_current(&self) -> Result<Option<UserInfo>, UserRepositoryError> {
            self.fetch_result.lock().unwrap().clone()
        }

        async fn save(
            &self,
            user_info: &UserInfo,
            _uid: &str,
        ) -> Result<(), UserRepositoryError> {
            self.saved.lock().unwrap().push(user_info.clone());
            self.save_result.lock().unwrap().clone()
        }

        async fn save_for_current_user(
            &self,
            user_info: &UserInfo,
        ) -> Result<(), UserRepositoryError> {
            self.save(user_info, "current").await
        }
    }

    struct MockImageStorage {
        download_result: StdMutex<Result<Vec<u8>, ImageStorageError>>,
        uploads: StdMutex<Vec<(String, Vec<u8>)>>,
    }

    impl MockImageStorage {
        fn succeeding() -> Arc<Self> {
            Arc::new(Self {
                download_result: StdMutex::new(Ok(Vec::new())),
                uploads: StdMutex::new(Vec::new()),
            })
        }

        fn set_download_result(&self, result: Result<Vec<u8>, ImageStorageError>) {
            *self.download_result.lock().unwrap() = result;
        }

        fn uploads(&self) -> Vec<(String, Vec<u8>)> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageStorage for MockImageStorage {
        async fn upload(
            &self,
            object_path: &str,
            data: Vec<u8>,
        ) -> Result<String, ImageStorageError> {
            self.uploads
                .lock()
                .unwrap()
                .push((object_path.to_string(), data));
            Ok(object_path.to_string())
        }

        async fn download(&self, _object_path: &str) -> Result<Vec<u8>, ImageStorageError> {
            self.download_result.lock().unwrap().clone()
        }
    }

    fn stored_user() -> UserInfo {
        let mut user = UserInfo::empty();
        user.name = "Jaewon".to_string();
        user.profile_image_url = "profile_images/u1".to_string();
        user.education_items = vec![
            EducationItem::new("2012.03 - 2015.02", "High school", "", ""),
            EducationItem::new("2015.03 - 2019.02", "University", "CS", ""),
            EducationItem::new("2019.03 - In progress", "Graduate school", "CS", ""),
        ];
        user
    }

    fn view_model_with(
        repository: Arc<MockUserRepository>,
        storage: Arc<MockImageStorage>,
        initial: UserInfo,
    ) -> ProfileEditingViewModel {
        ProfileEditingViewModel::new(
            repository,
            storage,
            Arc::new(AuthSession::signed_in("u1")),
            Vec::new(),
            initial,
        )
    }

    #[tokio::test]
    async fn field_edit_is_visible_before_any_remote_write() {
        let repository = MockUserRepository::succeeding();
        let view_model = view_model_with(
            repository.clone(),
            MockImageStorage::succeeding(),
            stored_user(),
        );

        view_model.update_email("new@b.com");
        view_model.update_phone_number("010-9999-0000");

        assert_eq!(view_model.current_email(), "new@b.com");
        assert_eq!(view_model.current_phone_number(), "010-9999-0000");
        assert!(repository.saved().is_empty());
    }

    #[tokio::test]
    async fn deleting_an_education_item_keeps_the_rest_in_order() {
        let view_model = view_model_with(
            MockUserRepository::succeeding(),
            MockImageStorage::succeeding(),
            stored_user(),
        );

        view_model.delete_education_item(1);

        let remaining = view_model.current_education_items();
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].title, "High school");
        assert_eq!(remaining[1].title, "Graduate school");

        // Out of range is ignored.
        view_model.delete_education_item(9);
        assert_eq!(view_model.current_education_items().len(), 2);
    }

    #[tokio::test]
    async fn unparsable_birthday_falls_back_to_today() {
        let mut user = stored_user();
        user.birthday.contents = "around 1996".to_string();
        let view_model = view_model_with(
            MockUserRepository::succeeding(),
            MockImageStorage::succeeding(),
            user,
        );

        assert_eq!(view_model.current_birthday(), Local::now().date_naive());

        let date = NaiveDate::from_ymd_opt(1996, 3, 14).unwrap();
        view_model.update_birthday(date);
        assert_eq!(view_model.current_birthday(), date);
    }

    #[tokio::test]
    async fn did_load_fetches_only_into_an_empty_snapshot() {
        let repository = MockUserRepository::succeeding();
        repository.set_fetch_result(Ok(Some(stored_user())));
        let storage = MockImageStorage::succeeding();
        storage.set_download_result(Ok(vec![9, 9]));
        let view_model =
            view_model_with(repository.clone(), storage, UserInfo::empty());

        let (did_load, did_load_stream) = event_channel();
        let mut output = view_model.transform(ProfileEditingInput {
            editing_complete: stream::pending().boxed(),
            user_name: stream::pending().boxed(),
            view_did_load: did_load_stream,
            new_profile_image: stream::pending().boxed(),
        });

        did_load.send(()).unwrap();

        timeout(Duration::from_secs(1), output.user_info.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(output.user_info.borrow().name, "Jaewon");
        assert_eq!(*output.profile_image.borrow(), vec![9, 9]);

        // A later load keeps the staged state instead of refetching.
        view_model.update_name("Edited");
        did_load.send(()).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(view_model.current_user_info().name, "Edited");
    }

    #[tokio::test]
    async fn editing_complete_uploads_then_saves_and_signals() {
        let repository = MockUserRepository::succeeding();
        let storage = MockImageStorage::succeeding();
        let view_model =
            view_model_with(repository.clone(), storage.clone(), stored_user());

        let (complete, complete_stream) = event_channel();
        let (new_image, new_image_stream) = event_channel();
        let mut output = view_model.transform(ProfileEditingInput {
            editing_complete: complete_stream,
            user_name: stream::pending().boxed(),
            view_did_load: stream::pending().boxed(),
            new_profile_image: new_image_stream,
        });

        new_image.send(vec![1, 2, 3]).unwrap();
        timeout(Duration::from_secs(1), output.profile_image.changed())
            .await
            .unwrap()
            .unwrap();

        complete.send(()).unwrap();
        timeout(Duration::from_secs(1), output.save_complete.recv())
            .await
            .expect("save signal timed out")
            .expect("save channel closed");

        let uploads = storage.uploads();
        assert_eq!(uploads, vec![("profile_images/u1".to_string(), vec![1, 2, 3])]);

        let saved = repository.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].profile_image_url, "profile_images/u1");
    }

    #[tokio::test]
    async fn failed_save_emits_nothing_and_keeps_the_snapshot() {
        let repository = MockUserRepository::succeeding();
        repository.set_save_result(Err(UserRepositoryError::Store(StoreError::Request(
            "down".to_string(),
        ))));
        let view_model = view_model_with(
            repository.clone(),
            MockImageStorage::succeeding(),
            stored_user(),
        );
        let before = view_model.current_user_info();

        let (complete, complete_stream) = event_channel();
        let mut output = view_model.transform(ProfileEditingInput {
            editing_complete: complete_stream,
            user_name: stream::pending().boxed(),
            view_did_load: stream::pending().boxed(),
            new_profile_image: stream::pending().boxed(),
        });

        complete.send(()).unwrap();

        let no_signal = timeout(Duration::from_millis(100), output.save_complete.recv()).await;
        assert!(no_signal.is_err());
        assert_eq!(view_model.current_user_info(), before);
    }

    #[tokio::test]
    async fn child_editor_events_fold_into_the_snapshot() {
        let view_model = view_model_with(
            MockUserRepository::succeeding(),
            MockImageStorage::succeeding(),
            stored_user(),
        );
        let education = view_model.education_edit_sender();
        let other = view_model.other_item_edit_sender();

        let mut output = view_model.transform(ProfileEditingInput {
            editing_complete: stream::pending().boxed(),
            user_name: stream::pending().boxed(),
            view_did_load: stream::pending().boxed(),
            new_profile_image: stream::pending().boxed(),
        });

        education
            .send(ItemEditEvent::Replaced {
                index: 0,
                item: EducationItem::new("2012.03 - 2015.02", "Academy", "", ""),
            })
            .unwrap();
        other
            .send(ItemEditEvent::Appended(UserInfoItem::new("GitHub", "jw")))
            .unwrap();

        timeout(
            Duration::from_secs(1),
            output
                .user_info
                .wait_for(|info| !info.other_items.is_empty()),
        )
        .await
        .unwrap()
        .unwrap();

        let info = view_model.current_user_info();
        assert_eq!(info.education_items[0].title, "Academy");
        assert_eq!(info.other_items, vec![UserInfoItem::new("GitHub", "jw")]);
    }
}
