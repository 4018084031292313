use std::sync::{Arc, Mutex};

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cv::application::ports::outgoing::{CVRepository, CVRepositoryError};
use crate::cv::domain::entities::CVInfo;
use crate::profile::application::ports::outgoing::UserRepository;
use crate::profile::domain::entities::UserInfo;

pub struct HomeInput {
    pub view_did_load: BoxStream<'static, ()>,
    pub view_will_appear: BoxStream<'static, ()>,
}

pub struct HomeOutput {
    pub user_info: watch::Receiver<UserInfo>,
    pub cvs: watch::Receiver<Vec<CVInfo>>,
}

/// Home scene: the profile summary and the CV list, refreshed on first
/// load and whenever the scene becomes active again. Refresh failures
/// degrade to "no update"; the previously displayed snapshot stays.
pub struct HomeViewModel {
    user_repository: Arc<dyn UserRepository>,
    cv_repository: Arc<dyn CVRepository>,
    user_info: watch::Sender<UserInfo>,
    cvs: watch::Sender<Vec<CVInfo>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl HomeViewModel {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        cv_repository: Arc<dyn CVRepository>,
    ) -> Self {
        let (user_info, _) = watch::channel(UserInfo::empty());
        let (cvs, _) = watch::channel(Vec::new());

        Self {
            user_repository,
            cv_repository,
            user_info,
            cvs,
            driver: Mutex::new(None),
        }
    }

    pub fn current_user_info(&self) -> UserInfo {
        self.user_info.borrow().clone()
    }

    pub async fn remove_cv(&self, cv_uuid: &str) -> Result<(), CVRepositoryError> {
        self.cv_repository.remove_for_current_user(cv_uuid).await
    }

    pub fn transform(&self, input: HomeInput) -> HomeOutput {
        let output = HomeOutput {
            user_info: self.user_info.subscribe(),
            cvs: self.cvs.subscribe(),
        };

        let user_repository = Arc::clone(&self.user_repository);
        let cv_repository = Arc::clone(&self.cv_repository);
        let user_info = self.user_info.clone();
        let cvs = self.cvs.clone();

        // The very first will-appear coincides with did-load; only later
        // appearances trigger another refresh.
        let mut refresh = stream::select(input.view_did_load, input.view_will_appear.skip(1));

        let driver = tokio::spawn(async move {
            while refresh.next().await.is_some() {
                match user_repository.fetch_current().await {
                    Ok(Some(info)) => {
                        user_info.send_replace(info);
                    }
                    Ok(None) => {}
                    Err(error) => tracing::warn!(%error, "profile refresh failed"),
                }

                match cv_repository.fetch_all_of_current_user().await {
                    Ok(list) => {
                        cvs.send_replace(list);
                    }
                    Err(error) => tracing::warn!(%error, "cv list refresh failed"),
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

impl Drop for HomeViewModel {
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
