use serde_json::json;

use crate::ui::prelude::*;

use super::api::{ApiError, UserApi};
use super::models::{DraftForm, Field, SavedUser, UserPayload, UserRecord};
use super::validation::{ValidationErrors, validate};

/// Progress of the initial fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Populated,
    Failed,
}

/// A network call the manager wants made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    List,
    Create(UserPayload),
    Update { id: u64, payload: UserPayload },
    Delete(u64),
}

/// The result of a `Request`, ready to be merged into the manager
#[derive(Debug)]
pub enum Completion {
    Loaded(Result<Vec<UserRecord>, ApiError>),
    Created(Result<SavedUser, ApiError>),
    Updated {
        id: u64,
        result: Result<SavedUser, ApiError>,
    },
    Removed {
        id: u64,
        result: Result<(), ApiError>,
    },
}

/// What happened to the local state after an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded(usize),
    Created(UserRecord),
    Updated(UserRecord),
    Removed(u64),
    /// The draft did not validate; nothing was sent
    Invalid,
    /// The request failed and was logged; state is unchanged
    Failed,
}

/// Perform `request` against `api`.
pub async fn execute(api: &dyn UserApi, request: Request) -> Completion {
    match request {
        Request::List => Completion::Loaded(api.list().await),
        Request::Create(payload) => Completion::Created(api.create(&payload).await),
        Request::Update { id, payload } => Completion::Updated {
            id,
            result: api.update(id, &payload).await,
        },
        Request::Delete(id) => Completion::Removed {
            id,
            result: api.delete(id).await,
        },
    }
}

/// Local state of the user manager: the record sequence, the form draft and
/// the errors from the last submit attempt.
///
/// Every mutation goes through a plain method so the state can be driven
/// without a network; the async helpers at the bottom only pair those
/// methods with `execute`.
#[derive(Debug, Clone)]
pub struct UserManager {
    users: Vec<UserRecord>,
    load_state: LoadState,
    draft: DraftForm,
    errors: ValidationErrors,
    lock_name_on_edit: bool,
}

impl Default for UserManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl UserManager {
    pub fn new(lock_name_on_edit: bool) -> Self {
        Self {
            users: Vec::new(),
            load_state: LoadState::Idle,
            draft: DraftForm::default(),
            errors: ValidationErrors::default(),
            lock_name_on_edit,
        }
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn find(&self, id: u64) -> Option<&UserRecord> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state() == LoadState::Loading
    }

    pub fn draft(&self) -> &DraftForm {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Whether `field` is read-only in the current form mode
    pub fn is_locked(&self, field: Field) -> bool {
        field == Field::Name && self.lock_name_on_edit && self.draft.is_editing()
    }

    /// Change a draft field. Returns false when the field is locked.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.is_locked(field) {
            return false;
        }
        *self.draft.get_mut(field) = value.into();
        true
    }

    /// Mutable access to a field for in-place text editing
    pub fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        if self.is_locked(field) {
            return None;
        }
        Some(self.draft.get_mut(field))
    }

    pub fn start_loading(&mut self) -> Request {
        self.load_state = LoadState::Loading;
        Request::List
    }

    /// Copy `record` into the draft and switch the form to edit mode
    pub fn begin_edit(&mut self, record: &UserRecord) {
        self.draft = DraftForm::from_record(record);
        self.errors = ValidationErrors::default();
    }

    /// Drop the draft and return to create mode
    pub fn reset_draft(&mut self) {
        self.draft = DraftForm::default();
        self.errors = ValidationErrors::default();
    }

    /// Validate the draft and build the request a submit should send.
    /// Returns `None` when validation fails; the errors are kept for display.
    pub fn prepare_submit(&mut self) -> Option<Request> {
        self.errors = validate(&self.draft);
        if !self.errors.is_empty() {
            emit(
                Level::Debug,
                "users.submit.invalid",
                "Draft failed validation, nothing sent",
                None,
            );
            return None;
        }

        let payload = self.draft.to_payload();
        Some(match self.draft.editing {
            Some(id) => Request::Update { id, payload },
            None => Request::Create(payload),
        })
    }

    pub fn prepare_remove(&self, id: u64) -> Request {
        Request::Delete(id)
    }

    /// Merge a finished request into local state.
    ///
    /// Failures are logged and leave records untouched. Each completion is
    /// applied to the sequence as it is at completion time, so overlapping
    /// requests land in the order they finish.
    pub fn apply(&mut self, completion: Completion) -> Outcome {
        match completion {
            Completion::Loaded(Ok(users)) => self.apply_loaded(users),
            Completion::Loaded(Err(err)) => {
                log_failure("users.load.failed", "API request failed", &err, None);
                self.apply_load_failed()
            }
            Completion::Created(Ok(saved)) => self.apply_created(saved),
            Completion::Created(Err(err)) => {
                log_failure("users.create.failed", "Error creating user", &err, None);
                Outcome::Failed
            }
            Completion::Updated { id, result: Ok(saved) } => self.apply_updated(id, saved),
            Completion::Updated { id, result: Err(err) } => {
                log_failure("users.update.failed", "Error updating user", &err, Some(id));
                Outcome::Failed
            }
            Completion::Removed { id, result: Ok(()) } => self.apply_removed(id),
            Completion::Removed { id, result: Err(err) } => {
                log_failure("users.delete.failed", "Error deleting user", &err, Some(id));
                Outcome::Failed
            }
        }
    }

    pub fn apply_loaded(&mut self, users: Vec<UserRecord>) -> Outcome {
        let count = users.len();
        self.users = users;
        self.load_state = LoadState::Populated;
        emit(
            Level::Debug,
            "users.load.done",
            &format!("Loaded {count} users"),
            None,
        );
        Outcome::Loaded(count)
    }

    pub fn apply_load_failed(&mut self) -> Outcome {
        self.load_state = LoadState::Failed;
        Outcome::Failed
    }

    /// Append a created user. The server-assigned id is replaced with
    /// `len + 1`, which can collide with an existing id after deletes.
    pub fn apply_created(&mut self, saved: SavedUser) -> Outcome {
        let id = self.users.len() as u64 + 1;
        if let Some(server_id) = saved.id {
            emit(
                Level::Debug,
                "users.create.id",
                &format!("Server assigned id {server_id}, using {id}"),
                None,
            );
        }
        let record = saved.into_record(id);
        self.users.push(record.clone());
        self.reset_draft();
        Outcome::Created(record)
    }

    /// Replace every record whose id is `id` with the response.
    pub fn apply_updated(&mut self, id: u64, saved: SavedUser) -> Outcome {
        let record = saved.into_record(id);
        for user in self.users.iter_mut().filter(|user| user.id == id) {
            *user = record.clone();
        }
        self.reset_draft();
        Outcome::Updated(record)
    }

    pub fn apply_removed(&mut self, id: u64) -> Outcome {
        self.users.retain(|user| user.id != id);
        Outcome::Removed(id)
    }

    /// Records matching `query` (case-insensitive, against name, email and
    /// phone) in sequence order
    pub fn filtered(&self, query: &str) -> Vec<&UserRecord> {
        let needle = query.trim().to_lowercase();
        self.users()
            .iter()
            .filter(|user| matches_query(user, &needle))
            .collect()
    }

    pub async fn load_all(&mut self, api: &dyn UserApi) -> Outcome {
        let request = self.start_loading();
        let completion = execute(api, request).await;
        self.apply(completion)
    }

    pub async fn submit(&mut self, api: &dyn UserApi) -> Outcome {
        let Some(request) = self.prepare_submit() else {
            return Outcome::Invalid;
        };
        let completion = execute(api, request).await;
        self.apply(completion)
    }

    pub async fn remove(&mut self, api: &dyn UserApi, id: u64) -> Outcome {
        let request = self.prepare_remove(id);
        let completion = execute(api, request).await;
        self.apply(completion)
    }
}

fn matches_query(user: &UserRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [&user.name, &user.email, &user.phone]
        .iter()
        .any(|value| value.to_lowercase().contains(needle))
}

fn log_failure(code: &str, message: &str, err: &ApiError, id: Option<u64>) {
    let data = id.map(|id| json!({ "id": id }));
    emit(Level::Error, code, &format!("{message}: {err}"), data);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::models::Address;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// In-memory collection that echoes writes like the placeholder service
    #[derive(Default)]
    struct FakeApi {
        users: Vec<UserRecord>,
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with_users(count: u64) -> Self {
            Self {
                users: (1..=count).map(sample).collect(),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn record(&self, call: String) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                return Err(ApiError::Http {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".to_string(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserApi for FakeApi {
        async fn list(&self) -> Result<Vec<UserRecord>, ApiError> {
            self.record("list".to_string())?;
            Ok(self.users.clone())
        }

        async fn create(&self, payload: &UserPayload) -> Result<SavedUser, ApiError> {
            self.record("create".to_string())?;
            Ok(SavedUser {
                id: Some(11),
                payload: payload.clone(),
            })
        }

        async fn update(&self, id: u64, payload: &UserPayload) -> Result<SavedUser, ApiError> {
            self.record(format!("update {id}"))?;
            Ok(SavedUser {
                id: Some(id),
                payload: payload.clone(),
            })
        }

        async fn delete(&self, id: u64) -> Result<(), ApiError> {
            self.record(format!("delete {id}"))
        }
    }

    fn sample(id: u64) -> UserRecord {
        UserRecord {
            id,
            name: format!("User {id}"),
            email: format!("user{id}@example.com"),
            phone: format!("55500000{id:02}"),
            address: Address {
                street: format!("{id} Main St"),
                city: "Gwenborough".to_string(),
            },
        }
    }

    async fn loaded(api: &FakeApi) -> UserManager {
        let mut manager = UserManager::default();
        manager.load_all(api).await;
        manager
    }

    fn fill(manager: &mut UserManager, name: &str, email: &str, phone: &str) {
        assert!(manager.set_field(Field::Name, name));
        manager.set_field(Field::Email, email);
        manager.set_field(Field::Phone, phone);
    }

    #[tokio::test]
    async fn load_all_populates_sequence() {
        let api = FakeApi::with_users(10);
        let mut manager = UserManager::default();
        assert_eq!(manager.load_state(), LoadState::Idle);

        let outcome = manager.load_all(&api).await;

        assert_eq!(outcome, Outcome::Loaded(10));
        assert_eq!(manager.load_state(), LoadState::Populated);
        assert!(!manager.is_loading());
        let ids: Vec<u64> = manager.users().iter().map(|u| u.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn failed_load_clears_loading_without_data() {
        let api = FakeApi::failing();
        let mut manager = UserManager::default();

        let request = manager.start_loading();
        assert!(manager.is_loading());
        let outcome = manager.apply(execute(&api, request).await);

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(manager.load_state(), LoadState::Failed);
        assert!(!manager.is_loading());
        assert!(manager.users().is_empty());
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn invalid_draft_makes_no_call() {
        let api = FakeApi::with_users(3);
        let mut manager = loaded(&api).await;
        fill(&mut manager, "Al", "a@x.com", "12345");

        assert_eq!(manager.submit(&api).await, Outcome::Invalid);
        assert_eq!(api.calls(), vec!["list"]);
        assert!(manager.errors().get(Field::Name).is_some());
        assert!(manager.errors().get(Field::Phone).is_some());
        assert_eq!(manager.draft().name, "Al");
        assert_eq!(manager.users().len(), 3);
    }

    #[tokio::test]
    async fn create_appends_with_length_plus_one_id() {
        let api = FakeApi::with_users(10);
        let mut manager = loaded(&api).await;
        fill(&mut manager, "Ann", "a@x.com", "1234567890");

        let outcome = manager.submit(&api).await;

        let Outcome::Created(record) = outcome else {
            panic!("expected create, got {outcome:?}");
        };
        assert_eq!(record.id, 11);
        assert_eq!(manager.users().len(), 11);
        let last = manager.users().last().unwrap();
        assert_eq!(last.id, 11);
        assert_eq!(last.name, "Ann");
        assert_eq!(last.email, "a@x.com");
        assert_eq!(manager.draft(), &DraftForm::default());
        assert!(manager.errors().is_empty());
    }

    #[tokio::test]
    async fn create_id_ignores_server_id_and_can_collide_after_delete() {
        let api = FakeApi::with_users(3);
        let mut manager = loaded(&api).await;
        manager.remove(&api, 1).await;

        fill(&mut manager, "Ann", "a@x.com", "1234567890");
        manager.submit(&api).await;

        let ids: Vec<u64> = manager.users().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 3, 3]);
    }

    #[tokio::test]
    async fn update_replaces_only_edited_record() {
        let api = FakeApi::with_users(5);
        let mut manager = loaded(&api).await;
        let before = manager.users().to_vec();

        let target = manager.find(3).cloned().unwrap();
        manager.begin_edit(&target);
        assert_eq!(manager.draft().editing, Some(3));
        manager.set_field(Field::Email, "new@example.com");
        manager.set_field(Field::City, "Lebsackbury");

        let outcome = manager.submit(&api).await;

        assert!(matches!(outcome, Outcome::Updated(ref r) if r.id == 3));
        assert_eq!(api.calls().last().unwrap(), "update 3");
        for (old, new) in before.iter().zip(manager.users()) {
            if old.id == 3 {
                assert_eq!(new.email, "new@example.com");
                assert_eq!(new.address.city, "Lebsackbury");
                assert_eq!(new.name, old.name);
            } else {
                assert_eq!(old, new);
            }
        }
        assert!(!manager.draft().is_editing());
        assert_eq!(manager.draft(), &DraftForm::default());
    }

    #[tokio::test]
    async fn failed_update_stays_in_edit_mode() {
        let api = FakeApi::with_users(3);
        let mut manager = loaded(&api).await;
        let target = manager.find(2).cloned().unwrap();
        manager.begin_edit(&target);
        manager.set_field(Field::Phone, "0987654321");

        let failing = FakeApi::failing();
        assert_eq!(manager.submit(&failing).await, Outcome::Failed);

        assert_eq!(manager.find(2), Some(&target));
        assert_eq!(manager.draft().editing, Some(2));
        assert_eq!(manager.draft().phone, "0987654321");
    }

    #[tokio::test]
    async fn remove_filters_on_success_only() {
        let api = FakeApi::with_users(6);
        let mut manager = loaded(&api).await;

        assert_eq!(manager.remove(&api, 5).await, Outcome::Removed(5));
        assert!(manager.find(5).is_none());
        assert_eq!(manager.users().len(), 5);

        let before = manager.users().to_vec();
        let failing = FakeApi::failing();
        assert_eq!(manager.remove(&failing, 4).await, Outcome::Failed);
        assert_eq!(manager.users(), before.as_slice());
    }

    #[test]
    fn name_is_locked_while_editing() {
        let mut manager = UserManager::new(true);
        assert!(manager.set_field(Field::Name, "Ann"));

        manager.begin_edit(&sample(1));
        assert!(manager.is_locked(Field::Name));
        assert!(!manager.set_field(Field::Name, "Changed"));
        assert!(manager.field_mut(Field::Name).is_none());
        assert_eq!(manager.draft().name, "User 1");
        assert!(manager.set_field(Field::Phone, "1112223333"));

        manager.reset_draft();
        assert!(!manager.is_locked(Field::Name));
    }

    #[test]
    fn name_unlocked_when_configured() {
        let mut manager = UserManager::new(false);
        manager.begin_edit(&sample(1));
        assert!(manager.set_field(Field::Name, "Renamed"));
    }

    #[test]
    fn overlapping_creates_both_land() {
        let mut manager = UserManager::default();
        manager.apply_loaded(vec![sample(1), sample(2)]);

        let payload = |name: &str| SavedUser {
            id: Some(11),
            payload: UserPayload {
                name: name.to_string(),
                ..Default::default()
            },
        };
        manager.apply(Completion::Created(Ok(payload("Second"))));
        manager.apply(Completion::Created(Ok(payload("First"))));

        let names: Vec<&str> = manager.users().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["User 1", "User 2", "Second", "First"]);
        assert_eq!(manager.users()[3].id, 4);
    }

    #[test]
    fn filter_matches_name_email_and_phone() {
        let mut manager = UserManager::default();
        manager.apply_loaded(vec![sample(1), sample(2), sample(12)]);

        let names = |query: &str| -> Vec<String> {
            manager
                .filtered(query)
                .into_iter()
                .map(|u| u.name.clone())
                .collect()
        };

        assert_eq!(names("").len(), 3);
        assert_eq!(names("user 2"), vec!["User 2"]);
        assert_eq!(names("USER12@"), vec!["User 12"]);
        assert_eq!(names("5550000001"), vec!["User 1"]);
        assert!(names("nobody").is_empty());
    }
}
