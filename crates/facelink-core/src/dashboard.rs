//! Dashboard controller. Four independent tabs, each an explicit state
//! struct with a single `handle(Message) -> Effect` transition.
//!
//! Tabs never touch the network themselves. A submit that passes validation
//! yields an `Effect::Send(Request)`; the `Dashboard` performs it against a
//! [`FaceApi`] and feeds the reply back as a `Resolved` message.

use crate::api::{
    ApiError, ComparisonResponse, EmbeddingEntry, EmbeddingListResponse, EmbeddingResponse,
    FaceApi,
};
use crate::types::ImageFile;
use std::fmt;

pub const CREATE_MISSING_INPUT: &str = "Please select a file and enter a person name.";
pub const CREATE_FAILED: &str = "Failed to create embedding.";
pub const COMPARE_MISSING_INPUT: &str = "Please select both images to compare.";
pub const COMPARE_FAILED: &str = "Failed to compare faces.";
pub const DELETE_MISSING_INPUT: &str = "Please enter a person name to delete.";
pub const DELETE_FAILED: &str = "Failed to delete embedding.";
pub const RENAME_MISSING_INPUT: &str = "Please enter the current and the new person name.";
pub const RENAME_FAILED: &str = "Failed to rename embedding.";
pub const LIST_FAILED: &str = "Failed to load embeddings";

/// Inline success/error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Error(String),
}

impl Feedback {
    pub fn is_error(&self) -> bool {
        matches!(self, Feedback::Error(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Feedback::Success(t) | Feedback::Error(t) => t,
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Request lifecycle of one tab. A result only exists once loading is over.
#[derive(Debug, Clone, PartialEq)]
pub enum Status<T> {
    Idle,
    Loading,
    Done(T),
}

impl<T> Status<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading)
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Status::Done(r) => Some(r),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Create,
    Compare,
    Manage,
    List,
}

/// A network call a tab wants performed.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    CreateEmbedding { file: ImageFile, name: String },
    CompareFaces { first: ImageFile, second: ImageFile },
    DeleteEmbedding { person_name: String },
    RenameEmbedding { person_name: String, new_person_name: String },
    ListEmbeddings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Send(Request),
}

// ---------------------------------------------------------------------------
// Create tab

#[derive(Debug, Clone)]
pub enum CreateMessage {
    NameChanged(String),
    FileSelected(Option<ImageFile>),
    Submit,
    Resolved(Result<EmbeddingResponse, ApiError>),
}

#[derive(Debug, Clone)]
pub struct CreateTab {
    person_name: String,
    file: Option<ImageFile>,
    status: Status<Feedback>,
}

impl Default for CreateTab {
    fn default() -> Self {
        Self {
            person_name: String::new(),
            file: None,
            status: Status::Idle,
        }
    }
}

impl CreateTab {
    pub fn person_name(&self) -> &str {
        &self.person_name
    }

    pub fn file(&self) -> Option<&ImageFile> {
        self.file.as_ref()
    }

    pub fn status(&self) -> &Status<Feedback> {
        &self.status
    }

    pub fn handle(&mut self, msg: CreateMessage) -> Effect {
        match msg {
            CreateMessage::NameChanged(name) => {
                self.person_name = name;
                Effect::None
            }
            CreateMessage::FileSelected(file) => {
                self.file = file;
                Effect::None
            }
            CreateMessage::Submit => {
                if self.status.is_loading() {
                    return Effect::None;
                }
                let name = self.person_name.trim();
                let Some(file) = self.file.clone().filter(|_| !name.is_empty()) else {
                    self.status = Status::Done(Feedback::Error(CREATE_MISSING_INPUT.into()));
                    return Effect::None;
                };
                self.status = Status::Loading;
                Effect::Send(Request::CreateEmbedding {
                    file,
                    name: name.to_string(),
                })
            }
            CreateMessage::Resolved(result) => {
                if !self.status.is_loading() {
                    tracing::debug!("create: ignoring reply with no request in flight");
                    return Effect::None;
                }
                let feedback = match result {
                    Ok(resp) if resp.success => {
                        self.person_name.clear();
                        self.file = None;
                        Feedback::Success(resp.message.unwrap_or_default())
                    }
                    Ok(resp) => Feedback::Error(resp.text_or(CREATE_FAILED)),
                    Err(e) => Feedback::Error(e.user_message(CREATE_FAILED)),
                };
                self.status = Status::Done(feedback);
                Effect::None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Compare tab

#[derive(Debug, Clone)]
pub enum CompareMessage {
    FirstSelected(Option<ImageFile>),
    SecondSelected(Option<ImageFile>),
    Submit,
    Resolved(Result<ComparisonResponse, ApiError>),
}

#[derive(Debug, Clone)]
pub struct CompareTab {
    first: Option<ImageFile>,
    second: Option<ImageFile>,
    status: Status<ComparisonResponse>,
}

impl Default for CompareTab {
    fn default() -> Self {
        Self {
            first: None,
            second: None,
            status: Status::Idle,
        }
    }
}

impl CompareTab {
    pub fn first(&self) -> Option<&ImageFile> {
        self.first.as_ref()
    }

    pub fn second(&self) -> Option<&ImageFile> {
        self.second.as_ref()
    }

    pub fn status(&self) -> &Status<ComparisonResponse> {
        &self.status
    }

    pub fn handle(&mut self, msg: CompareMessage) -> Effect {
        match msg {
            CompareMessage::FirstSelected(file) => {
                self.first = file;
                Effect::None
            }
            CompareMessage::SecondSelected(file) => {
                self.second = file;
                Effect::None
            }
            CompareMessage::Submit => {
                if self.status.is_loading() {
                    return Effect::None;
                }
                let (Some(first), Some(second)) = (self.first.clone(), self.second.clone()) else {
                    self.status = Status::Done(ComparisonResponse::no_match(COMPARE_MISSING_INPUT));
                    return Effect::None;
                };
                self.status = Status::Loading;
                Effect::Send(Request::CompareFaces { first, second })
            }
            CompareMessage::Resolved(result) => {
                if !self.status.is_loading() {
                    tracing::debug!("compare: ignoring reply with no request in flight");
                    return Effect::None;
                }
                let response = result.unwrap_or_else(|e| {
                    ComparisonResponse::no_match(e.user_message(COMPARE_FAILED))
                });
                self.status = Status::Done(response);
                Effect::None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Manage tab

#[derive(Debug, Clone)]
pub enum ManageMessage {
    NameChanged(String),
    NewNameChanged(String),
    Delete,
    Rename,
    DeleteResolved(Result<EmbeddingResponse, ApiError>),
    RenameResolved(Result<EmbeddingResponse, ApiError>),
}

#[derive(Debug, Clone)]
pub struct ManageTab {
    person_name: String,
    new_person_name: String,
    status: Status<Feedback>,
}

impl Default for ManageTab {
    fn default() -> Self {
        Self {
            person_name: String::new(),
            new_person_name: String::new(),
            status: Status::Idle,
        }
    }
}

impl ManageTab {
    pub fn person_name(&self) -> &str {
        &self.person_name
    }

    pub fn new_person_name(&self) -> &str {
        &self.new_person_name
    }

    pub fn status(&self) -> &Status<Feedback> {
        &self.status
    }

    pub fn handle(&mut self, msg: ManageMessage) -> Effect {
        match msg {
            ManageMessage::NameChanged(name) => {
                self.person_name = name;
                Effect::None
            }
            ManageMessage::NewNameChanged(name) => {
                self.new_person_name = name;
                Effect::None
            }
            ManageMessage::Delete => {
                if self.status.is_loading() {
                    return Effect::None;
                }
                let name = self.person_name.trim();
                if name.is_empty() {
                    self.status = Status::Done(Feedback::Error(DELETE_MISSING_INPUT.into()));
                    return Effect::None;
                }
                let person_name = name.to_string();
                self.status = Status::Loading;
                Effect::Send(Request::DeleteEmbedding { person_name })
            }
            ManageMessage::Rename => {
                if self.status.is_loading() {
                    return Effect::None;
                }
                let name = self.person_name.trim();
                let new_name = self.new_person_name.trim();
                if name.is_empty() || new_name.is_empty() {
                    self.status = Status::Done(Feedback::Error(RENAME_MISSING_INPUT.into()));
                    return Effect::None;
                }
                let request = Request::RenameEmbedding {
                    person_name: name.to_string(),
                    new_person_name: new_name.to_string(),
                };
                self.status = Status::Loading;
                Effect::Send(request)
            }
            ManageMessage::DeleteResolved(result) => {
                self.resolve(result, DELETE_FAILED, false);
                Effect::None
            }
            ManageMessage::RenameResolved(result) => {
                self.resolve(result, RENAME_FAILED, true);
                Effect::None
            }
        }
    }

    fn resolve(
        &mut self,
        result: Result<EmbeddingResponse, ApiError>,
        fallback: &str,
        clear_new_name: bool,
    ) {
        if !self.status.is_loading() {
            tracing::debug!("manage: ignoring reply with no request in flight");
            return;
        }
        let feedback = match result {
            Ok(resp) if resp.success => {
                self.person_name.clear();
                if clear_new_name {
                    self.new_person_name.clear();
                }
                Feedback::Success(resp.message.unwrap_or_default())
            }
            Ok(resp) => Feedback::Error(resp.text_or(fallback)),
            Err(e) => Feedback::Error(e.user_message(fallback)),
        };
        self.status = Status::Done(feedback);
    }
}

// ---------------------------------------------------------------------------
// List tab

#[derive(Debug, Clone)]
pub enum ListMessage {
    Refresh,
    Resolved(Result<EmbeddingListResponse, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    Loaded(Vec<EmbeddingEntry>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ListTab {
    state: ListState,
}

impl Default for ListTab {
    fn default() -> Self {
        Self {
            state: ListState::Idle,
        }
    }
}

impl ListTab {
    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn handle(&mut self, msg: ListMessage) -> Effect {
        match msg {
            ListMessage::Refresh => {
                if self.state == ListState::Loading {
                    return Effect::None;
                }
                self.state = ListState::Loading;
                Effect::Send(Request::ListEmbeddings)
            }
            ListMessage::Resolved(result) => {
                if self.state != ListState::Loading {
                    tracing::debug!("list: ignoring reply with no request in flight");
                    return Effect::None;
                }
                self.state = match result {
                    Ok(EmbeddingListResponse {
                        success: true,
                        embeddings: Some(entries),
                        ..
                    }) => ListState::Loaded(entries),
                    Ok(resp) => ListState::Failed(resp.error.unwrap_or_else(|| LIST_FAILED.into())),
                    Err(e) => ListState::Failed(e.user_message(LIST_FAILED)),
                };
                Effect::None
            }
        }
    }

    pub fn render_lines(&self) -> Vec<String> {
        match &self.state {
            ListState::Idle => Vec::new(),
            ListState::Loading => vec!["Loading...".to_string()],
            ListState::Failed(error) => vec![error.clone()],
            ListState::Loaded(entries) if entries.is_empty() => {
                vec!["No embeddings found.".to_string()]
            }
            ListState::Loaded(entries) => entries
                .iter()
                .map(|e| format!("{} (ID: {})", e.person_name, e.id))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Controller

#[derive(Debug, Clone)]
pub enum Message {
    Create(CreateMessage),
    Compare(CompareMessage),
    Manage(ManageMessage),
    List(ListMessage),
}

/// Orchestrates the four tabs against one API client.
pub struct Dashboard<A> {
    api: A,
    active: Tab,
    pub create: CreateTab,
    pub compare: CompareTab,
    pub manage: ManageTab,
    pub list: ListTab,
}

impl<A: FaceApi> Dashboard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            active: Tab::Create,
            create: CreateTab::default(),
            compare: CompareTab::default(),
            manage: ManageTab::default(),
            list: ListTab::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn active_tab(&self) -> Tab {
        self.active
    }

    /// Switch tabs. Entering the list tab from another tab refreshes it;
    /// reselecting the active tab does nothing.
    pub async fn select_tab(&mut self, tab: Tab) {
        if self.active == tab {
            return;
        }
        tracing::debug!(?tab, "tab selected");
        self.active = tab;
        if tab == Tab::List {
            self.update(Message::List(ListMessage::Refresh)).await;
        }
    }

    /// Route a message to its tab without performing any request.
    pub fn handle(&mut self, msg: Message) -> Effect {
        match msg {
            Message::Create(m) => self.create.handle(m),
            Message::Compare(m) => self.compare.handle(m),
            Message::Manage(m) => self.manage.handle(m),
            Message::List(m) => self.list.handle(m),
        }
    }

    /// Handle a message and perform any request it triggers.
    pub async fn update(&mut self, msg: Message) {
        let mut effect = self.handle(msg);
        while let Effect::Send(request) = effect {
            let reply = self.perform(request).await;
            effect = self.handle(reply);
        }
    }

    /// Issue one request and wrap the reply for the tab that asked.
    pub async fn perform(&self, request: Request) -> Message {
        match request {
            Request::CreateEmbedding { file, name } => {
                tracing::info!(name = %name, file = %file.name, "creating embedding");
                let result = self.api.create_embedding(&file, &name).await;
                Message::Create(CreateMessage::Resolved(result))
            }
            Request::CompareFaces { first, second } => {
                tracing::info!(first = %first.name, second = %second.name, "comparing faces");
                let result = self.api.compare_faces(&first, &second).await;
                Message::Compare(CompareMessage::Resolved(result))
            }
            Request::DeleteEmbedding { person_name } => {
                tracing::info!(person_name = %person_name, "deleting embedding");
                let result = self.api.delete_embedding(&person_name).await;
                Message::Manage(ManageMessage::DeleteResolved(result))
            }
            Request::RenameEmbedding {
                person_name,
                new_person_name,
            } => {
                tracing::info!(
                    person_name = %person_name,
                    new_person_name = %new_person_name,
                    "renaming embedding"
                );
                let result = self
                    .api
                    .rename_embedding(&person_name, &new_person_name)
                    .await;
                Message::Manage(ManageMessage::RenameResolved(result))
            }
            Request::ListEmbeddings => {
                tracing::info!("listing embeddings");
                let result = self.api.list_embeddings().await;
                Message::List(ListMessage::Resolved(result))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jpeg_file, MockApi};

    #[tokio::test]
    async fn test_create_success_clears_inputs() {
        let api = MockApi::default();
        api.set_create(Ok(EmbeddingResponse {
            success: true,
            embedding: Some(vec![0.1, 0.2]),
            message: Some("Embedding saved for Alice".into()),
            error: None,
        }));
        let mut dash = Dashboard::new(api);

        dash.update(Message::Create(CreateMessage::NameChanged("  Alice ".into())))
            .await;
        dash.update(Message::Create(CreateMessage::FileSelected(Some(jpeg_file("a.jpg")))))
            .await;
        dash.update(Message::Create(CreateMessage::Submit)).await;

        assert_eq!(
            dash.create.status().result(),
            Some(&Feedback::Success("Embedding saved for Alice".into()))
        );
        assert_eq!(dash.create.person_name(), "");
        assert!(dash.create.file().is_none());
        assert_eq!(dash.api().calls(), vec!["create:Alice"]);
    }

    #[tokio::test]
    async fn test_create_missing_name_skips_network() {
        let mut dash = Dashboard::new(MockApi::default());
        dash.update(Message::Create(CreateMessage::FileSelected(Some(jpeg_file("a.jpg")))))
            .await;
        dash.update(Message::Create(CreateMessage::NameChanged("   ".into())))
            .await;
        dash.update(Message::Create(CreateMessage::Submit)).await;

        assert_eq!(
            dash.create.status().result(),
            Some(&Feedback::Error(CREATE_MISSING_INPUT.into()))
        );
        assert!(dash.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_server_rejection_keeps_inputs() {
        let api = MockApi::default();
        api.set_create(Ok(EmbeddingResponse {
            success: false,
            embedding: None,
            message: Some("No face detected".into()),
            error: None,
        }));
        let mut dash = Dashboard::new(api);
        dash.update(Message::Create(CreateMessage::NameChanged("Bob".into())))
            .await;
        dash.update(Message::Create(CreateMessage::FileSelected(Some(jpeg_file("b.jpg")))))
            .await;
        dash.update(Message::Create(CreateMessage::Submit)).await;

        assert_eq!(
            dash.create.status().result(),
            Some(&Feedback::Error("No face detected".into()))
        );
        assert_eq!(dash.create.person_name(), "Bob");
        assert!(dash.create.file().is_some());
    }

    #[tokio::test]
    async fn test_create_transport_error_uses_fallback() {
        let api = MockApi::default();
        api.set_create(Err(ApiError::Transport("refused".into())));
        let mut dash = Dashboard::new(api);
        dash.update(Message::Create(CreateMessage::NameChanged("Bob".into())))
            .await;
        dash.update(Message::Create(CreateMessage::FileSelected(Some(jpeg_file("b.jpg")))))
            .await;
        dash.update(Message::Create(CreateMessage::Submit)).await;

        assert_eq!(
            dash.create.status().result(),
            Some(&Feedback::Error(CREATE_FAILED.into()))
        );
    }

    #[test]
    fn test_submit_ignored_while_loading() {
        let mut tab = CreateTab::default();
        tab.handle(CreateMessage::NameChanged("Alice".into()));
        tab.handle(CreateMessage::FileSelected(Some(jpeg_file("a.jpg"))));

        assert!(matches!(tab.handle(CreateMessage::Submit), Effect::Send(_)));
        assert!(tab.status().is_loading());
        assert_eq!(tab.handle(CreateMessage::Submit), Effect::None);
    }

    #[tokio::test]
    async fn test_compare_match_renders_similarity() {
        let api = MockApi::default();
        api.set_compare(Ok(ComparisonResponse {
            is_match: true,
            similarity: Some(0.92),
            message: None,
        }));
        let mut dash = Dashboard::new(api);
        dash.update(Message::Compare(CompareMessage::FirstSelected(Some(jpeg_file("1.jpg")))))
            .await;
        dash.update(Message::Compare(CompareMessage::SecondSelected(Some(jpeg_file("2.jpg")))))
            .await;
        dash.update(Message::Compare(CompareMessage::Submit)).await;

        let lines = dash.compare.status().result().unwrap().render_lines();
        assert_eq!(lines, vec!["Match Found!", "Similarity: 92.0%"]);
    }

    #[tokio::test]
    async fn test_compare_missing_file() {
        let mut dash = Dashboard::new(MockApi::default());
        dash.update(Message::Compare(CompareMessage::FirstSelected(Some(jpeg_file("1.jpg")))))
            .await;
        dash.update(Message::Compare(CompareMessage::Submit)).await;

        let result = dash.compare.status().result().unwrap();
        assert!(!result.is_match);
        assert_eq!(result.message.as_deref(), Some(COMPARE_MISSING_INPUT));
        assert!(dash.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_compare_transport_failure_synthesizes_no_match() {
        let api = MockApi::default();
        api.set_compare(Err(ApiError::Server {
            status: 500,
            detail: Some("model not loaded".into()),
        }));
        let mut dash = Dashboard::new(api);
        dash.update(Message::Compare(CompareMessage::FirstSelected(Some(jpeg_file("1.jpg")))))
            .await;
        dash.update(Message::Compare(CompareMessage::SecondSelected(Some(jpeg_file("2.jpg")))))
            .await;
        dash.update(Message::Compare(CompareMessage::Submit)).await;

        let result = dash.compare.status().result().unwrap();
        assert!(!result.is_match);
        assert_eq!(result.similarity, None);
        assert_eq!(result.message.as_deref(), Some("model not loaded"));
    }

    #[tokio::test]
    async fn test_delete_success_and_failure() {
        let api = MockApi::default();
        api.set_delete(Ok(EmbeddingResponse {
            success: false,
            embedding: None,
            message: None,
            error: Some("no such person".into()),
        }));
        let mut dash = Dashboard::new(api);
        dash.update(Message::Manage(ManageMessage::NameChanged("Carol".into())))
            .await;
        dash.update(Message::Manage(ManageMessage::Delete)).await;
        assert_eq!(
            dash.manage.status().result(),
            Some(&Feedback::Error("no such person".into()))
        );
        assert_eq!(dash.manage.person_name(), "Carol");

        dash.api().set_delete(Ok(EmbeddingResponse {
            success: true,
            embedding: None,
            message: Some("Embedding deleted for Carol".into()),
            error: None,
        }));
        dash.update(Message::Manage(ManageMessage::Delete)).await;
        assert_eq!(
            dash.manage.status().result(),
            Some(&Feedback::Success("Embedding deleted for Carol".into()))
        );
        assert_eq!(dash.manage.person_name(), "");
        assert_eq!(dash.api().calls(), vec!["delete:Carol", "delete:Carol"]);
    }

    #[tokio::test]
    async fn test_delete_requires_name() {
        let mut dash = Dashboard::new(MockApi::default());
        dash.update(Message::Manage(ManageMessage::Delete)).await;
        assert_eq!(
            dash.manage.status().result(),
            Some(&Feedback::Error(DELETE_MISSING_INPUT.into()))
        );
        assert!(dash.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_rename_requires_both_names() {
        let mut dash = Dashboard::new(MockApi::default());
        dash.update(Message::Manage(ManageMessage::NameChanged("Dan".into())))
            .await;
        dash.update(Message::Manage(ManageMessage::Rename)).await;
        assert_eq!(
            dash.manage.status().result(),
            Some(&Feedback::Error(RENAME_MISSING_INPUT.into()))
        );

        dash.update(Message::Manage(ManageMessage::NewNameChanged("Daniel".into())))
            .await;
        dash.update(Message::Manage(ManageMessage::Rename)).await;
        assert_eq!(dash.api().calls(), vec!["rename:Dan->Daniel"]);
        assert_eq!(dash.manage.new_person_name(), "");
    }

    #[tokio::test]
    async fn test_list_tab_refreshes_on_select() {
        let api = MockApi::default();
        api.set_list(Ok(EmbeddingListResponse {
            success: true,
            embeddings: Some(vec![EmbeddingEntry {
                id: 1,
                person_name: "Alice".into(),
            }]),
            error: None,
        }));
        let mut dash = Dashboard::new(api);

        dash.select_tab(Tab::Compare).await;
        assert!(dash.api().calls().is_empty());

        dash.select_tab(Tab::List).await;
        assert_eq!(dash.active_tab(), Tab::List);
        assert_eq!(dash.api().calls(), vec!["list"]);
        assert_eq!(dash.list.render_lines(), vec!["Alice (ID: 1)"]);
    }

    #[tokio::test]
    async fn test_reselecting_list_tab_does_not_refetch() {
        let api = MockApi::default();
        api.set_list(Ok(EmbeddingListResponse {
            success: true,
            embeddings: Some(Vec::new()),
            error: None,
        }));
        let mut dash = Dashboard::new(api);

        dash.select_tab(Tab::List).await;
        dash.select_tab(Tab::List).await;
        assert_eq!(dash.api().calls(), vec!["list"]);

        // Manual refresh still reloads.
        dash.update(Message::List(ListMessage::Refresh)).await;
        assert_eq!(dash.api().calls(), vec!["list", "list"]);

        dash.select_tab(Tab::Create).await;
        dash.select_tab(Tab::List).await;
        assert_eq!(dash.api().calls(), vec!["list", "list", "list"]);
    }

    #[tokio::test]
    async fn test_list_failure_renders_only_error() {
        let api = MockApi::default();
        api.set_list(Ok(EmbeddingListResponse {
            success: false,
            embeddings: None,
            error: Some("db down".into()),
        }));
        let mut dash = Dashboard::new(api);
        dash.select_tab(Tab::List).await;

        assert_eq!(dash.list.state(), &ListState::Failed("db down".into()));
        assert_eq!(dash.list.render_lines(), vec!["db down"]);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let api = MockApi::default();
        api.set_list(Ok(EmbeddingListResponse {
            success: true,
            embeddings: Some(Vec::new()),
            error: None,
        }));
        let mut dash = Dashboard::new(api);
        dash.select_tab(Tab::List).await;
        assert_eq!(dash.list.render_lines(), vec!["No embeddings found."]);
    }

    #[test]
    fn test_stray_reply_is_ignored() {
        let mut tab = ListTab::default();
        let effect = tab.handle(ListMessage::Resolved(Ok(EmbeddingListResponse {
            success: true,
            embeddings: Some(Vec::new()),
            error: None,
        })));
        assert_eq!(effect, Effect::None);
        assert_eq!(tab.state(), &ListState::Idle);
    }
}
