//! Org auth token creator.
//!
//! Headless core of the inline keyword that generates an org auth token for
//! a code sample. Rendering is a pure function of the state; interactions
//! are the methods that mutate it.
//!
//! A token is created at most once per widget: after success or error there
//! is no way back to the trigger short of building a new widget.

use crate::context::{org_slugs, CodeContext, PROJECT};
use crate::issuer::{TokenIssuer, TokenRequest};
use crate::popover::{Point, Popover, Position, Rect, Size};

pub const PLACEHOLDER_TOKEN: &str = "sntrys_YOUR_TOKEN_HERE";
pub const TRIGGER_LABEL: &str = "Click to generate token (DO NOT commit)";
pub const DROPDOWN_HEADER: &str = "Select an organization:";
pub const LOADING_MESSAGE: &str = "Generating token...";
pub const ERROR_MESSAGE: &str = "There was an error while generating your token.";

/// Lifecycle of the token request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenState {
    /// No request issued yet
    #[default]
    None,

    /// Request in flight
    Loading,

    /// Token created
    Success { token: String },

    /// The service returned no token
    Error,
}

/// Keys the trigger reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Other,
}

/// What the widget shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// No keyword context available
    Nothing,

    /// Signed out visitors get a dummy token
    Placeholder(&'static str),

    /// The generated token
    Token(String),

    /// Static status text
    Message(&'static str),

    /// Interactive trigger
    Trigger(TriggerView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerView {
    pub label: &'static str,
    pub title: &'static str,

    /// Organization picker, when open
    pub dropdown: Option<DropdownView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropdownView {
    pub header: &'static str,
    pub orgs: Vec<String>,

    /// Placement next to the trigger, once the trigger has been laid out
    pub position: Option<Position>,
}

/// Widget that creates an org auth token on request.
pub struct OrgAuthTokenCreator<I> {
    context: Option<CodeContext>,
    issuer: I,
    token_state: TokenState,
    popover: Popover,
}

impl<I: TokenIssuer> OrgAuthTokenCreator<I> {
    pub fn new(context: Option<CodeContext>, issuer: I) -> Self {
        Self {
            context,
            issuer,
            token_state: TokenState::None,
            popover: Popover::default(),
        }
    }

    pub fn token_state(&self) -> &TokenState {
        &self.token_state
    }

    pub fn is_open(&self) -> bool {
        self.popover.is_open()
    }

    pub fn issuer(&self) -> &I {
        &self.issuer
    }

    /// Organizations the user can create a token for.
    pub fn orgs(&self) -> Vec<String> {
        self.context
            .as_ref()
            .map(|ctx| org_slugs(ctx.keywords.choices(PROJECT)))
            .unwrap_or_default()
    }

    /// Enter the loading state for a new request. Valid from any state.
    pub fn start_request(&mut self, org_slug: &str) -> TokenRequest {
        self.token_state = TokenState::Loading;
        TokenRequest::today(org_slug)
    }

    /// Settle a request started with [`start_request`](Self::start_request).
    pub fn finish_request(&mut self, org_slug: &str, token: Option<String>) {
        match token {
            Some(token) => {
                self.token_state = TokenState::Success { token };
                self.update_selected_org(org_slug);
            }
            None => {
                tracing::warn!("Could not generate a token for {}", org_slug);
                self.token_state = TokenState::Error;
            }
        }
    }

    /// Create a token for `org_slug`.
    pub async fn request_token(&mut self, org_slug: &str) {
        let request = self.start_request(org_slug);
        let token = self.issuer.create_org_auth_token(&request).await;
        self.finish_request(org_slug, token);
    }

    /// Activate the trigger.
    ///
    /// With a single organization the token is requested right away,
    /// otherwise the organization picker is toggled. Ignored unless the
    /// trigger is shown.
    pub async fn press(&mut self) {
        if !self.shows_trigger() {
            return;
        }

        let orgs = self.orgs();
        if let [org] = orgs.as_slice() {
            self.request_token(org).await;
        } else {
            self.popover.toggle();
        }
    }

    pub async fn key_down(&mut self, key: Key) {
        match key {
            Key::Enter | Key::Space => self.press().await,
            Key::Escape => self.popover.close(),
            Key::Other => {}
        }
    }

    /// Pick an organization from the open picker.
    pub async fn choose(&mut self, org_slug: &str) {
        if !self.popover.is_open() {
            return;
        }

        self.popover.close();
        self.request_token(org_slug).await;
    }

    /// Pointer interaction anywhere on the page.
    pub fn pointer_down(&mut self, point: Point) {
        if self.popover.is_open() && self.popover.is_outside(point) {
            self.popover.close();
        }
    }

    /// Bounds of the trigger element, after layout.
    pub fn set_anchor(&mut self, anchor: Rect) {
        self.popover.set_anchor(anchor);
    }

    pub fn set_surface_size(&mut self, size: Size) {
        self.popover.set_surface_size(size);
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.popover.set_viewport(viewport);
    }

    pub fn render(&self) -> Rendered {
        let Some(context) = &self.context else {
            return Rendered::Nothing;
        };

        if !context.keywords.is_authenticated() {
            return Rendered::Placeholder(PLACEHOLDER_TOKEN);
        }

        match &self.token_state {
            TokenState::Success { token } => Rendered::Token(token.clone()),
            TokenState::Error => Rendered::Message(ERROR_MESSAGE),
            TokenState::Loading => Rendered::Message(LOADING_MESSAGE),
            TokenState::None => Rendered::Trigger(TriggerView {
                label: TRIGGER_LABEL,
                title: TRIGGER_LABEL,
                dropdown: self.popover.is_open().then(|| DropdownView {
                    header: DROPDOWN_HEADER,
                    orgs: self.orgs(),
                    position: self.popover.position(),
                }),
            }),
        }
    }

    fn shows_trigger(&self) -> bool {
        matches!(self.render(), Rendered::Trigger(_))
    }

    /// Point the shared project selection at `org_slug`, unless it already is.
    fn update_selected_org(&self, org_slug: &str) {
        let Some(context) = &self.context else {
            return;
        };

        if context
            .selected(PROJECT)
            .is_some_and(|choice| choice.org_slug() == Some(org_slug))
        {
            return;
        }

        let choices = context.keywords.choices(PROJECT);
        if let Some(index) = choices
            .iter()
            .position(|choice| choice.org_slug() == Some(org_slug))
        {
            tracing::debug!("Selecting project {} of {}", index, org_slug);
            context.shared_selection.set(PROJECT, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CodeKeywords, KeywordChoice, User};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Issuer answering every request with a fixed result.
    struct FixedIssuer {
        token: Option<String>,
        requests: Mutex<Vec<TokenRequest>>,
    }

    impl FixedIssuer {
        fn ok(token: &str) -> Self {
            Self {
                token: Some(token.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                token: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn orgs_requested(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.org_slug.clone())
                .collect()
        }
    }

    #[async_trait]
    impl TokenIssuer for FixedIssuer {
        async fn create_org_auth_token(&self, request: &TokenRequest) -> Option<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.token.clone()
        }
    }

    fn project(org: &str, slug: &str) -> KeywordChoice {
        KeywordChoice::new()
            .with("ORG_SLUG", org)
            .with("PROJECT_SLUG", slug)
    }

    fn signed_in(projects: Vec<KeywordChoice>) -> CodeContext {
        CodeContext::new(CodeKeywords {
            project: projects,
            user: Some(User {
                id: Some(1),
                name: Some("Jane".to_string()),
            }),
        })
    }

    #[test]
    fn renders_nothing_without_context() {
        let creator = OrgAuthTokenCreator::new(None, FixedIssuer::ok("t"));

        assert_eq!(creator.render(), Rendered::Nothing);
    }

    #[tokio::test]
    async fn signed_out_visitors_get_placeholder() {
        let context = CodeContext::new(CodeKeywords::placeholder());
        let mut creator = OrgAuthTokenCreator::new(Some(context), FixedIssuer::ok("t"));

        creator.press().await;

        assert_eq!(creator.render(), Rendered::Placeholder(PLACEHOLDER_TOKEN));
        assert!(creator.issuer().orgs_requested().is_empty());
    }

    #[test]
    fn starts_with_closed_trigger() {
        let creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web")])),
            FixedIssuer::ok("t"),
        );

        assert_eq!(creator.token_state(), &TokenState::None);
        assert_eq!(
            creator.render(),
            Rendered::Trigger(TriggerView {
                label: TRIGGER_LABEL,
                title: TRIGGER_LABEL,
                dropdown: None,
            })
        );
    }

    #[tokio::test]
    async fn single_org_requests_without_opening() {
        let mut creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web"), project("a", "api")])),
            FixedIssuer::ok("sntrys_abc"),
        );

        creator.press().await;

        assert!(!creator.is_open());
        assert_eq!(creator.issuer().orgs_requested(), vec!["a"]);
        assert_eq!(
            creator.token_state(),
            &TokenState::Success {
                token: "sntrys_abc".to_string()
            }
        );
        assert_eq!(creator.render(), Rendered::Token("sntrys_abc".to_string()));
    }

    #[tokio::test]
    async fn failed_request_shows_error() {
        let mut creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web")])),
            FixedIssuer::failing(),
        );

        creator.key_down(Key::Enter).await;

        assert_eq!(creator.token_state(), &TokenState::Error);
        assert_eq!(creator.render(), Rendered::Message(ERROR_MESSAGE));
    }

    #[test]
    fn loading_is_rendered_while_in_flight() {
        let mut creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web")])),
            FixedIssuer::ok("t"),
        );

        let request = creator.start_request("a");

        assert_eq!(request.org_slug, "a");
        assert!(request.name.starts_with("Generated by Docs on "));
        assert_eq!(creator.token_state(), &TokenState::Loading);
        assert_eq!(creator.render(), Rendered::Message(LOADING_MESSAGE));
    }

    #[tokio::test]
    async fn trigger_is_inert_while_loading() {
        let mut creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web")])),
            FixedIssuer::ok("t"),
        );
        creator.start_request("a");

        creator.press().await;

        assert!(creator.issuer().orgs_requested().is_empty());
        assert_eq!(creator.token_state(), &TokenState::Loading);
    }

    #[tokio::test]
    async fn multiple_orgs_toggle_picker() {
        let mut creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web"), project("b", "api")])),
            FixedIssuer::ok("t"),
        );

        creator.press().await;
        assert!(creator.is_open());
        assert!(creator.issuer().orgs_requested().is_empty());

        let Rendered::Trigger(view) = creator.render() else {
            panic!("expected trigger");
        };
        let dropdown = view.dropdown.unwrap();
        assert_eq!(dropdown.header, DROPDOWN_HEADER);
        assert_eq!(dropdown.orgs, vec!["a", "b"]);

        creator.key_down(Key::Space).await;
        assert!(!creator.is_open());
    }

    #[tokio::test]
    async fn choosing_org_closes_and_requests() {
        let mut creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web"), project("b", "api")])),
            FixedIssuer::ok("sntrys_b"),
        );

        creator.press().await;
        creator.choose("b").await;

        assert!(!creator.is_open());
        assert_eq!(creator.issuer().orgs_requested(), vec!["b"]);
        assert_eq!(creator.render(), Rendered::Token("sntrys_b".to_string()));
    }

    #[tokio::test]
    async fn choose_is_ignored_when_closed() {
        let mut creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web"), project("b", "api")])),
            FixedIssuer::ok("t"),
        );

        creator.choose("b").await;

        assert!(creator.issuer().orgs_requested().is_empty());
        assert_eq!(creator.token_state(), &TokenState::None);
    }

    #[tokio::test]
    async fn outside_click_closes_picker() {
        let mut creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web"), project("b", "api")])),
            FixedIssuer::ok("t"),
        );
        creator.set_viewport(Size::new(800.0, 600.0));
        creator.set_anchor(Rect::new(100.0, 100.0, 120.0, 20.0));
        creator.set_surface_size(Size::new(160.0, 80.0));

        creator.press().await;
        creator.pointer_down(Point::new(150.0, 110.0));
        assert!(creator.is_open());

        let Rendered::Trigger(view) = creator.render() else {
            panic!("expected trigger");
        };
        let position = view.dropdown.unwrap().position.unwrap();
        assert_eq!(position.y, 130.0);

        creator.pointer_down(Point::new(700.0, 500.0));
        assert!(!creator.is_open());
    }

    #[tokio::test]
    async fn escape_closes_picker() {
        let mut creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web"), project("b", "api")])),
            FixedIssuer::ok("t"),
        );

        creator.press().await;
        creator.key_down(Key::Escape).await;

        assert!(!creator.is_open());
    }

    #[tokio::test]
    async fn success_selects_first_project_of_org() {
        let context = signed_in(vec![
            project("orgA", "one"),
            project("orgA", "two"),
            project("orgB", "three"),
            project("orgB", "four"),
        ]);
        context.shared_selection.set(PROJECT, 1);
        let selection = context.shared_selection.clone();
        let mut creator = OrgAuthTokenCreator::new(Some(context), FixedIssuer::ok("t"));

        creator.request_token("orgB").await;

        assert_eq!(selection.get(PROJECT), 2);
    }

    #[tokio::test]
    async fn keeps_selection_already_in_org() {
        let context = signed_in(vec![
            project("orgA", "one"),
            project("orgB", "two"),
            project("orgB", "three"),
        ]);
        context.shared_selection.set(PROJECT, 2);
        let selection = context.shared_selection.clone();
        let mut creator = OrgAuthTokenCreator::new(Some(context), FixedIssuer::ok("t"));

        creator.request_token("orgB").await;

        assert_eq!(selection.get(PROJECT), 2);
    }

    #[tokio::test]
    async fn unknown_org_leaves_selection() {
        let context = signed_in(vec![project("orgA", "one"), project("orgA", "two")]);
        context.shared_selection.set(PROJECT, 1);
        let selection = context.shared_selection.clone();
        let mut creator = OrgAuthTokenCreator::new(Some(context), FixedIssuer::ok("t"));

        creator.request_token("orgZ").await;

        assert_eq!(selection.get(PROJECT), 1);
    }

    #[tokio::test]
    async fn failure_leaves_selection() {
        let context = signed_in(vec![project("orgA", "one"), project("orgB", "two")]);
        let selection = context.shared_selection.clone();
        let mut creator = OrgAuthTokenCreator::new(Some(context), FixedIssuer::failing());

        creator.request_token("orgB").await;

        assert_eq!(selection.get(PROJECT), 0);
    }

    #[tokio::test]
    async fn request_is_reentrant() {
        let mut creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web"), project("b", "api")])),
            FixedIssuer::ok("t"),
        );

        creator.request_token("a").await;
        creator.request_token("b").await;

        assert_eq!(creator.issuer().orgs_requested(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn no_way_back_to_trigger() {
        let mut creator = OrgAuthTokenCreator::new(
            Some(signed_in(vec![project("a", "web")])),
            FixedIssuer::failing(),
        );

        creator.press().await;
        creator.press().await;

        assert_eq!(creator.issuer().orgs_requested(), vec!["a"]);
        assert_eq!(creator.render(), Rendered::Message(ERROR_MESSAGE));
    }
}
