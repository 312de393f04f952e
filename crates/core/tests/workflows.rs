use std::sync::Arc;
use std::time::Duration;

use lumo::fake::{Action, FakeView};
use lumo::{Error, Feature, Layout, Projects, Session, Timings, set_feature};

fn session(view: Arc<FakeView>) -> Arc<Session> {
	let session = Arc::new(Session::new(view));
	session.mark_authenticated(true);
	session
}

fn projects(view: Arc<FakeView>) -> (Projects, Arc<Session>) {
	let session = session(view);
	(Projects::new(session.clone(), Layout::default(), Timings::default()), session)
}

fn project_view() -> FakeView {
	let layout = Layout::default();
	FakeView::new()
		.with_present(&layout.project_create_button)
		.with_reveal_on_click(
			&layout.project_create_button,
			&[&layout.project_name_field, &layout.project_instructions_field],
		)
		.with_text(&layout.buttons, "Create project")
}

#[tokio::test(start_paused = true)]
async fn login_is_detected_once_marker_appears() {
	let marker = Layout::default().account_marker;
	let view = Arc::new(FakeView::new());
	let session = Arc::new(Session::new(view.clone()));

	let reveal = {
		let view = view.clone();
		let marker = marker.clone();
		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_secs(5)).await;
			view.set_present(&marker, true);
		})
	};

	session
		.wait_for_login(&marker, Duration::from_secs(2), Duration::from_secs(60))
		.await
		.unwrap();
	reveal.await.unwrap();
	assert!(session.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn login_wait_times_out() {
	let view = Arc::new(FakeView::new());
	let session = Arc::new(Session::new(view));

	let err = session
		.wait_for_login("#account", Duration::from_secs(2), Duration::from_secs(10))
		.await
		.unwrap_err();
	assert!(matches!(err, Error::Timeout { ref condition, .. } if condition == "login"));
	assert!(!session.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn refresh_login_tracks_marker() {
	let view = Arc::new(FakeView::new().with_present("#account"));
	let session = Session::new(view.clone());

	assert!(session.refresh_login("#account").await.unwrap());
	view.set_present("#account", false);
	assert!(!session.refresh_login("#account").await.unwrap());
	assert!(session.ensure_authenticated().is_err());
}

#[tokio::test(start_paused = true)]
async fn create_project_fills_modal_and_submits() {
	let layout = Layout::default();
	let view = Arc::new(project_view());
	let (projects, session) = projects(view.clone());

	projects.create_project("Research", Some("Be concise.")).await.unwrap();

	let actions = view.actions();
	assert!(actions.contains(&Action::Fill {
		target: layout.project_name_field.clone(),
		value: "Research".into(),
	}));
	assert!(actions.contains(&Action::Fill {
		target: layout.project_instructions_field.clone(),
		value: "Be concise.".into(),
	}));
	assert_eq!(
		actions.last(),
		Some(&Action::Click {
			target: "Create project".into()
		})
	);
	assert!(!session.is_busy());
}

#[tokio::test(start_paused = true)]
async fn create_project_expands_collapsed_sidebar() {
	let layout = Layout::default();
	let view = Arc::new(project_view().with_present(&layout.projects_sidebar_toggle));
	let (projects, _) = projects(view.clone());

	projects.create_project("Research", None).await.unwrap();

	assert_eq!(
		view.count(&Action::Click {
			target: layout.projects_sidebar_toggle.clone()
		}),
		1
	);
}

#[tokio::test(start_paused = true)]
async fn failed_creation_dismisses_modal_and_releases_guard() {
	let layout = Layout::default();
	// the modal never opens
	let view = Arc::new(FakeView::new().with_present(&layout.project_create_button));
	let (projects, session) = projects(view.clone());

	let err = projects.create_project("Research", None).await.unwrap_err();

	assert!(matches!(err, Error::ElementNotFound(ref selector) if *selector == layout.project_name_field));
	assert_eq!(view.count(&Action::Dismiss), 2);
	assert!(!session.is_busy());
}

#[tokio::test(start_paused = true)]
async fn concurrent_creation_is_rejected() {
	let view = Arc::new(project_view());
	let (projects, session) = projects(view);

	let first = tokio::spawn({
		let projects = projects.clone();
		async move { projects.create_project("Alpha", None).await }
	});
	tokio::time::sleep(Duration::from_millis(1)).await;
	assert!(session.is_busy());

	let second = projects.create_project("Beta", None).await;
	assert!(matches!(second, Err(Error::Busy)));

	first.await.unwrap().unwrap();
	assert!(!session.is_busy());
	projects.create_project("Gamma", None).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn workflows_require_authentication() {
	let view = Arc::new(project_view());
	let session = Arc::new(Session::new(view.clone()));
	let projects = Projects::new(session.clone(), Layout::default(), Timings::default());

	assert!(matches!(projects.create_project("Alpha", None).await, Err(Error::NotAuthenticated)));
	assert!(matches!(projects.start_new_chat().await, Err(Error::NotAuthenticated)));
	assert!(matches!(
		set_feature(&session, Feature::WebSearch, true, Duration::ZERO).await,
		Err(Error::NotAuthenticated)
	));
	assert!(view.actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn project_name_is_required() {
	let (projects, _) = projects(Arc::new(project_view()));
	assert!(matches!(projects.create_project("  ", None).await, Err(Error::InvalidInput(_))));
	assert!(matches!(projects.open_project("").await, Err(Error::InvalidInput(_))));
}

#[tokio::test(start_paused = true)]
async fn open_project_clicks_matching_title() {
	let layout = Layout::default();
	let view = Arc::new(
		FakeView::new()
			.with_title(&layout.project_items, "Archive")
			.with_title(&layout.project_items, "Research"),
	);
	let (projects, _) = projects(view.clone());

	projects.open_project("Research").await.unwrap();
	assert_eq!(
		view.actions().last(),
		Some(&Action::Click {
			target: "Research".into()
		})
	);

	let err = projects.open_project("Missing").await.unwrap_err();
	assert!(matches!(err, Error::ElementNotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn new_chat_uses_sidebar_label() {
	let layout = Layout::default();
	let view = Arc::new(FakeView::new().with_text(&layout.sidebar_labels, "New chat"));
	let (projects, _) = projects(view.clone());

	projects.start_new_chat().await.unwrap();
	assert_eq!(view.count(&Action::Click { target: "New chat".into() }), 1);
}

#[tokio::test(start_paused = true)]
async fn toggle_is_skipped_when_already_in_state() {
	let view = Arc::new(FakeView::new().with_feature(Feature::WebSearch, true));
	let session = session(view.clone());

	let outcome = set_feature(&session, Feature::WebSearch, true, Duration::from_millis(500)).await.unwrap();

	assert!(!outcome.toggled);
	assert_eq!(view.count(&Action::Toggle(Feature::WebSearch)), 0);
}

#[tokio::test(start_paused = true)]
async fn toggle_flips_and_verifies() {
	let view = Arc::new(FakeView::new().with_feature(Feature::GhostMode, false));
	let session = session(view.clone());

	let outcome = set_feature(&session, Feature::GhostMode, true, Duration::from_millis(500)).await.unwrap();

	assert!(outcome.toggled);
	assert!(outcome.enabled);
	assert_eq!(view.feature(Feature::GhostMode), Some(true));
}

#[tokio::test(start_paused = true)]
async fn unresponsive_toggle_is_reported() {
	let view = Arc::new(FakeView::new().with_stuck_feature(Feature::GhostMode, false));
	let session = session(view);

	let err = set_feature(&session, Feature::GhostMode, true, Duration::from_millis(500)).await.unwrap_err();

	assert!(matches!(
		err,
		Error::ToggleNotApplied {
			feature: Feature::GhostMode,
			enabled: true
		}
	));
	assert_eq!(err.to_string(), "ghost mode is still disabled after toggling");
}

#[tokio::test(start_paused = true)]
async fn missing_toggle_control_is_not_found() {
	let session = session(Arc::new(FakeView::new()));
	let err = set_feature(&session, Feature::WebSearch, true, Duration::ZERO).await.unwrap_err();
	assert!(matches!(err, Error::ElementNotFound(_)));
}
