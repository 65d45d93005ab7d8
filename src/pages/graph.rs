use std::collections::VecDeque;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info};

use crate::catalog::http::HttpCatalog;
use crate::components::detail_panel::{DetailPanelView, OpenPanel};
use crate::components::filters::FilterPanel;
use crate::components::force_graph::{ForceGraphCanvas, GraphData, GraphLink, GraphNode};
use crate::competence::{Activation, FilterSet, GraphSession, NodeId, NodeKind, Projection};
use crate::config::Config;
use crate::error::GraphError;
use crate::identity::{BrowserIdentity, Identity};

type Session = GraphSession<HttpCatalog, BrowserIdentity>;

/// Work the page hands to the session. Raised from the canvas and panels,
/// run on the local executor.
#[derive(Clone, Debug, PartialEq)]
enum GraphAction {
	Activate(NodeId),
	MarkSkill(NodeId),
	Delete(NodeId),
}

/// Actions raised since the effect last ran, oldest first.
#[derive(Clone, Debug, Default)]
struct ActionQueue(VecDeque<GraphAction>);

impl ActionQueue {
	fn push(&mut self, action: GraphAction) {
		self.0.push_back(action);
	}

	fn drain(&mut self) -> Vec<GraphAction> {
		self.0.drain(..).collect()
	}
}

/// Signals the page renders from.
#[derive(Clone, Copy)]
struct Ui {
	filters: RwSignal<FilterSet>,
	graph: RwSignal<GraphData>,
	detail: RwSignal<Option<OpenPanel>>,
	notice: RwSignal<Option<String>>,
}

impl Ui {
	fn redraw(&self, session: &Session) {
		let projection = session.project(&self.filters.get_untracked());
		self.graph.set(graph_data(projection));
	}

	fn report(&self, err: GraphError) {
		self.notice.set(Some(err.to_string()));
	}
}

/// Resets the session once the page's effects are dropped.
struct ResetOnDrop(Rc<Session>);

impl Drop for ResetOnDrop {
	fn drop(&mut self) {
		self.0.reset();
	}
}

fn graph_data(projection: Projection) -> GraphData {
	GraphData {
		nodes: projection
			.nodes
			.into_iter()
			.map(|node| GraphNode {
				id: node.id.to_string(),
				label: Some(node.label),
				color: node.style.color.to_string(),
				size: node.style.size,
			})
			.collect(),
		links: projection
			.edges
			.into_iter()
			.map(|edge| GraphLink {
				source: edge.source.to_string(),
				target: edge.target.to_string(),
			})
			.collect(),
	}
}

async fn run(session: &Session, action: GraphAction, ui: Ui) {
	debug!("running {action:?}");
	match action {
		GraphAction::Activate(id) => match session.activate(&id).await {
			Ok(Activation::Details(panel)) => {
				let signed_in = session.user().is_some();
				let can_mark = signed_in && panel.kind == NodeKind::Skill && !session.is_owned(&panel.node_id);
				ui.detail.set(Some(OpenPanel {
					panel,
					can_mark,
					can_delete: signed_in,
				}));
			}
			Ok(_) => {}
			Err(err) => ui.report(err),
		},
		GraphAction::MarkSkill(id) => match session.mark_skill(&id).await {
			Ok(_) => ui.detail.update(|open| {
				if let Some(open) = open {
					open.can_mark = false;
				}
			}),
			Err(err) => ui.report(err),
		},
		GraphAction::Delete(id) => match session.delete(&id).await {
			Ok(_) => ui.detail.set(None),
			Err(err) => ui.report(err),
		},
	}
	ui.redraw(session);
}

/// The competence graph: roles around the organization, expanded on click.
#[component]
pub fn GraphPage() -> impl IntoView {
	let config = use_context::<Config>().unwrap_or_else(Config::from_env);
	let identity = BrowserIdentity::load(&config.api_url, &config.user_storage_key);
	let token = identity.current_user().and_then(|user| user.token);
	let catalog = HttpCatalog::new(&config.api_url, token);
	let session = Rc::new(GraphSession::new(catalog, identity, config.organization.clone()));

	let ui = Ui {
		filters: RwSignal::new(FilterSet::default()),
		graph: RwSignal::new(GraphData::default()),
		detail: RwSignal::new(None),
		notice: RwSignal::new(None),
	};
	let actions = RwSignal::new(ActionQueue::default());
	let raise = move |action: GraphAction| actions.update(|queue| queue.push(action));

	{
		let session = session.clone();
		spawn_local(async move {
			if let Err(err) = session.load_ownership().await {
				ui.report(err);
			}
			match session.load_roles().await {
				Ok(count) => info!("graph opened with {count} roles"),
				Err(err) => ui.report(err),
			}
			ui.redraw(&session);
		});
	}

	{
		let session = session.clone();
		Effect::new(move |_| {
			let filters = ui.filters.get();
			ui.graph.set(graph_data(session.project(&filters)));
		});
	}

	let guard = ResetOnDrop(session);
	Effect::new(move |_| {
		actions.track();
		let batch = actions
			.try_update_untracked(ActionQueue::drain)
			.unwrap_or_default();
		if batch.is_empty() {
			return;
		}
		let session = guard.0.clone();
		spawn_local(async move {
			for action in batch {
				run(&session, action, ui).await;
			}
		});
	});

	let on_activate = move |id: String| raise(GraphAction::Activate(NodeId::from(id)));
	let on_mark = Callback::new(move |id: NodeId| raise(GraphAction::MarkSkill(id)));
	let on_delete = Callback::new(move |id: NodeId| raise(GraphAction::Delete(id)));
	let on_close = Callback::new(move |()| ui.detail.set(None));

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas data=ui.graph on_activate=on_activate fullscreen=true />
			<div class="graph-overlay">
				<h1>{config.organization}</h1>
				<p class="subtitle">
					"Click a role or grade to expand it. Drag nodes to reposition. Scroll to zoom."
				</p>
				<FilterPanel filters=ui.filters />
			</div>
			{move || {
				ui.notice
					.get()
					.map(|message| {
						view! {
							<div class="graph-notice" role="alert">
								<span>{message}</span>
								<button on:click=move |_| ui.notice.set(None)>"×"</button>
							</div>
						}
					})
			}}
			{move || {
				ui.detail
					.get()
					.map(|open| {
						view! {
							<DetailPanelView
								open=open
								on_mark=on_mark
								on_delete=on_delete
								on_close=on_close
							/>
						}
					})
			}}
		</div>
	}
}
