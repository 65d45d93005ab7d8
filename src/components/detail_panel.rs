use leptos::callback::Callable;
use leptos::prelude::*;

use crate::competence::{DetailPanel, NodeId, NodeKind};

/// A detail payload plus what the current user may do with its node.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenPanel {
	pub panel: DetailPanel,
	pub can_mark: bool,
	pub can_delete: bool,
}

#[component]
pub fn DetailPanelView(
	open: OpenPanel,
	on_mark: Callback<NodeId>,
	on_delete: Callback<NodeId>,
	on_close: Callback<()>,
) -> impl IntoView {
	let OpenPanel {
		panel,
		can_mark,
		can_delete,
	} = open;
	let heading = match panel.kind {
		NodeKind::Skill => "Sub-skills",
		NodeKind::Position => "Duties",
		_ => "Details",
	};
	let (mark_id, delete_id) = (panel.node_id.clone(), panel.node_id.clone());

	let entries = if panel.entries.is_empty() {
		view! { <p class="empty">"Nothing here yet."</p> }.into_any()
	} else {
		view! {
			<ul>
				{panel
					.entries
					.into_iter()
					.map(|entry| {
						view! {
							<li>
								<strong>{entry.name}</strong>
								{entry.description.map(|text| view! { <p>{text}</p> })}
							</li>
						}
					})
					.collect_view()}
			</ul>
		}
		.into_any()
	};

	view! {
		<aside class="detail-panel">
			<header>
				<h2>{panel.node_name}</h2>
				<button class="close" on:click=move |_| on_close.run(())>"×"</button>
			</header>
			<h3>{heading}</h3>
			{entries}
			<footer>
				{can_mark
					.then(move || {
						view! {
							<button on:click=move |_| on_mark.run(mark_id.clone())>"Mark as mine"</button>
						}
					})}
				{can_delete
					.then(move || {
						view! {
							<button class="danger" on:click=move |_| on_delete.run(delete_id.clone())>
								"Delete"
							</button>
						}
					})}
			</footer>
		</aside>
	}
}
