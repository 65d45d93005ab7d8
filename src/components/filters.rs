use leptos::prelude::*;

use crate::competence::{FilterSet, NodeKind};

/// Optional kinds the user can show or hide. Roles and grades are always on.
const TOGGLES: [(NodeKind, &str); 2] = [(NodeKind::Skill, "Skills"), (NodeKind::Position, "Positions")];

#[component]
pub fn FilterPanel(filters: RwSignal<FilterSet>) -> impl IntoView {
	view! {
		<fieldset class="graph-filters">
			<legend>"Show"</legend>
			{TOGGLES
				.into_iter()
				.map(|(kind, label)| {
					view! {
						<label>
							<input
								type="checkbox"
								prop:checked=move || filters.with(|f| f.contains(kind))
								on:change=move |_| filters.update(|f| f.toggle(kind))
							/>
							{label}
						</label>
					}
				})
				.collect_view()}
		</fieldset>
	}
}
