use leptos::prelude::*;

use crate::components::network_graph::NetworkExplorer;
use crate::config::ExplorerConfig;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = ExplorerConfig::from_document();

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<NetworkExplorer config=config fullscreen=true />
				<div class="graph-overlay">
					<h1>"Network Explorer"</h1>
					<p class="subtitle">
						"Click a node to highlight its neighbours. Shift-click two nodes for the shortest path. Double-click to zoom."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
