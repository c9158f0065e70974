use leptos::prelude::*;
use leptos_router::components::A;

use super::challenge::{ChallengeBanner, Challenges};
use crate::api::GraphApi;
use crate::components::force_graph::ForceGraphCanvas;
use crate::components::{Board, GameHeader, NeighborsPanel};
use crate::config::GameConfig;
use crate::engine::NodeId;

/// Challenge mode: connect two random players within the step budget.
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<GameConfig>().unwrap_or_default();
	let api = GraphApi::new(config.api_base_url.clone());
	let board = Board::new(api.clone(), &config);
	let challenges = Challenges::new(api);

	let new_challenge = Callback::new(move |()| challenges.next(board));
	new_challenge.run(());

	let on_select = Callback::new(move |node_id: NodeId| board.select(&node_id));

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas data=board.graph config=config on_select=on_select fullscreen=true />
			<div class="graph-overlay">
				<GameHeader status=board.status again_label="New challenge" on_again=new_challenge />
				<ChallengeBanner phase=challenges.phase on_retry=new_challenge />
				<nav>
					<A href="/timed">"Time trial"</A>
					<A href="/explore">"Free exploration"</A>
				</nav>
			</div>
			<NeighborsPanel board=board />
		</div>
	}
}
