use gloo_timers::callback::{Interval, Timeout};
use leptos::prelude::*;
use leptos_router::components::A;
use log::info;

use super::challenge::{ChallengeBanner, Challenges, Phase};
use crate::api::GraphApi;
use crate::components::force_graph::ForceGraphCanvas;
use crate::components::{Board, GameHeader, NeighborsPanel};
use crate::config::GameConfig;
use crate::engine::{GameResult, NodeId, TimeTrial};

const BONUS_FLASH_MS: u32 = 2800;

fn final_score(score: u32) -> String {
	let pairs = if score == 1 { "pair" } else { "pairs" };
	format!("You connected {score} {pairs} before the clock ran out.")
}

/// Time trial: connect as many random pairs as the clock allows. Every win
/// adds time and moves straight on to the next pair.
#[component]
pub fn TimeTrialPage() -> impl IntoView {
	let config = use_context::<GameConfig>().unwrap_or_default();
	let api = GraphApi::new(config.api_base_url.clone());
	let board = Board::new(api.clone(), &config.exploration());
	let challenges = Challenges::new(api);
	let trial = RwSignal::new(TimeTrial::new(config.time_trial_secs, config.time_bonus_secs));
	let bonus_visible = RwSignal::new(false);

	// The clock only runs while a challenge is on the board.
	let clock = Interval::new(1000, move || {
		if challenges.phase.try_get_untracked() != Some(Phase::Ready) {
			return;
		}
		if trial.try_update(TimeTrial::tick) == Some(true) {
			let score = trial.get_untracked().score();
			info!("time trial over with {score} wins");
			board.set_locked(true);
		}
	});
	StoredValue::new_local(clock);

	board.on_finish(Callback::new(move |result: GameResult| {
		if result != GameResult::Win || trial.try_update(TimeTrial::record_win) != Some(true) {
			return;
		}
		bonus_visible.set(true);
		Timeout::new(BONUS_FLASH_MS, move || {
			bonus_visible.try_set(false);
		})
		.forget();
		challenges.next(board);
	}));

	let skip = Callback::new(move |()| challenges.next(board));
	let play_again = move |_| {
		trial.update(TimeTrial::restart);
		board.set_locked(false);
		challenges.next(board);
	};
	skip.run(());

	let on_select = Callback::new(move |node_id: NodeId| board.select(&node_id));
	let bonus_label = format!("+{}s", trial.with_untracked(TimeTrial::bonus_secs));

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas data=board.graph config=config on_select=on_select fullscreen=true />
			<div class="graph-overlay">
				<GameHeader status=board.status again_label="Next pair" on_again=skip />
				<div class="trial-stats">
					<span class="clock">{move || format!("Time left {}s", trial.with(TimeTrial::remaining_secs))}</span>
					<span class="score">{move || format!("Score {}", trial.with(TimeTrial::score))}</span>
					<span class="bonus" class:hidden=move || !bonus_visible.get()>{bonus_label}</span>
				</div>
				<ChallengeBanner phase=challenges.phase on_retry=skip />
				<nav>
					<A href="/">"Challenge mode"</A>
					<A href="/explore">"Free exploration"</A>
				</nav>
			</div>
			<NeighborsPanel board=board />
			<Show when=move || trial.with(TimeTrial::is_over)>
				<div class="result time-up">
					<h2>"Time's up"</h2>
					<p>{move || final_score(trial.with(TimeTrial::score))}</p>
					<button on:click=play_again>"Play again"</button>
				</div>
			</Show>
		</div>
	}
}
