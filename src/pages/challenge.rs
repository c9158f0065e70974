//! Loading random challenges, shared by the challenge and time trial pages.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;

use crate::api::{GraphApi, ping_for_play};
use crate::components::Board;

#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
	WakingUp,
	Loading,
	Ready,
	/// The service did not answer the warm-up pings.
	Asleep,
	Failed(String),
}

/// Fetches endpoints into a board, waking the service first if it has not
/// answered yet on this page.
#[derive(Clone, Copy)]
pub struct Challenges {
	api: StoredValue<GraphApi, LocalStorage>,
	awake: RwSignal<bool>,
	pub phase: RwSignal<Phase>,
}

impl Challenges {
	pub fn new(api: GraphApi) -> Self {
		Self {
			api: StoredValue::new_local(api),
			awake: RwSignal::new(false),
			phase: RwSignal::new(Phase::WakingUp),
		}
	}

	/// Clear `board` and start it on a fresh pair of players.
	pub fn next(&self, board: Board) {
		let Some(api) = self.api.try_get_value() else {
			return;
		};
		let (awake, phase) = (self.awake, self.phase);
		board.reset();
		phase.set(if awake.get_untracked() {
			Phase::Loading
		} else {
			Phase::WakingUp
		});
		spawn_local(async move {
			if !awake.get_untracked() {
				if !ping_for_play(&api).await {
					phase.try_set(Phase::Asleep);
					return;
				}
				awake.try_set(true);
				phase.try_set(Phase::Loading);
			}
			match api.endpoints().await {
				Ok(endpoints) => {
					board.start(endpoints.source, Some(endpoints.target));
					phase.try_set(Phase::Ready);
				}
				Err(err) => {
					warn!("could not load a challenge: {err}");
					phase.try_set(Phase::Failed(err.to_string()));
				}
			}
		});
	}
}

/// Progress or failure of the last challenge load, with a retry button when
/// it went wrong. Renders nothing once the board is ready.
#[component]
pub fn ChallengeBanner(phase: RwSignal<Phase>, on_retry: Callback<()>) -> impl IntoView {
	move || {
		let (title, detail, retry) = match phase.get() {
			Phase::Ready => return None,
			Phase::WakingUp => ("Waking up the server…", None, false),
			Phase::Loading => ("Finding two players…", None, false),
			Phase::Asleep => (
				"Server still waking up",
				Some("Give it another try in a few seconds.".to_string()),
				true,
			),
			Phase::Failed(reason) => ("Could not load a challenge", Some(reason), true),
		};
		Some(view! {
			<div class="banner">
				<p class="title">{title}</p>
				{detail.map(|detail| view! { <p class="detail">{detail}</p> })}
				{retry.then(|| view! { <button on:click=move |_| on_retry.run(())>"Try again"</button> })}
			</div>
		})
	}
}
